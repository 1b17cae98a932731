use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::domain::{DocumentKind, ExportFormat, FieldSpec, FormData};
use super::export::{
    ArtifactSink, DeliveryReceipt, ExportControl, ExportError, ExportNotifier, ExportPipeline,
};
use super::generator::{DocumentPreview, GenerateError};

/// Catalog entry as listed to clients.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateSummary {
    pub kind: DocumentKind,
    pub title: &'static str,
    pub formats: Vec<ExportFormat>,
    pub fields: Vec<FieldSpec>,
}

/// Document generation facade with one export control per document kind.
pub struct DocumentService<S, N> {
    pipeline: ExportPipeline<S, N>,
    controls: Vec<(DocumentKind, ExportControl)>,
}

impl<S, N> DocumentService<S, N>
where
    S: ArtifactSink + 'static,
    N: ExportNotifier + 'static,
{
    pub fn new(pipeline: ExportPipeline<S, N>) -> Self {
        let controls = DocumentKind::ordered()
            .into_iter()
            .map(|kind| (kind, ExportControl::new()))
            .collect();
        Self { pipeline, controls }
    }

    pub fn pipeline(&self) -> &ExportPipeline<S, N> {
        &self.pipeline
    }

    pub fn control(&self, kind: DocumentKind) -> Option<&ExportControl> {
        self.controls
            .iter()
            .find(|(candidate, _)| *candidate == kind)
            .map(|(_, control)| control)
    }

    pub fn catalog(&self) -> Vec<TemplateSummary> {
        self.pipeline
            .generator()
            .catalog()
            .templates()
            .iter()
            .map(|template| TemplateSummary {
                kind: template.kind,
                title: template.title,
                formats: template.formats.to_vec(),
                fields: template.fields.clone(),
            })
            .collect()
    }

    pub fn preview(
        &self,
        kind: DocumentKind,
        form: &FormData,
        issued_on: NaiveDate,
    ) -> Result<DocumentPreview, GenerateError> {
        self.pipeline.generator().preview(kind, form, issued_on)
    }

    /// Export on the kind's own control; exports of other kinds never wait on it.
    pub fn export(
        &self,
        kind: DocumentKind,
        format: ExportFormat,
        form: FormData,
        requested_at: DateTime<Utc>,
    ) -> Result<DeliveryReceipt, ExportError> {
        let control = self
            .control(kind)
            .ok_or(GenerateError::UnknownTemplate(kind))?;
        let job = self.pipeline.job(kind, format, form, requested_at);
        self.pipeline.run(control, job, requested_at.date_naive())
    }
}
