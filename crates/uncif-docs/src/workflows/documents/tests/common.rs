use std::path::Path;
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::config::ExportSettings;
use crate::workflows::documents::export::{
    ArtifactEncoder, ArtifactSink, EncodeError, ExportPipeline, FileSystemSink, NoticeBoard,
};
use crate::workflows::documents::layout::SheetLayout;
use crate::workflows::documents::pdf::PdfError;
use crate::workflows::documents::{
    DocumentCatalog, DocumentGenerator, DocumentService, DownloadSink, ExportFormat, FormData,
};
use crate::workflows::fees::{FeeCalculator, FeeSchedule};

pub(super) fn generator() -> Arc<DocumentGenerator> {
    Arc::new(DocumentGenerator::new(
        DocumentCatalog::standard(),
        FeeCalculator::new(FeeSchedule::default()),
        "UNCIF",
    ))
}

pub(super) fn settings() -> ExportSettings {
    ExportSettings {
        raster_scale: 1,
        ..ExportSettings::default()
    }
}

pub(super) fn issued_on() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date")
}

pub(super) fn requested_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 10, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn pipeline<S: ArtifactSink + 'static>(
    sink: S,
) -> (ExportPipeline<S, NoticeBoard>, Arc<NoticeBoard>) {
    pipeline_with(&settings(), sink)
}

pub(super) fn pipeline_with<S: ArtifactSink + 'static>(
    settings: &ExportSettings,
    sink: S,
) -> (ExportPipeline<S, NoticeBoard>, Arc<NoticeBoard>) {
    let notices = Arc::new(NoticeBoard::default());
    let pipeline = ExportPipeline::new(generator(), settings, Arc::new(sink), Arc::clone(&notices));
    (pipeline, notices)
}

pub(super) fn file_pipeline(
    dir: &Path,
) -> (ExportPipeline<FileSystemSink, NoticeBoard>, Arc<NoticeBoard>) {
    pipeline(FileSystemSink::new(dir.join("exports")))
}

pub(super) fn download_service() -> Arc<DocumentService<DownloadSink, NoticeBoard>> {
    let (pipeline, _) = pipeline(DownloadSink);
    Arc::new(DocumentService::new(pipeline))
}

pub(super) fn files_in(dir: &Path) -> usize {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.count(),
        Err(_) => 0,
    }
}

pub(super) fn letter_form() -> FormData {
    FormData::new()
        .with("recipient_name", "Meera Iyer")
        .with("recipient_role", "Field Coordinator")
        .with("program", "Rural Literacy")
        .with("letter_date", "2025-03-14")
        .with("highlights", "She trained forty volunteers across six districts.")
        .with("signatory", "R. Banerjee")
}

pub(super) fn certificate_form() -> FormData {
    FormData::new()
        .with("awardee_name", "Farah Khan")
        .with("achievement", "ten years of volunteer teaching")
        .with("awarded_on", "2025-03-01")
        .with("signatory", "A. Menon")
}

pub(super) fn fee_statement_form(pages: &str, category: &str) -> FormData {
    FormData::new()
        .with("applicant_name", "Kabir Shah")
        .with("project_title", "Village Market App")
        .with("page_count", pages)
        .with("category", category)
        .with("project_type", "business-portfolio")
}

/// Agreement whose scope runs over several pages.
pub(super) fn long_agreement_form() -> FormData {
    let scope = "joint field surveys, shared training material and quarterly reviews. "
        .repeat(110);
    FormData::new()
        .with("party_name", "Northern Rivers Trust")
        .with("party_representative", "S. Dutta")
        .with("effective_date", "2025-04-01")
        .with("term_months", "24")
        .with("scope", &scope)
}

/// Encoder that always fails, standing in for a broken backend.
pub(super) struct FailingEncoder;

impl ArtifactEncoder for FailingEncoder {
    fn encode(
        &self,
        _layout: &SheetLayout,
        _format: ExportFormat,
        _title: &str,
    ) -> Result<Vec<u8>, EncodeError> {
        Err(EncodeError::Pdf(PdfError::Write("backend unavailable".to_string())))
    }
}

/// Encoder that signals when it starts, then holds until the gate opens.
pub(super) struct GatedEncoder {
    pub started: Mutex<mpsc::Sender<()>>,
    pub gate: Mutex<mpsc::Receiver<()>>,
}

impl ArtifactEncoder for GatedEncoder {
    fn encode(
        &self,
        _layout: &SheetLayout,
        _format: ExportFormat,
        _title: &str,
    ) -> Result<Vec<u8>, EncodeError> {
        if let Ok(started) = self.started.lock() {
            let _ = started.send(());
        }
        let opened = self
            .gate
            .lock()
            .map(|gate| gate.recv_timeout(Duration::from_secs(5)).is_ok())
            .unwrap_or(false);
        if opened {
            Ok(b"%PDF-gated".to_vec())
        } else {
            Err(EncodeError::Pdf(PdfError::Write("gate never opened".to_string())))
        }
    }
}

pub(super) async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body")
        .to_vec()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    serde_json::from_slice(&read_body(response).await).expect("json payload")
}
