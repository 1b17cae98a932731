use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use uncif_docs::config::AppConfig;
use uncif_docs::error::AppError;
use uncif_docs::workflows::documents::{
    DocumentCatalog, DocumentGenerator, DocumentService, DownloadSink, ExportNotice,
    ExportNotifier, ExportPipeline, NoticeBoard, NoticeLevel,
};
use uncif_docs::workflows::fees::FeeCalculator;
use uncif_docs::workflows::grants::GrantDirectory;
use uncif_docs::workflows::submissions::{
    RepositoryError, SubmissionId, SubmissionKind, SubmissionRecord, SubmissionRepository,
    SubmissionService,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Workflow services shared by the HTTP routes.
#[derive(Clone)]
pub(crate) struct AppServices {
    pub(crate) calculator: Arc<FeeCalculator>,
    pub(crate) documents: Arc<DocumentService<DownloadSink, NoticeBoard>>,
    pub(crate) submissions: Arc<SubmissionService<InMemorySubmissionRepository>>,
    pub(crate) grants: Arc<GrantDirectory>,
}

impl AppServices {
    pub(crate) fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let calculator = Arc::new(FeeCalculator::new(config.fees.clone()));
        let pipeline = ExportPipeline::new(
            document_generator(config),
            &config.export,
            Arc::new(DownloadSink),
            Arc::new(NoticeBoard::default()),
        );

        Ok(Self {
            calculator: Arc::clone(&calculator),
            documents: Arc::new(DocumentService::new(pipeline)),
            submissions: Arc::new(SubmissionService::new(
                Arc::new(InMemorySubmissionRepository::default()),
                calculator,
            )),
            grants: Arc::new(GrantDirectory::embedded()?),
        })
    }
}

pub(crate) fn document_generator(config: &AppConfig) -> Arc<DocumentGenerator> {
    Arc::new(DocumentGenerator::new(
        DocumentCatalog::standard(),
        FeeCalculator::new(config.fees.clone()),
        &config.export.org_prefix,
    ))
}

#[derive(Default, Clone)]
pub(crate) struct InMemorySubmissionRepository {
    records: Arc<Mutex<BTreeMap<SubmissionId, SubmissionRecord>>>,
}

impl InMemorySubmissionRepository {
    fn locked(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<SubmissionId, SubmissionRecord>>, RepositoryError>
    {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("submission store poisoned".to_string()))
    }
}

impl SubmissionRepository for InMemorySubmissionRepository {
    fn insert(&self, record: SubmissionRecord) -> Result<SubmissionRecord, RepositoryError> {
        let mut guard = self.locked()?;
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError> {
        let guard = self.locked()?;
        Ok(guard.get(id).cloned())
    }

    fn list(&self, kind: Option<SubmissionKind>) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        let guard = self.locked()?;
        Ok(guard
            .values()
            .filter(|record| kind.map_or(true, |kind| record.payload.kind() == kind))
            .cloned()
            .collect())
    }
}

/// Prints export notices for command-line users.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ConsoleNotifier;

impl ExportNotifier for ConsoleNotifier {
    fn notify(&self, notice: ExportNotice) {
        match notice.level {
            NoticeLevel::Error => eprintln!("! {}", notice.message),
            NoticeLevel::Info => println!("{}", notice.message),
        }
    }
}

/// `key=value` pairs for `--field`.
pub(crate) fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{raw}'")),
    }
}
