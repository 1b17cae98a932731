//! Export pipeline: render a document, encode it in the requested format and hand the
//! artifact to a sink.
//!
//! Every run moves an [`ExportControl`] through `Idle -> Rendering -> Encoding -> Delivered`
//! or `-> Failed`, and always back to `Idle` once the run ends. A failed run emits exactly
//! one [`ExportNotice`] and delivers nothing.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::domain::{DocumentKind, ExportFormat, FormData};
use super::generator::{DocumentGenerator, GenerateError};
use super::layout::{PageGeometry, SheetLayout};
use super::pdf::{write_pdf, PdfError};
use super::raster::{check_canvas, encode_jpeg, encode_png, rasterize};
use crate::config::ExportSettings;
use crate::workflows::validation::ValidationError;

/// One requested export; consumed by a single pipeline run.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub kind: DocumentKind,
    pub format: ExportFormat,
    pub form: FormData,
    pub file_name: String,
}

/// `<prefix>_<stem>_<YYYYMMDDHHMMSS>.<ext>`
pub fn export_file_name(
    prefix: &str,
    stem: &str,
    format: ExportFormat,
    requested_at: DateTime<Utc>,
) -> String {
    format!(
        "{prefix}_{stem}_{}.{}",
        requested_at.format("%Y%m%d%H%M%S"),
        format.extension()
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportState {
    Idle,
    Rendering,
    Encoding,
    Delivered,
    Failed,
}

impl ExportState {
    const fn as_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Rendering => 1,
            Self::Encoding => 2,
            Self::Delivered => 3,
            Self::Failed => 4,
        }
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Rendering,
            2 => Self::Encoding,
            3 => Self::Delivered,
            4 => Self::Failed,
            _ => Self::Idle,
        }
    }
}

/// Availability of one export trigger. Only one run may hold it at a time.
#[derive(Debug, Default)]
pub struct ExportControl {
    state: AtomicU8,
}

impl ExportControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ExportState {
        ExportState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_available(&self) -> bool {
        self.state() == ExportState::Idle
    }

    /// Claim the control for one run; `None` while another run holds it.
    pub fn try_acquire(&self) -> Option<ExportGuard<'_>> {
        self.state
            .compare_exchange(
                ExportState::Idle.as_u8(),
                ExportState::Rendering.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .ok()
            .map(|_| ExportGuard { control: self })
    }
}

/// Returns the control to `Idle` when dropped, on every exit path.
#[derive(Debug)]
pub struct ExportGuard<'a> {
    control: &'a ExportControl,
}

impl ExportGuard<'_> {
    pub fn advance(&mut self, state: ExportState) {
        self.control.state.store(state.as_u8(), Ordering::Release);
    }

    pub fn state(&self) -> ExportState {
        self.control.state()
    }
}

impl Drop for ExportGuard<'_> {
    fn drop(&mut self) {
        self.control
            .state
            .store(ExportState::Idle.as_u8(), Ordering::Release);
    }
}

/// Encoded document ready for delivery.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: String,
    pub content_type: mime::Mime,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("pdf encoding failed: {0}")]
    Pdf(#[from] PdfError),
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("{0} cannot be produced from a page layout")]
    NotLayoutFormat(ExportFormat),
}

/// Turns a composed sheet into bytes of one format.
pub trait ArtifactEncoder: Send + Sync {
    /// Refuse a sheet this encoder cannot produce within its limits, before any work starts.
    fn admit(&self, _layout: &SheetLayout, _format: ExportFormat) -> Result<(), ValidationError> {
        Ok(())
    }

    fn encode(
        &self,
        layout: &SheetLayout,
        format: ExportFormat,
        title: &str,
    ) -> Result<Vec<u8>, EncodeError>;
}

/// PDF through `lopdf`, PNG and JPEG through `image`.
#[derive(Debug, Clone, Copy)]
pub struct StandardEncoder {
    pub raster_scale: u32,
    pub jpeg_quality: u8,
}

impl StandardEncoder {
    pub fn from_settings(settings: &ExportSettings) -> Self {
        Self {
            raster_scale: settings.raster_scale,
            jpeg_quality: settings.jpeg_quality,
        }
    }
}

impl Default for StandardEncoder {
    fn default() -> Self {
        Self::from_settings(&ExportSettings::default())
    }
}

impl ArtifactEncoder for StandardEncoder {
    fn admit(&self, layout: &SheetLayout, format: ExportFormat) -> Result<(), ValidationError> {
        if format.is_raster() {
            check_canvas(layout, self.raster_scale)?;
        }
        Ok(())
    }

    fn encode(
        &self,
        layout: &SheetLayout,
        format: ExportFormat,
        title: &str,
    ) -> Result<Vec<u8>, EncodeError> {
        match format {
            ExportFormat::Pdf => Ok(write_pdf(layout, title)?),
            ExportFormat::Png => Ok(encode_png(&rasterize(layout, self.raster_scale))?),
            ExportFormat::Jpg => Ok(encode_jpeg(
                &rasterize(layout, self.raster_scale),
                self.jpeg_quality,
            )?),
            ExportFormat::Doc => Err(EncodeError::NotLayoutFormat(format)),
        }
    }
}

/// Where a delivered artifact ended up.
#[derive(Debug, Clone)]
pub enum Delivery {
    Written(PathBuf),
    Download(ExportArtifact),
}

#[derive(Debug, Clone)]
pub struct DeliveryReceipt {
    pub file_name: String,
    pub size: usize,
    pub delivery: Delivery,
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("delivery rejected: {0}")]
    Rejected(String),
}

pub trait ArtifactSink: Send + Sync {
    fn deliver(&self, artifact: ExportArtifact) -> Result<DeliveryReceipt, DeliveryError>;
}

/// Writes artifacts into a directory. Existing files are never replaced and partial files
/// never survive a failed write.
#[derive(Debug, Clone)]
pub struct FileSystemSink {
    directory: PathBuf,
}

impl FileSystemSink {
    const NAME_ATTEMPTS: u32 = 100;

    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Claim the first free name, adding `-2`, `-3` … before the extension when taken.
    fn reserve(&self, file_name: &str) -> Result<(PathBuf, String), DeliveryError> {
        fs::create_dir_all(&self.directory).map_err(|source| DeliveryError::Io {
            path: self.directory.clone(),
            source,
        })?;

        for attempt in 1..=Self::NAME_ATTEMPTS {
            let candidate = numbered_name(file_name, attempt);
            let path = self.directory.join(&candidate);
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(_) => return Ok((path, candidate)),
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(DeliveryError::Io { path, source }),
            }
        }
        Err(DeliveryError::Rejected(format!(
            "no free file name for {file_name} in {}",
            self.directory.display()
        )))
    }

    /// Fill the reserved `path` through a `.part` file; both are removed on failure.
    fn write(path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut partial = path.as_os_str().to_owned();
        partial.push(".part");
        let partial = PathBuf::from(partial);

        let result = fs::File::create(&partial)
            .and_then(|mut file| file.write_all(bytes).and_then(|_| file.sync_all()))
            .and_then(|_| fs::rename(&partial, path));
        if result.is_err() {
            let _ = fs::remove_file(&partial);
            let _ = fs::remove_file(path);
        }
        result
    }
}

fn numbered_name(file_name: &str, attempt: u32) -> String {
    if attempt <= 1 {
        return file_name.to_string();
    }
    match file_name.rsplit_once('.') {
        Some((stem, extension)) => format!("{stem}-{attempt}.{extension}"),
        None => format!("{file_name}-{attempt}"),
    }
}

impl ArtifactSink for FileSystemSink {
    fn deliver(&self, artifact: ExportArtifact) -> Result<DeliveryReceipt, DeliveryError> {
        let (path, file_name) = self.reserve(&artifact.file_name)?;
        Self::write(&path, &artifact.bytes).map_err(|source| DeliveryError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(DeliveryReceipt {
            file_name,
            size: artifact.bytes.len(),
            delivery: Delivery::Written(path),
        })
    }
}

/// Hands the artifact back to the caller, e.g. as an HTTP attachment.
#[derive(Debug, Clone, Copy, Default)]
pub struct DownloadSink;

impl ArtifactSink for DownloadSink {
    fn deliver(&self, artifact: ExportArtifact) -> Result<DeliveryReceipt, DeliveryError> {
        Ok(DeliveryReceipt {
            file_name: artifact.file_name.clone(),
            size: artifact.bytes.len(),
            delivery: Delivery::Download(artifact),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// User-facing message about an export run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportNotice {
    pub level: NoticeLevel,
    pub message: String,
}

impl ExportNotice {
    pub fn for_failure(job: &ExportJob, error: &ExportError) -> Self {
        match error {
            ExportError::Unsupported { .. } => Self {
                level: NoticeLevel::Info,
                message: error.to_string(),
            },
            other => Self {
                level: NoticeLevel::Error,
                message: format!("Could not export {}: {other}", job.file_name),
            },
        }
    }
}

pub trait ExportNotifier: Send + Sync {
    fn notify(&self, notice: ExportNotice);

    /// Notices still held for display, oldest first.
    fn recent(&self) -> Vec<ExportNotice> {
        Vec::new()
    }
}

/// Keeps the most recent notices in memory.
#[derive(Debug, Default)]
pub struct NoticeBoard {
    notices: Mutex<Vec<ExportNotice>>,
}

impl NoticeBoard {
    const CAPACITY: usize = 64;

    pub fn notices(&self) -> Vec<ExportNotice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ExportNotifier for NoticeBoard {
    fn notify(&self, notice: ExportNotice) {
        let mut notices = self.notices.lock().unwrap_or_else(PoisonError::into_inner);
        if notices.len() == Self::CAPACITY {
            notices.remove(0);
        }
        notices.push(notice);
    }

    fn recent(&self) -> Vec<ExportNotice> {
        self.notices()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("an export of this document is already in progress")]
    Busy,
    #[error("{format} export for {kind} is coming soon")]
    Unsupported {
        kind: DocumentKind,
        format: ExportFormat,
    },
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

/// Generator, encoder, sink and notifier wired into one export flow.
pub struct ExportPipeline<S, N> {
    generator: Arc<DocumentGenerator>,
    encoder: Arc<dyn ArtifactEncoder>,
    sink: Arc<S>,
    notifier: Arc<N>,
    org_prefix: String,
    geometry: PageGeometry,
    max_pages: usize,
}

impl<S, N> ExportPipeline<S, N>
where
    S: ArtifactSink + 'static,
    N: ExportNotifier + 'static,
{
    pub fn new(
        generator: Arc<DocumentGenerator>,
        settings: &ExportSettings,
        sink: Arc<S>,
        notifier: Arc<N>,
    ) -> Self {
        Self {
            generator,
            encoder: Arc::new(StandardEncoder::from_settings(settings)),
            sink,
            notifier,
            org_prefix: settings.org_prefix.clone(),
            geometry: PageGeometry::A4_PORTRAIT,
            max_pages: settings.max_pages,
        }
    }

    pub fn with_encoder(mut self, encoder: Arc<dyn ArtifactEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn generator(&self) -> &DocumentGenerator {
        &self.generator
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn job(
        &self,
        kind: DocumentKind,
        format: ExportFormat,
        form: FormData,
        requested_at: DateTime<Utc>,
    ) -> ExportJob {
        let stem = self
            .generator
            .template(kind)
            .map(|template| template.file_stem)
            .unwrap_or_else(|_| kind.slug());
        ExportJob {
            kind,
            format,
            form,
            file_name: export_file_name(&self.org_prefix, stem, format, requested_at),
        }
    }

    /// Run one export on `control`. A busy control is rejected without touching it.
    pub fn run(
        &self,
        control: &ExportControl,
        job: ExportJob,
        issued_on: NaiveDate,
    ) -> Result<DeliveryReceipt, ExportError> {
        let Some(mut guard) = control.try_acquire() else {
            tracing::debug!(kind = %job.kind, "export rejected while busy");
            return Err(ExportError::Busy);
        };

        match self.execute(&mut guard, &job, issued_on) {
            Ok(receipt) => {
                guard.advance(ExportState::Delivered);
                tracing::info!(
                    kind = %job.kind,
                    format = %job.format,
                    file = %receipt.file_name,
                    bytes = receipt.size,
                    "document exported"
                );
                Ok(receipt)
            }
            Err(error) => {
                guard.advance(ExportState::Failed);
                tracing::warn!(
                    kind = %job.kind,
                    format = %job.format,
                    error = %error,
                    "document export failed"
                );
                self.notifier.notify(ExportNotice::for_failure(&job, &error));
                Err(error)
            }
        }
    }

    fn admit(&self, layout: &SheetLayout, format: ExportFormat) -> Result<(), ValidationError> {
        let pages = layout.slices().len();
        if pages > self.max_pages {
            return Err(ValidationError::TooManyPages {
                pages,
                max: self.max_pages,
            });
        }
        self.encoder.admit(layout, format)
    }

    fn execute(
        &self,
        guard: &mut ExportGuard<'_>,
        job: &ExportJob,
        issued_on: NaiveDate,
    ) -> Result<DeliveryReceipt, ExportError> {
        let template = self.generator.template(job.kind)?;
        if !template.supports(job.format) {
            return Err(ExportError::Unsupported {
                kind: job.kind,
                format: job.format,
            });
        }

        guard.advance(ExportState::Rendering);
        let bytes = if job.format == ExportFormat::Doc {
            let stub = self.generator.text_stub(job.kind, &job.form, issued_on)?;
            guard.advance(ExportState::Encoding);
            stub.into_bytes()
        } else {
            let preview = self.generator.preview(job.kind, &job.form, issued_on)?;
            let layout = SheetLayout::compose(&preview, self.geometry);
            self.admit(&layout, job.format)
                .map_err(GenerateError::Validation)?;
            guard.advance(ExportState::Encoding);
            self.encoder.encode(&layout, job.format, preview.title)?
        };

        let artifact = ExportArtifact {
            file_name: job.file_name.clone(),
            content_type: job.format.mime(),
            bytes,
        };
        Ok(self.sink.deliver(artifact)?)
    }
}
