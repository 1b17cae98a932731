//! Fillable organizational documents and their export pipeline.
//!
//! Templates are declarative ([`DocumentTemplate`]); one [`DocumentGenerator`] fills any of
//! them, [`SheetLayout`] places the result on A4 pages, and the export pipeline encodes the
//! layout as PDF, PNG or JPEG (or a plain labeled text stub) before handing it to a sink.

pub mod catalog;
pub mod domain;
pub mod export;
pub mod generator;
pub mod layout;
pub mod pdf;
pub mod raster;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use catalog::{DocumentCatalog, DocumentTemplate};
pub use domain::{DocumentKind, ExportFormat, FieldKind, FieldSpec, FormData, UnknownVariant};
pub use export::{
    export_file_name, ArtifactEncoder, ArtifactSink, Delivery, DeliveryError, DeliveryReceipt,
    DownloadSink, EncodeError, ExportArtifact, ExportControl, ExportError, ExportGuard,
    ExportJob, ExportNotice, ExportNotifier, ExportPipeline, ExportState, FileSystemSink,
    NoticeBoard, NoticeLevel, StandardEncoder,
};
pub use generator::{DocumentGenerator, DocumentPreview, GenerateError, PreviewField};
pub use layout::{paginate, PageGeometry, PageSlice, SheetLayout};
pub use router::{document_router, MAX_REQUEST_BYTES};
pub use service::{DocumentService, TemplateSummary};
