//! Serving layer for the folio site.

pub mod app;
pub mod source;
pub mod telemetry;

pub use app::{AppState, build_router, fetch_document};
pub use source::{ContentSource, FsContentSource, SourceError};
pub use telemetry::init_tracing;
