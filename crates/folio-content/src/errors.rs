use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures surfaced while reading or addressing content.
///
/// None of these reach a viewer: renderers degrade to placeholders, dead links
/// or empty fragments instead.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ContentError {
    #[error("collection `{0}` has no path prefix")]
    UnknownCollection(String),
    #[error("upstream fetch failed: {0}")]
    UpstreamFetchFailure(String),
    #[error("document not found: {0}")]
    NotFound(String),
}

impl ContentError {
    pub fn upstream(msg: impl Into<String>) -> Self {
        ContentError::UpstreamFetchFailure(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        ContentError::NotFound(what.into())
    }
}

/// Why a link descriptor could not produce a navigable address.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LinkError {
    /// The relationship is present but only as a bare id, or the referenced
    /// document has no slug.
    #[error("reference into `{relation_to}` is not resolved")]
    UnresolvedReference { relation_to: String },
    /// The relationship points into a collection missing from the path table.
    #[error("reference into `{0}` cannot be addressed: unknown collection")]
    UnknownCollection(String),
    #[error("malformed link descriptor: {0}")]
    MalformedDescriptor(&'static str),
}
