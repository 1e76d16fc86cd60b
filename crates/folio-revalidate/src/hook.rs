//! Revalidation hooks run after CMS writes.
//!
//! Each hook works out which paths and tags a write affects, hands them to a
//! [`Revalidator`] and reports what it did. Hooks never fail once the request
//! is well formed; invalidating something that is not cached is a no-op.

use std::str::FromStr;

use folio_content::{Collection, ContentError, Document, document_path};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::cache::Revalidator;

pub const HOMEPAGE_GLOBAL: &str = "homepage";
pub const HOMEPAGE_PATH: &str = "/";
pub const HOMEPAGE_TAG: &str = "homepage";

/// Per-request flags the CMS passes to its hooks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookContext {
    #[serde(default)]
    pub disable_revalidate: bool,
}

/// What one hook invocation invalidated, in order, without repeats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevalidationOutcome {
    pub paths: Vec<String>,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
}

impl RevalidationOutcome {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    fn add_path(&mut self, path: String) {
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
    }

    fn add_tag(&mut self, tag: String) {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    fn apply(self, revalidator: &dyn Revalidator) -> Self {
        for path in &self.paths {
            info!(%path, "revalidating path");
            revalidator.revalidate_path(path);
        }
        for tag in &self.tags {
            info!(%tag, "revalidating tag");
            revalidator.revalidate_tag(tag);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.tags.is_empty()
    }
}

/// True when a write moved the document into or out of `published`.
pub fn publication_status_changed(doc: &Document, previous: Option<&Document>) -> bool {
    previous.is_some_and(|previous| previous.is_published() != doc.is_published())
}

/// After-change hook for a collection document.
///
/// The new path is invalidated when the document is published. When the
/// write changed the publication status of a previously published document
/// its old path is invalidated too, so unpublishing takes the page down. Both
/// cases also invalidate the collection sitemap tag.
pub fn revalidate_after_change(
    revalidator: &dyn Revalidator,
    collection: Collection,
    doc: &Document,
    previous: Option<&Document>,
    status_changed: bool,
    context: HookContext,
) -> RevalidationOutcome {
    if context.disable_revalidate {
        return RevalidationOutcome::skipped();
    }
    let mut outcome = RevalidationOutcome::default();
    if doc.is_published() {
        outcome.add_path(document_path(collection, &doc.slug));
        outcome.add_tag(collection.sitemap_tag());
    }
    if status_changed
        && let Some(previous) = previous
        && previous.is_published()
    {
        outcome.add_path(document_path(collection, &previous.slug));
        outcome.add_tag(collection.sitemap_tag());
    }
    outcome.apply(revalidator)
}

/// After-delete hook: the deleted document's path and its sitemap tag.
pub fn revalidate_after_delete(
    revalidator: &dyn Revalidator,
    collection: Collection,
    doc: &Document,
    context: HookContext,
) -> RevalidationOutcome {
    if context.disable_revalidate {
        return RevalidationOutcome::skipped();
    }
    let mut outcome = RevalidationOutcome::default();
    outcome.add_path(document_path(collection, &doc.slug));
    outcome.add_tag(collection.sitemap_tag());
    outcome.apply(revalidator)
}

/// After-change hook for a global. Only the homepage global is rendered.
pub fn revalidate_global(
    revalidator: &dyn Revalidator,
    global: &str,
    context: HookContext,
) -> Result<RevalidationOutcome, RevalidateError> {
    if global != HOMEPAGE_GLOBAL {
        return Err(RevalidateError::UnknownGlobal(global.to_string()));
    }
    if context.disable_revalidate {
        return Ok(RevalidationOutcome::skipped());
    }
    let mut outcome = RevalidationOutcome::default();
    outcome.add_path(HOMEPAGE_PATH.to_string());
    outcome.add_tag(HOMEPAGE_TAG.to_string());
    Ok(outcome.apply(revalidator))
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RevalidateError {
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error("global `{0}` is not rendered by this site")]
    UnknownGlobal(String),
    #[error("revalidation request is missing `{0}`")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookOperation {
    #[default]
    Change,
    Delete,
}

/// Webhook body sent by the CMS after a write.
///
/// Collection writes carry `collection` and `doc` (plus `previousDoc` for
/// changes); global writes carry `global`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevalidationRequest {
    #[serde(default)]
    pub operation: HookOperation,
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default)]
    pub global: Option<String>,
    #[serde(default)]
    pub doc: Option<Document>,
    #[serde(default)]
    pub previous_doc: Option<Document>,
    #[serde(default)]
    pub context: HookContext,
}

impl RevalidationRequest {
    pub fn status_changed(&self) -> bool {
        self.doc
            .as_ref()
            .is_some_and(|doc| publication_status_changed(doc, self.previous_doc.as_ref()))
    }

    /// Routes the request to the matching hook.
    pub fn dispatch(
        &self,
        revalidator: &dyn Revalidator,
    ) -> Result<RevalidationOutcome, RevalidateError> {
        if let Some(global) = &self.global {
            return revalidate_global(revalidator, global, self.context);
        }
        let collection = self
            .collection
            .as_deref()
            .ok_or(RevalidateError::MissingField("collection"))?;
        let collection = Collection::from_str(collection)?;
        let doc = self
            .doc
            .as_ref()
            .ok_or(RevalidateError::MissingField("doc"))?;
        Ok(match self.operation {
            HookOperation::Change => revalidate_after_change(
                revalidator,
                collection,
                doc,
                self.previous_doc.as_ref(),
                self.status_changed(),
                self.context,
            ),
            HookOperation::Delete => {
                revalidate_after_delete(revalidator, collection, doc, self.context)
            }
        })
    }
}
