//! Collection-to-path table.
//!
//! The table is closed: a collection missing from it has no public path and is
//! reported as [`ContentError::UnknownCollection`] rather than guessed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ContentError;

/// Collections whose documents are publicly addressable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Posts,
    Pages,
    TechnicalPosts,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::Posts,
        Collection::Pages,
        Collection::TechnicalPosts,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Collection::Posts => "posts",
            Collection::Pages => "pages",
            Collection::TechnicalPosts => "technical_posts",
        }
    }

    pub fn path_prefix(self) -> &'static str {
        match self {
            Collection::Posts => "/posts",
            Collection::Pages => "",
            Collection::TechnicalPosts => "/technical_posts",
        }
    }

    /// Cache tag shared by every listing/sitemap of this collection.
    pub fn sitemap_tag(self) -> String {
        format!("{}-sitemap", self.slug())
    }

    /// Splits a request path into the collection and slug it addresses.
    ///
    /// Anything that is not `<prefix>/<slug>` for a prefixed collection falls
    /// through to `pages`, whose prefix is the root.
    pub fn from_path(path: &str) -> Option<(Collection, &str)> {
        let trimmed = path.trim_end_matches('/');
        for collection in [Collection::Posts, Collection::TechnicalPosts] {
            if let Some(rest) = trimmed.strip_prefix(collection.path_prefix())
                && let Some(slug) = rest.strip_prefix('/')
                && !slug.is_empty()
                && !slug.contains('/')
            {
                return Some((collection, slug));
            }
        }
        let slug = trimmed.strip_prefix('/')?;
        if slug.is_empty() || slug.contains('/') {
            return None;
        }
        Some((Collection::Pages, slug))
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Collection {
    type Err = ContentError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "posts" => Ok(Collection::Posts),
            "pages" => Ok(Collection::Pages),
            "technical_posts" => Ok(Collection::TechnicalPosts),
            other => Err(ContentError::UnknownCollection(other.to_string())),
        }
    }
}

/// Path prefix for a collection name as it appears in `relationTo`.
pub fn collection_prefix(name: &str) -> Result<&'static str, ContentError> {
    name.parse::<Collection>().map(Collection::path_prefix)
}

/// Public path of a document: prefix + "/" + slug.
pub fn document_path(collection: Collection, slug: &str) -> String {
    format!("{}/{}", collection.path_prefix(), slug.trim())
}

/// Draft-preview entry URL handed to the CMS live preview.
pub fn preview_path(collection: Collection, slug: &str, preview_secret: &str) -> String {
    let path = document_path(collection, slug);
    let params = [
        ("slug", slug),
        ("collection", collection.slug()),
        ("path", path.as_str()),
        ("previewSecret", preview_secret),
    ];
    let query = params
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("/next/preview?{query}")
}
