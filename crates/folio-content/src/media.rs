use serde::{Deserialize, Serialize};

use crate::lenient::{opt_string, opt_u32};
use crate::reference::Reference;

/// A stored upload from the media collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct MediaAsset {
    #[serde(default, deserialize_with = "opt_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub alt: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub filename: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub mime_type: Option<String>,
    #[serde(default, deserialize_with = "opt_u32")]
    pub width: Option<u32>,
    #[serde(default, deserialize_with = "opt_u32")]
    pub height: Option<u32>,
}

impl MediaAsset {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// The stored-file URL, if one is set and non-blank.
    pub fn resolved_url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn is_video(&self) -> bool {
        self.mime_type
            .as_deref()
            .is_some_and(|mime| mime.to_ascii_lowercase().starts_with("video/"))
    }
}

impl Reference<MediaAsset> {
    /// URL of a populated media reference; bare ids have none.
    pub fn url(&self) -> Option<&str> {
        self.resolved().and_then(MediaAsset::resolved_url)
    }
}
