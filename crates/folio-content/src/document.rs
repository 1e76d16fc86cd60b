//! Pages, posts and technical posts.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::lenient::{non_blank, opt_lenient, opt_string, string_or_null, vec_or_null};
use crate::matrix::{Matrix, RichTextDocument, block_type};
use crate::media::MediaAsset;
use crate::reference::Reference;

pub const UNKNOWN_AUTHOR: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    Draft,
    Published,
}

fn publish_status<'de, D>(deserializer: D) -> Result<Option<PublishStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(match raw.as_str().map(str::trim) {
        Some("published") => Some(PublishStatus::Published),
        Some("draft") => Some(PublishStatus::Draft),
        _ => None,
    })
}

/// SEO fields shared by documents and the homepage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Meta {
    #[serde(default, deserialize_with = "opt_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<Reference<MediaAsset>>,
}

impl Meta {
    pub fn title(&self) -> Option<&str> {
        non_blank(self.title.as_deref())
    }

    pub fn description(&self) -> Option<&str> {
        non_blank(self.description.as_deref())
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image.as_ref().and_then(Reference::url)
    }
}

/// Layout blocks a document may carry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(tag = "blockType")]
pub enum LayoutBlock {
    #[serde(rename = "own-content-matrix")]
    ContentMatrix(Matrix),
    Unsupported,
}

impl<'de> Deserialize<'de> for LayoutBlock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if block_type(&value) != Some("own-content-matrix") {
            return Ok(Self::Unsupported);
        }
        Ok(serde_json::from_value(value)
            .map(Self::ContentMatrix)
            .unwrap_or(Self::Unsupported))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Author {
    #[serde(default, deserialize_with = "string_or_null")]
    pub id: String,
    #[serde(default, deserialize_with = "opt_string")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct PopulatedAuthor {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default, deserialize_with = "opt_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "string_or_null")]
    pub slug: String,
    #[serde(default, deserialize_with = "opt_string")]
    pub title: Option<String>,
    #[serde(
        default,
        rename = "_status",
        deserialize_with = "publish_status",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<PublishStatus>,
    #[serde(default, deserialize_with = "vec_or_null")]
    pub layout: Vec<LayoutBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<RichTextDocument>,
    #[serde(
        default,
        deserialize_with = "opt_lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub meta: Option<Meta>,
    #[serde(default, deserialize_with = "vec_or_null")]
    pub authors: Vec<Reference<Author>>,
    #[serde(
        default,
        deserialize_with = "vec_or_null",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub populated_authors: Vec<PopulatedAuthor>,
}

impl Document {
    pub fn is_published(&self) -> bool {
        self.status == Some(PublishStatus::Published)
    }

    /// Documents in collections without drafts carry no status and are public.
    pub fn is_public(&self) -> bool {
        self.status != Some(PublishStatus::Draft)
    }

    pub fn title(&self) -> Option<&str> {
        non_blank(self.title.as_deref())
    }

    /// Author ids that still need a lookup.
    pub fn unresolved_author_ids(&self) -> Vec<&str> {
        self.authors
            .iter()
            .filter_map(Reference::unresolved_id)
            .collect()
    }

    /// Fills `populated_authors` from the author relationship.
    ///
    /// Populated references are used as-is and bare ids are looked up in
    /// `directory`. Authors that cannot be found are skipped.
    pub fn populate_authors(&mut self, directory: &HashMap<String, Author>) {
        let populated: Vec<PopulatedAuthor> = self
            .authors
            .iter()
            .filter_map(|reference| match reference {
                Reference::Resolved(author) => Some(author),
                Reference::Id(id) => directory.get(id),
                Reference::Invalid => None,
            })
            .map(|author| PopulatedAuthor {
                id: author.id.clone(),
                name: non_blank(author.name.as_deref())
                    .unwrap_or(UNKNOWN_AUTHOR)
                    .to_string(),
            })
            .collect();
        if !populated.is_empty() {
            self.populated_authors = populated;
        }
    }

    pub fn matrices(&self) -> impl Iterator<Item = &Matrix> {
        self.layout.iter().filter_map(|block| match block {
            LayoutBlock::ContentMatrix(matrix) => Some(matrix),
            LayoutBlock::Unsupported => None,
        })
    }
}
