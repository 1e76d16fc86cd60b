//! Link descriptors and their resolution into `(href, target)`.
//!
//! Resolution is pure and total: [`try_resolve`] classifies why a descriptor
//! cannot be navigated, [`resolve`] turns every such case into the dead link
//! `("#", self)`.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::LinkError;
use crate::lenient::{non_blank, opt_lenient, opt_string, string_or_null};
use crate::media::MediaAsset;
use crate::paths::collection_prefix;
use crate::reference::{PolymorphicRef, Reference};

pub const DEAD_HREF: &str = "#";

/// Which payload of a [`LinkDescriptor`] is meant to be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Internal,
    Custom,
    Document,
}

impl LinkKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "internal" | "reference" => Some(Self::Internal),
            "custom" => Some(Self::Custom),
            "document" => Some(Self::Document),
            _ => None,
        }
    }
}

/// The immediate fields of a referenced page or post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct LinkedDocument {
    #[serde(default, deserialize_with = "opt_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub title: Option<String>,
}

/// An authored link: a label plus one of three target payloads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct LinkDescriptor {
    #[serde(default, deserialize_with = "string_or_null")]
    pub label: String,
    #[serde(
        default,
        deserialize_with = "link_kind",
        skip_serializing_if = "Option::is_none"
    )]
    pub link_type: Option<LinkKind>,
    #[serde(
        default,
        deserialize_with = "opt_lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub internal_page: Option<PolymorphicRef<LinkedDocument>>,
    #[serde(
        default,
        deserialize_with = "opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<Reference<MediaAsset>>,
}

fn link_kind<'de, D>(deserializer: D) -> Result<Option<LinkKind>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(raw.as_str().and_then(LinkKind::parse))
}

impl LinkDescriptor {
    pub fn custom(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            link_type: Some(LinkKind::Custom),
            custom_url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn internal(label: impl Into<String>, relation_to: &str, slug: &str) -> Self {
        Self {
            label: label.into(),
            link_type: Some(LinkKind::Internal),
            internal_page: Some(PolymorphicRef::resolved(
                relation_to,
                LinkedDocument {
                    slug: Some(slug.to_string()),
                    ..LinkedDocument::default()
                },
            )),
            ..Self::default()
        }
    }

    /// Explicit discriminant, or the single populated payload when the
    /// discriminant is absent.
    pub fn effective_kind(&self) -> Option<LinkKind> {
        if self.link_type.is_some() {
            return self.link_type;
        }
        match (&self.internal_page, non_blank(self.custom_url.as_deref())) {
            (Some(_), None) => Some(LinkKind::Internal),
            (None, Some(_)) => Some(LinkKind::Custom),
            _ => None,
        }
    }

    fn document_url(&self) -> Option<&str> {
        self.document.as_ref().and_then(Reference::url)
    }
}

/// Where the browser opens a resolved link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum LinkTarget {
    #[default]
    #[serde(rename = "self", alias = "_self")]
    SelfTab,
    #[serde(rename = "blank", alias = "_blank")]
    Blank,
}

impl LinkTarget {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "self" | "_self" | "same-tab" => Some(Self::SelfTab),
            "blank" | "_blank" | "new-tab" => Some(Self::Blank),
            _ => None,
        }
    }

    /// Value of the HTML `target` attribute.
    pub fn as_attr(self) -> &'static str {
        match self {
            LinkTarget::SelfTab => "_self",
            LinkTarget::Blank => "_blank",
        }
    }

    /// `rel` attribute that accompanies the target, if any.
    pub fn rel(self) -> Option<&'static str> {
        match self {
            LinkTarget::SelfTab => None,
            LinkTarget::Blank => Some("noopener noreferrer"),
        }
    }
}

impl fmt::Display for LinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LinkTarget::SelfTab => "self",
            LinkTarget::Blank => "blank",
        })
    }
}

/// Site-wide choices the resolver cannot infer from a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkPolicy {
    /// Target for custom URLs, applied at every call site.
    pub custom_target: LinkTarget,
}

impl Default for LinkPolicy {
    fn default() -> Self {
        Self {
            custom_target: LinkTarget::Blank,
        }
    }
}

/// A navigable address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLink {
    pub href: String,
    pub target: LinkTarget,
}

impl ResolvedLink {
    pub fn new(href: impl Into<String>, target: LinkTarget) -> Self {
        Self {
            href: href.into(),
            target,
        }
    }

    pub fn dead() -> Self {
        Self::new(DEAD_HREF, LinkTarget::SelfTab)
    }

    pub fn is_dead(&self) -> bool {
        self.href == DEAD_HREF
    }
}

/// Resolves a descriptor, reporting why it cannot be navigated.
///
/// Priority: stored document, then internal reference, then custom URL.
pub fn try_resolve(link: &LinkDescriptor, policy: &LinkPolicy) -> Result<ResolvedLink, LinkError> {
    if let Some(url) = link.document_url() {
        return Ok(ResolvedLink::new(url, LinkTarget::Blank));
    }

    match link.effective_kind() {
        Some(LinkKind::Internal) => resolve_internal(link),
        Some(LinkKind::Custom) => match link.custom_url.as_deref() {
            Some(url) if non_blank(Some(url)).is_some() => {
                Ok(ResolvedLink::new(url, policy.custom_target))
            }
            _ => Err(LinkError::MalformedDescriptor("custom link without a url")),
        },
        Some(LinkKind::Document) => Err(LinkError::MalformedDescriptor(
            "document link without a stored file url",
        )),
        None => Err(LinkError::MalformedDescriptor("missing link type")),
    }
}

fn resolve_internal(link: &LinkDescriptor) -> Result<ResolvedLink, LinkError> {
    let reference = link
        .internal_page
        .as_ref()
        .ok_or(LinkError::MalformedDescriptor(
            "internal link without a reference",
        ))?;
    let prefix = collection_prefix(&reference.relation_to)
        .map_err(|_| LinkError::UnknownCollection(reference.relation_to.clone()))?;
    let slug = reference
        .value
        .resolved()
        .and_then(|doc| non_blank(doc.slug.as_deref()))
        .ok_or_else(|| LinkError::UnresolvedReference {
            relation_to: reference.relation_to.clone(),
        })?;
    Ok(ResolvedLink::new(
        format!("{prefix}/{slug}"),
        LinkTarget::SelfTab,
    ))
}

/// Total resolution: anything unresolvable becomes `("#", self)`.
pub fn resolve(link: &LinkDescriptor, policy: &LinkPolicy) -> ResolvedLink {
    try_resolve(link, policy).unwrap_or_else(|_| ResolvedLink::dead())
}

/// [`resolve`] under the default policy.
pub fn resolve_link(link: &LinkDescriptor) -> ResolvedLink {
    resolve(link, &LinkPolicy::default())
}
