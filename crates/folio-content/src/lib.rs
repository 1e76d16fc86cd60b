//! Content model for the folio site.
//!
//! Mirrors the JSON the CMS delivers (relationships populated one level deep)
//! and provides the two pure pieces every renderer shares: the collection path
//! table and the link resolver.

pub mod document;
pub mod errors;
pub mod homepage;
mod lenient;
pub mod link;
pub mod matrix;
pub mod media;
pub mod paths;
pub mod reference;

pub use document::{Author, Document, LayoutBlock, Meta, PopulatedAuthor, PublishStatus};
pub use errors::{ContentError, LinkError};
pub use homepage::{Homepage, HomepageSection};
pub use lenient::non_blank;
pub use link::{
    LinkDescriptor, LinkKind, LinkPolicy, LinkTarget, LinkedDocument, ResolvedLink, resolve,
    resolve_link, try_resolve,
};
pub use matrix::{
    BackgroundStyle, Column, ColumnWidth, ContentElement, LinkElement, Matrix, MediaElement,
    RichTextDocument, RichTextElement, Row,
};
pub use media::MediaAsset;
pub use paths::{Collection, collection_prefix, document_path, preview_path};
pub use reference::{PolymorphicRef, Reference};
