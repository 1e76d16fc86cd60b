//! Renders site content into a view tree and HTML.
//!
//! Rendering is a pure walk over one content snapshot: elements compose into
//! columns, columns into rows, rows into a matrix. Nothing here fails; content
//! that cannot be shown renders as nothing or as a dead link.

pub mod asset;
pub mod context;
pub mod element;
pub mod homepage;
pub mod html;
pub mod layout;
pub mod matrix;
pub mod metadata;
pub mod page;
pub mod renderer;
pub mod richtext;
pub mod view;

pub use asset::{AssetRenderer, ImageAssetRenderer};
pub use context::{RenderContext, SiteDefaults, link_policy_from_env};
pub use element::{render_element, render_link};
pub use homepage::{HOMEPAGE_PLACEHOLDER, render_homepage, render_section};
pub use html::{html_document, to_html};
pub use layout::{background_class, render_column, render_row};
pub use matrix::render_matrix;
pub use metadata::{PageMetadata, document_metadata, homepage_metadata};
pub use page::{render_document, render_not_found};
pub use renderer::{PageRenderer, RenderedPage, SiteRenderer, render_matrix_html};
pub use richtext::{LexicalRichText, RichTextRenderer};
pub use view::{Element, ViewNode};
