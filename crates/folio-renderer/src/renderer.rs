use folio_content::{Document, Homepage, Matrix};
use serde::Serialize;

use crate::context::RenderContext;
use crate::homepage::render_homepage;
use crate::html::{html_document, to_html};
use crate::matrix::render_matrix;
use crate::metadata::{PageMetadata, document_metadata, homepage_metadata};
use crate::page::{render_document, render_not_found};
use crate::view::ViewNode;

/// A rendered view plus the metadata for its `<head>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedPage {
    pub metadata: PageMetadata,
    pub body: ViewNode,
}

impl RenderedPage {
    /// Full HTML document.
    pub fn html(&self) -> String {
        html_document(&self.metadata, &self.body)
    }

    /// Body markup only.
    pub fn fragment_html(&self) -> String {
        to_html(&self.body)
    }
}

/// Trait describing a renderer for every page the site serves.
pub trait PageRenderer {
    fn homepage(&self, homepage: Option<&Homepage>) -> RenderedPage;
    fn document(&self, document: &Document) -> RenderedPage;
    fn not_found(&self) -> RenderedPage;
}

/// Renderer backed by the built-in element, row and homepage views.
#[derive(Debug, Clone, Default)]
pub struct SiteRenderer {
    context: RenderContext,
}

impl SiteRenderer {
    pub fn new(context: RenderContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    /// A bare matrix, titled with the site default.
    pub fn matrix(&self, matrix: &Matrix) -> RenderedPage {
        RenderedPage {
            metadata: PageMetadata::site_default(&self.context.site),
            body: render_matrix(matrix, &self.context),
        }
    }
}

impl PageRenderer for SiteRenderer {
    fn homepage(&self, homepage: Option<&Homepage>) -> RenderedPage {
        RenderedPage {
            metadata: homepage_metadata(homepage, &self.context.site),
            body: render_homepage(homepage, &self.context),
        }
    }

    fn document(&self, document: &Document) -> RenderedPage {
        RenderedPage {
            metadata: document_metadata(document, &self.context.site),
            body: render_document(document, &self.context),
        }
    }

    fn not_found(&self) -> RenderedPage {
        RenderedPage {
            metadata: PageMetadata {
                title: format!("Not found | {}", self.context.site.title),
                description: None,
                image: None,
            },
            body: render_not_found(),
        }
    }
}

/// Convenience helper that renders a matrix to markup with default settings.
pub fn render_matrix_html(matrix: &Matrix) -> String {
    SiteRenderer::default().matrix(matrix).fragment_html()
}
