use folio_content::Document;

use crate::context::RenderContext;
use crate::matrix::render_matrix;
use crate::view::{Element, ViewNode};

pub const NOT_FOUND_MESSAGE: &str = "This page could not be found.";

/// A page, post or technical post: heading, byline, body, then layout blocks.
pub fn render_document(document: &Document, context: &RenderContext) -> ViewNode {
    let mut article = Element::new("article")
        .class("pt-16 pb-24")
        .attr("data-slug", &document.slug);

    let title = document.title().unwrap_or(&context.site.title);
    let mut header = Element::new("header")
        .class("container mb-8")
        .child(Element::new("h1").class("text-4xl font-bold").text(title));
    if !document.populated_authors.is_empty() {
        let names: Vec<&str> = document
            .populated_authors
            .iter()
            .map(|author| author.name.as_str())
            .collect();
        header = header.child(
            Element::new("p")
                .class("text-sm opacity-75")
                .text(format!("By {}", names.join(", "))),
        );
    }
    article = article.child(header);

    if let Some(content) = &document.content {
        article = article.child(
            Element::new("div")
                .class("container")
                .child(context.rich_text().render(content, context)),
        );
    }
    article
        .children(document.matrices().map(|matrix| render_matrix(matrix, context)))
        .into()
}

pub fn render_not_found() -> ViewNode {
    Element::new("div")
        .class("container py-28")
        .child(Element::new("h1").class("text-4xl font-bold").text("404"))
        .child(Element::new("p").text(NOT_FOUND_MESSAGE))
        .into()
}
