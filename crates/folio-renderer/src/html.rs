//! View tree to HTML.

use crate::metadata::PageMetadata;
use crate::view::{Element, ViewNode};

const VOID_TAGS: &[&str] = &["br", "hr", "img", "meta", "link", "source", "input"];

pub fn to_html(node: &ViewNode) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn write_node(node: &ViewNode, out: &mut String) {
    match node {
        ViewNode::Text(text) => out.push_str(&htmlescape::encode_minimal(text)),
        ViewNode::Fragment(children) => {
            for child in children {
                write_node(child, out);
            }
        }
        ViewNode::Element(element) => write_element(element, out),
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag);
    for (name, value) in &element.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&htmlescape::encode_minimal(value));
        out.push('"');
    }
    out.push('>');
    if VOID_TAGS.contains(&element.tag.as_str()) {
        return;
    }
    for child in &element.children {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(&element.tag);
    out.push('>');
}

/// Wraps a rendered body in a complete document with its metadata.
pub fn html_document(metadata: &PageMetadata, body: &ViewNode) -> String {
    let mut head = Element::new("head")
        .child(Element::new("meta").attr("charset", "utf-8"))
        .child(
            Element::new("meta")
                .attr("name", "viewport")
                .attr("content", "width=device-width, initial-scale=1"),
        )
        .child(Element::new("title").text(metadata.title.clone()))
        .child(
            Element::new("meta")
                .attr("property", "og:title")
                .attr("content", &metadata.title),
        );
    if let Some(description) = &metadata.description {
        head = head
            .child(
                Element::new("meta")
                    .attr("name", "description")
                    .attr("content", description),
            )
            .child(
                Element::new("meta")
                    .attr("property", "og:description")
                    .attr("content", description),
            );
    }
    if let Some(image) = &metadata.image {
        head = head.child(
            Element::new("meta")
                .attr("property", "og:image")
                .attr("content", image),
        );
    }
    let document: ViewNode = Element::new("html")
        .attr("lang", "en")
        .child(head)
        .child(Element::new("body").child(body.clone()))
        .into();
    format!("<!DOCTYPE html>{}", to_html(&document))
}
