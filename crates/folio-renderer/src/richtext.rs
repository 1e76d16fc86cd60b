//! Rich text rendering.
//!
//! The editor stores a Lexical tree: `{"root": {"children": [...]}}` where each
//! node carries a `type` and, for containers, its own `children`.

use folio_content::{
    LinkDescriptor, LinkKind, LinkTarget, LinkedDocument, MediaAsset, PolymorphicRef, Reference,
    RichTextDocument,
};
use serde_json::Value;

use crate::context::RenderContext;
use crate::view::{Element, ViewNode};

const FORMAT_BOLD: u64 = 1;
const FORMAT_ITALIC: u64 = 1 << 1;
const FORMAT_STRIKETHROUGH: u64 = 1 << 2;
const FORMAT_UNDERLINE: u64 = 1 << 3;
const FORMAT_CODE: u64 = 1 << 4;

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Renders a rich-text document into a view fragment.
pub trait RichTextRenderer: Send + Sync {
    fn render(&self, document: &RichTextDocument, context: &RenderContext) -> ViewNode;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LexicalRichText;

impl RichTextRenderer for LexicalRichText {
    fn render(&self, document: &RichTextDocument, context: &RenderContext) -> ViewNode {
        if document.is_empty() {
            return ViewNode::empty();
        }
        let Some(root) = document.0.get("root") else {
            return ViewNode::empty();
        };
        let body = Element::new("div")
            .class("rich-text")
            .children(render_children(root, context));
        body.into()
    }
}

fn render_children(node: &Value, context: &RenderContext) -> Vec<ViewNode> {
    node.get("children")
        .and_then(Value::as_array)
        .map(|children| {
            children
                .iter()
                .map(|child| render_node(child, context))
                .collect()
        })
        .unwrap_or_default()
}

fn render_node(node: &Value, context: &RenderContext) -> ViewNode {
    let kind = node.get("type").and_then(Value::as_str).unwrap_or_default();
    match kind {
        "text" => render_text(node),
        "linebreak" => Element::new("br").into(),
        "tab" => ViewNode::text("\t"),
        "paragraph" => container("p", node, context),
        "heading" => {
            let tag = node
                .get("tag")
                .and_then(Value::as_str)
                .filter(|tag| HEADING_TAGS.contains(tag))
                .unwrap_or("h2");
            container(tag, node, context)
        }
        "quote" => container("blockquote", node, context),
        "list" => {
            let tag = match node.get("listType").and_then(Value::as_str) {
                Some("number") => "ol",
                _ => "ul",
            };
            container(tag, node, context)
        }
        "listitem" => container("li", node, context),
        "horizontalrule" => Element::new("hr").into(),
        "link" | "autolink" => render_link(node, context),
        _ => ViewNode::Fragment(render_children(node, context)),
    }
}

fn container(tag: &str, node: &Value, context: &RenderContext) -> ViewNode {
    Element::new(tag)
        .children(render_children(node, context))
        .into()
}

fn render_text(node: &Value) -> ViewNode {
    let text = node.get("text").and_then(Value::as_str).unwrap_or_default();
    if text.is_empty() {
        return ViewNode::empty();
    }
    let format = node.get("format").and_then(Value::as_u64).unwrap_or(0);
    let mut rendered = ViewNode::text(text);
    // innermost first so `<strong><em>` nests the way the editor shows it
    for (bit, tag) in [
        (FORMAT_CODE, "code"),
        (FORMAT_STRIKETHROUGH, "s"),
        (FORMAT_UNDERLINE, "u"),
        (FORMAT_ITALIC, "em"),
        (FORMAT_BOLD, "strong"),
    ] {
        if format & bit != 0 {
            rendered = Element::new(tag).child(rendered).into();
        }
    }
    rendered
}

/// Link nodes keep their target under `fields`, shaped like a link descriptor
/// except that the internal reference lives in `doc`.
fn render_link(node: &Value, context: &RenderContext) -> ViewNode {
    let fields = node.get("fields").unwrap_or(&Value::Null);
    let descriptor = link_fields(fields, node);
    let mut resolved = context.resolve(&descriptor);
    if !resolved.is_dead() && fields.get("newTab").and_then(Value::as_bool) == Some(true) {
        resolved.target = LinkTarget::Blank;
    }
    Element::new("a")
        .attr("href", &resolved.href)
        .attr("target", resolved.target.as_attr())
        .attr_opt("rel", resolved.target.rel())
        .children(render_children(node, context))
        .into()
}

fn link_fields(fields: &Value, node: &Value) -> LinkDescriptor {
    let url = fields
        .get("url")
        .or_else(|| node.get("url"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let link_type = fields
        .get("linkType")
        .and_then(Value::as_str)
        .and_then(LinkKind::parse);
    let internal_page = fields
        .get("doc")
        .and_then(|doc| serde_json::from_value::<PolymorphicRef<LinkedDocument>>(doc.clone()).ok());
    let document = fields
        .get("document")
        .and_then(|document| serde_json::from_value::<Reference<MediaAsset>>(document.clone()).ok());
    LinkDescriptor {
        label: String::new(),
        link_type,
        internal_page,
        custom_url: url,
        document,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::to_html;
    use serde_json::json;

    fn render(value: Value) -> String {
        let node = LexicalRichText.render(&RichTextDocument(value), &RenderContext::default());
        to_html(&node)
    }

    #[test]
    fn renders_paragraphs_and_headings() {
        let html = render(json!({"root": {"children": [
            {"type": "heading", "tag": "h3", "children": [{"type": "text", "text": "Title"}]},
            {"type": "paragraph", "children": [
                {"type": "text", "text": "Hello "},
                {"type": "text", "text": "world", "format": 3}
            ]}
        ]}}));
        assert_eq!(
            html,
            "<div class=\"rich-text\"><h3>Title</h3><p>Hello <strong><em>world</em></strong></p></div>"
        );
    }

    #[test]
    fn invalid_heading_tag_defaults_to_h2() {
        let html = render(json!({"root": {"children": [
            {"type": "heading", "tag": "script", "children": [{"type": "text", "text": "x"}]}
        ]}}));
        assert!(html.contains("<h2>x</h2>"));
    }

    #[test]
    fn numbered_lists_are_ordered() {
        let html = render(json!({"root": {"children": [
            {"type": "list", "listType": "number", "children": [
                {"type": "listitem", "children": [{"type": "text", "text": "one"}]}
            ]}
        ]}}));
        assert!(html.contains("<ol><li>one</li></ol>"));
    }

    #[test]
    fn internal_link_resolves_through_path_table() {
        let html = render(json!({"root": {"children": [
            {"type": "paragraph", "children": [
                {"type": "link", "fields": {
                    "linkType": "internal",
                    "doc": {"relationTo": "technical_posts", "value": {"slug": "rust"}}
                }, "children": [{"type": "text", "text": "Rust"}]}
            ]}
        ]}}));
        assert!(html.contains("<a href=\"/technical_posts/rust\" target=\"_self\">Rust</a>"));
    }

    #[test]
    fn new_tab_flag_forces_blank() {
        let html = render(json!({"root": {"children": [
            {"type": "link", "fields": {
                "linkType": "internal",
                "newTab": true,
                "doc": {"relationTo": "pages", "value": {"slug": "about"}}
            }, "children": [{"type": "text", "text": "About"}]}
        ]}}));
        assert!(html.contains("href=\"/about\""));
        assert!(html.contains("target=\"_blank\""));
        assert!(html.contains("rel=\"noopener noreferrer\""));
    }

    #[test]
    fn unknown_nodes_render_their_children() {
        let html = render(json!({"root": {"children": [
            {"type": "upload", "children": [{"type": "text", "text": "kept"}]}
        ]}}));
        assert_eq!(html, "<div class=\"rich-text\">kept</div>");
    }

    #[test]
    fn empty_document_renders_nothing() {
        assert_eq!(render(json!({"root": {"children": []}})), "");
        assert_eq!(render(Value::Null), "");
    }
}
