use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A node of the rendered view tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewNode {
    Element(Element),
    Text(String),
    Fragment(Vec<ViewNode>),
}

impl ViewNode {
    /// Renders nothing.
    pub fn empty() -> Self {
        ViewNode::Fragment(Vec::new())
    }

    pub fn text(text: impl Into<String>) -> Self {
        ViewNode::Text(text.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ViewNode::Element(_) => false,
            ViewNode::Text(text) => text.is_empty(),
            ViewNode::Fragment(children) => children.iter().all(ViewNode::is_empty),
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            ViewNode::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Depth-first search for elements with `tag`.
    pub fn find_all<'a>(&'a self, tag: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect(tag, &mut found);
        found
    }

    fn collect<'a>(&'a self, tag: &str, found: &mut Vec<&'a Element>) {
        match self {
            ViewNode::Element(element) => {
                if element.tag == tag {
                    found.push(element);
                }
                for child in &element.children {
                    child.collect(tag, found);
                }
            }
            ViewNode::Fragment(children) => {
                for child in children {
                    child.collect(tag, found);
                }
            }
            ViewNode::Text(_) => {}
        }
    }

    /// Concatenated text content.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        match self {
            ViewNode::Text(text) => out.push_str(text),
            ViewNode::Element(element) => {
                for child in &element.children {
                    child.push_text(out);
                }
            }
            ViewNode::Fragment(children) => {
                for child in children {
                    child.push_text(out);
                }
            }
        }
    }
}

impl From<Element> for ViewNode {
    fn from(element: Element) -> Self {
        ViewNode::Element(element)
    }
}

/// An element with attributes kept in a stable order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ViewNode>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.attrs.insert(name.into(), value.to_string());
        self
    }

    pub fn attr_opt(self, name: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.attr(name, value),
            None => self,
        }
    }

    /// Appends classes; blank input is ignored.
    pub fn class(mut self, classes: impl AsRef<str>) -> Self {
        let classes = classes.as_ref().trim();
        if classes.is_empty() {
            return self;
        }
        self.attrs
            .entry("class".to_string())
            .and_modify(|existing| {
                existing.push(' ');
                existing.push_str(classes);
            })
            .or_insert_with(|| classes.to_string());
        self
    }

    /// Appends one `name: value;` declaration to the inline style.
    pub fn style(mut self, name: &str, value: impl AsRef<str>) -> Self {
        let declaration = format!("{name}: {};", value.as_ref());
        self.attrs
            .entry("style".to_string())
            .and_modify(|existing| {
                existing.push(' ');
                existing.push_str(&declaration);
            })
            .or_insert(declaration);
        self
    }

    pub fn style_opt(self, name: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.style(name, value),
            None => self,
        }
    }

    pub fn child(mut self, child: impl Into<ViewNode>) -> Self {
        let child = child.into();
        if !matches!(&child, ViewNode::Fragment(children) if children.is_empty()) {
            self.children.push(child);
        }
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = ViewNode>) -> Self {
        for child in children {
            self = self.child(child);
        }
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(ViewNode::Text(text.into()))
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }
}

/// `url("…")` for inline background images.
pub fn css_url(url: &str) -> String {
    format!("url(\"{}\")", url.replace('"', "%22"))
}
