//! Column and row composition on a twelve-column grid.

use folio_content::{BackgroundStyle, Column, Row};

use crate::context::RenderContext;
use crate::element::render_element;
use crate::view::{Element, ViewNode};

pub const GRID_CLASSES: &str = "grid grid-cols-4 md:grid-cols-12 gap-y-12 md:gap-x-16";
pub const ELEMENT_SPACING: &str = "mb-4 last:mb-0";

/// Visual treatment for a row background.
pub fn background_class(style: BackgroundStyle) -> &'static str {
    match style {
        BackgroundStyle::None => "",
        BackgroundStyle::Light => "bg-gray-100 dark:bg-gray-800",
        BackgroundStyle::Dark => "bg-blue-900 text-white dark:bg-blue-950",
    }
}

/// A sized grid cell holding its elements in order.
///
/// Full width on small screens, the configured span from `lg` up. Elements
/// that render nothing get no wrapper.
pub fn render_column(column: &Column, context: &RenderContext) -> ViewNode {
    let span = column.size.twelfths();
    let elements = column
        .content_elements
        .iter()
        .map(|element| render_element(element, context))
        .filter(|node| !node.is_empty())
        .map(|node| ViewNode::from(Element::new("div").class(ELEMENT_SPACING).child(node)));
    Element::new("div")
        .class(format!("col-span-4 lg:col-span-{span}"))
        .attr("data-span", span)
        .children(elements)
        .into()
}

/// A full-width band: optional title above the grid of columns.
pub fn render_row(row: &Row, context: &RenderContext) -> ViewNode {
    let title = row
        .row_title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(|title| ViewNode::from(Element::new("h2").class("mb-8").text(title)));
    let grid = Element::new("div").class(GRID_CLASSES).children(
        row.columns
            .iter()
            .map(|column| render_column(column, context)),
    );
    let container = Element::new("div")
        .class("container")
        .children(title)
        .child(grid);
    Element::new("section")
        .class("py-16")
        .class(background_class(row.background_style))
        .attr("data-background", row.background_style.tag())
        .child(container)
        .into()
}
