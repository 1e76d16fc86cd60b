//! Hero plus section cards for the site root.

use folio_content::{Homepage, HomepageSection, Reference, non_blank};

use crate::context::RenderContext;
use crate::view::{Element, ViewNode, css_url};

pub const HOMEPAGE_PLACEHOLDER: &str = "Loading homepage content or content not found...";
pub const DEFAULT_CARD_BACKGROUND: &str = "#f9f9f9";
pub const DEFAULT_CARD_TEXT_COLOR: &str = "#000";
const ICON_SIZE: u32 = 96;

const CARD_CLASSES: &str = "relative p-8 rounded-2xl shadow-xl border border-gray-300 dark:border-gray-700 flex flex-col justify-start items-center transition-transform duration-300 hover:scale-105";
const CARD_LINK_CLASSES: &str = "block py-2 px-4 rounded-lg bg-white/20 hover:bg-white/30 transition-colors text-center text-xl font-semibold";

/// Renders the homepage, or the placeholder when the global could not be read.
pub fn render_homepage(homepage: Option<&Homepage>, context: &RenderContext) -> ViewNode {
    match homepage {
        Some(homepage) => render_hero(homepage, context),
        None => render_placeholder(),
    }
}

pub fn render_placeholder() -> ViewNode {
    Element::new("div")
        .class("flex items-center justify-center min-h-[50vh]")
        .child(Element::new("p").text(HOMEPAGE_PLACEHOLDER))
        .into()
}

fn render_hero(homepage: &Homepage, context: &RenderContext) -> ViewNode {
    let description = non_blank(homepage.main_description.as_deref()).map(|text| {
        ViewNode::from(
            Element::new("p")
                .class("text-xl max-w-3xl mx-auto mb-16 leading-relaxed font-serif")
                .text(text),
        )
    });
    let cards = Element::new("div")
        .class("grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-8")
        .children(
            homepage
                .sections
                .iter()
                .map(|section| render_section(section, context)),
        );
    let content = Element::new("div")
        .class("py-24 text-center max-w-7xl mx-auto px-4")
        .child(
            Element::new("h1")
                .class("text-6xl font-extrabold mb-4 font-[serif] italic")
                .text(homepage.main_title.clone()),
        )
        .children(description)
        .child(cards);

    Element::new("div")
        .class("min-h-screen w-full relative overflow-hidden")
        .style_opt("background-image", homepage.background_url().map(css_url).as_deref())
        .style("background-size", "cover")
        .style("background-position", "center")
        .style("color", homepage.hero_text_color())
        .style_opt("font-family", non_blank(homepage.font_family.as_deref()))
        .style_opt("font-size", non_blank(homepage.font_size.as_deref()))
        .child(Element::new("div").class("absolute inset-0 bg-black/50 z-0"))
        .child(Element::new("div").class("relative z-10").child(content))
        .into()
}

/// One card. Colors, background and icon fall back independently.
pub fn render_section(section: &HomepageSection, context: &RenderContext) -> ViewNode {
    let text_color = non_blank(section.text_color.as_deref()).unwrap_or(DEFAULT_CARD_TEXT_COLOR);
    let background_color =
        non_blank(section.background_color.as_deref()).unwrap_or(DEFAULT_CARD_BACKGROUND);
    let background_image = section
        .background_image
        .as_ref()
        .and_then(Reference::url)
        .map(css_url);
    let icon = section
        .icon
        .as_ref()
        .and_then(Reference::url)
        .unwrap_or(&context.site.default_icon);

    let mut card = Element::new("div")
        .class(CARD_CLASSES)
        .style("background-color", background_color)
        .style_opt("background-image", background_image.as_deref())
        .style("background-size", "cover")
        .style("background-position", "center")
        .style("color", text_color)
        .style_opt("font-family", non_blank(section.font_family.as_deref()))
        .style_opt("font-size", non_blank(section.font_size.as_deref()));
    if is_white_text(section.text_color.as_deref()) {
        card = card.class("text-light");
    }

    card = card.child(
        Element::new("h2")
            .class("text-4xl font-bold mb-2 font-[serif] italic")
            .text(section.section_title.clone()),
    );
    if let Some(subtitle) = non_blank(section.section_subtitle.as_deref()) {
        card = card.child(
            Element::new("p")
                .class("text-lg mb-4 font-serif text-center")
                .text(subtitle),
        );
    }
    card = card.child(
        Element::new("img")
            .attr("src", icon)
            .attr("alt", format!("{} icon", section.section_title))
            .attr("width", ICON_SIZE)
            .attr("height", ICON_SIZE)
            .class("object-contain mb-6"),
    );
    if !section.links.is_empty() {
        let items = section.links.iter().map(|link| {
            let resolved = context.resolve(link);
            ViewNode::from(
                Element::new("li").child(
                    Element::new("a")
                        .attr("href", &resolved.href)
                        .attr("target", resolved.target.as_attr())
                        .attr_opt("rel", resolved.target.rel())
                        .class(CARD_LINK_CLASSES)
                        .style("color", text_color)
                        .text(link.label.clone()),
                ),
            )
        });
        card = card.child(
            Element::new("ul")
                .class("text-lg space-y-2 w-full")
                .children(items),
        );
    }
    card.into()
}

fn is_white_text(color: Option<&str>) -> bool {
    color
        .map(|color| color.trim().to_ascii_lowercase())
        .is_some_and(|color| color == "#ffffff" || color == "white")
}
