use folio_content::{ContentElement, LinkDescriptor, ResolvedLink, try_resolve};
use tracing::debug;

use crate::asset::render_media;
use crate::context::RenderContext;
use crate::view::{Element, ViewNode};

/// Renders one content element. Unknown element types render nothing.
pub fn render_element(element: &ContentElement, context: &RenderContext) -> ViewNode {
    match element {
        ContentElement::RichText(rich_text) => match &rich_text.rich_text {
            Some(document) => context.rich_text().render(document, context),
            None => ViewNode::empty(),
        },
        ContentElement::Media(media) => match &media.media {
            Some(reference) => render_media(reference, context.assets()),
            None => ViewNode::empty(),
        },
        ContentElement::Link(link) => render_link(&link.descriptor(), context),
        ContentElement::Unknown => ViewNode::empty(),
    }
}

/// Anchor for a link descriptor. Unresolvable links stay visible as `#`.
pub fn render_link(link: &LinkDescriptor, context: &RenderContext) -> ViewNode {
    let resolved = try_resolve(link, &context.link_policy).unwrap_or_else(|err| {
        debug!(label = %link.label, error = %err, "rendering dead link");
        ResolvedLink::dead()
    });
    Element::new("a")
        .attr("href", &resolved.href)
        .attr("target", resolved.target.as_attr())
        .attr_opt("rel", resolved.target.rel())
        .class("button")
        .text(link.label.trim())
        .into()
}
