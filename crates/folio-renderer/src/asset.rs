use folio_content::{MediaAsset, Reference};
use tracing::debug;

use crate::view::{Element, ViewNode};

/// Renders a stored upload.
pub trait AssetRenderer: Send + Sync {
    fn render(&self, asset: &MediaAsset) -> ViewNode;
}

/// `<img>` for images, `<video>` for video MIME types.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageAssetRenderer;

impl AssetRenderer for ImageAssetRenderer {
    fn render(&self, asset: &MediaAsset) -> ViewNode {
        let Some(url) = asset.resolved_url() else {
            return ViewNode::empty();
        };
        if asset.is_video() {
            let mut video = Element::new("video")
                .attr("controls", "")
                .attr("playsinline", "")
                .class("w-full h-auto");
            video = video.child(
                Element::new("source")
                    .attr("src", url)
                    .attr_opt("type", asset.mime_type.as_deref()),
            );
            return video.into();
        }
        Element::new("img")
            .attr("src", url)
            .attr("alt", asset.alt.as_deref().unwrap_or_default())
            .attr_opt("width", asset.width)
            .attr_opt("height", asset.height)
            .attr("loading", "lazy")
            .class("w-full h-auto")
            .into()
    }
}

/// Renders a media relationship; bare ids and unreadable values render nothing.
pub fn render_media(reference: &Reference<MediaAsset>, assets: &dyn AssetRenderer) -> ViewNode {
    match reference {
        Reference::Resolved(asset) => assets.render(asset),
        Reference::Id(id) => {
            debug!(media_id = %id, "media reference not populated; skipping");
            ViewNode::empty()
        }
        Reference::Invalid => {
            debug!("media reference unreadable; skipping");
            ViewNode::empty()
        }
    }
}
