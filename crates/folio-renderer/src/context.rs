use std::env;
use std::fmt;
use std::sync::Arc;

use folio_content::{LinkDescriptor, LinkPolicy, LinkTarget, ResolvedLink, resolve};

use crate::asset::{AssetRenderer, ImageAssetRenderer};
use crate::richtext::{LexicalRichText, RichTextRenderer};

pub const CUSTOM_LINK_TARGET_ENV: &str = "FOLIO_CUSTOM_LINK_TARGET";
pub const DEFAULT_SITE_TITLE: &str = "Folio";
pub const DEFAULT_SECTION_ICON: &str = "/default-icon.png";

/// Site-wide fallbacks used when content leaves a field empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteDefaults {
    pub title: String,
    pub default_icon: String,
}

impl Default for SiteDefaults {
    fn default() -> Self {
        Self {
            title: DEFAULT_SITE_TITLE.to_string(),
            default_icon: DEFAULT_SECTION_ICON.to_string(),
        }
    }
}

/// Everything a render pass needs besides the content itself.
#[derive(Clone)]
pub struct RenderContext {
    pub link_policy: LinkPolicy,
    pub site: SiteDefaults,
    rich_text: Arc<dyn RichTextRenderer>,
    assets: Arc<dyn AssetRenderer>,
}

impl RenderContext {
    pub fn new(link_policy: LinkPolicy) -> Self {
        Self {
            link_policy,
            site: SiteDefaults::default(),
            rich_text: Arc::new(LexicalRichText),
            assets: Arc::new(ImageAssetRenderer),
        }
    }

    /// Default context with the link policy taken from the environment.
    pub fn from_env() -> Self {
        Self::new(link_policy_from_env(LinkPolicy::default()))
    }

    pub fn with_site(mut self, site: SiteDefaults) -> Self {
        self.site = site;
        self
    }

    pub fn with_rich_text(mut self, renderer: Arc<dyn RichTextRenderer>) -> Self {
        self.rich_text = renderer;
        self
    }

    pub fn with_assets(mut self, renderer: Arc<dyn AssetRenderer>) -> Self {
        self.assets = renderer;
        self
    }

    pub fn rich_text(&self) -> &dyn RichTextRenderer {
        self.rich_text.as_ref()
    }

    pub fn assets(&self) -> &dyn AssetRenderer {
        self.assets.as_ref()
    }

    pub fn resolve(&self, link: &LinkDescriptor) -> ResolvedLink {
        resolve(link, &self.link_policy)
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(LinkPolicy::default())
    }
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("link_policy", &self.link_policy)
            .field("site", &self.site)
            .finish_non_exhaustive()
    }
}

/// Reads the custom-link target from `FOLIO_CUSTOM_LINK_TARGET`, keeping
/// `fallback` when it is unset or unrecognized.
pub fn link_policy_from_env(fallback: LinkPolicy) -> LinkPolicy {
    env::var(CUSTOM_LINK_TARGET_ENV)
        .ok()
        .and_then(|value| LinkTarget::parse(&value))
        .map(|custom_target| LinkPolicy { custom_target })
        .unwrap_or(fallback)
}
