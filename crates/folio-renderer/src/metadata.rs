use folio_content::{Document, Homepage, non_blank};
use serde::{Deserialize, Serialize};

use crate::context::SiteDefaults;

/// Head metadata for a rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl PageMetadata {
    pub fn site_default(site: &SiteDefaults) -> Self {
        Self {
            title: site.title.clone(),
            description: None,
            image: None,
        }
    }
}

/// Homepage metadata: explicit `meta` first, then the hero fields, then the
/// site default title with no image.
pub fn homepage_metadata(homepage: Option<&Homepage>, site: &SiteDefaults) -> PageMetadata {
    let Some(homepage) = homepage else {
        return PageMetadata::site_default(site);
    };
    let meta = homepage.meta.as_ref();
    let title = meta
        .and_then(|meta| meta.title())
        .or_else(|| non_blank(Some(&homepage.main_title)))
        .unwrap_or(&site.title);
    let description = meta
        .and_then(|meta| meta.description())
        .or_else(|| non_blank(homepage.main_description.as_deref()));
    let image = meta
        .and_then(|meta| meta.image_url())
        .or_else(|| homepage.background_url());
    PageMetadata {
        title: title.to_string(),
        description: description.map(str::to_string),
        image: image.map(str::to_string),
    }
}

/// Document metadata: `meta`, then the document title, then the site default.
pub fn document_metadata(document: &Document, site: &SiteDefaults) -> PageMetadata {
    let meta = document.meta.as_ref();
    let title = meta
        .and_then(|meta| meta.title())
        .or_else(|| document.title())
        .unwrap_or(&site.title);
    PageMetadata {
        title: title.to_string(),
        description: meta.and_then(|meta| meta.description()).map(str::to_string),
        image: meta.and_then(|meta| meta.image_url()).map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn site() -> SiteDefaults {
        SiteDefaults {
            title: "Portfolio".into(),
            ..SiteDefaults::default()
        }
    }

    #[test]
    fn missing_homepage_uses_site_default() {
        assert_eq!(
            homepage_metadata(None, &site()),
            PageMetadata {
                title: "Portfolio".into(),
                description: None,
                image: None
            }
        );
    }

    #[test]
    fn homepage_fields_feed_metadata() {
        let homepage: Homepage = serde_json::from_value(json!({
            "mainTitle": "Upasana",
            "mainDescription": "Dancer and engineer",
            "backgroundImage": {"url": "/media/bg.jpg"}
        }))
        .unwrap();
        let metadata = homepage_metadata(Some(&homepage), &site());
        assert_eq!(metadata.title, "Upasana");
        assert_eq!(metadata.description.as_deref(), Some("Dancer and engineer"));
        assert_eq!(metadata.image.as_deref(), Some("/media/bg.jpg"));
    }

    #[test]
    fn explicit_meta_wins() {
        let homepage: Homepage = serde_json::from_value(json!({
            "mainTitle": "Upasana",
            "meta": {"title": "Home | Upasana", "image": "unpopulated-id"}
        }))
        .unwrap();
        let metadata = homepage_metadata(Some(&homepage), &site());
        assert_eq!(metadata.title, "Home | Upasana");
        assert_eq!(metadata.image, None);
    }

    #[test]
    fn blank_title_falls_back() {
        let homepage = Homepage {
            main_title: "  ".into(),
            ..Homepage::default()
        };
        assert_eq!(homepage_metadata(Some(&homepage), &site()).title, "Portfolio");

        let document = Document {
            slug: "x".into(),
            ..Document::default()
        };
        assert_eq!(document_metadata(&document, &site()).title, "Portfolio");
    }
}
