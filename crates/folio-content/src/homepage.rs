use serde::{Deserialize, Serialize};

use crate::document::Meta;
use crate::lenient::{non_blank, opt_lenient, opt_string, string_or_null, vec_or_null};
use crate::link::LinkDescriptor;
use crate::media::MediaAsset;
use crate::reference::Reference;

pub const DEFAULT_HERO_TEXT_COLOR: &str = "#ffffff";

/// The `homepage` global: a hero plus (exactly two, upstream-enforced) cards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Homepage {
    #[serde(default, deserialize_with = "string_or_null")]
    pub main_title: String,
    #[serde(default, deserialize_with = "opt_string")]
    pub main_description: Option<String>,
    #[serde(default)]
    pub background_image: Option<Reference<MediaAsset>>,
    #[serde(default, deserialize_with = "opt_string")]
    pub text_color: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub font_family: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub font_size: Option<String>,
    #[serde(default, deserialize_with = "vec_or_null")]
    pub sections: Vec<HomepageSection>,
    #[serde(
        default,
        deserialize_with = "opt_lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub meta: Option<Meta>,
}

impl Homepage {
    pub fn hero_text_color(&self) -> &str {
        non_blank(self.text_color.as_deref()).unwrap_or(DEFAULT_HERO_TEXT_COLOR)
    }

    pub fn background_url(&self) -> Option<&str> {
        self.background_image.as_ref().and_then(Reference::url)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct HomepageSection {
    #[serde(default, deserialize_with = "string_or_null")]
    pub section_title: String,
    #[serde(default, deserialize_with = "opt_string")]
    pub section_subtitle: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub background_color: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub text_color: Option<String>,
    #[serde(default)]
    pub background_image: Option<Reference<MediaAsset>>,
    #[serde(default)]
    pub icon: Option<Reference<MediaAsset>>,
    #[serde(default, deserialize_with = "opt_string")]
    pub font_family: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub font_size: Option<String>,
    #[serde(default, deserialize_with = "vec_or_null")]
    pub links: Vec<LinkDescriptor>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_cms_global() {
        let homepage: Homepage = serde_json::from_value(json!({
            "mainTitle": "Upasana's Something",
            "textColor": "",
            "backgroundImage": {"url": "/media/hero.jpg"},
            "sections": [
                {
                    "sectionTitle": "Arts",
                    "backgroundColor": "#FF7F50",
                    "textColor": "#FFFFFF",
                    "links": [
                        {"label": "Dance", "linkType": "internal",
                         "internalPage": {"relationTo": "pages", "value": {"slug": "dance"}}}
                    ]
                },
                {"sectionTitle": "Sciences", "links": null}
            ]
        }))
        .unwrap();
        assert_eq!(homepage.hero_text_color(), DEFAULT_HERO_TEXT_COLOR);
        assert_eq!(homepage.background_url(), Some("/media/hero.jpg"));
        assert_eq!(homepage.sections.len(), 2);
        assert_eq!(homepage.sections[0].links.len(), 1);
        assert!(homepage.sections[1].links.is_empty());
    }

    #[test]
    fn null_link_label_keeps_the_homepage() {
        let homepage: Homepage = serde_json::from_value(json!({
            "mainTitle": "Welcome",
            "backgroundImage": 12,
            "meta": "oops",
            "sections": [
                {"sectionTitle": "Arts", "icon": false, "links": [
                    {"label": null, "linkType": "custom", "customUrl": "https://example.com"},
                    "not a link"
                ]},
                {"sectionTitle": null, "textColor": 255}
            ]
        }))
        .unwrap();
        assert_eq!(homepage.main_title, "Welcome");
        assert_eq!(homepage.background_url(), None);
        assert!(homepage.meta.is_none());
        assert_eq!(homepage.sections[0].links.len(), 1);
        assert_eq!(homepage.sections[0].links[0].label, "");
        assert_eq!(homepage.sections[0].icon, Some(Reference::Invalid));
        assert_eq!(homepage.sections[1].section_title, "");
        assert_eq!(homepage.sections[1].text_color.as_deref(), Some("255"));
    }
}
