//! The content-matrix block: rows of columns of content elements.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::lenient::{non_blank, opt_lenient, opt_string, select_value, string_or_null, vec_or_null};
use crate::link::LinkDescriptor;
use crate::media::MediaAsset;
use crate::reference::Reference;

/// Structured rich-text tree as stored by the editor. Opaque to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(transparent)]
pub struct RichTextDocument(pub Value);

impl RichTextDocument {
    /// True when the tree has no root children to render.
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::Object(map) => map
                .get("root")
                .and_then(|root| root.get("children"))
                .and_then(Value::as_array)
                .is_none_or(|children| children.is_empty()),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct RichTextElement {
    #[serde(default)]
    pub rich_text: Option<RichTextDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct MediaElement {
    #[serde(default)]
    pub media: Option<Reference<MediaAsset>>,
}

/// A button/link element: either the flat `linkText`/`linkURL` pair or a full
/// nested descriptor under `link`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct LinkElement {
    #[serde(default, rename = "linkText", deserialize_with = "string_or_null")]
    pub link_text: String,
    #[serde(
        default,
        rename = "linkURL",
        deserialize_with = "opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub link_url: Option<String>,
    #[serde(
        default,
        deserialize_with = "opt_lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub link: Option<LinkDescriptor>,
}

impl LinkElement {
    pub fn descriptor(&self) -> LinkDescriptor {
        match &self.link {
            Some(link) => {
                let mut link = link.clone();
                if non_blank(Some(&link.label)).is_none() {
                    link.label = self.link_text.clone();
                }
                link
            }
            None => LinkDescriptor {
                label: self.link_text.clone(),
                custom_url: self.link_url.clone(),
                ..LinkDescriptor::default()
            },
        }
    }
}

/// Smallest authorable unit inside a column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(tag = "blockType")]
pub enum ContentElement {
    #[serde(rename = "richtext-element")]
    RichText(RichTextElement),
    #[serde(rename = "media-element")]
    Media(MediaElement),
    #[serde(rename = "link-element")]
    Link(LinkElement),
    /// A block type this site does not register, or one whose payload could
    /// not be read.
    Unknown,
}

impl<'de> Deserialize<'de> for ContentElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let parsed = match block_type(&value) {
            Some("richtext-element") => serde_json::from_value(value).map(Self::RichText),
            Some("media-element") => serde_json::from_value(value).map(Self::Media),
            Some("link-element") => serde_json::from_value(value).map(Self::Link),
            _ => return Ok(Self::Unknown),
        };
        Ok(parsed.unwrap_or(Self::Unknown))
    }
}

/// The `blockType` discriminant of a block object, if it has one.
pub(crate) fn block_type(value: &Value) -> Option<&str> {
    value.get("blockType").and_then(Value::as_str).map(str::trim)
}

/// Column width in twelfths of the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum ColumnWidth {
    Quarter,
    #[default]
    Third,
    Half,
    TwoThirds,
    Full,
}

impl ColumnWidth {
    pub fn from_twelfths(span: u8) -> Option<Self> {
        match span {
            3 => Some(Self::Quarter),
            4 => Some(Self::Third),
            6 => Some(Self::Half),
            8 => Some(Self::TwoThirds),
            12 => Some(Self::Full),
            _ => None,
        }
    }

    pub fn twelfths(self) -> u8 {
        match self {
            Self::Quarter => 3,
            Self::Third => 4,
            Self::Half => 6,
            Self::TwoThirds => 8,
            Self::Full => 12,
        }
    }
}

impl Serialize for ColumnWidth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.twelfths().to_string())
    }
}

impl<'de> Deserialize<'de> for ColumnWidth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = select_value(deserializer)?;
        Ok(raw
            .and_then(|value| value.parse::<u8>().ok())
            .and_then(Self::from_twelfths)
            .unwrap_or_default())
    }
}

/// Row background treatment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum BackgroundStyle {
    #[default]
    None,
    Light,
    Dark,
}

impl BackgroundStyle {
    /// Static lookup from the stored tag; anything unrecognized is `None`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "light" | "light-gray" => Self::Light,
            "dark" | "dark-blue" => Self::Dark,
            _ => Self::None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl Serialize for BackgroundStyle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for BackgroundStyle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = select_value(deserializer)?;
        Ok(raw.as_deref().map(Self::from_tag).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Column {
    #[serde(default)]
    pub size: ColumnWidth,
    #[serde(default, deserialize_with = "vec_or_null")]
    pub content_elements: Vec<ContentElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Row {
    #[serde(
        default,
        deserialize_with = "opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub row_title: Option<String>,
    #[serde(default)]
    pub background_style: BackgroundStyle,
    #[serde(default, deserialize_with = "vec_or_null")]
    pub columns: Vec<Column>,
}

/// Root of the content-matrix block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Matrix {
    #[serde(default, deserialize_with = "vec_or_null")]
    pub rows: Vec<Row>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_element_variants() {
        let elements: Vec<ContentElement> = serde_json::from_value(json!([
            {"blockType": "richtext-element", "richText": {"root": {"children": []}}},
            {"blockType": "media-element", "media": "65f0c1"},
            {"blockType": "link-element", "linkText": "Go", "linkURL": "https://example.com"},
            {"blockType": "carousel", "slides": []}
        ]))
        .unwrap();
        assert!(matches!(elements[0], ContentElement::RichText(_)));
        assert!(matches!(elements[1], ContentElement::Media(_)));
        assert!(matches!(elements[2], ContentElement::Link(_)));
        assert_eq!(elements[3], ContentElement::Unknown);
    }

    #[test]
    fn column_width_accepts_strings_and_numbers() {
        let columns: Vec<Column> = serde_json::from_value(json!([
            {"size": "8"},
            {"size": 3},
            {"size": "5"},
            {}
        ]))
        .unwrap();
        let spans: Vec<u8> = columns.iter().map(|c| c.size.twelfths()).collect();
        assert_eq!(spans, vec![8, 3, 4, 4]);
    }

    #[test]
    fn background_style_falls_back_to_none() {
        let rows: Vec<Row> = serde_json::from_value(json!([
            {"backgroundStyle": "light-gray"},
            {"backgroundStyle": "dark"},
            {"backgroundStyle": "unknown-value"},
            {"backgroundStyle": null}
        ]))
        .unwrap();
        let styles: Vec<BackgroundStyle> = rows.iter().map(|r| r.background_style).collect();
        assert_eq!(
            styles,
            vec![
                BackgroundStyle::Light,
                BackgroundStyle::Dark,
                BackgroundStyle::None,
                BackgroundStyle::None
            ]
        );
    }

    #[test]
    fn null_collections_are_empty() {
        let matrix: Matrix =
            serde_json::from_value(json!({"rows": [{"columns": null}]})).unwrap();
        assert!(matrix.rows[0].columns.is_empty());
    }

    #[test]
    fn malformed_elements_do_not_fail_the_column() {
        let matrix: Matrix = serde_json::from_value(json!({"rows": [{"columns": [
            {"size": "12", "contentElements": [
                {"blockType": "link-element", "linkText": "ok", "linkURL": "https://example.com"},
                {"linkText": "no discriminant"},
                {"blockType": 7},
                {"blockType": "media-element", "media": 42},
                {"blockType": "media-element", "media": [1]},
                {"blockType": "link-element", "linkText": null, "link": "not-an-object"},
                "stray string"
            ]}
        ]}]}))
        .unwrap();
        let elements = &matrix.rows[0].columns[0].content_elements;
        assert_eq!(elements.len(), 6);
        assert!(matches!(&elements[0], ContentElement::Link(link) if link.link_text == "ok"));
        assert_eq!(elements[1], ContentElement::Unknown);
        assert_eq!(elements[2], ContentElement::Unknown);
        assert_eq!(
            elements[3],
            ContentElement::Media(MediaElement {
                media: Some(Reference::Id("42".into()))
            })
        );
        assert_eq!(
            elements[4],
            ContentElement::Media(MediaElement {
                media: Some(Reference::Invalid)
            })
        );
        assert_eq!(elements[5], ContentElement::Link(LinkElement::default()));
    }

    #[test]
    fn non_object_rows_and_columns_are_skipped() {
        let matrix: Matrix = serde_json::from_value(json!({"rows": [
            42,
            {"rowTitle": 9, "columns": "none", "backgroundStyle": {"x": 1}}
        ]}))
        .unwrap();
        assert_eq!(matrix.rows.len(), 1);
        assert_eq!(matrix.rows[0].row_title.as_deref(), Some("9"));
        assert!(matrix.rows[0].columns.is_empty());
        assert_eq!(matrix.rows[0].background_style, BackgroundStyle::None);
    }

    #[test]
    fn flat_link_element_becomes_custom_descriptor() {
        let element = LinkElement {
            link_text: "Docs".into(),
            link_url: Some("https://docs.example.com".into()),
            link: None,
        };
        let descriptor = element.descriptor();
        assert_eq!(descriptor.label, "Docs");
        assert_eq!(descriptor.custom_url.as_deref(), Some("https://docs.example.com"));
    }

    #[test]
    fn empty_rich_text_detected() {
        assert!(RichTextDocument(json!({"root": {"children": []}})).is_empty());
        assert!(RichTextDocument(Value::Null).is_empty());
        assert!(!RichTextDocument(json!({"root": {"children": [{"type": "paragraph"}]}})).is_empty());
    }

    #[cfg(feature = "schema")]
    #[test]
    fn matrix_schema_describes_rows() {
        let schema = serde_json::to_value(schemars::schema_for!(Matrix)).unwrap();
        assert!(schema["properties"]["rows"].is_object());
    }
}
