use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::lenient::string_or_null;

/// A relationship field: either the bare id the CMS stores, or the referenced
/// document when it was populated into the response.
///
/// Anything else (an object that does not parse, an array, a bool) reads as
/// `Invalid`, which renders like an id that cannot be looked up.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(untagged)]
pub enum Reference<T> {
    Resolved(T),
    Id(String),
    Invalid,
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Reference<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(id) => Reference::Id(id),
            Value::Number(id) => Reference::Id(id.to_string()),
            value @ Value::Object(_) => serde_json::from_value(value)
                .map(Reference::Resolved)
                .unwrap_or(Reference::Invalid),
            _ => Reference::Invalid,
        })
    }
}

impl<T> Reference<T> {
    pub fn resolved(&self) -> Option<&T> {
        match self {
            Reference::Resolved(value) => Some(value),
            Reference::Id(_) | Reference::Invalid => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Reference::Resolved(_))
    }

    fn missing() -> Self {
        Reference::Invalid
    }

    pub fn unresolved_id(&self) -> Option<&str> {
        match self {
            Reference::Id(id) => Some(id),
            Reference::Resolved(_) | Reference::Invalid => None,
        }
    }
}

/// A relationship that may point into more than one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", bound(deserialize = "T: DeserializeOwned"))]
pub struct PolymorphicRef<T> {
    #[serde(default, deserialize_with = "string_or_null")]
    pub relation_to: String,
    #[serde(default = "Reference::missing")]
    pub value: Reference<T>,
}

impl<T> PolymorphicRef<T> {
    pub fn resolved(relation_to: impl Into<String>, value: T) -> Self {
        Self {
            relation_to: relation_to.into(),
            value: Reference::Resolved(value),
        }
    }

    pub fn id(relation_to: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            relation_to: relation_to.into(),
            value: Reference::Id(id.into()),
        }
    }
}
