//! Compiled design token as seen by output filters and renderers.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A single flattened design token.
///
/// `path` is the sequence of keys leading to the token in the merged source
/// tree; `attributes` carries the category/type/item classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Dotless name segments joined by the platform's naming rule.
    pub name: String,
    /// Path of keys from the root of the token tree.
    pub path: Vec<String>,
    /// Resolved value. May be a nested object for composite tokens.
    pub value: Value,
    /// Declared token type (`type` or `$type` in the source).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Classification attributes; `None` when the token carries none at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, Value>>,
    /// Optional human description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Token {
    /// Creates a token from a path and value with no type or attributes.
    pub fn new(path: &[&str], value: Value) -> Self {
        Self {
            name: path.join("-"),
            path: path.iter().map(|s| (*s).to_string()).collect(),
            value,
            token_type: None,
            attributes: None,
            comment: None,
        }
    }

    /// Sets the declared type.
    pub fn with_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = Some(token_type.into());
        self
    }

    /// Sets a single string attribute, creating the attribute map if needed.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), Value::String(value.into()));
        self
    }

    /// Looks up a string attribute.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.as_ref()?.get(key)?.as_str()
    }

    /// Renders the value as it should appear in a flat output file.
    pub fn value_string(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}
