//! Output filters selecting which tokens land in which file.
//!
//! Filters are plain data so build descriptors can be printed, compared in
//! tests and handed to an external engine. Every filter is evaluated through
//! [`TokenFilter::matches`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Token;

/// Attribute values a token must carry to belong to a category.
///
/// Derived solely from the category name: `{ category: <name> }`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttributeSpec {
    /// Required attribute key/value pairs.
    pub attributes: BTreeMap<String, String>,
}

impl AttributeSpec {
    /// Spec for a category name.
    pub fn for_category(category: &str) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert("category".to_string(), category.to_string());
        Self { attributes }
    }

    /// Returns true if every declared attribute is present on the token with
    /// an identical string value. An empty spec accepts every token.
    pub fn accepts(&self, token: &Token) -> bool {
        if self.attributes.is_empty() {
            return true;
        }
        let Some(token_attributes) = token.attributes.as_ref() else {
            return false;
        };
        self.attributes.iter().all(|(key, expected)| {
            token_attributes
                .get(key)
                .and_then(serde_json::Value::as_str)
                == Some(expected.as_str())
        })
    }
}

/// Predicate selecting the tokens written to one output file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TokenFilter {
    /// Every token passes.
    #[default]
    Unfiltered,
    /// Tokens belonging to one category of the brand being built.
    ///
    /// `spec` is `None` when the brand has no such category registered; the
    /// filter then accepts every token rather than none.
    Category {
        /// Category name.
        name: String,
        /// Attribute spec recorded in the category registry.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        spec: Option<AttributeSpec>,
    },
    /// Tokens belonging to a theme variant, independent of brand and category.
    Theme {
        /// Theme identifier.
        theme: String,
    },
}

impl TokenFilter {
    /// Category filter with its registered attribute spec.
    pub fn category(name: impl Into<String>, spec: Option<AttributeSpec>) -> Self {
        Self::Category {
            name: name.into(),
            spec,
        }
    }

    /// Theme filter for an identifier.
    pub fn theme(theme: impl Into<String>) -> Self {
        Self::Theme {
            theme: theme.into(),
        }
    }

    /// True for [`TokenFilter::Unfiltered`]; used to omit it when serializing.
    pub fn is_unfiltered(&self) -> bool {
        matches!(self, Self::Unfiltered)
    }

    /// Evaluates the filter against a token.
    pub fn matches(&self, token: &Token) -> bool {
        match self {
            Self::Unfiltered => true,
            Self::Category { spec, .. } => spec.as_ref().map_or(true, |spec| spec.accepts(token)),
            Self::Theme { theme } => matches_theme(theme, token),
        }
    }
}

/// A token belongs to a theme if its type, its nested value type, or any of
/// its path segments equals the theme identifier.
fn matches_theme(theme: &str, token: &Token) -> bool {
    if token.token_type.as_deref() == Some(theme) {
        return true;
    }

    if token
        .value
        .get("type")
        .and_then(serde_json::Value::as_str)
        == Some(theme)
    {
        return true;
    }

    token.path.iter().any(|segment| segment == theme)
}
