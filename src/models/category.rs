//! Per-brand category registry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{AttributeSpec, TokenFilter};

/// Categories discovered for each brand, keyed by brand then category name.
///
/// Category names are unique within a brand and ordered by name so that
/// descriptors and generated file lists are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRegistry {
    brands: BTreeMap<String, BTreeMap<String, AttributeSpec>>,
}

impl CategoryRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that a brand exists, even if it ends up with no categories.
    pub fn add_brand(&mut self, brand: &str) {
        self.brands.entry(brand.to_string()).or_default();
    }

    /// Registers a category for a brand, deriving its attribute spec from the name.
    pub fn register(&mut self, brand: &str, category: &str) {
        self.brands
            .entry(brand.to_string())
            .or_default()
            .insert(category.to_string(), AttributeSpec::for_category(category));
    }

    /// True if the brand was scanned.
    pub fn contains_brand(&self, brand: &str) -> bool {
        self.brands.contains_key(brand)
    }

    /// Category names for a brand in registry order. Unknown brands yield nothing.
    pub fn categories(&self, brand: &str) -> impl Iterator<Item = &str> {
        self.brands
            .get(brand)
            .into_iter()
            .flat_map(|categories| categories.keys().map(String::as_str))
    }

    /// Attribute spec recorded for a category, if any.
    pub fn spec(&self, brand: &str, category: &str) -> Option<&AttributeSpec> {
        self.brands.get(brand)?.get(category)
    }

    /// Builds the output filter for a brand's category.
    ///
    /// An unregistered category produces a filter that accepts every token.
    pub fn filter_for(&self, brand: &str, category: &str) -> TokenFilter {
        TokenFilter::category(category, self.spec(brand, category).cloned())
    }

    /// Brands in the registry.
    pub fn brands(&self) -> impl Iterator<Item = &str> {
        self.brands.keys().map(String::as_str)
    }
}
