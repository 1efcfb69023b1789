//! Hard structured filters applied to query candidates.
//!
//! All supplied filters must hold (logical AND). Size and category comparisons
//! ignore case; price bounds are inclusive and exclude documents without a price.

use crate::error::{EngineError, Result};
use crate::Document;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
}

impl Filters {
    pub fn new() -> Self { Self::default() }

    pub fn size(mut self, size: impl Into<String>) -> Self { self.size = Some(size.into()); self }
    pub fn category(mut self, category: impl Into<String>) -> Self { self.category = Some(category.into()); self }
    pub fn min_price(mut self, price: f64) -> Self { self.min_price = Some(price); self }
    pub fn max_price(mut self, price: f64) -> Self { self.max_price = Some(price); self }

    /// Validate and normalize into a matcher. Blank size/category values count as unset.
    pub(crate) fn compile(&self) -> Result<CompiledFilters> {
        for (name, bound) in [("minPrice", self.min_price), ("maxPrice", self.max_price)] {
            if bound.is_some_and(|p| !p.is_finite()) {
                return Err(EngineError::invalid_argument(format!("{name} must be a finite number")));
            }
        }
        let non_blank = |s: &Option<String>| s.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        Ok(CompiledFilters {
            size: non_blank(&self.size).map(|s| s.to_uppercase()),
            category: non_blank(&self.category).map(|s| s.to_lowercase()),
            min_price: self.min_price,
            max_price: self.max_price,
        })
    }
}

#[derive(Debug)]
pub(crate) struct CompiledFilters {
    size: Option<String>,
    category: Option<String>,
    min_price: Option<f64>,
    max_price: Option<f64>,
}

impl CompiledFilters {
    pub(crate) fn matches(&self, doc: &Document) -> bool {
        if let Some(size) = &self.size {
            if !doc.sizes.iter().any(|s| s.to_uppercase() == *size) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            match &doc.category {
                Some(c) if c.to_lowercase() == *category => {}
                _ => return false,
            }
        }
        if let Some(min) = self.min_price {
            if !doc.price.is_some_and(|p| p >= min) {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if !doc.price.is_some_and(|p| p <= max) {
                return false;
            }
        }
        true
    }
}
