//! Listing and search parameters.

use serde::Deserialize;

use sweetshop_core::DomainError;

use crate::Sweet;

pub const DEFAULT_LIMIT: u64 = 100;
pub const MAX_LIMIT: u64 = 1_000;

/// Offset/limit window over the catalog, ordered by creation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Page {
    pub skip: u64,
    pub limit: u64,
}

impl Page {
    /// Fill in defaults and clamp `limit` to `MAX_LIMIT`.
    pub fn new(skip: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            skip: skip.unwrap_or(0),
            limit: limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Search filters, combined with AND. Absent filters match everything.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SweetQuery {
    /// Case-insensitive substring of the name.
    #[serde(rename = "q")]
    pub name: Option<String>,
    /// Exact category.
    pub category: Option<String>,
    /// Inclusive lower price bound.
    pub price_min: Option<f64>,
    /// Inclusive upper price bound.
    pub price_max: Option<f64>,
}

impl SweetQuery {
    /// Blank text filters count as absent.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.filter(|s| !s.is_empty());
        self.category = self.category.filter(|s| !s.is_empty());
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        for (label, bound) in [("price_min", self.price_min), ("price_max", self.price_max)] {
            if let Some(v) = bound {
                if !v.is_finite() || v < 0.0 {
                    return Err(DomainError::validation(format!(
                        "{label} must be a non-negative number"
                    )));
                }
            }
        }
        Ok(())
    }

    /// True when the price bounds exclude every possible price.
    pub fn is_unsatisfiable(&self) -> bool {
        matches!((self.price_min, self.price_max), (Some(min), Some(max)) if min > max)
    }

    pub fn matches(&self, sweet: &Sweet) -> bool {
        if let Some(needle) = &self.name {
            if !sweet.name.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if &sweet.category != category {
                return false;
            }
        }
        if let Some(min) = self.price_min {
            if sweet.price < min {
                return false;
            }
        }
        if let Some(max) = self.price_max {
            if sweet.price > max {
                return false;
            }
        }
        true
    }
}
