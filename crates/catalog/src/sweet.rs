//! Catalog item model and its invariants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sweetshop_core::{DomainError, SweetId};

use crate::StockChange;

// ─────────────────────────────────────────────────────────────────────────────
// Sweet
// ─────────────────────────────────────────────────────────────────────────────

/// A catalog item.
///
/// # Invariants
/// - `quantity >= 0` at all times.
/// - `price` is finite and `>= 0`.
/// - `name` and `category` are non-blank.
/// - `updated_at` moves on every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sweet {
    pub id: SweetId,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sweet {
    /// Remove `amount` units if that many are in stock.
    pub fn decrement(&mut self, amount: i64, now: DateTime<Utc>) -> StockChange {
        if self.quantity < amount {
            return StockChange::Insufficient {
                available: self.quantity,
            };
        }
        self.quantity -= amount;
        self.updated_at = now;
        StockChange::Applied(self.quantity)
    }

    /// Add `amount` units. No upper bound beyond the integer range.
    pub fn increment(&mut self, amount: i64, now: DateTime<Utc>) -> StockChange {
        match self.quantity.checked_add(amount) {
            Some(q) => {
                self.quantity = q;
                self.updated_at = now;
                StockChange::Applied(q)
            }
            None => StockChange::Overflow,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Create / update inputs
// ─────────────────────────────────────────────────────────────────────────────

/// Input for creating a sweet.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewSweet {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub quantity: i64,
}

impl NewSweet {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_label("name", &self.name)?;
        validate_label("category", &self.category)?;
        validate_price(self.price)?;
        validate_quantity(self.quantity)?;
        Ok(())
    }

    pub fn into_sweet(self, id: SweetId, now: DateTime<Utc>) -> Sweet {
        Sweet {
            id,
            name: self.name,
            category: self.category,
            price: self.price,
            quantity: self.quantity,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update: only `Some` fields change.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SweetPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i64>,
}

impl SweetPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.quantity.is_none()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(name) = &self.name {
            validate_label("name", name)?;
        }
        if let Some(category) = &self.category {
            validate_label("category", category)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        if let Some(quantity) = self.quantity {
            validate_quantity(quantity)?;
        }
        Ok(())
    }

    /// Apply supplied fields. An empty patch leaves `updated_at` alone.
    pub fn apply_to(&self, sweet: &mut Sweet, now: DateTime<Utc>) {
        if self.is_empty() {
            return;
        }
        if let Some(name) = &self.name {
            sweet.name = name.clone();
        }
        if let Some(category) = &self.category {
            sweet.category = category.clone();
        }
        if let Some(price) = self.price {
            sweet.price = price;
        }
        if let Some(quantity) = self.quantity {
            sweet.quantity = quantity;
        }
        sweet.updated_at = now;
    }
}

fn validate_label(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<(), DomainError> {
    if !price.is_finite() || price < 0.0 {
        return Err(DomainError::validation("price must be a non-negative number"));
    }
    Ok(())
}

fn validate_quantity(quantity: i64) -> Result<(), DomainError> {
    if quantity < 0 {
        return Err(DomainError::validation("quantity cannot be negative"));
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn sweet(quantity: i64) -> Sweet {
        NewSweet {
            name: "Candy Bar".to_string(),
            category: "Tests".to_string(),
            price: 1.5,
            quantity,
        }
        .into_sweet(SweetId::new(), Utc::now())
    }

    #[test]
    fn decrement_stops_at_zero() {
        let mut s = sweet(1);
        assert_eq!(s.decrement(1, Utc::now()), StockChange::Applied(0));
        assert_eq!(
            s.decrement(1, Utc::now()),
            StockChange::Insufficient { available: 0 }
        );
        assert_eq!(s.quantity, 0);
    }

    #[test]
    fn rejected_decrement_does_not_touch_timestamp() {
        let mut s = sweet(0);
        let before = s.updated_at;
        s.decrement(1, before + Duration::seconds(5));
        assert_eq!(s.updated_at, before);
    }

    #[test]
    fn increment_overflow_is_reported() {
        let mut s = sweet(i64::MAX - 1);
        assert_eq!(s.increment(2, Utc::now()), StockChange::Overflow);
        assert_eq!(s.quantity, i64::MAX - 1);
    }

    #[test]
    fn new_sweet_validation() {
        let ok = NewSweet {
            name: "Fudge".into(),
            category: "Chocolate".into(),
            price: 0.0,
            quantity: 0,
        };
        assert!(ok.validate().is_ok());

        let mut bad = ok.clone();
        bad.price = -0.01;
        assert!(bad.validate().is_err());

        let mut bad = ok.clone();
        bad.price = f64::NAN;
        assert!(bad.validate().is_err());

        let mut bad = ok.clone();
        bad.quantity = -1;
        assert!(bad.validate().is_err());

        let mut bad = ok;
        bad.name = "   ".into();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn patch_touches_only_supplied_fields() {
        let mut s = sweet(10);
        let created = s.updated_at;
        let later = created + Duration::seconds(1);
        let patch: SweetPatch = serde_json::from_str(r#"{"name":"New Name","price":12.0}"#).unwrap();
        patch.apply_to(&mut s, later);

        assert_eq!(s.name, "New Name");
        assert_eq!(s.price, 12.0);
        assert_eq!(s.category, "Tests");
        assert_eq!(s.quantity, 10);
        assert_eq!(s.updated_at, later);
    }

    #[test]
    fn empty_patch_is_a_no_op() {
        let mut s = sweet(3);
        let before = s.clone();
        SweetPatch::default().apply_to(&mut s, Utc::now() + Duration::seconds(9));
        assert_eq!(s, before);
    }

    #[test]
    fn patch_rejects_negative_quantity() {
        let patch = SweetPatch {
            quantity: Some(-5),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    proptest! {
        #[test]
        fn quantity_never_negative(
            start in 0i64..50,
            ops in proptest::collection::vec((any::<bool>(), 1i64..5), 0..64),
        ) {
            let mut s = sweet(start);
            let mut expected = start;
            for (purchase, amount) in ops {
                if purchase {
                    match s.decrement(amount, Utc::now()) {
                        StockChange::Applied(q) => {
                            expected -= amount;
                            prop_assert_eq!(q, expected);
                        }
                        StockChange::Insufficient { available } => prop_assert!(available < amount),
                        other => prop_assert!(false, "unexpected {:?}", other),
                    }
                } else {
                    prop_assert_eq!(
                        s.increment(amount, Utc::now()),
                        StockChange::Applied(expected + amount)
                    );
                    expected += amount;
                }
                prop_assert!(s.quantity >= 0);
                prop_assert_eq!(s.quantity, expected);
            }
        }

        #[test]
        fn purchase_then_restock_restores_quantity(start in 1i64..1_000) {
            let mut s = sweet(start);
            s.decrement(1, Utc::now());
            s.increment(1, Utc::now());
            prop_assert_eq!(s.quantity, start);
        }
    }
}
