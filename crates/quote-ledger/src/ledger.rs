//! Ordered collection of line items
//!
//! Insertion order is display order; numbering is derived at view time, so
//! removal never renumbers or reorders what is stored.

use quote_types::{ItemId, LineItem, NewLineItem, VatRate};

use crate::error::ValidationError;
use crate::totals::DerivedTotals;

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    next_id: u64,
    items: Vec<LineItem>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append an item, returning its identifier
    pub fn add_item(&mut self, item: NewLineItem) -> Result<ItemId, ValidationError> {
        let name = item.name.trim();
        if name.is_empty() {
            tracing::debug!("Rejected line item without a name");
            return Err(ValidationError::BlankName);
        }
        if !item.unit_price.is_finite() || item.unit_price <= 0.0 {
            tracing::debug!(price = item.unit_price, "Rejected line item price");
            return Err(ValidationError::InvalidPrice(item.unit_price));
        }

        let id = ItemId(self.next_id);
        self.next_id += 1;

        self.items.push(LineItem {
            id,
            name: name.to_string(),
            unit_price: item.unit_price,
            vat_rate: item.vat_rate.unwrap_or(VatRate::ZERO),
            discount_rate: item.discount_rate.unwrap_or(0.0),
        });
        tracing::debug!(%id, count = self.items.len(), "Line item added");
        Ok(id)
    }

    /// Remove the item with `id`; returns false when no such item exists
    pub fn remove_item(&mut self, id: ItemId) -> bool {
        if let Some(pos) = self.items.iter().position(|item| item.id == id) {
            self.items.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn get(&self, id: ItemId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Totals over the current items; recomputed on every call
    pub fn compute_totals(&self) -> DerivedTotals {
        DerivedTotals::compute(&self.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(ledger: &Ledger) -> Vec<&str> {
        ledger.items().iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_new_ledger_is_empty() {
        let ledger = Ledger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.len(), 0);
    }

    #[test]
    fn test_add_item_returns_unique_ids() {
        let mut ledger = Ledger::new();
        let a = ledger.add_item(NewLineItem::new("A", 10.0)).unwrap();
        let b = ledger.add_item(NewLineItem::new("B", 20.0)).unwrap();
        assert_ne!(a, b);
        assert_eq!(ledger.get(b).unwrap().name, "B");
    }

    #[test]
    fn test_add_item_defaults_rates_to_zero() {
        let mut ledger = Ledger::new();
        let id = ledger.add_item(NewLineItem::new("A", 10.0)).unwrap();
        let item = ledger.get(id).unwrap();
        assert_eq!(item.vat_rate, VatRate::ZERO);
        assert_eq!(item.discount_rate, 0.0);
    }

    #[test]
    fn test_add_item_trims_name() {
        let mut ledger = Ledger::new();
        ledger.add_item(NewLineItem::new("  Website - E-shop ", 1200.0)).unwrap();
        assert_eq!(names(&ledger), vec!["Website - E-shop"]);
    }

    #[test]
    fn test_blank_name_rejected_without_mutation() {
        let mut ledger = Ledger::new();
        let err = ledger.add_item(NewLineItem::new("   ", 10.0)).unwrap_err();
        assert_eq!(err, ValidationError::BlankName);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_invalid_prices_rejected() {
        let mut ledger = Ledger::new();
        for price in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let result = ledger.add_item(NewLineItem::new("A", price));
            assert!(matches!(result, Err(ValidationError::InvalidPrice(_))));
        }
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_remove_keeps_relative_order() {
        let mut ledger = Ledger::new();
        ledger.add_item(NewLineItem::new("A", 1.0)).unwrap();
        let b = ledger.add_item(NewLineItem::new("B", 2.0)).unwrap();
        ledger.add_item(NewLineItem::new("C", 3.0)).unwrap();

        assert!(ledger.remove_item(b));
        assert_eq!(names(&ledger), vec!["A", "C"]);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut ledger = Ledger::new();
        ledger.add_item(NewLineItem::new("A", 1.0)).unwrap();
        let before = ledger.items().to_vec();

        assert!(!ledger.remove_item(ItemId(99)));
        assert_eq!(ledger.items(), before.as_slice());
    }

    #[test]
    fn test_ids_not_reused_after_removal() {
        let mut ledger = Ledger::new();
        let a = ledger.add_item(NewLineItem::new("A", 1.0)).unwrap();
        ledger.remove_item(a);
        let b = ledger.add_item(NewLineItem::new("B", 1.0)).unwrap();
        assert_ne!(a, b);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn item_strategy() -> impl Strategy<Value = NewLineItem> {
        (
            "[A-Za-zΑ-Ωα-ω]{1,12}",
            0.01f64..100_000.0,
            prop_oneof![Just(0.0), Just(24.0), 0.0f64..30.0],
            prop_oneof![Just(0.0), 0.0f64..=100.0],
        )
            .prop_map(|(name, price, vat, discount)| {
                NewLineItem::new(name, price)
                    .with_vat(vat)
                    .with_discount(discount)
            })
    }

    proptest! {
        /// Property: the grand total equals the sum of the line totals
        #[test]
        fn grand_total_matches_line_totals(items in prop::collection::vec(item_strategy(), 1..40)) {
            let mut ledger = Ledger::new();
            for item in items {
                ledger.add_item(item).unwrap();
            }
            let totals = ledger.compute_totals();
            let sum: f64 = totals.lines.iter().map(|l| l.line_total).sum();
            prop_assert!((totals.grand_total - sum).abs() < 1e-6);
        }

        /// Property: removal preserves the order of the remaining items
        #[test]
        fn removal_preserves_order(
            items in prop::collection::vec(item_strategy(), 1..20),
            remove_index in any::<prop::sample::Index>(),
        ) {
            let mut ledger = Ledger::new();
            for item in items {
                ledger.add_item(item).unwrap();
            }
            let before: Vec<ItemId> = ledger.items().iter().map(|i| i.id).collect();
            let victim = before[remove_index.index(before.len())];

            prop_assert!(ledger.remove_item(victim));

            let after: Vec<ItemId> = ledger.items().iter().map(|i| i.id).collect();
            let expected: Vec<ItemId> = before.into_iter().filter(|id| *id != victim).collect();
            prop_assert_eq!(after, expected);
        }

        /// Property: computing totals twice gives identical results
        #[test]
        fn totals_are_pure(items in prop::collection::vec(item_strategy(), 0..20)) {
            let mut ledger = Ledger::new();
            for item in items {
                ledger.add_item(item).unwrap();
            }
            prop_assert_eq!(ledger.compute_totals(), ledger.compute_totals());
        }
    }
}
