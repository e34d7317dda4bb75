//! Derived amounts
//!
//! Discount and VAT are applied per line and then summed, never on the
//! aggregate, so mixed VAT rates cannot drift.

use quote_types::LineItem;
use serde::{Deserialize, Serialize};

/// Amounts for a single line, in ledger order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineAmounts {
    pub price_after_discount: f64,
    pub discount_amount: f64,
    pub vat_amount: f64,
    pub line_total: f64,
}

impl LineAmounts {
    pub fn for_item(item: &LineItem) -> Self {
        let price_after_discount = item.unit_price * (1.0 - item.discount_rate / 100.0);
        let vat_amount = price_after_discount * item.vat_rate.percent() / 100.0;
        Self {
            price_after_discount,
            discount_amount: item.unit_price - price_after_discount,
            vat_amount,
            line_total: price_after_discount + vat_amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DerivedTotals {
    /// One entry per item, same order as the ledger
    pub lines: Vec<LineAmounts>,
    pub subtotal: f64,
    pub total_discount: f64,
    pub vat_total: f64,
    pub grand_total: f64,
}

impl DerivedTotals {
    pub fn compute(items: &[LineItem]) -> Self {
        let lines: Vec<LineAmounts> = items.iter().map(LineAmounts::for_item).collect();

        let subtotal = lines.iter().map(|l| l.price_after_discount).sum::<f64>();
        let total_discount = lines.iter().map(|l| l.discount_amount).sum::<f64>();
        let vat_total = lines.iter().map(|l| l.vat_amount).sum::<f64>();

        Self {
            lines,
            subtotal,
            total_discount,
            vat_total,
            grand_total: subtotal + vat_total,
        }
    }

    pub fn has_discount(&self) -> bool {
        self.total_discount > 0.0
    }
}
