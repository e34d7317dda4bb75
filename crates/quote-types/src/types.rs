use std::fmt;

/// Opaque identifier of a line item, assigned by the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item-{}", self.0)
    }
}

/// VAT percentage applied to a single line.
///
/// Kept open: any non-negative percentage is accepted, the presets are the
/// rates the quotation form offers.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct VatRate(pub f64);

impl VatRate {
    pub const ZERO: VatRate = VatRate(0.0);
    pub const STANDARD: VatRate = VatRate(24.0);

    /// Rates offered by the form, in display order
    pub const PRESETS: [VatRate; 2] = [VatRate::ZERO, VatRate::STANDARD];

    pub fn percent(self) -> f64 {
        self.0
    }
}

impl From<f64> for VatRate {
    fn from(percent: f64) -> Self {
        VatRate(percent)
    }
}

/// A line item as stored in the ledger
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LineItem {
    pub id: ItemId,
    /// Display label, already combined with any sub-option suffix
    pub name: String,
    pub unit_price: f64,
    pub vat_rate: VatRate,
    /// Percentage in [0, 100]
    pub discount_rate: f64,
}

impl LineItem {
    pub fn has_discount(&self) -> bool {
        self.discount_rate > 0.0
    }
}

/// Input for `Ledger::add_item`; VAT and discount default to zero
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct NewLineItem {
    pub name: String,
    pub unit_price: f64,
    #[serde(default)]
    pub vat_rate: Option<VatRate>,
    #[serde(default)]
    pub discount_rate: Option<f64>,
}

impl NewLineItem {
    pub fn new(name: impl Into<String>, unit_price: f64) -> Self {
        Self {
            name: name.into(),
            unit_price,
            vat_rate: None,
            discount_rate: None,
        }
    }

    pub fn with_vat(mut self, vat_rate: impl Into<VatRate>) -> Self {
        self.vat_rate = Some(vat_rate.into());
        self
    }

    pub fn with_discount(mut self, discount_rate: f64) -> Self {
        self.discount_rate = Some(discount_rate);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_line_item_defaults_are_absent() {
        let item = NewLineItem::new("Website - E-shop", 1200.0);
        assert_eq!(item.vat_rate, None);
        assert_eq!(item.discount_rate, None);
    }

    #[test]
    fn test_builder_sets_rates() {
        let item = NewLineItem::new("Web SEO - Βασικό / το μήνα", 300.0)
            .with_vat(24.0)
            .with_discount(10.0);
        assert_eq!(item.vat_rate, Some(VatRate::STANDARD));
        assert_eq!(item.discount_rate, Some(10.0));
    }

    #[test]
    fn test_vat_rate_serializes_as_plain_number() {
        let json = serde_json::to_string(&VatRate::STANDARD).unwrap();
        assert_eq!(json, "24.0");
    }

    #[test]
    fn test_new_line_item_deserializes_without_rates() {
        let json = r#"{"name":"Advertisement - Google Ads","unit_price":150.0}"#;
        let item: NewLineItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.vat_rate, None);
        assert_eq!(item.discount_rate, None);
    }

    #[test]
    fn test_item_id_display() {
        assert_eq!(ItemId(7).to_string(), "item-7");
    }
}
