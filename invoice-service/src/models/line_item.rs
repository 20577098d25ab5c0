//! Line item model for invoice-service.

use serde::{Deserialize, Serialize};

/// One priced row on an invoice. `total` is derived and never trusted from
/// input; absent numeric fields deserialize as zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub name: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub unit_price: f64,
    #[serde(default)]
    pub tax_percent: f64,
    #[serde(default)]
    pub total: f64,
}

impl LineItem {
    /// Build a line item with its total computed as
    /// quantity * unitPrice * (1 + taxPercent/100).
    pub fn new(name: String, quantity: f64, unit_price: f64, tax_percent: f64) -> Self {
        let mut item = Self {
            name,
            quantity,
            unit_price,
            tax_percent,
            total: 0.0,
        };
        item.recompute_total();
        item
    }

    /// Pre-tax amount for this row.
    pub fn base_amount(&self) -> f64 {
        self.quantity * self.unit_price
    }

    /// Tax amount for this row.
    pub fn tax_amount(&self) -> f64 {
        self.base_amount() * (self.tax_percent / 100.0)
    }

    pub fn recompute_total(&mut self) {
        let base = self.base_amount();
        self.total = base + base * (self.tax_percent / 100.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_includes_tax() {
        let item = LineItem::new("Widget".to_string(), 2.0, 10.0, 10.0);
        assert_eq!(item.base_amount(), 20.0);
        assert_eq!(item.tax_amount(), 2.0);
        assert_eq!(item.total, 22.0);
    }

    #[test]
    fn absent_tax_treated_as_zero() {
        let item: LineItem =
            serde_json::from_str(r#"{"name":"Hosting","quantity":3,"unitPrice":5}"#).unwrap();
        let item = LineItem::new(item.name, item.quantity, item.unit_price, item.tax_percent);
        assert_eq!(item.tax_percent, 0.0);
        assert_eq!(item.total, 15.0);
    }

    #[test]
    fn missing_numeric_fields_default_to_zero() {
        let item: LineItem = serde_json::from_str(r#"{"name":"Consulting"}"#).unwrap();
        let item = LineItem::new(item.name, item.quantity, item.unit_price, item.tax_percent);
        assert_eq!(item.quantity, 0.0);
        assert_eq!(item.unit_price, 0.0);
        assert_eq!(item.total, 0.0);
    }

    #[test]
    fn negative_tax_is_not_rejected() {
        let item = LineItem::new("Rebate".to_string(), 1.0, 100.0, -10.0);
        assert_eq!(item.total, 90.0);
    }
}
