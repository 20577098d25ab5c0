//! Invoice model for invoice-service.

use crate::models::LineItem;
use chrono::{DateTime, Utc};
use mongodb::bson;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payment terms applied when the caller supplies none.
pub const DEFAULT_PAYMENT_TERMS: &str = "Net 15";

/// Invoice status. Two states, no enforced transition rules: any value is
/// accepted at create or update time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InvoiceStatus {
    Paid,
    #[default]
    Unpaid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Paid => "Paid",
            InvoiceStatus::Unpaid => "Unpaid",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "Paid" => InvoiceStatus::Paid,
            _ => InvoiceStatus::Unpaid,
        }
    }
}

/// Issuing party on an invoice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillFrom {
    pub business_name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Billed party on an invoice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillTo {
    pub client_name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Document-level derived amounts. Computed server-side on every create and
/// on every update that supplies an item list; caller-supplied values are
/// never trusted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TotalsBreakdown {
    pub subtotal: f64,
    pub tax_total: f64,
    pub discount_amount: f64,
    pub total: f64,
}

impl TotalsBreakdown {
    /// Single-pass accumulation. Each item's `total` is rewritten as
    /// `qty*price + qty*price*tax/100`; the document discount applies to
    /// subtotal + taxTotal.
    pub fn compute(items: &mut [LineItem], discount_percent: f64) -> Self {
        let mut subtotal = 0.0;
        let mut tax_total = 0.0;
        for item in items.iter_mut() {
            subtotal += item.base_amount();
            tax_total += item.tax_amount();
            item.recompute_total();
        }

        let total_before_discount = subtotal + tax_total;
        let discount_amount = total_before_discount * (discount_percent / 100.0);

        Self {
            subtotal,
            tax_total,
            discount_amount,
            total: total_before_discount - discount_amount,
        }
    }
}

/// Invoice document. Owned by exactly one user; ownership never changes
/// after creation. Monetary fields are BSON doubles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[serde(rename = "_id")]
    pub id: String,
    pub owner_id: String,
    pub invoice_number: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub invoice_date: DateTime<Utc>,
    pub due_date: Option<bson::DateTime>,
    pub bill_from: BillFrom,
    pub bill_to: BillTo,
    pub items: Vec<LineItem>,
    pub notes: Option<String>,
    pub payment_terms: String,
    pub status: InvoiceStatus,
    pub subtotal: f64,
    pub tax_total: f64,
    pub discount_percent: f64,
    pub discount_amount: f64,
    pub total: f64,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an invoice.
#[derive(Debug, Clone, Default)]
pub struct NewInvoice {
    pub invoice_number: String,
    pub invoice_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub bill_from: Option<BillFrom>,
    pub bill_to: Option<BillTo>,
    pub items: Vec<LineItem>,
    pub discount_percent: f64,
    pub notes: Option<String>,
    pub payment_terms: Option<String>,
    pub status: Option<InvoiceStatus>,
}

impl Invoice {
    pub fn new(owner_id: String, input: NewInvoice) -> Self {
        let now = Utc::now();
        let mut items = input.items;
        let totals = TotalsBreakdown::compute(&mut items, input.discount_percent);

        Self {
            id: Uuid::new_v4().to_string(),
            owner_id,
            invoice_number: input.invoice_number,
            invoice_date: input.invoice_date.unwrap_or(now),
            due_date: input.due_date.map(bson::DateTime::from_chrono),
            bill_from: input.bill_from.unwrap_or_default(),
            bill_to: input.bill_to.unwrap_or_default(),
            items,
            notes: input.notes,
            payment_terms: input
                .payment_terms
                .unwrap_or_else(|| DEFAULT_PAYMENT_TERMS.to_string()),
            status: input.status.unwrap_or_default(),
            subtotal: totals.subtotal,
            tax_total: totals.tax_total,
            discount_percent: input.discount_percent,
            discount_amount: totals.discount_amount,
            total: totals.total,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(quantity: f64, unit_price: f64, tax_percent: f64) -> LineItem {
        LineItem::new("Widget".to_string(), quantity, unit_price, tax_percent)
    }

    #[test]
    fn single_taxed_item_without_discount() {
        let mut items = vec![widget(2.0, 10.0, 10.0)];
        let totals = TotalsBreakdown::compute(&mut items, 0.0);

        assert_eq!(items[0].total, 22.0);
        assert_eq!(totals.subtotal, 20.0);
        assert_eq!(totals.tax_total, 2.0);
        assert_eq!(totals.discount_amount, 0.0);
        assert_eq!(totals.total, 22.0);
    }

    #[test]
    fn document_discount_applies_after_tax() {
        let mut items = vec![widget(2.0, 10.0, 10.0)];
        let totals = TotalsBreakdown::compute(&mut items, 50.0);

        assert_eq!(totals.discount_amount, 11.0);
        assert_eq!(totals.total, 11.0);
    }

    #[test]
    fn totals_satisfy_document_invariants() {
        let mut items = vec![
            widget(3.0, 19.99, 7.5),
            LineItem::new("Support".to_string(), 1.0, 250.0, 0.0),
            LineItem::new("Licenses".to_string(), 12.0, 4.25, 20.0),
        ];
        let discount_percent = 12.5;
        let totals = TotalsBreakdown::compute(&mut items, discount_percent);

        let expected_subtotal: f64 = items.iter().map(|i| i.quantity * i.unit_price).sum();
        let expected_tax: f64 = items
            .iter()
            .map(|i| i.quantity * i.unit_price * (i.tax_percent / 100.0))
            .sum();

        assert_eq!(totals.subtotal, expected_subtotal);
        assert_eq!(totals.tax_total, expected_tax);
        assert_eq!(
            totals.discount_amount,
            (totals.subtotal + totals.tax_total) * (discount_percent / 100.0)
        );
        assert_eq!(
            totals.total,
            totals.subtotal + totals.tax_total - totals.discount_amount
        );
    }

    #[test]
    fn recompute_is_idempotent() {
        let mut items = vec![widget(2.0, 10.0, 10.0), widget(5.0, 3.5, 0.0)];
        let first = TotalsBreakdown::compute(&mut items, 25.0);
        let second = TotalsBreakdown::compute(&mut items, 25.0);

        assert_eq!(first, second);
        assert_eq!(items[0].total, 22.0);
    }

    #[test]
    fn empty_item_list_yields_zero_totals() {
        let mut items: Vec<LineItem> = Vec::new();
        let totals = TotalsBreakdown::compute(&mut items, 50.0);

        assert_eq!(totals.subtotal, 0.0);
        assert_eq!(totals.tax_total, 0.0);
        assert_eq!(totals.discount_amount, 0.0);
        assert_eq!(totals.total, 0.0);
    }

    #[test]
    fn discount_above_hundred_percent_is_not_rejected() {
        let mut items = vec![widget(1.0, 100.0, 0.0)];
        let totals = TotalsBreakdown::compute(&mut items, 150.0);

        assert_eq!(totals.discount_amount, 150.0);
        assert_eq!(totals.total, -50.0);
    }

    #[test]
    fn new_invoice_applies_defaults() {
        let invoice = Invoice::new(
            "user-1".to_string(),
            NewInvoice {
                invoice_number: "INV-001".to_string(),
                items: vec![widget(2.0, 10.0, 10.0)],
                ..NewInvoice::default()
            },
        );

        assert_eq!(invoice.status, InvoiceStatus::Unpaid);
        assert_eq!(invoice.payment_terms, DEFAULT_PAYMENT_TERMS);
        assert_eq!(invoice.discount_percent, 0.0);
        assert_eq!(invoice.total, 22.0);
        assert_eq!(invoice.owner_id, "user-1");
        assert!(invoice.due_date.is_none());
        assert_eq!(invoice.invoice_date, invoice.created_at);
    }

    #[test]
    fn status_round_trips_through_strings() {
        assert_eq!(InvoiceStatus::from_string("Paid"), InvoiceStatus::Paid);
        assert_eq!(InvoiceStatus::from_string("Unpaid"), InvoiceStatus::Unpaid);
        assert_eq!(InvoiceStatus::from_string("draft"), InvoiceStatus::Unpaid);
        assert_eq!(InvoiceStatus::Paid.as_str(), "Paid");
    }
}
