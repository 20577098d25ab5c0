use crate::middleware::UserContext;
use crate::models::{BillFrom, BillTo, Invoice, InvoiceStatus, LineItem, NewInvoice};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    pub invoice_number: String,
    pub invoice_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub bill_from: Option<BillFrom>,
    pub bill_to: Option<BillTo>,
    pub items: Vec<LineItem>,
    pub notes: Option<String>,
    pub payment_terms: Option<String>,
    pub discount_percent: Option<f64>,
    pub status: Option<InvoiceStatus>,
}

impl From<CreateInvoiceRequest> for NewInvoice {
    fn from(req: CreateInvoiceRequest) -> Self {
        NewInvoice {
            invoice_number: req.invoice_number,
            invoice_date: req.invoice_date,
            due_date: req.due_date,
            bill_from: req.bill_from,
            bill_to: req.bill_to,
            items: req.items,
            discount_percent: req.discount_percent.unwrap_or(0.0),
            notes: req.notes,
            payment_terms: req.payment_terms,
            status: req.status,
        }
    }
}

/// Full-replace-or-noop update: only supplied fields are written. A supplied
/// `items` list replaces the stored one and drives a totals recompute; an
/// absent one leaves items and all derived amounts untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvoiceRequest {
    pub invoice_number: Option<String>,
    pub invoice_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub bill_from: Option<BillFrom>,
    pub bill_to: Option<BillTo>,
    pub items: Option<Vec<LineItem>>,
    pub discount_percent: Option<f64>,
    pub notes: Option<String>,
    pub payment_terms: Option<String>,
    pub status: Option<InvoiceStatus>,
}

/// Minimal owner identity attached to responses for display.
#[derive(Debug, Serialize)]
pub struct OwnerInfo {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    pub id: String,
    pub owner: OwnerInfo,
    pub invoice_number: String,
    pub invoice_date: String,
    pub due_date: Option<String>,
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
    pub created_at: String,
    pub updated_at: String,
}

impl InvoiceResponse {
    /// Convert a stored invoice, attaching the caller's display identity
    /// when the caller is the owner.
    pub fn from_invoice(invoice: Invoice, caller: Option<&UserContext>) -> Self {
        let owner = match caller {
            Some(user) if user.id == invoice.owner_id => OwnerInfo {
                id: invoice.owner_id.clone(),
                name: user.name.clone(),
                email: user.email.clone(),
            },
            _ => OwnerInfo {
                id: invoice.owner_id.clone(),
                name: None,
                email: None,
            },
        };

        Self {
            id: invoice.id,
            owner,
            invoice_number: invoice.invoice_number,
            invoice_date: invoice.invoice_date.to_rfc3339(),
            due_date: invoice.due_date.map(|d| d.to_chrono().to_rfc3339()),
            bill_from: invoice.bill_from,
            bill_to: invoice.bill_to,
            items: invoice.items,
            notes: invoice.notes,
            payment_terms: invoice.payment_terms,
            status: invoice.status,
            subtotal: invoice.subtotal,
            tax_total: invoice.tax_total,
            discount_percent: invoice.discount_percent,
            discount_amount: invoice.discount_amount,
            total: invoice.total,
            created_at: invoice.created_at.to_rfc3339(),
            updated_at: invoice.updated_at.to_rfc3339(),
        }
    }
}
