use crate::dtos::{CreateInvoiceRequest, InvoiceResponse, UpdateInvoiceRequest};
use crate::middleware::UserContext;
use crate::models::{Invoice, TotalsBreakdown};
use crate::services::metrics::INVOICES_TOTAL;
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use mongodb::bson::{self, doc};
use service_core::error::AppError;

pub async fn create_invoice(
    State(state): State<AppState>,
    user: UserContext,
    Json(payload): Json<CreateInvoiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let invoice = Invoice::new(user.id.clone(), payload.into());

    state.db.create_invoice(&invoice).await.map_err(|e| {
        tracing::error!(invoice_number = %invoice.invoice_number, "Error creating invoice");
        e
    })?;

    INVOICES_TOTAL
        .with_label_values(&[invoice.status.as_str()])
        .inc();

    Ok((
        StatusCode::CREATED,
        Json(InvoiceResponse::from_invoice(invoice, Some(&user))),
    ))
}

pub async fn list_invoices(
    State(state): State<AppState>,
    user: UserContext,
) -> Result<impl IntoResponse, AppError> {
    let invoices = state.db.list_invoices_for_owner(&user.id).await?;

    let responses: Vec<InvoiceResponse> = invoices
        .into_iter()
        .map(|invoice| InvoiceResponse::from_invoice(invoice, Some(&user)))
        .collect();

    Ok(Json(responses))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    user: UserContext,
    Path(invoice_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let invoice = state
        .db
        .get_invoice(&invoice_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))?;

    // Existence is checked before ownership: a non-owner learns the id
    // exists but gets 401, never the document.
    if invoice.owner_id != user.id {
        return Err(AppError::Unauthorized(anyhow::anyhow!("Not authorized")));
    }

    Ok(Json(InvoiceResponse::from_invoice(invoice, Some(&user))))
}

pub async fn update_invoice(
    State(state): State<AppState>,
    _user: UserContext, // identity logged only; update is not owner-scoped
    Path(invoice_id): Path<String>,
    Json(payload): Json<UpdateInvoiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut set = doc! { "updatedAt": bson::DateTime::now() };

    if let Some(invoice_number) = payload.invoice_number {
        set.insert("invoiceNumber", invoice_number);
    }
    if let Some(invoice_date) = payload.invoice_date {
        set.insert("invoiceDate", bson::DateTime::from_chrono(invoice_date));
    }
    if let Some(due_date) = payload.due_date {
        set.insert("dueDate", bson::DateTime::from_chrono(due_date));
    }
    if let Some(bill_from) = payload.bill_from {
        set.insert("billFrom", to_bson_value(&bill_from)?);
    }
    if let Some(bill_to) = payload.bill_to {
        set.insert("billTo", to_bson_value(&bill_to)?);
    }
    if let Some(notes) = payload.notes {
        set.insert("notes", notes);
    }
    if let Some(payment_terms) = payload.payment_terms {
        set.insert("paymentTerms", payment_terms);
    }
    if let Some(status) = payload.status {
        set.insert("status", status.as_str());
    }

    // A supplied item list is a complete replacement and drives a
    // from-scratch recompute of every derived amount. Without one, the
    // stored items and totals stay untouched.
    if let Some(mut items) = payload.items {
        let discount_percent = payload.discount_percent.unwrap_or(0.0);
        let totals = TotalsBreakdown::compute(&mut items, discount_percent);

        set.insert("items", to_bson_value(&items)?);
        set.insert("subtotal", totals.subtotal);
        set.insert("taxTotal", totals.tax_total);
        set.insert("discountPercent", discount_percent);
        set.insert("discountAmount", totals.discount_amount);
        set.insert("total", totals.total);
    }

    let invoice = state
        .db
        .update_invoice(&invoice_id, set)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))?;

    Ok(Json(InvoiceResponse::from_invoice(invoice, None)))
}

pub async fn delete_invoice(
    State(state): State<AppState>,
    _user: UserContext, // identity logged only; delete is not owner-scoped
    Path(invoice_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state
        .db
        .delete_invoice(&invoice_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))?;

    Ok(Json(
        serde_json::json!({ "message": "Invoice deleted successfully" }),
    ))
}

fn to_bson_value<T: serde::Serialize>(value: &T) -> Result<bson::Bson, AppError> {
    bson::to_bson(value)
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to serialize field: {}", e)))
}
