use crate::dtos::{
    GenerateReminderRequest, InsightsResponse, ParseTextRequest, ReminderResponse,
};
use crate::middleware::UserContext;
use crate::services::PortfolioSummary;
use crate::startup::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use service_core::error::AppError;

pub async fn parse_invoice_text(
    State(state): State<AppState>,
    _user: UserContext,
    Json(payload): Json<ParseTextRequest>,
) -> Result<impl IntoResponse, AppError> {
    // Validated before any upstream call.
    let text = payload
        .text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Text is required")))?;

    let extracted = state.assistant.extract_invoice(&text).await?;

    Ok(Json(extracted))
}

pub async fn generate_reminder(
    State(state): State<AppState>,
    _user: UserContext,
    Json(payload): Json<GenerateReminderRequest>,
) -> Result<impl IntoResponse, AppError> {
    let invoice_id = payload
        .invoice_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Invoice ID is required")))?;

    let invoice = state
        .db
        .get_invoice(&invoice_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))?;

    let reminder_text = state.assistant.draft_reminder(&invoice).await?;

    Ok(Json(ReminderResponse { reminder_text }))
}

pub async fn dashboard_summary(
    State(state): State<AppState>,
    user: UserContext,
) -> Result<impl IntoResponse, AppError> {
    let invoices = state.db.list_invoices_for_owner(&user.id).await?;

    if invoices.is_empty() {
        return Ok(Json(InsightsResponse {
            insights: vec!["No invoice data available.".to_string()],
        }));
    }

    let summary = PortfolioSummary::from_invoices(&invoices);
    let insights = state.assistant.portfolio_insights(&summary).await?;

    Ok(Json(InsightsResponse { insights }))
}
