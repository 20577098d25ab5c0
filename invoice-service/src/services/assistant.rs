//! Prompt construction and best-effort response parsing for the AI
//! collaborator.
//!
//! The provider returns free text; JSON-shaped replies may arrive wrapped
//! in markdown code fences. Parsing is a fallible transform: fences are
//! stripped, the remainder is parsed into the typed shape, and anything
//! malformed surfaces as an upstream failure rather than a silent default.

use crate::dtos::{ExtractedInvoice, InsightsResponse};
use crate::models::{Invoice, InvoiceStatus};
use crate::services::metrics::{AI_REQUESTS_TOTAL, AI_REQUEST_DURATION};
use crate::services::providers::TextProvider;
use serde::de::DeserializeOwned;
use service_core::error::AppError;
use std::sync::Arc;

/// Aggregate statistics over a user's invoice portfolio, fed to the
/// insights prompt.
#[derive(Debug, Clone)]
pub struct PortfolioSummary {
    pub total_invoices: usize,
    pub paid_invoices: usize,
    pub unpaid_invoices: usize,
    pub total_revenue: f64,
    pub total_outstanding: f64,
    pub recent: Vec<String>,
}

impl PortfolioSummary {
    pub fn from_invoices(invoices: &[Invoice]) -> Self {
        let paid_invoices = invoices
            .iter()
            .filter(|inv| inv.status == InvoiceStatus::Paid)
            .count();
        let total_revenue = invoices
            .iter()
            .filter(|inv| inv.status == InvoiceStatus::Paid)
            .map(|inv| inv.total)
            .sum();
        let total_outstanding = invoices
            .iter()
            .filter(|inv| inv.status != InvoiceStatus::Paid)
            .map(|inv| inv.total)
            .sum();
        let recent = invoices
            .iter()
            .take(5)
            .map(|inv| {
                format!(
                    "#{} ${:.2} status {}",
                    inv.invoice_number,
                    inv.total,
                    inv.status.as_str()
                )
            })
            .collect();

        Self {
            total_invoices: invoices.len(),
            paid_invoices,
            unpaid_invoices: invoices.len() - paid_invoices,
            total_revenue,
            total_outstanding,
            recent,
        }
    }

    fn render(&self) -> String {
        format!(
            "- Total invoices: {}\n\
             - Paid invoices: {}\n\
             - Unpaid/pending invoices: {}\n\
             - Revenue from paid invoices: {:.2}\n\
             - Outstanding amount: {:.2}\n\
             - Recent 5 invoices: {}",
            self.total_invoices,
            self.paid_invoices,
            self.unpaid_invoices,
            self.total_revenue,
            self.total_outstanding,
            self.recent.join(", ")
        )
    }
}

/// Thin service object over the shared text provider. Stateless; one
/// instance per process, cloned into handlers.
#[derive(Clone)]
pub struct InvoiceAssistant {
    provider: Arc<dyn TextProvider>,
}

impl InvoiceAssistant {
    pub fn new(provider: Arc<dyn TextProvider>) -> Self {
        Self { provider }
    }

    /// Extract structured invoice data from free text.
    pub async fn extract_invoice(&self, text: &str) -> Result<ExtractedInvoice, AppError> {
        let prompt = extraction_prompt(text);
        let raw = self.call_provider("parse_text", &prompt).await?;
        parse_json_reply(&raw)
    }

    /// Draft a reminder email for an invoice. The reply is returned
    /// verbatim; the prompt instructs the model to begin with "Subject:".
    pub async fn draft_reminder(&self, invoice: &Invoice) -> Result<String, AppError> {
        let prompt = reminder_prompt(invoice);
        self.call_provider("reminder", &prompt).await
    }

    /// Turn portfolio statistics into 2-3 actionable insights.
    pub async fn portfolio_insights(
        &self,
        summary: &PortfolioSummary,
    ) -> Result<Vec<String>, AppError> {
        let prompt = insights_prompt(summary);
        let raw = self.call_provider("insights", &prompt).await?;
        let reply: InsightsResponse = parse_json_reply(&raw)?;
        Ok(reply.insights)
    }

    async fn call_provider(&self, operation: &str, prompt: &str) -> Result<String, AppError> {
        let timer = AI_REQUEST_DURATION
            .with_label_values(&[operation])
            .start_timer();

        let result = self.provider.generate(prompt).await;
        timer.observe_duration();

        let status = if result.is_ok() { "ok" } else { "error" };
        AI_REQUESTS_TOTAL
            .with_label_values(&[operation, status])
            .inc();

        result.map_err(|e| {
            tracing::error!(operation = operation, error = %e, "AI provider call failed");
            AppError::from(e)
        })
    }
}

fn extraction_prompt(text: &str) -> String {
    format!(
        "You are an expert invoice data extraction AI. Analyze the following text and extract \
         the relevant information to create an invoice.\n\
         Output must be a valid JSON object with the structure:\n\
         {{ \"clientName\": \"string\", \"email\": \"string (if available)\", \
         \"address\": \"string (if available)\",\n\
         \"items\": [{{ \"name\": \"string\", \"quantity\": \"number\", \
         \"unitPrice\": \"number\" }}] }}\n\
         Text to parse:\n\
         --- TEXT START ---\n\
         {}\n\
         --- TEXT END ---\n\
         Provide only the JSON object.",
        text
    )
}

fn reminder_prompt(invoice: &Invoice) -> String {
    let client_name = invoice
        .bill_to
        .client_name
        .as_deref()
        .unwrap_or("the client");
    let due_date = invoice
        .due_date
        .map(|d| d.to_chrono().format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "not specified".to_string());

    format!(
        "You are a polite accounting assistant. Write a friendly reminder email about an \
         overdue or upcoming invoice.\n\
         Use details:\n\
         - Client Name: {}\n\
         - Invoice Number: {}\n\
         - Amount Due: {:.2}\n\
         - Due Date: {}\n\
         Start the email with \"Subject:\". Keep it concise.",
        client_name, invoice.invoice_number, invoice.total, due_date
    )
}

fn insights_prompt(summary: &PortfolioSummary) -> String {
    format!(
        "You are a friendly financial analyst. Based on the following invoice summary, \
         provide 2-3 concise actionable insights as a JSON array:\n\
         {}\n\
         Return: {{ \"insights\": [\"...\", \"...\"] }}",
        summary.render()
    )
}

/// Remove markdown code-fence wrapping from a model reply.
fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// Fence-strip then parse a JSON-shaped reply into the typed result.
fn parse_json_reply<T: DeserializeOwned>(raw: &str) -> Result<T, AppError> {
    let cleaned = strip_code_fences(raw);
    serde_json::from_str(&cleaned)
        .map_err(|e| AppError::BadGateway(format!("Malformed AI response: {}", e)))
}
