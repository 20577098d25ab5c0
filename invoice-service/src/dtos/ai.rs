use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ParseTextRequest {
    pub text: Option<String>,
}

/// Structured invoice data extracted from free text by the AI collaborator.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedInvoice {
    pub client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub items: Vec<ExtractedLineItem>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedLineItem {
    pub name: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub unit_price: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateReminderRequest {
    pub invoice_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderResponse {
    pub reminder_text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InsightsResponse {
    pub insights: Vec<String>,
}
