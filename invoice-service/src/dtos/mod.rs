pub mod ai;
pub mod invoices;

pub use ai::{
    ExtractedInvoice, ExtractedLineItem, GenerateReminderRequest, InsightsResponse,
    ParseTextRequest, ReminderResponse,
};
pub use invoices::{CreateInvoiceRequest, InvoiceResponse, OwnerInfo, UpdateInvoiceRequest};
