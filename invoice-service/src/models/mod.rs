//! Domain models for invoice-service.

mod invoice;
mod line_item;

pub use invoice::{BillFrom, BillTo, Invoice, InvoiceStatus, NewInvoice, TotalsBreakdown};
pub use line_item::LineItem;
