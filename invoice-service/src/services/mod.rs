//! Services module for invoice-service.

pub mod assistant;
pub mod database;
pub mod metrics;
pub mod providers;

pub use assistant::{InvoiceAssistant, PortfolioSummary};
pub use database::MongoDb;
pub use metrics::{get_metrics, init_metrics};
