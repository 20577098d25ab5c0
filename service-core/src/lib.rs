//! service-core: Shared infrastructure for invoice-ledger services.
pub mod config;
pub mod error;
pub mod observability;

pub use axum;
pub use mongodb;
pub use serde;
pub use serde_json;
pub use tracing;
