//! Database service for invoice-service.

use crate::models::Invoice;
use crate::services::metrics::DB_QUERY_DURATION;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;
use tracing::{info, instrument};

/// MongoDB connection wrapper.
#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(uri = %uri, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB at {}: {}", uri, e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for invoice-service");

        // Index on ownerId for owner-scoped listing
        let owner_index = IndexModel::builder()
            .keys(doc! { "ownerId": 1 })
            .options(
                IndexOptions::builder()
                    .name("owner_lookup".to_string())
                    .build(),
            )
            .build();

        self.invoices()
            .create_index(owner_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create owner index on invoices collection: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created index on invoices.ownerId");

        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    pub fn invoices(&self) -> Collection<Invoice> {
        self.db.collection("invoices")
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    // -------------------------------------------------------------------------
    // Invoice Operations
    // -------------------------------------------------------------------------

    /// Persist a new invoice. One durable write, no retries.
    #[instrument(skip(self, invoice), fields(invoice_id = %invoice.id, owner_id = %invoice.owner_id))]
    pub async fn create_invoice(&self, invoice: &Invoice) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_invoice"])
            .start_timer();

        self.invoices()
            .insert_one(invoice, None)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to create invoice: {}", e))
            })?;

        timer.observe_duration();

        info!(invoice_id = %invoice.id, invoice_number = %invoice.invoice_number, "Invoice created");

        Ok(())
    }

    /// All invoices owned by a user, in storage order.
    #[instrument(skip(self), fields(owner_id = %owner_id))]
    pub async fn list_invoices_for_owner(&self, owner_id: &str) -> Result<Vec<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_invoices"])
            .start_timer();

        let mut cursor = self
            .invoices()
            .find(doc! { "ownerId": owner_id }, None)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to list invoices: {}", e))
            })?;

        let mut invoices = Vec::new();
        while let Some(invoice) = cursor.try_next().await.map_err(AppError::from)? {
            invoices.push(invoice);
        }

        timer.observe_duration();

        Ok(invoices)
    }

    /// Get an invoice by id.
    #[instrument(skip(self), fields(invoice_id = %invoice_id))]
    pub async fn get_invoice(&self, invoice_id: &str) -> Result<Option<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_invoice"])
            .start_timer();

        let invoice = self
            .invoices()
            .find_one(doc! { "_id": invoice_id }, None)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to get invoice: {}", e))
            })?;

        timer.observe_duration();

        Ok(invoice)
    }

    /// Apply a prepared $set document and return the updated invoice.
    /// Returns None when the id does not exist.
    #[instrument(skip(self, set), fields(invoice_id = %invoice_id))]
    pub async fn update_invoice(
        &self,
        invoice_id: &str,
        set: Document,
    ) -> Result<Option<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_invoice"])
            .start_timer();

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let invoice = self
            .invoices()
            .find_one_and_update(doc! { "_id": invoice_id }, doc! { "$set": set }, options)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to update invoice: {}", e))
            })?;

        timer.observe_duration();

        if let Some(ref inv) = invoice {
            info!(invoice_id = %inv.id, "Invoice updated");
        }

        Ok(invoice)
    }

    /// Delete an invoice by id. Returns the removed document, None when the
    /// id does not exist.
    #[instrument(skip(self), fields(invoice_id = %invoice_id))]
    pub async fn delete_invoice(&self, invoice_id: &str) -> Result<Option<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_invoice"])
            .start_timer();

        let invoice = self
            .invoices()
            .find_one_and_delete(doc! { "_id": invoice_id }, None)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete invoice: {}", e))
            })?;

        timer.observe_duration();

        if let Some(ref inv) = invoice {
            info!(invoice_id = %inv.id, "Invoice deleted");
        }

        Ok(invoice)
    }
}
