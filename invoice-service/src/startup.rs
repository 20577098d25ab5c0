use crate::config::{GenAiBackend, InvoiceConfig};
use crate::handlers;
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::mock::MockTextProvider;
use crate::services::providers::TextProvider;
use crate::services::{InvoiceAssistant, MongoDb};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: InvoiceConfig,
    pub db: MongoDb,
    pub assistant: InvoiceAssistant,
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    pub async fn build(config: InvoiceConfig) -> Result<Self, AppError> {
        let db = MongoDb::connect(&config.mongodb.uri, &config.mongodb.database)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to MongoDB: {}", e);
                e
            })?;
        db.initialize_indexes().await.map_err(|e| {
            tracing::error!("Failed to initialize database indexes: {}", e);
            e
        })?;

        // One shared stateless provider per process, reused across requests.
        let provider: Arc<dyn TextProvider> = match config.genai.backend {
            GenAiBackend::Gemini => Arc::new(GeminiTextProvider::new(GeminiConfig {
                api_key: config.genai.api_key.clone(),
                model: config.genai.model.clone(),
            })),
            GenAiBackend::Mock => Arc::new(MockTextProvider::new(true)),
        };

        let state = AppState {
            config: config.clone(),
            db: db.clone(),
            assistant: InvoiceAssistant::new(provider),
        };

        let cors = CorsLayer::new()
            .allow_origin(
                config
                    .cors
                    .allowed_origin
                    .parse::<HeaderValue>()
                    .map_err(|e| {
                        AppError::ConfigError(anyhow::anyhow!(
                            "Invalid CORS origin '{}': {}",
                            config.cors.allowed_origin,
                            e
                        ))
                    })?,
            )
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([
                header::AUTHORIZATION,
                header::CONTENT_TYPE,
                header::HeaderName::from_static("x-user-id"),
                header::HeaderName::from_static("x-user-name"),
                header::HeaderName::from_static("x-user-email"),
            ])
            .allow_credentials(true);

        let app = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/ready", get(handlers::readiness_check))
            .route("/metrics", get(handlers::metrics_endpoint))
            .route(
                "/api/invoices",
                post(handlers::create_invoice).get(handlers::list_invoices),
            )
            .route(
                "/api/invoices/:id",
                get(handlers::get_invoice)
                    .put(handlers::update_invoice)
                    .delete(handlers::delete_invoice),
            )
            .route("/api/ai/parse-text", post(handlers::parse_invoice_text))
            .route("/api/ai/generate-reminder", post(handlers::generate_reminder))
            .route("/api/ai/dashboard-summary", get(handlers::dashboard_summary))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn db(&self) -> &MongoDb {
        &self.state.db
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
