use invoice_service::config::{GenAiBackend, InvoiceConfig};
use invoice_service::services::MongoDb;
use invoice_service::startup::Application;
use uuid::Uuid;

// Test constants for caller identity
pub const TEST_USER_ID: &str = "test_user_123";
pub const OTHER_USER_ID: &str = "other_user_456";

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
    pub db: MongoDb,
    pub db_name: String,
}

impl TestApp {
    pub async fn spawn() -> Self {
        std::env::set_var("MONGODB_URI", "mongodb://localhost:27017");
        std::env::set_var("GENAI_BACKEND", "mock");

        let db_name = format!("invoice_test_{}", Uuid::new_v4());

        let mut config = InvoiceConfig::load().expect("Failed to load configuration");
        config.common.port = 0; // Random port for testing
        config.mongodb.database = db_name.clone();
        config.genai.backend = GenAiBackend::Mock;

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let db = app.db().clone();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            client,
            db,
            db_name,
        }
    }

    /// Build a request with the trusted identity headers the BFF would set.
    pub fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        user_id: &str,
    ) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.address, path))
            .header("X-User-ID", user_id)
            .header("X-User-Name", "Test User")
            .header("X-User-Email", "tester@example.com")
    }

    pub fn get(&self, path: &str, user_id: &str) -> reqwest::RequestBuilder {
        self.request(reqwest::Method::GET, path, user_id)
    }

    pub fn post(&self, path: &str, user_id: &str) -> reqwest::RequestBuilder {
        self.request(reqwest::Method::POST, path, user_id)
    }

    pub fn put(&self, path: &str, user_id: &str) -> reqwest::RequestBuilder {
        self.request(reqwest::Method::PUT, path, user_id)
    }

    pub fn delete(&self, path: &str, user_id: &str) -> reqwest::RequestBuilder {
        self.request(reqwest::Method::DELETE, path, user_id)
    }

    /// Cleanup test resources (drops the per-test database).
    pub async fn cleanup(&self) {
        let _ = self.db.client().database(&self.db_name).drop(None).await;
    }
}
