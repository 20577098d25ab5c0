use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use service_core::error::AppError;

/// Caller identity for invoice-service.
///
/// Extracts the user id from the X-User-ID header set by the trusted
/// request layer (BFF) after authenticating the user, plus the optional
/// X-User-Name / X-User-Email display identity used to annotate owned
/// invoices in responses.
#[derive(Debug, Clone)]
pub struct UserContext {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for UserContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get("X-User-ID")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::AuthError(anyhow::anyhow!(
                    "Missing X-User-ID header (required from BFF)"
                ))
            })?
            .to_string();

        let name = parts
            .headers
            .get("X-User-Name")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let email = parts
            .headers
            .get("X-User-Email")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // Add to tracing span for observability
        tracing::Span::current().record("user_id", id.as_str());

        Ok(UserContext { id, name, email })
    }
}
