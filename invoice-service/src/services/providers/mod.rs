//! AI provider abstractions and implementations.
//!
//! This module provides a trait-based abstraction for the text-completion
//! collaborator, allowing easy swapping between backends (Gemini, mock).
//! The contract is deliberately narrow: one prompt in, one completion out,
//! a single synchronous round trip with no retry and no cancellation.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use service_core::error::AppError;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        AppError::BadGateway(err.to_string())
    }
}

/// Trait for text completion providers (e.g., Gemini).
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Generate a text completion for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}
