//! Image description providers
//!
//! A provider turns raw image bytes into a one-line natural-language
//! description. Handlers only see the [`DescriptionProvider`] trait; the
//! concrete client is chosen at startup.

mod gemini_client;

use async_trait::async_trait;
use thiserror::Error;

pub use gemini_client::GeminiClient;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed provider response: {0}")]
    Malformed(String),

    #[error("Provider returned no description")]
    Empty,
}

#[async_trait]
pub trait DescriptionProvider: Send + Sync {
    /// Describe an image in one line
    async fn describe(&self, image: &[u8], mime_type: &str) -> Result<String, ProviderError>;
}
