//! Seams to the external measurement and generation services.

mod gemini;
mod pagespeed;

pub use gemini::{GeminiClient, DEFAULT_GEMINI_MODEL};
pub use pagespeed::PageSpeedClient;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Fetches the raw performance document for one page URL.
#[async_trait]
pub trait MetricsClient: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Value>;
}

/// Generates text for a prompt, constrained by a response schema.
///
/// Output is untrusted even when the service claims schema conformance.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, prompt: &str, response_schema: &Value) -> Result<String>;
}
