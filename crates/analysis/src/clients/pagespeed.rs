use super::MetricsClient;
use crate::error::{AnalysisError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

const PAGESPEED_ENDPOINT: &str = "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";
const PAGESPEED_TIMEOUT: Duration = Duration::from_secs(30);

/// PageSpeed Insights v5, performance category only.
pub struct PageSpeedClient {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
}

impl PageSpeedClient {
    /// A missing key is reported per fetch, so every route degrades to the
    /// no-profile fallback instead of the run failing.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        let client = Client::builder().timeout(PAGESPEED_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            endpoint: PAGESPEED_ENDPOINT.to_string(),
        })
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl MetricsClient for PageSpeedClient {
    async fn fetch(&self, url: &str) -> Result<Value> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(AnalysisError::MissingCredential("PAGESPEED_API_KEY"))?;

        log::debug!("PageSpeed request for {url}");
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("url", url), ("category", "performance"), ("key", key)])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(AnalysisError::Status {
                service: "PageSpeed Insights",
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_fails_without_a_request() {
        let client = PageSpeedClient::new(Some("  ".to_string()))
            .unwrap()
            .with_endpoint("http://127.0.0.1:9/unused");
        let err = client.fetch("https://site.dev/").await.unwrap_err();
        assert!(matches!(err, AnalysisError::MissingCredential("PAGESPEED_API_KEY")));
    }
}
