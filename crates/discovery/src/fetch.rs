use crate::config::DiscoveryConfig;
use crate::error::{DiscoveryError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

/// Plain-text fetch of robots.txt and sitemap documents.
#[async_trait]
pub trait SiteFetcher: Send + Sync {
    async fn fetch_text(&self, url: &Url) -> Result<String>;
}

/// Loads a page and reports the hyperlinks it contains, resolved to absolute URLs.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render_links(&self, url: &Url) -> Result<Vec<Url>>;
}

/// reqwest-backed implementation of both discovery seams.
///
/// Links come from the `a[href]` elements of the served HTML; scripts are
/// not executed.
#[derive(Clone)]
pub struct HttpSiteClient {
    client: Client,
    fetch_timeout: Duration,
    navigation_timeout: Duration,
}

impl HttpSiteClient {
    pub fn new(config: &DiscoveryConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| DiscoveryError::Other(format!("invalid user agent: {e}")))?;
        headers.insert(USER_AGENT, agent);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/xml, text/html;q=0.9"),
        );

        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self {
            client,
            fetch_timeout: config.fetch_timeout,
            navigation_timeout: config.navigation_timeout,
        })
    }

    async fn get(&self, url: &Url, timeout: Duration) -> Result<(Url, String)> {
        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DiscoveryError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let final_url = response.url().clone();
        Ok((final_url, response.text().await?))
    }
}

#[async_trait]
impl SiteFetcher for HttpSiteClient {
    async fn fetch_text(&self, url: &Url) -> Result<String> {
        let (_, body) = self.get(url, self.fetch_timeout).await?;
        Ok(body)
    }
}

#[async_trait]
impl PageRenderer for HttpSiteClient {
    async fn render_links(&self, url: &Url) -> Result<Vec<Url>> {
        let (page_url, body) = self.get(url, self.navigation_timeout).await?;
        Ok(extract_links(&body, &page_url))
    }
}

/// Absolute http(s) targets of every `<a href>` in `html`, resolved against
/// `page_url`, fragments removed, document order.
pub fn extract_links(html: &str, page_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| page_url.join(href.trim()).ok())
        .filter(|link| matches!(link.scheme(), "http" | "https"))
        .map(|mut link| {
            link.set_fragment(None);
            link
        })
        .collect()
}
