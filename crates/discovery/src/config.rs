use serde::{Deserialize, Serialize};
use sitelens_protocol::duration_secs;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36";

/// Route discovery limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Maximum routes returned, also the crawl's visited-page cap
    pub route_cap: usize,

    /// Timeout for robots.txt and sitemap requests (seconds in config files)
    #[serde(with = "duration_secs")]
    pub fetch_timeout: Duration,

    /// Timeout for rendering one page during the crawl
    #[serde(with = "duration_secs")]
    pub navigation_timeout: Duration,

    /// Upper bound on visited + queued pages during the crawl
    pub frontier_cap: usize,

    /// Upper bound on sitemap documents fetched, index files included
    pub sitemap_fetch_cap: usize,

    pub user_agent: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            route_cap: 5,
            fetch_timeout: Duration::from_secs(10),
            navigation_timeout: Duration::from_secs(30),
            frontier_cap: 20,
            sitemap_fetch_cap: 25,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl DiscoveryConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.route_cap == 0 {
            return Err("route_cap must be > 0".to_string());
        }
        if self.frontier_cap < self.route_cap {
            return Err("frontier_cap must be >= route_cap".to_string());
        }
        if self.sitemap_fetch_cap == 0 {
            return Err("sitemap_fetch_cap must be > 0".to_string());
        }
        Ok(())
    }
}
