//! # Sitelens Discovery
//!
//! Finds the pages of a site worth measuring.
//!
//! ```text
//! Start ──> robots.txt ──(sitemap allowed)──> sitemap.xml ──(urls)──> SitemapResolved
//!               │                                  │
//!               └──(disallowed)──> Crawl <──(empty / failure)
//!                                    │
//!                                    └──> CrawlResolved
//! ```
//!
//! Output is deduplicated, capped and in discovery order.

mod config;
mod engine;
mod error;
mod fetch;
mod robots;
mod sitemap;

pub use config::{DiscoveryConfig, DEFAULT_USER_AGENT};
pub use engine::{DiscoveredRoutes, RouteDiscovery, RouteSource};
pub use error::{DiscoveryError, Result};
pub use fetch::{extract_links, HttpSiteClient, PageRenderer, SiteFetcher};
pub use robots::disallows as robots_disallows;
pub use sitemap::Sitemap;
