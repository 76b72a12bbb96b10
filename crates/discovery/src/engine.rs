use crate::config::DiscoveryConfig;
use crate::error::{DiscoveryError, Result};
use crate::fetch::{PageRenderer, SiteFetcher};
use crate::robots;
use crate::sitemap::Sitemap;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use url::Url;

const SITEMAP_PATH: &str = "/sitemap.xml";

/// How the route list was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteSource {
    Sitemap,
    Crawl,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredRoutes {
    pub routes: Vec<String>,
    pub source: RouteSource,
}

enum State {
    Start,
    SitemapAttempt,
    Crawl,
    SitemapResolved(Vec<String>),
    CrawlResolved(Vec<String>),
}

/// Resolves a site to at most `route_cap` page URLs: robots.txt, then the
/// sitemap, then a breadth-first crawl.
pub struct RouteDiscovery {
    fetcher: Arc<dyn SiteFetcher>,
    renderer: Arc<dyn PageRenderer>,
    config: DiscoveryConfig,
}

impl RouteDiscovery {
    pub fn new(
        fetcher: Arc<dyn SiteFetcher>,
        renderer: Arc<dyn PageRenderer>,
        config: DiscoveryConfig,
    ) -> Result<Self> {
        config.validate().map_err(DiscoveryError::Other)?;
        Ok(Self {
            fetcher,
            renderer,
            config,
        })
    }

    /// Discover routes of `base_url`.
    ///
    /// Network and parse failures only steer the fallback sequence; an
    /// unreachable site yields an empty list. The only error is a base URL
    /// that is not an absolute http(s) URL.
    pub async fn discover(&self, base_url: &str) -> Result<DiscoveredRoutes> {
        let base = parse_base(base_url)?;
        log::info!("Discovering routes for {base}");

        let mut state = State::Start;
        loop {
            state = match state {
                State::Start => self.check_robots(&base).await,
                State::SitemapAttempt => match self.read_sitemaps(&base).await {
                    Some(routes) => State::SitemapResolved(routes),
                    None => State::Crawl,
                },
                State::Crawl => State::CrawlResolved(self.crawl(&base).await),
                State::SitemapResolved(routes) => {
                    log::info!("Resolved {} routes from sitemap", routes.len());
                    return Ok(DiscoveredRoutes {
                        routes,
                        source: RouteSource::Sitemap,
                    });
                }
                State::CrawlResolved(routes) => {
                    log::info!("Resolved {} routes by crawling", routes.len());
                    return Ok(DiscoveredRoutes {
                        routes,
                        source: RouteSource::Crawl,
                    });
                }
            };
        }
    }

    async fn check_robots(&self, base: &Url) -> State {
        let Ok(robots_url) = site_url(base, "/robots.txt") else {
            return State::SitemapAttempt;
        };
        match self.fetcher.fetch_text(&robots_url).await {
            Ok(body) if robots::disallows(&body, SITEMAP_PATH) => {
                log::info!("robots.txt disallows {SITEMAP_PATH}, crawling instead");
                State::Crawl
            }
            Ok(_) => State::SitemapAttempt,
            Err(e) => {
                log::debug!("robots.txt unavailable ({e}), trying sitemap");
                State::SitemapAttempt
            }
        }
    }

    /// Breadth-first over nested sitemaps. `None` when the root sitemap is
    /// unusable or nothing was collected.
    async fn read_sitemaps(&self, base: &Url) -> Option<Vec<String>> {
        let root = site_url(base, SITEMAP_PATH).ok()?;
        let cap = self.config.route_cap;

        let mut queue = VecDeque::from([root.clone()]);
        let mut fetched: HashSet<Url> = HashSet::new();
        let mut routes = RouteSet::new(cap);

        while let Some(sitemap_url) = queue.pop_front() {
            if routes.is_full() || fetched.len() >= self.config.sitemap_fetch_cap {
                break;
            }
            if !fetched.insert(sitemap_url.clone()) {
                continue;
            }

            let parsed = self
                .fetcher
                .fetch_text(&sitemap_url)
                .await
                .and_then(|body| Sitemap::parse(&body));
            let sitemap = match parsed {
                Ok(sitemap) => sitemap,
                Err(e) if sitemap_url == root => {
                    log::info!("Sitemap unavailable ({e}), falling back to crawl");
                    return None;
                }
                Err(e) => {
                    log::warn!("Skipping nested sitemap {sitemap_url}: {e}");
                    continue;
                }
            };

            match sitemap {
                Sitemap::UrlSet(locations) => {
                    for location in locations {
                        if routes.is_full() {
                            break;
                        }
                        match Url::parse(&location) {
                            Ok(url) => routes.insert(url),
                            Err(e) => log::debug!("Ignoring sitemap entry {location}: {e}"),
                        }
                    }
                }
                Sitemap::Index(children) => {
                    log::debug!("{sitemap_url} lists {} sitemaps", children.len());
                    queue.extend(children.iter().filter_map(|loc| Url::parse(loc).ok()));
                }
            }
        }

        if routes.is_empty() {
            log::info!("Sitemap yielded no routes, falling back to crawl");
            return None;
        }
        Some(routes.into_vec())
    }

    /// Breadth-first crawl from `base`. Pages whose navigation fails count
    /// as visited but are not reported as routes.
    async fn crawl(&self, base: &Url) -> Vec<String> {
        let cap = self.config.route_cap;
        let frontier_cap = self.config.frontier_cap;

        let mut frontier = VecDeque::from([base.clone()]);
        let mut queued: HashSet<Url> = HashSet::from([base.clone()]);
        let mut visited: HashSet<Url> = HashSet::new();
        let mut routes = RouteSet::new(cap);

        while visited.len() < cap {
            let Some(page) = frontier.pop_front() else {
                break;
            };
            queued.remove(&page);
            if !visited.insert(page.clone()) {
                continue;
            }

            let links = match self.navigate(&page).await {
                Ok(links) => links,
                Err(e) => {
                    log::debug!("Navigation to {page} failed: {e}");
                    continue;
                }
            };
            routes.insert(page);

            for mut link in links {
                link.set_fragment(None);
                if link.origin() != base.origin()
                    || visited.contains(&link)
                    || queued.contains(&link)
                    || visited.len() + frontier.len() >= frontier_cap
                {
                    continue;
                }
                queued.insert(link.clone());
                frontier.push_back(link);
            }
        }

        routes.into_vec()
    }

    async fn navigate(&self, page: &Url) -> Result<Vec<Url>> {
        tokio::time::timeout(self.config.navigation_timeout, self.renderer.render_links(page))
            .await
            .map_err(|_| DiscoveryError::Timeout(page.to_string()))?
    }
}

/// Insertion-ordered, deduplicated, capped list of routes.
struct RouteSet {
    seen: HashSet<String>,
    routes: Vec<String>,
    cap: usize,
}

impl RouteSet {
    fn new(cap: usize) -> Self {
        Self {
            seen: HashSet::new(),
            routes: Vec::with_capacity(cap),
            cap,
        }
    }

    fn insert(&mut self, mut url: Url) {
        if self.is_full() {
            return;
        }
        url.set_fragment(None);
        let route = url.to_string();
        if self.seen.insert(route.clone()) {
            self.routes.push(route);
        }
    }

    fn is_full(&self) -> bool {
        self.routes.len() >= self.cap
    }

    fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    fn into_vec(self) -> Vec<String> {
        self.routes
    }
}

fn parse_base(base_url: &str) -> Result<Url> {
    let invalid = |reason: String| DiscoveryError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    };
    let mut url = Url::parse(base_url.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid("expected an http(s) URL with a host".to_string()));
    }
    url.set_fragment(None);
    url.set_query(None);
    Ok(url)
}

/// `{base}{path}` with any trailing slash on the base path removed.
fn site_url(base: &Url, path: &str) -> Result<Url> {
    let prefix = base.as_str().trim_end_matches('/');
    Url::parse(&format!("{prefix}{path}")).map_err(|e| DiscoveryError::Other(e.to_string()))
}
