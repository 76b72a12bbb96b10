use async_trait::async_trait;
use pretty_assertions::assert_eq;
use sitelens_discovery::{
    DiscoveryConfig, DiscoveryError, PageRenderer, RouteDiscovery, RouteSource, SiteFetcher,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// In-memory site: text documents by URL, link lists by page URL.
/// Unknown URLs fail like a 404.
#[derive(Default)]
struct FakeSite {
    documents: HashMap<String, String>,
    broken: HashMap<String, u16>,
    pages: HashMap<String, Vec<String>>,
    fetched: Mutex<Vec<String>>,
    rendered: Mutex<Vec<String>>,
}

impl FakeSite {
    fn document(mut self, url: &str, body: impl Into<String>) -> Self {
        self.documents.insert(url.to_string(), body.into());
        self
    }

    fn broken(mut self, url: &str, status: u16) -> Self {
        self.broken.insert(url.to_string(), status);
        self
    }

    fn page(mut self, url: &str, links: &[&str]) -> Self {
        self.pages
            .insert(url.to_string(), links.iter().map(|l| l.to_string()).collect());
        self
    }

    fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    fn rendered(&self) -> Vec<String> {
        self.rendered.lock().unwrap().clone()
    }
}

fn not_found(url: &Url) -> DiscoveryError {
    DiscoveryError::Status {
        url: url.to_string(),
        status: 404,
    }
}

#[async_trait]
impl SiteFetcher for FakeSite {
    async fn fetch_text(&self, url: &Url) -> sitelens_discovery::Result<String> {
        self.fetched.lock().unwrap().push(url.to_string());
        if let Some(&status) = self.broken.get(url.as_str()) {
            return Err(DiscoveryError::Status {
                url: url.to_string(),
                status,
            });
        }
        self.documents
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| not_found(url))
    }
}

#[async_trait]
impl PageRenderer for FakeSite {
    async fn render_links(&self, url: &Url) -> sitelens_discovery::Result<Vec<Url>> {
        self.rendered.lock().unwrap().push(url.to_string());
        let links = self.pages.get(url.as_str()).ok_or_else(|| not_found(url))?;
        Ok(links.iter().filter_map(|l| url.join(l).ok()).collect())
    }
}

fn discovery(site: Arc<FakeSite>) -> RouteDiscovery {
    RouteDiscovery::new(site.clone(), site, DiscoveryConfig::default()).unwrap()
}

fn urlset(urls: &[String]) -> String {
    let entries: String = urls
        .iter()
        .map(|u| format!("<url><loc>{u}</loc></url>"))
        .collect();
    format!(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{entries}</urlset>"#)
}

#[tokio::test]
async fn nested_sitemaps_are_read_breadth_first_up_to_the_cap() {
    let children: Vec<String> = (1..=10)
        .map(|i| format!("https://site.dev/sitemap-{i}.xml"))
        .collect();
    let index_entries: String = children
        .iter()
        .map(|c| format!("<sitemap><loc>{c}</loc></sitemap>"))
        .collect();

    let mut site = FakeSite::default().document("https://site.dev/robots.txt", "User-agent: *\n");
    site = site.document(
        "https://site.dev/sitemap.xml",
        format!("<sitemapindex>{index_entries}</sitemapindex>"),
    );
    for (i, child) in children.iter().enumerate() {
        let n = i + 1;
        site = site.document(
            child,
            urlset(&[
                format!("https://site.dev/s{n}/a"),
                format!("https://site.dev/s{n}/b"),
            ]),
        );
    }
    let site = Arc::new(site);

    let found = discovery(site.clone())
        .discover("https://site.dev")
        .await
        .unwrap();

    assert_eq!(found.source, RouteSource::Sitemap);
    assert_eq!(
        found.routes,
        vec![
            "https://site.dev/s1/a",
            "https://site.dev/s1/b",
            "https://site.dev/s2/a",
            "https://site.dev/s2/b",
            "https://site.dev/s3/a",
        ]
    );
    // Only the sitemaps needed to fill the cap were fetched.
    assert_eq!(site.fetched().len(), 5);
    assert!(site.rendered().is_empty());
}

fn sitemap_index(children: &[&str]) -> String {
    let entries: String = children
        .iter()
        .map(|c| format!("<sitemap><loc>{c}</loc></sitemap>"))
        .collect();
    format!("<sitemapindex>{entries}</sitemapindex>")
}

/// Index whose first two children are a 500 and a truncated document.
fn site_with_bad_children() -> FakeSite {
    FakeSite::default()
        .document("https://site.dev/robots.txt", "User-agent: *\n")
        .document(
            "https://site.dev/sitemap.xml",
            sitemap_index(&[
                "https://site.dev/sitemap-1.xml",
                "https://site.dev/sitemap-2.xml",
                "https://site.dev/sitemap-3.xml",
                "https://site.dev/sitemap-4.xml",
            ]),
        )
        .broken("https://site.dev/sitemap-1.xml", 500)
        .document("https://site.dev/sitemap-2.xml", "<urlset><url><loc>https://site.dev/x")
        .document(
            "https://site.dev/sitemap-3.xml",
            urlset(&["https://site.dev/a".into(), "https://site.dev/b".into()]),
        )
        .document(
            "https://site.dev/sitemap-4.xml",
            urlset(&["https://site.dev/c".into()]),
        )
        .page("https://site.dev/", &[])
}

#[tokio::test]
async fn failing_nested_sitemaps_are_skipped() {
    let site = Arc::new(site_with_bad_children());

    let found = discovery(site.clone())
        .discover("https://site.dev")
        .await
        .unwrap();

    assert_eq!(found.source, RouteSource::Sitemap);
    assert_eq!(
        found.routes,
        vec!["https://site.dev/a", "https://site.dev/b", "https://site.dev/c"]
    );
    assert_eq!(site.fetched().len(), 6);
    assert!(site.rendered().is_empty());
}

#[tokio::test]
async fn failed_children_count_toward_the_fetch_cap() {
    let site = Arc::new(site_with_bad_children());
    let config = DiscoveryConfig {
        sitemap_fetch_cap: 3,
        ..DiscoveryConfig::default()
    };

    let found = RouteDiscovery::new(site.clone(), site.clone(), config)
        .unwrap()
        .discover("https://site.dev")
        .await
        .unwrap();

    // root, 500 child, malformed child: cap reached with nothing collected
    assert_eq!(
        site.fetched(),
        vec![
            "https://site.dev/robots.txt",
            "https://site.dev/sitemap.xml",
            "https://site.dev/sitemap-1.xml",
            "https://site.dev/sitemap-2.xml",
        ]
    );
    assert_eq!(found.source, RouteSource::Crawl);
    assert_eq!(found.routes, vec!["https://site.dev/"]);
}

#[tokio::test]
async fn disallowed_sitemap_is_never_fetched() {
    let site = Arc::new(
        FakeSite::default()
            .document(
                "https://site.dev/robots.txt",
                "User-agent: *\nDisallow: /sitemap.xml\n",
            )
            .document("https://site.dev/sitemap.xml", urlset(&["https://site.dev/x".into()]))
            .page("https://site.dev/", &["/about", "/pricing"])
            .page("https://site.dev/about", &["/"])
            .page("https://site.dev/pricing", &[]),
    );

    let found = discovery(site.clone())
        .discover("https://site.dev/")
        .await
        .unwrap();

    assert_eq!(found.source, RouteSource::Crawl);
    assert_eq!(
        found.routes,
        vec![
            "https://site.dev/",
            "https://site.dev/about",
            "https://site.dev/pricing",
        ]
    );
    assert_eq!(site.fetched(), vec!["https://site.dev/robots.txt"]);
}

#[tokio::test]
async fn missing_robots_still_tries_sitemap() {
    let site = Arc::new(FakeSite::default().document(
        "https://site.dev/sitemap.xml",
        urlset(&[
            "https://site.dev/".into(),
            "https://site.dev/".into(),
            "https://site.dev/docs#intro".into(),
        ]),
    ));

    let found = discovery(site.clone())
        .discover("https://site.dev")
        .await
        .unwrap();

    assert_eq!(found.source, RouteSource::Sitemap);
    assert_eq!(found.routes, vec!["https://site.dev/", "https://site.dev/docs"]);
}

#[tokio::test]
async fn crawl_stays_on_origin_and_terminates_on_self_links() {
    let site = Arc::new(FakeSite::default().page(
        "https://site.dev/",
        &["/", "https://site.dev/#top", "https://evil.dev/", "http://site.dev/"],
    ));

    let found = discovery(site.clone())
        .discover("https://site.dev")
        .await
        .unwrap();

    assert_eq!(found.source, RouteSource::Crawl);
    assert_eq!(found.routes, vec!["https://site.dev/"]);
    assert_eq!(site.rendered(), vec!["https://site.dev/"]);
}

#[tokio::test]
async fn crawl_caps_visited_pages() {
    let links: Vec<String> = (0..50).map(|i| format!("/p{i}")).collect();
    let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
    let mut site = FakeSite::default().page("https://site.dev/", &link_refs);
    for link in &links {
        site = site.page(&format!("https://site.dev{link}"), &link_refs);
    }
    let site = Arc::new(site);

    let found = discovery(site.clone())
        .discover("https://site.dev")
        .await
        .unwrap();

    assert_eq!(found.routes.len(), 5);
    assert_eq!(site.rendered().len(), 5);
    assert_eq!(found.routes[1], "https://site.dev/p0");
}

#[tokio::test]
async fn unreachable_site_yields_no_routes() {
    let site = Arc::new(FakeSite::default());

    let found = discovery(site.clone())
        .discover("https://down.dev")
        .await
        .unwrap();

    assert!(found.routes.is_empty());
    assert_eq!(
        site.fetched(),
        vec!["https://down.dev/robots.txt", "https://down.dev/sitemap.xml"]
    );
    assert_eq!(site.rendered(), vec!["https://down.dev/"]);
}

struct StalledRenderer;

#[async_trait]
impl PageRenderer for StalledRenderer {
    async fn render_links(&self, _url: &Url) -> sitelens_discovery::Result<Vec<Url>> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Vec::new())
    }
}

#[tokio::test(start_paused = true)]
async fn stalled_navigation_times_out() {
    let config = DiscoveryConfig {
        navigation_timeout: Duration::from_secs(1),
        ..DiscoveryConfig::default()
    };
    let discovery =
        RouteDiscovery::new(Arc::new(FakeSite::default()), Arc::new(StalledRenderer), config)
            .unwrap();

    let found = discovery.discover("https://slow.dev").await.unwrap();
    assert!(found.routes.is_empty());
}

#[tokio::test]
async fn rejects_non_http_base() {
    let err = discovery(Arc::new(FakeSite::default()))
        .discover("file:///etc/passwd")
        .await
        .unwrap_err();
    assert!(matches!(err, DiscoveryError::InvalidBaseUrl { .. }));
}
