use crate::error::{DiscoveryError, Result};
use roxmltree::{Document, Node};

/// A parsed sitemap: either page URLs or further sitemaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sitemap {
    UrlSet(Vec<String>),
    Index(Vec<String>),
}

impl Sitemap {
    pub fn parse(xml: &str) -> Result<Self> {
        let document = Document::parse(xml)
            .map_err(|error| DiscoveryError::InvalidSitemap(error.to_string()))?;
        let root = document.root_element();

        match root.tag_name().name() {
            "urlset" => Ok(Self::UrlSet(locations(root, "url"))),
            "sitemapindex" => Ok(Self::Index(locations(root, "sitemap"))),
            other => Err(DiscoveryError::InvalidSitemap(format!(
                "unexpected root element <{other}>"
            ))),
        }
    }
}

/// Text of `<loc>` under each `<entry>` child, document order, blanks skipped.
fn locations(root: Node<'_, '_>, entry: &str) -> Vec<String> {
    root.children()
        .filter(|node| has_tag(*node, entry))
        .filter_map(|node| node.children().find(|child| has_tag(*child, "loc")))
        .filter_map(|loc| loc.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .collect()
}

fn has_tag(node: Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_urlset() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://site.dev/</loc><lastmod>2024-01-01</lastmod></url>
  <url><loc>
    https://site.dev/about
  </loc></url>
  <url><lastmod>2024-01-01</lastmod></url>
</urlset>"#;
        assert_eq!(
            Sitemap::parse(xml).unwrap(),
            Sitemap::UrlSet(vec![
                "https://site.dev/".to_string(),
                "https://site.dev/about".to_string()
            ])
        );
    }

    #[test]
    fn parses_single_entry_index() {
        let xml = r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>https://site.dev/pages.xml</loc></sitemap>
</sitemapindex>"#;
        assert_eq!(
            Sitemap::parse(xml).unwrap(),
            Sitemap::Index(vec!["https://site.dev/pages.xml".to_string()])
        );
    }

    #[test]
    fn rejects_html_and_garbage() {
        assert!(Sitemap::parse("<html><body>404</body></html>").is_err());
        assert!(Sitemap::parse("not xml at all").is_err());
    }
}
