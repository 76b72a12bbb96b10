/// Whether any `Disallow` rule in `body` names exactly `path`.
///
/// Rules are not grouped by user agent: a disallow anywhere in the file counts.
pub fn disallows(body: &str, path: &str) -> bool {
    body.lines()
        .map(|line| line.split('#').next().unwrap_or_default())
        .filter_map(|line| line.split_once(':'))
        .any(|(field, value)| {
            field.trim().eq_ignore_ascii_case("disallow") && value.trim() == path
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_sitemap_disallow() {
        let body = "User-agent: *\nDisallow: /admin\nDisallow: /sitemap.xml\n";
        assert!(disallows(body, "/sitemap.xml"));
    }

    #[test]
    fn field_name_is_case_insensitive() {
        assert!(disallows("user-agent: *\ndisallow:/sitemap.xml", "/sitemap.xml"));
    }

    #[test]
    fn ignores_comments_and_other_paths() {
        let body = "# Disallow: /sitemap.xml\nDisallow: /sitemap.xml.gz\nAllow: /sitemap.xml\n";
        assert!(!disallows(body, "/sitemap.xml"));
    }

    #[test]
    fn sitemap_directive_is_not_a_disallow() {
        assert!(!disallows("Sitemap: https://site.dev/sitemap.xml", "/sitemap.xml"));
    }
}
