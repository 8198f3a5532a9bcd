//! Site-root probes for crawler guidance files.
//!
//! The manifest and robots.txt are optional by nature: a site without them
//! is still analyzable, it just scores differently. Every probe therefore
//! returns `Option` and leaves error detail in the debug log.

use crate::fetcher::Fetcher;
use tracing::debug;
use url::Url;

/// Locations checked for the crawler manifest, in order.
const MANIFEST_PATHS: [&str; 2] = ["/llms.txt", "/.well-known/llms.txt"];

/// Fetch the site's llms.txt manifest, trying its conventional locations
/// in order. The first location that answers wins.
pub async fn probe_manifest(fetcher: &Fetcher, root: &Url) -> Option<String> {
    for path in MANIFEST_PATHS {
        let Ok(target) = root.join(path) else {
            continue;
        };
        if let Some(content) = fetcher.fetch_optional(target.as_str()).await {
            debug!(url = %target, bytes = content.len(), "manifest found");
            return Some(content);
        }
    }
    debug!(root = %root, "no manifest at any known location");
    None
}

/// Fetch robots.txt from the site root.
pub async fn probe_robots(fetcher: &Fetcher, root: &Url) -> Option<String> {
    let target = root.join("/robots.txt").ok()?;
    fetcher.fetch_optional(target.as_str()).await
}

/// Sitemap URLs declared through `Sitemap:` directives in robots.txt.
///
/// The directive key is case-insensitive and may appear any number of
/// times. Values are returned verbatim in file order; callers dedupe.
#[must_use]
pub fn sitemap_directives(robots_txt: &str) -> Vec<String> {
    robots_txt
        .lines()
        .filter_map(|line| {
            let (key, value) = line.trim().split_once(':')?;
            if !key.trim().eq_ignore_ascii_case("sitemap") {
                return None;
            }
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn directives_are_case_insensitive_and_ordered() {
        let robots = "User-agent: *\n\
                      Sitemap: https://shop.example/sitemap.xml\n\
                      SITEMAP: https://shop.example/products.xml\n\
                      sitemap:https://shop.example/blog.xml\n";
        assert_eq!(
            sitemap_directives(robots),
            vec![
                "https://shop.example/sitemap.xml",
                "https://shop.example/products.xml",
                "https://shop.example/blog.xml",
            ]
        );
    }

    #[test]
    fn non_directive_lines_are_ignored() {
        let robots = "# Sitemap: https://shop.example/commented.xml\n\
                      Disallow: /cart\n\
                      Sitemap:\n\
                      just some text\n";
        assert!(sitemap_directives(robots).is_empty());
    }

    #[test]
    fn directive_value_keeps_its_own_colons() {
        let robots = "Sitemap: https://shop.example:8443/sitemap.xml\n";
        assert_eq!(
            sitemap_directives(robots),
            vec!["https://shop.example:8443/sitemap.xml"]
        );
    }

    #[tokio::test]
    async fn manifest_is_found_at_the_primary_location() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/llms.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("# Shop\n"))
            .mount(&mock_server)
            .await;

        let fetcher = Fetcher::new().unwrap();
        let root = Url::parse(&mock_server.uri()).unwrap();
        let manifest = probe_manifest(&fetcher, &root).await;
        assert_eq!(manifest.as_deref(), Some("# Shop\n"));
    }

    #[tokio::test]
    async fn manifest_falls_back_to_well_known() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/llms.txt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/.well-known/llms.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("# Hidden Shop\n"))
            .mount(&mock_server)
            .await;

        let fetcher = Fetcher::new().unwrap();
        let root = Url::parse(&mock_server.uri()).unwrap();
        let manifest = probe_manifest(&fetcher, &root).await;
        assert_eq!(manifest.as_deref(), Some("# Hidden Shop\n"));
    }

    #[tokio::test]
    async fn absent_manifest_is_none() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let fetcher = Fetcher::new().unwrap();
        let root = Url::parse(&mock_server.uri()).unwrap();
        assert!(probe_manifest(&fetcher, &root).await.is_none());
    }

    #[tokio::test]
    async fn robots_probe_returns_content() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /\n"))
            .mount(&mock_server)
            .await;

        let fetcher = Fetcher::new().unwrap();
        let root = Url::parse(&mock_server.uri()).unwrap();
        let robots = probe_robots(&fetcher, &root).await.unwrap();
        assert!(robots.contains("User-agent"));
    }
}
