//! Same-host site crawler producing the raw inputs for analysis.
//!
//! The crawl is a sequential breadth-first walk from the root page: fetch,
//! extract signals, enqueue unvisited same-host links, repeat up to the
//! page budget. Pages reached through multiple URLs are deduplicated by
//! content hash, and a page that redirects off the crawl host is dropped.
//! One failed page is logged and skipped; only a root that cannot be
//! fetched at all fails the crawl. After the page walk the
//! root-level probes (manifest, robots.txt, sitemaps) and the structured
//! data gathered along the way are folded into [`SiteSignals`].

use crate::config::CrawlConfig;
use crate::discovery;
use crate::error::{Error, Result};
use crate::fetcher::Fetcher;
use crate::schema::DecodedSchemas;
use crate::score::SiteSignals;
use crate::signals::extract_signals;
use crate::types::PageSignals;
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Everything a crawl learned about a site, ready for analysis.
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Signals for each unique page, in crawl order; the root is first.
    pub pages: Vec<PageSignals>,
    /// Site-level facts for the discoverability score.
    pub site: SiteSignals,
}

/// Sequential breadth-first crawler for a single site.
#[derive(Debug)]
pub struct Crawler {
    fetcher: Fetcher,
    config: CrawlConfig,
}

impl Crawler {
    /// Creates a crawler with the default limits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_config(CrawlConfig::default())
    }

    /// Creates a crawler with custom limits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a zero or out-of-range limit, or
    /// [`Error::Network`] if the HTTP client cannot be built.
    pub fn with_config(config: CrawlConfig) -> Result<Self> {
        config.validate()?;
        let fetcher = Fetcher::with_limits(
            Duration::from_secs(config.timeout_secs),
            config.max_page_bytes,
        )?;
        Ok(Self { fetcher, config })
    }

    /// Crawl a site starting from `root_url`.
    ///
    /// The input may omit the scheme; `https` is assumed. Redirects on the
    /// root are followed and the resolved URL defines the crawl host and
    /// the transport-security signal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] for an unparsable or non-HTTP root,
    /// and whatever [`Fetcher::fetch_page`] reports when the root page
    /// itself cannot be fetched. Failures on any later page are logged
    /// and skipped.
    pub async fn crawl(&self, root_url: &str) -> Result<CrawlReport> {
        let root = normalize_root(root_url)?;
        info!(url = %root, max_pages = self.config.max_pages, "starting crawl");

        let root_page = self.fetcher.fetch_page(root.as_str()).await?;
        let resolved_root = Url::parse(&root_page.final_url)?;
        let Some(host) = resolved_root.host_str().map(str::to_string) else {
            return Err(Error::InvalidUrl(format!(
                "no host in '{}'",
                root_page.final_url
            )));
        };

        let mut pages = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut content_hashes: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = VecDeque::new();

        visited.insert(root.to_string());
        visited.insert(root_page.final_url.clone());
        content_hashes.insert(root_page.sha256.clone());
        let signals = extract_signals(&root_page.final_url, &root_page.content);
        enqueue_same_host(&signals, &host, &mut visited, &mut queue);
        pages.push(signals);

        while pages.len() < self.config.max_pages {
            let Some(next) = queue.pop_front() else {
                break;
            };
            let page = match self.fetcher.fetch_page(&next).await {
                Ok(page) => page,
                Err(error) => {
                    warn!(url = %next, %error, "skipping page");
                    continue;
                },
            };
            if !on_crawl_host(&page.final_url, &host) {
                debug!(url = %next, final_url = %page.final_url, "redirected off host, skipping");
                continue;
            }
            if !content_hashes.insert(page.sha256.clone()) {
                debug!(url = %next, "duplicate content, skipping");
                continue;
            }
            visited.insert(page.final_url.clone());
            let signals = extract_signals(&page.final_url, &page.content);
            enqueue_same_host(&signals, &host, &mut visited, &mut queue);
            pages.push(signals);
        }

        info!(pages = pages.len(), "page walk finished, probing site root");
        let site = self.site_signals(&resolved_root, &pages).await;
        Ok(CrawlReport { pages, site })
    }

    /// Run the root probes and fold per-page structured data into the
    /// site-level signals.
    async fn site_signals(&self, root: &Url, pages: &[PageSignals]) -> SiteSignals {
        let manifest = discovery::probe_manifest(&self.fetcher, root).await;
        let robots_txt = discovery::probe_robots(&self.fetcher, root).await;
        let sitemaps = discovery::probe_sitemaps(&self.fetcher, root, robots_txt.as_deref()).await;

        let mut organization = None;
        let mut categories = BTreeSet::new();
        let mut brands = BTreeSet::new();
        for page in pages {
            let decoded = DecodedSchemas::from_objects(&page.schema_objects);
            if organization.is_none() {
                organization = decoded.first_organization().cloned();
            }
            for product in &decoded.products {
                if let Some(brand) = product.brand.as_deref() {
                    insert_trimmed(&mut brands, brand);
                }
                if let Some(category) = product.category.as_deref() {
                    insert_trimmed(&mut categories, category);
                }
            }
            // Middle breadcrumb entries name categories; the ends are the
            // homepage and the page itself
            if page.breadcrumbs.len() >= 3 {
                for crumb in &page.breadcrumbs[1..page.breadcrumbs.len() - 1] {
                    insert_trimmed(&mut categories, crumb);
                }
            }
        }

        SiteSignals {
            https: root.scheme() == "https",
            manifest,
            robots_txt,
            sitemap_found: sitemaps.found,
            sitemap_url_count: sitemaps.url_count,
            organization,
            categories,
            brands,
        }
    }
}

/// Parse the crawl root, assuming `https` when no scheme is given.
fn normalize_root(input: &str) -> Result<Url> {
    let candidate = if input.contains("://") {
        input.to_string()
    } else {
        format!("https://{}", input.trim())
    };
    let url = Url::parse(&candidate)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::InvalidUrl(format!(
            "unsupported scheme '{other}' in '{input}'"
        ))),
    }
}

/// Whether a fetched page, after any redirects, landed on the crawl host.
fn on_crawl_host(final_url: &str, host: &str) -> bool {
    Url::parse(final_url).is_ok_and(|url| url.host_str() == Some(host))
}

/// Queue unvisited links that stay on the crawl host.
fn enqueue_same_host(
    signals: &PageSignals,
    host: &str,
    visited: &mut HashSet<String>,
    queue: &mut VecDeque<String>,
) {
    for link in &signals.internal_links {
        let Ok(parsed) = Url::parse(link) else {
            continue;
        };
        if parsed.host_str() != Some(host) {
            continue;
        }
        if visited.insert(link.clone()) {
            queue.push_back(link.clone());
        }
    }
}

fn insert_trimmed(set: &mut BTreeSet<String>, raw: &str) {
    let value = raw.trim();
    if !value.is_empty() {
        set.insert(value.to_string());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn html_page(title: &str, body: &str) -> String {
        format!("<html><head><title>{title}</title></head><body>{body}</body></html>")
    }

    async fn mount_page(server: &MockServer, route: &str, html: String) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .mount(server)
            .await;
    }

    #[test]
    fn root_urls_default_to_https() {
        assert_eq!(
            normalize_root("shop.example").unwrap().as_str(),
            "https://shop.example/"
        );
        assert_eq!(
            normalize_root("http://shop.example/landing").unwrap().as_str(),
            "http://shop.example/landing"
        );
    }

    #[test]
    fn non_http_roots_are_rejected() {
        let err = normalize_root("ftp://shop.example").unwrap_err();
        assert_eq!(err.category(), "invalid_url");
    }

    #[test]
    fn off_host_final_urls_are_detected() {
        assert!(on_crawl_host("https://shop.example/products/mug", "shop.example"));
        assert!(!on_crawl_host("https://cdn.example/products/mug", "shop.example"));
        assert!(!on_crawl_host("not a url", "shop.example"));
    }

    #[test]
    fn zero_page_budget_is_a_config_error() {
        let config = CrawlConfig {
            max_pages: 0,
            ..CrawlConfig::default()
        };
        let err = Crawler::with_config(config).unwrap_err();
        assert_eq!(err.category(), "config");
    }

    #[test]
    fn oversized_page_budget_is_a_config_error() {
        let config = CrawlConfig {
            max_pages: 5000,
            ..CrawlConfig::default()
        };
        assert!(Crawler::with_config(config).is_err());
    }

    #[tokio::test]
    async fn crawler_debug_output_names_its_limits() {
        let crawler = Crawler::new().unwrap();
        let printed = format!("{crawler:?}");
        assert!(printed.contains("Crawler"));
        assert!(printed.contains("Fetcher"));
        assert!(printed.contains("max_pages"));
    }

    #[tokio::test]
    async fn crawl_walks_same_host_links_breadth_first() {
        let server = MockServer::start().await;

        mount_page(
            &server,
            "/",
            html_page(
                "Home",
                r#"<a href="/a">A</a> <a href="/b">B</a> <a href="https://elsewhere.example/x">Out</a>"#,
            ),
        )
        .await;
        mount_page(&server, "/a", html_page("Page A", "<p>a</p>")).await;
        mount_page(&server, "/b", html_page("Page B", "<p>b</p>")).await;

        let crawler = Crawler::new().unwrap();
        let report = crawler.crawl(&server.uri()).await.unwrap();

        let urls: Vec<&str> = report.pages.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls.len(), 3);
        assert!(urls[0].ends_with('/'));
        assert!(urls[1].ends_with("/a"));
        assert!(urls[2].ends_with("/b"));
    }

    #[tokio::test]
    async fn page_budget_caps_the_crawl() {
        let server = MockServer::start().await;

        mount_page(
            &server,
            "/",
            html_page(
                "Home",
                r#"<a href="/a">A</a> <a href="/b">B</a> <a href="/c">C</a>"#,
            ),
        )
        .await;
        mount_page(&server, "/a", html_page("Page A", "<p>a</p>")).await;
        mount_page(&server, "/b", html_page("Page B", "<p>b</p>")).await;
        mount_page(&server, "/c", html_page("Page C", "<p>c</p>")).await;

        let config = CrawlConfig {
            max_pages: 2,
            ..CrawlConfig::default()
        };
        let crawler = Crawler::with_config(config).unwrap();
        let report = crawler.crawl(&server.uri()).await.unwrap();
        assert_eq!(report.pages.len(), 2);
    }

    #[tokio::test]
    async fn duplicate_content_is_counted_once() {
        let server = MockServer::start().await;

        mount_page(
            &server,
            "/",
            html_page("Home", r#"<a href="/mug">Mug</a> <a href="/mug-blue">Blue</a>"#),
        )
        .await;
        let same = html_page("Mug", "<p>the one mug</p>");
        mount_page(&server, "/mug", same.clone()).await;
        mount_page(&server, "/mug-blue", same).await;

        let crawler = Crawler::new().unwrap();
        let report = crawler.crawl(&server.uri()).await.unwrap();
        assert_eq!(report.pages.len(), 2, "identical pages should merge");
    }

    #[tokio::test]
    async fn failed_pages_are_skipped_not_fatal() {
        let server = MockServer::start().await;

        mount_page(
            &server,
            "/",
            html_page("Home", r#"<a href="/boom">Boom</a> <a href="/ok">Ok</a>"#),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/boom"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        mount_page(&server, "/ok", html_page("Ok", "<p>still here</p>")).await;

        let crawler = Crawler::new().unwrap();
        let report = crawler.crawl(&server.uri()).await.unwrap();
        let urls: Vec<&str> = report.pages.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls.len(), 2);
        assert!(urls[1].ends_with("/ok"));
    }

    #[tokio::test]
    async fn pages_redirecting_off_host_are_dropped() {
        let server = MockServer::start().await;

        mount_page(
            &server,
            "/",
            html_page("Home", r#"<a href="/moved">Moved</a> <a href="/ok">Ok</a>"#),
        )
        .await;
        // Same listener under a different host name, off the crawl host
        let away = format!("{}/elsewhere", server.uri().replace("127.0.0.1", "localhost"));
        Mock::given(method("GET"))
            .and(path("/moved"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", away.as_str()))
            .mount(&server)
            .await;
        mount_page(&server, "/elsewhere", html_page("Elsewhere", "<p>away</p>")).await;
        mount_page(&server, "/ok", html_page("Ok", "<p>still here</p>")).await;

        let crawler = Crawler::new().unwrap();
        let report = crawler.crawl(&server.uri()).await.unwrap();

        let urls: Vec<&str> = report.pages.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls.len(), 2);
        assert!(urls.iter().all(|url| !url.contains("elsewhere")));
    }

    #[tokio::test]
    async fn unreachable_root_fails_the_crawl() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let crawler = Crawler::new().unwrap();
        let err = crawler.crawl(&server.uri()).await.unwrap_err();
        assert_eq!(err.category(), "not_found");
    }

    #[tokio::test]
    async fn probes_fill_site_signals() {
        let server = MockServer::start().await;

        mount_page(&server, "/", html_page("Home", "<p>hello</p>")).await;
        Mock::given(method("GET"))
            .and(path("/llms.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("# Shop\n"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(format!("Sitemap: {}/map.xml\n", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/map.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<?xml version="1.0" encoding="UTF-8"?>
                <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
                  <url><loc>https://shop.example/a</loc></url>
                  <url><loc>https://shop.example/b</loc></url>
                </urlset>"#,
            ))
            .mount(&server)
            .await;

        let crawler = Crawler::new().unwrap();
        let report = crawler.crawl(&server.uri()).await.unwrap();

        assert_eq!(report.site.manifest.as_deref(), Some("# Shop\n"));
        assert!(report.site.robots_txt.is_some());
        assert!(report.site.sitemap_found);
        assert_eq!(report.site.sitemap_url_count, 2);
        // The mock server speaks plain http
        assert!(!report.site.https);
    }

    #[tokio::test]
    async fn structured_data_is_folded_into_site_signals() {
        let server = MockServer::start().await;

        let body = r#"
            <script type="application/ld+json">
            {"@context":"https://schema.org","@type":"Organization",
             "name":"Acme","logo":"https://shop.example/logo.png"}
            </script>
            <script type="application/ld+json">
            {"@context":"https://schema.org","@type":"Product",
             "name":"Mug","category":"Drinkware",
             "brand":{"@type":"Brand","name":"Acme"}}
            </script>
            <ul class="breadcrumbs"><li>Home</li><li>Kitchen</li><li>Mug</li></ul>
        "#;
        mount_page(&server, "/", html_page("Home", body)).await;

        let crawler = Crawler::new().unwrap();
        let report = crawler.crawl(&server.uri()).await.unwrap();

        let org = report.site.organization.unwrap();
        assert_eq!(org.name.as_deref(), Some("Acme"));
        assert!(report.site.brands.contains("Acme"));
        assert!(report.site.categories.contains("Drinkware"));
        assert!(report.site.categories.contains("Kitchen"));
    }
}
