//! Discovery probes for the site-level crawl.
//!
//! Everything an automated consumer uses to orient itself on a site is
//! probed from the root: the llms.txt manifest, robots.txt, and sitemaps.
//! These feed [`SiteSignals`](crate::score::SiteSignals) and through it the
//! discoverability score; none of them is required for a crawl to proceed.
//!
//! ## Probe Order
//!
//! 1. `/llms.txt`, then `/.well-known/llms.txt` - crawler manifest
//! 2. `/robots.txt` - bot access rules and `Sitemap:` directives
//! 3. Declared sitemaps, then `/sitemap.xml` - URL inventory
//!
//! ```no_run
//! use sitelens_core::Fetcher;
//! use sitelens_core::discovery::{probe_manifest, probe_robots, probe_sitemaps};
//! use url::Url;
//!
//! # async fn example() -> sitelens_core::Result<()> {
//! let fetcher = Fetcher::new()?;
//! let root = Url::parse("https://shop.example")?;
//!
//! let manifest = probe_manifest(&fetcher, &root).await;
//! let robots = probe_robots(&fetcher, &root).await;
//! let sitemaps = probe_sitemaps(&fetcher, &root, robots.as_deref()).await;
//! println!("{} sitemap URLs", sitemaps.url_count);
//! # Ok(())
//! # }
//! ```

pub mod probe;
pub mod sitemap;

pub use probe::{probe_manifest, probe_robots, sitemap_directives};
pub use sitemap::{SitemapEntry, SitemapProbe, is_sitemap_index, parse_sitemap, probe_sitemaps};
