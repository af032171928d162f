//! Heuristic product extraction from a third-party catalog page.
//!
//! Everything page-specific lives behind [`extract_candidates`], so a real HTML
//! parser can replace the pattern scan without touching the fallback chain.

use crate::{CatalogSource, Fetcher, SourceError, SourceOutcome};
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, warn};
use vt_types::{Price, Product};

pub const MAX_SCRAPED_ITEMS: usize = 24;

// `src` must come before `alt` inside the same tag.
static IMG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img[^>]+src=["']([^"']+)["'][^>]*alt=["']([^"']*)["'][^>]*>"#)
        .expect("Invalid regex")
});

const PATH_HINTS: [&str; 3] = ["products", "cdn", "files"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub url: String,
    pub label: String,
}

/// Scan raw markup for product images, resolving URLs against `origin`.
///
/// Results are deduplicated by resolved URL (first wins) and capped at
/// [`MAX_SCRAPED_ITEMS`].
pub fn extract_candidates(html: &str, origin: &str) -> Vec<Candidate> {
    let origin = origin.trim_end_matches('/');
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    for caps in IMG_RE.captures_iter(html) {
        let (Some(src), Some(alt)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let url = resolve_url(src.as_str(), origin);
        if !PATH_HINTS.iter().any(|hint| url.contains(hint)) {
            debug!(%url, "skipping non-product image");
            continue;
        }
        if seen.insert(url.clone()) {
            found.push(Candidate {
                url,
                label: alt.as_str().to_owned(),
            });
            if found.len() == MAX_SCRAPED_ITEMS {
                break;
            }
        }
    }

    found
}

fn resolve_url(src: &str, origin: &str) -> String {
    if let Some(rest) = src.strip_prefix("//") {
        format!("https://{rest}")
    } else if src.starts_with('/') {
        format!("{origin}{src}")
    } else {
        src.to_owned()
    }
}

/// Map candidates to products; unlabeled ones get `Produto N` by position.
pub fn candidates_into_products(candidates: Vec<Candidate>) -> Vec<Product> {
    candidates
        .into_iter()
        .enumerate()
        .map(|(idx, candidate)| Product {
            title: if candidate.label.is_empty() {
                format!("Produto {}", idx + 1)
            } else {
                candidate.label
            },
            description: String::new(),
            price: Price::default(),
            brand: String::new(),
            category: String::new(),
            thumbnail: candidate.url,
        })
        .collect()
}

pub struct ScrapeSource<F> {
    fetcher: F,
    url: String,
    origin: String,
}

impl<F: Fetcher> ScrapeSource<F> {
    pub fn new(fetcher: F, url: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            fetcher,
            url: url.into(),
            origin: origin.into(),
        }
    }
}

#[async_trait(?Send)]
impl<F: Fetcher> CatalogSource<Product> for ScrapeSource<F> {
    fn name(&self) -> &str {
        "scrape"
    }

    async fn fetch(&self) -> SourceOutcome<Product> {
        let html = match self.fetcher.get_text(&self.url).await {
            Ok(html) => html,
            Err(err) => {
                warn!(url = %self.url, error = %err, "catalog page unavailable");
                return SourceOutcome::Failed(SourceError::Transport(err.to_string()));
            }
        };
        let candidates = extract_candidates(&html, &self.origin);
        debug!(count = candidates.len(), "scraped catalog candidates");
        SourceOutcome::from_items(candidates_into_products(candidates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticFetcher;

    const ORIGIN: &str = "https://shop.example";

    #[test]
    fn resolves_relative_urls() {
        let html = r#"
            <img src="//cdn.shop.example/a.jpg" alt="Boné">
            <IMG class="x" SRC='/files/b.png' data-k="1" ALT='Camisa'>
            <img src="https://other.example/products/c.webp" alt="">
        "#;
        let found = extract_candidates(html, ORIGIN);
        assert_eq!(
            found,
            vec![
                Candidate { url: "https://cdn.shop.example/a.jpg".into(), label: "Boné".into() },
                Candidate { url: "https://shop.example/files/b.png".into(), label: "Camisa".into() },
                Candidate {
                    url: "https://other.example/products/c.webp".into(),
                    label: String::new()
                },
            ]
        );
    }

    #[test]
    fn requires_src_before_alt_and_product_path() {
        let html = r#"
            <img alt="first" src="/products/x.jpg">
            <img src="/static/logo.svg" alt="Logo">
            <img src="/products/y.jpg">
        "#;
        assert!(extract_candidates(html, ORIGIN).is_empty());
    }

    #[test]
    fn dedupes_by_resolved_url_first_wins() {
        let html = r#"
            <img src="/products/a.jpg" alt="one">
            <img src="https://shop.example/products/a.jpg" alt="two">
            <img src="/products/b.jpg" alt="three">
        "#;
        let labels: Vec<_> = extract_candidates(html, ORIGIN)
            .into_iter()
            .map(|c| c.label)
            .collect();
        assert_eq!(labels, vec!["one", "three"]);
    }

    #[test]
    fn caps_result_set() {
        let html: String = (0..40)
            .map(|i| format!(r#"<img src="/products/{i}.jpg" alt="p{i}">"#))
            .collect();
        let found = extract_candidates(&html, ORIGIN);
        assert_eq!(found.len(), MAX_SCRAPED_ITEMS);
        assert_eq!(found[23].label, "p23");
    }

    #[test]
    fn malformed_markup_yields_nothing() {
        assert!(extract_candidates("<img src=\"/products/a.jpg\" alt=\"unterminated", ORIGIN).is_empty());
        assert!(extract_candidates("", ORIGIN).is_empty());
    }

    #[test]
    fn unlabeled_candidates_get_ordinal_titles() {
        let products = candidates_into_products(vec![
            Candidate { url: "u1".into(), label: "Named".into() },
            Candidate { url: "u2".into(), label: String::new() },
        ]);
        assert_eq!(products[0].title, "Named");
        assert_eq!(products[1].title, "Produto 2");
        assert_eq!(products[1].thumbnail, "u2");
        assert!(products[1].price.is_blank());
    }

    #[tokio::test]
    async fn source_reports_failure_and_empty_pages() {
        let failing = ScrapeSource::new(StaticFetcher::new(), "https://shop.example/all", ORIGIN);
        assert!(matches!(failing.fetch().await, SourceOutcome::Failed(_)));

        let fetcher = StaticFetcher::new().with_body("https://shop.example/all", "<p>nada</p>");
        let empty = ScrapeSource::new(fetcher, "https://shop.example/all", ORIGIN);
        assert!(matches!(empty.fetch().await, SourceOutcome::Empty));
    }
}
