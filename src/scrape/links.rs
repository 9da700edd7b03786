//! Headline-link extraction from a homepage document.
//!
//! Markup is not under our control, so extraction is a chain of
//! selector strategies tried in priority order, with a broad URL-pattern
//! scan as the last resort.

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// A candidate article found on the homepage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleLink {
    pub title: String,
    /// Absolute URL, unique within one extraction result
    pub url: String,
}

/// Structural selectors tried in priority order. The first selector
/// yielding at least one qualifying link wins; later ones are skipped.
const LINK_SELECTORS: &[&str] = &[
    "h2 a[href]",
    "h3 a[href]",
    ".title a[href]",
    ".heading a[href]",
    ".news-title a[href]",
];

/// URL path fragments accepted by the fallback scan.
const FALLBACK_PATTERNS: &[&str] = &["/news/", "/article/", "/breaking-news/"];

/// Minimum title length for links matched by structural selectors.
const MIN_TITLE_LEN: usize = 20;
/// Minimum title length for links matched by the fallback scan.
const MIN_FALLBACK_TITLE_LEN: usize = 30;

/// Extract a deduplicated, ordered list of article links from homepage HTML.
///
/// A homepage with no qualifying links yields an empty list, not an error.
pub fn extract_links(html: &str, base_url: &str) -> Vec<ArticleLink> {
    let base = match Url::parse(base_url) {
        Ok(u) => u,
        Err(err) => {
            log::warn!("{base_url}: invalid base URL: {err}");
            return Vec::new();
        }
    };

    let document = Html::parse_document(html);
    let mut candidates = Vec::new();

    for selector_str in LINK_SELECTORS {
        let selector = Selector::parse(selector_str).expect("static selector");

        for link in document.select(&selector) {
            let Some(href) = link.attr("href") else {
                continue;
            };
            let title = element_text(&link);

            if href.is_empty() || title.chars().count() <= MIN_TITLE_LEN {
                continue;
            }

            let Ok(resolved) = base.join(href) else {
                continue;
            };

            if resolved.as_str() == base.as_str() || resolved.as_str().contains("/category/") {
                continue;
            }

            candidates.push(ArticleLink {
                title,
                url: resolved.to_string(),
            });
        }

        if !candidates.is_empty() {
            break;
        }
    }

    if candidates.is_empty() {
        log::info!("no links found with standard selectors, trying broad scan");
        candidates = fallback_scan(&document, &base);
    }

    dedupe_by_url(candidates)
}

/// Scan every link on the page for news-like URL patterns.
fn fallback_scan(document: &Html, base: &Url) -> Vec<ArticleLink> {
    let selector = Selector::parse("a[href]").expect("static selector");
    let mut found = Vec::new();

    for link in document.select(&selector) {
        let Some(href) = link.attr("href") else {
            continue;
        };
        let title = element_text(&link);

        if !FALLBACK_PATTERNS.iter().any(|p| href.contains(p)) {
            continue;
        }

        if title.chars().count() <= MIN_FALLBACK_TITLE_LEN {
            continue;
        }

        let Ok(resolved) = base.join(href) else {
            continue;
        };

        found.push(ArticleLink {
            title,
            url: resolved.to_string(),
        });
    }

    found
}

/// Keep the first occurrence of each URL, preserving document order.
fn dedupe_by_url(links: Vec<ArticleLink>) -> Vec<ArticleLink> {
    let mut seen = HashSet::new();
    links
        .into_iter()
        .filter(|link| seen.insert(link.url.clone()))
        .collect()
}

/// Collect an element's text with whitespace runs collapsed.
fn element_text(element: &scraper::ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
