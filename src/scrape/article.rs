//! Article body extraction.
//!
//! Fetch and parse failures at the single-article level never abort the
//! corpus build: they turn into fixed placeholder strings, which are
//! legitimate content values downstream.

use scraper::{Html, Selector};

use crate::config::ScrapeConfig;
use crate::scrape::fetch_page;

/// Content value substituted when the article request fails.
pub const FETCH_FAILED_PLACEHOLDER: &str = "Failed to retrieve article content.";
/// Content value substituted when the article page cannot be processed.
pub const PARSE_FAILED_PLACEHOLDER: &str = "Error parsing article content.";

/// Container selectors tried in priority order. The first container whose
/// paragraphs yield non-empty text wins.
const CONTENT_SELECTORS: &[&str] = &[
    ".article-content",
    ".story-content",
    ".main-content",
    ".content",
    r#"[class*="content"]"#,
    r#"[class*="body"]"#,
    r#"[class*="story"]"#,
];

/// Minimum paragraph length for the whole-document fallback.
const MIN_FALLBACK_PARAGRAPH_LEN: usize = 50;

#[derive(Debug, thiserror::Error)]
#[error("selector parse error: {0}")]
pub struct ParseError(String);

/// Fetch an article and extract its body text.
///
/// Never fails: fetch errors yield [`FETCH_FAILED_PLACEHOLDER`] and
/// processing errors yield [`PARSE_FAILED_PLACEHOLDER`].
pub fn fetch_article_content(url: &str, config: &ScrapeConfig) -> String {
    log::info!("fetching article: {url}");

    let html = match fetch_page(url, config) {
        Ok(html) => html,
        Err(err) => {
            log::warn!("{url}: failed to fetch article: {err}");
            return FETCH_FAILED_PLACEHOLDER.to_string();
        }
    };

    match extract_article_text(&html) {
        Ok(text) => text,
        Err(err) => {
            log::warn!("{url}: failed to parse article: {err}");
            PARSE_FAILED_PLACEHOLDER.to_string()
        }
    }
}

/// Extract body text from article HTML.
///
/// Tries the container selector chain first; if no container yields any
/// paragraph text, falls back to collecting every sufficiently long
/// paragraph in document order. A page with no paragraphs at all yields
/// an empty string.
pub fn extract_article_text(html: &str) -> Result<String, ParseError> {
    let document = Html::parse_document(html);
    let p_selector = parse_selector("p")?;

    for selector_str in CONTENT_SELECTORS {
        let selector = parse_selector(selector_str)?;

        let Some(container) = document.select(&selector).next() else {
            continue;
        };

        let text = container
            .select(&p_selector)
            .filter_map(|p| {
                let text = paragraph_text(&p);
                (!text.is_empty()).then_some(text)
            })
            .collect::<Vec<_>>()
            .join("\n");

        if !text.is_empty() {
            return Ok(text);
        }
    }

    log::debug!("no content container matched, using paragraph-length fallback");

    let text = document
        .select(&p_selector)
        .filter_map(|p| {
            let text = paragraph_text(&p);
            (text.chars().count() > MIN_FALLBACK_PARAGRAPH_LEN).then_some(text)
        })
        .collect::<Vec<_>>()
        .join("\n");

    Ok(text)
}

fn parse_selector(selector: &str) -> Result<Selector, ParseError> {
    Selector::parse(selector).map_err(|err| ParseError(err.to_string()))
}

fn paragraph_text(element: &scraper::ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn story_content_container_preferred() {
        let html = r#"<html><body>
            <div class="story-content">
                <p>Hello world this is news.</p>
                <p></p>
            </div>
            <p>Unrelated footer paragraph that should not appear in the output at all.</p>
        </body></html>"#;

        let text = extract_article_text(html).unwrap();
        assert_eq!(text, "Hello world this is news.");
    }

    #[test]
    fn selector_priority_order() {
        let html = r#"<html><body>
            <div class="content"><p>Generic content paragraph.</p></div>
            <div class="article-content"><p>Article content paragraph.</p></div>
        </body></html>"#;

        let text = extract_article_text(html).unwrap();
        assert_eq!(text, "Article content paragraph.");
    }

    #[test]
    fn empty_container_falls_through_to_next_selector() {
        let html = r#"<html><body>
            <div class="article-content"></div>
            <div class="story-content"><p>Actual story text here.</p></div>
        </body></html>"#;

        let text = extract_article_text(html).unwrap();
        assert_eq!(text, "Actual story text here.");
    }

    #[test]
    fn paragraphs_joined_with_newline() {
        let html = r#"<html><body><div class="main-content">
            <p>First paragraph.</p>
            <p>Second paragraph.</p>
        </div></body></html>"#;

        let text = extract_article_text(html).unwrap();
        assert_eq!(text, "First paragraph.\nSecond paragraph.");
    }

    #[test]
    fn fallback_collects_long_paragraphs_in_order() {
        let html = r#"<html><body>
            <p>Short one.</p>
            <p>This paragraph is comfortably longer than fifty characters and should be kept.</p>
            <p>Another paragraph that clearly exceeds the fifty character threshold as well.</p>
        </body></html>"#;

        let text = extract_article_text(html).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("This paragraph"));
        assert!(lines[1].starts_with("Another paragraph"));
    }

    #[test]
    fn page_without_paragraphs_yields_empty_string() {
        let html = "<html><body><div>no paragraphs here</div></body></html>";
        assert_eq!(extract_article_text(html).unwrap(), "");
    }

    #[test]
    fn substring_class_selector_matches() {
        let html = r#"<html><body>
            <div class="post-body-wrapper"><p>Body text found through a substring class match.</p></div>
        </body></html>"#;

        let text = extract_article_text(html).unwrap();
        assert_eq!(text, "Body text found through a substring class match.");
    }

    #[test]
    fn fetch_failure_yields_placeholder() {
        let config = ScrapeConfig {
            timeout_secs: 1,
            ..Default::default()
        };

        let content = fetch_article_content("http://127.0.0.1:1/news/x", &config);
        assert_eq!(content, FETCH_FAILED_PLACEHOLDER);
    }
}
