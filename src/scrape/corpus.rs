//! Corpus assembly: orchestrates the homepage scrape into one text blob.

use std::thread::sleep;
use std::time::Duration;

use crate::config::ScrapeConfig;
use crate::scrape::article::fetch_article_content;
use crate::scrape::links::{extract_links, ArticleLink};
use crate::scrape::{fetch_page, FetchError};

/// An article link with its extracted content attached.
#[derive(Debug, Clone)]
pub struct ArticleRecord {
    pub title: String,
    pub url: String,
    /// Extracted body text, or one of the fixed placeholder strings
    pub content: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// A homepage fetch failure aborts the whole scrape; there is no
    /// partial corpus.
    #[error("homepage fetch failed: {0}")]
    Homepage(#[from] FetchError),
}

/// Scrape the homepage and collect up to `max_articles` article records.
///
/// Articles are fetched sequentially with a fixed pause between requests.
/// The pause is a politeness contract with the source site, not a tunable
/// performance knob.
pub fn scrape_articles(config: &ScrapeConfig) -> Result<Vec<ArticleRecord>, ScrapeError> {
    log::info!("scraping homepage for headlines and links: {}", config.base_url);

    let html = fetch_page(&config.base_url, config)?;
    let links = extract_links(&html, &config.base_url);

    log::info!("found {} unique articles, starting content scraping", links.len());

    let mut records = Vec::new();
    let total = links.len().min(config.max_articles);

    for (i, ArticleLink { title, url }) in links.into_iter().enumerate() {
        log::info!("({}/{})", i + 1, total);

        let content = fetch_article_content(&url, config);
        records.push(ArticleRecord {
            title,
            url,
            content,
        });

        if records.len() >= config.max_articles {
            break;
        }

        sleep(Duration::from_secs(config.request_delay_secs));
    }

    log::info!("scraping complete, {} articles collected", records.len());

    Ok(records)
}

/// Concatenate records into the corpus string.
///
/// Records are joined as `HEADLINE: {title} CONTENT: {content}` with no
/// separator between them.
pub fn records_to_corpus(records: &[ArticleRecord]) -> String {
    records
        .iter()
        .map(|r| format!("HEADLINE: {} CONTENT: {}", r.title, r.content))
        .collect()
}

/// Run the full scrape and return the corpus blob.
pub fn build_corpus(config: &ScrapeConfig) -> Result<String, ScrapeError> {
    let records = scrape_articles(config)?;
    Ok(records_to_corpus(&records))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, content: &str) -> ArticleRecord {
        ArticleRecord {
            title: title.to_string(),
            url: format!("http://www.adaderana.lk/news/{title}"),
            content: content.to_string(),
        }
    }

    #[test]
    fn corpus_concatenation_format() {
        let records = vec![record("One", "first body"), record("Two", "second body")];

        let corpus = records_to_corpus(&records);
        assert_eq!(
            corpus,
            "HEADLINE: One CONTENT: first bodyHEADLINE: Two CONTENT: second body"
        );
    }

    #[test]
    fn empty_records_yield_empty_corpus() {
        assert_eq!(records_to_corpus(&[]), "");
    }

    #[test]
    fn homepage_fetch_failure_aborts_scrape() {
        let config = ScrapeConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_secs: 1,
            ..Default::default()
        };

        let result = scrape_articles(&config);
        assert!(matches!(result, Err(ScrapeError::Homepage(_))));
    }
}
