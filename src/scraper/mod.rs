//! SF light novel source: configuration, page fetching, book resolution, directory and chapter parsing.

mod chapter;
mod client;
mod directory;
mod error;
mod search;

pub use client::{SourceClient, SourceClientBuilder};
pub use error::ScraperError;

use crate::model::{Book, BookRef};
use reqwest::Url;
use scraper::Selector;

pub const DEFAULT_BASE_URL: &str = "https://book.sfacg.com";
pub const DEFAULT_SEARCH_URL: &str = "https://s.sfacg.com/";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/92.0.4515.159 Safari/537.36";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where and how to reach the site. Built once and passed to the client and the scraper.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Site root; directory and chapter paths are joined onto it.
    pub base_url: Url,
    /// Search endpoint; the query is sent as `Key=<title>&S=1&SS=0`.
    pub search_url: Url,
    pub user_agent: String,
    /// Extra headers sent with every request.
    pub headers: Vec<(String, String)>,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        // Both constants are valid absolute URLs.
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).unwrap(),
            search_url: Url::parse(DEFAULT_SEARCH_URL).unwrap(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: Vec::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl SourceConfig {
    /// Replace the site root, validating it as an absolute URL.
    pub fn with_base_url(mut self, url: &str) -> Result<Self, ScraperError> {
        self.base_url = parse_url(url)?;
        Ok(self)
    }

    /// Replace the search endpoint, validating it as an absolute URL.
    pub fn with_search_url(mut self, url: &str) -> Result<Self, ScraperError> {
        self.search_url = parse_url(url)?;
        Ok(self)
    }
}

fn parse_url(input: &str) -> Result<Url, ScraperError> {
    Url::parse(input).map_err(|e| ScraperError::InvalidUrl {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// Fetch a page by absolute URL and return its markup.
///
/// [SourceClient] is the network implementation; tests substitute an in-memory one.
pub trait PageFetcher {
    fn fetch(&mut self, url: &str) -> Result<String, ScraperError>;
}

/// How to handle a chapter page that has no content container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingContentBehavior {
    /// Treat the chapter as empty (default).
    #[default]
    Empty,
    /// Fail with a malformed-page error.
    Fail,
}

/// Parse a CSS selector or return an error (avoids panics from Selector::parse).
fn parse_selector(sel: &str) -> Result<Selector, ScraperError> {
    Selector::parse(sel).map_err(|e| ScraperError::InvalidSelector {
        selector: sel.to_string(),
        reason: e.to_string(),
    })
}

/// Scraper for the SF light novel site. Borrows the page fetcher and source configuration.
pub struct SfacgScraper<'a> {
    client: &'a mut dyn PageFetcher,
    config: &'a SourceConfig,
    missing_content: MissingContentBehavior,
}

impl<'a> SfacgScraper<'a> {
    pub fn new(client: &'a mut dyn PageFetcher, config: &'a SourceConfig) -> Self {
        Self {
            client,
            config,
            missing_content: MissingContentBehavior::default(),
        }
    }

    pub fn missing_content(mut self, behavior: MissingContentBehavior) -> Self {
        self.missing_content = behavior;
        self
    }

    pub fn config(&self) -> &SourceConfig {
        self.config
    }
}

/// Resolve the reference and acquire the directory. No Book exists unless both succeed.
pub fn fetch_book(
    reference: &BookRef,
    scraper: &mut SfacgScraper<'_>,
) -> Result<Book, ScraperError> {
    let id = scraper.resolve(reference)?;
    let (title, chapters) = scraper.fetch_directory(id)?;
    tracing::info!(id, title = %title, chapters = chapters.len(), "directory acquired");
    Ok(Book::new(id, title, chapters))
}


#[cfg(test)]
mod tests {
    use super::testing::MapFetcher;
    use super::*;

    const SEARCH_HTML: &str = r#"<html><body><ul>
<li><strong><a href="//book.sfacg.com/Novel/714288/" target="_blank">测试小说</a></strong></li>
</ul></body></html>"#;

    const INDEX_HTML: &str = r#"<html><body>
<h1 class="story-title">测试小说</h1>
<div class="catalog-list"><ul>
<li><a href="/vol/1/" title="第一章">第一章</a></li>
<li><a href="/vol/2/" title="第二章">第二章</a></li>
</ul></div></body></html>"#;

    #[test]
    fn fetch_book_by_title_resolves_then_reads_directory() -> Result<(), ScraperError> {
        let config = SourceConfig::default();
        let mut fetcher = MapFetcher::new()
            .page(
                "https://s.sfacg.com/?Key=%E6%B5%8B%E8%AF%95&S=1&SS=0",
                SEARCH_HTML,
            )
            .page("https://book.sfacg.com/Novel/714288/MainIndex/", INDEX_HTML);
        let mut scraper = SfacgScraper::new(&mut fetcher, &config);
        let book = fetch_book(&BookRef::Title("测试".to_string()), &mut scraper)?;
        assert_eq!(book.id(), 714288);
        assert_eq!(book.title(), "测试小说");
        assert_eq!(book.chapters().len(), 2);
        assert_eq!(book.chapters()[1].location(), "https://book.sfacg.com/vol/2/");
        Ok(())
    }

    #[test]
    fn fetch_book_fails_without_partial_book_on_directory_error() {
        let config = SourceConfig::default();
        let mut fetcher = MapFetcher::new();
        let mut scraper = SfacgScraper::new(&mut fetcher, &config);
        let result = fetch_book(&BookRef::Id(5), &mut scraper);
        assert!(matches!(result, Err(ref e) if e.is_fetch_error()));
    }

    #[test]
    fn source_config_rejects_relative_base_url() {
        let result = SourceConfig::default().with_base_url("book.sfacg.com");
        assert!(matches!(result, Err(ScraperError::InvalidUrl { .. })));
    }

    #[test]
    fn source_config_overrides_urls() -> Result<(), ScraperError> {
        let config = SourceConfig::default()
            .with_base_url("http://localhost:8080")?
            .with_search_url("http://localhost:8080/search")?;
        assert_eq!(config.base_url.as_str(), "http://localhost:8080/");
        assert_eq!(config.search_url.as_str(), "http://localhost:8080/search");
        Ok(())
    }
}
