//! Book id resolution: numeric ids pass through, titles go through the site search.

use crate::model::BookRef;
use crate::scraper::{parse_selector, ScraperError, SfacgScraper};
use regex::Regex;
use reqwest::Url;
use scraper::Html;
use std::sync::OnceLock;

static RE_NOVEL_ID: OnceLock<Regex> = OnceLock::new();

fn re_novel_id() -> &'static Regex {
    RE_NOVEL_ID.get_or_init(|| Regex::new(r"/Novel/(\d+)").expect("compile RE_NOVEL_ID"))
}

/// Build the search page URL for a title query.
fn search_url(search_base: &Url, query: &str) -> Result<Url, ScraperError> {
    Url::parse_with_params(
        search_base.as_str(),
        &[("Key", query), ("S", "1"), ("SS", "0")],
    )
    .map_err(|e| ScraperError::InvalidUrl {
        input: search_base.to_string(),
        reason: e.to_string(),
    })
}

/// Numeric book id embedded in a result link, e.g. `//book.sfacg.com/Novel/714288/`.
fn parse_novel_id(href: &str) -> Option<u64> {
    re_novel_id()
        .captures(href)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .filter(|id| *id > 0)
}

/// First result on the search page. Later results are ignored.
fn parse_first_result(html: &str) -> Result<Option<u64>, ScraperError> {
    let doc = Html::parse_document(html);
    let link_sel = parse_selector(r#"a[href*="/Novel/"]"#)?;
    Ok(doc
        .select(&link_sel)
        .filter_map(|a| a.value().attr("href"))
        .next()
        .and_then(parse_novel_id))
}

impl SfacgScraper<'_> {
    /// Turn a book reference into a canonical id. Ids need no network access.
    pub fn resolve(&mut self, reference: &BookRef) -> Result<u64, ScraperError> {
        match reference {
            BookRef::Id(0) => Err(ScraperError::InvalidArgument {
                reason: "book id must be a positive integer".to_string(),
            }),
            BookRef::Id(id) => Ok(*id),
            BookRef::Title(title) if title.trim().is_empty() => {
                Err(ScraperError::InvalidArgument {
                    reason: "book title is empty".to_string(),
                })
            }
            BookRef::Title(title) => {
                let url = search_url(&self.config.search_url, title)?;
                let html = self
                    .client
                    .fetch(url.as_str())
                    .map_err(|e| e.with_context("search"))?;
                let id = parse_first_result(&html)?.ok_or_else(|| ScraperError::NotFound {
                    query: title.clone(),
                })?;
                tracing::debug!(query = %title, id, "search resolved");
                Ok(id)
            }
        }
    }
}
