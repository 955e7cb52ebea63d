//! Directory (MainIndex) page: book title and ordered chapter list.

use crate::model::Chapter;
use crate::scraper::{parse_selector, ScraperError, SfacgScraper};
use reqwest::Url;
use scraper::Html;

const TITLE_SELECTOR: &str = "h1.story-title";
const CATALOG_SELECTOR: &str = "div.catalog-list";
const CHAPTER_LINK_SELECTOR: &str = "div.catalog-list ul li a";

/// Directory page address for a book id.
pub(crate) fn directory_url(base: &Url, book_id: u64) -> Result<Url, ScraperError> {
    let path = format!("/Novel/{}/MainIndex/", book_id);
    base.join(&path).map_err(|e| ScraperError::InvalidUrl {
        input: path,
        reason: e.to_string(),
    })
}

/// Parse title and chapters from directory markup. Names (link `title`) and paths (link `href`)
/// are read as two sequences and paired by position; differing lengths or an empty name are errors.
fn parse_directory(
    html: &str,
    page_url: &str,
    base: &Url,
) -> Result<(String, Vec<Chapter>), ScraperError> {
    let doc = Html::parse_document(html);
    let malformed = |reason: &str| ScraperError::MalformedPage {
        url: page_url.to_string(),
        reason: reason.to_string(),
    };

    let title_sel = parse_selector(TITLE_SELECTOR)?;
    let title = doc
        .select(&title_sel)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| malformed("missing book title"))?;

    let catalog_sel = parse_selector(CATALOG_SELECTOR)?;
    if doc.select(&catalog_sel).next().is_none() {
        return Err(malformed("missing chapter list"));
    }

    let link_sel = parse_selector(CHAPTER_LINK_SELECTOR)?;
    let names: Vec<&str> = doc
        .select(&link_sel)
        .filter_map(|a| a.value().attr("title"))
        .collect();
    let paths: Vec<&str> = doc
        .select(&link_sel)
        .filter_map(|a| a.value().attr("href"))
        .collect();
    if names.len() != paths.len() {
        return Err(malformed(&format!(
            "{} chapter names but {} chapter links",
            names.len(),
            paths.len()
        )));
    }

    if let Some(pos) = names.iter().position(|n| n.trim().is_empty()) {
        return Err(malformed(&format!("chapter {} has an empty name", pos + 1)));
    }

    let chapters = names
        .into_iter()
        .zip(paths)
        .map(|(name, path)| Chapter::new(name, base, path))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((title, chapters))
}

impl SfacgScraper<'_> {
    /// Fetch the directory page for `book_id` and return (title, chapters in reading order).
    pub fn fetch_directory(
        &mut self,
        book_id: u64,
    ) -> Result<(String, Vec<Chapter>), ScraperError> {
        let url = directory_url(&self.config.base_url, book_id)?;
        let html = self
            .client
            .fetch(url.as_str())
            .map_err(|e| e.with_context("directory"))?;
        parse_directory(&html, url.as_str(), &self.config.base_url)
    }
}
