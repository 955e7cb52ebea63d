//! Chapter page: paragraph text in document order.

use crate::model::Chapter;
use crate::scraper::{parse_selector, MissingContentBehavior, ScraperError, SfacgScraper};
use scraper::Html;

const CONTENT_SELECTOR: &str = "div.article-content.font16";
const PARAGRAPH_SELECTOR: &str = "div.article-content.font16 > p";

/// Paragraph texts of the content region, one per `<p>`, untrimmed.
///
/// Returns `None` when the page has no content container at all.
fn parse_paragraphs(html: &str) -> Result<Option<Vec<String>>, ScraperError> {
    let doc = Html::parse_document(html);
    let container_sel = parse_selector(CONTENT_SELECTOR)?;
    if doc.select(&container_sel).next().is_none() {
        return Ok(None);
    }
    let p_sel = parse_selector(PARAGRAPH_SELECTOR)?;
    Ok(Some(
        doc.select(&p_sel)
            .map(|p| p.text().collect::<String>())
            .collect(),
    ))
}

impl SfacgScraper<'_> {
    /// Fetch one chapter page and return its paragraphs. An empty chapter yields an empty Vec.
    pub fn extract_chapter(&mut self, chapter: &Chapter) -> Result<Vec<String>, ScraperError> {
        let html = self
            .client
            .fetch(chapter.location())
            .map_err(|e| e.with_context(format!("chapter {}", chapter.name())))?;
        match parse_paragraphs(&html)? {
            Some(paragraphs) => Ok(paragraphs),
            None => match self.missing_content {
                MissingContentBehavior::Empty => {
                    tracing::warn!(
                        chapter = chapter.name(),
                        url = chapter.location(),
                        "no content container; treating chapter as empty"
                    );
                    Ok(Vec::new())
                }
                MissingContentBehavior::Fail => Err(ScraperError::MalformedPage {
                    url: chapter.location().to_string(),
                    reason: "missing chapter content container".to_string(),
                }),
            },
        }
    }
}
