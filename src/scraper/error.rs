//! Shared error type for book resolution, directory acquisition, and chapter extraction.

use thiserror::Error;

/// Errors raised while talking to the novel site or reading its pages.
#[derive(Debug, Error)]
pub enum ScraperError {
    // Book reference
    #[error("Invalid book reference: {reason}")]
    InvalidArgument { reason: String },

    #[error("No book found for '{query}'.")]
    NotFound { query: String },

    #[error("Invalid URL: {input}: {reason}")]
    InvalidUrl { input: String, reason: String },

    // HTTP and network
    #[error("Network error: could not reach {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("HTTP {status} when fetching {}: {url}", .context.as_deref().unwrap_or("page"))]
    HttpStatus {
        status: u16,
        url: String,
        /// What was being fetched, e.g. "directory" or "chapter <name>". Set by `with_context`.
        context: Option<String>,
    },

    #[error("Failed to read response body from {url}: {source}")]
    BodyRead { url: String, source: reqwest::Error },

    #[error("Invalid request header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Failed to create HTTP client: {source}")]
    ClientBuild { source: reqwest::Error },

    // Parsing
    #[error("Unexpected page structure at {url}: {reason}")]
    MalformedPage { url: String, reason: String },

    #[error("Invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },
}

impl ScraperError {
    /// True for any failure to retrieve a page (connection, HTTP status, body read).
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            ScraperError::Network { .. }
                | ScraperError::HttpStatus { .. }
                | ScraperError::BodyRead { .. }
        )
    }

    /// Tag an HTTP status error with what was being fetched. Other errors pass through.
    pub fn with_context(self, what: impl Into<String>) -> Self {
        match self {
            ScraperError::HttpStatus {
                status,
                url,
                context: None,
            } => ScraperError::HttpStatus {
                status,
                url,
                context: Some(what.into()),
            },
            other => other,
        }
    }
}
