//! Data model for a downloaded novel: the book reference given by the user, the book, and its chapters.

use crate::scraper::ScraperError;
use reqwest::Url;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// What the user asked for: a numeric book id or a title to search for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookRef {
    Id(u64),
    Title(String),
}

impl FromStr for BookRef {
    type Err = ScraperError;

    /// All-digit input is an id (must be positive); any other non-blank text is a title.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ScraperError::InvalidArgument {
                reason: "book reference is empty".to_string(),
            });
        }
        if s.chars().all(|c| c.is_ascii_digit()) {
            let id: u64 = s.parse().map_err(|_| ScraperError::InvalidArgument {
                reason: format!("book id '{}' is out of range", s),
            })?;
            if id == 0 {
                return Err(ScraperError::InvalidArgument {
                    reason: "book id must be a positive integer".to_string(),
                });
            }
            return Ok(BookRef::Id(id));
        }
        Ok(BookRef::Title(s.to_string()))
    }
}

impl fmt::Display for BookRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookRef::Id(id) => write!(f, "{}", id),
            BookRef::Title(title) => f.write_str(title),
        }
    }
}

/// One chapter in reading order. `location` is absolute and never changes after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chapter {
    name: String,
    location: String,
}

impl Chapter {
    /// Join `path` (as found on the directory page) onto `base`.
    pub fn new(name: impl Into<String>, base: &Url, path: &str) -> Result<Self, ScraperError> {
        let location = base.join(path).map_err(|e| ScraperError::InvalidUrl {
            input: path.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            name: name.into(),
            location: location.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

impl fmt::Display for Chapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.name, self.location)
    }
}

/// A resolved novel. Built once by [fetch_book](crate::scraper::fetch_book); read-only afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Book {
    id: u64,
    title: String,
    chapters: Vec<Chapter>,
}

impl Book {
    pub(crate) fn new(id: u64, title: String, chapters: Vec<Chapter>) -> Self {
        Self {
            id,
            title,
            chapters,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Chapters in directory (reading) order.
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }
}
