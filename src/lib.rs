//! sfdown: CLI downloader for SF light novels, outputting plain text or Markdown.

pub mod cli;
pub mod config;
pub mod download;
pub mod model;
pub mod render;
pub mod scraper;

// Re-exports for CLI and consumers.
pub use download::{download, DownloadError, DownloadEvent, DownloadOptions};
pub use model::{Book, BookRef, Chapter};
pub use render::{render, RenderError, RenderFormat};
pub use scraper::{
    fetch_book, MissingContentBehavior, PageFetcher, ScraperError, SfacgScraper, SourceClient,
    SourceClientBuilder, SourceConfig,
};
