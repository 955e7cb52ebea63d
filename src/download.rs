//! Download orchestration: extract, render and append every chapter in reading order.
//!
//! Chapters are processed strictly one after another. The first failure stops the run;
//! chapters already written stay in the output file.

use crate::model::{Book, Chapter};
use crate::render::{render, RenderFormat};
use crate::scraper::{ScraperError, SfacgScraper};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("{0}")]
    Scraper(#[from] ScraperError),

    #[error("Failed to write output: {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Notification emitted while a download runs.
#[derive(Debug)]
pub enum DownloadEvent<'a> {
    /// `done` of `total` chapters are written; `chapter` is the one just finished.
    ChapterDone {
        chapter: &'a Chapter,
        done: usize,
        total: usize,
    },
    /// Every chapter of `title` was written to `path`.
    Completed { title: &'a str, path: &'a Path },
}

/// Options for a download run.
#[derive(Default)]
pub struct DownloadOptions<'a> {
    /// Output file. Default: `<output_dir>/<title>.<ext>`.
    pub output: Option<PathBuf>,
    /// Directory for the default output file. Default: current directory.
    pub output_dir: Option<PathBuf>,
    /// Render format (default plain text).
    pub format: RenderFormat,
    /// Progress sink; `None` for silent runs.
    pub on_event: Option<&'a dyn Fn(&DownloadEvent<'_>)>,
}

impl DownloadOptions<'_> {
    /// Where the book will be written.
    pub fn output_path(&self, book: &Book) -> PathBuf {
        match &self.output {
            Some(p) => p.clone(),
            None => default_output_path(
                book.title(),
                self.format,
                self.output_dir.as_deref().unwrap_or(Path::new(".")),
            ),
        }
    }
}

/// Percentage of chapters completed, rounded to two decimals.
pub fn percent_complete(done: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (done as f64 / total as f64 * 100.0 * 100.0).round() / 100.0
}

/// Make a book title usable as a file name: path separators and reserved characters become `_`.
pub fn sanitize_file_name(title: &str) -> String {
    let s: String = title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let s = s.trim_matches(|c: char| c == '.' || c.is_whitespace());
    if s.is_empty() {
        "book".to_string()
    } else {
        s.to_string()
    }
}

/// `<dir>/<sanitized title>.<ext>`.
pub fn default_output_path(title: &str, format: RenderFormat, dir: &Path) -> PathBuf {
    dir.join(format!("{}.{}", sanitize_file_name(title), format.extension()))
}

/// Download every chapter of `book` into one file. Returns the path written.
pub fn download(
    book: &Book,
    scraper: &mut SfacgScraper<'_>,
    options: &DownloadOptions<'_>,
) -> Result<PathBuf, DownloadError> {
    let path = options.output_path(book);
    let write_err = |e: std::io::Error| DownloadError::FileWrite {
        path: path.clone(),
        source: e,
    };

    let file = File::create(&path).map_err(write_err)?;
    let mut out = BufWriter::new(file);

    let total = book.chapters().len();
    for (i, chapter) in book.chapters().iter().enumerate() {
        tracing::debug!(index = i + 1, total, chapter = chapter.name(), "fetching chapter");
        let paragraphs = scraper.extract_chapter(chapter)?;
        let block = render(chapter.name(), &paragraphs, options.format);
        out.write_all(block.as_bytes()).map_err(write_err)?;
        out.flush().map_err(write_err)?;
        if let Some(cb) = options.on_event {
            cb(&DownloadEvent::ChapterDone {
                chapter,
                done: i + 1,
                total,
            });
        }
    }
    out.flush().map_err(write_err)?;
    drop(out);

    tracing::info!(id = book.id(), title = book.title(), path = %path.display(), "download complete");
    if let Some(cb) = options.on_event {
        cb(&DownloadEvent::Completed {
            title: book.title(),
            path: &path,
        });
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BookRef;
    use crate::scraper::testing::MapFetcher;
    use crate::scraper::{fetch_book, SourceConfig};
    use std::cell::RefCell;

    const INDEX_URL: &str = "https://book.sfacg.com/Novel/100/MainIndex/";
    const INDEX_HTML: &str = r#"<html><body>
<h1 class="story-title">Three Chapters</h1>
<div class="catalog-list"><ul>
<li><a href="/vol/1/1/" title="Chapter 1">Chapter 1</a></li>
<li><a href="/vol/1/2/" title="Chapter 2">Chapter 2</a></li>
<li><a href="/vol/1/3/" title="Chapter 3">Chapter 3</a></li>
</ul></div></body></html>"#;

    fn chapter_html(n: u32) -> String {
        format!(
            r#"<html><body><div class="article-content font16"><p>Para {n}a</p><p>Para {n}b</p></div></body></html>"#
        )
    }

    fn fetcher_with(chapters: &[u32]) -> MapFetcher {
        let mut fetcher = MapFetcher::new().page(INDEX_URL, INDEX_HTML);
        for n in chapters {
            fetcher = fetcher.page(
                &format!("https://book.sfacg.com/vol/1/{}/", n),
                &chapter_html(*n),
            );
        }
        fetcher
    }

    fn run(
        fetcher: &mut MapFetcher,
        format: RenderFormat,
        output: &Path,
    ) -> Result<PathBuf, DownloadError> {
        let config = SourceConfig::default();
        let mut scraper = SfacgScraper::new(fetcher, &config);
        let book = fetch_book(&BookRef::Id(100), &mut scraper)?;
        let options = DownloadOptions {
            output: Some(output.to_path_buf()),
            format,
            ..Default::default()
        };
        download(&book, &mut scraper, &options)
    }

    #[test]
    fn plain_text_book_in_directory_order() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.txt");
        let mut fetcher = fetcher_with(&[1, 2, 3]);
        let written = run(&mut fetcher, RenderFormat::PlainText, &path)?;
        assert_eq!(written, path);
        let text = std::fs::read_to_string(&path)?;
        assert_eq!(
            text,
            "Chapter 1\n  Para 1a\n  Para 1b\n\
             Chapter 2\n  Para 2a\n  Para 2b\n\
             Chapter 3\n  Para 3a\n  Para 3b\n"
        );
        Ok(())
    }

    #[test]
    fn markdown_book_headers_and_indents() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.md");
        let mut fetcher = fetcher_with(&[1, 2, 3]);
        run(&mut fetcher, RenderFormat::Markdown, &path)?;
        let text = std::fs::read_to_string(&path)?;
        let headers: Vec<&str> = text.lines().filter(|l| l.starts_with("# ")).collect();
        assert_eq!(
            headers,
            ["# Chapter 1<br>", "# Chapter 2<br>", "# Chapter 3<br>"]
        );
        let paragraphs: Vec<&str> = text.lines().filter(|l| !l.starts_with("# ")).collect();
        assert_eq!(paragraphs.len(), 6);
        assert!(paragraphs.iter().all(|l| l.starts_with("&emsp;&emsp;")));
        Ok(())
    }

    #[test]
    fn failed_chapter_aborts_and_keeps_earlier_chapters() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.txt");
        let mut fetcher = fetcher_with(&[1, 3]);
        let err = run(&mut fetcher, RenderFormat::PlainText, &path).unwrap_err();
        match &err {
            DownloadError::Scraper(e) => assert!(e.is_fetch_error()),
            other => panic!("expected fetch error, got {:?}", other),
        }
        let text = std::fs::read_to_string(&path)?;
        assert_eq!(text, "Chapter 1\n  Para 1a\n  Para 1b\n");
        assert!(!fetcher
            .requests
            .iter()
            .any(|u| u == "https://book.sfacg.com/vol/1/3/"));
        Ok(())
    }

    #[test]
    fn progress_events_report_percentages_and_completion() -> Result<(), Box<dyn std::error::Error>>
    {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.txt");
        let mut fetcher = fetcher_with(&[1, 2, 3]);
        let config = SourceConfig::default();
        let mut scraper = SfacgScraper::new(&mut fetcher, &config);
        let book = fetch_book(&BookRef::Id(100), &mut scraper)?;

        let seen: RefCell<Vec<String>> = RefCell::new(Vec::new());
        let cb = |event: &DownloadEvent<'_>| {
            let line = match event {
                DownloadEvent::ChapterDone {
                    chapter,
                    done,
                    total,
                } => format!("{} {:.2}", chapter.name(), percent_complete(*done, *total)),
                DownloadEvent::Completed { title, .. } => format!("done {}", title),
            };
            seen.borrow_mut().push(line);
        };
        let options = DownloadOptions {
            output: Some(path),
            on_event: Some(&cb),
            ..Default::default()
        };
        download(&book, &mut scraper, &options)?;
        assert_eq!(
            *seen.borrow(),
            [
                "Chapter 1 33.33",
                "Chapter 2 66.67",
                "Chapter 3 100.00",
                "done Three Chapters"
            ]
        );
        Ok(())
    }

    #[test]
    fn unwritable_destination_is_file_write_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("missing").join("out.txt");
        let mut fetcher = fetcher_with(&[1, 2, 3]);
        let err = run(&mut fetcher, RenderFormat::PlainText, &path).unwrap_err();
        assert!(matches!(err, DownloadError::FileWrite { .. }));
        Ok(())
    }

    #[test]
    fn percent_complete_rounds_to_two_decimals() {
        assert_eq!(percent_complete(1, 3), 33.33);
        assert_eq!(percent_complete(2, 3), 66.67);
        assert_eq!(percent_complete(3, 3), 100.0);
        assert_eq!(percent_complete(1, 7), 14.29);
        assert_eq!(percent_complete(0, 0), 100.0);
    }

    #[test]
    fn default_output_path_uses_title_and_extension() {
        let dir = Path::new("out");
        assert_eq!(
            default_output_path("转生成为魔剑", RenderFormat::PlainText, dir),
            PathBuf::from("out/转生成为魔剑.txt")
        );
        assert_eq!(
            default_output_path("A/B: C?", RenderFormat::Markdown, dir),
            PathBuf::from("out/A_B_ C_.md")
        );
    }

    #[test]
    fn sanitize_file_name_empty_falls_back() {
        assert_eq!(sanitize_file_name("   "), "book");
        assert_eq!(sanitize_file_name(".."), "book");
    }
}
