//! CLI parsing and orchestration. Parses args, resolves the book, downloads it as text or Markdown.
//! Maps errors to exit codes.

use crate::config::{self, Config};
use crate::download::{download, percent_complete, DownloadError, DownloadEvent, DownloadOptions};
use crate::model::BookRef;
use crate::render::{RenderError, RenderFormat};
use crate::scraper::{
    fetch_book, MissingContentBehavior, ScraperError, SfacgScraper, SourceClient, SourceConfig,
};
use clap::Parser;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// CLI error carrying exit code and message.
#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Scraper(#[from] ScraperError),

    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("{0}")]
    Download(DownloadError),
}

impl From<DownloadError> for CliRunError {
    fn from(e: DownloadError) -> Self {
        match e {
            DownloadError::Scraper(e) => CliRunError::Scraper(e),
            other => CliRunError::Download(other),
        }
    }
}

impl CliRunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliRunError::InvalidInput(_)
            | CliRunError::Scraper(ScraperError::InvalidArgument { .. })
            | CliRunError::Scraper(ScraperError::InvalidUrl { .. })
            | CliRunError::Scraper(ScraperError::InvalidHeader { .. }) => 1,
            CliRunError::Scraper(_) => 2,
            CliRunError::Render(_) | CliRunError::Download(_) => 3,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "sfdown")]
#[command(about = "Download an SF light novel as a single text or Markdown file")]
#[command(
    after_help = "Config file keys (output_dir, user_agent, timeout_secs, base_url, search_url, headers, format, missing_content) are read from ./sfdown.toml or the user config dir. CLI flags override config."
)]
pub struct Args {
    /// Book id (e.g. 714288) or title to search for.
    pub book: String,

    /// Output path. Default: ./{title}.{ext} where ext depends on --format.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format: text or markdown (default text).
    #[arg(long)]
    pub format: Option<String>,

    /// Chapter page without content: empty (default) or fail.
    #[arg(long, value_parser = parse_missing_content)]
    pub missing_content: Option<MissingContentBehavior>,

    /// HTTP User-Agent (overrides config).
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Request timeout in seconds (overrides config; default 30).
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Resolve the book and print its directory as JSON without downloading.
    #[arg(long)]
    pub list: bool,

    /// Suppress progress output (errors only).
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug logging and verbose error chain.
    #[arg(long)]
    pub verbose: bool,
}

/// Output format from the flag, else the config file, else plain text.
fn resolve_format(
    flag: Option<&str>,
    config: Option<&Config>,
) -> Result<RenderFormat, RenderError> {
    match flag.or_else(|| config.and_then(|c| c.format.as_deref())) {
        Some(name) => name.parse(),
        None => Ok(RenderFormat::default()),
    }
}

fn parse_missing_content(s: &str) -> Result<MissingContentBehavior, String> {
    match s.to_lowercase().as_str() {
        "empty" => Ok(MissingContentBehavior::Empty),
        "fail" => Ok(MissingContentBehavior::Fail),
        _ => Err(format!(
            "Invalid --missing-content value: '{}'. Use empty or fail.",
            s
        )),
    }
}

/// Ensure output path parent exists.
fn validate_output_path(path: &Path) -> Result<(), CliRunError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(CliRunError::InvalidInput(format!(
                "Cannot write output: {}: parent directory does not exist.",
                path.display()
            )));
        }
    }
    Ok(())
}

/// Bar sized to the chapter count, shown before the first chapter is fetched.
fn progress_bar(total: u64) -> indicatif::ProgressBar {
    let bar = indicatif::ProgressBar::new(total);
    if let Ok(style) = indicatif::ProgressStyle::default_bar()
        .template("{spinner} {msg} [{bar:40}] {pos}/{len} ({elapsed})")
    {
        bar.set_style(
            style
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .progress_chars("█▉▊▋▌▍▎▏ "),
        );
    }
    bar.set_message(format!("{:.2}%", 0.0));
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Source settings from defaults, then config file, then CLI flags.
fn source_config(args: &Args, config: Option<&Config>) -> Result<SourceConfig, CliRunError> {
    let mut source = SourceConfig::default();
    if let Some(c) = config {
        if let Some(ref url) = c.base_url {
            source = source.with_base_url(url)?;
        }
        if let Some(ref url) = c.search_url {
            source = source.with_search_url(url)?;
        }
        if let Some(ref headers) = c.headers {
            source.headers = headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
        }
    }
    if let Some(ua) = args
        .user_agent
        .clone()
        .or_else(|| config.and_then(|c| c.user_agent.clone()))
    {
        source.user_agent = ua;
    }
    if let Some(secs) = args.timeout.or_else(|| config.and_then(|c| c.timeout_secs)) {
        source.timeout_secs = secs;
    }
    Ok(source)
}

/// Entry point for the CLI. Returns Ok(()) on success; Err with exit code and message on failure.
pub fn run(args: &Args) -> Result<(), CliRunError> {
    let reference: BookRef = args.book.parse()?;

    let config = config::load_config().map_err(CliRunError::InvalidInput)?;
    let config = config.as_ref();

    let format = resolve_format(args.format.as_deref(), config)?;
    let missing_content = match args.missing_content {
        Some(b) => b,
        None => match config.and_then(|c| c.missing_content.as_deref()) {
            Some(s) => parse_missing_content(s).map_err(CliRunError::InvalidInput)?,
            None => MissingContentBehavior::default(),
        },
    };
    let output_dir = config.and_then(|c| c.output_dir.clone());

    let source = source_config(args, config)?;
    let mut client = SourceClient::new(&source)?;
    let mut scraper = SfacgScraper::new(&mut client, &source).missing_content(missing_content);

    let book = fetch_book(&reference, &mut scraper)?;

    if args.list {
        let json = serde_json::to_string_pretty(&book)
            .map_err(|e| CliRunError::InvalidInput(format!("Failed to print directory: {}", e)))?;
        println!("{}", json);
        return Ok(());
    }

    let options = DownloadOptions {
        output: args.output.clone(),
        output_dir,
        format,
        on_event: None,
    };
    validate_output_path(&options.output_path(&book))?;

    let progress_state: RefCell<Option<indicatif::ProgressBar>> = RefCell::new(if args.quiet {
        None
    } else {
        Some(progress_bar(book.chapters().len() as u64))
    });
    let progress_cb = |event: &DownloadEvent<'_>| match event {
        DownloadEvent::ChapterDone {
            chapter,
            done,
            total,
        } => {
            if let Some(pb) = progress_state.borrow().as_ref() {
                pb.set_position(*done as u64);
                pb.set_message(format!("{:.2}%", percent_complete(*done, *total)));
                pb.println(format!(
                    "{} done ({:.2}%)",
                    chapter.name(),
                    percent_complete(*done, *total)
                ));
            }
        }
        DownloadEvent::Completed { title, path } => {
            if let Some(pb) = progress_state.borrow_mut().take() {
                pb.disable_steady_tick();
                pb.finish_and_clear();
            }
            eprintln!("Downloaded {} to {}", title, path.display());
        }
    };

    let on_event: Option<&dyn Fn(&DownloadEvent<'_>)> =
        if args.quiet { None } else { Some(&progress_cb) };
    let options = DownloadOptions { on_event, ..options };

    let result = download(&book, &mut scraper, &options);
    if let Some(pb) = progress_state.borrow_mut().take() {
        pb.abandon();
    }
    result?;
    Ok(())
}
