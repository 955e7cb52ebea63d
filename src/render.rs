//! Chapter rendering: plain text and Markdown.
//! Each chapter becomes one self-contained block; the output file is their concatenation.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const TEXT_INDENT: &str = "  ";
const MARKDOWN_INDENT: &str = "&emsp;&emsp;";
const MARKDOWN_LINE_BREAK: &str = "<br>";

/// Output format selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderFormat {
    #[default]
    PlainText,
    Markdown,
}

impl RenderFormat {
    /// File extension used for the default output name.
    pub fn extension(self) -> &'static str {
        match self {
            RenderFormat::PlainText => "txt",
            RenderFormat::Markdown => "md",
        }
    }
}

impl fmt::Display for RenderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderFormat::PlainText => f.write_str("text"),
            RenderFormat::Markdown => f.write_str("markdown"),
        }
    }
}

impl FromStr for RenderFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "txt" | "plaintext" | "plain" => Ok(RenderFormat::PlainText),
            "markdown" | "md" => Ok(RenderFormat::Markdown),
            _ => Err(RenderError::UnsupportedFormat {
                format: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Unsupported format: '{format}'. Use text or markdown.")]
    UnsupportedFormat { format: String },
}

/// Render one chapter. Pure: the same input always gives the same bytes.
///
/// Plain text: the name on its own line, then each paragraph indented by two spaces.
/// Markdown: `# name<br>`, then each paragraph as `&emsp;&emsp;text<br>`.
pub fn render(name: &str, paragraphs: &[String], format: RenderFormat) -> String {
    let capacity = name.len() + paragraphs.iter().map(|p| p.len() + 16).sum::<usize>() + 16;
    let mut out = String::with_capacity(capacity);
    match format {
        RenderFormat::PlainText => {
            out.push_str(name);
            out.push('\n');
            for p in paragraphs {
                out.push_str(TEXT_INDENT);
                out.push_str(p);
                out.push('\n');
            }
        }
        RenderFormat::Markdown => {
            out.push_str("# ");
            out.push_str(name);
            out.push_str(MARKDOWN_LINE_BREAK);
            out.push('\n');
            for p in paragraphs {
                out.push_str(MARKDOWN_INDENT);
                out.push_str(p);
                out.push_str(MARKDOWN_LINE_BREAK);
                out.push('\n');
            }
        }
    }
    out
}
