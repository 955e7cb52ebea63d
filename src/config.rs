//! Optional config file loading. Search order: ./sfdown.toml, then
//! $XDG_CONFIG_HOME/sfdown/config.toml (or ~/.config/sfdown/config.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file contents. All fields optional; only present keys override defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct Config {
    /// Default output directory when -o is not set. Paths are relative to CWD.
    pub output_dir: Option<PathBuf>,
    /// HTTP User-Agent header.
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Site root (default https://book.sfacg.com).
    pub base_url: Option<String>,
    /// Search endpoint (default https://s.sfacg.com/).
    pub search_url: Option<String>,
    /// Extra request headers, e.g. `headers = { Referer = "https://book.sfacg.com/" }`.
    pub headers: Option<std::collections::BTreeMap<String, String>>,
    /// Default output format: text or markdown.
    pub format: Option<String>,
    /// Chapter page without content container: empty (default) or fail.
    pub missing_content: Option<String>,
}

/// Parse a config file at `path`.
pub fn load_config_from(path: &Path) -> Result<Config, String> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| format!("Cannot read config {}: {}", path.display(), e))?;
    toml::from_str(&s).map_err(|e| format!("Invalid config {}: {}", path.display(), e))
}

/// Search order: (1) ./sfdown.toml, (2) $XDG_CONFIG_HOME/sfdown/config.toml.
/// Missing file returns Ok(None). Invalid TOML or I/O error reading a present file returns Err.
pub fn load_config() -> Result<Option<Config>, String> {
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Cannot determine current directory: {}", e))?;
    let mut paths = vec![cwd.join("sfdown.toml")];
    if let Some(d) = dirs::config_dir() {
        paths.push(d.join("sfdown").join("config.toml"));
    }
    for path in &paths {
        if path.exists() {
            tracing::debug!(path = %path.display(), "loading config");
            return load_config_from(path).map(Some);
        }
    }
    Ok(None)
}
