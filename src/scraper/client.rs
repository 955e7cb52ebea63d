//! Blocking HTTP client carrying the source's fixed identifying headers.

use crate::scraper::{PageFetcher, ScraperError, SourceConfig};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

const MAX_REDIRECTS: usize = 10;

/// Blocking HTTP client used for every page read. One request per call; no retry, no delay.
#[derive(Debug)]
pub struct SourceClient {
    inner: reqwest::blocking::Client,
}

impl SourceClient {
    /// Build a client from the source configuration (User-Agent, extra headers, timeout).
    pub fn new(config: &SourceConfig) -> Result<Self, ScraperError> {
        Self::builder()
            .user_agent(config.user_agent.clone())
            .headers(config.headers.clone())
            .timeout_secs(config.timeout_secs)
            .build()
    }

    /// Builder for custom User-Agent, headers and timeout.
    pub fn builder() -> SourceClientBuilder {
        SourceClientBuilder::default()
    }
}

impl PageFetcher for SourceClient {
    fn fetch(&mut self, url: &str) -> Result<String, ScraperError> {
        tracing::debug!(url, "GET");
        let response = self
            .inner
            .get(url)
            .send()
            .map_err(|e| ScraperError::Network {
                url: url.to_string(),
                source: e,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
                context: None,
            });
        }
        response.text().map_err(|e| ScraperError::BodyRead {
            url: url.to_string(),
            source: e,
        })
    }
}

/// Builder for SourceClient.
#[derive(Debug, Default)]
pub struct SourceClientBuilder {
    user_agent: Option<String>,
    headers: Vec<(String, String)>,
    timeout_secs: Option<u64>,
}

impl SourceClientBuilder {
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Extra headers sent with every request, in addition to User-Agent.
    pub fn headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn build(self) -> Result<SourceClient, ScraperError> {
        let mut header_map = HeaderMap::new();
        for (name, value) in &self.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| ScraperError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| ScraperError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            header_map.insert(header_name, header_value);
        }

        let mut builder = reqwest::blocking::Client::builder()
            .default_headers(header_map)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS));
        if let Some(ua) = self.user_agent {
            builder = builder.user_agent(ua);
        }
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let inner = builder
            .build()
            .map_err(|e| ScraperError::ClientBuild { source: e })?;
        Ok(SourceClient { inner })
    }
}
