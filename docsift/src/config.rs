//! Client configuration.

use crate::error::{DocsiftError, Result};
use std::env;
use std::fmt;
use std::time::Duration;

/// Default service address.
pub const DEFAULT_URL: &str = "http://localhost:9200";

/// Default number of documents requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service URL(s). [`OpenSearchClient`](crate::OpenSearchClient) connects to the first non-empty one.
    pub urls: Vec<String>,
    /// Request timeout.
    pub request_timeout: Duration,
    /// Documents per page for full-result pagination.
    pub page_size: usize,
    /// Lease requested for scroll cursors, re-asserted on every continuation.
    pub keep_alive: KeepAlive,
    /// Unique field the search-after strategy sorts on.
    pub sort_field: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}

impl ClientConfig {
    /// Create a new configuration with a single URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            request_timeout: Duration::from_secs(30),
            page_size: DEFAULT_PAGE_SIZE,
            keep_alive: KeepAlive::default(),
            sort_field: "_id".to_string(),
        }
    }

    /// Build configuration from `DOCSIFT_*` environment variables.
    ///
    /// - `DOCSIFT_URL` - service URL (default `http://localhost:9200`)
    /// - `DOCSIFT_PAGE_SIZE` - documents per page (default 10)
    /// - `DOCSIFT_KEEP_ALIVE_SECS` - scroll lease in seconds (default 60)
    ///
    /// Unset variables keep their defaults; set but unparsable numbers are
    /// [`DocsiftError::Validation`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let url = lookup("DOCSIFT_URL").unwrap_or_else(|| DEFAULT_URL.to_string());
        let mut config = Self::new(url);

        if let Some(page_size) = lookup("DOCSIFT_PAGE_SIZE") {
            config.page_size = parse_number("DOCSIFT_PAGE_SIZE", &page_size)?;
        }

        if let Some(secs) = lookup("DOCSIFT_KEEP_ALIVE_SECS") {
            let secs = parse_number("DOCSIFT_KEEP_ALIVE_SECS", &secs)?;
            config.keep_alive = KeepAlive::new(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Set request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the page size used by pagination strategies.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the scroll keep-alive.
    pub fn with_keep_alive(mut self, keep_alive: KeepAlive) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    /// Set the search-after sort field.
    pub fn with_sort_field(mut self, field: impl Into<String>) -> Self {
        self.sort_field = field.into();
        self
    }

    /// Reject configurations no request could be built from.
    pub fn validate(&self) -> Result<()> {
        if self.urls.iter().all(|u| u.trim().is_empty()) {
            return Err(DocsiftError::Validation("No URLs provided".to_string()));
        }
        if self.page_size == 0 {
            return Err(DocsiftError::Validation(
                "Page size must be greater than zero".to_string(),
            ));
        }
        if self.sort_field.is_empty() {
            return Err(DocsiftError::Validation(
                "Sort field must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| DocsiftError::Validation(format!("{} is not a number: {:?}", key, raw)))
}

/// Server-side lease of a scroll cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepAlive(Duration);

impl KeepAlive {
    /// Create a keep-alive of the given duration.
    pub fn new(duration: Duration) -> Self {
        Self(duration)
    }

    /// Lease duration.
    pub fn duration(&self) -> Duration {
        self.0
    }

    /// Render as a service time unit (`1m`, `90s`, `500ms`).
    pub fn as_param(&self) -> String {
        let millis = self.0.as_millis();
        if millis % 1000 != 0 || millis == 0 {
            return format!("{}ms", millis);
        }
        let secs = millis / 1000;
        if secs % 60 == 0 {
            format!("{}m", secs / 60)
        } else {
            format!("{}s", secs)
        }
    }
}

impl Default for KeepAlive {
    fn default() -> Self {
        Self(Duration::from_secs(60))
    }
}

impl fmt::Display for KeepAlive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_param())
    }
}
