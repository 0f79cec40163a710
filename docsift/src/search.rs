//! Search requests, window parameters and result pages.

use crate::{config::KeepAlive, document::Hit, error::Result, query::Query};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

/// Pagination-control parameters attached to a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Window {
    /// `size` documents starting at `from`.
    Offset {
        /// Offset of the first document.
        from: usize,
        /// Documents per page.
        size: usize,
    },
    /// First page of a scroll; the service answers with a cursor token.
    OpenScroll {
        /// Documents per page.
        size: usize,
        /// Lease of the cursor.
        keep_alive: KeepAlive,
    },
    /// Ascending sort on `sort_field`, strictly after `after` when set.
    SearchAfter {
        /// Unique sort field.
        sort_field: String,
        /// Sort values of the last hit of the previous page.
        after: Option<Vec<Value>>,
        /// Documents per page.
        size: usize,
    },
}

impl Window {
    /// Documents per page.
    pub fn size(&self) -> usize {
        match self {
            Window::Offset { size, .. }
            | Window::OpenScroll { size, .. }
            | Window::SearchAfter { size, .. } => *size,
        }
    }
}

/// A query against one index together with its window.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Index to search.
    pub index: String,
    /// Query clause, forwarded unchanged.
    pub query: Query,
    /// Window parameters.
    pub window: Window,
}

impl SearchRequest {
    /// Create a search request.
    pub fn new(index: impl Into<String>, query: Query, window: Window) -> Self {
        Self {
            index: index.into(),
            query,
            window,
        }
    }

    /// Build the search body.
    pub fn body(&self) -> Value {
        let mut body = serde_json::Map::new();

        body.insert("query".to_string(), self.query.as_json().clone());
        body.insert("size".to_string(), json!(self.window.size()));

        match &self.window {
            Window::Offset { from, .. } => {
                body.insert("from".to_string(), json!(from));
            }
            Window::OpenScroll { .. } => {}
            Window::SearchAfter {
                sort_field, after, ..
            } => {
                body.insert(
                    "sort".to_string(),
                    json!([{ sort_field.as_str(): "asc" }]),
                );
                if let Some(after) = after {
                    body.insert("search_after".to_string(), Value::Array(after.clone()));
                }
            }
        }

        Value::Object(body)
    }

    /// Value of the `scroll` URL parameter, set only when opening a scroll.
    pub fn scroll_param(&self) -> Option<String> {
        match &self.window {
            Window::OpenScroll { keep_alive, .. } => Some(keep_alive.as_param()),
            _ => None,
        }
    }
}

/// Opaque scroll continuation handle.
///
/// Only ever handed back to the service that issued it, in sequence.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CursorToken(String);

impl CursorToken {
    /// Wrap a handle issued by the service.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw handle for the transport.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CursorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Handles run to kilobytes.
        f.debug_tuple("CursorToken")
            .field(&format_args!("{} bytes", self.0.len()))
            .finish()
    }
}

/// Shard participation reported with every read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShardStatus {
    /// Shards the request was sent to.
    pub total: u64,
    /// Shards that answered successfully.
    pub successful: u64,
    /// Shards that failed.
    #[serde(default)]
    pub failed: u64,
}

impl ShardStatus {
    /// All of `total` shards succeeded.
    pub fn healthy(total: u64) -> Self {
        Self {
            total,
            successful: total,
            failed: 0,
        }
    }

    /// No shard succeeded.
    pub fn failed(total: u64) -> Self {
        Self {
            total,
            successful: 0,
            failed: total,
        }
    }

    /// Policy: fewer than one successful shard is a total failure, whatever `total` says.
    pub fn is_failure(&self) -> bool {
        self.successful < 1
    }
}

/// One batch of hits returned by a fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage {
    /// Hits, at most the requested page size.
    pub hits: Vec<Hit>,
    /// Shard participation.
    pub shards: ShardStatus,
    /// Scroll continuation handle, when the request opened or continued a scroll.
    pub cursor: Option<CursorToken>,
}

impl ResultPage {
    /// Create a page without a cursor.
    pub fn new(hits: Vec<Hit>, shards: ShardStatus) -> Self {
        Self {
            hits,
            shards,
            cursor: None,
        }
    }

    /// Attach a cursor token.
    pub fn with_cursor(mut self, cursor: CursorToken) -> Self {
        self.cursor = Some(cursor);
        self
    }

    /// Whether the page holds no hits.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Parse a raw search or scroll response body.
    pub fn from_response(body: Value) -> Result<Self> {
        let raw: RawSearchResponse = serde_json::from_value(body)?;

        Ok(Self {
            hits: raw.hits.hits,
            shards: raw.shards,
            cursor: raw.scroll_id.map(CursorToken),
        })
    }
}

#[derive(Deserialize)]
struct RawSearchResponse {
    #[serde(rename = "_shards")]
    shards: ShardStatus,
    #[serde(default)]
    hits: RawHits,
    #[serde(rename = "_scroll_id")]
    scroll_id: Option<String>,
}

#[derive(Deserialize, Default)]
struct RawHits {
    #[serde(default)]
    hits: Vec<Hit>,
}
