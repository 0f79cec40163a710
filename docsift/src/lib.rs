//! Schema flattening and full-result pagination for OpenSearch and
//! Elasticsearch-compatible indices.
//!
//! This crate provides:
//! - Flattening of an index mapping into fully-qualified field paths
//! - Three interchangeable ways of reading an entire result set: offset
//!   windows, scroll cursors and search-after sort keys
//! - Document writes and single-page reads with shard-status checks
//! - An OpenSearch-backed implementation of the [`SearchBackend`] seam
//!
//! # Example
//!
//! ```rust,no_run
//! use docsift::{ClientConfig, OpenSearchClient, Paginator, Query, Strategy};
//! use docsift::schema::field_paths;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new("http://localhost:9200").with_page_size(100);
//!     let client = OpenSearchClient::new(config.clone())?;
//!
//!     // Every leaf field of the index, as dotted paths
//!     for path in field_paths(&client, "articles").await? {
//!         println!("{}", path);
//!     }
//!
//!     // Every matching document, whatever the server's page limit
//!     let query = Query::new(json!({ "range": { "views": { "gte": 10 } } }));
//!     let docs = Paginator::from_config(&client, Strategy::Scroll, &config)
//!         .fetch_all("articles", &query)
//!         .await?;
//!     println!("{} documents", docs.len());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod backend;
mod client;
mod config;
mod document;
mod error;
mod query;
mod search;

pub mod documents;
pub mod paginate;
pub mod schema;

pub use backend::SearchBackend;
pub use client::OpenSearchClient;
pub use config::{ClientConfig, DEFAULT_PAGE_SIZE, DEFAULT_URL, KeepAlive};
pub use document::{Document, Hit};
pub use error::{DocsiftError, Result};
pub use paginate::{
    OffsetWindow, PaginationStrategy, Paginator, ScrollCursor, SearchAfterCursor, Strategy,
};
pub use query::Query;
pub use schema::{FieldPath, Fields, MappingNode};
pub use search::{CursorToken, ResultPage, SearchRequest, ShardStatus, Window};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        ClientConfig, DocsiftError, Document, OpenSearchClient, PaginationStrategy, Paginator,
        Query, Result, SearchBackend, Strategy,
    };
}
