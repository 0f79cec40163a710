//! The search service seam.

use crate::{
    config::KeepAlive,
    document::Document,
    error::Result,
    search::{CursorToken, ResultPage, SearchRequest, ShardStatus},
};
use async_trait::async_trait;
use serde_json::Value;

/// Capabilities the remote index service exposes.
///
/// [`OpenSearchClient`](crate::OpenSearchClient) is the production
/// implementation. Every algorithm in this crate takes the backend as an
/// explicit argument and awaits one call at a time.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run a query with the given window.
    ///
    /// Shard failures are reported through [`ResultPage::shards`], not as an
    /// error; callers decide what a failed shard count means.
    async fn search(&self, request: &SearchRequest) -> Result<ResultPage>;

    /// Fetch the next batch of an open scroll.
    ///
    /// Returns [`DocsiftError::CursorExpired`](crate::DocsiftError::CursorExpired)
    /// when the service no longer knows the handle.
    async fn scroll(&self, cursor: &CursorToken, keep_alive: KeepAlive) -> Result<ResultPage>;

    /// Release an open scroll before its keep-alive lapses.
    ///
    /// A handle the service no longer knows counts as released.
    async fn clear_scroll(&self, cursor: &CursorToken) -> Result<()>;

    /// Raw mapping description of an index, keyed by index name.
    async fn get_mapping(&self, index: &str) -> Result<Value>;

    /// Write a document under an explicit ID.
    async fn index_document(&self, index: &str, id: &str, doc: &Document) -> Result<ShardStatus>;
}
