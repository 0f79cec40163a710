//! Error types for docsift operations.

use thiserror::Error;

/// Docsift error type.
///
/// Every variant aborts the operation that produced it. Nothing in this crate
/// retries or recovers locally.
#[derive(Error, Debug)]
pub enum DocsiftError {
    /// A document write reported zero successful shards.
    #[error("Write failed for {index}/{id}: {successful} of {total} shards succeeded")]
    WriteFailure {
        /// Index name.
        index: String,
        /// Document ID.
        id: String,
        /// Shards that acknowledged the write.
        successful: u64,
        /// Shards the write was sent to.
        total: u64,
    },

    /// A search, scroll or search-after request reported zero successful shards.
    #[error("Fetch failed: {successful} of {total} shards succeeded")]
    FetchFailure {
        /// Shards that answered.
        successful: u64,
        /// Shards the request was sent to.
        total: u64,
    },

    /// The scroll continuation handle was rejected as stale.
    #[error("Scroll cursor expired or was rejected by the service")]
    CursorExpired,

    /// A mapping node is neither a leaf nor a branch.
    #[error("Malformed schema: {0}")]
    MalformedSchema(String),

    /// Document not found.
    #[error("Document not found: {index}/{id}")]
    DocumentNotFound {
        /// Index name.
        index: String,
        /// Document ID.
        id: String,
    },

    /// Index not found.
    #[error("Index not found: {0}")]
    IndexNotFound(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The service rejected a request or answered with an unexpected shape.
    #[error("Query error: {0}")]
    Query(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Client error from opensearch crate.
    #[error("Client error: {0}")]
    Client(#[from] opensearch::Error),
}

/// Result type alias for docsift operations.
pub type Result<T> = std::result::Result<T, DocsiftError>;
