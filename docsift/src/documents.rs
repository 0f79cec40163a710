//! Document writes and single-page reads.

use crate::{
    backend::SearchBackend,
    document::{Document, Hit},
    error::{DocsiftError, Result},
    query::Query,
    search::{SearchRequest, Window},
};
use serde_json::json;
use tracing::{debug, info};

/// Window size for lookups by ID.
const LOOKUP_SIZE: usize = 10;

/// Write a document under an explicit ID.
///
/// Fails with [`DocsiftError::WriteFailure`] when no shard acknowledged the
/// write. Nothing is retried.
pub async fn index_document(
    backend: &dyn SearchBackend,
    index: &str,
    id: &str,
    doc: &Document,
) -> Result<()> {
    debug!("Indexing document {} in index {}", id, index);

    let shards = backend.index_document(index, id, doc).await?;

    if shards.is_failure() {
        return Err(DocsiftError::WriteFailure {
            index: index.to_string(),
            id: id.to_string(),
            successful: shards.successful,
            total: shards.total,
        });
    }

    Ok(())
}

/// Write `count` sample documents `{key1: i, key2: 2i}` with IDs `0..count`.
///
/// Stops at the first failed write.
pub async fn inject(backend: &dyn SearchBackend, index: &str, count: usize) -> Result<()> {
    for i in 0..count {
        let doc = sample_document(i);
        index_document(backend, index, &i.to_string(), &doc).await?;
    }

    info!("Injected {} documents into {}", count, index);
    Ok(())
}

/// The sample document with sequence number `i`.
pub fn sample_document(i: usize) -> Document {
    let mut doc = Document::new();
    doc.insert("key1".to_string(), json!(i));
    doc.insert("key2".to_string(), json!(2 * i));
    doc
}

/// Look a document up by its ID.
pub async fn get_by_id(backend: &dyn SearchBackend, index: &str, id: &str) -> Result<Document> {
    debug!("Getting document {} from index {}", id, index);

    let request = SearchRequest::new(
        index,
        Query::id(id),
        Window::Offset {
            from: 0,
            size: LOOKUP_SIZE,
        },
    );

    let hits = fetch_page(backend, &request).await?;

    hits.into_iter()
        .next()
        .map(Hit::into_source)
        .ok_or_else(|| DocsiftError::DocumentNotFound {
            index: index.to_string(),
            id: id.to_string(),
        })
}

/// Run a query and return its first `size` matching documents.
pub async fn search(
    backend: &dyn SearchBackend,
    index: &str,
    query: &Query,
    size: usize,
) -> Result<Vec<Document>> {
    debug!("Searching index {} for {} documents", index, size);

    let request = SearchRequest::new(index, query.clone(), Window::Offset { from: 0, size });
    let hits = fetch_page(backend, &request).await?;

    Ok(hits.into_iter().map(Hit::into_source).collect())
}

async fn fetch_page(backend: &dyn SearchBackend, request: &SearchRequest) -> Result<Vec<Hit>> {
    let page = backend.search(request).await?;

    if page.shards.is_failure() {
        return Err(DocsiftError::FetchFailure {
            successful: page.shards.successful,
            total: page.shards.total,
        });
    }

    Ok(page.hits)
}
