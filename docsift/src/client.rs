//! OpenSearch-backed [`SearchBackend`].

use crate::{
    backend::SearchBackend,
    config::{ClientConfig, KeepAlive},
    document::Document,
    error::{DocsiftError, Result},
    search::{CursorToken, ResultPage, SearchRequest, ShardStatus},
};
use async_trait::async_trait;
use opensearch::{
    ClearScrollParts, IndexParts, OpenSearch, ScrollParts, SearchParts,
    http::{
        StatusCode,
        transport::{SingleNodeConnectionPool, TransportBuilder},
    },
    indices::{IndicesGetMappingParts, IndicesRefreshParts},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info};

/// Error type the service reports for an unknown or lapsed scroll context.
const CONTEXT_MISSING: &str = "search_context_missing_exception";

/// OpenSearch (or Elasticsearch-compatible) search service client.
#[derive(Clone)]
pub struct OpenSearchClient {
    client: Arc<OpenSearch>,
    config: Arc<ClientConfig>,
}

impl OpenSearchClient {
    /// Create a new client. No request is sent until the first operation.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        info!("Initializing search client for: {:?}", config.urls);

        let url = config
            .urls
            .iter()
            .find(|u| !u.trim().is_empty())
            .ok_or_else(|| DocsiftError::Validation("No URLs provided".to_string()))?;

        let url = opensearch::http::Url::parse(url)
            .map_err(|e| DocsiftError::Validation(format!("Invalid URL: {}", e)))?;

        let conn_pool = SingleNodeConnectionPool::new(url);
        let transport = TransportBuilder::new(conn_pool)
            .timeout(config.request_timeout)
            .disable_proxy()
            .build()
            .map_err(|e| DocsiftError::Connection(e.to_string()))?;

        debug!("Search client initialized");

        Ok(Self {
            client: Arc::new(OpenSearch::new(transport)),
            config: Arc::new(config),
        })
    }

    /// Get the underlying OpenSearch client.
    pub fn inner(&self) -> &OpenSearch {
        &self.client
    }

    /// Get the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Refresh an index to make recent writes searchable.
    pub async fn refresh(&self, index: &str) -> Result<()> {
        debug!("Refreshing index {}", index);

        let response = self
            .client
            .indices()
            .refresh(IndicesRefreshParts::Index(&[index]))
            .send()
            .await?;

        let status = response.status_code();
        if status == StatusCode::NOT_FOUND {
            return Err(DocsiftError::IndexNotFound(index.to_string()));
        }
        if !status.is_success() {
            let body: Value = response.json().await?;
            return Err(DocsiftError::Query(error_reason(&body, "Refresh failed")));
        }

        Ok(())
    }
}

#[async_trait]
impl SearchBackend for OpenSearchClient {
    async fn search(&self, request: &SearchRequest) -> Result<ResultPage> {
        debug!("Searching index {} with {:?}", request.index, request.window);

        let indices = [request.index.as_str()];
        let scroll = request.scroll_param();

        let mut call = self
            .client
            .search(SearchParts::Index(&indices))
            .body(request.body());
        if let Some(scroll) = scroll.as_deref() {
            call = call.scroll(scroll);
        }

        let response = call.send().await?;
        let status = response.status_code();
        let body: Value = response.json().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(DocsiftError::IndexNotFound(request.index.clone()));
        }
        if !status.is_success() {
            return Err(DocsiftError::Query(error_reason(&body, "Search failed")));
        }

        ResultPage::from_response(body)
    }

    async fn scroll(&self, cursor: &CursorToken, keep_alive: KeepAlive) -> Result<ResultPage> {
        debug!("Continuing scroll with keep-alive {}", keep_alive);

        let response = self
            .client
            .scroll(ScrollParts::None)
            .body(json!({
                "scroll": keep_alive.as_param(),
                "scroll_id": cursor.as_str(),
            }))
            .send()
            .await?;

        let status = response.status_code();
        let body: Value = response.json().await?;

        if status == StatusCode::NOT_FOUND || is_context_missing(&body) {
            return Err(DocsiftError::CursorExpired);
        }
        if !status.is_success() {
            return Err(DocsiftError::Query(error_reason(&body, "Scroll failed")));
        }

        ResultPage::from_response(body)
    }

    async fn clear_scroll(&self, cursor: &CursorToken) -> Result<()> {
        debug!("Clearing scroll");

        let response = self
            .client
            .clear_scroll(ClearScrollParts::None)
            .body(json!({ "scroll_id": [cursor.as_str()] }))
            .send()
            .await?;

        let status = response.status_code();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }

        let body: Value = response.json().await?;
        Err(DocsiftError::Query(error_reason(&body, "Clear scroll failed")))
    }

    async fn get_mapping(&self, index: &str) -> Result<Value> {
        debug!("Getting mapping of index {}", index);

        let response = self
            .client
            .indices()
            .get_mapping(IndicesGetMappingParts::Index(&[index]))
            .send()
            .await?;

        let status = response.status_code();
        if status == StatusCode::NOT_FOUND {
            return Err(DocsiftError::IndexNotFound(index.to_string()));
        }

        let body: Value = response.json().await?;
        if !status.is_success() {
            return Err(DocsiftError::Query(error_reason(&body, "Mapping request failed")));
        }

        Ok(body)
    }

    async fn index_document(&self, index: &str, id: &str, doc: &Document) -> Result<ShardStatus> {
        let response = self
            .client
            .index(IndexParts::IndexId(index, id))
            .body(doc)
            .send()
            .await?;

        let status = response.status_code();
        let body: Value = response.json().await?;

        if !status.is_success() {
            return Err(DocsiftError::Query(error_reason(&body, "Indexing failed")));
        }

        let shards = body
            .get("_shards")
            .cloned()
            .ok_or_else(|| DocsiftError::Query("write response carried no shard status".to_string()))?;

        Ok(serde_json::from_value(shards)?)
    }
}

impl std::fmt::Debug for OpenSearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenSearchClient")
            .field("urls", &self.config.urls)
            .finish()
    }
}

fn error_reason(body: &Value, fallback: &str) -> String {
    body.get("error")
        .and_then(|e| e.get("reason").or(Some(e)))
        .and_then(|r| r.as_str())
        .unwrap_or(fallback)
        .to_string()
}

/// Whether an error or shard-failure body names a missing scroll context.
fn is_context_missing(body: &Value) -> bool {
    let error = &body["error"];
    let root_causes = error["root_cause"].as_array().into_iter().flatten();
    let shard_failures = body["_shards"]["failures"]
        .as_array()
        .into_iter()
        .flatten()
        .map(|f| &f["reason"]);

    std::iter::once(error)
        .chain(root_causes)
        .chain(shard_failures)
        .any(|e| e["type"].as_str() == Some(CONTEXT_MISSING))
}
