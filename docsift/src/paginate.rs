//! Full-result pagination.
//!
//! Search services cap how many hits one request returns. The strategies in
//! this module walk an entire result set page by page and hand back every
//! matching document. All three share one contract:
//!
//! - pages are requested strictly one after another
//! - a page whose shard status reports zero successful shards aborts the
//!   run with [`DocsiftError::FetchFailure`]; documents gathered so far are
//!   dropped, never returned as if complete
//! - the first empty page ends the run
//!
//! Under stable data every matching document comes back exactly once. When
//! the index is written to during a run, offset and sort-key windows can
//! skip or repeat documents that moved across a page boundary, and a scroll
//! sees the snapshot taken when it was opened.
//!
//! | Strategy | Cost per page | Server state | Pause tolerance |
//! |---|---|---|---|
//! | [`OffsetWindow`] | grows with the offset | none | unlimited |
//! | [`ScrollCursor`] | constant | leased cursor | until the keep-alive lapses |
//! | [`SearchAfterCursor`] | constant | none | unlimited |

use crate::{
    backend::SearchBackend,
    config::{ClientConfig, KeepAlive},
    document::{Document, Hit},
    error::{DocsiftError, Result},
    query::Query,
    search::{CursorToken, ResultPage, SearchRequest, ShardStatus, Window},
};
use async_trait::async_trait;
use serde_json::{Number, Value};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// A way of consuming a whole result set from a windowed search API.
#[async_trait]
pub trait PaginationStrategy: Send + Sync + fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Fetch every document of `index` matching `query`, `page_size` at a time.
    async fn fetch_all(
        &self,
        backend: &dyn SearchBackend,
        index: &str,
        query: &Query,
        page_size: usize,
    ) -> Result<Vec<Document>>;
}

/// Per-run bookkeeping shared by all strategies.
struct Run<'a> {
    strategy: &'static str,
    index: &'a str,
    pages: usize,
    documents: Vec<Document>,
}

impl<'a> Run<'a> {
    fn start(strategy: &'static str, index: &'a str, page_size: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(DocsiftError::Validation(
                "Page size must be greater than zero".to_string(),
            ));
        }

        debug!(
            "Starting {} pagination over {} with page size {}",
            strategy, index, page_size
        );

        Ok(Self {
            strategy,
            index,
            pages: 0,
            documents: Vec::new(),
        })
    }

    /// Count the page and reject it when no shard answered.
    fn check(&mut self, shards: &ShardStatus) -> Result<()> {
        self.pages += 1;

        if shards.is_failure() {
            warn!(
                "{} pagination over {} aborted on page {}: {} of {} shards succeeded, discarding {} documents",
                self.strategy,
                self.index,
                self.pages,
                shards.successful,
                shards.total,
                self.documents.len()
            );
            return Err(DocsiftError::FetchFailure {
                successful: shards.successful,
                total: shards.total,
            });
        }

        Ok(())
    }

    /// Append a checked page. Returns `false` once a page comes back empty.
    fn absorb(&mut self, hits: Vec<Hit>) -> bool {
        if hits.is_empty() {
            return false;
        }

        debug!(
            "{} page {} of {}: {} hits",
            self.strategy,
            self.pages,
            self.index,
            hits.len()
        );

        self.documents.extend(hits.into_iter().map(Hit::into_source));
        true
    }

    fn finish(self) -> Vec<Document> {
        info!(
            "{} pagination over {} fetched {} documents in {} requests",
            self.strategy,
            self.index,
            self.documents.len(),
            self.pages
        );
        self.documents
    }
}

/// Strategy A: `from`/`size` windows at offsets `0, n, 2n, ...`.
///
/// Stateless between requests, but the service has to skip `from` matching
/// documents on every request, so late pages get slower and most services
/// refuse offsets past a configured result window (10 000 by default on
/// OpenSearch and Elasticsearch).
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetWindow;

#[async_trait]
impl PaginationStrategy for OffsetWindow {
    fn name(&self) -> &'static str {
        "offset"
    }

    async fn fetch_all(
        &self,
        backend: &dyn SearchBackend,
        index: &str,
        query: &Query,
        page_size: usize,
    ) -> Result<Vec<Document>> {
        let mut run = Run::start(self.name(), index, page_size)?;
        let mut from = 0;

        loop {
            let request = SearchRequest::new(
                index,
                query.clone(),
                Window::Offset {
                    from,
                    size: page_size,
                },
            );
            let page = backend.search(&request).await?;

            run.check(&page.shards)?;
            if !run.absorb(page.hits) {
                break;
            }

            from += page_size;
        }

        Ok(run.finish())
    }
}

/// Strategy B: a server-side scroll cursor.
///
/// The first request runs the query and opens the cursor; every later
/// request sends only the latest handle and re-asserts the keep-alive. Cost
/// per page does not depend on how far the run has progressed. If the run
/// stalls longer than the keep-alive, the next page fails with
/// [`DocsiftError::CursorExpired`] and the whole query has to be restarted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollCursor {
    /// Cursor lease.
    pub keep_alive: KeepAlive,
}

impl ScrollCursor {
    /// Create a scroll strategy with the given lease.
    pub fn new(keep_alive: KeepAlive) -> Self {
        Self { keep_alive }
    }

    /// Page through an opened scroll, remembering the latest handle in `cursor`.
    async fn drain(
        &self,
        backend: &dyn SearchBackend,
        run: &mut Run<'_>,
        index: &str,
        mut page: ResultPage,
        cursor: &mut Option<CursorToken>,
    ) -> Result<()> {
        loop {
            let ResultPage {
                hits,
                shards,
                cursor: refreshed,
            } = page;

            if refreshed.is_some() {
                *cursor = refreshed;
            }
            run.check(&shards)?;
            if !run.absorb(hits) {
                return Ok(());
            }

            let token = cursor.as_ref().ok_or_else(|| {
                DocsiftError::Query("scroll response carried no cursor token".to_string())
            })?;

            page = backend
                .scroll(token, self.keep_alive)
                .await
                .inspect_err(|e| {
                    if matches!(e, DocsiftError::CursorExpired) {
                        warn!(
                            "Scroll over {} expired after {} pages (keep-alive {})",
                            index, run.pages, self.keep_alive
                        );
                    }
                })?;
        }
    }
}

#[async_trait]
impl PaginationStrategy for ScrollCursor {
    fn name(&self) -> &'static str {
        "scroll"
    }

    async fn fetch_all(
        &self,
        backend: &dyn SearchBackend,
        index: &str,
        query: &Query,
        page_size: usize,
    ) -> Result<Vec<Document>> {
        let mut run = Run::start(self.name(), index, page_size)?;

        let open = SearchRequest::new(
            index,
            query.clone(),
            Window::OpenScroll {
                size: page_size,
                keep_alive: self.keep_alive,
            },
        );
        let page = backend.search(&open).await?;

        let mut cursor = None;
        let drained = self
            .drain(backend, &mut run, index, page, &mut cursor)
            .await;

        // An expired handle is already gone on the service side.
        if let Some(token) = cursor.as_ref()
            && !matches!(drained, Err(DocsiftError::CursorExpired))
            && let Err(e) = backend.clear_scroll(token).await
        {
            warn!("Failed to clear scroll over {}: {}", index, e);
        }

        drained?;
        Ok(run.finish())
    }
}

/// Strategy C: ascending sort on a unique field, continuing strictly after
/// the last sort value seen.
///
/// The sort field must be unique per document. Ties on a non-unique field
/// make the service skip documents that share the boundary value. No server
/// state is held, so a run survives arbitrarily long pauses; resuming a run
/// means re-sending the last sort value.
#[derive(Debug, Clone)]
pub struct SearchAfterCursor {
    /// Unique sort field.
    pub sort_field: String,
}

impl SearchAfterCursor {
    /// Create a search-after strategy sorting on `sort_field`.
    pub fn new(sort_field: impl Into<String>) -> Self {
        Self {
            sort_field: sort_field.into(),
        }
    }
}

impl Default for SearchAfterCursor {
    fn default() -> Self {
        Self::new("_id")
    }
}

#[async_trait]
impl PaginationStrategy for SearchAfterCursor {
    fn name(&self) -> &'static str {
        "search-after"
    }

    async fn fetch_all(
        &self,
        backend: &dyn SearchBackend,
        index: &str,
        query: &Query,
        page_size: usize,
    ) -> Result<Vec<Document>> {
        let mut run = Run::start(self.name(), index, page_size)?;
        let mut after: Option<Vec<Value>> = None;

        loop {
            let request = SearchRequest::new(
                index,
                query.clone(),
                Window::SearchAfter {
                    sort_field: self.sort_field.clone(),
                    after: after.clone(),
                    size: page_size,
                },
            );
            let page = backend.search(&request).await?;

            run.check(&page.shards)?;

            let Some(last) = page.hits.last() else {
                break;
            };
            if last.sort.is_empty() {
                return Err(DocsiftError::Query(format!(
                    "hit {} carried no sort values for {}",
                    last.id, self.sort_field
                )));
            }
            if let Some(previous) = after.as_ref()
                && !advances(&last.sort, previous)
            {
                return Err(DocsiftError::Query(format!(
                    "sort key on {} did not advance past {:?}; is the field unique?",
                    self.sort_field, last.sort
                )));
            }

            after = Some(last.sort.clone());
            run.absorb(page.hits);
        }

        Ok(run.finish())
    }
}

/// Whether `next` sorts strictly after `previous` in ascending order.
///
/// Keys with no common order (mixed JSON types) only have to differ.
fn advances(next: &[Value], previous: &[Value]) -> bool {
    match compare_keys(next, previous) {
        Some(order) => order == Ordering::Greater,
        None => next != previous,
    }
}

/// Compare two sort keys value by value.
fn compare_keys(a: &[Value], b: &[Value]) -> Option<Ordering> {
    for (x, y) in a.iter().zip(b) {
        let order = match (x, y) {
            (Value::Number(x), Value::Number(y)) => compare_numbers(x, y)?,
            (Value::String(x), Value::String(y)) => x.cmp(y),
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            _ if x == y => Ordering::Equal,
            _ => return None,
        };
        if order != Ordering::Equal {
            return Some(order);
        }
    }
    Some(a.len().cmp(&b.len()))
}

fn compare_numbers(x: &Number, y: &Number) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
        return Some(x.cmp(&y));
    }
    if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
        return Some(x.cmp(&y));
    }
    x.as_f64()?.partial_cmp(&y.as_f64()?)
}

/// Which strategy to paginate with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// [`OffsetWindow`].
    #[default]
    Offset,
    /// [`ScrollCursor`].
    Scroll,
    /// [`SearchAfterCursor`].
    SearchAfter,
}

impl Strategy {
    /// Instantiate the strategy with settings from `config`.
    pub fn build(&self, config: &ClientConfig) -> Box<dyn PaginationStrategy> {
        match self {
            Strategy::Offset => Box::new(OffsetWindow),
            Strategy::Scroll => Box::new(ScrollCursor::new(config.keep_alive)),
            Strategy::SearchAfter => Box::new(SearchAfterCursor::new(config.sort_field.clone())),
        }
    }

    /// Name accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Offset => "offset",
            Strategy::Scroll => "scroll",
            Strategy::SearchAfter => "search-after",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = DocsiftError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "offset" | "from-size" => Ok(Strategy::Offset),
            "scroll" => Ok(Strategy::Scroll),
            "search-after" | "search_after" => Ok(Strategy::SearchAfter),
            other => Err(DocsiftError::Validation(format!(
                "Unknown pagination strategy: {}",
                other
            ))),
        }
    }
}

/// Runs one configured strategy against one backend.
///
/// Call sites stay the same whichever strategy is plugged in.
pub struct Paginator<'a> {
    backend: &'a dyn SearchBackend,
    strategy: Box<dyn PaginationStrategy>,
    page_size: usize,
}

impl<'a> Paginator<'a> {
    /// Create a paginator using `config`'s page size.
    pub fn new(
        backend: &'a dyn SearchBackend,
        strategy: Box<dyn PaginationStrategy>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            backend,
            strategy,
            page_size: config.page_size,
        }
    }

    /// Create a paginator from a [`Strategy`] selector.
    pub fn from_config(
        backend: &'a dyn SearchBackend,
        strategy: Strategy,
        config: &ClientConfig,
    ) -> Self {
        Self::new(backend, strategy.build(config), config)
    }

    /// Override the page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// The active strategy.
    pub fn strategy(&self) -> &dyn PaginationStrategy {
        self.strategy.as_ref()
    }

    /// Fetch every document of `index` matching `query`.
    pub async fn fetch_all(&self, index: &str, query: &Query) -> Result<Vec<Document>> {
        self.strategy
            .fetch_all(self.backend, index, query, self.page_size)
            .await
    }
}

impl fmt::Debug for Paginator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paginator")
            .field("strategy", &self.strategy)
            .field("page_size", &self.page_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("offset".parse::<Strategy>().unwrap(), Strategy::Offset);
        assert_eq!("Scroll".parse::<Strategy>().unwrap(), Strategy::Scroll);
        assert_eq!("search_after".parse::<Strategy>().unwrap(), Strategy::SearchAfter);
        assert!(matches!(
            "cursor".parse::<Strategy>(),
            Err(DocsiftError::Validation(_))
        ));
    }

    #[test]
    fn test_strategy_round_trips_display() {
        for strategy in [Strategy::Offset, Strategy::Scroll, Strategy::SearchAfter] {
            assert_eq!(strategy.to_string().parse::<Strategy>().unwrap(), strategy);
        }
    }

    #[test]
    fn test_sort_keys_must_strictly_increase() {
        assert!(advances(&[json!("b")], &[json!("a")]));
        assert!(!advances(&[json!("a")], &[json!("a")]));
        assert!(!advances(&[json!("a")], &[json!("b")]));

        assert!(advances(&[json!(10)], &[json!(9)]));
        assert!(!advances(&[json!(9)], &[json!(10)]));
        assert!(advances(&[json!(1.5)], &[json!(1)]));
        assert!(advances(&[json!(u64::MAX)], &[json!(-1)]));

        // Ties on the first value fall through to the next.
        assert!(advances(&[json!(1), json!("b")], &[json!(1), json!("a")]));
        assert!(!advances(&[json!(1), json!("a")], &[json!(1), json!("b")]));

        // No common order: only equality is rejected.
        assert!(advances(&[json!(null)], &[json!("a")]));
        assert!(!advances(&[json!(null)], &[json!(null)]));
    }

    #[test]
    fn test_build_uses_config() {
        let config = ClientConfig::default()
            .with_keep_alive(KeepAlive::new(Duration::from_secs(30)))
            .with_sort_field("seq");

        assert_eq!(Strategy::Scroll.build(&config).name(), "scroll");
        assert_eq!(Strategy::SearchAfter.build(&config).name(), "search-after");
        assert!(format!("{:?}", Strategy::SearchAfter.build(&config)).contains("seq"));
    }
}
