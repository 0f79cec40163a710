//! In-memory search service for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use docsift::{
    CursorToken, DocsiftError, Document, Hit, KeepAlive, Result, ResultPage, SearchBackend,
    SearchRequest, ShardStatus, Window,
};
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// A request the backend answered, as seen on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Search(SearchRequest),
    Scroll { token: String, keep_alive: KeepAlive },
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    pages: Vec<Vec<Hit>>,
    scrolls: HashMap<String, usize>,
    next_scroll: u64,
    cleared: Vec<String>,
    written: Vec<(String, String, Document)>,
}

/// Documents held in ID order, answering every window kind.
///
/// Sort values are the document IDs, so the ID order is the search-after order.
#[derive(Default)]
pub struct MemoryBackend {
    docs: Vec<(String, Document)>,
    mapping: Value,
    fail_fetch_at: Option<usize>,
    expire_scroll_at: Option<usize>,
    fail_writes: bool,
    state: Mutex<State>,
}

impl MemoryBackend {
    /// `count` sample documents with zero-padded IDs, so string order matches numeric order.
    pub fn with_documents(count: usize) -> Self {
        let docs = (0..count)
            .map(|i| (format!("{:06}", i), docsift::documents::sample_document(i)))
            .collect();

        Self {
            docs,
            ..Self::default()
        }
    }

    pub fn with_mapping(mut self, mapping: Value) -> Self {
        self.mapping = mapping;
        self
    }

    /// The fetch with this zero-based sequence number reports zero successful shards.
    pub fn fail_fetch_at(mut self, fetch: usize) -> Self {
        self.fail_fetch_at = Some(fetch);
        self
    }

    /// Scroll continuations from this fetch on are rejected as expired.
    pub fn expire_scroll_at(mut self, fetch: usize) -> Self {
        self.expire_scroll_at = Some(fetch);
        self
    }

    pub fn fail_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    /// Hits of every page served so far, in order.
    pub fn pages(&self) -> Vec<Vec<Hit>> {
        self.state.lock().unwrap().pages.clone()
    }

    /// Scroll handles released by the caller, in order.
    pub fn cleared(&self) -> Vec<String> {
        self.state.lock().unwrap().cleared.clone()
    }

    pub fn written(&self) -> Vec<(String, String, Document)> {
        self.state.lock().unwrap().written.clone()
    }

    pub fn all_documents(&self) -> Vec<Document> {
        self.docs.iter().map(|(_, doc)| doc.clone()).collect()
    }

    fn hit(&self, position: usize) -> Hit {
        let (id, doc) = &self.docs[position];
        Hit::new(id.clone(), doc.clone()).with_sort(vec![json!(id)])
    }

    fn window(&self, start: usize, size: usize) -> Vec<Hit> {
        (start..self.docs.len().min(start + size))
            .map(|i| self.hit(i))
            .collect()
    }

    fn shards_for(&self, fetch: usize) -> ShardStatus {
        if self.fail_fetch_at == Some(fetch) {
            ShardStatus::failed(2)
        } else {
            ShardStatus::healthy(2)
        }
    }

    fn serve(&self, state: &mut State, call: Call, hits: Vec<Hit>) -> ResultPage {
        let fetch = state.calls.len();
        state.calls.push(call);

        let shards = self.shards_for(fetch);
        let hits = if shards.is_failure() { Vec::new() } else { hits };
        state.pages.push(hits.clone());

        ResultPage::new(hits, shards)
    }

    fn open_scroll(&self, state: &mut State, position: usize) -> CursorToken {
        state.next_scroll += 1;
        let token = format!("scroll-{}", state.next_scroll);
        state.scrolls.insert(token.clone(), position);
        CursorToken::new(token)
    }
}

#[async_trait]
impl SearchBackend for MemoryBackend {
    async fn search(&self, request: &SearchRequest) -> Result<ResultPage> {
        let mut state = self.state.lock().unwrap();

        // Lookups by ID are the only query this backend interprets.
        if let Some(id) = request.query.as_json()["match"]["_id"].as_str() {
            let hits = self
                .docs
                .iter()
                .position(|(doc_id, _)| doc_id == id)
                .map(|i| vec![self.hit(i)])
                .unwrap_or_default();
            return Ok(self.serve(&mut state, Call::Search(request.clone()), hits));
        }

        match &request.window {
            Window::Offset { from, size } => {
                let hits = self.window(*from, *size);
                Ok(self.serve(&mut state, Call::Search(request.clone()), hits))
            }
            Window::OpenScroll { size, .. } => {
                let hits = self.window(0, *size);
                let token = self.open_scroll(&mut state, hits.len());
                let page = self.serve(&mut state, Call::Search(request.clone()), hits);
                Ok(page.with_cursor(token))
            }
            Window::SearchAfter { after, size, .. } => {
                let start = match after {
                    None => 0,
                    Some(after) => {
                        let after = after[0].as_str().unwrap_or_default();
                        self.docs
                            .iter()
                            .position(|(id, _)| id.as_str() > after)
                            .unwrap_or(self.docs.len())
                    }
                };
                let hits = self.window(start, *size);
                Ok(self.serve(&mut state, Call::Search(request.clone()), hits))
            }
        }
    }

    async fn scroll(&self, cursor: &CursorToken, keep_alive: KeepAlive) -> Result<ResultPage> {
        let mut state = self.state.lock().unwrap();

        let fetch = state.calls.len();
        if self.expire_scroll_at.is_some_and(|at| fetch >= at) {
            state.calls.push(Call::Scroll {
                token: cursor.as_str().to_string(),
                keep_alive,
            });
            return Err(DocsiftError::CursorExpired);
        }

        // Each continuation retires the handle it was given and issues a fresh one.
        let position = state
            .scrolls
            .remove(cursor.as_str())
            .ok_or(DocsiftError::CursorExpired)?;

        let call = Call::Scroll {
            token: cursor.as_str().to_string(),
            keep_alive,
        };
        let hits = self.window(position, self.page_size_hint(&state));
        let next = position + hits.len();
        let token = self.open_scroll(&mut state, next);
        let page = self.serve(&mut state, call, hits);

        Ok(page.with_cursor(token))
    }

    async fn clear_scroll(&self, cursor: &CursorToken) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.scrolls.remove(cursor.as_str());
        state.cleared.push(cursor.as_str().to_string());
        Ok(())
    }

    async fn get_mapping(&self, index: &str) -> Result<Value> {
        if self.mapping.is_null() {
            return Err(DocsiftError::IndexNotFound(index.to_string()));
        }
        Ok(self.mapping.clone())
    }

    async fn index_document(&self, index: &str, id: &str, doc: &Document) -> Result<ShardStatus> {
        if self.fail_writes {
            return Ok(ShardStatus::failed(2));
        }

        self.state
            .lock()
            .unwrap()
            .written
            .push((index.to_string(), id.to_string(), doc.clone()));

        Ok(ShardStatus {
            total: 2,
            successful: 1,
            failed: 0,
        })
    }
}

impl MemoryBackend {
    /// Scroll pages keep the size the scroll was opened with.
    fn page_size_hint(&self, state: &State) -> usize {
        state
            .calls
            .iter()
            .find_map(|call| match call {
                Call::Search(SearchRequest {
                    window: Window::OpenScroll { size, .. },
                    ..
                }) => Some(*size),
                _ => None,
            })
            .unwrap_or(10)
    }
}

/// Answers every search or scroll with the next page of a fixed script.
///
/// An exhausted script answers with an empty page.
pub struct ScriptedBackend {
    pages: Mutex<VecDeque<ResultPage>>,
    requests: Mutex<usize>,
    cleared: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new(pages: Vec<ResultPage>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            requests: Mutex::new(0),
            cleared: Mutex::new(Vec::new()),
        }
    }

    /// A healthy page of hits with the given IDs and sort values.
    pub fn page(hits: &[(&str, Option<Value>)]) -> ResultPage {
        let hits = hits
            .iter()
            .map(|(id, sort)| {
                let hit = Hit::new(*id, Document::new());
                match sort {
                    Some(sort) => hit.with_sort(vec![sort.clone()]),
                    None => hit,
                }
            })
            .collect();
        ResultPage::new(hits, ShardStatus::healthy(1))
    }

    pub fn requests(&self) -> usize {
        *self.requests.lock().unwrap()
    }

    pub fn cleared(&self) -> Vec<String> {
        self.cleared.lock().unwrap().clone()
    }

    fn next_page(&self) -> ResultPage {
        *self.requests.lock().unwrap() += 1;
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| ResultPage::new(Vec::new(), ShardStatus::healthy(1)))
    }
}

#[async_trait]
impl SearchBackend for ScriptedBackend {
    async fn search(&self, _request: &SearchRequest) -> Result<ResultPage> {
        Ok(self.next_page())
    }

    async fn scroll(&self, _cursor: &CursorToken, _keep_alive: KeepAlive) -> Result<ResultPage> {
        Ok(self.next_page())
    }

    async fn clear_scroll(&self, cursor: &CursorToken) -> Result<()> {
        self.cleared.lock().unwrap().push(cursor.as_str().to_string());
        Ok(())
    }

    async fn get_mapping(&self, index: &str) -> Result<Value> {
        Err(DocsiftError::IndexNotFound(index.to_string()))
    }

    async fn index_document(&self, _index: &str, _id: &str, _doc: &Document) -> Result<ShardStatus> {
        Ok(ShardStatus::healthy(1))
    }
}
