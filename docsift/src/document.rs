//! Documents and search hits.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored document: field name to value.
///
/// Pagination treats documents as opaque and never inspects their fields.
pub type Document = Map<String, Value>;

/// One search hit as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Document ID.
    #[serde(rename = "_id")]
    pub id: String,
    /// Sort-key values, present when the request carried a sort clause.
    #[serde(default)]
    pub sort: Vec<Value>,
    /// Document source.
    #[serde(rename = "_source", default)]
    pub source: Document,
}

impl Hit {
    /// Create a hit without sort values.
    pub fn new(id: impl Into<String>, source: Document) -> Self {
        Self {
            id: id.into(),
            sort: Vec::new(),
            source,
        }
    }

    /// Attach sort-key values.
    pub fn with_sort(mut self, sort: Vec<Value>) -> Self {
        self.sort = sort;
        self
    }

    /// Consume the hit, keeping the document.
    pub fn into_source(self) -> Document {
        self.source
    }
}
