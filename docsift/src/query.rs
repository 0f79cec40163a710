//! Opaque query clauses.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::str::FromStr;

/// A query clause, passed to the service unchanged.
///
/// Pagination only ever adds window parameters next to the clause; it never
/// rewrites it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query(Value);

impl Query {
    /// Wrap a raw query clause such as `{"range": {"key1": {"gte": 0}}}`.
    pub fn new(clause: Value) -> Self {
        Self(clause)
    }

    /// Match every document.
    pub fn match_all() -> Self {
        Self(json!({ "match_all": {} }))
    }

    /// Match a single document by ID.
    pub fn id(id: impl Into<String>) -> Self {
        Self(json!({ "match": { "_id": id.into() } }))
    }

    /// The raw clause.
    pub fn as_json(&self) -> &Value {
        &self.0
    }
}

impl Default for Query {
    fn default() -> Self {
        Self::match_all()
    }
}

impl From<Value> for Query {
    fn from(clause: Value) -> Self {
        Self(clause)
    }
}

impl FromStr for Query {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map(Self)
    }
}
