//! Index mapping trees and their flattened field paths.
//!
//! A mapping's `properties` object nests sub-fields under object-typed
//! fields. [`flatten`] turns that tree into one [`FieldPath`] per leaf field:
//!
//! ```rust
//! use docsift::schema::{flatten, parse_properties};
//! use serde_json::json;
//!
//! let fields = parse_properties(&json!({
//!     "a": { "properties": { "b": { "type": "long" }, "c": { "type": "text" } } },
//!     "d": { "type": "keyword" }
//! }))
//! .unwrap();
//!
//! let dotted: Vec<String> = flatten(&fields).iter().map(|p| p.to_string()).collect();
//! assert_eq!(dotted, ["a.b", "a.c", "d"]);
//! ```

use crate::{
    backend::SearchBackend,
    error::{DocsiftError, Result},
};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt;
use tracing::debug;

/// Named entries of one mapping level, in source order.
pub type Fields = IndexMap<String, MappingNode>;

/// One entry of a mapping tree.
#[derive(Debug, Clone, PartialEq)]
pub enum MappingNode {
    /// A field with no sub-fields.
    Leaf,
    /// An object field. May be empty, in which case it contributes no path.
    Branch(Fields),
}

impl MappingNode {
    /// Build a branch from `(name, node)` pairs.
    pub fn branch<I, S>(children: I) -> Self
    where
        I: IntoIterator<Item = (S, MappingNode)>,
        S: Into<String>,
    {
        MappingNode::Branch(children.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Whether this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, MappingNode::Leaf)
    }

    /// Sub-fields of a branch.
    pub fn children(&self) -> Option<&Fields> {
        match self {
            MappingNode::Leaf => None,
            MappingNode::Branch(children) => Some(children),
        }
    }

    /// Number of leaves at or below this node.
    pub fn leaf_count(&self) -> usize {
        match self {
            MappingNode::Leaf => 1,
            MappingNode::Branch(children) => children.values().map(|c| c.leaf_count()).sum(),
        }
    }
}

/// Names from the mapping root down to one leaf.
///
/// Kept as separate segments; `Display` joins them with `.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Create a path from its segments.
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Path segments, root first.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Join the segments with a custom separator.
    pub fn join(&self, sep: &str) -> String {
        self.0.join(sep)
    }

    /// Consume into the segments.
    pub fn into_segments(self) -> Vec<String> {
        self.0
    }
}

impl<S: Into<String>> FromIterator<S> for FieldPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join("."))
    }
}

/// Lazy depth-first walk yielding one [`FieldPath`] per leaf.
///
/// Siblings are visited in source order and a branch is fully exhausted
/// before its next sibling. The tree is only borrowed.
pub struct FieldPaths<'a> {
    levels: Vec<indexmap::map::Iter<'a, String, MappingNode>>,
    prefix: Vec<&'a str>,
}

impl<'a> FieldPaths<'a> {
    /// Start a walk at the root level.
    pub fn new(root: &'a Fields) -> Self {
        Self {
            levels: vec![root.iter()],
            prefix: Vec::new(),
        }
    }

    fn path_to(&self, leaf: &str) -> FieldPath {
        self.prefix.iter().copied().chain(std::iter::once(leaf)).collect()
    }
}

impl Iterator for FieldPaths<'_> {
    type Item = FieldPath;

    fn next(&mut self) -> Option<FieldPath> {
        loop {
            let entry = self.levels.last_mut()?.next();

            match entry {
                // Level exhausted: drop it together with the branch name that opened it.
                None => {
                    self.levels.pop();
                    self.prefix.pop();
                }
                Some((name, MappingNode::Leaf)) => return Some(self.path_to(name)),
                Some((name, MappingNode::Branch(children))) => {
                    self.prefix.push(name);
                    self.levels.push(children.iter());
                }
            }
        }
    }
}

/// Every fully-qualified leaf path of a mapping, depth-first in source order.
///
/// Empty branches vanish from the output.
pub fn flatten(root: &Fields) -> Vec<FieldPath> {
    FieldPaths::new(root).collect()
}

/// Parse a raw `properties` object into a mapping tree.
///
/// - an entry carrying a `properties` object is a branch
/// - an entry with `properties: null` is an empty branch
/// - any other object entry is a leaf (its `type`, `fields` etc. are ignored)
///
/// Entries that are not objects, `properties` of any other JSON type and
/// empty field names are [`DocsiftError::MalformedSchema`].
pub fn parse_properties(properties: &Value) -> Result<Fields> {
    let map = properties.as_object().ok_or_else(|| {
        DocsiftError::MalformedSchema(format!(
            "properties must be an object, found {}",
            json_kind(properties)
        ))
    })?;

    parse_level(map, &mut Vec::new())
}

fn parse_level(map: &Map<String, Value>, parents: &mut Vec<String>) -> Result<Fields> {
    let mut fields = Fields::with_capacity(map.len());

    for (name, definition) in map {
        if name.is_empty() {
            return Err(DocsiftError::MalformedSchema(format!(
                "empty field name under `{}`",
                display_parents(parents)
            )));
        }

        let definition = definition.as_object().ok_or_else(|| {
            DocsiftError::MalformedSchema(format!(
                "field `{}` must be an object, found {}",
                qualified(parents, name),
                json_kind(definition)
            ))
        })?;

        let node = match definition.get("properties") {
            None => MappingNode::Leaf,
            Some(Value::Null) => MappingNode::Branch(Fields::new()),
            Some(Value::Object(children)) => {
                parents.push(name.clone());
                let children = parse_level(children, parents);
                parents.pop();
                MappingNode::Branch(children?)
            }
            Some(other) => {
                return Err(DocsiftError::MalformedSchema(format!(
                    "properties of `{}` must be an object, found {}",
                    qualified(parents, name),
                    json_kind(other)
                )));
            }
        };

        fields.insert(name.clone(), node);
    }

    Ok(fields)
}

fn qualified(parents: &[String], name: &str) -> String {
    if parents.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parents.join("."), name)
    }
}

fn display_parents(parents: &[String]) -> String {
    if parents.is_empty() {
        "<root>".to_string()
    } else {
        parents.join(".")
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Fetch an index's mapping and flatten it.
///
/// The response is keyed by concrete index name; when `index` is an alias
/// and the response names exactly one index, that entry is used. An index
/// without `properties` has no fields.
pub async fn field_paths(backend: &dyn SearchBackend, index: &str) -> Result<Vec<FieldPath>> {
    let mapping = backend.get_mapping(index).await?;

    let only_entry = mapping
        .as_object()
        .filter(|all| all.len() == 1)
        .and_then(|all| all.values().next());

    let Some(entry) = mapping.get(index).or(only_entry) else {
        return Err(DocsiftError::IndexNotFound(index.to_string()));
    };

    let Some(properties) = entry.get("mappings").and_then(|m| m.get("properties")) else {
        debug!("Index {} has no mapped properties", index);
        return Ok(Vec::new());
    };

    let fields = parse_properties(properties)?;
    let paths = flatten(&fields);

    debug!("Flattened mapping of {} into {} field paths", index, paths.len());

    Ok(paths)
}
