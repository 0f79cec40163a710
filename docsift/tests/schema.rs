//! Integration tests for mapping flattening

mod common;

use common::MemoryBackend;
use docsift::schema::{field_paths, flatten, parse_properties};
use docsift::{DocsiftError, FieldPath, Fields, MappingNode};
use proptest::prelude::*;
use serde_json::json;
use std::collections::HashSet;

fn arb_node() -> impl Strategy<Value = MappingNode> {
    Just(MappingNode::Leaf).prop_recursive(4, 64, 5, |inner| {
        prop::collection::vec(("[a-z]{1,4}", inner), 0..5).prop_map(MappingNode::branch)
    })
}

fn arb_fields() -> impl Strategy<Value = Fields> {
    prop::collection::vec(("[a-z]{1,4}", arb_node()), 0..6)
        .prop_map(|entries| entries.into_iter().collect())
}

fn resolves_to_leaf(root: &Fields, path: &FieldPath) -> bool {
    let Some((last, parents)) = path.segments().split_last() else {
        return false;
    };

    let mut level = root;
    for segment in parents {
        match level.get(segment).and_then(MappingNode::children) {
            Some(children) => level = children,
            None => return false,
        }
    }

    level.get(last).is_some_and(MappingNode::is_leaf)
}

proptest! {
    #[test]
    fn flatten_yields_one_path_per_leaf(root in arb_fields()) {
        let leaves: usize = root.values().map(MappingNode::leaf_count).sum();
        let paths = flatten(&root);

        prop_assert_eq!(paths.len(), leaves);

        let unique: HashSet<&FieldPath> = paths.iter().collect();
        prop_assert_eq!(unique.len(), paths.len());

        for path in &paths {
            prop_assert!(resolves_to_leaf(&root, path), "{} is not a leaf", path);
        }
    }

    #[test]
    fn flatten_leaves_the_tree_untouched(root in arb_fields()) {
        let before = root.clone();

        let first = flatten(&root);
        let second = flatten(&root);

        prop_assert_eq!(&root, &before);
        prop_assert_eq!(first, second);
    }
}

#[test]
fn test_flatten_nested_mapping() {
    let fields = parse_properties(&json!({
        "user": {
            "properties": {
                "name": { "type": "text" },
                "address": {
                    "properties": {
                        "city": { "type": "keyword" },
                        "zip": { "type": "keyword" }
                    }
                }
            }
        },
        "tags": { "properties": {} },
        "views": { "type": "long" }
    }))
    .unwrap();

    let dotted: Vec<String> = flatten(&fields).iter().map(|p| p.to_string()).collect();

    assert_eq!(
        dotted,
        ["user.name", "user.address.city", "user.address.zip", "views"]
    );
}

#[tokio::test]
async fn test_field_paths_from_index_mapping() {
    let backend = MemoryBackend::default().with_mapping(json!({
        "example": {
            "mappings": {
                "properties": {
                    "key1": { "type": "long" },
                    "key2": { "type": "long" },
                    "meta": { "properties": { "source": { "type": "keyword" } } }
                }
            }
        }
    }));

    let paths = field_paths(&backend, "example").await.unwrap();
    let dotted: Vec<String> = paths.iter().map(|p| p.join(".")).collect();

    assert_eq!(dotted, ["key1", "key2", "meta.source"]);
}

#[tokio::test]
async fn test_field_paths_through_alias() {
    let backend = MemoryBackend::default().with_mapping(json!({
        "example-000001": {
            "mappings": { "properties": { "key1": { "type": "long" } } }
        }
    }));

    let paths = field_paths(&backend, "example").await.unwrap();

    assert_eq!(paths, vec![FieldPath::from_iter(["key1"])]);
}

#[tokio::test]
async fn test_field_paths_without_properties() {
    let backend = MemoryBackend::default().with_mapping(json!({
        "example": { "mappings": {} }
    }));

    let paths = field_paths(&backend, "example").await.unwrap();

    assert!(paths.is_empty());
}

#[tokio::test]
async fn test_field_paths_unknown_index() {
    let backend = MemoryBackend::default().with_mapping(json!({
        "first": { "mappings": {} },
        "second": { "mappings": {} }
    }));

    let result = field_paths(&backend, "example").await;

    assert!(matches!(result, Err(DocsiftError::IndexNotFound(index)) if index == "example"));
}

#[tokio::test]
async fn test_field_paths_malformed_mapping() {
    let backend = MemoryBackend::default().with_mapping(json!({
        "example": {
            "mappings": { "properties": { "a": { "properties": ["b"] } } }
        }
    }));

    let result = field_paths(&backend, "example").await;

    assert!(matches!(result, Err(DocsiftError::MalformedSchema(_))));
}
