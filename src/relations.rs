//! Relation paths referenced by a filter, for eager-loading.
//!
//! `{"author.name": "x", "$or": [{"comments.text": "y"}]}` references
//! `author.name` and `comments.text`, which fold into
//! `{"author": {"name": false}, "comments": {"text": false}}`.

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;

use crate::ast::MARKER;
use crate::parser::keys;

/// Collect the field keys of `filter`, descending through `$or` / `$not`.
///
/// Deduplicated, in first-seen order.
pub fn extract_paths(filter: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    collect_paths(filter, &mut paths);
    paths
}

fn collect_paths(filter: &Value, paths: &mut Vec<String>) {
    match filter {
        Value::Object(map) => {
            for (key, value) in map {
                if keys::is_logical_prefix(key) {
                    collect_paths(value, paths);
                } else if key.starts_with(MARKER) {
                    continue;
                } else if !paths.contains(key) {
                    paths.push(key.clone());
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_paths(item, paths);
            }
        }
        _ => {}
    }
}

/// Nested presence tree of relation path segments.
///
/// Leaves serialize as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationTree {
    leaf: bool,
    children: BTreeMap<String, RelationTree>,
}

impl RelationTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Self::new();
        for path in paths {
            tree.insert(path.as_ref());
        }
        tree
    }

    /// Merge a dotted path. Shared prefixes share nodes. The final segment
    /// always becomes a leaf, dropping anything below it, and a leaf absorbs
    /// deeper paths, so insertion order does not matter.
    pub fn insert(&mut self, path: &str) {
        let mut segments = path.split('.').peekable();
        let mut node = self;
        while let Some(segment) = segments.next() {
            let child = node.children.entry(segment.to_string()).or_default();
            if segments.peek().is_none() {
                child.leaf = true;
                child.children.clear();
                return;
            }
            if child.leaf {
                return;
            }
            node = child;
        }
    }

    pub fn get(&self, segment: &str) -> Option<&RelationTree> {
        self.children.get(segment)
    }

    /// True when the dotted `path` is present, as a leaf or a branch.
    pub fn contains(&self, path: &str) -> bool {
        let mut node = self;
        for segment in path.split('.') {
            match node.children.get(segment) {
                Some(child) => node = child,
                None => return false,
            }
        }
        true
    }

    pub fn is_leaf(&self) -> bool {
        self.leaf
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RelationTree)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// JSON form: branches are objects, leaves are `false`.
    pub fn to_value(&self) -> Value {
        let map = self
            .children
            .iter()
            .map(|(segment, child)| {
                let value = if child.is_leaf() {
                    Value::Bool(false)
                } else {
                    child.to_value()
                };
                (segment.clone(), value)
            })
            .collect();
        Value::Object(map)
    }
}

impl Serialize for RelationTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.children.len()))?;
        for (segment, child) in &self.children {
            if child.is_leaf() {
                map.serialize_entry(segment, &false)?;
            } else {
                map.serialize_entry(segment, child)?;
            }
        }
        map.end()
    }
}
