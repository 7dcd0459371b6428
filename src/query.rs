//! Compiled filters.

use std::str::FromStr;

use serde_json::Value;
use tracing::debug;

use crate::apply::{Applier, QueryBuilder};
use crate::ast::Node;
use crate::config::Config;
use crate::error::{FilterError, FilterResult};
use crate::parser::Compiler;
use crate::relations::{self, RelationTree};

/// A filter compiled once and applied to any number of builders.
///
/// # Example
///
/// ```
/// use filterkit::prelude::*;
/// use serde_json::json;
///
/// let query = FilterQuery::new(json!({"author.name": "ann", "age": {"$gte": 18}})).unwrap();
///
/// let mut recorder = Recorder::new();
/// query.apply(&mut recorder).unwrap();
/// assert_eq!(recorder.to_string(), r#"where("author.name", "ann").where("age", ">=", 18)"#);
/// assert!(query.relations().contains("author.name"));
/// ```
#[derive(Debug, Clone)]
pub struct FilterQuery {
    filter: Value,
    conditions: Node,
    relation_paths: Vec<String>,
    relations: RelationTree,
    applier: Applier,
}

impl FilterQuery {
    /// Compile `filter` with the default settings.
    pub fn new(filter: Value) -> FilterResult<Self> {
        Self::with_config(filter, &Config::default())
    }

    pub fn with_config(filter: Value, config: &Config) -> FilterResult<Self> {
        let conditions = Compiler::new(&config.compile).compile(&filter)?;
        let relation_paths = relations::extract_paths(&filter);
        let relations = RelationTree::from_paths(&relation_paths);
        debug!(relations = relation_paths.len(), "filter query ready");

        Ok(Self {
            filter,
            conditions,
            relation_paths,
            relations,
            applier: Applier::new(&config.apply),
        })
    }

    /// Parse JSON text and compile it with `config`.
    pub fn parse_with_config(text: &str, config: &Config) -> FilterResult<Self> {
        let filter: Value = serde_json::from_str(text)?;
        Self::with_config(filter, config)
    }

    /// The filter as given.
    pub fn filter(&self) -> &Value {
        &self.filter
    }

    pub fn conditions(&self) -> &Node {
        &self.conditions
    }

    pub fn relation_paths(&self) -> &[String] {
        &self.relation_paths
    }

    /// Relation tree for eager-loading.
    pub fn relations(&self) -> &RelationTree {
        &self.relations
    }

    /// Apply the compiled conditions to `builder` and hand it back.
    ///
    /// On error the builder may hold some of the conditions and should be
    /// discarded.
    pub fn apply<'b, B: QueryBuilder>(&self, builder: &'b mut B) -> FilterResult<&'b mut B> {
        self.applier.apply(builder, &self.conditions)?;
        Ok(builder)
    }
}

impl FromStr for FilterQuery {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_config(s, &Config::default())
    }
}

impl TryFrom<Value> for FilterQuery {
    type Error = FilterError;

    fn try_from(filter: Value) -> Result<Self, Self::Error> {
        Self::new(filter)
    }
}
