//! Filter compiler.
//!
//! Turns a JSON filter document into a [`Node`] tree.
//!
//! # Filter Overview
//!
//! ```text
//! { "name": "ann", "age": { "$gte": 18 }, "$or": [ { "role": null }, { "id": [1, 2] } ] }
//!   ──┬───         ──┬─     ───┬───        ─┬─     ─────┬───────     ─────┬───────
//!     │              │         │            │           │                 │
//!     │              │         │            │           │                 └── IN list
//!     │              │         │            │           └── IS NULL
//!     │              │         │            └── OR group
//!     │              │         └── Comparison scoped to `age`
//!     │              └── Field scope
//!     └── Equality
//! ```

pub mod keys;

#[cfg(test)]
mod tests;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::ast::*;
use crate::config::CompileConfig;
use crate::error::{FilterResult, InvalidFilter};
use keys::OperatorKey;

/// Compile a filter with the default settings.
pub fn compile(filter: &Value) -> FilterResult<Node> {
    Compiler::default().compile(filter)
}

/// Recursive filter compiler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compiler {
    strict_negation: bool,
}

impl Compiler {
    pub fn new(config: &CompileConfig) -> Self {
        Self {
            strict_negation: config.strict_negation,
        }
    }

    /// Compile a whole filter document.
    pub fn compile(&self, filter: &Value) -> FilterResult<Node> {
        let node = self.compile_filter(filter, false, None)?;
        debug!(
            predicates = node.predicate_count(),
            strict_negation = self.strict_negation,
            "compiled filter"
        );
        Ok(node)
    }

    fn compile_filter(
        &self,
        filter: &Value,
        negated: bool,
        scope: Option<&str>,
    ) -> Result<Node, InvalidFilter> {
        match filter {
            Value::Array(items) => {
                let nodes = items
                    .iter()
                    .map(|item| self.compile_filter(item, negated, scope))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Node::all(nodes))
            }
            Value::Object(map) => self.compile_map(map, negated, scope),
            // Scalars in filter position contribute nothing.
            _ => Ok(Node::all(Vec::new())),
        }
    }

    fn compile_map(
        &self,
        map: &Map<String, Value>,
        negated: bool,
        scope: Option<&str>,
    ) -> Result<Node, InvalidFilter> {
        let mut nodes = Vec::with_capacity(map.len());
        for (key, value) in map {
            let node = if key.starts_with(MARKER) {
                self.compile_operator(key, value, negated, scope)?
            } else {
                // Field keys open their own scope; the enclosing one is not forwarded.
                self.compile_field(key, value, negated)?
            };
            nodes.push(node);
        }
        Ok(Node::all(nodes))
    }

    fn compile_operator(
        &self,
        key: &str,
        value: &Value,
        negated: bool,
        scope: Option<&str>,
    ) -> Result<Node, InvalidFilter> {
        let operator = keys::classify(key);
        trace!(key, ?operator, negated, scope, "operator key");

        if value.is_array() && !matches!(operator, OperatorKey::Or | OperatorKey::Not) {
            return Err(InvalidFilter::IllegalSequence {
                key: key.to_string(),
            });
        }

        match operator {
            OperatorKey::Or => self.compile_or(value),
            OperatorKey::Not => {
                let negated = if self.strict_negation { !negated } else { true };
                self.compile_filter(value, negated, scope)
            }
            OperatorKey::Comparison(op) => {
                let column = scope.ok_or_else(|| InvalidFilter::MissingScope {
                    operator: key.to_string(),
                })?;
                Ok(Leaf::compare(column, op, value.clone(), negated).into())
            }
            OperatorKey::Having(column) => self.compile_having(column, value, negated),
            OperatorKey::Unknown => Err(InvalidFilter::UnknownOperator {
                key: key.to_string(),
            }),
        }
    }

    /// Each `$or` member compiles in a fresh context: not negated, unscoped.
    fn compile_or(&self, value: &Value) -> Result<Node, InvalidFilter> {
        let members = match value {
            Value::Array(items) => items
                .iter()
                .map(|item| self.compile_filter(item, false, None))
                .collect::<Result<Vec<_>, _>>()?,
            Value::Object(_) => vec![self.compile_filter(value, false, None)?],
            _ => return Err(InvalidFilter::MalformedOr),
        };
        Ok(Node::any(Node::all(members)))
    }

    fn compile_having(
        &self,
        column: &str,
        value: &Value,
        negated: bool,
    ) -> Result<Node, InvalidFilter> {
        if negated {
            return Err(InvalidFilter::NegatedHaving {
                column: column.to_string(),
            });
        }

        let (symbol, comparand) = match value {
            Value::Object(map) if map.len() == 1 => map.iter().next().ok_or_else(|| {
                InvalidFilter::UnknownAggregateOperator {
                    operator: String::new(),
                }
            })?,
            Value::Object(map) => {
                let symbols: Vec<&str> = map.keys().map(String::as_str).collect();
                return Err(InvalidFilter::UnknownAggregateOperator {
                    operator: symbols.join(", "),
                });
            }
            other => {
                return Err(InvalidFilter::UnknownAggregateOperator {
                    operator: other.to_string(),
                });
            }
        };

        let operator = ComparisonOp::from_symbol(symbol).ok_or_else(|| {
            InvalidFilter::UnknownAggregateOperator {
                operator: symbol.clone(),
            }
        })?;

        Ok(HavingLeaf {
            column: column.to_string(),
            operator,
            value: comparand.clone(),
        }
        .into())
    }

    fn compile_field(
        &self,
        key: &str,
        value: &Value,
        negated: bool,
    ) -> Result<Node, InvalidFilter> {
        let node = match value {
            Value::Null => Leaf::is_null(key, negated).into(),
            Value::Array(values) => Leaf::is_in(key, values.clone(), negated).into(),
            Value::Object(_) => self.compile_filter(value, negated, Some(key))?,
            scalar => Leaf::equals(key, scalar.clone(), negated).into(),
        };
        Ok(node)
    }
}
