//! Condition applier.
//!
//! Replays a compiled [`Node`] tree against a [`QueryBuilder`]. The AND/OR
//! context is threaded through the walk as a parameter; the only state that
//! changes is the builder's own.

use serde_json::Value;
use tracing::{debug, trace};

use crate::ast::{Group, HavingLeaf, Leaf, Node, Verb};
use crate::config::ApplyConfig;
use crate::error::{FilterResult, InvalidFilter};

/// A fluent WHERE/HAVING builder, in the style of knex or diesel's boxed queries.
///
/// Every method returns the builder for chaining. Group methods open a
/// parenthesized scope, run `scope` against it and return to the enclosing
/// builder.
pub trait QueryBuilder: Sized {
    fn where_(&mut self, column: &str, operator: Option<&str>, value: &Value) -> &mut Self;
    fn or_where(&mut self, column: &str, operator: Option<&str>, value: &Value) -> &mut Self;
    fn where_not(&mut self, column: &str, operator: Option<&str>, value: &Value) -> &mut Self;
    fn or_where_not(&mut self, column: &str, operator: Option<&str>, value: &Value) -> &mut Self;

    fn where_in(&mut self, column: &str, values: &[Value]) -> &mut Self;
    fn or_where_in(&mut self, column: &str, values: &[Value]) -> &mut Self;
    fn where_not_in(&mut self, column: &str, values: &[Value]) -> &mut Self;
    fn or_where_not_in(&mut self, column: &str, values: &[Value]) -> &mut Self;

    fn where_null(&mut self, column: &str) -> &mut Self;
    fn or_where_null(&mut self, column: &str) -> &mut Self;
    fn where_not_null(&mut self, column: &str) -> &mut Self;
    fn or_where_not_null(&mut self, column: &str) -> &mut Self;

    fn having(&mut self, column: &str, operator: &str, value: &Value) -> &mut Self;

    /// `AND ( ... )`
    fn where_group<F>(&mut self, scope: F) -> &mut Self
    where
        F: FnOnce(&mut Self);

    /// `OR ( ... )`
    fn or_where_group<F>(&mut self, scope: F) -> &mut Self
    where
        F: FnOnce(&mut Self);
}

/// Walks condition trees into a builder.
#[derive(Debug, Clone, Copy, Default)]
pub struct Applier {
    strict_null_analogue: bool,
    strict_group_composition: bool,
}

impl Applier {
    pub fn new(config: &ApplyConfig) -> Self {
        Self {
            strict_null_analogue: config.strict_null_analogue,
            strict_group_composition: config.strict_group_composition,
        }
    }

    /// Apply `node` as the top-level condition.
    ///
    /// A top-level AND group is not parenthesized: its members go straight
    /// onto the builder.
    pub fn apply<B: QueryBuilder>(&self, builder: &mut B, node: &Node) -> FilterResult<()> {
        debug!(predicates = node.predicate_count(), "applying conditions");
        match node {
            Node::Group(Group {
                is_or: false,
                children,
            }) => children
                .iter()
                .try_for_each(|child| self.apply_node(builder, child, false))?,
            other => self.apply_node(builder, other, false)?,
        }
        Ok(())
    }

    /// Apply several top-level conditions as an implicit AND list.
    pub fn apply_all<B: QueryBuilder>(&self, builder: &mut B, nodes: &[Node]) -> FilterResult<()> {
        nodes.iter().try_for_each(|node| self.apply(builder, node))
    }

    fn apply_node<B: QueryBuilder>(
        &self,
        builder: &mut B,
        node: &Node,
        use_or: bool,
    ) -> Result<(), InvalidFilter> {
        match node {
            Node::Leaf(leaf) => {
                self.apply_leaf(builder, leaf, use_or);
                Ok(())
            }
            Node::Having(having) => apply_having(builder, having, use_or),
            Node::Group(group) => self.apply_group(builder, group, use_or),
        }
    }

    /// `use_or` decides how the group joins its siblings. Members join each
    /// other as decided by [`Applier::joins_with_or`].
    fn apply_group<B: QueryBuilder>(
        &self,
        builder: &mut B,
        group: &Group,
        use_or: bool,
    ) -> Result<(), InvalidFilter> {
        if group.children.is_empty() {
            return Ok(());
        }

        let mut outcome = Ok(());
        let scope = |inner: &mut B| {
            outcome = group.children.iter().try_for_each(|child| {
                let use_or = self.joins_with_or(group, child);
                self.apply_node(inner, child, use_or)
            });
        };
        if use_or {
            builder.or_where_group(scope);
        } else {
            builder.where_group(scope);
        }
        outcome
    }

    /// Whether `child` joins its siblings inside `group` with OR.
    ///
    /// Predicates follow the group. A nested group is OR-joined exactly when
    /// it is itself an OR group, unless strict composition is set, in which
    /// case nested groups follow the enclosing group like predicates do.
    fn joins_with_or(&self, group: &Group, child: &Node) -> bool {
        match child {
            Node::Group(nested) if !self.strict_group_composition => nested.is_or,
            _ => group.is_or,
        }
    }

    fn apply_leaf<B: QueryBuilder>(&self, builder: &mut B, leaf: &Leaf, use_or: bool) {
        let verb = if use_or {
            leaf.verb().or_analogue(self.strict_null_analogue)
        } else {
            leaf.verb()
        };
        trace!(%verb, column = leaf.column(), "applying leaf");

        let column = leaf.column();
        let operator = leaf.operator_token();
        match verb {
            Verb::Where => builder.where_(column, operator, leaf.value()),
            Verb::OrWhere => builder.or_where(column, operator, leaf.value()),
            Verb::WhereNot => builder.where_not(column, operator, leaf.value()),
            Verb::OrWhereNot => builder.or_where_not(column, operator, leaf.value()),
            Verb::WhereIn => builder.where_in(column, leaf.values()),
            Verb::OrWhereIn => builder.or_where_in(column, leaf.values()),
            Verb::WhereNotIn => builder.where_not_in(column, leaf.values()),
            Verb::OrWhereNotIn => builder.or_where_not_in(column, leaf.values()),
            Verb::WhereNull => builder.where_null(column),
            Verb::OrWhereNull => builder.or_where_null(column),
            Verb::WhereNotNull => builder.where_not_null(column),
            Verb::OrWhereNotNull => builder.or_where_not_null(column),
        };
    }
}

fn apply_having<B: QueryBuilder>(
    builder: &mut B,
    having: &HavingLeaf,
    use_or: bool,
) -> Result<(), InvalidFilter> {
    if use_or {
        return Err(InvalidFilter::OrHavingConflict {
            column: having.column.clone(),
        });
    }
    builder.having(&having.column, having.operator.token(), &having.value);
    Ok(())
}

/// Apply `node` with the default settings.
pub fn apply<B: QueryBuilder>(builder: &mut B, node: &Node) -> FilterResult<()> {
    Applier::default().apply(builder, node)
}
