//! The compiled condition tree.

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use serde_json::Value;

use crate::ast::{ComparisonOp, Verb};

/// What a leaf tests.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column = value`, or `column <op> value` when scoped by a comparison operator.
    Compare {
        column: String,
        operator: Option<ComparisonOp>,
        value: Value,
    },
    /// `column IN (values)`
    In { column: String, values: Vec<Value> },
    /// `column IS NULL`
    Null { column: String },
}

/// A single predicate, possibly negated.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub negated: bool,
    pub predicate: Predicate,
}

impl Leaf {
    /// `column = value`
    pub fn equals(column: &str, value: Value, negated: bool) -> Self {
        Self {
            negated,
            predicate: Predicate::Compare {
                column: column.to_string(),
                operator: None,
                value,
            },
        }
    }

    /// `column <op> value`
    pub fn compare(column: &str, operator: ComparisonOp, value: Value, negated: bool) -> Self {
        Self {
            negated,
            predicate: Predicate::Compare {
                column: column.to_string(),
                operator: Some(operator),
                value,
            },
        }
    }

    /// `column IN (values)`
    pub fn is_in(column: &str, values: Vec<Value>, negated: bool) -> Self {
        Self {
            negated,
            predicate: Predicate::In {
                column: column.to_string(),
                values,
            },
        }
    }

    /// `column IS NULL`
    pub fn is_null(column: &str, negated: bool) -> Self {
        Self {
            negated,
            predicate: Predicate::Null {
                column: column.to_string(),
            },
        }
    }

    /// The AND-form builder verb for this leaf.
    pub fn verb(&self) -> Verb {
        match (&self.predicate, self.negated) {
            (Predicate::Compare { .. }, false) => Verb::Where,
            (Predicate::Compare { .. }, true) => Verb::WhereNot,
            (Predicate::In { .. }, false) => Verb::WhereIn,
            (Predicate::In { .. }, true) => Verb::WhereNotIn,
            (Predicate::Null { .. }, false) => Verb::WhereNull,
            (Predicate::Null { .. }, true) => Verb::WhereNotNull,
        }
    }

    pub fn column(&self) -> &str {
        match &self.predicate {
            Predicate::Compare { column, .. }
            | Predicate::In { column, .. }
            | Predicate::Null { column } => column,
        }
    }

    /// Builder token of the scoping comparison operator, if any.
    pub fn operator_token(&self) -> Option<&'static str> {
        match &self.predicate {
            Predicate::Compare { operator, .. } => operator.map(ComparisonOp::token),
            _ => None,
        }
    }

    /// Compared value; `Null` for list and null predicates.
    pub fn value(&self) -> &Value {
        match &self.predicate {
            Predicate::Compare { value, .. } => value,
            _ => &Value::Null,
        }
    }

    /// IN-list values; empty for compare and null predicates.
    pub fn values(&self) -> &[Value] {
        match &self.predicate {
            Predicate::In { values, .. } => values,
            _ => &[],
        }
    }

    /// Positional builder arguments: `[column, (operator,) value]`.
    pub fn args(&self) -> Vec<Value> {
        let column = Value::String(self.column().to_string());
        match &self.predicate {
            Predicate::Compare {
                operator: Some(op),
                value,
                ..
            } => vec![column, Value::String(op.token().to_string()), value.clone()],
            Predicate::Compare { value, .. } => vec![column, value.clone()],
            Predicate::In { values, .. } => vec![column, Value::Array(values.clone())],
            Predicate::Null { .. } => vec![column],
        }
    }
}

impl Serialize for Leaf {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Leaf", 2)?;
        state.serialize_field("verb", &self.verb())?;
        state.serialize_field("args", &self.args())?;
        state.end()
    }
}

impl std::fmt::Display for Leaf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let args: Vec<String> = self.args().iter().map(|a| a.to_string()).collect();
        write!(f, "{}({})", self.verb(), args.join(", "))
    }
}

/// A predicate over an aggregate. Always AND-combined, never negated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HavingLeaf {
    pub column: String,
    pub operator: ComparisonOp,
    pub value: Value,
}

impl std::fmt::Display for HavingLeaf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "having({}, {}, {})",
            Value::String(self.column.clone()),
            Value::String(self.operator.token().to_string()),
            self.value
        )
    }
}

/// An AND list (implicit) or OR list (from `$or`).
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Group {
    pub is_or: bool,
    pub children: Vec<Node>,
}

/// A node of the compiled condition tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Leaf(Leaf),
    Having(HavingLeaf),
    Group(Group),
}

impl Node {
    /// AND together `nodes`, collapsing a single node to itself.
    pub fn all(mut nodes: Vec<Node>) -> Node {
        if nodes.len() == 1 {
            return nodes.remove(0);
        }
        Node::Group(Group {
            is_or: false,
            children: nodes,
        })
    }

    /// OR the members of `node`. An AND group's children become the OR
    /// members; anything else becomes the sole member.
    pub fn any(node: Node) -> Node {
        let children = match node {
            Node::Group(Group {
                is_or: false,
                children,
            }) => children,
            other => vec![other],
        };
        Node::Group(Group {
            is_or: true,
            children,
        })
    }

    /// True for a group with no children.
    pub fn is_empty(&self) -> bool {
        matches!(self, Node::Group(group) if group.children.is_empty())
    }

    /// Number of leaf and having predicates in the tree.
    pub fn predicate_count(&self) -> usize {
        match self {
            Node::Leaf(_) | Node::Having(_) => 1,
            Node::Group(group) => group.children.iter().map(Node::predicate_count).sum(),
        }
    }
}

impl From<Leaf> for Node {
    fn from(leaf: Leaf) -> Self {
        Node::Leaf(leaf)
    }
}

impl From<HavingLeaf> for Node {
    fn from(having: HavingLeaf) -> Self {
        Node::Having(having)
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Leaf(leaf) => write!(f, "{}", leaf),
            Node::Having(having) => write!(f, "{}", having),
            Node::Group(group) => {
                write!(f, "{}[", if group.is_or { "OR" } else { "AND" })?;
                for (i, child) in group.children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", child)?;
                }
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_all_collapses_singleton() {
        let leaf = Node::from(Leaf::equals("a", json!(1), false));
        assert_eq!(Node::all(vec![leaf.clone()]), leaf);

        let pair = Node::all(vec![leaf.clone(), leaf.clone()]);
        assert!(matches!(
            pair,
            Node::Group(Group { is_or: false, ref children }) if children.len() == 2
        ));
    }

    #[test]
    fn test_any_lifts_and_children() {
        let a = Node::from(Leaf::equals("a", json!(1), false));
        let b = Node::from(Leaf::equals("b", json!(2), false));

        let or = Node::any(Node::all(vec![a.clone(), b.clone()]));
        assert_eq!(
            or,
            Node::Group(Group {
                is_or: true,
                children: vec![a.clone(), b]
            })
        );

        let single = Node::any(a.clone());
        assert_eq!(
            single,
            Node::Group(Group {
                is_or: true,
                children: vec![a]
            })
        );
    }

    #[test]
    fn test_leaf_verbs_and_args() {
        let leaf = Leaf::compare("age", ComparisonOp::Gt, json!(5), true);
        assert_eq!(leaf.verb(), Verb::WhereNot);
        assert_eq!(leaf.args(), vec![json!("age"), json!(">"), json!(5)]);
        assert_eq!(leaf.to_string(), r#"where_not("age", ">", 5)"#);

        let leaf = Leaf::is_in("id", vec![json!(1), json!(2)], false);
        assert_eq!(leaf.verb(), Verb::WhereIn);
        assert_eq!(leaf.values(), &[json!(1), json!(2)]);
        assert_eq!(leaf.value(), &Value::Null);

        let leaf = Leaf::is_null("deleted_at", true);
        assert_eq!(leaf.verb(), Verb::WhereNotNull);
        assert_eq!(leaf.args(), vec![json!("deleted_at")]);
    }

    #[test]
    fn test_node_display() {
        let tree = Node::all(vec![
            Leaf::equals("a", json!("x"), false).into(),
            Node::any(Node::all(vec![
                Leaf::is_null("b", false).into(),
                HavingLeaf {
                    column: "count".to_string(),
                    operator: ComparisonOp::Gte,
                    value: json!(2),
                }
                .into(),
            ])),
        ]);
        assert_eq!(
            tree.to_string(),
            r#"AND[where("a", "x"), OR[where_null("b"), having("count", ">=", 2)]]"#
        );
        assert_eq!(tree.predicate_count(), 3);
    }

    #[test]
    fn test_node_serialization() {
        let node = Node::from(Leaf::equals("a", json!(1), false));
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json, json!({"node": "leaf", "verb": "where", "args": ["a", 1]}));

        let node = Node::from(HavingLeaf {
            column: "total".to_string(),
            operator: ComparisonOp::Lt,
            value: json!(10),
        });
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            json!({"node": "having", "column": "total", "operator": "<", "value": 10})
        );
    }
}
