use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;
use crate::error::FilterError;

fn compile_err(filter: Value) -> InvalidFilter {
    match compile(&filter) {
        Err(FilterError::Invalid(invalid)) => invalid,
        other => panic!("expected an invalid filter, got {:?}", other),
    }
}

fn and(children: Vec<Node>) -> Node {
    Node::Group(Group {
        is_or: false,
        children,
    })
}

fn or(children: Vec<Node>) -> Node {
    Node::Group(Group {
        is_or: true,
        children,
    })
}

// ========================================================================
// Field values
// ========================================================================

#[test]
fn test_scalar_field() {
    let node = compile(&json!({"name": "ann"})).unwrap();
    assert_eq!(node, Leaf::equals("name", json!("ann"), false).into());
}

#[test]
fn test_null_field() {
    let node = compile(&json!({"deleted_at": null})).unwrap();
    assert_eq!(node, Leaf::is_null("deleted_at", false).into());
}

#[test]
fn test_list_field() {
    let node = compile(&json!({"id": [1, 2, 3]})).unwrap();
    assert_eq!(
        node,
        Leaf::is_in("id", vec![json!(1), json!(2), json!(3)], false).into()
    );
}

#[test]
fn test_fields_keep_mapping_order() {
    let node = compile(&json!({"b": 1, "a": 2})).unwrap();
    assert_eq!(
        node,
        and(vec![
            Leaf::equals("b", json!(1), false).into(),
            Leaf::equals("a", json!(2), false).into(),
        ])
    );
}

#[test]
fn test_sequence_is_and_list() {
    let node = compile(&json!([{"a": 1}, {"b": 2}])).unwrap();
    assert_eq!(
        node,
        and(vec![
            Leaf::equals("a", json!(1), false).into(),
            Leaf::equals("b", json!(2), false).into(),
        ])
    );

    let single = compile(&json!([{"a": 1}])).unwrap();
    assert_eq!(single, Leaf::equals("a", json!(1), false).into());
}

#[test]
fn test_scalar_filter_is_empty() {
    assert!(compile(&json!(42)).unwrap().is_empty());
    assert!(compile(&json!({})).unwrap().is_empty());
}

// ========================================================================
// Comparison operators
// ========================================================================

#[test]
fn test_scoped_comparison() {
    let node = compile(&json!({"age": {"$gt": 5}})).unwrap();
    assert_eq!(node, Leaf::compare("age", ComparisonOp::Gt, json!(5), false).into());
}

#[test]
fn test_range_under_one_field() {
    let node = compile(&json!({"age": {"$gte": 18, "$lt": 65}})).unwrap();
    assert_eq!(
        node,
        and(vec![
            Leaf::compare("age", ComparisonOp::Gte, json!(18), false).into(),
            Leaf::compare("age", ComparisonOp::Lt, json!(65), false).into(),
        ])
    );
}

#[test]
fn test_like() {
    let node = compile(&json!({"email": {"$like": "%@example.com"}})).unwrap();
    assert_eq!(
        node,
        Leaf::compare("email", ComparisonOp::Like, json!("%@example.com"), false).into()
    );
}

#[test]
fn test_nested_field_resets_scope() {
    // A plain key inside a field mapping is its own field.
    let node = compile(&json!({"author": {"name": "x"}})).unwrap();
    assert_eq!(node, Leaf::equals("name", json!("x"), false).into());
}

#[test]
fn test_comparison_without_scope() {
    assert_eq!(
        compile_err(json!({"$gt": 5})),
        InvalidFilter::MissingScope {
            operator: "$gt".to_string()
        }
    );
}

#[test]
fn test_unknown_operator() {
    let err = compile_err(json!({"$xyz": 1}));
    assert_eq!(err.kind(), "unknown-operator");
    assert_eq!(
        compile_err(json!({"age": {"$eq": 1}})),
        InvalidFilter::UnknownOperator {
            key: "$eq".to_string()
        }
    );
}

#[test]
fn test_sequence_under_comparison() {
    assert_eq!(
        compile_err(json!({"age": {"$gt": [1, 2]}})),
        InvalidFilter::IllegalSequence {
            key: "$gt".to_string()
        }
    );
    assert_eq!(compile_err(json!({"$gt": [1, 2]})).kind(), "illegal-sequence");
}

// ========================================================================
// $or
// ========================================================================

#[test]
fn test_or_list() {
    let node = compile(&json!({"$or": [{"a": 1}, {"b": 2}]})).unwrap();
    assert_eq!(
        node,
        or(vec![
            Leaf::equals("a", json!(1), false).into(),
            Leaf::equals("b", json!(2), false).into(),
        ])
    );
}

#[test]
fn test_or_single_mapping_matches_single_list() {
    let from_map = compile(&json!({"$or": {"a": 1}})).unwrap();
    let from_list = compile(&json!({"$or": [{"a": 1}]})).unwrap();
    assert_eq!(from_map, from_list);
    assert_eq!(from_map, or(vec![Leaf::equals("a", json!(1), false).into()]));
}

#[test]
fn test_or_member_with_several_keys_stays_grouped() {
    let node = compile(&json!({"$or": [{"a": 1, "b": 2}, {"c": 3}]})).unwrap();
    assert_eq!(
        node,
        or(vec![
            and(vec![
                Leaf::equals("a", json!(1), false).into(),
                Leaf::equals("b", json!(2), false).into(),
            ]),
            Leaf::equals("c", json!(3), false).into(),
        ])
    );
}

#[test]
fn test_or_beside_fields() {
    let node = compile(&json!({"x": 1, "$or": [{"a": 1}, {"b": 2}]})).unwrap();
    assert_eq!(
        node,
        and(vec![
            Leaf::equals("x", json!(1), false).into(),
            or(vec![
                Leaf::equals("a", json!(1), false).into(),
                Leaf::equals("b", json!(2), false).into(),
            ]),
        ])
    );
}

#[test]
fn test_malformed_or() {
    assert_eq!(compile_err(json!({"$or": 1})), InvalidFilter::MalformedOr);
    assert_eq!(compile_err(json!({"$or": "a"})), InvalidFilter::MalformedOr);
}

#[test]
fn test_or_members_are_not_negated() {
    let node = compile(&json!({"$not": {"$or": [{"a": 1}, {"b": 2}]}})).unwrap();
    assert_eq!(
        node,
        or(vec![
            Leaf::equals("a", json!(1), false).into(),
            Leaf::equals("b", json!(2), false).into(),
        ])
    );
}

// ========================================================================
// $not
// ========================================================================

#[test]
fn test_not_scalar_and_null() {
    let node = compile(&json!({"$not": {"a": 1, "b": null}})).unwrap();
    assert_eq!(
        node,
        and(vec![
            Leaf::equals("a", json!(1), true).into(),
            Leaf::is_null("b", true).into(),
        ])
    );
}

#[test]
fn test_not_list() {
    let node = compile(&json!({"$not": {"id": [1, 2]}})).unwrap();
    assert_eq!(node, Leaf::is_in("id", vec![json!(1), json!(2)], true).into());
}

#[test]
fn test_not_sequence_value() {
    let node = compile(&json!({"$not": [{"a": 1}, {"b": 2}]})).unwrap();
    assert_eq!(
        node,
        and(vec![
            Leaf::equals("a", json!(1), true).into(),
            Leaf::equals("b", json!(2), true).into(),
        ])
    );
}

#[test]
fn test_not_inside_field_keeps_scope() {
    let node = compile(&json!({"age": {"$not": {"$gt": 5}}})).unwrap();
    assert_eq!(node, Leaf::compare("age", ComparisonOp::Gt, json!(5), true).into());
}

#[test]
fn test_double_not_stays_negated() {
    let node = compile(&json!({"$not": {"$not": {"a": 1}}})).unwrap();
    assert_eq!(node, Leaf::equals("a", json!(1), true).into());
}

#[test]
fn test_double_not_cancels_when_strict() {
    let compiler = Compiler::new(&CompileConfig {
        strict_negation: true,
    });
    let node = compiler.compile(&json!({"$not": {"$not": {"a": 1}}})).unwrap();
    assert_eq!(node, Leaf::equals("a", json!(1), false).into());

    let node = compiler.compile(&json!({"$not": {"a": 1}})).unwrap();
    assert_eq!(node, Leaf::equals("a", json!(1), true).into());
}

// ========================================================================
// $having
// ========================================================================

#[test]
fn test_having() {
    let node = compile(&json!({"$having.count": {"$gte": 2}})).unwrap();
    assert_eq!(
        node,
        HavingLeaf {
            column: "count".to_string(),
            operator: ComparisonOp::Gte,
            value: json!(2),
        }
        .into()
    );
}

#[test]
fn test_having_beside_fields() {
    let node = compile(&json!({"status": "open", "$having.total": {"$lt": 100}})).unwrap();
    assert_eq!(
        node,
        and(vec![
            Leaf::equals("status", json!("open"), false).into(),
            HavingLeaf {
                column: "total".to_string(),
                operator: ComparisonOp::Lt,
                value: json!(100),
            }
            .into(),
        ])
    );
}

#[test]
fn test_negated_having() {
    let err = compile_err(json!({"$not": {"$having.count": {"$gte": 2}}}));
    assert_eq!(
        err,
        InvalidFilter::NegatedHaving {
            column: "count".to_string()
        }
    );
}

#[test]
fn test_having_unknown_operator() {
    assert_eq!(
        compile_err(json!({"$having.count": {"$eq": 2}})),
        InvalidFilter::UnknownAggregateOperator {
            operator: "$eq".to_string()
        }
    );
    // No $having of $having.
    assert_eq!(
        compile_err(json!({"$having.count": {"$having.x": {"$gt": 1}}})).kind(),
        "unknown-aggregate-operator"
    );
    assert_eq!(
        compile_err(json!({"$having.count": 2})).kind(),
        "unknown-aggregate-operator"
    );
    assert_eq!(
        compile_err(json!({"$having.count": {"$gt": 1, "$lt": 5}})).kind(),
        "unknown-aggregate-operator"
    );
}

// ========================================================================
// Determinism
// ========================================================================

#[test]
fn test_compile_is_deterministic() {
    let filter = json!({
        "name": {"$like": "a%"},
        "$or": [{"role": null}, {"id": [1, 2]}, {"$not": {"age": {"$lt": 18}}}],
        "$having.count": {"$gt": 1}
    });
    assert_eq!(compile(&filter).unwrap(), compile(&filter).unwrap());
}
