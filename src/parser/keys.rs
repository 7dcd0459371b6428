//! Grammar for `$`-prefixed filter keys.
//!
//! ```text
//! $or | $not | $gt | $gte | $lt | $lte | $like | $having.<column>
//! ```

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case},
    character::complete::char,
    combinator::{all_consuming, map, rest, value, verify},
    sequence::preceded,
    IResult,
};

use crate::ast::ComparisonOp;

/// What an operator key means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKey<'a> {
    Or,
    Not,
    Comparison(ComparisonOp),
    /// `$having.<column>`, carrying the column.
    Having(&'a str),
    Unknown,
}

/// Classify an operator key. Anything that does not parse is `Unknown`.
pub fn classify(key: &str) -> OperatorKey<'_> {
    match all_consuming(operator_key)(key) {
        Ok((_, parsed)) => parsed,
        Err(_) => OperatorKey::Unknown,
    }
}

/// True when `key` starts with `$or` or `$not`, ignoring case.
///
/// Relation extraction descends into these looser matches.
pub fn is_logical_prefix(key: &str) -> bool {
    let logical: IResult<&str, &str> =
        preceded(char('$'), alt((tag_no_case("or"), tag_no_case("not"))))(key);
    logical.is_ok()
}

fn operator_key(input: &str) -> IResult<&str, OperatorKey<'_>> {
    preceded(char('$'), alt((having, comparison, logical)))(input)
}

fn having(input: &str) -> IResult<&str, OperatorKey<'_>> {
    map(
        preceded(tag_no_case("having."), verify(rest, |s: &str| !s.is_empty())),
        OperatorKey::Having,
    )(input)
}

fn comparison(input: &str) -> IResult<&str, OperatorKey<'_>> {
    // Longer symbols first so `gte` is not read as `gt`.
    alt((
        value(OperatorKey::Comparison(ComparisonOp::Gte), tag("gte")),
        value(OperatorKey::Comparison(ComparisonOp::Gt), tag("gt")),
        value(OperatorKey::Comparison(ComparisonOp::Lte), tag("lte")),
        value(OperatorKey::Comparison(ComparisonOp::Lt), tag("lt")),
        value(OperatorKey::Comparison(ComparisonOp::Like), tag("like")),
    ))(input)
}

fn logical(input: &str) -> IResult<&str, OperatorKey<'_>> {
    alt((
        value(OperatorKey::Not, tag("not")),
        value(OperatorKey::Or, tag("or")),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_logical() {
        assert_eq!(classify("$or"), OperatorKey::Or);
        assert_eq!(classify("$not"), OperatorKey::Not);
        assert_eq!(classify("$OR"), OperatorKey::Unknown);
        assert_eq!(classify("$order"), OperatorKey::Unknown);
    }

    #[test]
    fn test_classify_comparison() {
        assert_eq!(classify("$gt"), OperatorKey::Comparison(ComparisonOp::Gt));
        assert_eq!(classify("$gte"), OperatorKey::Comparison(ComparisonOp::Gte));
        assert_eq!(classify("$lt"), OperatorKey::Comparison(ComparisonOp::Lt));
        assert_eq!(classify("$lte"), OperatorKey::Comparison(ComparisonOp::Lte));
        assert_eq!(classify("$like"), OperatorKey::Comparison(ComparisonOp::Like));
        assert_eq!(classify("$gtx"), OperatorKey::Unknown);
        assert_eq!(classify("gt"), OperatorKey::Unknown);
    }

    #[test]
    fn test_classify_having() {
        assert_eq!(classify("$having.count"), OperatorKey::Having("count"));
        assert_eq!(classify("$HAVING.total_price"), OperatorKey::Having("total_price"));
        assert_eq!(classify("$having."), OperatorKey::Unknown);
        assert_eq!(classify("$having"), OperatorKey::Unknown);
    }

    #[test]
    fn test_logical_prefix() {
        assert!(is_logical_prefix("$or"));
        assert!(is_logical_prefix("$NOT"));
        assert!(is_logical_prefix("$orders"));
        assert!(!is_logical_prefix("$gt"));
        assert!(!is_logical_prefix("or"));
    }
}
