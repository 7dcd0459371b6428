use serde::{Deserialize, Serialize};

/// Prefix that marks a filter key as an operator rather than a field.
pub const MARKER: char = '$';

/// Comparison operators usable under a field (`{age: {$gt: 5}}`) or inside `$having.<col>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOp {
    /// `$gt` → `>`
    #[serde(rename = ">")]
    Gt,
    /// `$gte` → `>=`
    #[serde(rename = ">=")]
    Gte,
    /// `$lt` → `<`
    #[serde(rename = "<")]
    Lt,
    /// `$lte` → `<=`
    #[serde(rename = "<=")]
    Lte,
    /// `$like` → `like`
    #[serde(rename = "like")]
    Like,
}

/// Filter symbol to builder token, in lookup order.
pub const COMPARISON_OPERATORS: [(&str, ComparisonOp); 5] = [
    ("$gt", ComparisonOp::Gt),
    ("$gte", ComparisonOp::Gte),
    ("$lt", ComparisonOp::Lt),
    ("$lte", ComparisonOp::Lte),
    ("$like", ComparisonOp::Like),
];

impl ComparisonOp {
    /// Look up a filter symbol such as `$gte`. Matching is exact.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        COMPARISON_OPERATORS
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, op)| *op)
    }

    /// The filter symbol (`$gte`).
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOp::Gt => "$gt",
            ComparisonOp::Gte => "$gte",
            ComparisonOp::Lt => "$lt",
            ComparisonOp::Lte => "$lte",
            ComparisonOp::Like => "$like",
        }
    }

    /// The token handed to the query builder (`>=`).
    pub fn token(self) -> &'static str {
        match self {
            ComparisonOp::Gt => ">",
            ComparisonOp::Gte => ">=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Lte => "<=",
            ComparisonOp::Like => "like",
        }
    }
}

impl std::fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// A query-builder predicate method.
///
/// Compiled leaves only ever carry the AND forms; the OR forms are chosen
/// by the applier when a leaf sits directly inside an OR group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verb {
    Where,
    OrWhere,
    WhereNot,
    OrWhereNot,
    WhereIn,
    OrWhereIn,
    WhereNotIn,
    OrWhereNotIn,
    WhereNull,
    OrWhereNull,
    WhereNotNull,
    OrWhereNotNull,
}

impl Verb {
    /// The OR-combined form of this verb.
    ///
    /// `WhereNull` maps to `OrWhereNotNull` unless `strict_nulls` is set,
    /// matching the long-standing behaviour of the filter format.
    pub fn or_analogue(self, strict_nulls: bool) -> Verb {
        match self {
            Verb::Where | Verb::OrWhere => Verb::OrWhere,
            Verb::WhereNot | Verb::OrWhereNot => Verb::OrWhereNot,
            Verb::WhereIn | Verb::OrWhereIn => Verb::OrWhereIn,
            Verb::WhereNotIn | Verb::OrWhereNotIn => Verb::OrWhereNotIn,
            Verb::WhereNull if strict_nulls => Verb::OrWhereNull,
            Verb::WhereNull | Verb::WhereNotNull | Verb::OrWhereNotNull => Verb::OrWhereNotNull,
            Verb::OrWhereNull => Verb::OrWhereNull,
        }
    }

    /// True for the `or_*` forms.
    pub fn is_or(self) -> bool {
        matches!(
            self,
            Verb::OrWhere
                | Verb::OrWhereNot
                | Verb::OrWhereIn
                | Verb::OrWhereNotIn
                | Verb::OrWhereNull
                | Verb::OrWhereNotNull
        )
    }

    /// Builder method name, e.g. `or_where_not_in`.
    pub fn name(self) -> &'static str {
        match self {
            Verb::Where => "where",
            Verb::OrWhere => "or_where",
            Verb::WhereNot => "where_not",
            Verb::OrWhereNot => "or_where_not",
            Verb::WhereIn => "where_in",
            Verb::OrWhereIn => "or_where_in",
            Verb::WhereNotIn => "where_not_in",
            Verb::OrWhereNotIn => "or_where_not_in",
            Verb::WhereNull => "where_null",
            Verb::OrWhereNull => "or_where_null",
            Verb::WhereNotNull => "where_not_null",
            Verb::OrWhereNotNull => "or_where_not_null",
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
