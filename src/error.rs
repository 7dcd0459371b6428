//! Error types for filterkit.

use thiserror::Error;

/// A filter that cannot be compiled, or a compiled tree that cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidFilter {
    /// `$or` was given something other than a sequence or a mapping.
    #[error("$or only accepts a sequence or a single mapping (a sequence of length 1)")]
    MalformedOr,

    /// A sequence appeared under an operator other than `$or` / `$not`.
    #[error("'{key}': sequence values are only legal for $or, $not, or column IN-lists")]
    IllegalSequence { key: String },

    /// `$having.<column>` reached while negated.
    #[error("$having.{column} cannot be negated: HAVING cannot be negated")]
    NegatedHaving { column: String },

    /// The inner operator of a `$having.<column>` value is not a comparison.
    #[error("Unsupported aggregate comparison operator: '{operator}'")]
    UnknownAggregateOperator { operator: String },

    /// A `$` key that matches no known operator.
    #[error("'{key}' is not a valid comparison operator")]
    UnknownOperator { key: String },

    /// A comparison operator with no enclosing field.
    #[error("'{operator}' must be nested under a field name")]
    MissingScope { operator: String },

    /// A having predicate inside an OR composition.
    #[error("$having.{column}: HAVING has no OR composition")]
    OrHavingConflict { column: String },
}

impl InvalidFilter {
    /// Stable kebab-case tag for this failure.
    pub fn kind(&self) -> &'static str {
        match self {
            InvalidFilter::MalformedOr => "malformed-or",
            InvalidFilter::IllegalSequence { .. } => "illegal-sequence",
            InvalidFilter::NegatedHaving { .. } => "negated-having",
            InvalidFilter::UnknownAggregateOperator { .. } => "unknown-aggregate-operator",
            InvalidFilter::UnknownOperator { .. } => "unknown-operator",
            InvalidFilter::MissingScope { .. } => "missing-scope",
            InvalidFilter::OrHavingConflict { .. } => "or-having-conflict",
        }
    }
}

/// The main error type for filterkit operations.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The filter was rejected.
    #[error("Invalid filter ({kind}): {0}", kind = .0.kind())]
    Invalid(#[from] InvalidFilter),

    /// Filter text was not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FilterError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// The filter failure behind this error, if any.
    pub fn as_invalid(&self) -> Option<&InvalidFilter> {
        match self {
            Self::Invalid(invalid) => Some(invalid),
            _ => None,
        }
    }
}

/// Result type alias for filterkit operations.
pub type FilterResult<T> = Result<T, FilterError>;
