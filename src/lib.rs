//! # filterkit
//!
//! > **Declarative filters in, query-builder calls out.**
//!
//! filterkit compiles nested `$`-operator filters into a condition tree and
//! replays that tree against any fluent [`QueryBuilder`](apply::QueryBuilder).
//! It also reports which relation paths a filter touches, for eager-loading.
//!
//! ## Quick Example
//!
//! ```rust
//! use filterkit::prelude::*;
//! use serde_json::json;
//!
//! let query = FilterQuery::new(json!({
//!     "status": "open",
//!     "$or": [{ "owner.name": { "$like": "a%" } }, { "priority": [1, 2] }]
//! }))?;
//!
//! let mut recorder = Recorder::new();
//! query.apply(&mut recorder)?;
//! assert_eq!(
//!     recorder.to_string(),
//!     r#"where("status", "open").where(|q| q.or_where("owner.name", "like", "a%").or_where_in("priority", [1,2]))"#
//! );
//! # Ok::<(), filterkit::FilterError>(())
//! ```
//!
//! ## Operators
//!
//! | Key               | Meaning                            | Builder call            |
//! |-------------------|------------------------------------|-------------------------|
//! | `field: v`        | Equality                           | `where`                 |
//! | `field: null`     | Null check                         | `where_null`            |
//! | `field: [..]`     | Membership                         | `where_in`              |
//! | `$or: [..]`       | OR group                           | `where(\|q\| q.or_*)`   |
//! | `$not: {..}`      | Negate everything beneath          | `where_not*`            |
//! | `$gt` `$gte` `$lt` `$lte` `$like` | Comparison on the enclosing field | `where(f, op, v)` |
//! | `$having.col: {$op: v}` | Aggregate comparison         | `having`                |

pub mod apply;
pub mod ast;
pub mod config;
pub mod error;
pub mod parser;
pub mod query;
pub mod recorder;
pub mod relations;

pub use error::{FilterError, FilterResult, InvalidFilter};
pub use query::FilterQuery;

pub mod prelude {
    pub use crate::apply::{Applier, QueryBuilder};
    pub use crate::ast::*;
    pub use crate::config::Config;
    pub use crate::error::*;
    pub use crate::parser::{Compiler, compile};
    pub use crate::query::FilterQuery;
    pub use crate::recorder::{Call, Recorder};
    pub use crate::relations::{RelationTree, extract_paths};
}

/// Compile a filter into a condition tree with the default settings.
///
/// # Example
///
/// ```
/// use serde_json::json;
///
/// let node = filterkit::compile(&json!({"age": {"$gt": 5}})).unwrap();
/// assert_eq!(node.to_string(), r#"where("age", ">", 5)"#);
/// ```
pub fn compile(filter: &serde_json::Value) -> FilterResult<ast::Node> {
    parser::compile(filter)
}
