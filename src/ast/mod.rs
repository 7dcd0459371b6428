pub mod conditions;
pub mod operators;

pub use self::conditions::{Group, HavingLeaf, Leaf, Node, Predicate};
pub use self::operators::{COMPARISON_OPERATORS, ComparisonOp, MARKER, Verb};
