//! Semantic-version parsing, comparison and constraint matching.

pub mod compare;
pub mod constraint;

pub use compare::{Operator, compare, compare_versions, parse_version};
pub use constraint::{Constraint, parse_constraints};
