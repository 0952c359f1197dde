//! Filtering primitives for aggregated result tables.

pub mod significance;

pub use significance::{filter_significant, significant_terms, Direction};
