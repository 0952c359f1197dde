//! Data structures for feature-set annotation and enrichment result tables.

mod annotation;
mod table;

pub use annotation::{AnnotationIndex, AnnotationRecord, FeatureSetKind, REQUIRED_COLUMNS};
pub use table::{AggregatedTable, ResultTable, SignificantTable};
