//! Aggregation of per-feature-set result tables into one table per triple.

mod collect;

pub use collect::{aggregate, aggregate_report, is_nonempty_file, AggregateReport, ORIGIN_COLUMN};
