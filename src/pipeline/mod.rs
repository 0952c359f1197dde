//! Configuration and execution of aggregation runs.

mod config;
mod runner;

pub use config::{ColumnNames, EnrichmentConfig, ToolConfig};
pub use runner::{
    plan, run_all, run_from_files, run_triple, PlannedTriple, RunSummary, Triple, TripleOutcome,
    TripleReport,
};
