//! Enrichment Result Aggregation Library
//!
//! This library resolves, for every group of feature sets (gene lists, genomic
//! region sets or pre-ranked gene lists), which per-feature-set enrichment
//! result tables each tool produced against each database, merges them into
//! one table, and derives the significance-filtered subset.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **data**: Annotation index and result tables
//! - **resolve**: Tool eligibility policies, feature-set resolution, result paths
//! - **aggregate**: Concatenation of per-feature-set result tables
//! - **filter**: Term-level significance filtering
//! - **pipeline**: Configuration, planning and parallel execution
//!
//! # Example
//!
//! ```no_run
//! use enrichment_aggregate::prelude::*;
//!
//! let config = EnrichmentConfig::from_path("config.yaml").unwrap();
//! let index = AnnotationIndex::from_csv("annotation.csv").unwrap();
//!
//! // One triple by hand
//! let names = resolve(&index, "tcell", "ORA_GSEApy");
//! let inputs: Vec<_> = names
//!     .iter()
//!     .map(|fs| (fs.clone(), path_for(fs, "ORA_GSEApy", "KEGG", &config.result_path)))
//!     .collect();
//! let all = aggregate(&inputs).unwrap();
//! let sig = filter_significant(&all, &config.tool_config("ORA_GSEApy").unwrap()).unwrap();
//!
//! // Or everything at once
//! let summary = run_all(&index, &config, 4).unwrap();
//! println!("{}", summary);
//! ```

pub mod aggregate;
pub mod data;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod resolve;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::aggregate::{aggregate, aggregate_report, AggregateReport, ORIGIN_COLUMN};
    pub use crate::data::{
        AggregatedTable, AnnotationIndex, AnnotationRecord, FeatureSetKind, ResultTable,
        SignificantTable,
    };
    pub use crate::error::{EnrichError, Result};
    pub use crate::filter::{filter_significant, significant_terms, Direction};
    pub use crate::pipeline::{
        plan, run_all, run_from_files, run_triple, ColumnNames, EnrichmentConfig, PlannedTriple,
        RunSummary, ToolConfig, Triple, TripleOutcome, TripleReport,
    };
    pub use crate::resolve::{output_paths, path_for, resolve, OutputPaths, Tool};
}
