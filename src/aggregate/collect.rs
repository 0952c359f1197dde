//! Concatenation of per-feature-set result tables.

use crate::data::{AggregatedTable, ResultTable};
use crate::error::Result;
use std::fs;
use std::path::Path;

/// Column added to every aggregated row naming the feature set it came from.
pub const ORIGIN_COLUMN: &str = "origin_feature_set";

/// Aggregated table plus which inputs contributed to it.
#[derive(Debug, Clone)]
pub struct AggregateReport {
    /// Concatenated rows, tagged with their origin.
    pub table: AggregatedTable,
    /// Feature sets whose result file was loaded, in input order.
    pub loaded: Vec<String>,
    /// Feature sets skipped because their file was missing or empty.
    pub skipped: Vec<String>,
}

/// True when `path` is an existing file with at least one byte.
pub fn is_nonempty_file(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

/// Aggregate result tables and report which inputs were used.
///
/// Entries whose file is missing or zero bytes are skipped without error.
/// Surviving tables are tagged with [`ORIGIN_COLUMN`] and stacked in input
/// order, each keeping its own row order. When nothing survives the result
/// is [`ResultTable::empty`].
pub fn aggregate_report<S, P>(paths: &[(S, P)]) -> Result<AggregateReport>
where
    S: AsRef<str>,
    P: AsRef<Path>,
{
    let mut tables = Vec::new();
    let mut loaded = Vec::new();
    let mut skipped = Vec::new();

    for (name, path) in paths {
        let (name, path) = (name.as_ref(), path.as_ref());
        if !is_nonempty_file(path) {
            skipped.push(name.to_string());
            continue;
        }

        let table = ResultTable::from_csv(path)?.with_column(ORIGIN_COLUMN, name);
        log::debug!("Loaded {} rows for {} from {:?}", table.n_rows(), name, path);
        tables.push(table);
        loaded.push(name.to_string());
    }

    Ok(AggregateReport {
        table: ResultTable::concat(tables),
        loaded,
        skipped,
    })
}

/// Concatenate the result tables of `(feature_set, path)` entries in order.
pub fn aggregate<S, P>(paths: &[(S, P)]) -> Result<AggregatedTable>
where
    S: AsRef<str>,
    P: AsRef<Path>,
{
    aggregate_report(paths).map(|report| report.table)
}
