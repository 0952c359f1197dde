//! Term-level significance filtering of aggregated enrichment results.

use crate::data::{AggregatedTable, SignificantTable};
use crate::error::{EnrichError, Result};
use crate::pipeline::ToolConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which side of the threshold counts as significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// `value <= threshold` (adjusted p-values, q-values).
    LowerIsSignificant,
    /// `value >= threshold` (enrichment scores, AUC-like statistics).
    HigherIsSignificant,
}

impl Direction {
    /// Check a value against the threshold. NaN is never significant.
    pub fn is_significant(&self, value: f64, threshold: f64) -> bool {
        match self {
            Self::LowerIsSignificant => value <= threshold,
            Self::HigherIsSignificant => value >= threshold,
        }
    }

    /// Get the descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LowerIsSignificant => "lower-is-significant",
            Self::HigherIsSignificant => "higher-is-significant",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Cell values read as missing, the same set pandas treats as NaN by default.
pub const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Parse a significance cell. Missing values are `None`.
fn parse_statistic(raw: &str, column: &str, row: usize) -> Result<Option<f64>> {
    let value = raw.trim();
    if NA_VALUES.contains(&value) {
        return Ok(None);
    }
    value
        .parse::<f64>()
        .map(Some)
        .map_err(|_| EnrichError::InvalidNumber {
            value: raw.to_string(),
            column: column.to_string(),
            row,
        })
}

/// Distinct terms that cross the threshold in at least one row, in first-seen order.
pub fn significant_terms(table: &AggregatedTable, config: &ToolConfig) -> Result<Vec<String>> {
    if table.is_empty() {
        return Ok(Vec::new());
    }

    let term_col = table.require_column(&config.term_column, "aggregated results")?;
    let stat_col = table.require_column(&config.adj_pvalue_column, "aggregated results")?;

    let mut seen = HashSet::new();
    let mut terms = Vec::new();
    for (i, row) in table.rows().iter().enumerate() {
        let Some(value) = parse_statistic(&row[stat_col], &config.adj_pvalue_column, i)? else {
            continue;
        };
        if config
            .direction
            .is_significant(value, config.adj_pvalue_threshold)
            && seen.insert(row[term_col].as_str())
        {
            terms.push(row[term_col].clone());
        }
    }

    Ok(terms)
}

/// Keep every row whose term is significant for at least one feature set.
///
/// A term that crosses the threshold for one origin keeps its rows from all
/// origins, including those where it did not cross the threshold itself.
/// An empty input yields an empty output without any column lookups.
pub fn filter_significant(table: &AggregatedTable, config: &ToolConfig) -> Result<SignificantTable> {
    if table.is_empty() {
        return Ok(table.without_rows());
    }

    let terms = significant_terms(table, config)?;
    let terms: HashSet<&str> = terms.iter().map(String::as_str).collect();
    let term_col = table.require_column(&config.term_column, "aggregated results")?;

    Ok(table.filter_rows(|_, row| terms.contains(row[term_col].as_str())))
}
