//! On-disk locations of per-feature-set inputs and aggregated outputs.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Directory under the result root holding aggregated outputs.
pub const AGGREGATE_DIR: &str = "enrichment_analysis";

/// Path of the result table one tool wrote for one feature set and database:
/// `result_root/feature_set/tool/database/{feature_set}_{database}.csv`.
pub fn path_for(feature_set: &str, tool: &str, database: &str, result_root: &Path) -> PathBuf {
    result_root
        .join(feature_set)
        .join(tool)
        .join(database)
        .join(format!("{}_{}.csv", feature_set, database))
}

/// Destinations of the aggregated and significant tables for one triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputPaths {
    /// Combined table of every feature set's results.
    pub all: PathBuf,
    /// Rows whose term is significant in at least one feature set.
    pub sig: PathBuf,
}

/// Output paths for a (group, tool, database) triple:
/// `result_root/enrichment_analysis/group/tool/database/{group}_{database}_{all,sig}.csv`.
pub fn output_paths(group: &str, tool: &str, database: &str, result_root: &Path) -> OutputPaths {
    let dir = result_root
        .join(AGGREGATE_DIR)
        .join(group)
        .join(tool)
        .join(database);
    OutputPaths {
        all: dir.join(format!("{}_{}_all.csv", group, database)),
        sig: dir.join(format!("{}_{}_sig.csv", group, database)),
    }
}

/// Recover the feature-set name from a result file named `{feature_set}_{database}.csv`.
///
/// Falls back to the file stem when the name does not end with the database suffix.
pub fn origin_from_file_name(path: &Path, database: &str) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    let suffix = format!("_{}.csv", database);
    match file_name.strip_suffix(&suffix) {
        Some(name) if !name.is_empty() => Some(name.to_string()),
        _ => path.file_stem()?.to_str().map(String::from),
    }
}
