//! Planning and running aggregation over every (group, tool, database) triple.

use crate::aggregate::aggregate_report;
use crate::data::AnnotationIndex;
use crate::error::{EnrichError, Result};
use crate::filter::filter_significant;
use crate::pipeline::{EnrichmentConfig, ToolConfig};
use crate::resolve::{output_paths, path_for, resolve, OutputPaths};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// One unit of aggregation work.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Triple {
    pub group: String,
    pub tool: String,
    pub database: String,
}

impl Triple {
    pub fn new(group: &str, tool: &str, database: &str) -> Self {
        Self {
            group: group.to_string(),
            tool: tool.to_string(),
            database: database.to_string(),
        }
    }
}

impl std::fmt::Display for Triple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.group, self.tool, self.database)
    }
}

/// A triple with its candidate inputs and output destinations.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedTriple {
    pub triple: Triple,
    /// `(feature_set, result file)` in resolver order. Files may not exist.
    pub inputs: Vec<(String, PathBuf)>,
    pub outputs: OutputPaths,
}

/// Enumerate every triple with at least one eligible feature set.
///
/// Order is group (annotation order), then tool and database (configuration
/// order). Triples whose tool accepts none of the group's feature sets are
/// left out entirely.
pub fn plan(index: &AnnotationIndex, config: &EnrichmentConfig) -> Vec<PlannedTriple> {
    let root = config.result_path.as_path();
    let mut planned = Vec::new();

    for group in index.groups() {
        for tool in config.tools() {
            let feature_sets = resolve(index, group, tool);
            if feature_sets.is_empty() {
                log::debug!("[{}/{}] no eligible feature sets, skipping", group, tool);
                continue;
            }
            for database in config.databases() {
                let inputs = feature_sets
                    .iter()
                    .map(|fs| (fs.clone(), path_for(fs, tool, database, root)))
                    .collect();
                planned.push(PlannedTriple {
                    triple: Triple::new(group, tool, database),
                    inputs,
                    outputs: output_paths(group, tool, database, root),
                });
            }
        }
    }

    planned
}

/// What one successful triple produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TripleReport {
    /// Candidate result files.
    pub n_candidates: usize,
    /// Result files actually loaded.
    pub n_loaded: usize,
    /// Rows in the aggregated table.
    pub n_rows: usize,
    /// Rows in the significant table.
    pub n_significant_rows: usize,
    /// Distinct significant terms.
    pub n_significant_terms: usize,
}

/// Aggregate, filter and write one triple.
///
/// On success both output files are written, empty or not. On failure
/// neither is left behind, so outputs of an earlier run never sit next to
/// a half-written pair.
pub fn run_triple(planned: &PlannedTriple, tool_config: &ToolConfig) -> Result<TripleReport> {
    let result = write_triple(planned, tool_config);
    if result.is_err() {
        remove_outputs(&planned.outputs);
    }
    result
}

/// Remove both outputs of a triple, ignoring files that are already gone.
fn remove_outputs(outputs: &OutputPaths) {
    for path in [&outputs.all, &outputs.sig] {
        match fs::remove_file(path) {
            Ok(()) => log::debug!("Removed stale output {:?}", path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Cannot remove stale output {:?}: {}", path, e),
        }
    }
}

fn write_triple(planned: &PlannedTriple, tool_config: &ToolConfig) -> Result<TripleReport> {
    let triple = &planned.triple;

    let report = aggregate_report(&planned.inputs)?;
    for name in &report.skipped {
        log::debug!("[{}] no results for feature set {}", triple, name);
    }
    let significant = filter_significant(&report.table, tool_config)?;

    for path in [&planned.outputs.all, &planned.outputs.sig] {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
    }
    report.table.to_csv(&planned.outputs.all)?;
    significant.to_csv(&planned.outputs.sig)?;

    let n_significant_terms = if significant.is_empty() {
        0
    } else {
        significant
            .distinct_values(&tool_config.term_column)?
            .len()
    };

    Ok(TripleReport {
        n_candidates: planned.inputs.len(),
        n_loaded: report.loaded.len(),
        n_rows: report.table.n_rows(),
        n_significant_rows: significant.n_rows(),
        n_significant_terms,
    })
}

/// Outcome of one triple within a run.
#[derive(Debug)]
pub struct TripleOutcome {
    pub triple: Triple,
    pub outputs: OutputPaths,
    pub result: Result<TripleReport>,
}

impl TripleOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcomes of a run, in plan order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<TripleOutcome>,
}

impl RunSummary {
    /// Number of triples attempted.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Triples that wrote both outputs.
    pub fn n_completed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Triples that failed.
    pub fn n_failed(&self) -> usize {
        self.len() - self.n_completed()
    }

    /// True when no triple failed.
    pub fn is_success(&self) -> bool {
        self.n_failed() == 0
    }

    /// Failed triples and their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&Triple, &EnrichError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (&o.triple, e)))
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Triples processed: {}", self.len())?;
        writeln!(f, "  completed: {}", self.n_completed())?;
        writeln!(f, "  failed:    {}", self.n_failed())?;
        for outcome in &self.outcomes {
            match &outcome.result {
                Ok(r) => writeln!(
                    f,
                    "{}: {}/{} files, {} rows, {} significant rows ({} terms)",
                    outcome.triple,
                    r.n_loaded,
                    r.n_candidates,
                    r.n_rows,
                    r.n_significant_rows,
                    r.n_significant_terms
                )?,
                Err(e) => writeln!(f, "{}: FAILED: {}", outcome.triple, e)?,
            }
        }
        Ok(())
    }
}

/// Run one planned triple, logging instead of propagating its error.
fn run_logged(planned: &PlannedTriple, tool_config: &ToolConfig) -> TripleOutcome {
    let result = run_triple(planned, tool_config);
    match &result {
        Ok(r) => log::info!(
            "[{}] {} of {} result files, {} rows, {} significant rows -> {:?}",
            planned.triple,
            r.n_loaded,
            r.n_candidates,
            r.n_rows,
            r.n_significant_rows,
            planned.outputs.all
        ),
        Err(e) => log::error!("[{}] aggregation failed: {}", planned.triple, e),
    }
    TripleOutcome {
        triple: planned.triple.clone(),
        outputs: planned.outputs.clone(),
        result,
    }
}

/// Run every planned triple.
///
/// Tool configurations are resolved before any work starts, so a
/// configuration error aborts the whole run. Failures inside a triple are
/// logged and recorded without stopping the others. Triples share no state
/// and write to distinct paths, so they run in parallel on a pool of
/// `threads` workers (0 uses the global rayon pool).
pub fn run_all(
    index: &AnnotationIndex,
    config: &EnrichmentConfig,
    threads: usize,
) -> Result<RunSummary> {
    let tool_configs: HashMap<&str, ToolConfig> = config
        .tools()
        .map(|tool| config.tool_config(tool).map(|c| (tool, c)))
        .collect::<Result<_>>()?;

    let planned = plan(index, config);
    log::info!(
        "Aggregating {} triples ({} groups, {} tools, {} databases)",
        planned.len(),
        index.groups().len(),
        tool_configs.len(),
        config.local_databases.len()
    );

    let run = || -> Vec<TripleOutcome> {
        planned
            .par_iter()
            .map(|p| run_logged(p, &tool_configs[p.triple.tool.as_str()]))
            .collect()
    };

    let outcomes = if threads == 0 {
        run()
    } else {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| EnrichError::Config(format!("cannot start {} threads: {}", threads, e)))?
            .install(run)
    };

    Ok(RunSummary { outcomes })
}

/// Load the configuration and annotation table named by `config_path`, then run.
pub fn run_from_files(
    config_path: &Path,
    annotation_override: Option<&Path>,
    threads: usize,
) -> Result<RunSummary> {
    let config = EnrichmentConfig::from_path(config_path)?;
    let annotation = config.annotation_path(annotation_override)?;
    let index = AnnotationIndex::from_csv(&annotation)?;
    log::info!(
        "Loaded {} feature sets in {} groups from {:?}",
        index.len(),
        index.groups().len(),
        annotation
    );
    run_all(&index, &config, threads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Direction;
    use tempfile::TempDir;

    fn config(root: &Path) -> EnrichmentConfig {
        let yaml = format!(
            r#"
result_path: {}
local_databases:
  db1: a.gmt
  db2: b.gmt
column_names:
  GREAT:
    term: term
    adj_pvalue: padj
  ORA_GSEApy:
    term: term
    adj_pvalue: padj
  HOMER:
    term: term
    adj_pvalue: padj
adjp_th:
  GREAT: 0.05
  ORA_GSEApy: 0.05
  HOMER: 0.05
"#,
            root.display()
        );
        EnrichmentConfig::from_yaml(&yaml).unwrap()
    }

    fn index() -> AnnotationIndex {
        let data = "name,group,features_path\ng1,grpA,g1.txt\nr1,grpA,r1.bed\ng2,grpB,g2.txt\n";
        AnnotationIndex::from_reader(data.as_bytes()).unwrap()
    }

    #[test]
    fn test_plan_order_and_skips() {
        let dir = TempDir::new().unwrap();
        let planned = plan(&index(), &config(dir.path()));

        let names: Vec<String> = planned.iter().map(|p| p.triple.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "grpA/GREAT/db1",
                "grpA/GREAT/db2",
                "grpA/ORA_GSEApy/db1",
                "grpA/ORA_GSEApy/db2",
                "grpB/ORA_GSEApy/db1",
                "grpB/ORA_GSEApy/db2",
            ]
        );

        let ora = &planned[2];
        assert_eq!(ora.inputs[0].0, "g1");
        assert_eq!(ora.inputs[1].0, "r1");
        assert_eq!(
            ora.inputs[1].1,
            dir.path().join("r1/ORA_GSEApy/db1/r1_db1.csv")
        );
    }

    #[test]
    fn test_run_triple_with_no_inputs_writes_empty_outputs() {
        let dir = TempDir::new().unwrap();
        let planned = plan(&index(), &config(dir.path()));
        let tool_config = ToolConfig {
            term_column: "term".into(),
            adj_pvalue_column: "padj".into(),
            adj_pvalue_threshold: 0.05,
            direction: Direction::LowerIsSignificant,
        };

        let report = run_triple(&planned[0], &tool_config).unwrap();
        assert_eq!(report.n_loaded, 0);
        assert_eq!(report.n_rows, 0);
        assert_eq!(fs::metadata(&planned[0].outputs.all).unwrap().len(), 0);
        assert_eq!(fs::metadata(&planned[0].outputs.sig).unwrap().len(), 0);
    }

    #[test]
    fn test_failed_rerun_leaves_no_stale_outputs() {
        let dir = TempDir::new().unwrap();
        let planned = plan(&index(), &config(dir.path()));
        let ora = &planned[2];
        let tool_config = ToolConfig {
            term_column: "term".into(),
            adj_pvalue_column: "padj".into(),
            adj_pvalue_threshold: 0.05,
            direction: Direction::LowerIsSignificant,
        };
        let input = &ora.inputs[0].1;
        fs::create_dir_all(input.parent().unwrap()).unwrap();

        fs::write(input, "term,padj\nOLD,0.01\n").unwrap();
        let report = run_triple(ora, &tool_config).unwrap();
        assert_eq!(report.n_significant_rows, 1);
        assert!(ora.outputs.all.exists());
        assert!(ora.outputs.sig.exists());

        fs::write(input, "term,padj\nNEW,low\n").unwrap();
        let err = run_triple(ora, &tool_config).unwrap_err();
        assert!(matches!(err, EnrichError::InvalidNumber { .. }));
        assert!(!ora.outputs.all.exists());
        assert!(!ora.outputs.sig.exists());
    }

    #[test]
    fn test_run_all_missing_threshold_is_fatal() {
        let dir = TempDir::new().unwrap();
        let mut cfg = config(dir.path());
        cfg.adjp_th.shift_remove("GREAT");

        let err = run_all(&index(), &cfg, 1).unwrap_err();
        assert!(matches!(err, EnrichError::Config(_)));
        assert!(!dir.path().join("enrichment_analysis").exists());
    }

    #[test]
    fn test_summary_display() {
        let summary = RunSummary {
            outcomes: vec![TripleOutcome {
                triple: Triple::new("g", "GREAT", "db"),
                outputs: output_paths("g", "GREAT", "db", Path::new("r")),
                result: Err(EnrichError::Config("x".into())),
            }],
        };
        let text = summary.to_string();
        assert!(text.contains("failed:    1"));
        assert!(text.contains("g/GREAT/db: FAILED"));
        assert_eq!(text.matches("g/GREAT/db").count(), 1);
        assert!(!summary.is_success());
    }
}
