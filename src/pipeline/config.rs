//! YAML configuration for an aggregation run.

use crate::error::{EnrichError, Result};
use crate::filter::Direction;
use crate::resolve::default_direction_for;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Column names a tool uses in its result tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNames {
    /// Term or identifier column.
    pub term: String,
    /// Adjusted significance column.
    pub adj_pvalue: String,
    /// Overrides the tool's default direction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

/// Everything the significance filter needs to know about one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Name of the term column.
    pub term_column: String,
    /// Name of the adjusted significance column.
    pub adj_pvalue_column: String,
    /// Cutoff applied to `adj_pvalue_column`.
    pub adj_pvalue_threshold: f64,
    /// Side of the cutoff that is significant.
    pub direction: Direction,
}

/// Configuration of an aggregation run.
///
/// Unknown keys are ignored so the same file can also drive the analysis
/// steps that produce the per-feature-set results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Root directory of per-feature-set results and aggregated outputs.
    pub result_path: PathBuf,
    /// Annotation table; may instead be given on the command line.
    #[serde(default)]
    pub annotation: Option<PathBuf>,
    /// Project label, informational only.
    #[serde(default)]
    pub project_name: Option<String>,
    /// tool -> result columns. Also defines which tools are aggregated, in order.
    pub column_names: IndexMap<String, ColumnNames>,
    /// tool -> adjusted significance cutoff.
    pub adjp_th: IndexMap<String, f64>,
    /// database -> source path. Only the names are used here.
    pub local_databases: IndexMap<String, Option<String>>,
}

impl EnrichmentConfig {
    /// Example configuration covering each kind of tool.
    pub fn example() -> Self {
        let columns = |term: &str, adj_pvalue: &str| ColumnNames {
            term: term.to_string(),
            adj_pvalue: adj_pvalue.to_string(),
            direction: None,
        };

        let mut column_names = IndexMap::new();
        column_names.insert("GREAT".to_string(), columns("description", "p_adjust"));
        column_names.insert("ORA_GSEApy".to_string(), columns("Term", "Adjusted P-value"));
        column_names.insert("preranked_GSEApy".to_string(), columns("Term", "FDR q-val"));
        column_names.insert("RcisTarget".to_string(), columns("motif", "NES"));

        let mut adjp_th = IndexMap::new();
        adjp_th.insert("GREAT".to_string(), 0.05);
        adjp_th.insert("ORA_GSEApy".to_string(), 0.05);
        adjp_th.insert("preranked_GSEApy".to_string(), 0.25);
        adjp_th.insert("RcisTarget".to_string(), 3.0);

        let mut local_databases = IndexMap::new();
        local_databases.insert(
            "GO_Biological_Process".to_string(),
            Some("resources/GO_Biological_Process.gmt".to_string()),
        );
        local_databases.insert("KEGG".to_string(), Some("resources/KEGG.gmt".to_string()));

        Self {
            result_path: PathBuf::from("results"),
            annotation: Some(PathBuf::from("config/annotation.csv")),
            project_name: Some("example".to_string()),
            column_names,
            adjp_th,
            local_databases,
        }
    }

    /// Load from YAML string and validate.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file and validate.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(EnrichError::from)
    }

    /// Check every configured tool has a finite threshold.
    pub fn validate(&self) -> Result<()> {
        for tool in self.column_names.keys() {
            self.tool_config(tool)?;
        }
        Ok(())
    }

    /// Tools to aggregate, in configuration order.
    pub fn tools(&self) -> impl Iterator<Item = &str> {
        self.column_names.keys().map(String::as_str)
    }

    /// Databases to aggregate, in configuration order.
    pub fn databases(&self) -> impl Iterator<Item = &str> {
        self.local_databases.keys().map(String::as_str)
    }

    /// Build the filter configuration for `tool`.
    ///
    /// Fails with `Config` when the tool has no column names or no threshold.
    pub fn tool_config(&self, tool: &str) -> Result<ToolConfig> {
        let columns = self.column_names.get(tool).ok_or_else(|| {
            EnrichError::Config(format!("tool '{}' is missing from column_names", tool))
        })?;
        let threshold = *self.adjp_th.get(tool).ok_or_else(|| {
            EnrichError::Config(format!("tool '{}' is missing from adjp_th", tool))
        })?;
        if !threshold.is_finite() {
            return Err(EnrichError::Config(format!(
                "adjp_th for tool '{}' must be a finite number",
                tool
            )));
        }

        Ok(ToolConfig {
            term_column: columns.term.clone(),
            adj_pvalue_column: columns.adj_pvalue.clone(),
            adj_pvalue_threshold: threshold,
            direction: columns
                .direction
                .unwrap_or_else(|| default_direction_for(tool)),
        })
    }

    /// Annotation table path, preferring `cli_override` over the configured one.
    pub fn annotation_path(&self, cli_override: Option<&Path>) -> Result<PathBuf> {
        cli_override
            .map(Path::to_path_buf)
            .or_else(|| self.annotation.clone())
            .ok_or_else(|| {
                EnrichError::Config(
                    "no annotation table: set 'annotation' or pass --annotation".to_string(),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
project_name: example
result_path: results
annotation: config/annotation.csv
threads: 4
local_databases:
  GO_BP: resources/go.gmt
  KEGG: ""
  JASPAR:
column_names:
  ORA_GSEApy:
    term: Term
    adj_pvalue: Adjusted P-value
  RcisTarget:
    term: motif
    adj_pvalue: NES
  LOLA:
    term: description
    adj_pvalue: qValue
    direction: lower-is-significant
adjp_th:
  ORA_GSEApy: 0.05
  RcisTarget: 3
  LOLA: 0.1
"#;

    #[test]
    fn test_load_keeps_order() {
        let config = EnrichmentConfig::from_yaml(YAML).unwrap();

        assert_eq!(config.result_path, PathBuf::from("results"));
        assert_eq!(config.project_name.as_deref(), Some("example"));
        assert_eq!(
            config.tools().collect::<Vec<_>>(),
            vec!["ORA_GSEApy", "RcisTarget", "LOLA"]
        );
        assert_eq!(
            config.databases().collect::<Vec<_>>(),
            vec!["GO_BP", "KEGG", "JASPAR"]
        );
    }

    #[test]
    fn test_tool_config() {
        let config = EnrichmentConfig::from_yaml(YAML).unwrap();

        let ora = config.tool_config("ORA_GSEApy").unwrap();
        assert_eq!(ora.term_column, "Term");
        assert_eq!(ora.adj_pvalue_column, "Adjusted P-value");
        assert_eq!(ora.adj_pvalue_threshold, 0.05);
        assert_eq!(ora.direction, Direction::LowerIsSignificant);

        let rcis = config.tool_config("RcisTarget").unwrap();
        assert_eq!(rcis.adj_pvalue_threshold, 3.0);
        assert_eq!(rcis.direction, Direction::HigherIsSignificant);
    }

    #[test]
    fn test_missing_threshold_is_config_error() {
        let yaml = YAML.replace("  LOLA: 0.1\n", "");
        let err = EnrichmentConfig::from_yaml(&yaml).unwrap_err();
        assert!(matches!(err, EnrichError::Config(ref m) if m.contains("LOLA")));
    }

    #[test]
    fn test_unknown_tool_lookup() {
        let config = EnrichmentConfig::from_yaml(YAML).unwrap();
        assert!(matches!(
            config.tool_config("GREAT"),
            Err(EnrichError::Config(_))
        ));
    }

    #[test]
    fn test_missing_required_key() {
        let yaml = YAML.replace("result_path: results\n", "");
        assert!(matches!(
            EnrichmentConfig::from_yaml(&yaml),
            Err(EnrichError::Yaml(_))
        ));
    }

    #[test]
    fn test_annotation_path_override() {
        let config = EnrichmentConfig::from_yaml(YAML).unwrap();
        assert_eq!(
            config.annotation_path(None).unwrap(),
            PathBuf::from("config/annotation.csv")
        );
        assert_eq!(
            config.annotation_path(Some(Path::new("other.csv"))).unwrap(),
            PathBuf::from("other.csv")
        );

        let mut config = config;
        config.annotation = None;
        assert!(config.annotation_path(None).is_err());
    }

    #[test]
    fn test_example_is_valid() {
        let example = EnrichmentConfig::example();
        let parsed = EnrichmentConfig::from_yaml(&example.to_yaml().unwrap()).unwrap();
        assert_eq!(parsed.tools().count(), 4);
        assert_eq!(
            parsed.tool_config("RcisTarget").unwrap().direction,
            Direction::HigherIsSignificant
        );
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = EnrichmentConfig::from_yaml(YAML).unwrap();
        let parsed = EnrichmentConfig::from_yaml(&config.to_yaml().unwrap()).unwrap();
        assert_eq!(parsed.column_names, config.column_names);
        assert_eq!(parsed.adjp_th, config.adjp_th);
    }
}
