//! Feature-set annotation table.
//!
//! The annotation table lists every feature set of a project, one row per
//! feature set, keyed by a unique `name`. Each row belongs to a `group` and
//! points at the file holding its features; the file extension decides
//! whether the set is a gene list, a region set or a pre-ranked gene list.

use crate::error::{EnrichError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Columns every annotation table must carry.
pub const REQUIRED_COLUMNS: [&str; 3] = ["name", "group", "features_path"];

/// The kind of entities a feature set holds, derived from its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureSetKind {
    /// Gene list (`.txt`).
    Gene,
    /// Genomic region set (`.bed`).
    Region,
    /// Pre-ranked gene list (`.csv`).
    Ranked,
}

impl FeatureSetKind {
    /// Derive the kind from a features path, or `None` for any other extension.
    pub fn from_path(features_path: &str) -> Option<Self> {
        if features_path.ends_with(".txt") {
            Some(Self::Gene)
        } else if features_path.ends_with(".bed") {
            Some(Self::Region)
        } else if features_path.ends_with(".csv") {
            Some(Self::Ranked)
        } else {
            None
        }
    }

    /// Get the descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gene => "gene",
            Self::Region => "region",
            Self::Ranked => "ranked",
        }
    }
}

impl std::fmt::Display for FeatureSetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of the annotation table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationRecord {
    /// Unique feature-set name.
    pub name: String,
    /// Group label shared by related feature sets.
    pub group: String,
    /// Path of the file holding the features.
    pub features_path: String,
    /// Name of the background region set, for region-based analyses.
    pub background_name: Option<String>,
    /// Path of the background region set.
    pub background_path: Option<String>,
    kind: FeatureSetKind,
}

impl AnnotationRecord {
    /// Create a record, deriving its kind from `features_path`.
    ///
    /// Fails with `UnrecognizedKind` when the extension is not `.txt`, `.bed` or `.csv`.
    pub fn new(name: &str, group: &str, features_path: &str) -> Result<Self> {
        let kind =
            FeatureSetKind::from_path(features_path).ok_or_else(|| EnrichError::UnrecognizedKind {
                name: name.to_string(),
                path: features_path.to_string(),
            })?;
        Ok(Self {
            name: name.to_string(),
            group: group.to_string(),
            features_path: features_path.to_string(),
            background_name: None,
            background_path: None,
            kind,
        })
    }

    /// Attach a background region set.
    pub fn with_background(mut self, name: Option<String>, path: Option<String>) -> Self {
        self.background_name = name;
        self.background_path = path;
        self
    }

    /// Kind of this feature set.
    pub fn kind(&self) -> FeatureSetKind {
        self.kind
    }
}

/// Parsed annotation table with lookups by name and group.
#[derive(Debug, Clone, Default)]
pub struct AnnotationIndex {
    /// Records in table order.
    records: Vec<AnnotationRecord>,
    /// name -> position in `records`.
    by_name: HashMap<String, usize>,
    /// Distinct groups in first-seen order.
    groups: Vec<String>,
}

impl AnnotationIndex {
    /// Build an index from records in table order.
    ///
    /// Fails with `DuplicateName` if two records share a name.
    pub fn from_records(records: Vec<AnnotationRecord>) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(records.len());
        let mut groups: Vec<String> = Vec::new();

        for (i, record) in records.iter().enumerate() {
            if by_name.insert(record.name.clone(), i).is_some() {
                return Err(EnrichError::DuplicateName(record.name.clone()));
            }
            if !groups.contains(&record.group) {
                groups.push(record.group.clone());
            }
        }

        Ok(Self {
            records,
            by_name,
            groups,
        })
    }

    /// Load the annotation table from a CSV file.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Parse a comma-separated annotation table.
    ///
    /// Expected format:
    /// - First row: header containing at least `name`, `group`, `features_path`
    /// - Optional columns `background_name` and `background_path`; empty cells are `None`
    /// - Any other columns are ignored
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let header: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        let find = |column: &str| header.iter().position(|h| h == column);

        let mut required = [0usize; 3];
        for (slot, column) in required.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = find(column).ok_or_else(|| EnrichError::MissingColumn {
                column: column.to_string(),
                table: "annotation".to_string(),
            })?;
        }
        let [name_col, group_col, path_col] = required;
        let bg_name_col = find("background_name");
        let bg_path_col = find("background_path");

        let optional = |record: &csv::StringRecord, col: Option<usize>| {
            col.and_then(|c| record.get(c))
                .filter(|v| !v.is_empty())
                .map(String::from)
        };

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let field = |c: usize| row.get(c).unwrap_or("");
            let record = AnnotationRecord::new(field(name_col), field(group_col), field(path_col))?
                .with_background(optional(&row, bg_name_col), optional(&row, bg_path_col));
            records.push(record);
        }

        Self::from_records(records)
    }

    /// Number of feature sets.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in table order.
    pub fn records(&self) -> &[AnnotationRecord] {
        &self.records
    }

    /// Distinct group values in first-seen order.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Records belonging to `group`, in table order.
    pub fn records_in_group(&self, group: &str) -> Vec<&AnnotationRecord> {
        self.records.iter().filter(|r| r.group == group).collect()
    }

    /// Names of the feature sets in `group`, in table order.
    pub fn feature_sets_in_group(&self, group: &str) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| r.group == group)
            .map(|r| r.name.as_str())
            .collect()
    }

    /// Names of every feature set of `kind`, in table order.
    pub fn names_of_kind(&self, kind: FeatureSetKind) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| r.name.as_str())
            .collect()
    }

    /// Look up a record by name.
    pub fn get(&self, name: &str) -> Option<&AnnotationRecord> {
        self.by_name.get(name).map(|&i| &self.records[i])
    }

    fn require(&self, name: &str) -> Result<&AnnotationRecord> {
        self.get(name)
            .ok_or_else(|| EnrichError::NotFound(name.to_string()))
    }

    /// Kind of a feature set.
    pub fn kind_of(&self, name: &str) -> Result<FeatureSetKind> {
        self.require(name).map(|r| r.kind)
    }

    /// Path of the file holding a feature set's features.
    pub fn features_path_of(&self, name: &str) -> Result<&str> {
        self.require(name).map(|r| r.features_path.as_str())
    }

    /// Path of a feature set's background region set, if it has one.
    pub fn background_of(&self, name: &str) -> Result<Option<&str>> {
        self.require(name).map(|r| r.background_path.as_deref())
    }
}
