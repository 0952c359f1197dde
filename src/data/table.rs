//! Row-oriented CSV tables for enrichment results.
//!
//! Cells are kept as strings so every column an external tool writes
//! survives aggregation unchanged. Only the columns the significance filter
//! needs are ever interpreted.

use crate::error::{EnrichError, Result};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A table of string cells with a header row.
///
/// A table with no columns and no rows is the explicit empty table: it is
/// what aggregation returns when no result file survived, and it is written
/// as a zero-byte file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultTable {
    /// Column names in file order.
    columns: Vec<String>,
    /// Rows, each exactly `columns.len()` cells wide.
    rows: Vec<Vec<String>>,
}

/// Concatenation of every result table found for one (group, tool, database) triple.
pub type AggregatedTable = ResultTable;

/// Rows of an [`AggregatedTable`] whose term passed the significance threshold.
pub type SignificantTable = ResultTable;

impl ResultTable {
    /// Create a table, checking every row matches the header width.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(EnrichError::RowLength {
                    row: i,
                    expected: columns.len(),
                    actual: row.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// The table with no columns and no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a comma-separated table with a header row.
    ///
    /// A zero-byte file loads as [`ResultTable::empty`].
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Parse a comma-separated table from any reader.
    ///
    /// Repeated header names are renamed `x.1`, `x.2`, ... so that every
    /// column keeps its own cells.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let columns = dedupe_columns(reader.headers()?.iter().map(String::from).collect());
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(String::from).collect());
        }

        Self::new(columns, rows)
    }

    /// Write the table as CSV.
    ///
    /// Tables without columns produce a zero-byte file so that "processed but
    /// empty" is still observable on disk.
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if self.columns.is_empty() {
            File::create(path)?;
            return Ok(());
        }

        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows in order.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// True when the table has no rows (it may still carry a header).
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Check if a column exists.
    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    /// Position of a column, if present.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Position of a column, failing with `MissingColumn` naming `table`.
    pub fn require_column(&self, column: &str, table: &str) -> Result<usize> {
        self.column_index(column)
            .ok_or_else(|| EnrichError::MissingColumn {
                column: column.to_string(),
                table: table.to_string(),
            })
    }

    /// Cell at `row` in `column`.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| r[col].as_str())
    }

    /// All values of a column, top to bottom.
    pub fn column(&self, column: &str) -> Result<Vec<&str>> {
        let col = self.require_column(column, "result table")?;
        Ok(self.rows.iter().map(|r| r[col].as_str()).collect())
    }

    /// Distinct values of a column in first-seen order.
    pub fn distinct_values(&self, column: &str) -> Result<Vec<&str>> {
        let mut seen = HashSet::new();
        Ok(self
            .column(column)?
            .into_iter()
            .filter(|v| seen.insert(*v))
            .collect())
    }

    /// Set `column` to `value` on every row, appending the column if absent.
    pub fn with_column(mut self, column: &str, value: &str) -> Self {
        match self.column_index(column) {
            Some(col) => {
                for row in &mut self.rows {
                    row[col] = value.to_string();
                }
            }
            None => {
                self.columns.push(column.to_string());
                for row in &mut self.rows {
                    row.push(value.to_string());
                }
            }
        }
        self
    }

    /// Keep the rows for which `keep(row_index, row)` is true, in order.
    pub fn filter_rows<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(usize, &[String]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .enumerate()
            .filter(|(i, row)| keep(*i, row))
            .map(|(_, row)| row.clone())
            .collect();
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Same header, no rows.
    pub fn without_rows(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: Vec::new(),
        }
    }

    /// Stack tables top to bottom in the order given.
    ///
    /// The header is the union of all columns in first-seen order; cells for
    /// columns a table does not have are left empty. Concatenating nothing
    /// yields [`ResultTable::empty`].
    pub fn concat<I>(tables: I) -> Self
    where
        I: IntoIterator<Item = ResultTable>,
    {
        let tables: Vec<ResultTable> = tables.into_iter().collect();

        let mut columns: Vec<String> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        for table in &tables {
            for column in &table.columns {
                if !positions.contains_key(column) {
                    positions.insert(column.clone(), columns.len());
                    columns.push(column.clone());
                }
            }
        }

        let width = columns.len();
        let mut rows = Vec::with_capacity(tables.iter().map(|t| t.n_rows()).sum());
        for table in tables {
            let mapping: Vec<usize> = table
                .columns
                .iter()
                .filter_map(|c| positions.get(c).copied())
                .collect();
            for row in table.rows {
                let mut out = vec![String::new(); width];
                for (value, &col) in row.into_iter().zip(&mapping) {
                    out[col] = value;
                }
                rows.push(out);
            }
        }

        Self { columns, rows }
    }
}

/// Suffix repeated names with `.N`, skipping suffixes already taken.
fn dedupe_columns(columns: Vec<String>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::with_capacity(columns.len());
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(columns.len());

    for column in columns {
        let mut name = column.clone();
        if taken.contains(&name) {
            let count = counts.entry(column.clone()).or_insert(0);
            loop {
                *count += 1;
                name = format!("{}.{}", column, count);
                if !taken.contains(&name) {
                    break;
                }
            }
        }
        taken.insert(name.clone());
        out.push(name);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn table(columns: &[&str], rows: &[&[&str]]) -> ResultTable {
        ResultTable::new(
            columns.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_from_reader() {
        let data = "Term,Adjusted P-value\nA,0.01\nB,0.5\n";
        let t = ResultTable::from_reader(data.as_bytes()).unwrap();

        assert_eq!(t.columns(), &["Term", "Adjusted P-value"]);
        assert_eq!(t.n_rows(), 2);
        assert_eq!(t.get(1, "Term"), Some("B"));
    }

    #[test]
    fn test_zero_byte_file_is_empty_table() {
        let file = NamedTempFile::new().unwrap();
        let t = ResultTable::from_csv(file.path()).unwrap();

        assert_eq!(t, ResultTable::empty());
        assert_eq!(t.n_columns(), 0);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let data = "a,b\n1,2\n3\n";
        assert!(ResultTable::from_reader(data.as_bytes()).is_err());

        let err = ResultTable::new(vec!["a".into()], vec![vec![]]).unwrap_err();
        assert!(err.is_schema());
    }

    #[test]
    fn test_write_empty_table_is_zero_bytes() {
        let file = NamedTempFile::new().unwrap();
        ResultTable::empty().to_csv(file.path()).unwrap();

        assert_eq!(std::fs::metadata(file.path()).unwrap().len(), 0);
    }

    #[test]
    fn test_write_then_read_preserves_cells() {
        let t = table(&["", "Term", "NES"], &[&["0", "motif, with comma", "3.2"]]);
        let file = NamedTempFile::new().unwrap();
        t.to_csv(file.path()).unwrap();

        let back = ResultTable::from_csv(file.path()).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_header_only_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "term,padj").unwrap();
        file.flush().unwrap();

        let t = ResultTable::from_csv(file.path()).unwrap();
        assert!(t.is_empty());
        assert_eq!(t.n_columns(), 2);
    }

    #[test]
    fn test_with_column_appends_and_overwrites() {
        let t = table(&["term"], &[&["A"], &["B"]]).with_column("origin", "fs1");
        assert_eq!(t.columns(), &["term", "origin"]);
        assert_eq!(t.column("origin").unwrap(), vec!["fs1", "fs1"]);

        let t = t.with_column("origin", "fs2");
        assert_eq!(t.n_columns(), 2);
        assert_eq!(t.column("origin").unwrap(), vec!["fs2", "fs2"]);
    }

    #[test]
    fn test_concat_preserves_order_and_unions_columns() {
        let a = table(&["term", "p"], &[&["A", "0.1"], &["B", "0.2"]]);
        let b = table(&["term", "score"], &[&["C", "7"]]);

        let c = ResultTable::concat(vec![a, b]);
        assert_eq!(c.columns(), &["term", "p", "score"]);
        assert_eq!(c.column("term").unwrap(), vec!["A", "B", "C"]);
        assert_eq!(c.rows()[2], vec!["C", "", "7"]);
        assert_eq!(c.rows()[0], vec!["A", "0.1", ""]);
    }

    #[test]
    fn test_duplicate_headers_keep_their_cells() {
        let data = "term,x,x,x.1,x\nA,1,2,3,4\n";
        let t = ResultTable::from_reader(data.as_bytes()).unwrap();
        assert_eq!(t.columns(), &["term", "x", "x.1", "x.1.1", "x.2"]);
        assert_eq!(t.rows()[0], vec!["A", "1", "2", "3", "4"]);

        let other = ResultTable::from_reader("term,x,x\nB,5,6\n".as_bytes()).unwrap();
        let c = ResultTable::concat(vec![t, other]);
        assert_eq!(c.column("x").unwrap(), vec!["1", "5"]);
        assert_eq!(c.column("x.1").unwrap(), vec!["2", "6"]);
        assert_eq!(c.column("x.2").unwrap(), vec!["4", ""]);
    }

    #[test]
    fn test_concat_nothing() {
        assert_eq!(ResultTable::concat(Vec::new()), ResultTable::empty());
    }

    #[test]
    fn test_distinct_values_first_seen() {
        let t = table(&["term"], &[&["B"], &["A"], &["B"], &["C"]]);
        assert_eq!(t.distinct_values("term").unwrap(), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_missing_column() {
        let t = table(&["term"], &[&["A"]]);
        let err = t.column("padj").unwrap_err();
        assert!(matches!(err, EnrichError::MissingColumn { ref column, .. } if column == "padj"));
    }

    #[test]
    fn test_filter_rows() {
        let t = table(&["term"], &[&["A"], &["B"], &["C"]]);
        let kept = t.filter_rows(|i, _| i != 1);
        assert_eq!(kept.column("term").unwrap(), vec!["A", "C"]);
        assert_eq!(t.without_rows().n_columns(), 1);
    }
}
