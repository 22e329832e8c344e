//! The in-memory table and its loaders.
//!
//! RULE: A Dataset is never mutated once it is handed to a desk.
//! The schema detector consumes and rebuilds it; everything else borrows.

use crate::{
    error::{DeskError, DeskResult},
    table::TableView,
    types::{CellValue, Row},
};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<String>,
    rows:    Vec<Row>,
}

/// JSON "split" layout: `{"columns": [...], "data": [[...], ...]}`.
#[derive(Debug, Deserialize)]
struct SplitFile {
    columns: Vec<String>,
    #[serde(default)]
    data:    Vec<Vec<CellValue>>,
}

impl Dataset {
    /// Build a table, padding short rows with nulls and dropping surplus cells.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let width = columns.len();
        let mut ragged = 0usize;
        let rows = rows
            .into_iter()
            .map(|mut row| {
                if row.len() != width {
                    ragged += 1;
                    row.resize(width, CellValue::Null);
                }
                row
            })
            .collect();
        if ragged > 0 {
            log::warn!("{ragged} row(s) did not match the {width} header column(s) and were resized");
        }
        Self { columns, rows }
    }

    /// Load the file at `path`, choosing the reader from its extension.
    pub fn load(path: &Path) -> DeskResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let file = std::fs::File::open(path).map_err(|source| DeskError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path.display().to_string();
        let dataset = match ext.as_deref() {
            Some("csv") | Some("txt") => Self::from_csv_reader(file, &name)?,
            Some("json") => Self::from_json_reader(file, &name)?,
            _ => return Err(DeskError::UnsupportedFormat { path: path.to_path_buf() }),
        };
        log::info!(
            "Loaded {} rows x {} columns from {name}",
            dataset.len(),
            dataset.columns.len()
        );
        Ok(dataset)
    }

    pub fn from_csv_reader<R: Read>(reader: R, source_name: &str) -> DeskResult<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let columns: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
        if columns.is_empty() || columns.iter().all(|c| c.trim().is_empty()) {
            return Err(DeskError::MalformedDataset {
                source_name: source_name.to_string(),
                reason:      "no header row".into(),
            });
        }

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(coerce_cell).collect());
        }
        Ok(Self::new(columns, rows))
    }

    pub fn from_csv_str(text: &str) -> DeskResult<Self> {
        Self::from_csv_reader(text.as_bytes(), "<inline>")
    }

    pub fn from_json_reader<R: Read>(reader: R, source_name: &str) -> DeskResult<Self> {
        let file: SplitFile = serde_json::from_reader(reader)?;
        if file.columns.is_empty() {
            return Err(DeskError::MalformedDataset {
                source_name: source_name.to_string(),
                reason:      "empty column list".into(),
            });
        }
        Ok(Self::new(file.columns, file.data))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Every row, as a view.
    pub fn full_view(&self) -> FilteredView<'_> {
        FilteredView::new(self, (0..self.rows.len()).collect())
    }

    pub(crate) fn into_parts(self) -> (Vec<String>, Vec<Row>) {
        (self.columns, self.rows)
    }
}

/// CSV cells arrive as text; give them the narrowest type that fits.
fn coerce_cell(raw: &str) -> CellValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return CellValue::Null;
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return CellValue::Boolean(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return CellValue::Boolean(false);
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        if i.to_string() == trimmed {
            return CellValue::Integer(i);
        }
    }
    // Identifiers such as change numbers can be all digits yet overflow i64.
    if is_integer_literal(trimmed) && trimmed.parse::<i64>().is_err() {
        return CellValue::Text(trimmed.to_string());
    }
    if let Ok(value) = trimmed.parse::<f64>() {
        if value.is_finite() {
            return CellValue::Number { value, raw: trimmed.to_string() };
        }
    }
    CellValue::Text(trimmed.to_string())
}

fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// A subset of a dataset's rows, by index, in dataset order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub(crate) fn new(dataset: &'a Dataset, indices: Vec<usize>) -> Self {
        Self { dataset, indices }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a Row> + '_ {
        let rows = self.dataset.rows();
        self.indices.iter().map(move |&i| &rows[i])
    }

    /// Values of one column across the view; empty when the column is unknown.
    pub fn column_values(&self, column: &str) -> Vec<&'a CellValue> {
        match self.dataset.column_index(column) {
            Some(idx) => self.rows().map(|row| &row[idx]).collect(),
            None => Vec::new(),
        }
    }

    /// Materialize the view into an owned table for display or export.
    pub fn to_table(&self) -> TableView {
        TableView {
            columns: self.dataset.columns().to_vec(),
            rows:    self.rows().cloned().collect(),
        }
    }
}
