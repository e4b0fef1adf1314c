use std::{fs::File, io::Read, path::Path};

use csv::{ReaderBuilder, StringRecord};

use crate::{matrix::Matrix2, prelude::*};

/// Features plus class indices read by [`CsvLoader::load_labelled`].
#[derive(Debug, Clone, PartialEq)]
pub struct LabelledData {
    pub features: Matrix2<f64>,
    /// Class index of every row, into `classes`.
    pub labels: Vec<usize>,
    /// Distinct label strings in first-seen order.
    pub classes: Vec<String>,
}

/// Reads delimited text into numeric matrices.
///
/// Cells that do not parse as numbers are skipped one by one and rows left
/// without any numeric cell (header lines, blank lines) are dropped. Every
/// remaining row must have the same number of numeric cells.
pub struct CsvLoader {
    has_headers: bool,
    delimiter: u8,
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvLoader {
    pub fn new() -> Self {
        Self {
            has_headers: false,
            delimiter: b',',
        }
    }

    /// Treat the first line as a header and never parse it.
    pub fn has_headers(mut self, yes: bool) -> Self {
        self.has_headers = yes;
        self
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Matrix2<f64>> {
        let name = path.as_ref().display().to_string();
        let file = File::open(&path).map_err(|e| read_err(&name, e))?;
        self.load_from_reader(file, &name)
    }

    /// Like [`CsvLoader::load`] for any reader; `name` only appears in errors and logs.
    pub fn load_from_reader<R: Read>(&self, reader: R, name: &str) -> Result<Matrix2<f64>> {
        let mut rows = Vec::new();
        for (line, record) in self.records(reader, name)? {
            let row = numeric_cells(&record, line);
            if !row.is_empty() {
                rows.push(row);
            }
        }
        to_matrix(rows, name)
    }

    /// Reads numeric features and treats the last cell of every row as a class label.
    pub fn load_labelled<P: AsRef<Path>>(&self, path: P) -> Result<LabelledData> {
        let name = path.as_ref().display().to_string();
        let file = File::open(&path).map_err(|e| read_err(&name, e))?;
        self.load_labelled_from_reader(file, &name)
    }

    pub fn load_labelled_from_reader<R: Read>(&self, reader: R, name: &str) -> Result<LabelledData> {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        let mut classes: Vec<String> = Vec::new();

        for (line, record) in self.records(reader, name)? {
            let Some(label) = record.iter().last().map(str::trim) else {
                continue;
            };
            let mut cells = record.clone();
            cells.truncate(record.len() - 1);
            let row = numeric_cells(&cells, line);
            if row.is_empty() {
                continue;
            }

            let class = match classes.iter().position(|c| c == label) {
                Some(i) => i,
                None => {
                    classes.push(label.to_string());
                    classes.len() - 1
                }
            };
            rows.push(row);
            labels.push(class);
        }

        Ok(LabelledData {
            features: to_matrix(rows, name)?,
            labels,
            classes,
        })
    }

    fn records<R: Read>(&self, reader: R, name: &str) -> Result<Vec<(u64, StringRecord)>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(self.has_headers)
            .delimiter(self.delimiter)
            .flexible(true)
            .from_reader(reader);

        reader
            .records()
            .map(|record| {
                let record = record.map_err(|e| read_err(name, e))?;
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                Ok((line, record))
            })
            .collect()
    }
}

/// Builds a one-hot target matrix with `classes` columns.
pub fn one_hot(labels: &[usize], classes: usize) -> Result<Matrix2<f64>> {
    let mut targets = Matrix2::new(labels.len(), classes);
    for (row, &label) in labels.iter().enumerate() {
        if label >= classes {
            return Err(Error::DimensionErr {
                context: "class label",
                expected: classes,
                actual: label,
            });
        }
        targets[(row, label)] = 1.0;
    }
    Ok(targets)
}

fn numeric_cells(record: &StringRecord, line: u64) -> Vec<f64> {
    record
        .iter()
        .enumerate()
        .filter_map(|(col, cell)| match cell.trim().parse::<f64>() {
            Ok(x) if x.is_finite() => Some(x),
            _ => {
                tracing::debug!(line, col, cell, "skipping non-numeric cell");
                None
            }
        })
        .collect()
}

fn to_matrix(rows: Vec<Vec<f64>>, name: &str) -> Result<Matrix2<f64>> {
    if rows.is_empty() {
        return Err(Error::EmptyDataset(name.to_string()));
    }
    Matrix2::from_vec(rows)
}

fn read_err(name: &str, e: impl std::fmt::Display) -> Error {
    Error::ReadErr {
        source_name: name.to_string(),
        reason: e.to_string(),
    }
}
