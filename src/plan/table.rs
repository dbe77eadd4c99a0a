//! CSV plan table reader.
//!
//! Rows are kept as header-keyed text so each row can fail on its own
//! without taking the rest of the plan down with it.

use std::collections::HashMap;
use std::path::Path;

use csv::{ReaderBuilder, Trim};

use crate::plan::types::{TableError, MANDATORY_COLUMNS};

/// One data record keyed by trimmed header name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    /// 1-based record number (header excluded)
    pub record: usize,
    fields: HashMap<String, String>,
}

impl RawRow {
    /// Build a record from `(header, value)` pairs.
    pub fn from_pairs<K, V>(record: usize, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let fields = pairs
            .into_iter()
            .map(|(k, v)| {
                let (k, v): (String, String) = (k.into(), v.into());
                (k.trim().to_string(), v.trim().to_string())
            })
            .collect();
        Self { record, fields }
    }

    /// Trimmed value of a column; `None` when absent or blank.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .get(column)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Number of columns in the record.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A parsed plan table.
#[derive(Debug, Clone)]
pub struct PlanTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl PlanTable {
    /// Parse CSV text.
    pub fn parse(content: &str) -> Result<Self, TableError> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| TableError::Csv(e.to_string()))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        if !MANDATORY_COLUMNS
            .iter()
            .any(|column| headers.iter().any(|h| h == column))
        {
            return Err(TableError::NoMandatoryColumns);
        }

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| TableError::Csv(e.to_string()))?;
            if record.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            let pairs = headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.as_str(), v));
            rows.push(RawRow::from_pairs(index + 1, pairs));
        }

        if rows.is_empty() {
            return Err(TableError::Empty);
        }

        tracing::debug!("Parsed plan table: {} columns, {} rows", headers.len(), rows.len());
        Ok(Self { headers, rows })
    }

    /// Read and parse a CSV file.
    pub fn from_path(path: &Path) -> Result<Self, TableError> {
        let content = std::fs::read_to_string(path).map_err(|e| TableError::Io(e.to_string()))?;
        Self::parse(&content)
    }
}
