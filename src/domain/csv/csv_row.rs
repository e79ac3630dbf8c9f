// ============================================================
// CSV ROW TYPES
// ============================================================
// Data structures representing parsed CSV content

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single cell in a CSV row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvField {
    /// Header the cell sits under
    pub name: String,

    /// Cell text
    pub value: String,
}

impl CsvField {
    pub fn new(name: String, value: String) -> Self {
        Self { name, value }
    }
}

/// A single data row in a CSV file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvRow {
    /// Row index (0-based, header excluded)
    pub index: usize,

    /// All fields in header order
    pub fields: Vec<CsvField>,

    /// Header -> position in `fields`
    #[serde(skip)]
    positions: HashMap<String, usize>,
}

impl CsvRow {
    pub fn new(index: usize, fields: Vec<CsvField>) -> Self {
        let mut positions = HashMap::with_capacity(fields.len());
        for (pos, field) in fields.iter().enumerate() {
            // First occurrence wins on duplicated headers
            positions.entry(field.name.clone()).or_insert(pos);
        }

        Self {
            index,
            fields,
            positions,
        }
    }

    /// Look up a cell by its header name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.positions
            .get(name)
            .and_then(|&pos| self.fields.get(pos))
            .map(|f| f.value.as_str())
    }

    /// 1-based line number in the source file, counting the header line
    pub fn line_number(&self) -> usize {
        self.index + 2
    }
}

/// Header row plus all data rows of a parsed file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedCsv {
    pub headers: Vec<String>,
    pub rows: Vec<CsvRow>,
}

impl ParsedCsv {
    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
