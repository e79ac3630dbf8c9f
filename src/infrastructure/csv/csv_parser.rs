// ============================================================
// CSV PARSER
// ============================================================
// Decode uploaded bytes and parse them into header-keyed rows

use crate::domain::csv::{CsvField, CsvRow, ParsedCsv};
use crate::domain::error::AppError;
use csv::{ReaderBuilder, StringRecord, Trim};

/// CSV parser for in-memory uploads
pub struct CsvParser {
    /// Delimiter character (default: comma)
    delimiter: u8,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvParser {
    /// Create a new CSV parser with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode bytes as UTF-8, dropping a leading BOM
    pub fn decode_utf8(bytes: &[u8]) -> Result<String, AppError> {
        let (content, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(bytes);
        if had_errors {
            return Err(AppError::ParseError(
                "file is not valid UTF-8 text".to_string(),
            ));
        }
        Ok(content.into_owned())
    }

    /// Parse CSV content from string. Headers and cells are kept verbatim.
    pub fn parse_content(&self, content: &str) -> Result<ParsedCsv, AppError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(Trim::None)
            .flexible(false) // Ragged rows are malformed input
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| AppError::ParseError(format!("failed to read CSV headers: {}", e)))?
            .clone();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(AppError::ParseError(
                "no columns to parse from file".to_string(),
            ));
        }

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("failed to parse CSV row {}: {}", index + 1, e))
            })?;
            rows.push(Self::parse_row(index, &headers, &record));
        }

        Ok(ParsedCsv {
            headers: headers.iter().map(str::to_string).collect(),
            rows,
        })
    }

    /// Pair each cell with its header
    fn parse_row(index: usize, headers: &StringRecord, record: &StringRecord) -> CsvRow {
        let fields = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let value = record.get(idx).unwrap_or("").to_string();
                CsvField::new(header.to_string(), value)
            })
            .collect();

        CsvRow::new(index, fields)
    }
}
