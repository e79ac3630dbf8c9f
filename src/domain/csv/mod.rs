// ============================================================
// CSV DOMAIN LAYER
// ============================================================
// Core types and value objects for equipment CSV ingestion
// No I/O, no async, no external dependencies

mod csv_row;
mod validation_rules;

pub use csv_row::{CsvField, CsvRow, ParsedCsv};
pub use validation_rules::{
    RangeRule, ValidationRules, COLUMN_FLOWRATE, COLUMN_NAME, COLUMN_PRESSURE,
    COLUMN_TEMPERATURE, COLUMN_TYPE,
};
