// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// UTF-8 decoding and CSV parsing of uploaded files

mod csv_parser;

pub use csv_parser::CsvParser;
