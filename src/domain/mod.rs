pub mod credential;
pub mod dataset;
pub mod equipment;
pub mod error;

// CSV ingestion module
pub mod csv;
