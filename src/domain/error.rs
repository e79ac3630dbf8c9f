use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::equipment::EquipmentType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppError {
    Internal(String),
    NotFound(String),
    ValidationError(String),
    Unauthorized(String),
    ParseError(String),
    SchemaError {
        missing: Vec<String>,
    },
    InvalidTypeError {
        values: Vec<String>,
    },
    RangeError {
        field: String,
        min: f64,
        max: f64,
        unit: String,
        value: f64,
    },
    PersistenceError(String),
    DatabaseError(String),
    ConfigError(String),
}

impl AppError {
    /// Validation-family errors are the caller's fault and never reach storage.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AppError::ValidationError(_)
                | AppError::ParseError(_)
                | AppError::SchemaError { .. }
                | AppError::InvalidTypeError { .. }
                | AppError::RangeError { .. }
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::NotFound(msg) => write!(f, "{}", msg),
            AppError::ValidationError(msg) => write!(f, "{}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::ParseError(msg) => write!(f, "Error parsing CSV: {}", msg),
            AppError::SchemaError { missing } => {
                write!(f, "Missing required columns: {}", missing.join(", "))
            }
            AppError::InvalidTypeError { values } => {
                let valid: Vec<&str> = EquipmentType::ALL.iter().map(|t| t.label()).collect();
                write!(
                    f,
                    "Invalid equipment types: {}. Valid base types: {}",
                    values.join(", "),
                    valid.join(", ")
                )
            }
            AppError::RangeError {
                field,
                min,
                max,
                unit,
                ..
            } => write!(
                f,
                "{} values must be between {:.1} and {:.1} {}",
                field, min, max, unit
            ),
            AppError::PersistenceError(msg) => write!(f, "Upload failed: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

pub type Result<T> = std::result::Result<T, AppError>;
