// ============================================================
// EQUIPMENT VALIDATOR USE CASE
// ============================================================
// Parse, check and normalize an uploaded equipment CSV, then aggregate it

use crate::domain::csv::{
    CsvRow, ParsedCsv, RangeRule, ValidationRules, COLUMN_FLOWRATE, COLUMN_NAME,
    COLUMN_PRESSURE, COLUMN_TEMPERATURE, COLUMN_TYPE,
};
use crate::domain::dataset::{TypeDistribution, ValidatedBatch};
use crate::domain::equipment::{EquipmentType, NewEquipmentRecord};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::csv::CsvParser;

/// Pure validation pipeline; holds no state beyond its rules.
pub struct EquipmentValidator {
    rules: ValidationRules,
    parser: CsvParser,
}

impl Default for EquipmentValidator {
    fn default() -> Self {
        Self::new(ValidationRules::default())
    }
}

impl EquipmentValidator {
    pub fn new(rules: ValidationRules) -> Self {
        Self {
            rules,
            parser: CsvParser::new(),
        }
    }

    /// Decode raw upload bytes and validate them
    pub fn validate_bytes(&self, bytes: &[u8]) -> Result<ValidatedBatch> {
        let content = CsvParser::decode_utf8(bytes)?;
        self.validate(&content)
    }

    /// Run every check in order, stopping at the first failing step
    pub fn validate(&self, content: &str) -> Result<ValidatedBatch> {
        self.rules
            .validate()
            .map_err(|e| AppError::Internal(format!("Invalid validation rules: {}", e)))?;

        let parsed = self.parser.parse_content(content)?;

        self.check_columns(&parsed)?;

        if parsed.is_empty() {
            return Err(AppError::ParseError("file contains no data rows".to_string()));
        }

        let types = self.normalize_types(&parsed.rows)?;

        let readings = parsed
            .rows
            .iter()
            .map(Reading::from_row)
            .collect::<Result<Vec<_>>>()?;

        self.check_ranges(&readings)?;

        Ok(Self::aggregate(&parsed.rows, types, readings))
    }

    fn check_columns(&self, parsed: &ParsedCsv) -> Result<()> {
        let missing: Vec<String> = self
            .rules
            .required_columns
            .iter()
            .filter(|column| !parsed.has_column(column))
            .map(|column| column.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::SchemaError { missing })
        }
    }

    /// Every distinct unrecognized raw value is reported, in first-seen order.
    fn normalize_types(&self, rows: &[CsvRow]) -> Result<Vec<EquipmentType>> {
        let mut types = Vec::with_capacity(rows.len());
        let mut invalid: Vec<String> = Vec::new();

        for row in rows {
            let raw = row.get(COLUMN_TYPE).unwrap_or("");
            match EquipmentType::normalize(raw) {
                Some(base) => types.push(base),
                None => {
                    if !invalid.iter().any(|v| v == raw) {
                        invalid.push(raw.to_string());
                    }
                }
            }
        }

        if invalid.is_empty() {
            Ok(types)
        } else {
            Err(AppError::InvalidTypeError { values: invalid })
        }
    }

    fn check_ranges(&self, readings: &[Reading]) -> Result<()> {
        for rule in self.rules.ranges() {
            let mut offending = None;
            for reading in readings {
                let value = reading.value_for(rule).ok_or_else(|| {
                    AppError::Internal(format!("No column reading for range rule '{}'", rule.field))
                })?;
                if !rule.contains(value) {
                    offending = Some(value);
                    break;
                }
            }

            if let Some(value) = offending {
                return Err(AppError::RangeError {
                    field: rule.field.to_string(),
                    min: rule.min,
                    max: rule.max,
                    unit: rule.unit.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }

    /// Records carry the normalized type; the distribution counts raw labels.
    fn aggregate(
        rows: &[CsvRow],
        types: Vec<EquipmentType>,
        readings: Vec<Reading>,
    ) -> ValidatedBatch {
        let count = readings.len() as f64;
        let mean = |pick: fn(&Reading) -> f64| readings.iter().map(pick).sum::<f64>() / count;

        let avg_flowrate = mean(|r| r.flowrate);
        let avg_pressure = mean(|r| r.pressure);
        let avg_temperature = mean(|r| r.temperature);

        let mut type_distribution = TypeDistribution::new();
        for row in rows {
            let raw = row.get(COLUMN_TYPE).unwrap_or("").to_string();
            *type_distribution.entry(raw).or_insert(0) += 1;
        }

        let records = rows
            .iter()
            .zip(types)
            .zip(readings)
            .map(|((row, equipment_type), reading)| NewEquipmentRecord {
                equipment_name: row.get(COLUMN_NAME).unwrap_or("").to_string(),
                equipment_type,
                flowrate: reading.flowrate,
                pressure: reading.pressure,
                temperature: reading.temperature,
            })
            .collect::<Vec<_>>();

        ValidatedBatch {
            total_count: records.len() as i64,
            rows: records,
            avg_flowrate,
            avg_pressure,
            avg_temperature,
            type_distribution,
        }
    }
}

/// Numeric cells of one row
#[derive(Debug, Clone, Copy)]
struct Reading {
    flowrate: f64,
    pressure: f64,
    temperature: f64,
}

impl Reading {
    fn from_row(row: &CsvRow) -> Result<Self> {
        Ok(Self {
            flowrate: parse_number(row, COLUMN_FLOWRATE)?,
            pressure: parse_number(row, COLUMN_PRESSURE)?,
            temperature: parse_number(row, COLUMN_TEMPERATURE)?,
        })
    }

    fn value_for(&self, rule: &RangeRule) -> Option<f64> {
        match rule.field {
            COLUMN_FLOWRATE => Some(self.flowrate),
            COLUMN_PRESSURE => Some(self.pressure),
            COLUMN_TEMPERATURE => Some(self.temperature),
            _ => None,
        }
    }
}

fn parse_number(row: &CsvRow, column: &str) -> Result<f64> {
    let raw = row.get(column).unwrap_or("").trim();
    if raw.is_empty() {
        return Err(AppError::ParseError(format!(
            "line {}: '{}' is empty",
            row.line_number(),
            column
        )));
    }

    let value: f64 = raw.parse().map_err(|_| {
        AppError::ParseError(format!(
            "line {}: '{}' value '{}' is not a number",
            row.line_number(),
            column,
            raw
        ))
    })?;

    if !value.is_finite() {
        return Err(AppError::ParseError(format!(
            "line {}: '{}' value '{}' is not a finite number",
            row.line_number(),
            column,
            raw
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Equipment Name,Type,Flowrate,Pressure,Temperature";

    fn csv(rows: &[&str]) -> String {
        let mut content = HEADER.to_string();
        for row in rows {
            content.push('\n');
            content.push_str(row);
        }
        content
    }

    fn validate(content: &str) -> Result<ValidatedBatch> {
        EquipmentValidator::default().validate(content)
    }

    #[test]
    fn test_valid_batch_aggregates() {
        let batch = validate(&csv(&[
            "P-1,Pump-A2,100.0,5.0,60.0",
            "R-1,Reactor,200.0,15.0,150.0",
            "P-2,Pump-A2,30.0,10.0,90.0",
        ]))
        .unwrap();

        assert_eq!(batch.total_count, 3);
        assert!((batch.avg_flowrate - 110.0).abs() < 1e-9);
        assert!((batch.avg_pressure - 10.0).abs() < 1e-9);
        assert!((batch.avg_temperature - 100.0).abs() < 1e-9);
        assert_eq!(batch.type_distribution.get("Pump-A2"), Some(&2));
        assert_eq!(batch.type_distribution.get("Reactor"), Some(&1));
        assert_eq!(
            batch.type_distribution.values().sum::<i64>(),
            batch.total_count
        );
    }

    #[test]
    fn test_records_use_normalized_type_but_distribution_keeps_raw_label() {
        let batch = validate(&csv(&[
            "HX-1,HeatExchanger-3,50,5,100",
            "HX-2,Heat Exchanger Unit,50,5,100",
            "P-1,Pump-A2,50,5,100",
        ]))
        .unwrap();

        let types: Vec<EquipmentType> = batch.rows.iter().map(|r| r.equipment_type).collect();
        assert_eq!(
            types,
            vec![
                EquipmentType::HeatExchangerLegacy,
                EquipmentType::HeatExchanger,
                EquipmentType::Pump
            ]
        );
        assert!(batch.type_distribution.contains_key("HeatExchanger-3"));
        assert!(batch.type_distribution.contains_key("Heat Exchanger Unit"));
        assert!(!batch.type_distribution.contains_key("Pump"));
        assert_eq!(batch.rows[0].equipment_name, "HX-1");
    }

    #[test]
    fn test_column_order_is_irrelevant() {
        let content = "Temperature,Type,Pressure,Equipment Name,Flowrate\n80,Valve,2,V-1,20";
        let batch = validate(content).unwrap();
        assert_eq!(batch.rows[0].equipment_type, EquipmentType::Valve);
        assert_eq!(batch.rows[0].flowrate, 20.0);
        assert_eq!(batch.rows[0].temperature, 80.0);
    }

    #[test]
    fn test_missing_columns_are_listed() {
        let err = validate("Equipment Name,Type,Flowrate\nP-1,Pump,20").unwrap_err();
        assert_eq!(
            err,
            AppError::SchemaError {
                missing: vec!["Pressure".to_string(), "Temperature".to_string()]
            }
        );
    }

    #[test]
    fn test_unknown_types_are_all_reported_once() {
        let err = validate(&csv(&[
            "M-1,Mixer,20,2,30",
            "P-1,Pump,20,2,30",
            "T-1,Tank,20,2,30",
            "M-2,Mixer,20,2,30",
        ]))
        .unwrap_err();

        assert_eq!(
            err,
            AppError::InvalidTypeError {
                values: vec!["Mixer".to_string(), "Tank".to_string()]
            }
        );
    }

    #[test]
    fn test_flowrate_below_minimum_rejects_batch() {
        let err = validate(&csv(&["P-1,Pump,100,5,60", "P-2,Pump,9.9,5,60"])).unwrap_err();
        match &err {
            AppError::RangeError {
                field, min, value, ..
            } => {
                assert_eq!(field, "Flowrate");
                assert_eq!(*min, 10.5);
                assert_eq!(*value, 9.9);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let msg = err.to_string();
        assert!(msg.contains("Flowrate"));
        assert!(msg.contains("10.5"));
    }

    #[test]
    fn test_range_checks_run_in_field_order() {
        // Both pressure and temperature are out of range; pressure is checked first
        let err = validate(&csv(&["P-1,Pump,100,151,10"])).unwrap_err();
        assert!(matches!(err, AppError::RangeError { ref field, .. } if field == "Pressure"));

        let err = validate(&csv(&["P-1,Pump,100,5,350.1"])).unwrap_err();
        assert!(matches!(err, AppError::RangeError { ref field, .. } if field == "Temperature"));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let batch = validate(&csv(&["P-1,Pump,10.5,1.0,20.0", "P-2,Pump,500.0,150.0,350.0"]));
        assert!(batch.is_ok());
    }

    #[test]
    fn test_invalid_type_is_reported_before_ranges() {
        let err = validate(&csv(&["M-1,Mixer,1,1,1"])).unwrap_err();
        assert!(matches!(err, AppError::InvalidTypeError { .. }));
    }

    #[test]
    fn test_non_numeric_and_non_finite_values_are_parse_errors() {
        let err = validate(&csv(&["P-1,Pump,fast,5,60"])).unwrap_err();
        assert!(matches!(err, AppError::ParseError(ref m) if m.contains("Flowrate")));

        let err = validate(&csv(&["P-1,Pump,NaN,5,60"])).unwrap_err();
        assert!(matches!(err, AppError::ParseError(_)));

        let err = validate(&csv(&["P-1,Pump,100,,60"])).unwrap_err();
        assert!(matches!(err, AppError::ParseError(ref m) if m.contains("Pressure")));
    }

    #[test]
    fn test_padded_type_is_not_a_recognized_label() {
        let err = validate(&csv(&["P-1, Pump-A2 ,50,5,100"])).unwrap_err();
        assert_eq!(
            err,
            AppError::InvalidTypeError {
                values: vec![" Pump-A2 ".to_string()]
            }
        );
    }

    #[test]
    fn test_padded_header_does_not_satisfy_column_check() {
        let content = "Equipment Name, Type ,Flowrate,Pressure,Temperature\nP-1,Pump,50,5,100";
        let err = validate(content).unwrap_err();
        assert_eq!(
            err,
            AppError::SchemaError {
                missing: vec!["Type".to_string()]
            }
        );
    }

    #[test]
    fn test_distribution_keys_are_verbatim_and_numbers_tolerate_padding() {
        let batch = validate(&csv(&["P-1,Pump-A2 , 50 , 5 , 100 "])).unwrap();
        assert_eq!(batch.type_distribution.get("Pump-A2 "), Some(&1));
        assert!(!batch.type_distribution.contains_key("Pump-A2"));
        assert_eq!(batch.rows[0].flowrate, 50.0);
    }

    #[test]
    fn test_rule_bound_to_unknown_column_is_refused() {
        let mut rules = ValidationRules::default();
        rules.temperature.field = "Temp";
        let err = EquipmentValidator::new(rules)
            .validate(&csv(&["P-1,Pump,50,5,100"]))
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(ref m) if m.contains("Temp")));
    }

    #[test]
    fn test_header_only_file_is_rejected() {
        let err = validate(HEADER).unwrap_err();
        assert!(matches!(err, AppError::ParseError(_)));
    }

    #[test]
    fn test_validate_bytes_rejects_invalid_utf8() {
        let mut bytes = csv(&["P-1,Pump,100,5,60"]).into_bytes();
        bytes.push(0xFF);
        let err = EquipmentValidator::default()
            .validate_bytes(&bytes)
            .unwrap_err();
        assert!(matches!(err, AppError::ParseError(_)));
    }
}
