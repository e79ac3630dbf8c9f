// ============================================================
// VALIDATION RULES
// ============================================================
// Column names and numeric bounds an equipment upload must satisfy

use serde::Serialize;

pub const COLUMN_NAME: &str = "Equipment Name";
pub const COLUMN_TYPE: &str = "Type";
pub const COLUMN_FLOWRATE: &str = "Flowrate";
pub const COLUMN_PRESSURE: &str = "Pressure";
pub const COLUMN_TEMPERATURE: &str = "Temperature";

/// Inclusive bounds for one numeric column
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangeRule {
    /// Column header the rule applies to
    pub field: &'static str,

    pub min: f64,

    pub max: f64,

    /// Unit shown in error messages
    pub unit: &'static str,
}

impl RangeRule {
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Rules applied to every uploaded equipment file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationRules {
    /// Columns that must be present (order irrelevant)
    pub required_columns: Vec<&'static str>,

    /// Flowrate in L/min (default: 10.5 - 500.0)
    pub flowrate: RangeRule,

    /// Pressure in bar (default: 1.0 - 150.0)
    pub pressure: RangeRule,

    /// Temperature in degrees Celsius (default: 20.0 - 350.0)
    pub temperature: RangeRule,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            required_columns: vec![
                COLUMN_NAME,
                COLUMN_TYPE,
                COLUMN_FLOWRATE,
                COLUMN_PRESSURE,
                COLUMN_TEMPERATURE,
            ],
            flowrate: RangeRule {
                field: COLUMN_FLOWRATE,
                min: 10.5,
                max: 500.0,
                unit: "L/min",
            },
            pressure: RangeRule {
                field: COLUMN_PRESSURE,
                min: 1.0,
                max: 150.0,
                unit: "bar",
            },
            temperature: RangeRule {
                field: COLUMN_TEMPERATURE,
                min: 20.0,
                max: 350.0,
                unit: "°C",
            },
        }
    }
}

impl ValidationRules {
    /// Range rules in the order they are checked
    pub fn ranges(&self) -> [&RangeRule; 3] {
        [&self.flowrate, &self.pressure, &self.temperature]
    }

    /// Validate rule values
    pub fn validate(&self) -> Result<(), String> {
        let slots = [
            (&self.flowrate, COLUMN_FLOWRATE),
            (&self.pressure, COLUMN_PRESSURE),
            (&self.temperature, COLUMN_TEMPERATURE),
        ];
        for (rule, column) in slots {
            if rule.field != column {
                return Err(format!(
                    "{} rule is bound to column '{}'",
                    column, rule.field
                ));
            }
        }

        for rule in self.ranges() {
            if !(rule.min.is_finite() && rule.max.is_finite()) {
                return Err(format!("{} bounds must be finite", rule.field));
            }
            if rule.min > rule.max {
                return Err(format!("{} min must be <= max", rule.field));
            }
        }
        if self.required_columns.is_empty() {
            return Err("required_columns must not be empty".to_string());
        }
        Ok(())
    }
}
