use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::equipment::NewEquipmentRecord;

/// Raw `Type` label -> number of rows carrying it.
pub type TypeDistribution = BTreeMap<String, i64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: i64,
    pub filename: String,
    pub upload_timestamp: chrono::DateTime<chrono::Utc>,
    pub total_count: i64,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
    pub type_distribution: TypeDistribution,
}

impl Dataset {
    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            total_count: self.total_count,
            avg_flowrate: self.avg_flowrate,
            avg_pressure: self.avg_pressure,
            avg_temperature: self.avg_temperature,
            type_distribution: self.type_distribution.clone(),
        }
    }
}

/// Fields needed to create a dataset row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDataset {
    pub filename: String,
    pub upload_timestamp: chrono::DateTime<chrono::Utc>,
    pub total_count: i64,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
    pub type_distribution: TypeDistribution,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub total_count: i64,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
    pub type_distribution: TypeDistribution,
}

/// Output of validation: normalized rows plus the aggregates computed over them.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedBatch {
    pub rows: Vec<NewEquipmentRecord>,
    pub total_count: i64,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
    pub type_distribution: TypeDistribution,
}

impl ValidatedBatch {
    pub fn into_new_dataset(
        self,
        filename: String,
        upload_timestamp: chrono::DateTime<chrono::Utc>,
    ) -> (NewDataset, Vec<NewEquipmentRecord>) {
        let dataset = NewDataset {
            filename,
            upload_timestamp,
            total_count: self.total_count,
            avg_flowrate: self.avg_flowrate,
            avg_pressure: self.avg_pressure,
            avg_temperature: self.avg_temperature,
            type_distribution: self.type_distribution,
        };
        (dataset, self.rows)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub message: String,
    pub dataset_id: i64,
    pub summary: DatasetSummary,
}
