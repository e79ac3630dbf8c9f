use crate::domain::dataset::{Dataset, NewDataset, TypeDistribution};
use crate::domain::equipment::{EquipmentRecord, EquipmentType, NewEquipmentRecord};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::db::{DatasetStore, DatasetUnitOfWork};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use sqlx::{Sqlite, Transaction};

const DATASET_COLUMNS: &str = "id, filename, upload_timestamp, total_count, avg_flowrate, avg_pressure, avg_temperature, type_distribution";

const RECORD_COLUMNS: &str =
    "id, dataset_id, equipment_name, equipment_type, flowrate, pressure, temperature, created_at";

pub struct DatasetRepository {
    pool: SqlitePool,
}

impl DatasetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM datasets")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to count datasets: {e}")))
    }

    /// Newest first, ties broken by the most recent insertion.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<Dataset>> {
        let entities = sqlx::query_as::<_, DatasetEntity>(&format!(
            "SELECT {DATASET_COLUMNS} FROM datasets ORDER BY upload_timestamp DESC, id DESC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list datasets: {e}")))?;

        entities.into_iter().map(Dataset::try_from).collect()
    }

    pub async fn get(&self, dataset_id: i64) -> Result<Option<Dataset>> {
        let entity = sqlx::query_as::<_, DatasetEntity>(&format!(
            "SELECT {DATASET_COLUMNS} FROM datasets WHERE id = ?"
        ))
        .bind(dataset_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch dataset: {e}")))?;

        entity.map(Dataset::try_from).transpose()
    }

    pub async fn latest(&self) -> Result<Option<Dataset>> {
        Ok(self.list_recent(1).await?.into_iter().next())
    }

    pub async fn list_records(&self, dataset_id: i64) -> Result<Vec<EquipmentRecord>> {
        let entities = sqlx::query_as::<_, EquipmentRecordEntity>(&format!(
            "SELECT {RECORD_COLUMNS} FROM equipment_records WHERE dataset_id = ? ORDER BY id ASC"
        ))
        .bind(dataset_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list equipment records: {e}")))?;

        entities.into_iter().map(EquipmentRecord::try_from).collect()
    }
}

#[async_trait]
impl DatasetStore for DatasetRepository {
    async fn begin(&self) -> Result<Box<dyn DatasetUnitOfWork>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::PersistenceError(format!("Failed to begin transaction: {e}")))?;

        Ok(Box::new(SqliteUnitOfWork { tx }))
    }
}

/// Open transaction; dropping it without `commit` rolls everything back.
pub struct SqliteUnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl DatasetUnitOfWork for SqliteUnitOfWork {
    async fn count_datasets(&mut self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM datasets")
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| AppError::PersistenceError(format!("Failed to count datasets: {e}")))
    }

    async fn oldest_dataset(&mut self) -> Result<Option<Dataset>> {
        let entity = sqlx::query_as::<_, DatasetEntity>(&format!(
            "SELECT {DATASET_COLUMNS} FROM datasets ORDER BY upload_timestamp ASC, id ASC LIMIT 1"
        ))
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| AppError::PersistenceError(format!("Failed to fetch oldest dataset: {e}")))?;

        entity.map(Dataset::try_from).transpose()
    }

    async fn delete_dataset(&mut self, dataset_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM equipment_records WHERE dataset_id = ?")
            .bind(dataset_id)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| {
                AppError::PersistenceError(format!("Failed to delete equipment records: {e}"))
            })?;

        let result = sqlx::query("DELETE FROM datasets WHERE id = ?")
            .bind(dataset_id)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| AppError::PersistenceError(format!("Failed to delete dataset: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::PersistenceError(format!(
                "Dataset {} vanished during eviction",
                dataset_id
            )));
        }
        Ok(())
    }

    async fn create_dataset(&mut self, dataset: &NewDataset) -> Result<Dataset> {
        let distribution = serde_json::to_string(&dataset.type_distribution).map_err(|e| {
            AppError::PersistenceError(format!("Failed to encode type distribution: {e}"))
        })?;

        let result = sqlx::query(
            "INSERT INTO datasets (filename, upload_timestamp, total_count, avg_flowrate, avg_pressure, avg_temperature, type_distribution)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&dataset.filename)
        .bind(dataset.upload_timestamp.timestamp_millis())
        .bind(dataset.total_count)
        .bind(dataset.avg_flowrate)
        .bind(dataset.avg_pressure)
        .bind(dataset.avg_temperature)
        .bind(distribution)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| AppError::PersistenceError(format!("Failed to insert dataset: {e}")))?;

        Ok(Dataset {
            id: result.last_insert_rowid(),
            filename: dataset.filename.clone(),
            upload_timestamp: dataset.upload_timestamp,
            total_count: dataset.total_count,
            avg_flowrate: dataset.avg_flowrate,
            avg_pressure: dataset.avg_pressure,
            avg_temperature: dataset.avg_temperature,
            type_distribution: dataset.type_distribution.clone(),
        })
    }

    async fn bulk_create_records(
        &mut self,
        dataset_id: i64,
        rows: &[NewEquipmentRecord],
    ) -> Result<u64> {
        let created_at = chrono::Utc::now().timestamp_millis();
        let mut affected: u64 = 0;

        for row in rows {
            let res = sqlx::query(
                "INSERT INTO equipment_records (dataset_id, equipment_name, equipment_type, flowrate, pressure, temperature, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(dataset_id)
            .bind(&row.equipment_name)
            .bind(row.equipment_type.label())
            .bind(row.flowrate)
            .bind(row.pressure)
            .bind(row.temperature)
            .bind(created_at)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| {
                AppError::PersistenceError(format!("Failed to insert equipment record: {e}"))
            })?;
            affected += res.rows_affected();
        }

        Ok(affected)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| AppError::PersistenceError(format!("Failed to commit transaction: {e}")))
    }
}

fn millis_to_utc(millis: i64) -> Result<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| AppError::DatabaseError(format!("Invalid stored timestamp: {millis}")))
}

// Internal entities for database mapping
#[derive(sqlx::FromRow)]
struct DatasetEntity {
    id: i64,
    filename: String,
    upload_timestamp: i64,
    total_count: i64,
    avg_flowrate: f64,
    avg_pressure: f64,
    avg_temperature: f64,
    type_distribution: String,
}

impl TryFrom<DatasetEntity> for Dataset {
    type Error = AppError;

    fn try_from(e: DatasetEntity) -> Result<Self> {
        let type_distribution: TypeDistribution = serde_json::from_str(&e.type_distribution)
            .map_err(|err| {
                AppError::DatabaseError(format!(
                    "Corrupt type distribution for dataset {}: {err}",
                    e.id
                ))
            })?;

        Ok(Self {
            id: e.id,
            filename: e.filename,
            upload_timestamp: millis_to_utc(e.upload_timestamp)?,
            total_count: e.total_count,
            avg_flowrate: e.avg_flowrate,
            avg_pressure: e.avg_pressure,
            avg_temperature: e.avg_temperature,
            type_distribution,
        })
    }
}

#[derive(sqlx::FromRow)]
struct EquipmentRecordEntity {
    id: i64,
    dataset_id: i64,
    equipment_name: String,
    equipment_type: String,
    flowrate: f64,
    pressure: f64,
    temperature: f64,
    created_at: i64,
}

impl TryFrom<EquipmentRecordEntity> for EquipmentRecord {
    type Error = AppError;

    fn try_from(e: EquipmentRecordEntity) -> Result<Self> {
        let equipment_type = EquipmentType::from_label(&e.equipment_type).ok_or_else(|| {
            AppError::DatabaseError(format!(
                "Unknown equipment type stored for record {}: {}",
                e.id, e.equipment_type
            ))
        })?;

        Ok(Self {
            id: e.id,
            dataset_id: e.dataset_id,
            equipment_name: e.equipment_name,
            equipment_type,
            flowrate: e.flowrate,
            pressure: e.pressure,
            temperature: e.temperature,
            created_at: millis_to_utc(e.created_at)?,
        })
    }
}
