use crate::domain::dataset::{Dataset, ValidatedBatch};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::db::DatasetStore;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub const DEFAULT_MAX_DATASETS: i64 = 5;

/// Persists validated batches and keeps at most `capacity` datasets.
pub struct RetentionStore {
    store: Arc<dyn DatasetStore>,
    capacity: i64,
    // One writer at a time; readers rely on the transaction alone.
    write_lock: Mutex<()>,
}

impl RetentionStore {
    pub fn new(store: Arc<dyn DatasetStore>, capacity: i64) -> Self {
        Self {
            store,
            capacity,
            write_lock: Mutex::new(()),
        }
    }

    /// Evict the oldest dataset if at capacity, then insert the new one with
    /// all its records. Either the whole sequence commits or none of it does.
    pub async fn commit(&self, filename: &str, batch: ValidatedBatch) -> Result<Dataset> {
        let _guard = self.write_lock.lock().await;
        self.commit_locked(filename, batch)
            .await
            .map_err(into_persistence_error)
    }

    async fn commit_locked(&self, filename: &str, batch: ValidatedBatch) -> Result<Dataset> {
        let mut uow = self.store.begin().await?;

        let existing = uow.count_datasets().await?;
        // Exactly one eviction per upload, even when already above capacity
        if existing >= self.capacity {
            if let Some(oldest) = uow.oldest_dataset().await? {
                uow.delete_dataset(oldest.id).await?;
                info!(
                    dataset_id = oldest.id,
                    filename = %oldest.filename,
                    existing,
                    capacity = self.capacity,
                    "Evicting oldest dataset"
                );
            }
        }

        let (new_dataset, rows) = batch.into_new_dataset(filename.to_string(), chrono::Utc::now());
        let dataset = uow.create_dataset(&new_dataset).await?;
        let inserted = uow.bulk_create_records(dataset.id, &rows).await?;
        debug!(dataset_id = dataset.id, inserted, "Equipment records staged");

        uow.commit().await?;
        Ok(dataset)
    }
}

fn into_persistence_error(err: AppError) -> AppError {
    match err {
        AppError::DatabaseError(msg) => AppError::PersistenceError(msg),
        other => other,
    }
}
