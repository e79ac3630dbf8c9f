use crate::domain::dataset::{Dataset, DatasetSummary};
use crate::domain::equipment::EquipmentRecord;
use crate::domain::error::{AppError, Result};
use crate::infrastructure::db::datasets::DatasetRepository;
use std::sync::Arc;

/// Read side: summaries, history and equipment lists.
pub struct DatasetQueryUseCase {
    repository: Arc<DatasetRepository>,
    history_limit: i64,
}

impl DatasetQueryUseCase {
    pub fn new(repository: Arc<DatasetRepository>, history_limit: i64) -> Self {
        Self {
            repository,
            history_limit,
        }
    }

    /// Summary of the given dataset, or of the latest one. An empty store
    /// yields zeroed statistics rather than an error.
    pub async fn summary(&self, dataset_id: Option<i64>) -> Result<DatasetSummary> {
        match self.resolve(dataset_id).await? {
            Some(dataset) => Ok(dataset.summary()),
            None => Ok(DatasetSummary::default()),
        }
    }

    pub async fn history(&self) -> Result<Vec<Dataset>> {
        self.repository.list_recent(self.history_limit).await
    }

    pub async fn equipment(&self, dataset_id: Option<i64>) -> Result<Vec<EquipmentRecord>> {
        match self.resolve(dataset_id).await? {
            Some(dataset) => self.repository.list_records(dataset.id).await,
            None => Ok(Vec::new()),
        }
    }

    async fn resolve(&self, dataset_id: Option<i64>) -> Result<Option<Dataset>> {
        match dataset_id {
            Some(id) => self
                .repository
                .get(id)
                .await?
                .map(Some)
                .ok_or_else(|| AppError::NotFound("Dataset not found".to_string())),
            None => self.repository.latest().await,
        }
    }
}
