pub mod connection;
pub mod datasets;

use crate::domain::dataset::{Dataset, NewDataset};
use crate::domain::equipment::NewEquipmentRecord;
use crate::domain::error::Result;
use async_trait::async_trait;

/// Source of transactional units of work over datasets and their records.
#[async_trait]
pub trait DatasetStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn DatasetUnitOfWork>>;
}

/// Operations composed inside one transaction. Nothing becomes visible to
/// readers until `commit`; dropping the unit of work discards it.
#[async_trait]
pub trait DatasetUnitOfWork: Send {
    async fn count_datasets(&mut self) -> Result<i64>;
    async fn oldest_dataset(&mut self) -> Result<Option<Dataset>>;
    async fn delete_dataset(&mut self, dataset_id: i64) -> Result<()>;
    async fn create_dataset(&mut self, dataset: &NewDataset) -> Result<Dataset>;
    async fn bulk_create_records(
        &mut self,
        dataset_id: i64,
        rows: &[NewEquipmentRecord],
    ) -> Result<u64>;
    async fn commit(self: Box<Self>) -> Result<()>;
}
