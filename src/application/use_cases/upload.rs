use crate::application::use_cases::equipment_validator::EquipmentValidator;
use crate::application::use_cases::retention_store::RetentionStore;
use crate::domain::dataset::UploadOutcome;
use crate::domain::error::{AppError, Result};
use std::sync::Arc;
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

const CSV_EXTENSION: &str = ".csv";

pub struct UploadUseCase {
    validator: EquipmentValidator,
    retention: Arc<RetentionStore>,
}

impl UploadUseCase {
    pub fn new(validator: EquipmentValidator, retention: Arc<RetentionStore>) -> Self {
        Self {
            validator,
            retention,
        }
    }

    /// Validate an uploaded file and store it as a new dataset.
    pub async fn execute(&self, filename: &str, bytes: &[u8]) -> Result<UploadOutcome> {
        let span = tracing::info_span!(
            "upload",
            upload_id = %Uuid::new_v4(),
            filename = %filename,
            size = bytes.len()
        );

        async {
            let result = self.run(filename, bytes).await;
            match &result {
                Ok(outcome) => info!(
                    dataset_id = outcome.dataset_id,
                    total_count = outcome.summary.total_count,
                    "Upload stored"
                ),
                Err(e) if e.is_rejection() => warn!(error = %e, "Upload rejected"),
                Err(e) => error!(error = %e, "Upload failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run(&self, filename: &str, bytes: &[u8]) -> Result<UploadOutcome> {
        if !filename.ends_with(CSV_EXTENSION) {
            return Err(AppError::ValidationError("File must be a CSV".to_string()));
        }

        let batch = self.validator.validate_bytes(bytes)?;
        let dataset = self.retention.commit(filename, batch).await?;

        Ok(UploadOutcome {
            message: "Upload successful".to_string(),
            dataset_id: dataset.id,
            summary: dataset.summary(),
        })
    }
}
