use std::sync::Arc;

use actix_web::web;
use tracing::{info, warn};

use crate::application::{DatasetQueryUseCase, EquipmentValidator, RetentionStore, UploadUseCase};
use crate::domain::error::Result;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::db::connection::init_db;
use crate::infrastructure::db::datasets::DatasetRepository;
use crate::interfaces::http::HttpState;

/// Open storage and wire the use cases behind the HTTP state.
pub async fn setup(config: &AppConfig) -> Result<web::Data<HttpState>> {
    let pool = init_db(&config.database_url, config.max_connections).await?;
    let repository = Arc::new(DatasetRepository::new(pool));

    let existing = repository.count().await?;
    info!(
        database_url = %config.database_url,
        existing,
        max_datasets = config.max_datasets,
        "Dataset store ready"
    );

    if config.api_tokens.is_empty() {
        warn!("No api_tokens configured; every authenticated route will answer 401");
    }

    let retention = Arc::new(RetentionStore::new(
        repository.clone(),
        config.max_datasets,
    ));

    Ok(web::Data::new(HttpState {
        upload_use_case: UploadUseCase::new(EquipmentValidator::default(), retention),
        query_use_case: DatasetQueryUseCase::new(repository, config.max_datasets),
        api_tokens: config.api_tokens.clone(),
    }))
}
