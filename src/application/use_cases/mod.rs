pub mod dataset_query;
pub mod equipment_validator;
pub mod retention_store;
pub mod upload;
