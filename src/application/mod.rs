pub mod use_cases;

pub use use_cases::dataset_query::DatasetQueryUseCase;
pub use use_cases::equipment_validator::EquipmentValidator;
pub use use_cases::retention_store::RetentionStore;
pub use use_cases::upload::UploadUseCase;
