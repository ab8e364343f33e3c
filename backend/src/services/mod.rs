pub mod analyzer;
pub mod dataset_registry;
pub mod export;
pub mod log_store;

pub use dataset_registry::{DatasetEntry, DatasetRegistry};
pub use export::ExportColumn;
pub use log_store::LogStore;
