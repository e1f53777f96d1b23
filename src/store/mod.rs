pub mod dataset_store;
pub mod error;
pub mod schema;
