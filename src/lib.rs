pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

pub use crate::error::StageError;
pub use crate::models::ObjectLocation;
pub use crate::services::fetcher::Fetcher;
pub use crate::services::pipeline::{StageOutcome, StageRequest, StagingPipeline};
pub use crate::services::storage::{ObjectStore, S3ObjectStore};
pub use crate::utils::validation::Expiration;
