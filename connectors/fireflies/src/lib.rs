pub mod client;
pub mod config;
pub mod delete;
pub mod manager;
pub mod manifest;
pub mod models;
pub mod storage;

pub use client::{FirefliesClient, FirefliesError, TranscriptDeleter};
pub use config::{ConfigError, FirefliesConfig};
pub use delete::{DeleteEngine, DeleteSummary, DeletionOutcome, DeletionReport, SkipReason};
pub use manager::TranscriptManager;
pub use manifest::{load_manifest, Manifest, ManifestEntry, ManifestError};
