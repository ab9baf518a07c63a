use crate::framework::StoreError;
use crate::model::ValidationError;

/// Why a single order event was not ingested.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Invalid order: {0}")]
    Invalid(#[from] ValidationError),
    #[error("Failed to persist order: {0}")]
    Store(#[from] StoreError),
    #[error("Ingestion pipeline closed")]
    Closed,
}
