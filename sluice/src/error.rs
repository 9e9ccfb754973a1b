use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Elasticsearch request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Schema probe failed for collection '{collection}': {reason}")]
    Probe { collection: String, reason: String },

    #[error("Index reset failed for '{index}': {reason}")]
    IndexReset { index: String, reason: String },

    #[error("Bulk write rejected for index '{index}': {reason}")]
    BulkRejected { index: String, reason: String },

    #[error("Document error at '{id}': {reason}")]
    Document { id: String, reason: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;
