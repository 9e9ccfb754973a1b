use async_trait::async_trait;
use bson::Document;

use crate::schema::FieldObservation;
use crate::Result;

/// Trait for source document stores
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Names of the collections to sync
    async fn collection_names(&self) -> Result<Vec<String>>;

    /// Field observations from a representative document sample
    async fn probe(&self, collection: &str) -> Result<Vec<FieldObservation>>;

    /// Load the full collection
    async fn fetch_all(&self, collection: &str) -> Result<Vec<Document>>;

    /// Estimated document count, for progress reporting only
    async fn estimated_count(&self, collection: &str) -> Result<u64>;
}
