use async_trait::async_trait;
use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::{Client, Database};
use tracing::debug;

use super::traits::DocumentStore;
use crate::error::{Result, SyncError};
use crate::schema::{observe_documents, FieldObservation};

/// Source store backed by one shared MongoDB database handle
pub struct MongoStore {
    db: Database,
    sample_size: usize,
}

impl MongoStore {
    /// Connect with a URI that names the database to sync, e.g.
    /// `mongodb://localhost:27017/mydb`
    pub async fn connect(uri: &str, sample_size: usize) -> Result<Self> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.default_database().ok_or_else(|| {
            SyncError::Other(format!("MongoDB URI '{}' does not name a database", uri))
        })?;
        Ok(Self { db, sample_size })
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn collection_names(&self) -> Result<Vec<String>> {
        let mut names = self.db.list_collection_names().await?;
        names.retain(|name| !name.starts_with("system."));
        Ok(names)
    }

    async fn probe(&self, collection: &str) -> Result<Vec<FieldObservation>> {
        let sample: Vec<Document> = self
            .db
            .collection::<Document>(collection)
            .find(doc! {})
            .limit(self.sample_size as i64)
            .await
            .map_err(|e| SyncError::Probe {
                collection: collection.to_string(),
                reason: e.to_string(),
            })?
            .try_collect()
            .await
            .map_err(|e| SyncError::Probe {
                collection: collection.to_string(),
                reason: e.to_string(),
            })?;

        debug!("probed '{}' from {} sampled documents", collection, sample.len());
        Ok(observe_documents(&sample))
    }

    async fn fetch_all(&self, collection: &str) -> Result<Vec<Document>> {
        // Full in-memory load; streaming batches are the known scaling limit
        let documents = self
            .db
            .collection::<Document>(collection)
            .find(doc! {})
            .await?
            .try_collect()
            .await?;
        Ok(documents)
    }

    async fn estimated_count(&self, collection: &str) -> Result<u64> {
        Ok(self
            .db
            .collection::<Document>(collection)
            .estimated_document_count()
            .await?)
    }
}
