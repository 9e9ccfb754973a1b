use tracing::info;

use crate::error::Result;
use crate::mapping::{compile_mapping, IndexMapping};
use crate::normalize::{document_id, normalize, to_json};
use crate::progress::CollectionProgress;
use crate::schema::{compile_schema, CollectionSchema};
use crate::stores::{BulkOp, DocumentStore, ElasticClient};

/// Run-wide options
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Name indexes with the singular form of the collection name
    pub singularize: bool,
    /// Suppress progress bars (tests, non-tty output)
    pub quiet: bool,
}

/// What one run accomplished, per collection
#[derive(Debug, Default)]
pub struct SyncReport {
    pub collections: Vec<CollectionReport>,
}

#[derive(Debug)]
pub struct CollectionReport {
    pub collection: String,
    pub index: String,
    pub documents: usize,
}

/// Drives the full resync over the two shared handles: probe every
/// collection, compile every schema and mapping up front, then per
/// collection reset the index and bulk-load the normalized documents.
///
/// Fail-fast throughout: the first error aborts the run, and an index reset
/// interrupted between delete and create leaves the index absent.
pub struct SyncRunner<'a> {
    store: &'a dyn DocumentStore,
    search: &'a ElasticClient,
    options: SyncOptions,
}

impl<'a> SyncRunner<'a> {
    pub fn new(
        store: &'a dyn DocumentStore,
        search: &'a ElasticClient,
        options: SyncOptions,
    ) -> Self {
        Self {
            store,
            search,
            options,
        }
    }

    pub async fn run(&self) -> Result<SyncReport> {
        let collections = self.store.collection_names().await?;
        info!("discovered {} collections", collections.len());

        // Every schema, then every mapping, before any index is touched
        let mut schemas = Vec::with_capacity(collections.len());
        for collection in &collections {
            let observations = self.store.probe(collection).await?;
            schemas.push(compile_schema(collection, &observations));
        }
        let mappings: Vec<IndexMapping> = schemas
            .iter()
            .map(|schema| compile_mapping(schema, self.options.singularize))
            .collect();

        let mut report = SyncReport::default();
        for (schema, mapping) in schemas.iter().zip(&mappings) {
            let documents = self.sync_collection(schema, mapping).await?;
            report.collections.push(CollectionReport {
                collection: schema.collection.clone(),
                index: mapping.name.clone(),
                documents,
            });
        }
        Ok(report)
    }

    async fn sync_collection(
        &self,
        schema: &CollectionSchema,
        mapping: &IndexMapping,
    ) -> Result<usize> {
        info!("syncing '{}' into index '{}'", schema.collection, mapping.name);

        self.reset_index(mapping).await?;

        // Estimated count is informational only; a miss falls back to zero
        let estimated = self
            .store
            .estimated_count(&schema.collection)
            .await
            .unwrap_or(0);
        let progress = CollectionProgress::new(&mapping.name, estimated, self.options.quiet);

        let documents = self.store.fetch_all(&schema.collection).await?;

        let mut ops = Vec::with_capacity(documents.len());
        for document in &documents {
            let id = document_id(document)?;
            ops.push(BulkOp {
                index: mapping.name.clone(),
                id,
                document: to_json(normalize(document)),
            });
            progress.inc(1);
        }

        if ops.is_empty() {
            progress.finish();
            info!("'{}' is empty, nothing to write", schema.collection);
            return Ok(0);
        }

        self.search.bulk(&mapping.name, &ops).await?;
        progress.finish();
        info!("wrote {} documents to '{}'", ops.len(), mapping.name);
        Ok(ops.len())
    }

    /// Destructive and non-transactional: delete before create means an
    /// interruption in between leaves the index absent
    async fn reset_index(&self, mapping: &IndexMapping) -> Result<()> {
        if self.search.index_exists(&mapping.name).await? {
            self.search.delete_index(&mapping.name).await?;
        }
        self.search.create_index(&mapping.name).await?;
        self.search.put_mapping(&mapping.name, &mapping.properties).await?;
        Ok(())
    }
}
