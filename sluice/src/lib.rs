//! sluice: copy MongoDB collections into Elasticsearch indexes
//!
//! Per collection the pipeline probes a document sample, resolves a field
//! schema by majority type, compiles an index mapping, destructively resets
//! the target index, then normalizes and bulk-loads every document.

pub mod error;
pub mod mapping;
pub mod normalize;
pub mod progress;
pub mod schema;
pub mod stores;
pub mod sync;

pub use error::{Result, SyncError};
pub use mapping::{compile_mapping, IndexMapping};
pub use schema::{
    compile_schema, CollectionSchema, FieldObservation, ResolvedField, TypeObservation, TypeTag,
};
pub use stores::{BulkOp, DocumentStore, ElasticClient, MongoStore};
pub use sync::{SyncOptions, SyncReport, SyncRunner};
