pub mod probe;
pub mod resolve;
pub mod types;

pub use probe::observe_documents;
pub use resolve::compile_schema;
pub use types::{CollectionSchema, FieldObservation, ResolvedField, TypeObservation, TypeTag};
