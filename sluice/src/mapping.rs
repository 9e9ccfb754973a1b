use serde_json::{json, Map, Value};

use crate::schema::{CollectionSchema, TypeTag};

/// Store identity fields that never get an explicit mapping entry
const RESERVED_FIELDS: [&str; 3] = ["_id", "__v", "id"];

/// Elasticsearch mapping for one target index
#[derive(Debug, Clone)]
pub struct IndexMapping {
    pub name: String,
    pub properties: Map<String, Value>,
}

/// Index name for a collection, optionally singularized ("users" -> "user")
pub fn index_name(collection: &str, singularize: bool) -> String {
    if singularize {
        pluralizer::pluralize(collection, 1, false)
    } else {
        collection.to_string()
    }
}

/// Index property descriptor for a resolved type. `None` omits the field
/// from the mapping and leaves it to the engine's dynamic inference.
fn property_for(tag: TypeTag) -> Option<Value> {
    match tag {
        TypeTag::String => Some(json!({
            "type": "text",
            "fields": {
                "keyword": { "type": "keyword", "ignore_above": 256 }
            }
        })),
        TypeTag::Number => Some(json!({ "type": "double" })),
        TypeTag::Boolean => Some(json!({ "type": "boolean" })),
        TypeTag::Date => Some(json!({ "type": "date" })),
        TypeTag::GeoPoint => Some(json!({ "type": "geo_point" })),
        TypeTag::Unknown => None,
    }
}

/// Compile a collection schema into an index mapping.
///
/// Elasticsearch has no array property type, so `is_array` does not change
/// the emitted descriptor.
pub fn compile_mapping(schema: &CollectionSchema, singularize: bool) -> IndexMapping {
    let mut properties = Map::new();
    for field in &schema.fields {
        if RESERVED_FIELDS.contains(&field.name.as_str()) {
            continue;
        }
        if let Some(property) = property_for(field.tag) {
            properties.insert(field.name.clone(), property);
        }
    }
    IndexMapping {
        name: index_name(&schema.collection, singularize),
        properties,
    }
}
