use bson::{Bson, Document};
use chrono::SecondsFormat;

use crate::error::{Result, SyncError};

/// Identity and versioning keys stripped from the top level of every document
const STRIPPED_FIELDS: [&str; 2] = ["_id", "__v"];

/// Rewrite a raw document into an index-safe copy.
///
/// `_id` and `__v` are stripped at the top level only. Dates become
/// RFC-3339 UTC strings and object ids their hex form; embedded documents
/// recurse; arrays pass through unchanged (elements are not rewritten);
/// everything else is carried over as-is. Pure and idempotent.
pub fn normalize(doc: &Document) -> Document {
    let mut out = Document::new();
    for (key, value) in doc {
        if STRIPPED_FIELDS.contains(&key.as_str()) {
            continue;
        }
        out.insert(key.clone(), normalize_value(value));
    }
    out
}

fn normalize_value(value: &Bson) -> Bson {
    match value {
        Bson::DateTime(dt) => Bson::String(
            dt.to_chrono()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        ),
        Bson::ObjectId(oid) => Bson::String(oid.to_hex()),
        Bson::Document(nested) => {
            let mut out = Document::new();
            for (key, value) in nested {
                out.insert(key.clone(), normalize_value(value));
            }
            Bson::Document(out)
        }
        other => other.clone(),
    }
}

/// Render a document's `_id` as the text id used for its index action
pub fn document_id(doc: &Document) -> Result<String> {
    match doc.get("_id") {
        Some(Bson::ObjectId(oid)) => Ok(oid.to_hex()),
        Some(Bson::String(s)) => Ok(s.clone()),
        Some(Bson::Int32(n)) => Ok(n.to_string()),
        Some(Bson::Int64(n)) => Ok(n.to_string()),
        Some(other) => Ok(other.to_string()),
        None => Err(SyncError::Document {
            id: "<unknown>".to_string(),
            reason: "document has no _id field".to_string(),
        }),
    }
}

/// Render a normalized document as its JSON bulk payload
pub fn to_json(doc: Document) -> serde_json::Value {
    Bson::Document(doc).into_relaxed_extjson()
}
