use bson::{Bson, Document};

use super::types::{FieldObservation, TypeObservation};

/// Build field observations from a sample of documents.
///
/// Every top-level field tallies the BSON type it was seen with, once per
/// document; fields missing from a document tally as `undefined`. Array
/// observations tally their element types across the whole sample, embedded
/// documents recurse into their own field tallies.
pub fn observe_documents(sample: &[Document]) -> Vec<FieldObservation> {
    let mut tallies: Vec<FieldTally> = Vec::new();
    for doc in sample {
        tally_fields(&mut tallies, doc);
    }
    tallies
        .into_iter()
        .map(|tally| tally.into_observation(sample.len()))
        .collect()
}

struct FieldTally {
    name: String,
    types: Vec<TypeTally>,
}

struct TypeTally {
    type_name: &'static str,
    count: usize,
    element_types: Vec<TypeTally>,
    fields: Vec<FieldTally>,
}

fn tally_fields(tallies: &mut Vec<FieldTally>, doc: &Document) {
    for (name, value) in doc {
        let idx = match tallies.iter().position(|t| t.name == *name) {
            Some(idx) => idx,
            None => {
                tallies.push(FieldTally {
                    name: name.clone(),
                    types: Vec::new(),
                });
                tallies.len() - 1
            }
        };
        tally_value(&mut tallies[idx].types, value);
    }
}

fn tally_value(types: &mut Vec<TypeTally>, value: &Bson) {
    let type_name = bson_type_name(value);
    let idx = match types.iter().position(|t| t.type_name == type_name) {
        Some(idx) => idx,
        None => {
            types.push(TypeTally {
                type_name,
                count: 0,
                element_types: Vec::new(),
                fields: Vec::new(),
            });
            types.len() - 1
        }
    };
    types[idx].count += 1;
    match value {
        Bson::Array(items) => {
            for item in items {
                tally_value(&mut types[idx].element_types, item);
            }
        }
        Bson::Document(nested) => tally_fields(&mut types[idx].fields, nested),
        _ => {}
    }
}

impl FieldTally {
    fn into_observation(self, sample_size: usize) -> FieldObservation {
        let seen: usize = self.types.iter().map(|t| t.count).sum();
        let mut types: Vec<TypeObservation> = self
            .types
            .into_iter()
            .map(|t| t.into_observation(sample_size))
            .collect();
        if seen < sample_size {
            let absent = sample_size - seen;
            types.push(TypeObservation::scalar(
                "undefined",
                absent as f64 / sample_size as f64,
            ));
        }
        FieldObservation {
            name: self.name,
            types,
        }
    }
}

impl TypeTally {
    fn into_observation(self, denominator: usize) -> TypeObservation {
        let probability = if denominator == 0 {
            0.0
        } else {
            self.count as f64 / denominator as f64
        };
        // Element probabilities are relative to the total number of
        // elements seen, nested field probabilities to the number of
        // documents this type was observed in.
        let element_total: usize = self.element_types.iter().map(|t| t.count).sum();
        let count = self.count;
        TypeObservation {
            type_name: self.type_name.to_string(),
            probability,
            element_types: self
                .element_types
                .into_iter()
                .map(|t| t.into_observation(element_total))
                .collect(),
            fields: self
                .fields
                .into_iter()
                .map(|f| f.into_observation(count))
                .collect(),
        }
    }
}

fn bson_type_name(value: &Bson) -> &'static str {
    match value {
        Bson::String(_) | Bson::Symbol(_) => "string",
        Bson::Double(_) | Bson::Int32(_) | Bson::Int64(_) | Bson::Decimal128(_) => "number",
        Bson::Boolean(_) => "boolean",
        Bson::DateTime(_) => "date",
        Bson::Array(_) => "array",
        Bson::Document(_) => "document",
        Bson::ObjectId(_) => "objectid",
        Bson::Null => "null",
        Bson::Undefined => "undefined",
        Bson::Timestamp(_) => "timestamp",
        Bson::Binary(_) => "binary",
        Bson::RegularExpression(_) => "regex",
        _ => "unknown",
    }
}
