use tracing::debug;

use super::types::{CollectionSchema, FieldObservation, ResolvedField, TypeObservation, TypeTag};

/// Resolve every field of a collection into a schema.
///
/// Fields whose winning type is an embedded document are kept only for the
/// two-field `{lat, lon}` geo-point shape; any other nested shape is dropped.
/// Unrecognized types resolve to [`TypeTag::Unknown`] and stay in the schema,
/// exclusion is the mapping compiler's call. Output order follows input order.
pub fn compile_schema(collection: &str, observations: &[FieldObservation]) -> CollectionSchema {
    let fields = observations.iter().filter_map(resolve_field).collect();
    CollectionSchema {
        collection: collection.to_string(),
        fields,
    }
}

/// Type names that mark a value as absent rather than typed
fn is_absent(type_name: &str) -> bool {
    matches!(type_name, "undefined" | "null")
}

/// Pick the most probable non-absent observation. Ties keep the earlier
/// observation so resolution stays deterministic.
fn winner(types: &[TypeObservation]) -> Option<&TypeObservation> {
    let mut best: Option<&TypeObservation> = None;
    for obs in types.iter().filter(|o| !is_absent(&o.type_name)) {
        match best {
            Some(current) if obs.probability > current.probability => best = Some(obs),
            None => best = Some(obs),
            _ => {}
        }
    }
    best
}

fn scalar_tag(type_name: &str) -> TypeTag {
    match type_name {
        "string" => TypeTag::String,
        "number" => TypeTag::Number,
        "boolean" => TypeTag::Boolean,
        "date" => TypeTag::Date,
        _ => TypeTag::Unknown,
    }
}

fn resolve_field(field: &FieldObservation) -> Option<ResolvedField> {
    let Some(top) = winner(&field.types) else {
        // Only ever absent: index as text
        return Some(ResolvedField {
            name: field.name.clone(),
            tag: TypeTag::String,
            is_array: false,
        });
    };

    match top.type_name.as_str() {
        "array" => {
            let tag = match winner(&top.element_types) {
                Some(element) => resolve_element(element)?,
                None => TypeTag::String,
            };
            Some(ResolvedField {
                name: field.name.clone(),
                tag,
                is_array: true,
            })
        }
        "document" => {
            if is_geo_point(&top.fields) {
                Some(ResolvedField {
                    name: field.name.clone(),
                    tag: TypeTag::GeoPoint,
                    is_array: false,
                })
            } else {
                debug!("dropping nested document field '{}'", field.name);
                None
            }
        }
        other => Some(ResolvedField {
            name: field.name.clone(),
            tag: scalar_tag(other),
            is_array: false,
        }),
    }
}

/// Resolve an array's element type. Nested arrays flatten to the innermost
/// element; a non-geo-point document element drops the whole field.
fn resolve_element(element: &TypeObservation) -> Option<TypeTag> {
    match element.type_name.as_str() {
        "array" => match winner(&element.element_types) {
            Some(inner) => resolve_element(inner),
            None => Some(TypeTag::String),
        },
        "document" => {
            if is_geo_point(&element.fields) {
                Some(TypeTag::GeoPoint)
            } else {
                None
            }
        }
        other => Some(scalar_tag(other)),
    }
}

/// The one nested shape with index support: exactly `lat` and `lon`
fn is_geo_point(fields: &[FieldObservation]) -> bool {
    fields.len() == 2
        && fields.iter().any(|f| f.name == "lat")
        && fields.iter().any(|f| f.name == "lon")
}
