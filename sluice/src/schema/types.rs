use serde::{Deserialize, Serialize};

/// One sampled field and the value types it was seen with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldObservation {
    pub name: String,
    pub types: Vec<TypeObservation>,
}

/// How often a field took one particular type across the sample
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeObservation {
    pub type_name: String,
    pub probability: f64,
    /// Element types, populated for "array" observations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub element_types: Vec<TypeObservation>,
    /// Nested fields, populated for "document" observations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldObservation>,
}

impl TypeObservation {
    pub fn scalar(type_name: impl Into<String>, probability: f64) -> Self {
        Self {
            type_name: type_name.into(),
            probability,
            element_types: Vec::new(),
            fields: Vec::new(),
        }
    }
}

/// The single concrete type chosen for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    String,
    Number,
    Boolean,
    Date,
    GeoPoint,
    Unknown,
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Number => write!(f, "number"),
            Self::Boolean => write!(f, "boolean"),
            Self::Date => write!(f, "date"),
            Self::GeoPoint => write!(f, "geo_point"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// A field after type resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedField {
    pub name: String,
    pub tag: TypeTag,
    pub is_array: bool,
}

/// Resolved schema for one source collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionSchema {
    pub collection: String,
    pub fields: Vec<ResolvedField>,
}
