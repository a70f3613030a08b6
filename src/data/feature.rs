use std::{borrow::Cow, collections::BTreeMap};

use geo::MultiPolygon;
use serde::Serialize;

use crate::geom::Crs;

/// A non-geometry attribute value carried by a feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl AttrValue {
    /// Coerce to a string, or None for nulls.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(Cow::Owned(b.to_string())),
            Self::Number(n) => Some(Cow::Owned(n.to_string())),
            Self::Text(s) => Some(Cow::Borrowed(s)),
        }
    }
}

/// One geometry row with its attribute record.
#[derive(Debug, Clone)]
pub struct Feature {
    pub geometry: MultiPolygon<f64>,
    pub attributes: BTreeMap<String, AttrValue>,
}

impl Feature {
    pub fn new(geometry: MultiPolygon<f64>, attributes: impl IntoIterator<Item = (String, AttrValue)>) -> Self {
        Self { geometry, attributes: attributes.into_iter().collect() }
    }

    #[inline] pub fn get(&self, field: &str) -> Option<&AttrValue> { self.attributes.get(field) }
}

/// A polygon dataset in its native coordinate reference system.
#[derive(Debug, Clone)]
pub struct FeatureCollection {
    pub crs: Crs,
    pub fields: Vec<String>, // Attribute field names in first-seen order
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Build a collection, deriving the field list from the attribute records.
    pub fn new(crs: Crs, features: Vec<Feature>) -> Self {
        let mut fields: Vec<String> = Vec::new();
        for feature in &features {
            for field in feature.attributes.keys() {
                if !fields.contains(field) { fields.push(field.clone()) }
            }
        }
        Self { crs, fields, features }
    }

    /// Build a collection with an explicit field list (e.g. from a dBase header).
    pub fn with_fields(crs: Crs, fields: Vec<String>, features: Vec<Feature>) -> Self {
        Self { crs, fields, features }
    }

    #[inline] pub fn has_field(&self, field: &str) -> bool { self.fields.iter().any(|f| f == field) }

    #[inline] pub fn len(&self) -> usize { self.features.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.features.is_empty() }
}
