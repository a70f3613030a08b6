use std::collections::BTreeMap;

use geo::MultiPolygon;
use tracing::debug;

use crate::{
    data::{AttrValue, FeatureCollection},
    error::Result,
    geom::Crs,
    species::{SpeciesKey, resolve_field},
};

pub(crate) const RANGES_DATASET: &str = "ranges";

/// One range-map row: a region for a species plus its source attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct RangePolygon {
    pub geometry: MultiPolygon<f64>,
    pub species: Option<String>, // Raw identifier from the species field
    pub key: SpeciesKey,
    pub attributes: BTreeMap<String, AttrValue>,
}

/// Canonicalized range polygons, still in the dataset's native CRS.
#[derive(Debug, Clone)]
pub struct RangeSet {
    pub crs: Crs,
    pub polygons: Vec<RangePolygon>,
}

impl RangeSet {
    /// Locate the species field (first of `candidates` present) and derive keys.
    pub fn from_features(collection: FeatureCollection, candidates: &[String]) -> Result<Self> {
        let field = resolve_field(candidates, RANGES_DATASET, |f| collection.has_field(f))?
            .to_string();
        debug!(field, features = collection.len(), "resolved range species field");

        let polygons = collection.features.into_iter()
            .map(|feature| {
                let species = feature.get(&field)
                    .and_then(AttrValue::as_text)
                    .map(|s| s.into_owned());
                RangePolygon {
                    key: SpeciesKey::from_label(species.as_deref()),
                    species,
                    geometry: feature.geometry,
                    attributes: feature.attributes,
                }
            })
            .collect();

        Ok(Self { crs: collection.crs, polygons })
    }

    #[inline] pub fn len(&self) -> usize { self.polygons.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.polygons.is_empty() }
}

#[cfg(test)]
mod tests {
    use crate::{data::Feature, error::Error};

    use super::*;

    fn feature(field: &str, value: AttrValue) -> Feature {
        Feature::new(MultiPolygon(vec![]), [(field.to_string(), value), ("id".to_string(), AttrValue::Number(1.0))])
    }

    fn candidates() -> Vec<String> {
        ["sci_name", "BINOMIAL", "scientificName", "species"].map(String::from).to_vec()
    }

    #[test]
    fn keys_from_first_present_field() {
        let collection = FeatureCollection::new(Crs::Epsg(4269), vec![
            feature("BINOMIAL", AttrValue::Text("Canis  LUPUS".into())),
            feature("BINOMIAL", AttrValue::Null),
        ]);
        let ranges = RangeSet::from_features(collection, &candidates()).unwrap();

        assert_eq!(ranges.crs, Crs::Epsg(4269));
        assert_eq!(ranges.polygons[0].key.as_str(), Some("canis lupus"));
        assert_eq!(ranges.polygons[0].species.as_deref(), Some("Canis  LUPUS"));
        assert_eq!(ranges.polygons[0].attributes.get("id"), Some(&AttrValue::Number(1.0)));
        assert!(ranges.polygons[1].key.is_missing());
    }

    #[test]
    fn no_species_field_is_a_schema_error() {
        let collection = FeatureCollection::new(Crs::WGS84, vec![feature("name", AttrValue::Text("x".into()))]);
        let err = RangeSet::from_features(collection, &candidates()).unwrap_err();
        assert!(matches!(err, Error::Schema { ref dataset, .. } if dataset == "ranges"));
    }
}
