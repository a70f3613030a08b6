use geo::MultiPolygon;
use tracing::debug;

use crate::{
    data::{AttrValue, FeatureCollection},
    error::{Error, Result},
    geom::Crs,
};

pub(crate) const BOUNDARY_DATASET: &str = "boundaries";

/// The jurisdiction used as the clip operand.
#[derive(Debug, Clone)]
pub struct JurisdictionBoundary {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
    pub crs: Crs,
}

impl JurisdictionBoundary {
    /// Select the region whose `field` equals `name` exactly. Several matching
    /// rows are combined into one multipolygon; overlaps between them are
    /// merged when the clipper is built.
    pub fn select(collection: &FeatureCollection, field: &str, name: &str) -> Result<Self> {
        if !collection.has_field(field) {
            return Err(Error::schema(BOUNDARY_DATASET, field));
        }

        let parts = collection.features.iter()
            .filter(|feature| matches!(feature.get(field), Some(AttrValue::Text(value)) if value == name))
            .flat_map(|feature| feature.geometry.0.iter().cloned())
            .collect::<Vec<_>>();

        if parts.is_empty() {
            return Err(Error::Resolution { field: field.to_string(), name: name.to_string() });
        }
        debug!(name, parts = parts.len(), crs = %collection.crs, "resolved jurisdiction boundary");

        Ok(Self { name: name.to_string(), geometry: MultiPolygon(parts), crs: collection.crs.clone() })
    }
}
