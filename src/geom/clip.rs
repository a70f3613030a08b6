use geo::{Area, BooleanOps, BoundingRect, MultiPolygon};
use tracing::{debug, info};

use crate::{
    data::{JurisdictionBoundary, RangePolygon, RangeSet},
    error::{Error, Result},
    geom::{Crs, Geometries, merge_parts, reproject},
};

/// Restricts range polygons to one jurisdiction.
///
/// Both operands are reconciled to WGS84 lon/lat before intersecting, so the
/// clipped output is always in the common geographic system.
#[derive(Debug, Clone)]
pub struct JurisdictionClipper {
    name: String,
    boundary: Geometries,
}

impl JurisdictionClipper {
    /// Reproject the boundary to WGS84, merge overlapping parts, and index them.
    pub fn new(boundary: JurisdictionBoundary) -> Result<Self> {
        let JurisdictionBoundary { name, geometry, crs } = boundary;
        let geometry = reproject(vec![geometry], &crs, &Crs::WGS84)?
            .pop()
            .unwrap_or_else(|| MultiPolygon(Vec::new()));

        let boundary = Geometries::new(merge_parts(geometry));
        if boundary.is_empty() {
            return Err(Error::Data(format!("jurisdiction boundary {name:?} has no polygon parts")));
        }
        debug!(name, parts = boundary.len(), bounds = ?boundary.bounds(), "indexed jurisdiction boundary");

        Ok(Self { name, boundary })
    }

    #[inline] pub fn name(&self) -> &str { &self.name }

    /// Intersect one WGS84 geometry with the boundary, or None if nothing remains.
    /// Overlapping parts of the geometry count once.
    fn clip_geometry(&self, geometry: MultiPolygon<f64>) -> Option<MultiPolygon<f64>> {
        let geometry = merge_parts(geometry);
        let rect = geometry.bounding_rect()?;
        let candidates = self.boundary.candidates(&rect)?;
        Some(geometry.intersection(&candidates))
            .filter(|clipped| !clipped.0.is_empty() && clipped.unsigned_area() > 0.0)
    }

    /// Clip every range polygon to the jurisdiction, carrying attributes forward.
    /// Polygons with an empty or zero-area intersection are dropped.
    pub fn clip(&self, ranges: RangeSet) -> Result<Vec<RangePolygon>> {
        let RangeSet { crs, polygons } = ranges;
        let total = polygons.len();

        let (geometries, records): (Vec<_>, Vec<_>) = polygons.into_iter()
            .map(|polygon| {
                let RangePolygon { geometry, species, key, attributes } = polygon;
                (geometry, (species, key, attributes))
            })
            .unzip();
        let geometries = reproject(geometries, &crs, &Crs::WGS84)?;

        let clipped = geometries.into_iter().zip(records)
            .filter_map(|(geometry, (species, key, attributes))| {
                self.clip_geometry(geometry)
                    .map(|geometry| RangePolygon { geometry, species, key, attributes })
            })
            .collect::<Vec<_>>();

        info!(
            jurisdiction = %self.name,
            kept = clipped.len(),
            dropped = total - clipped.len(),
            "clipped range polygons"
        );
        Ok(clipped)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use geo::{Coord, Polygon, Rect};

    use crate::{data::{AttrValue, Feature, FeatureCollection}, species::SpeciesKey};

    use super::*;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![Rect::new(Coord { x: x0, y: y0 }, Coord { x: x1, y: y1 }).to_polygon()])
    }

    fn range(name: &str, geometry: MultiPolygon<f64>) -> RangePolygon {
        RangePolygon {
            geometry,
            species: Some(name.to_string()),
            key: SpeciesKey::from_label(Some(name)),
            attributes: BTreeMap::from([("sci_name".to_string(), AttrValue::Text(name.to_string()))]),
        }
    }

    fn clipper(boundary: MultiPolygon<f64>) -> JurisdictionClipper {
        JurisdictionClipper::new(JurisdictionBoundary { name: "test".into(), geometry: boundary, crs: Crs::WGS84 }).unwrap()
    }

    #[test]
    fn clipped_output_stays_inside_boundary() {
        let boundary = rect(-10.0, -10.0, 0.0, 0.0);
        let clipper = clipper(boundary.clone());
        let ranges = RangeSet { crs: Crs::WGS84, polygons: vec![range("a", rect(-5.0, -5.0, 5.0, 5.0))] };

        let clipped = clipper.clip(ranges).unwrap();
        assert_eq!(clipped.len(), 1);

        let geometry = &clipped[0].geometry;
        assert!((geometry.unsigned_area() - 25.0).abs() < 1e-9);
        assert!((geometry.intersection(&boundary).unsigned_area() - geometry.unsigned_area()).abs() < 1e-9);

        let bounds = geometry.bounding_rect().unwrap();
        assert!(bounds.min().x >= -10.0 && bounds.min().y >= -10.0);
        assert!(bounds.max().x <= 0.0 + 1e-12 && bounds.max().y <= 0.0 + 1e-12);
        assert_eq!(clipped[0].attributes.get("sci_name"), Some(&AttrValue::Text("a".into())));
    }

    #[test]
    fn disjoint_and_touching_polygons_are_dropped() {
        let clipper = clipper(rect(0.0, 0.0, 10.0, 10.0));
        let ranges = RangeSet {
            crs: Crs::WGS84,
            polygons: vec![
                range("far", rect(50.0, 50.0, 60.0, 60.0)),
                range("edge", rect(10.0, 0.0, 20.0, 10.0)), // shares only an edge
                range("inside", rect(1.0, 1.0, 2.0, 2.0)),
                range("empty", MultiPolygon(Vec::<Polygon<f64>>::new())),
            ],
        };

        let clipped = clipper.clip(ranges).unwrap();
        let names = clipped.iter().map(|p| p.species.as_deref().unwrap()).collect::<Vec<_>>();
        assert_eq!(names, ["inside"]);
    }

    #[test]
    fn reconciles_projected_ranges_to_wgs84() {
        let utm = Crs::Proj4("+proj=utm +zone=18 +datum=WGS84 +units=m +no_defs".to_string());
        let lonlat = rect(-75.5, 40.0, -74.5, 41.0);
        let projected = reproject(vec![lonlat], &Crs::WGS84, &utm).unwrap().pop().unwrap();

        let clipper = clipper(rect(-80.0, 35.0, -75.0, 45.0));
        let clipped = clipper.clip(RangeSet { crs: utm, polygons: vec![range("a", projected)] }).unwrap();

        assert_eq!(clipped.len(), 1);
        let bounds = clipped[0].geometry.bounding_rect().unwrap();
        assert!((bounds.max().x - -75.0).abs() < 1e-6, "max x {}", bounds.max().x);
        assert!((bounds.min().x - -75.5).abs() < 1e-3, "min x {}", bounds.min().x);
    }

    #[test]
    fn empty_boundary_is_rejected() {
        let boundary = JurisdictionBoundary { name: "none".into(), geometry: MultiPolygon(vec![]), crs: Crs::WGS84 };
        assert!(matches!(JurisdictionClipper::new(boundary), Err(Error::Data(_))));
    }

    #[test]
    fn duplicated_boundary_rows_still_contain_ranges() {
        let row = || Feature::new(rect(0.0, 0.0, 10.0, 10.0), [("ADMIN".to_string(), AttrValue::Text("US".into()))]);
        let countries = FeatureCollection::new(Crs::WGS84, vec![row(), row()]);
        let boundary = JurisdictionBoundary::select(&countries, "ADMIN", "US").unwrap();
        let clipper = JurisdictionClipper::new(boundary).unwrap();
        assert_eq!(clipper.name(), "US");

        let ranges = RangeSet { crs: Crs::WGS84, polygons: vec![range("inside", rect(1.0, 1.0, 2.0, 2.0))] };
        let clipped = clipper.clip(ranges).unwrap();
        assert_eq!(clipped.len(), 1);
        assert!((clipped[0].geometry.unsigned_area() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn overlapping_range_parts_count_once() {
        let clipper = clipper(rect(0.0, 0.0, 10.0, 10.0));
        let mut parts = rect(1.0, 1.0, 3.0, 3.0);
        parts.0.extend(rect(2.0, 2.0, 4.0, 4.0).0);

        let clipped = clipper.clip(RangeSet { crs: Crs::WGS84, polygons: vec![range("a", parts)] }).unwrap();
        assert_eq!(clipped.len(), 1);
        assert!((clipped[0].geometry.unsigned_area() - 7.0).abs() < 1e-9);
    }
}
