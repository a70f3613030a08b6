use geo::Point;
use serde::Serialize;

use crate::{data::ObservationPoint, io::serialize_point};

/// One searchable point: its location and display label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchIndexEntry {
    #[serde(serialize_with = "serialize_point")]
    pub location: Point<f64>,
    pub label: String,
}

/// Build the text-search index: one entry per point, input order, no dedup.
pub fn build_search_index(points: &[ObservationPoint]) -> Vec<SearchIndexEntry> {
    points.iter()
        .map(|point| SearchIndexEntry {
            location: point.location(),
            label: point.display_label().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::species::SpeciesKey;

    use super::*;

    fn point(row: usize, label: Option<&str>) -> ObservationPoint {
        ObservationPoint {
            row,
            lat: 40.0 + row as f64,
            lon: -74.0,
            label: label.map(str::to_string),
            key: SpeciesKey::from_label(label),
            site_id: None,
            distance_m: None,
        }
    }

    #[test]
    fn one_entry_per_point_in_order() {
        let points = [point(0, Some("Canis Lupus")), point(1, Some("Canis Lupus")), point(2, None)];
        let index = build_search_index(&points);

        assert_eq!(index.len(), 3);
        assert_eq!(index[0].label, "Canis Lupus"); // raw label, not the key
        assert_eq!(index[1].location, Point::new(-74.0, 41.0));
        assert_eq!(index[2].label, "");
    }

    #[test]
    fn serializes_location_as_geojson_point() {
        let entry = &build_search_index(&[point(0, Some("Lynx rufus"))])[0];
        let value = serde_json::to_value(entry).unwrap();
        assert_eq!(value["location"]["type"], "Point");
        assert_eq!(value["location"]["coordinates"], serde_json::json!([-74.0, 40.0]));
        assert_eq!(value["label"], "Lynx rufus");
    }
}
