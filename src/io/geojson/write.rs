use geo::{CoordsIter, LineString, MultiPolygon, Point};
use serde::{Serialize, Serializer};
use serde_json::{Value, json};

fn ring_coords(ring: &LineString<f64>) -> Vec<[f64; 2]> {
    ring.coords_iter().map(|c| [c.x, c.y]).collect()
}

/// GeoJSON geometry object for a MultiPolygon.
pub(crate) fn multipolygon_geometry(shape: &MultiPolygon<f64>) -> Value {
    let polygons = shape.0.iter()
        .map(|polygon| std::iter::once(polygon.exterior())
            .chain(polygon.interiors())
            .map(ring_coords)
            .collect::<Vec<_>>())
        .collect::<Vec<_>>();

    json!({ "type": "MultiPolygon", "coordinates": polygons })
}

/// GeoJSON geometry object for a Point.
pub(crate) fn point_geometry(point: &Point<f64>) -> Value {
    json!({ "type": "Point", "coordinates": [point.x(), point.y()] })
}

/// Wrap features in a FeatureCollection.
pub(crate) fn feature_collection(features: Vec<Value>) -> Value {
    json!({ "type": "FeatureCollection", "features": features })
}

pub(crate) fn serialize_point<S: Serializer>(point: &Point<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    point_geometry(point).serialize(serializer)
}

pub(crate) fn serialize_multipolygon<S: Serializer>(shape: &MultiPolygon<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    multipolygon_geometry(shape).serialize(serializer)
}
