use anyhow::{Context, Result, anyhow, bail};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::Value;

use crate::{
    data::{AttrValue, Feature, FeatureCollection},
    geom::Crs,
};

/// Read a polygon FeatureCollection from GeoJSON bytes.
/// Coordinates are WGS84 lon/lat unless `crs` says otherwise.
pub(crate) fn read_geojson_bytes(bytes: &[u8], crs: Option<&Crs>) -> Result<FeatureCollection> {
    let value: Value = serde_json::from_slice(bytes).context("[io::geojson::read] Failed to parse GeoJSON bytes")?;
    let features = value["features"].as_array()
        .ok_or_else(|| anyhow!("[io::geojson::read] expected a FeatureCollection with a `features` array"))?;

    let features = features.iter().enumerate()
        .map(|(i, feature)| {
            let geometry = parse_geometry(&feature["geometry"])
                .with_context(|| format!("[io::geojson::read] feature {i}"))?;
            let attributes = feature["properties"].as_object()
                .map(|props| props.iter()
                    .map(|(name, value)| (name.clone(), attr_value(value)))
                    .collect::<Vec<_>>())
                .unwrap_or_default();
            Ok(Feature::new(geometry, attributes))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(FeatureCollection::new(crs.cloned().unwrap_or(Crs::WGS84), features))
}

fn attr_value(value: &Value) -> AttrValue {
    match value {
        Value::Null => AttrValue::Null,
        Value::Bool(b) => AttrValue::Bool(*b),
        Value::Number(n) => n.as_f64().map_or(AttrValue::Null, AttrValue::Number),
        Value::String(s) => AttrValue::Text(s.clone()),
        other => AttrValue::Text(other.to_string()),
    }
}

/// Parse a Polygon or MultiPolygon geometry; a null geometry is empty.
fn parse_geometry(geometry: &Value) -> Result<MultiPolygon<f64>> {
    if geometry.is_null() { return Ok(MultiPolygon(Vec::new())) }

    let coords = geometry["coordinates"].as_array()
        .ok_or_else(|| anyhow!("geometry has no coordinates array"))?;
    match geometry["type"].as_str() {
        Some("Polygon") => Ok(MultiPolygon(vec![parse_polygon(coords)?])),
        Some("MultiPolygon") => coords.iter()
            .map(|polygon| polygon.as_array()
                .ok_or_else(|| anyhow!("invalid MultiPolygon member"))
                .and_then(|rings| parse_polygon(rings)))
            .collect::<Result<Vec<_>>>()
            .map(MultiPolygon),
        other => bail!("unsupported geometry type {other:?}; expected Polygon or MultiPolygon"),
    }
}

/// Parse `[exterior, hole, hole, ...]`.
fn parse_polygon(rings: &[Value]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter()
        .map(|ring| ring.as_array()
            .ok_or_else(|| anyhow!("invalid ring"))
            .and_then(|coords| parse_ring(coords)));
    let exterior = rings.next().ok_or_else(|| anyhow!("polygon without exterior ring"))??;
    Ok(Polygon::new(exterior, rings.collect::<Result<Vec<_>>>()?))
}

/// Parse a ring `[[x, y], ...]`, closing it if needed.
fn parse_ring(coords: &[Value]) -> Result<LineString<f64>> {
    let mut points = coords.iter()
        .map(|pair| {
            let x = pair[0].as_f64().ok_or_else(|| anyhow!("invalid coordinate: x must be a number"))?;
            let y = pair[1].as_f64().ok_or_else(|| anyhow!("invalid coordinate: y must be a number"))?;
            Ok(Coord { x, y })
        })
        .collect::<Result<Vec<_>>>()?;

    if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
        if first != last { points.push(first) }
    }
    Ok(LineString(points))
}

#[cfg(test)]
mod tests {
    use geo::Area;

    use super::*;

    #[test]
    fn reads_polygons_and_properties() {
        let geojson = br#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"sci_name": "Canis lupus", "id_no": 3746},
                 "geometry": {"type": "Polygon", "coordinates": [[[0,0],[2,0],[2,2],[0,2]]]}},
                {"type": "Feature", "properties": {"sci_name": null},
                 "geometry": {"type": "MultiPolygon", "coordinates": [[[[0,0],[1,0],[1,1],[0,0]]], [[[5,5],[6,5],[6,6],[5,5]]]]}},
                {"type": "Feature", "properties": {}, "geometry": null}
            ]
        }"#;

        let collection = read_geojson_bytes(geojson, None).unwrap();
        assert_eq!(collection.crs, Crs::WGS84);
        assert_eq!(collection.len(), 3);
        assert!(collection.has_field("id_no"));
        assert!((collection.features[0].geometry.unsigned_area() - 4.0).abs() < 1e-12);
        assert_eq!(collection.features[0].get("sci_name"), Some(&AttrValue::Text("Canis lupus".into())));
        assert_eq!(collection.features[1].geometry.0.len(), 2);
        assert_eq!(collection.features[1].get("sci_name"), Some(&AttrValue::Null));
        assert!(collection.features[2].geometry.0.is_empty());
    }

    #[test]
    fn rejects_point_geometries() {
        let geojson = br#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[1,2]}}]}"#;
        assert!(read_geojson_bytes(geojson, None).is_err());
    }
}
