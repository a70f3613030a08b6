//! Shapefile reading operations.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use shapefile::{Reader, dbase::{self, FieldValue}};
use tracing::{debug, warn};

use crate::{
    data::{AttrValue, Feature, FeatureCollection},
    geom::{Crs, shape_to_multipolygon},
};

/// Convert a dBase value to an attribute value (text is trimmed of padding).
fn attr_value(value: FieldValue) -> AttrValue {
    match value {
        FieldValue::Character(s) => s.map_or(AttrValue::Null, |s| AttrValue::Text(s.trim().to_string())),
        FieldValue::Memo(s) => AttrValue::Text(s),
        FieldValue::Numeric(n) => n.map_or(AttrValue::Null, AttrValue::Number),
        FieldValue::Float(f) => f.map_or(AttrValue::Null, |f| AttrValue::Number(f as f64)),
        FieldValue::Integer(i) => AttrValue::Number(i as f64),
        FieldValue::Double(d) => AttrValue::Number(d),
        FieldValue::Currency(c) => AttrValue::Number(c),
        FieldValue::Logical(b) => b.map_or(AttrValue::Null, AttrValue::Bool),
        other => AttrValue::Text(format!("{other:?}")),
    }
}

/// Determine the CRS of a shapefile: explicit override, else the `.prj` sidecar,
/// else WGS84.
pub(crate) fn shapefile_crs(path: &Path, crs: Option<&Crs>) -> Result<Crs> {
    if let Some(crs) = crs { return Ok(crs.clone()) }

    let prj = path.with_extension("prj");
    if !prj.exists() {
        warn!(path = %path.display(), "no .prj sidecar; assuming EPSG:4326");
        return Ok(Crs::WGS84);
    }
    let wkt = fs::read_to_string(&prj)
        .with_context(|| format!("[io::shp::read] Failed to read {}", prj.display()))?;
    Crs::from_prj_wkt(&wkt)
        .with_context(|| format!("[io::shp::read] Cannot determine CRS of {}", path.display()))
}

/// Field names from the `.dbf` header, so empty tables keep their schema.
pub(crate) fn dbase_fields(path: &Path) -> Result<Vec<String>> {
    let dbf = path.with_extension("dbf");
    let table = dbase::Reader::from_path(&dbf)
        .with_context(|| format!("[io::shp::read] Failed to open attribute table: {}", dbf.display()))?;
    Ok(table.fields().iter()
        .map(|field| field.name().to_string())
        .filter(|name| name != "DeletionFlag")
        .collect())
}

/// Reads all polygon shapes + attribute records from a given `.shp` file path.
pub(crate) fn read_shapefile(path: &Path, crs: Option<&Crs>) -> Result<FeatureCollection> {
    let crs = shapefile_crs(path, crs)?;
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("[io::shp::read] Failed to open shapefile: {}", path.display()))?;

    let fields = dbase_fields(path)?;

    let mut features = Vec::with_capacity(reader.shape_count()?);
    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result
            .with_context(|| format!("[io::shp::read] Error reading shape+record in {}", path.display()))?;
        let geometry = shape_to_multipolygon(shape)
            .with_context(|| format!("[io::shp::read] Error converting shape {} in {}", features.len(), path.display()))?;
        features.push(Feature::new(geometry, record.into_iter().map(|(field, value)| (field, attr_value(value)))));
    }
    debug!(path = %path.display(), features = features.len(), %crs, "read shapefile");

    Ok(FeatureCollection::with_fields(crs, fields, features))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn dbase_values_map_to_attributes() {
        assert_eq!(attr_value(FieldValue::Character(Some("Canis lupus   ".into()))), AttrValue::Text("Canis lupus".into()));
        assert_eq!(attr_value(FieldValue::Character(None)), AttrValue::Null);
        assert_eq!(attr_value(FieldValue::Numeric(Some(3.5))), AttrValue::Number(3.5));
        assert_eq!(attr_value(FieldValue::Integer(7)), AttrValue::Number(7.0));
        assert_eq!(attr_value(FieldValue::Logical(Some(true))), AttrValue::Bool(true));
    }

    #[test]
    fn crs_from_sidecar_or_override() {
        let dir = tempfile::tempdir().unwrap();
        let shp = dir.path().join("ranges.shp");

        assert_eq!(shapefile_crs(&shp, None).unwrap(), Crs::WGS84);
        assert_eq!(shapefile_crs(&shp, Some(&Crs::Epsg(3857))).unwrap(), Crs::Epsg(3857));

        let mut prj = fs::File::create(dir.path().join("ranges.prj")).unwrap();
        write!(prj, r#"GEOGCS["GCS_North_American_1983",DATUM["D_North_American_1983"]]"#).unwrap();
        assert_eq!(shapefile_crs(&shp, None).unwrap(), Crs::Epsg(4269));
    }

    #[test]
    fn empty_shapefile_keeps_header_fields() {
        let dir = tempfile::tempdir().unwrap();
        let shp = dir.path().join("ranges.shp");
        let table = dbase::TableWriterBuilder::new()
            .add_character_field("sci_name".try_into().unwrap(), 50)
            .add_numeric_field("id_no".try_into().unwrap(), 10, 0);
        let writer = shapefile::Writer::from_path(&shp, table).unwrap();
        drop(writer);

        let collection = read_shapefile(&shp, None).unwrap();
        assert!(collection.is_empty());
        assert_eq!(collection.fields, ["sci_name", "id_no"]);

        let candidates = ["sci_name".to_string()];
        let ranges = crate::data::RangeSet::from_features(collection, &candidates).unwrap();
        assert!(ranges.is_empty());
    }
}
