use std::{fs, path::{Path, PathBuf}};

use rangelayers::{
    Config, Crs, Error, LayerContent, LayerDocument, PipelineInputs, read_features, read_points, run_pipeline,
};
use shapefile::dbase::{FieldValue, Record, TableWriterBuilder};
use tempfile::TempDir;

const POINTS: &str = "\
Latitude,Longitude,species_raw,site_id,distance_m_to_iucn
40.0,-74.0,Canis Lupus,S1,1523.7
41.0,-75.0,Ursus arctos,,
";

fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> String {
    format!("[[[{x0},{y0}],[{x1},{y0}],[{x1},{y1}],[{x0},{y1}],[{x0},{y0}]]]")
}

fn polygon_feature(field: &str, value: &str, coords: &str) -> String {
    format!(r#"{{"type":"Feature","properties":{{"{field}":"{value}"}},"geometry":{{"type":"Polygon","coordinates":{coords}}}}}"#)
}

fn collection(features: &[String]) -> String {
    format!(r#"{{"type":"FeatureCollection","features":[{}]}}"#, features.join(","))
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

struct Fixture {
    _dir: TempDir,
    points: PathBuf,
    ranges: PathBuf,
    boundaries: PathBuf,
}

fn fixture(range_field: &str) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let points = write(dir.path(), "points.csv", POINTS);
    let ranges = write(dir.path(), "ranges.geojson", &collection(&[
        polygon_feature(range_field, "canis lupus", &square(-76.0, 39.0, -72.0, 42.0)),
    ]));
    let boundaries = write(dir.path(), "countries.geojson", &collection(&[
        polygon_feature("ADMIN", "United States of America", &square(-125.0, 24.0, -66.0, 50.0)),
        polygon_feature("ADMIN", "Canada", &square(-140.0, 50.0, -52.0, 70.0)),
    ]));
    Fixture { _dir: dir, points, ranges, boundaries }
}

fn inputs(fixture: &Fixture) -> PipelineInputs {
    PipelineInputs {
        points: read_points(&fixture.points).unwrap(),
        ranges: read_features(&fixture.ranges, None).unwrap(),
        boundaries: read_features(&fixture.boundaries, None).unwrap(),
    }
}

#[test]
fn two_points_one_polygon() {
    let fixture = fixture("sci_name");
    let output = run_pipeline(inputs(&fixture), &Config::default()).unwrap();

    assert_eq!(output.pairs.len(), 1);
    let pair = &output.pairs[0];
    assert_eq!(&*pair.key, "canis lupus");
    assert_eq!(pair.points.len(), 1);
    assert_eq!(pair.polygons.len(), 1);

    assert_eq!(output.all_points.len(), 2);
    assert_eq!(output.search_index.len(), 2);
    assert_eq!(output.search_index[0].label, "Canis Lupus");
    assert_eq!(output.search_index[1].label, "Ursus arctos");
    assert_eq!(output.report.point_only_keys.iter().map(|k| &**k).collect::<Vec<_>>(), ["ursus arctos"]);

    let document = LayerDocument::assemble(&output, &Config::default().layers);
    assert_eq!(document.layers.len(), 3);
    assert_eq!(document.layers[1].name, "canis lupus – IUCN range (U.S.)");
    match &document.layers[2].content {
        LayerContent::Markers { markers, .. } => {
            assert_eq!(markers.len(), 1);
            assert_eq!(markers[0].tooltip, "canis lupus | site: S1 | 1524 m to IUCN");
        }
        other => panic!("expected markers, got {other:?}"),
    }
    match &document.layers[0].content {
        LayerContent::Markers { markers, .. } => assert_eq!(markers[1].tooltip, "Ursus arctos"),
        other => panic!("expected markers, got {other:?}"),
    }
}

#[test]
fn range_clipped_to_jurisdiction() {
    let dir = tempfile::tempdir().unwrap();
    let mut fixture = fixture("BINOMIAL");
    // Straddles the U.S./Canada boundary at 50N.
    fixture.ranges = write(dir.path(), "ranges.geojson", &collection(&[
        polygon_feature("BINOMIAL", "Canis lupus", &square(-80.0, 30.0, -70.0, 60.0)),
        polygon_feature("BINOMIAL", "Canis lupus", &square(-100.0, 55.0, -90.0, 65.0)),
    ]));

    let output = run_pipeline(inputs(&fixture), &Config::default()).unwrap();
    assert_eq!(output.clipped_ranges.len(), 1);
    let rect = geo::BoundingRect::bounding_rect(&output.clipped_ranges[0].geometry).unwrap();
    assert!(rect.max().y <= 50.0 + 1e-9);
    assert!(rect.min().y >= 30.0 - 1e-9);
    assert_eq!(output.pairs[0].polygons.len(), 1);
}

#[test]
fn missing_point_column_is_a_schema_error() {
    let fixture = fixture("sci_name");
    let dir = tempfile::tempdir().unwrap();
    let points = write(dir.path(), "points.csv", "Lat,Longitude,species_raw\n40,-74,Canis lupus\n");

    let inputs = PipelineInputs { points: read_points(&points).unwrap(), ..inputs(&fixture) };
    match run_pipeline(inputs, &Config::default()) {
        Err(Error::Schema { dataset, field }) => {
            assert_eq!(dataset, "points");
            assert_eq!(field, "Latitude");
        }
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn schema_checked_before_boundary_resolution() {
    let fixture = fixture("common_name");
    let mut config = Config::default();
    config.boundary.name = "Atlantis".into();

    let err = run_pipeline(inputs(&fixture), &config).unwrap_err();
    assert!(matches!(err, Error::Schema { ref dataset, .. } if dataset == "ranges"), "{err}");
}

#[test]
fn unknown_jurisdiction_is_a_resolution_error() {
    let fixture = fixture("sci_name");
    let mut config = Config::default();
    config.boundary.name = "United States".into();

    let err = run_pipeline(inputs(&fixture), &config).unwrap_err();
    assert!(matches!(err, Error::Resolution { ref name, .. } if name == "United States"), "{err}");
}

#[test]
fn shapefile_ranges_with_crs_override() {
    let fixture = fixture("sci_name");
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ranges.shp");

    let table = TableWriterBuilder::new()
        .add_character_field("sci_name".try_into().unwrap(), 50);
    let mut writer = shapefile::Writer::from_path(&path, table).unwrap();
    let ring = [(-76.0, 39.0), (-76.0, 42.0), (-72.0, 42.0), (-72.0, 39.0), (-76.0, 39.0)]
        .map(|(x, y)| shapefile::Point::new(x, y))
        .to_vec();
    let mut record = Record::default();
    record.insert("sci_name".to_string(), FieldValue::Character(Some("Canis lupus".to_string())));
    writer.write_shape_and_record(&shapefile::Polygon::with_rings(vec![shapefile::PolygonRing::Outer(ring)]), &record).unwrap();
    drop(writer);

    // NAD83 lon/lat coincides with WGS84 to well under a metre.
    let ranges = read_features(&path, Some(&Crs::Epsg(4269))).unwrap();
    assert_eq!(ranges.crs, Crs::Epsg(4269));

    let inputs = PipelineInputs { ranges, ..inputs(&fixture) };
    let output = run_pipeline(inputs, &Config::default()).unwrap();
    assert_eq!(output.pairs.len(), 1);
    assert_eq!(output.pairs[0].points[0].site_id.as_deref(), Some("S1"));
}
