use std::{collections::BTreeMap, sync::Arc};

use geo::MultiPolygon;
use serde::Serialize;
use serde_json::{Value, json};

use crate::{
    config::LayerConfig,
    data::{AttrValue, ObservationPoint},
    io::{feature_collection, multipolygon_geometry, point_geometry, serialize_multipolygon},
    layer::SearchIndexEntry,
    pipeline::PipelineOutput,
};

const OUTSIDE_COLOR: &str = "#d7191c";
const RANGE_COLOR: &str = "#3186cc";
const SELECTED_COLOR: &str = "#ff7f00";

/// Tooltip text: label, then site id and rounded distance when present.
pub fn tooltip(label: &str, site_id: Option<&str>, distance_m: Option<f64>, range_source: &str) -> String {
    let mut tip = label.to_string();
    if let Some(site) = site_id.filter(|s| !s.is_empty()) {
        tip.push_str(&format!(" | site: {site}"));
    }
    if let Some(distance) = distance_m.filter(|d| d.is_finite()) {
        tip.push_str(&format!(" | {distance:.0} m to {range_source}"));
    }
    tip
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub color: &'static str,
    pub radius: u32,
    pub fill_opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaStyle {
    pub fill_color: &'static str,
    pub color: &'static str,
    pub weight: u32,
    pub fill_opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub lat: f64,
    pub lon: f64,
    pub tooltip: String,
}

/// One range sub-feature; polygons of a species are never dissolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Area {
    #[serde(serialize_with = "serialize_multipolygon")]
    pub geometry: MultiPolygon<f64>,
    pub properties: BTreeMap<String, AttrValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerContent {
    Markers { style: MarkerStyle, markers: Vec<Marker> },
    Areas { style: AreaStyle, tooltip: String, areas: Vec<Area> },
}

/// A toggleable map layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub name: String,
    pub show: bool, // Visible when the map opens
    pub species: Option<Arc<str>>,
    #[serde(flatten)]
    pub content: LayerContent,
}

impl Layer {
    /// Render the layer as a GeoJSON FeatureCollection.
    pub fn to_geojson(&self) -> Value {
        let features = match &self.content {
            LayerContent::Markers { markers, .. } => markers.iter()
                .map(|m| json!({
                    "type": "Feature",
                    "geometry": point_geometry(&geo::Point::new(m.lon, m.lat)),
                    "properties": { "tooltip": m.tooltip },
                }))
                .collect(),
            LayerContent::Areas { areas, tooltip, .. } => areas.iter()
                .map(|a| json!({
                    "type": "Feature",
                    "geometry": multipolygon_geometry(&a.geometry),
                    "properties": { "tooltip": tooltip, "attributes": a.properties },
                }))
                .collect(),
        };
        feature_collection(features)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Swatch {
    Dot { color: &'static str },
    Box { color: &'static str, opacity: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub swatch: Swatch,
}

/// The structure handed to the external map renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerDocument {
    pub center: Option<[f64; 2]>, // [lat, lon] mean of all points
    pub legend: Vec<LegendEntry>,
    pub layers: Vec<Layer>,
    pub search: Vec<SearchIndexEntry>,
}

fn markers<'a>(
    points: impl IntoIterator<Item = &'a ObservationPoint>,
    label: impl Fn(&'a ObservationPoint) -> &'a str,
    range_source: &str,
) -> Vec<Marker> {
    points.into_iter()
        .map(|p| Marker {
            lat: p.lat,
            lon: p.lon,
            tooltip: tooltip(label(p), p.site_id.as_deref(), p.distance_m, range_source),
        })
        .collect()
}

impl LayerDocument {
    /// Lay out the catch-all layer, then a range/detections layer pair per species.
    pub fn assemble(output: &PipelineOutput, config: &LayerConfig) -> Self {
        let source = config.range_source.as_str();
        let points = &output.all_points;

        let center = (!points.is_empty()).then(|| {
            let n = points.len() as f64;
            [
                points.iter().map(|p| p.lat).sum::<f64>() / n,
                points.iter().map(|p| p.lon).sum::<f64>() / n,
            ]
        });

        let mut layers = vec![Layer {
            name: "All outside detections".into(),
            show: true,
            species: None,
            content: LayerContent::Markers {
                style: MarkerStyle { color: OUTSIDE_COLOR, radius: 3, fill_opacity: 0.9 },
                markers: markers(points, ObservationPoint::display_label, source),
            },
        }];

        for pair in &output.pairs {
            let key = pair.key.as_ref();
            layers.push(Layer {
                name: format!("{key} – {source} range ({})", config.jurisdiction_label),
                show: false,
                species: Some(pair.key.clone()),
                content: LayerContent::Areas {
                    style: AreaStyle { fill_color: RANGE_COLOR, color: RANGE_COLOR, weight: 1, fill_opacity: 0.25 },
                    tooltip: format!("{key} ({source} range)"),
                    areas: pair.polygons.iter()
                        .map(|p| Area { geometry: p.geometry.clone(), properties: p.attributes.clone() })
                        .collect(),
                },
            });
            layers.push(Layer {
                name: format!("{key} – detections"),
                show: false,
                species: Some(pair.key.clone()),
                content: LayerContent::Markers {
                    style: MarkerStyle { color: SELECTED_COLOR, radius: 4, fill_opacity: 0.9 },
                    markers: markers(&pair.points, |_| key, source),
                },
            });
        }

        let legend = vec![
            LegendEntry {
                label: format!("SSUSA detection outside {source} polygon"),
                swatch: Swatch::Dot { color: OUTSIDE_COLOR },
            },
            LegendEntry {
                label: format!("{source} range ({} portion)", config.jurisdiction_label),
                swatch: Swatch::Box { color: RANGE_COLOR, opacity: 0.25 },
            },
            LegendEntry {
                label: "Selected species detections".into(),
                swatch: Swatch::Dot { color: SELECTED_COLOR },
            },
        ];

        Self { center, legend, layers, search: output.search_index.clone() }
    }

    /// Serialize the document as pretty JSON.
    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }
}
