#![doc = "Species-keyed reconciliation of occurrence points against jurisdiction-clipped range maps"]
mod config;
mod data;
mod error;
mod geom;
mod io;
mod layer;
mod pipeline;
mod species;

use std::path::Path;

#[doc(inline)]
pub use config::{BoundaryConfig, Config, DEFAULT_BOUNDARY_URL, LayerConfig, PointColumns, RangeConfig};

#[doc(inline)]
pub use data::{AttrValue, Feature, FeatureCollection, JurisdictionBoundary, ObservationPoint, RangePolygon, RangeSet, observations_from_frame};

#[doc(inline)]
pub use error::{Error, Result};

#[doc(inline)]
pub use geom::{Crs, JurisdictionClipper};

#[doc(inline)]
pub use io::{read_boundary_collection, read_features, read_points};

#[doc(inline)]
pub use layer::{
    Area, AreaStyle, Layer, LayerContent, LayerDocument, LegendEntry, MatchReport, Marker, MarkerStyle,
    SearchIndexEntry, SpeciesLayerPair, Swatch, build_search_index, match_layers, tooltip,
};

#[doc(inline)]
pub use pipeline::{PipelineInputs, PipelineOutput, run_pipeline};

#[doc(inline)]
pub use species::{SpeciesKey, canonicalize, canonicalize_column, canonicalize_labels};

/// Load every input named by `config` (point table at `points`, range
/// collection at `ranges`, boundary collection from `config.boundary.source`).
pub fn load_inputs(points: &Path, ranges: &Path, config: &Config, cache_dir: &Path) -> anyhow::Result<PipelineInputs> {
    use anyhow::Context;

    Ok(PipelineInputs {
        points: read_points(points)
            .with_context(|| format!("[load] Failed to read points from {}", points.display()))?,
        ranges: read_features(ranges, config.ranges.crs.as_ref())
            .with_context(|| format!("[load] Failed to read ranges from {}", ranges.display()))?,
        boundaries: read_boundary_collection(&config.boundary.source, cache_dir)?,
    })
}

/// Write a layer document as JSON. Nothing is written unless serialization
/// succeeds, and the target is replaced atomically.
pub fn write_layer_document(document: &LayerDocument, path: &Path, force: bool) -> anyhow::Result<()> {
    use anyhow::Context;

    let bytes = document.to_json_bytes()
        .context("[io] Failed to serialize layer document")?;
    io::write_atomic(path, &bytes, force)
}

/// Fetch (or reuse) the boundary collection at `url` into `cache_dir`.
#[cfg(feature = "download")]
pub fn fetch_boundary(url: &str, cache_dir: &Path) -> anyhow::Result<std::path::PathBuf> {
    io::fetch_cached(url, cache_dir)
}
