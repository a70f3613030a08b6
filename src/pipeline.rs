//! One-shot reconciliation run: canonicalize, clip, match, index.

use polars::frame::DataFrame;
use tracing::{debug, info};

use crate::{
    config::Config,
    data::{FeatureCollection, JurisdictionBoundary, ObservationPoint, RangePolygon, RangeSet, observations_from_frame},
    error::Result,
    geom::JurisdictionClipper,
    layer::{MatchReport, SearchIndexEntry, SpeciesLayerPair, build_search_index, match_layers},
};

/// Raw inputs, already loaded into memory.
#[derive(Debug, Clone)]
pub struct PipelineInputs {
    pub points: DataFrame,
    pub ranges: FeatureCollection,
    pub boundaries: FeatureCollection, // Reference collection the jurisdiction is selected from
}

/// Everything handed to the renderer.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub pairs: Vec<SpeciesLayerPair>,
    pub all_points: Vec<ObservationPoint>, // Catch-all collection, every input row
    pub search_index: Vec<SearchIndexEntry>,
    pub clipped_ranges: Vec<RangePolygon>,
    pub report: MatchReport,
}

/// Run the reconciliation. Schema problems in either dataset are reported
/// before the boundary is resolved or any geometry is touched.
pub fn run_pipeline(inputs: PipelineInputs, config: &Config) -> Result<PipelineOutput> {
    let PipelineInputs { points, ranges, boundaries } = inputs;

    let all_points = observations_from_frame(&points, &config.points)?;
    let ranges = RangeSet::from_features(ranges, &config.ranges.species_candidates)?;
    let ranges = match &config.ranges.crs {
        Some(crs) => RangeSet { crs: crs.clone(), ..ranges },
        None => ranges,
    };
    info!(points = all_points.len(), ranges = ranges.len(), range_crs = %ranges.crs, "canonicalized inputs");

    let boundary = JurisdictionBoundary::select(&boundaries, &config.boundary.name_field, &config.boundary.name)?;
    let clipper = JurisdictionClipper::new(boundary)?;
    debug!(jurisdiction = clipper.name(), "clipping ranges to jurisdiction");
    let clipped_ranges = clipper.clip(ranges)?;

    let pairs = match_layers(&clipped_ranges, &all_points);
    let report = MatchReport::new(&clipped_ranges, &all_points);
    info!(
        pairs = pairs.len(),
        point_only = report.point_only_keys.len(),
        polygon_only = report.polygon_only_keys,
        "matched species layers"
    );
    if !report.point_only_keys.is_empty() {
        debug!(species = ?report.point_only_keys, "detected species without range data in jurisdiction");
    }

    let search_index = build_search_index(&all_points);

    Ok(PipelineOutput { pairs, all_points, search_index, clipped_ranges, report })
}
