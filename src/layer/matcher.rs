use std::{collections::{BTreeMap, BTreeSet}, sync::Arc};

use ahash::{AHashMap, AHashSet};
use serde::Serialize;

use crate::{
    data::{ObservationPoint, RangePolygon},
    species::SpeciesKey,
};

/// Range polygons and detections sharing one canonical species key.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesLayerPair {
    pub key: Arc<str>,
    pub polygons: Vec<RangePolygon>, // One sub-feature per source row, never dissolved
    pub points: Vec<ObservationPoint>,
}

/// Partition points and polygons by key into matched pairs.
///
/// Pairs come out in ascending key order, one per key present among the points
/// that also has at least one polygon. Keys found on only one side, and points
/// without a key, produce nothing. Members keep their input order.
pub fn match_layers(polygons: &[RangePolygon], points: &[ObservationPoint]) -> Vec<SpeciesLayerPair> {
    let mut ranges_by_key: AHashMap<&str, Vec<&RangePolygon>> = AHashMap::new();
    for polygon in polygons {
        if let SpeciesKey::Named(key) = &polygon.key {
            ranges_by_key.entry(&**key).or_default().push(polygon);
        }
    }

    let mut points_by_key: BTreeMap<&Arc<str>, Vec<&ObservationPoint>> = BTreeMap::new();
    for point in points {
        if let SpeciesKey::Named(key) = &point.key {
            points_by_key.entry(key).or_default().push(point);
        }
    }

    points_by_key.into_iter()
        .filter_map(|(key, members)| {
            let ranges = ranges_by_key.get(&**key)?;
            Some(SpeciesLayerPair {
                key: key.clone(),
                polygons: ranges.iter().map(|&p| p.clone()).collect(),
                points: members.into_iter().cloned().collect(),
            })
        })
        .collect()
}

/// Summary of how the two datasets joined.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchReport {
    pub matched_keys: usize,
    /// Species detected but without range data in the jurisdiction, ascending.
    pub point_only_keys: Vec<Arc<str>>,
    pub polygon_only_keys: usize,
    pub unlabeled_points: usize,
}

impl MatchReport {
    pub fn new(polygons: &[RangePolygon], points: &[ObservationPoint]) -> Self {
        let range_keys = polygons.iter()
            .filter_map(|p| p.key.as_str())
            .collect::<AHashSet<_>>();
        let point_keys = points.iter()
            .filter_map(|p| match &p.key {
                SpeciesKey::Named(key) => Some(key),
                SpeciesKey::Missing => None,
            })
            .collect::<BTreeSet<_>>();

        let mut point_only_keys = Vec::new();
        let mut matched_keys = 0;
        for key in point_keys {
            if range_keys.contains(&**key) { matched_keys += 1 }
            else { point_only_keys.push(key.clone()) }
        }

        Self {
            matched_keys,
            point_only_keys,
            polygon_only_keys: range_keys.len() - matched_keys,
            unlabeled_points: points.iter().filter(|p| p.key.is_missing()).count(),
        }
    }
}
