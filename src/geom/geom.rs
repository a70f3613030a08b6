use geo::{BooleanOps, BoundingRect, Coord, MultiPolygon, Polygon, Rect};
use rstar::RTree;

use crate::geom::BoundingBox;

/// Polygon parts of one reference geometry, indexed by bounding box.
#[derive(Debug, Clone)]
pub(crate) struct Geometries {
    parts: Vec<Polygon<f64>>,
    rtree: RTree<BoundingBox>,
}

impl Geometries {
    /// Split a MultiPolygon into its parts and bulk-load their envelopes.
    pub(crate) fn new(shape: MultiPolygon<f64>) -> Self {
        let parts = shape.0.into_iter()
            .filter(|part| part.bounding_rect().is_some())
            .collect::<Vec<_>>();

        Self {
            rtree: RTree::bulk_load(
                parts.iter().enumerate()
                    .filter_map(|(i, part)| part.bounding_rect().map(|rect| BoundingBox::new(i, rect)))
                    .collect()
            ),
            parts,
        }
    }

    /// Get the number of polygon parts.
    #[inline] pub(crate) fn len(&self) -> usize { self.parts.len() }

    /// Check if there are no polygon parts.
    #[inline] pub(crate) fn is_empty(&self) -> bool { self.parts.is_empty() }

    /// Collect the parts whose envelopes intersect `rect`, or None if there are none.
    pub(crate) fn candidates(&self, rect: &Rect<f64>) -> Option<MultiPolygon<f64>> {
        let mut hits = self.rtree
            .locate_in_envelope_intersecting(&BoundingBox::envelope_of(rect))
            .map(BoundingBox::idx)
            .collect::<Vec<_>>();
        if hits.is_empty() { return None }

        // R-tree order is unspecified; keep part order for reproducible output.
        hits.sort_unstable();
        Some(MultiPolygon(hits.into_iter().map(|i| self.parts[i].clone()).collect()))
    }

    /// Compute the bounding rectangle of all parts.
    pub(crate) fn bounds(&self) -> Option<Rect<f64>> {
        self.parts.iter()
            .filter_map(|part| part.bounding_rect())
            .reduce(|a, b| Rect::new(
                Coord {
                    x: a.min().x.min(b.min().x),
                    y: a.min().y.min(b.min().y),
                },
                Coord {
                    x: a.max().x.max(b.max().x),
                    y: a.max().y.max(b.max().y),
                }
            ))
    }
}

/// Union the parts of a multipolygon so that no area is covered twice.
/// Boolean ops treat overlapping parts with an even-odd rule.
pub(crate) fn merge_parts(shape: MultiPolygon<f64>) -> MultiPolygon<f64> {
    if shape.0.len() < 2 { return shape }

    shape.0.into_iter()
        .map(|part| MultiPolygon(vec![part]))
        .reduce(|a, b| a.union(&b))
        .unwrap_or_else(|| MultiPolygon(Vec::new()))
}
