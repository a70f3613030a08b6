mod boundary;
mod feature;
mod points;
mod ranges;

pub use boundary::JurisdictionBoundary;
pub use feature::{AttrValue, Feature, FeatureCollection};
pub use points::{ObservationPoint, observations_from_frame};
pub use ranges::{RangePolygon, RangeSet};
