mod bbox;
mod clip;
mod crs;
mod geom;
mod proj;
mod shp;

use bbox::BoundingBox;
pub use clip::JurisdictionClipper;
pub use crs::Crs;
pub(crate) use geom::{Geometries, merge_parts};
pub(crate) use proj::reproject;
pub(crate) use shp::shape_to_multipolygon;
