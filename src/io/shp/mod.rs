//! ESRI shapefile reading operations.

mod read;

pub(crate) use read::*;
