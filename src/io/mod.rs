//! IO module for loading pipeline inputs and writing the renderer hand-off.
//!
//! Organized by format:
//!
//! - `csv` - observation point tables
//! - `shp` - ESRI shapefiles (range maps, boundary collections)
//! - `geojson` - GeoJSON polygon collections and geometry encoding
//! - `fs` - directories, zip archives, atomic writes
//! - `download` - cached HTTP fetches (requires `download` feature)

mod csv;
#[cfg(feature = "download")]
mod download;
mod fs;
mod geojson;
mod shp;

use std::path::Path;

use anyhow::{Context, Result, bail};
use polars::frame::DataFrame;
use tracing::info;

use crate::{data::FeatureCollection, geom::Crs};

pub(crate) use csv::*;
#[cfg(feature = "download")]
pub(crate) use download::*;
pub(crate) use fs::*;
pub(crate) use geojson::*;
pub(crate) use shp::*;

/// Read the observation point table from a CSV file.
pub fn read_points(path: &Path) -> Result<DataFrame> {
    let df = read_csv(path)?;
    info!(path = %path.display(), rows = df.height(), columns = df.width(), "read point table");
    Ok(df)
}

/// Read a polygon collection from a `.shp`, `.geojson`/`.json`, or `.zip`
/// (containing one shapefile). `crs` overrides the file's own CRS.
pub fn read_features(path: &Path, crs: Option<&Crs>) -> Result<FeatureCollection> {
    let ext = path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let collection = match ext.as_str() {
        "shp" => read_shapefile(path, crs)?,
        "geojson" | "json" => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("[io] Failed to read {}", path.display()))?;
            read_geojson_bytes(&bytes, crs)?
        }
        "zip" => {
            // Extracted files only live until the collection is in memory.
            let dir = tempfile::tempdir().context("create extraction dir")?;
            extract_zip(path, dir.path())?;
            read_shapefile(&find_shapefile(dir.path())?, crs)?
        }
        _ => bail!("[io] unsupported polygon source {}; expected .shp, .geojson, .json or .zip", path.display()),
    };
    info!(path = %path.display(), features = collection.len(), crs = %collection.crs, "read polygon collection");
    Ok(collection)
}

/// Load the reference boundary collection from a URL (cached under
/// `cache_dir`) or a local path.
pub fn read_boundary_collection(source: &str, cache_dir: &Path) -> Result<FeatureCollection> {
    if source.starts_with("http://") || source.starts_with("https://") {
        #[cfg(feature = "download")]
        {
            let archive = fetch_cached(source, cache_dir)?;
            return read_features(&archive, None)
                .with_context(|| format!("[io] Failed to read boundary collection from {source}"));
        }
        #[cfg(not(feature = "download"))]
        {
            let _ = cache_dir;
            bail!("[io] remote boundary source {source} requires the `download` feature");
        }
    }
    read_features(Path::new(source), None)
}
