//! Pipeline configuration.
//!
//! Every field defaults to the conventions of the SSUSA / IUCN comparison data,
//! so an empty config file reproduces the standard U.S. run. Values can be
//! overridden from a TOML file and from `RANGELAYERS_`-prefixed environment
//! variables (nested keys separated by `__`, e.g. `RANGELAYERS_BOUNDARY__NAME`).

use std::path::Path;

use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::geom::Crs;

pub const DEFAULT_BOUNDARY_URL: &str = "https://naturalearth.s3.amazonaws.com/50m_cultural/ne_50m_admin_0_countries.zip";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub points: PointColumns,
    pub ranges: RangeConfig,
    pub boundary: BoundaryConfig,
    pub layers: LayerConfig,
}

/// Column names of the observation point table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointColumns {
    pub latitude: String,
    pub longitude: String,
    /// Species label columns, tried in order.
    pub label_candidates: Vec<String>,
    pub site_id: String,
    pub distance: String,
}

impl Default for PointColumns {
    fn default() -> Self {
        Self {
            latitude: "Latitude".into(),
            longitude: "Longitude".into(),
            label_candidates: vec!["species_raw".into(), "species_iucn_key".into()],
            site_id: "site_id".into(),
            distance: "distance_m_to_iucn".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeConfig {
    /// Species identifier fields, tried in order.
    pub species_candidates: Vec<String>,
    /// Override for the native CRS of the range dataset (otherwise read from `.prj`).
    pub crs: Option<Crs>,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            species_candidates: ["sci_name", "BINOMIAL", "scientificName", "species"]
                .map(String::from)
                .to_vec(),
            crs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    /// URL or local path of the reference boundary collection.
    pub source: String,
    /// Attribute holding the region name.
    pub name_field: String,
    /// Exact name of the jurisdiction to clip to.
    pub name: String,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_BOUNDARY_URL.into(),
            name_field: "ADMIN".into(),
            name: "United States of America".into(),
        }
    }
}

/// Naming used in layer titles and tooltips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    pub jurisdiction_label: String,
    pub range_source: String,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self { jurisdiction_label: "U.S.".into(), range_source: "IUCN".into() }
    }
}

impl Config {
    /// Load defaults, then an optional TOML file, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            anyhow::ensure!(path.is_file(), "[config] config file not found: {}", path.display());
            figment = figment.merge(Toml::file(path));
        }
        figment
            .merge(Env::prefixed("RANGELAYERS_").split("__"))
            .extract()
            .with_context(|| "[config] failed to load configuration")
    }
}
