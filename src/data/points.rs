use geo::Point;
use polars::{frame::DataFrame, prelude::{Column, DataType}};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    config::PointColumns,
    error::{Error, Result},
    species::{SpeciesKey, label_column, resolve_field},
};

pub(crate) const POINTS_DATASET: &str = "points";

/// One species detection read from the tabular point source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationPoint {
    pub row: usize, // Position in the source table
    pub lat: f64,
    pub lon: f64,
    pub label: Option<String>, // Raw species label
    pub key: SpeciesKey,
    pub site_id: Option<String>,
    pub distance_m: Option<f64>, // Distance to the nearest range polygon, if computed upstream
}

impl ObservationPoint {
    /// Point geometry (x = lon, y = lat).
    #[inline] pub fn location(&self) -> Point<f64> { Point::new(self.lon, self.lat) }

    /// Human-readable species label: raw label, else canonical key, else empty.
    pub fn display_label(&self) -> &str {
        self.label.as_deref()
            .or_else(|| self.key.as_str())
            .unwrap_or("")
    }
}

/// Read a required float column, failing on absent columns or null cells.
fn coordinate_column(df: &DataFrame, column: &str) -> Result<Vec<f64>> {
    let values = df.column(column)
        .map_err(|_| Error::schema(POINTS_DATASET, column))?
        .cast(&DataType::Float64)?;

    values.f64()?.into_iter().enumerate()
        .map(|(row, value)| value
            .filter(|v| v.is_finite())
            .ok_or_else(|| Error::Data(format!("row {row}: missing or non-finite `{column}`"))))
        .collect()
}

/// Read an optional column; absent columns yield all-None.
fn optional_column<T>(
    df: &DataFrame,
    column: &str,
    dtype: DataType,
    read: impl Fn(&Column) -> Result<Vec<Option<T>>>,
) -> Result<Vec<Option<T>>> {
    match df.column(column) {
        Ok(col) => read(&col.cast(&dtype)?),
        Err(_) => {
            debug!(column, "optional point column absent");
            Ok(std::iter::repeat_with(|| None).take(df.height()).collect())
        }
    }
}

/// Validate the point table schema and build canonicalized observation points.
///
/// The latitude/longitude columns and one label column from
/// `columns.label_candidates` are required; site id and distance are optional
/// per row and per table.
pub fn observations_from_frame(df: &DataFrame, columns: &PointColumns) -> Result<Vec<ObservationPoint>> {
    // Schema checks come before any transformation.
    for column in [&columns.latitude, &columns.longitude] {
        if df.column(column).is_err() {
            return Err(Error::schema(POINTS_DATASET, column.as_str()));
        }
    }
    let label_field = resolve_field(&columns.label_candidates, POINTS_DATASET, |field| df.column(field).is_ok())?;
    debug!(label_field, rows = df.height(), "resolved point label column");

    let lats = coordinate_column(df, &columns.latitude)?;
    let lons = coordinate_column(df, &columns.longitude)?;
    let labels = label_column(df, label_field, POINTS_DATASET)?;

    let sites = optional_column(df, &columns.site_id, DataType::String, |col| {
        Ok(col.str()?.into_iter()
            .map(|site| site.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string))
            .collect())
    })?;
    let distances = optional_column(df, &columns.distance, DataType::Float64, |col| {
        Ok(col.f64()?.into_iter()
            .map(|d| d.filter(|d| d.is_finite()))
            .collect())
    })?;

    let points = (0..df.height())
        .map(|row| {
            let label = labels[row].clone();
            ObservationPoint {
                row,
                lat: lats[row],
                lon: lons[row],
                key: SpeciesKey::from_label(label.as_deref()),
                label,
                site_id: sites[row].clone(),
                distance_m: distances[row],
            }
        })
        .collect::<Vec<_>>();

    let missing_keys = points.iter().filter(|p| p.key.is_missing()).count();
    if missing_keys > 0 {
        warn!(missing_keys, "points with no species label will not join any range");
    }
    debug!(
        without_site = points.iter().filter(|p| p.site_id.is_none()).count(),
        without_distance = points.iter().filter(|p| p.distance_m.is_none()).count(),
        "optional point fields"
    );

    Ok(points)
}
