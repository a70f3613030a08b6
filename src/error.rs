use polars::prelude::PolarsError;
use thiserror::Error;

/// Fatal conditions raised by the reconciliation pipeline.
///
/// Data-quality problems on individual rows (missing site ids, missing
/// distances, null labels) are never reported here; they are logged and the
/// affected fields are left out of derived labels.
#[derive(Debug, Error)]
pub enum Error {
    /// A required column/field is absent from an input dataset.
    #[error("schema error: dataset `{dataset}` has no field `{field}`")]
    Schema { dataset: String, field: String },

    /// The jurisdiction boundary could not be located in the reference collection.
    #[error("resolution error: no boundary feature with {field} == {name:?}")]
    Resolution { field: String, name: String },

    /// Unknown coordinate reference system or failed reprojection.
    #[error("crs error: {0}")]
    Crs(String),

    /// Malformed values in a required field.
    #[error("data error: {0}")]
    Data(String),

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl Error {
    pub(crate) fn schema(dataset: &str, field: impl Into<String>) -> Self {
        Self::Schema { dataset: dataset.to_string(), field: field.into() }
    }

    /// Schema error for an ordered candidate list where none was present.
    pub(crate) fn schema_any(dataset: &str, candidates: &[String]) -> Self {
        Self::schema(dataset, format!("one of [{}]", candidates.join(", ")))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
