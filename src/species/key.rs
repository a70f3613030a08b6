use std::{fmt, sync::{Arc, LazyLock}};

use polars::{frame::DataFrame, prelude::DataType};
use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+").expect("static whitespace pattern")
});

/// Normalize a free-text species label into its join form:
/// trimmed, internal whitespace runs collapsed to one space, lowercased.
pub fn canonicalize(label: &str) -> String {
    WHITESPACE_RUN.replace_all(label.trim(), " ").to_lowercase()
}

/// Join key shared by the point and range datasets.
///
/// `Missing` stands for a null (or blank) label. It sorts after every named key
/// and is never paired by the matcher.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpeciesKey {
    Named(Arc<str>),
    Missing,
}

impl SpeciesKey {
    /// Derive the key for one raw label.
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(canonicalize) {
            Some(key) if !key.is_empty() => Self::Named(Arc::from(key)),
            _ => Self::Missing,
        }
    }

    #[inline] pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Named(key) => Some(key),
            Self::Missing => None,
        }
    }

    #[inline] pub fn is_missing(&self) -> bool { matches!(self, Self::Missing) }
}

impl fmt::Display for SpeciesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(key) => f.write_str(key),
            Self::Missing => f.write_str("<missing>"),
        }
    }
}

impl Serialize for SpeciesKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.as_str().serialize(serializer)
    }
}

/// Canonicalize a sequence of raw labels into a parallel sequence of keys.
pub fn canonicalize_labels<I, S>(labels: I) -> Vec<SpeciesKey>
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    labels.into_iter()
        .map(|label| SpeciesKey::from_label(label.as_ref().map(AsRef::as_ref)))
        .collect()
}

/// Pick the first candidate field that `has_field` accepts.
pub(crate) fn resolve_field<'a>(
    candidates: &'a [String],
    dataset: &str,
    has_field: impl Fn(&str) -> bool,
) -> Result<&'a str> {
    candidates.iter()
        .map(String::as_str)
        .find(|&field| has_field(field))
        .ok_or_else(|| Error::schema_any(dataset, candidates))
}

/// Read `column` of `df` as optional strings, coercing non-string columns.
/// Fails with a schema error before reading anything if the column is absent.
pub(crate) fn label_column(df: &DataFrame, column: &str, dataset: &str) -> Result<Vec<Option<String>>> {
    let col = df.column(column)
        .map_err(|_| Error::schema(dataset, column))?;
    let labels = col.cast(&DataType::String)?;

    Ok(labels.str()?.into_iter()
        .map(|label| label.map(str::to_string))
        .collect())
}

/// Canonicalize a whole table column into keys.
pub fn canonicalize_column(df: &DataFrame, column: &str, dataset: &str) -> Result<Vec<SpeciesKey>> {
    Ok(canonicalize_labels(label_column(df, column, dataset)?))
}
