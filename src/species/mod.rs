mod key;

pub use key::{SpeciesKey, canonicalize, canonicalize_column, canonicalize_labels};
pub(crate) use key::{label_column, resolve_field};
