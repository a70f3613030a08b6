mod assemble;
mod matcher;
mod search;

pub use assemble::{Area, AreaStyle, Layer, LayerContent, LayerDocument, LegendEntry, Marker, MarkerStyle, Swatch, tooltip};
pub use matcher::{MatchReport, SpeciesLayerPair, match_layers};
pub use search::{SearchIndexEntry, build_search_index};
