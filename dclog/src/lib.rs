pub mod parse;
pub mod stats;

pub use crate::parse::*;
pub use crate::stats::{AccuracyTable, ConceptAccuracies, HitSet, IterationStats};
