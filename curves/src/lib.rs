mod curve;
mod sample;

pub use curve::{fraction_solved, CurveError, CurveSeries, SolveCriterion, WaveHistory};
pub use sample::ConceptSampler;

pub mod prelude {
    pub use crate::ConceptSampler;
    pub use crate::CurveSeries;
    pub use crate::SolveCriterion;
    pub use crate::WaveHistory;
}
