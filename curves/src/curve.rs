//! Solved-fraction curves across iterations.
//!
//! Turns per-iteration accuracy tables into the numeric series that get
//! plotted: for each iteration, the fraction of a wave's concepts whose
//! accuracy satisfies a solve criterion.

use std::fmt;

use dclog::{ConceptAccuracies, IterationStats};
use thiserror::Error;

/// Errors that can occur while building curves from iteration statistics
#[derive(Debug, Error)]
pub enum CurveError {
    /// Error for iterations whose accuracy map has no entries to divide by
    #[error("No accuracy data for iteration {iteration}: cannot compute a solved fraction")]
    EmptyIteration {
        /// Zero-based index of the offending iteration
        iteration: usize,
    },
    /// Error for waves absent from an iteration's accuracy table
    #[error("Wave {wave:?} is missing from iteration {iteration}")]
    MissingWave {
        /// Name of the wave being tracked
        wave: String,
        /// Zero-based index of the iteration that does not contain it
        iteration: usize,
    },
}

/// Named thresholds for counting a concept as solved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveCriterion {
    /// Every sample of the concept was a hit
    Completely,
    /// At least one sample of the concept was a hit
    Partially,
}

impl SolveCriterion {
    /// Both criteria, in the order their curves are plotted
    pub const ALL: [SolveCriterion; 2] = [SolveCriterion::Completely, SolveCriterion::Partially];

    /// Returns true if an accuracy value meets the criterion
    pub fn is_met(self, accuracy: f64) -> bool {
        match self {
            SolveCriterion::Completely => accuracy == 1.0,
            SolveCriterion::Partially => accuracy != 0.0,
        }
    }
}

impl fmt::Display for SolveCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveCriterion::Completely => write!(f, "solved completely"),
            SolveCriterion::Partially => write!(f, "solved partially"),
        }
    }
}

/// Computes the fraction of concepts whose accuracy satisfies `pred`.
///
/// Returns `None` when the map is empty: a missing denominator is a signal
/// the caller must surface, not a zero.
pub fn fraction_solved<F>(accuracies: &ConceptAccuracies, pred: F) -> Option<f64>
where
    F: Fn(f64) -> bool,
{
    if accuracies.is_empty() {
        return None;
    }
    let solved = accuracies
        .values()
        .filter(|&&accuracy| pred(accuracy))
        .count();
    Some(solved as f64 / accuracies.len() as f64)
}

/// One solved-fraction value per iteration, in iteration order
#[derive(Debug, Clone, PartialEq)]
pub struct CurveSeries {
    values: Vec<f64>,
}

impl CurveSeries {
    /// Applies `pred` across an ordered sequence of accuracy maps.
    ///
    /// # Arguments
    /// * `maps` - One accuracy map per iteration, in iteration order
    /// * `pred` - Predicate deciding whether an accuracy counts as solved
    ///
    /// # Returns
    /// * `Ok(CurveSeries)` with exactly one value per input map
    /// * `Err(CurveError::EmptyIteration)` naming the first iteration whose
    ///   map has no entries
    pub fn build<'a, I, F>(maps: I, pred: F) -> Result<Self, CurveError>
    where
        I: IntoIterator<Item = &'a ConceptAccuracies>,
        F: Fn(f64) -> bool,
    {
        let values = maps
            .into_iter()
            .enumerate()
            .map(|(iteration, accuracies)| {
                fraction_solved(accuracies, &pred).ok_or(CurveError::EmptyIteration { iteration })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { values })
    }

    /// Values in iteration order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at one iteration
    pub fn get(&self, iteration: usize) -> Option<f64> {
        self.values.get(iteration).copied()
    }

    /// Number of iterations covered
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(iteration, value)` pairs ready for a line series
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.values
            .iter()
            .enumerate()
            .map(|(iteration, &value)| (iteration as f64, value))
            .collect()
    }
}

/// One wave's accuracy maps across every iteration, in iteration order.
///
/// Construction fails if the wave is absent from any iteration, which
/// signals a mismatch between the waves the caller tracks and the waves the
/// log actually contains.
#[derive(Debug, Clone)]
pub struct WaveHistory<'a> {
    accuracies: Vec<&'a ConceptAccuracies>,
}

impl<'a> WaveHistory<'a> {
    /// Gathers `wave`'s accuracy map from every iteration.
    ///
    /// # Arguments
    /// * `stats` - Per-iteration statistics, in iteration order
    /// * `wave` - Name of the wave to track
    ///
    /// # Returns
    /// * `Ok(WaveHistory)` covering every iteration
    /// * `Err(CurveError::MissingWave)` naming the first iteration that does
    ///   not contain the wave
    pub fn collect(stats: &'a [IterationStats], wave: &str) -> Result<Self, CurveError> {
        let accuracies = stats
            .iter()
            .enumerate()
            .map(|(iteration, iteration_stats)| {
                iteration_stats
                    .accuracies
                    .get(wave)
                    .ok_or_else(|| CurveError::MissingWave {
                        wave: wave.to_string(),
                        iteration,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { accuracies })
    }

    /// Accuracy maps in iteration order
    pub fn accuracies(&self) -> &[&'a ConceptAccuracies] {
        &self.accuracies
    }

    /// Number of iterations covered
    pub fn len(&self) -> usize {
        self.accuracies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accuracies.is_empty()
    }

    /// Fraction of concepts meeting `criterion`, one value per iteration
    pub fn solved_fractions(&self, criterion: SolveCriterion) -> Result<CurveSeries, CurveError> {
        self.solved_fractions_by(|accuracy| criterion.is_met(accuracy))
    }

    /// Fraction of concepts satisfying `pred`, one value per iteration
    pub fn solved_fractions_by<F>(&self, pred: F) -> Result<CurveSeries, CurveError>
    where
        F: Fn(f64) -> bool,
    {
        CurveSeries::build(self.accuracies.iter().copied(), pred)
    }
}
