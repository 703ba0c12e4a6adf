//! Random selection of representative concepts for chart annotation.
//!
//! The picks are illustrative only, so all they promise is uniformity over
//! the candidate set. The random source is injected through the type
//! parameter: production callers run on the thread-local generator while
//! tests pin a seed and get reproducible picks.

use dclog::ConceptAccuracies;
use rand::rngs::{StdRng, ThreadRng};
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

/// Uniform sampler over concepts, generic over its random source
#[derive(Debug, Clone)]
pub struct ConceptSampler<R: Rng> {
    rng: R,
}

impl ConceptSampler<ThreadRng> {
    /// Creates a sampler on the thread-local random source
    pub fn new() -> Self {
        Self { rng: rand::rng() }
    }
}

impl Default for ConceptSampler<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl ConceptSampler<StdRng> {
    /// Creates a sampler with a fixed seed, for reproducible picks
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> ConceptSampler<R> {
    /// Creates a sampler on an explicit random source
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Samples one concept on which no progress has been made.
    ///
    /// A concept qualifies when its accuracy fails the default solved
    /// predicate, accuracy != 0. Returns `None` when every concept has made
    /// progress.
    pub fn pick_unsolved<'a>(&mut self, accuracies: &'a ConceptAccuracies) -> Option<&'a str> {
        self.pick_unsolved_by(accuracies, |accuracy| accuracy != 0.0)
    }

    /// Samples one concept whose accuracy does not satisfy `solved`.
    ///
    /// # Arguments
    /// * `accuracies` - One iteration's accuracy map for a wave
    /// * `solved` - Predicate marking an accuracy as progress
    ///
    /// # Returns
    /// * `Some(concept)` drawn uniformly from the failing concepts
    /// * `None` when no concept fails the predicate
    pub fn pick_unsolved_by<'a, F>(
        &mut self,
        accuracies: &'a ConceptAccuracies,
        solved: F,
    ) -> Option<&'a str>
    where
        F: Fn(f64) -> bool,
    {
        let candidates: Vec<&str> = accuracies
            .iter()
            .filter(|&(_, &accuracy)| !solved(accuracy))
            .map(|(concept, _)| concept.as_str())
            .collect();
        candidates.choose(&mut self.rng).copied()
    }

    /// Samples one concept on which progress was made between two
    /// iterations, under the default improvement predicate: the earlier
    /// accuracy is strictly below the later one.
    ///
    /// Concepts absent from either map are never candidates.
    pub fn pick_newly_solved<'a>(
        &mut self,
        previous: &'a ConceptAccuracies,
        current: &ConceptAccuracies,
    ) -> Option<&'a str> {
        self.pick_newly_solved_by(previous, current, |before, after| before < after)
    }

    /// Samples one concept whose accuracy pair satisfies `improved`.
    ///
    /// # Arguments
    /// * `previous` - Accuracy map of the earlier iteration
    /// * `current` - Accuracy map of the later iteration
    /// * `improved` - Predicate over `(earlier, later)` accuracies
    ///
    /// # Returns
    /// * `Some(concept)` drawn uniformly from the concepts present in both
    ///   maps whose accuracy pair satisfies the predicate
    /// * `None` when no concept qualifies
    pub fn pick_newly_solved_by<'a, F>(
        &mut self,
        previous: &'a ConceptAccuracies,
        current: &ConceptAccuracies,
        improved: F,
    ) -> Option<&'a str>
    where
        F: Fn(f64, f64) -> bool,
    {
        let candidates: Vec<&str> = previous
            .iter()
            .filter_map(|(concept, &before)| {
                current
                    .get(concept)
                    .filter(|&&after| improved(before, after))
                    .map(|_| concept.as_str())
            })
            .collect();
        candidates.choose(&mut self.rng).copied()
    }
}
