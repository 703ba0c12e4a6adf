//! Per-iteration statistics derived from parsed enumeration chunks.
//!
//! Folds the hit/miss records of one chunk into two nested tables keyed by
//! wave: the per-concept accuracy of every observed concept, and the set of
//! concepts that scored at least one hit. Ordered maps keep iteration order
//! deterministic for downstream consumers.

use std::collections::{BTreeMap, BTreeSet};

use crate::parse::Chunk;

/// Accuracy of each concept within one iteration, keyed by concept name
pub type ConceptAccuracies = BTreeMap<String, f64>;

/// Two-level accuracy table for one iteration: wave, then concept.
///
/// Every accuracy is hits over total for that concept's samples within the
/// iteration, so each value lies in `[0, 1]` and every present concept was
/// observed at least once. A wave or concept that never appears in the chunk
/// has no entry at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccuracyTable {
    by_wave: BTreeMap<String, ConceptAccuracies>,
}

impl AccuracyTable {
    /// Returns one wave's accuracy map, if the wave was observed
    pub fn get(&self, wave: &str) -> Option<&ConceptAccuracies> {
        self.by_wave.get(wave)
    }

    /// Iterates over `(wave, concept accuracies)` pairs in wave order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConceptAccuracies)> {
        self.by_wave
            .iter()
            .map(|(wave, accuracies)| (wave.as_str(), accuracies))
    }

    /// Iterates over the observed wave names in sorted order
    pub fn waves(&self) -> impl Iterator<Item = &str> {
        self.by_wave.keys().map(String::as_str)
    }

    /// Number of waves observed in the iteration
    pub fn len(&self) -> usize {
        self.by_wave.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_wave.is_empty()
    }
}

/// Concepts that scored at least one hit, per wave, within one iteration.
///
/// Every wave observed in the chunk is present, so a wave whose samples all
/// missed maps to an empty set rather than being absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HitSet {
    by_wave: BTreeMap<String, BTreeSet<String>>,
}

impl HitSet {
    /// Returns one wave's hit concepts, if the wave was observed
    pub fn get(&self, wave: &str) -> Option<&BTreeSet<String>> {
        self.by_wave.get(wave)
    }

    /// Iterates over `(wave, hit concepts)` pairs in wave order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.by_wave
            .iter()
            .map(|(wave, concepts)| (wave.as_str(), concepts))
    }

    /// True if `concept` scored at least one hit for `wave`
    pub fn contains(&self, wave: &str, concept: &str) -> bool {
        self.by_wave
            .get(wave)
            .is_some_and(|concepts| concepts.contains(concept))
    }
}

/// Running hit/total tally for one concept while a chunk is folded
#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    hits: u32,
    total: u32,
}

impl Tally {
    fn accuracy(self) -> f64 {
        // A tally only exists once a record has been counted, so total >= 1.
        f64::from(self.hits) / f64::from(self.total)
    }
}

/// Statistics collected from exactly one iteration's chunk
#[derive(Debug, Clone, PartialEq)]
pub struct IterationStats {
    /// Accuracy per wave and concept
    pub accuracies: AccuracyTable,
    /// Concepts with at least one hit, per wave
    pub hits: HitSet,
}

impl IterationStats {
    /// Folds the records of one chunk into accuracy and hit tables.
    ///
    /// This is a pure function of the chunk's record multiset: the order of
    /// records does not matter, and re-running it yields identical tables.
    ///
    /// # Arguments
    /// * `chunk` - One iteration's enumeration records
    ///
    /// # Returns
    /// * `IterationStats` covering every wave and concept the chunk mentions
    pub fn from_chunk(chunk: &Chunk) -> Self {
        let mut counts: BTreeMap<String, BTreeMap<String, Tally>> = BTreeMap::new();
        let mut hits: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for record in chunk.records() {
            let case = &record.test_case;

            let tally = counts
                .entry(case.wave.clone())
                .or_default()
                .entry(case.concept.clone())
                .or_default();
            tally.total += 1;
            if record.status.is_hit() {
                tally.hits += 1;
            }

            let wave_hits = hits.entry(case.wave.clone()).or_default();
            if record.status.is_hit() {
                wave_hits.insert(case.concept.clone());
            }
        }

        let by_wave = counts
            .into_iter()
            .map(|(wave, tallies)| {
                let accuracies = tallies
                    .into_iter()
                    .map(|(concept, tally)| (concept, tally.accuracy()))
                    .collect();
                (wave, accuracies)
            })
            .collect();

        Self {
            accuracies: AccuracyTable { by_wave },
            hits: HitSet { by_wave: hits },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::LineRecord;
    use approx::assert_relative_eq;

    fn chunk_of(lines: &[&str]) -> Chunk {
        let records = lines
            .iter()
            .map(|line| line.parse::<LineRecord>().unwrap())
            .collect();
        Chunk::new(records)
    }

    #[test]
    fn test_accuracy_is_hits_over_total() {
        // foo: 2 hits of 3 samples = 2/3, bar: 0 hits of 1 sample = 0.
        let chunk = chunk_of(&[
            "HIT wave1_foo_0",
            "HIT wave1_foo_1",
            "MISS wave1_foo_2",
            "MISS wave1_bar_0",
        ]);

        let stats = IterationStats::from_chunk(&chunk);

        let wave1 = stats.accuracies.get("wave1").unwrap();
        assert_relative_eq!(wave1["foo"], 2.0 / 3.0);
        assert_relative_eq!(wave1["bar"], 0.0);
    }

    #[test]
    fn test_single_section_pipeline() {
        let text = "Generative model enumeration results:\n\
                    HIT wave1_foo_0\n\
                    MISS wave1_foo_1\n\
                    Hits\n";
        let chunks = crate::parse::split_log(text).unwrap();
        assert_eq!(chunks.len(), 1);

        let stats = IterationStats::from_chunk(&chunks[0]);

        // One hit of two samples: accuracy 0.5, and foo lands in the hit set.
        let wave1 = stats.accuracies.get("wave1").unwrap();
        assert_eq!(wave1.len(), 1);
        assert_relative_eq!(wave1["foo"], 0.5);
        let wave1_hits = stats.hits.get("wave1").unwrap();
        assert_eq!(wave1_hits.len(), 1);
        assert!(wave1_hits.contains("foo"));
    }

    #[test]
    fn test_waves_are_tallied_independently() {
        let chunk = chunk_of(&[
            "HIT wave1_foo_0",
            "MISS wave3_foo_0",
            "MISS wave3_foo_1",
        ]);

        let stats = IterationStats::from_chunk(&chunk);

        assert_relative_eq!(stats.accuracies.get("wave1").unwrap()["foo"], 1.0);
        assert_relative_eq!(stats.accuracies.get("wave3").unwrap()["foo"], 0.0);
        assert_eq!(stats.accuracies.len(), 2);
    }

    #[test]
    fn test_unobserved_wave_has_no_entry() {
        let chunk = chunk_of(&["HIT wave1_foo_0"]);

        let stats = IterationStats::from_chunk(&chunk);

        assert!(stats.accuracies.get("wave3").is_none());
        assert!(stats.hits.get("wave3").is_none());
    }

    #[test]
    fn test_wave_with_only_misses_has_empty_hit_set() {
        let chunk = chunk_of(&["MISS wave1_foo_0", "MISS wave1_bar_0"]);

        let stats = IterationStats::from_chunk(&chunk);

        let wave1_hits = stats.hits.get("wave1").unwrap();
        assert!(wave1_hits.is_empty());
    }

    #[test]
    fn test_hit_set_records_concepts_with_any_hit() {
        let chunk = chunk_of(&[
            "MISS wave1_foo_0",
            "HIT wave1_foo_1",
            "MISS wave1_bar_0",
        ]);

        let stats = IterationStats::from_chunk(&chunk);

        assert!(stats.hits.contains("wave1", "foo"));
        assert!(!stats.hits.contains("wave1", "bar"));
        assert!(!stats.hits.contains("wave3", "foo"));
    }

    #[test]
    fn test_aggregation_is_order_independent() {
        let forward = chunk_of(&[
            "HIT wave1_foo_0",
            "MISS wave1_foo_1",
            "HIT wave3_bar_0",
        ]);
        let backward = chunk_of(&[
            "HIT wave3_bar_0",
            "MISS wave1_foo_1",
            "HIT wave1_foo_0",
        ]);

        assert_eq!(
            IterationStats::from_chunk(&forward),
            IterationStats::from_chunk(&backward)
        );
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let chunk = chunk_of(&["HIT wave1_foo_0", "MISS wave1_foo_1"]);

        assert_eq!(
            IterationStats::from_chunk(&chunk),
            IterationStats::from_chunk(&chunk)
        );
    }

    #[test]
    fn test_empty_chunk_yields_empty_tables() {
        let stats = IterationStats::from_chunk(&Chunk::new(Vec::new()));

        assert!(stats.accuracies.is_empty());
        assert_eq!(stats.hits.iter().count(), 0);
    }

    #[test]
    fn test_waves_iterate_in_sorted_order() {
        let chunk = chunk_of(&[
            "HIT wave3_foo_0",
            "HIT wave1_foo_0",
            "HIT wave2_foo_0",
        ]);

        let stats = IterationStats::from_chunk(&chunk);

        let waves: Vec<&str> = stats.accuracies.waves().collect();
        assert_eq!(waves, vec!["wave1", "wave2", "wave3"]);
    }
}
