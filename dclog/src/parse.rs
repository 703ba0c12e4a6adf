//! DreamCoder enumeration-log parsing.
//!
//! This module provides functionality to parse the console log written by a
//! DreamCoder run. It includes the line-level parser for hit/miss records and
//! the segmenter that slices a full log into one chunk of records per
//! iteration of the generative process.
//!
//! An enumeration line looks like:
//!
//! ```text
//! HIT wave1_remove-adjacent-duplicates_3 w/ (lambda (fold ...))
//! ```
//!
//! Only the first two whitespace-separated tokens matter: the status marker
//! and the test-case identifier. Everything after them is program text and is
//! ignored.

use std::str::FromStr;

use thiserror::Error;

/// Marker printed at the top of each iteration's enumeration section
pub const RESULTS_MARKER: &str = "Generative model enumeration results:";

/// Marker printed immediately after an iteration's enumeration lines
pub const HITS_MARKER: &str = "Hits";

/// Errors that can occur while parsing an enumeration log
#[derive(Debug, Error)]
pub enum LogError {
    /// Error for enumeration lines with fewer than two tokens
    #[error("Malformed enumeration line (expected `<status> <test case> ...`): {line:?}")]
    TruncatedLine {
        /// The offending line
        line: String,
    },
    /// Error for test-case identifiers that do not split into three parts
    #[error("Malformed test-case identifier (expected `<wave>_<concept>_<sample>`): {token:?}")]
    MalformedTestCase {
        /// The offending identifier token
        token: String,
    },
}

/// Outcome recorded for one test-case sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The enumeration solved this sample
    Hit,
    /// Any status marker other than `HIT`
    Miss,
}

impl Status {
    fn from_token(token: &str) -> Self {
        if token == "HIT" {
            Status::Hit
        } else {
            Status::Miss
        }
    }

    /// Returns true for [`Status::Hit`]
    pub fn is_hit(self) -> bool {
        matches!(self, Status::Hit)
    }
}

/// Identity of one test-case sample.
///
/// The log names each test case `<wave>_<concept>_<sample index>`: which
/// curriculum wave it belongs to, which concept it exercises, and which
/// sampled instance of that concept it is. All three parts are kept as
/// strings; the sample index is an opaque label, never arithmetic input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCaseId {
    /// Curriculum wave the test case belongs to
    pub wave: String,
    /// Concept the test case exercises
    pub concept: String,
    /// Label of the sampled instance within the concept
    pub sample_index: String,
}

impl FromStr for TestCaseId {
    type Err = LogError;

    /// Splits an identifier token on underscores into its three parts.
    ///
    /// # Arguments
    /// * `token` - Identifier token of the form `<wave>_<concept>_<sample>`
    ///
    /// # Returns
    /// * `Ok(TestCaseId)` if the token has exactly three parts
    /// * `Err(LogError::MalformedTestCase)` otherwise
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let mut parts = token.split('_');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(wave), Some(concept), Some(sample_index), None) => Ok(Self {
                wave: wave.to_string(),
                concept: concept.to_string(),
                sample_index: sample_index.to_string(),
            }),
            _ => Err(LogError::MalformedTestCase {
                token: token.to_string(),
            }),
        }
    }
}

/// One parsed observation: a status marker plus the test case it applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord {
    /// Whether the sample was solved
    pub status: Status,
    /// The sample the status applies to
    pub test_case: TestCaseId,
}

impl FromStr for LineRecord {
    type Err = LogError;

    /// Parses one enumeration line.
    ///
    /// # Arguments
    /// * `line` - A non-empty line from an enumeration section
    ///
    /// # Returns
    /// * `Ok(LineRecord)` with the status and test-case identity
    /// * `Err(LogError::TruncatedLine)` if the line has fewer than two tokens
    /// * `Err(LogError::MalformedTestCase)` if the identifier is malformed
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        let (status, test_case) = match (tokens.next(), tokens.next()) {
            (Some(status), Some(test_case)) => (status, test_case),
            _ => {
                return Err(LogError::TruncatedLine {
                    line: line.to_string(),
                })
            }
        };
        Ok(Self {
            status: Status::from_token(status),
            test_case: test_case.parse()?,
        })
    }
}

/// The enumeration records of exactly one iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    records: Vec<LineRecord>,
}

impl Chunk {
    /// Wraps a list of records as one iteration's chunk
    pub fn new(records: Vec<LineRecord>) -> Self {
        Self { records }
    }

    /// Records in the order they appeared in the log
    pub fn records(&self) -> &[LineRecord] {
        &self.records
    }

    /// Number of records in the chunk
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Splits a full log into one chunk per enumeration section.
///
/// The text before the first occurrence of `start` precedes any iteration
/// (job preamble, compiler chatter) and is discarded unparsed. Each remaining
/// fragment is truncated at the first occurrence of `end`, split into lines,
/// and parsed; empty lines are skipped.
///
/// # Arguments
/// * `text` - Complete log text
/// * `start` - Delimiter marking the beginning of an enumeration section
/// * `end` - Delimiter marking the end of a section's enumeration lines
///
/// # Returns
/// * `Ok(Vec<Chunk>)` with exactly one chunk per occurrence of `start`; the
///   vector is empty when the delimiter never occurs, and the caller decides
///   whether that is acceptable
/// * `Err(LogError)` if any enumeration line fails to parse
pub fn split_chunks(text: &str, start: &str, end: &str) -> Result<Vec<Chunk>, LogError> {
    text.split(start)
        .skip(1)
        .map(|section| {
            let body = match section.find(end) {
                Some(index) => &section[..index],
                None => section,
            };
            let records = body
                .lines()
                .filter(|line| !line.is_empty())
                .map(LineRecord::from_str)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Chunk::new(records))
        })
        .collect()
}

/// Splits a DreamCoder log on the standard section markers.
///
/// Equivalent to [`split_chunks`] with [`RESULTS_MARKER`] and
/// [`HITS_MARKER`].
pub fn split_log(text: &str) -> Result<Vec<Chunk>, LogError> {
    split_chunks(text, RESULTS_MARKER, HITS_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hit_line() {
        let record: LineRecord = "HIT wave1_foo_0".parse().unwrap();

        assert_eq!(record.status, Status::Hit);
        assert_eq!(record.test_case.wave, "wave1");
        assert_eq!(record.test_case.concept, "foo");
        assert_eq!(record.test_case.sample_index, "0");
    }

    #[test]
    fn test_parse_line_ignores_trailing_tokens() {
        let record: LineRecord = "MISS wave3_baz_12 w/ (lambda (fold $0 empty cons))"
            .parse()
            .unwrap();

        assert_eq!(record.status, Status::Miss);
        assert_eq!(record.test_case.wave, "wave3");
        assert_eq!(record.test_case.concept, "baz");
        assert_eq!(record.test_case.sample_index, "12");
    }

    #[test]
    fn test_parse_unknown_status_counts_as_miss() {
        let record: LineRecord = "TIMEOUT wave1_foo_0".parse().unwrap();

        assert_eq!(record.status, Status::Miss);
    }

    #[test]
    fn test_parse_hit_is_case_sensitive() {
        let record: LineRecord = "hit wave1_foo_0".parse().unwrap();

        assert_eq!(record.status, Status::Miss);
    }

    #[test]
    fn test_parse_line_with_too_few_tokens() {
        let result = "HIT".parse::<LineRecord>();

        match result {
            Err(LogError::TruncatedLine { line }) => assert_eq!(line, "HIT"),
            other => panic!("Expected TruncatedLine error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_identifier_with_wrong_delimiter() {
        let result = "HIT wave1-foo-0".parse::<LineRecord>();

        match result {
            Err(LogError::MalformedTestCase { token }) => assert_eq!(token, "wave1-foo-0"),
            other => panic!("Expected MalformedTestCase error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_identifier_with_too_many_parts() {
        let result = "wave1_count_up_3".parse::<TestCaseId>();

        assert!(matches!(
            result,
            Err(LogError::MalformedTestCase { .. })
        ));
    }

    #[test]
    fn test_parse_identifier_with_too_few_parts() {
        let result = "wave1_foo".parse::<TestCaseId>();

        assert!(matches!(
            result,
            Err(LogError::MalformedTestCase { .. })
        ));
    }

    #[test]
    fn test_split_single_section() {
        let text = "Generative model enumeration results:\n\
                    HIT wave1_foo_0\n\
                    MISS wave1_foo_1\n\
                    Hits 1/2 tasks\n";

        let chunks = split_log(text).unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 2);
        assert_eq!(chunks[0].records()[0].status, Status::Hit);
        assert_eq!(chunks[0].records()[1].status, Status::Miss);
    }

    #[test]
    fn test_split_discards_text_before_first_marker() {
        // The preamble is never parsed, so lines that would be malformed as
        // enumeration records are fine there.
        let text = "slurm job 1234 started\n\
                    loading checkpoint\n\
                    Generative model enumeration results:\n\
                    HIT wave1_foo_0\n\
                    Hits\n";

        let chunks = split_log(text).unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 1);
    }

    #[test]
    fn test_split_truncates_each_section_at_end_marker() {
        // Everything between "Hits" and the next start marker is dropped,
        // including lines that look like enumeration records.
        let text = "Generative model enumeration results:\n\
                    MISS wave1_foo_0\n\
                    Hits 0/1 tasks\n\
                    not an enumeration line\n\
                    Generative model enumeration results:\n\
                    HIT wave1_foo_0\n\
                    Hits 1/1 tasks\n\
                    trailing summary\n";

        let chunks = split_log(text).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 1);
        assert_eq!(chunks[1].len(), 1);
    }

    #[test]
    fn test_split_skips_blank_lines() {
        let text = "Generative model enumeration results:\n\
                    \n\
                    HIT wave1_foo_0\n\
                    \n\
                    MISS wave1_bar_0\n\
                    \n\
                    Hits\n";

        let chunks = split_log(text).unwrap();

        assert_eq!(chunks[0].len(), 2);
    }

    #[test]
    fn test_split_section_without_end_marker_runs_to_log_end() {
        let text = "Generative model enumeration results:\n\
                    HIT wave1_foo_0\n\
                    MISS wave1_foo_1\n";

        let chunks = split_log(text).unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 2);
    }

    #[test]
    fn test_split_without_any_marker_yields_no_chunks() {
        let chunks = split_log("no enumeration output in this log\n").unwrap();

        assert!(chunks.is_empty());
    }

    #[test]
    fn test_split_propagates_line_errors() {
        let text = "Generative model enumeration results:\n\
                    HIT wave1_foo_0\n\
                    HIT not-a-test-case\n\
                    Hits\n";

        let result = split_log(text);

        assert!(matches!(
            result,
            Err(LogError::MalformedTestCase { .. })
        ));
    }

    #[test]
    fn test_split_with_custom_markers() {
        let text = "BEGIN\nHIT w_c_0\nEND\nBEGIN\nMISS w_c_1\nEND\n";

        let chunks = split_chunks(text, "BEGIN", "END").unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 1);
        assert_eq!(chunks[1].len(), 1);
    }
}
