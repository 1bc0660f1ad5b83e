/// Record readers.
///
/// Streams the raw interaction dataset into typed records and reads back the
/// stage-1 normalized CSV for the resolution-only workflow.
mod interactions;
mod normalized;

pub use interactions::{parse_line, read_interactions, InteractionReader};
pub use normalized::read_normalized;

use crate::config::PipelineConfig;
use crate::types::DEFAULT_NAMESPACE_SEPARATOR;

/// Parsing knobs shared by both readers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderOptions {
    /// `None` splits raw lines on runs of whitespace.
    pub field_separator: Option<char>,
    pub namespace_separator: char,
    /// Count and skip malformed records instead of failing on the first one.
    pub skip_malformed: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            field_separator: None,
            namespace_separator: DEFAULT_NAMESPACE_SEPARATOR,
            skip_malformed: false,
        }
    }
}

impl From<&PipelineConfig> for ReaderOptions {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            field_separator: config.field_separator,
            namespace_separator: config.namespace_separator,
            skip_malformed: config.skip_malformed,
        }
    }
}

/// Records read from one input file, plus the malformed lines skipped in
/// lenient mode.
#[derive(Debug, Clone)]
pub struct ReadOutcome<T> {
    pub records: Vec<T>,
    pub parse_errors: usize,
}

impl<T> Default for ReadOutcome<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            parse_errors: 0,
        }
    }
}
