use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{PipelineError, Result};

/// Upper bound of the combined-score scale used by the interaction dataset.
pub const MAX_SCORE: u16 = 999;

/// Default separator between the species prefix and the local identifier.
pub const DEFAULT_NAMESPACE_SEPARATOR: char = '.';

/// Header of the stage-1 normalized output.
pub const NORMALIZED_HEADER: [&str; 4] =
    ["protein1", "protein2", "combined_score", "new_combined_score"];

/// Header of the resolved edge output.
pub const RESOLVED_HEADER: [&str; 3] = ["node1", "node2", "weight"];

/// Header of the unresolved diagnostics output.
pub const UNRESOLVED_HEADER: [&str; 4] = ["protein1", "gene1", "protein2", "gene2"];

// ---------------------------------------------------------------------------
// Score
// ---------------------------------------------------------------------------

/// A combined score validated to lie in `0..=MAX_SCORE`.
///
/// Holding a `Score` is proof the value can index a histogram bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(u16);

impl Score {
    /// Validates a raw integer score.
    pub fn new(raw: i64) -> Result<Self> {
        if (0..=i64::from(MAX_SCORE)).contains(&raw) {
            Ok(Score(raw as u16))
        } else {
            Err(PipelineError::malformed(format!(
                "score {raw} is outside the range 0..={MAX_SCORE}"
            )))
        }
    }

    /// Parses a textual score, rejecting anything that is not a plain integer.
    pub fn parse(text: &str) -> Result<Self> {
        let raw: i64 = text
            .trim()
            .parse()
            .map_err(|_| PipelineError::malformed(format!("score '{text}' is not an integer")))?;
        Score::new(raw)
    }

    pub fn value(self) -> u16 {
        self.0
    }

    /// Histogram bucket for this score.
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// CompoundId
// ---------------------------------------------------------------------------

/// An external identifier of the form `<namespace><sep><local>`, e.g.
/// `9606.ENSP00000000233`.
///
/// The split happens at the *last* separator, so a namespace may itself
/// contain the separator but the local id never does.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompoundId {
    raw: String,
    /// Byte range of the separator, `None` when the id has no namespace.
    separator: Option<(usize, usize)>,
}

impl CompoundId {
    /// Parses with the default `.` separator.
    pub fn parse(raw: &str) -> Result<Self> {
        Self::parse_with(raw, DEFAULT_NAMESPACE_SEPARATOR)
    }

    /// Parses using the given namespace separator.
    ///
    /// An identifier without the separator is all local id. An empty local
    /// id is rejected.
    pub fn parse_with(raw: &str, separator: char) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(PipelineError::malformed("empty identifier"));
        }
        let separator = raw
            .rfind(separator)
            .map(|pos| (pos, pos + separator.len_utf8()));
        let local_start = separator.map_or(0, |(_, end)| end);
        if local_start >= raw.len() {
            return Err(PipelineError::malformed(format!(
                "identifier '{raw}' has an empty local part"
            )));
        }
        Ok(CompoundId {
            raw: raw.to_string(),
            separator,
        })
    }

    /// The species/namespace prefix, empty when the identifier had none.
    pub fn namespace(&self) -> &str {
        match self.separator {
            Some((start, _)) => &self.raw[..start],
            None => "",
        }
    }

    /// The semantically significant part used for resolution.
    pub fn local_id(&self) -> &str {
        match self.separator {
            Some((_, end)) => &self.raw[end..],
            None => &self.raw,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for CompoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One raw line of the interaction dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionRecord {
    pub source_id: CompoundId,
    pub target_id: CompoundId,
    pub raw_score: Score,
}

/// An interaction whose score has been replaced by its cumulative rank.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedInteractionRecord {
    pub source_id: CompoundId,
    pub target_id: CompoundId,
    /// Original score, kept for the `combined_score` column.
    pub raw_score: Score,
    /// `cumulative[raw_score] / N`, always in `(0, 1]`.
    pub normalized_weight: f64,
}

/// An interaction whose endpoints both mapped to gene identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedEdge {
    pub source_gene: String,
    pub target_gene: String,
    pub weight: f64,
}

/// Diagnostic row for an interaction with at least one unmapped endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedEntry {
    pub source_local_id: String,
    /// `None` when the source side failed to resolve.
    pub source_gene: Option<String>,
    pub target_local_id: String,
    /// `None` when the target side failed to resolve.
    pub target_gene: Option<String>,
}

impl UnresolvedEntry {
    pub fn source_missing(&self) -> bool {
        self.source_gene.is_none()
    }

    pub fn target_missing(&self) -> bool {
        self.target_gene.is_none()
    }
}

/// Outcome of resolving a single normalized record.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved(ResolvedEdge),
    Unresolved(UnresolvedEntry),
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

/// Which part of the pipeline a run covered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Score normalization only.
    Normalize,
    /// Identifier resolution of an already normalized file.
    Resolve,
    /// Both stages.
    #[default]
    Full,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Normalize => "normalize",
            Stage::Resolve => "resolve",
            Stage::Full => "full",
        }
    }
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub stage: Stage,
    /// Records that entered normalization/resolution (`N`).
    pub total_records: usize,
    pub resolved: usize,
    pub unresolved: usize,
    /// Malformed lines skipped in lenient mode; always 0 in strict mode.
    pub parse_errors: usize,
    /// Distinct local ids in the identifier index (0 for `normalize`).
    pub index_size: usize,
    /// Reference rows that overwrote an earlier mapping.
    pub duplicate_mappings: usize,
    pub duration_ms: u64,
}

impl RunSummary {
    /// `resolved + unresolved == total_records` for runs that resolve;
    /// normalize-only runs have nothing to reconcile.
    pub fn is_consistent(&self) -> bool {
        match self.stage {
            Stage::Normalize => self.resolved == 0 && self.unresolved == 0,
            Stage::Resolve | Stage::Full => self.resolved + self.unresolved == self.total_records,
        }
    }
}
