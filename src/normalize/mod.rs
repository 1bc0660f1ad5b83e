/// Rank-based score normalization.
///
/// Turns raw combined scores into their empirical cumulative rank over the
/// whole input: `weight = count(score <= raw) / N`. The histogram has to see
/// every record before the first weight can be computed, so fitting and
/// applying are separate steps.
mod histogram;
mod normalizer;

pub use histogram::{CumulativeDistribution, ScoreHistogram, BUCKETS};
pub use normalizer::{normalize, ScoreNormalizer};
