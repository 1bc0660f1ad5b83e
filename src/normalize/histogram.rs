use rayon::prelude::*;

use crate::types::{InteractionRecord, Score, MAX_SCORE};

/// Number of histogram buckets, one per score in `0..=MAX_SCORE`.
pub const BUCKETS: usize = MAX_SCORE as usize + 1;

/// Count of records per raw score. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreHistogram {
    counts: Vec<u64>,
}

impl ScoreHistogram {
    /// Builds the histogram sequentially from a score stream.
    pub fn from_scores<I>(scores: I) -> Self
    where
        I: IntoIterator<Item = Score>,
    {
        let mut counts = vec![0u64; BUCKETS];
        for score in scores {
            counts[score.index()] += 1;
        }
        Self { counts }
    }

    /// Builds the histogram over a record slice, counting shards in parallel
    /// and summing them.
    pub fn from_records(records: &[InteractionRecord]) -> Self {
        let counts = records
            .par_iter()
            .fold(
                || vec![0u64; BUCKETS],
                |mut acc, record| {
                    acc[record.raw_score.index()] += 1;
                    acc
                },
            )
            .reduce(
                || vec![0u64; BUCKETS],
                |mut left, right| {
                    for (l, r) in left.iter_mut().zip(right) {
                        *l += r;
                    }
                    left
                },
            );
        Self { counts }
    }

    /// Records with exactly this score.
    pub fn count(&self, score: Score) -> u64 {
        self.counts[score.index()]
    }

    /// Total number of records (`N`).
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Highest score with a non-zero count.
    pub fn max_observed(&self) -> Option<Score> {
        self.counts
            .iter()
            .rposition(|&c| c > 0)
            .and_then(|i| Score::new(i as i64).ok())
    }
}

/// Prefix sums of a [`ScoreHistogram`]: `cumulative(s)` is the number of
/// records with a score `<= s`. Non-decreasing, ending at `N`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CumulativeDistribution {
    cumulative: Vec<u64>,
    total: u64,
}

impl CumulativeDistribution {
    /// Prefix-sums the histogram. Returns `None` for an empty histogram,
    /// which has no distribution to rank against.
    pub fn from_histogram(histogram: &ScoreHistogram) -> Option<Self> {
        let cumulative: Vec<u64> = histogram
            .counts()
            .iter()
            .scan(0u64, |running, &count| {
                *running += count;
                Some(*running)
            })
            .collect();
        let total = cumulative.last().copied().unwrap_or(0);
        if total == 0 {
            return None;
        }
        Some(Self { cumulative, total })
    }

    pub fn cumulative(&self, score: Score) -> u64 {
        self.cumulative[score.index()]
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Empirical cumulative rank of `score`, in `[0, 1]`. Scores present in
    /// the fitted input always rank above 0.
    pub fn weight(&self, score: Score) -> f64 {
        self.cumulative(score) as f64 / self.total as f64
    }
}
