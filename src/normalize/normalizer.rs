use rayon::prelude::*;
use tracing::debug;

use super::histogram::{CumulativeDistribution, ScoreHistogram};
use crate::errors::{PipelineError, Result};
use crate::types::{InteractionRecord, NormalizedInteractionRecord};

/// A normalizer fitted to one complete record set.
///
/// `fit` is the synchronization point between ingestion and output: it needs
/// the full input, and nothing can be normalized before it returns. The
/// fitted distribution is read-only and shared across workers in `apply`.
#[derive(Debug, Clone)]
pub struct ScoreNormalizer {
    histogram: ScoreHistogram,
    distribution: CumulativeDistribution,
}

impl ScoreNormalizer {
    /// Counts scores and derives the cumulative distribution.
    ///
    /// Fails with `EmptyInput` when `records` is empty.
    pub fn fit(records: &[InteractionRecord]) -> Result<Self> {
        let histogram = ScoreHistogram::from_records(records);
        Self::from_histogram(histogram)
    }

    /// Fits from an already-built histogram.
    pub fn from_histogram(histogram: ScoreHistogram) -> Result<Self> {
        let distribution =
            CumulativeDistribution::from_histogram(&histogram).ok_or(PipelineError::EmptyInput)?;
        debug!(
            total = distribution.total(),
            max_score = ?histogram.max_observed().map(|s| s.value()),
            "score distribution fitted"
        );
        Ok(Self {
            histogram,
            distribution,
        })
    }

    pub fn histogram(&self) -> &ScoreHistogram {
        &self.histogram
    }

    pub fn distribution(&self) -> &CumulativeDistribution {
        &self.distribution
    }

    /// Replaces each record's score with its cumulative rank, in input order.
    ///
    /// `records` must be the set this normalizer was fitted on; a score not
    /// seen during fitting could rank at 0.
    pub fn apply(&self, records: Vec<InteractionRecord>) -> Vec<NormalizedInteractionRecord> {
        let distribution = &self.distribution;
        records
            .into_par_iter()
            .map(|record| NormalizedInteractionRecord {
                normalized_weight: distribution.weight(record.raw_score),
                source_id: record.source_id,
                target_id: record.target_id,
                raw_score: record.raw_score,
            })
            .collect()
    }
}

/// Fits and applies in one call.
pub fn normalize(records: Vec<InteractionRecord>) -> Result<Vec<NormalizedInteractionRecord>> {
    let normalizer = ScoreNormalizer::fit(&records)?;
    Ok(normalizer.apply(records))
}
