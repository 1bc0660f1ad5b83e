use genelinks::errors::PipelineError;
use genelinks::normalize::*;
use genelinks::types::*;

fn record(source: &str, target: &str, score: i64) -> InteractionRecord {
    InteractionRecord {
        source_id: CompoundId::parse(source).unwrap(),
        target_id: CompoundId::parse(target).unwrap(),
        raw_score: Score::new(score).unwrap(),
    }
}

fn records(scores: &[i64]) -> Vec<InteractionRecord> {
    scores
        .iter()
        .enumerate()
        .map(|(i, &s)| record(&format!("9606.S{i}"), &format!("9606.T{i}"), s))
        .collect()
}

#[test]
fn cumulative_rank_example() {
    let normalized = normalize(records(&[10, 10, 20])).unwrap();
    let weights: Vec<f64> = normalized.iter().map(|r| r.normalized_weight).collect();
    assert_eq!(weights, vec![2.0 / 3.0, 2.0 / 3.0, 1.0]);
}

#[test]
fn output_preserves_input_order() {
    let input = records(&[500, 100, 900, 100, 300]);
    let normalized = normalize(input.clone()).unwrap();
    assert_eq!(normalized.len(), input.len());
    for (before, after) in input.iter().zip(&normalized) {
        assert_eq!(before.source_id, after.source_id);
        assert_eq!(before.target_id, after.target_id);
        assert_eq!(before.raw_score, after.raw_score);
    }
}

#[test]
fn weights_are_monotonic_in_score() {
    let scores: Vec<i64> = (0..2000).map(|i| (i * 7919 % 1000) as i64).collect();
    let normalized = normalize(records(&scores)).unwrap();

    let mut pairs: Vec<(u16, f64)> = normalized
        .iter()
        .map(|r| (r.raw_score.value(), r.normalized_weight))
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    for window in pairs.windows(2) {
        assert!(
            window[0].1 <= window[1].1,
            "score {} weight {} > score {} weight {}",
            window[0].0,
            window[0].1,
            window[1].0,
            window[1].1
        );
    }
    for (_, weight) in &pairs {
        assert!(*weight > 0.0 && *weight <= 1.0);
    }
}

#[test]
fn max_score_maps_to_one() {
    let normalized = normalize(records(&[150, 999, 400, 999])).unwrap();
    assert_eq!(normalized[1].normalized_weight, 1.0);
    assert_eq!(normalized[3].normalized_weight, 1.0);
    assert_eq!(normalized[0].normalized_weight, 0.25);
}

#[test]
fn highest_observed_score_maps_to_one_below_max() {
    let normalized = normalize(records(&[1, 2, 3, 700])).unwrap();
    assert_eq!(normalized[3].normalized_weight, 1.0);
}

#[test]
fn single_record_has_weight_one() {
    let normalized = normalize(records(&[0])).unwrap();
    assert_eq!(normalized[0].normalized_weight, 1.0);
}

#[test]
fn empty_input_is_rejected() {
    let err = normalize(Vec::new()).unwrap_err();
    assert!(matches!(err, PipelineError::EmptyInput));
    assert!(ScoreNormalizer::fit(&[]).is_err());
}

#[test]
fn histogram_counts_and_prefix_sums() {
    let input = records(&[10, 10, 20, 999]);
    let histogram = ScoreHistogram::from_records(&input);
    assert_eq!(histogram.counts().len(), BUCKETS);
    assert_eq!(histogram.count(Score::new(10).unwrap()), 2);
    assert_eq!(histogram.count(Score::new(11).unwrap()), 0);
    assert_eq!(histogram.total(), 4);
    assert_eq!(histogram.max_observed(), Some(Score::new(999).unwrap()));

    let distribution = CumulativeDistribution::from_histogram(&histogram).unwrap();
    assert_eq!(distribution.cumulative(Score::new(9).unwrap()), 0);
    assert_eq!(distribution.cumulative(Score::new(10).unwrap()), 2);
    assert_eq!(distribution.cumulative(Score::new(500).unwrap()), 3);
    assert_eq!(distribution.cumulative(Score::new(999).unwrap()), 4);
    assert_eq!(distribution.total(), 4);
}

#[test]
fn parallel_and_sequential_histograms_agree() {
    let scores: Vec<i64> = (0..5000).map(|i| (i * 31 % 1000) as i64).collect();
    let input = records(&scores);
    let parallel = ScoreHistogram::from_records(&input);
    let sequential = ScoreHistogram::from_scores(input.iter().map(|r| r.raw_score));
    assert_eq!(parallel, sequential);
}

#[test]
fn empty_histogram_has_no_distribution() {
    let histogram = ScoreHistogram::from_scores(std::iter::empty());
    assert_eq!(histogram.total(), 0);
    assert!(histogram.max_observed().is_none());
    assert!(CumulativeDistribution::from_histogram(&histogram).is_none());
}

#[test]
fn fitted_normalizer_exposes_distribution() {
    let input = records(&[10, 10, 20]);
    let normalizer = ScoreNormalizer::fit(&input).unwrap();
    assert_eq!(normalizer.histogram().total(), 3);
    assert_eq!(normalizer.distribution().weight(Score::new(20).unwrap()), 1.0);
    let applied = normalizer.apply(input);
    assert_eq!(applied[0].normalized_weight, 2.0 / 3.0);
}
