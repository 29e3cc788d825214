use super::metrics_from;
use crate::analyzer::{AnalysisIssue, ModelMetadata, Verdict};
use std::collections::BTreeMap;

#[test]
fn test_new_computes_suggestions() {
    let metadata = ModelMetadata::new(
        true,
        true,
        metrics_from(&[(1, 10.0), (2, 12.0), (4, 30.0)]),
        metrics_from(&[(1, 5.0), (2, 6.0), (4, 20.0)]),
    );
    assert!(metadata.staged_train);
    assert_eq!(metadata.suggested_train_batch_size, Some(2));
    assert_eq!(metadata.suggested_eval_batch_size, Some(2));
    assert!(metadata.check(2).is_pass());
    assert!(!metadata.check(1).is_pass());
}

#[test]
fn test_fixed_batch_size_models_always_pass() {
    let metadata = ModelMetadata::new(
        false,
        false,
        BTreeMap::new(),
        metrics_from(&[(1, 10.0), (2, 5.0)]),
    );
    assert_eq!(metadata.suggested_train_batch_size, None);
    assert_eq!(metadata.check(64), Verdict::Pass);
}

#[test]
fn test_train_latency_is_checked_too() {
    let metadata = ModelMetadata::new(
        false,
        true,
        metrics_from(&[(1, 10.0), (2, 9.0)]),
        metrics_from(&[(1, 5.0), (2, 6.0)]),
    );
    assert_eq!(
        metadata.check(2),
        Verdict::Fail(vec![AnalysisIssue::NonMonotonicLatency {
            smaller: 1,
            larger: 2,
            smaller_latency_ms: 10.0,
            larger_latency_ms: 9.0,
        }])
    );
}

#[test]
fn test_metadata_serializes() {
    let metadata = ModelMetadata::new(false, true, BTreeMap::new(), metrics_from(&[(1, 5.0)]));
    let json = serde_json::to_value(&metadata).unwrap();
    assert_eq!(json["suggested_eval_batch_size"], 1);
    assert!(json["suggested_train_batch_size"].is_null());
    assert_eq!(json["eval_metrics_by_batch_size"]["1"]["latency_ms"], 5.0);
}

#[test]
fn test_from_sweep() {
    use crate::bench::{BenchResult, TimingStats};

    let stats = |mean_ms| TimingStats {
        samples: 1,
        min_ms: mean_ms,
        mean_ms,
        median_ms: mean_ms,
        max_ms: mean_ms,
    };
    let results = BTreeMap::from([
        (
            1,
            BenchResult {
                forward: stats(2.0),
                backward: stats(3.0),
            },
        ),
        (
            2,
            BenchResult {
                forward: stats(2.5),
                backward: stats(4.0),
            },
        ),
    ]);
    let metadata = ModelMetadata::from_sweep(true, &results);
    assert!(metadata.staged_train);
    assert_eq!(metadata.train_metrics_by_batch_size[&2].latency_ms, 6.5);
    assert_eq!(metadata.eval_metrics_by_batch_size[&2].latency_ms, 2.5);
    // 推理吞吐：1 -> 500/s，2 -> 800/s
    assert_eq!(metadata.suggested_eval_batch_size, Some(2));
    assert!(metadata.check(2).is_pass());
}
