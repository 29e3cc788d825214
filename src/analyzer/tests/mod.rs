mod metadata;

use super::ModelMetrics;
use std::collections::BTreeMap;

/// 由(批大小, 延迟ms)生成测量结果，吞吐按 批大小 / 延迟 计算
fn metrics_from(points: &[(usize, f64)]) -> BTreeMap<usize, ModelMetrics> {
    points
        .iter()
        .map(|&(batch_size, latency_ms)| {
            (
                batch_size,
                ModelMetrics {
                    batch_size,
                    latency_ms,
                    throughput: batch_size as f64 * 1000.0 / latency_ms,
                },
            )
        })
        .collect()
}
