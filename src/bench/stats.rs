use serde::Serialize;
use std::time::Duration;

/// 一组计时样本的统计量（毫秒）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimingStats {
    pub samples: usize,
    pub min_ms: f64,
    pub mean_ms: f64,
    pub median_ms: f64,
    pub max_ms: f64,
}

impl TimingStats {
    /// 样本为空时返回None
    pub fn from_samples(samples: &[Duration]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mut sorted = samples
            .iter()
            .map(|d| d.as_secs_f64() * 1000.0)
            .collect::<Vec<_>>();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let median_ms = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };
        Some(Self {
            samples: n,
            min_ms: sorted[0],
            mean_ms: sorted.iter().sum::<f64>() / n as f64,
            median_ms,
            max_ms: sorted[n - 1],
        })
    }
}
