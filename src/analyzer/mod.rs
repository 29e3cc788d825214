/*
 * @Author       : 老董
 * @Date         : 2026-02-13
 * @Description  : 批大小扫描结果的分析：给出建议批大小，并判断模型表现是否随批大小合理变化
 *
 * 允许自定义批大小的模型需要满足：
 * 1. 延迟随批大小增大而不减小
 * 2. 建议的批大小（吞吐最高者）与默认批大小一致
 */

mod metadata;

pub use metadata::ModelMetadata;

use crate::bench::BenchResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// 扫描的批大小上限：1, 2, 4, …, 4096，或在设备放不下时提前停止
pub const DEFAULT_MAX_BATCH_SIZE: usize = 4096;

/// 延迟的下限（1ns，`Instant`的分辨率），保证吞吐总是有限值，能在JSON中往返
pub const MIN_LATENCY_MS: f64 = 1e-6;

/// 不超过`max_batch_size`的全部2的幂（从1开始）
pub fn batch_size_sweep(max_batch_size: usize) -> Vec<usize> {
    std::iter::successors(Some(1_usize), |&b| b.checked_mul(2))
        .take_while(|&b| b <= max_batch_size)
        .collect()
}

/// 单个批大小下的测量结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub batch_size: usize,
    pub latency_ms: f64,
    /// 每秒处理的样本数
    pub throughput: f64,
}

impl ModelMetrics {
    fn with_latency(batch_size: usize, latency_ms: f64) -> Self {
        let latency_ms = latency_ms.max(MIN_LATENCY_MS);
        Self {
            batch_size,
            latency_ms,
            throughput: batch_size as f64 * 1000.0 / latency_ms,
        }
    }

    /// 训练指标：forward + backward 的平均耗时
    pub fn from_bench(batch_size: usize, result: &BenchResult) -> Self {
        Self::with_latency(batch_size, result.forward.mean_ms + result.backward.mean_ms)
    }

    /// 推理指标：只计 forward 的平均耗时
    pub fn from_forward(batch_size: usize, result: &BenchResult) -> Self {
        Self::with_latency(batch_size, result.forward.mean_ms)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum AnalysisIssue {
    #[error("没有任何批大小的测量结果")]
    NoMetrics,
    #[error("延迟没有随批大小增大：批大小{smaller}为{smaller_latency_ms:.3}ms，批大小{larger}却只有{larger_latency_ms:.3}ms")]
    NonMonotonicLatency {
        smaller: usize,
        larger: usize,
        smaller_latency_ms: f64,
        larger_latency_ms: f64,
    },
    #[error("建议的批大小{suggested}与默认值{default}不一致")]
    SuggestionMismatch { suggested: usize, default: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Verdict {
    Pass,
    Fail(Vec<AnalysisIssue>),
}

impl Verdict {
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    fn from_issues(issues: Vec<AnalysisIssue>) -> Self {
        if issues.is_empty() {
            Self::Pass
        } else {
            Self::Fail(issues)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub suggested_batch_size: Option<usize>,
    pub verdict: Verdict,
}

/// 吞吐最高的批大小；吞吐相同时取较小的批大小
pub fn suggest_batch_size(metrics: &BTreeMap<usize, ModelMetrics>) -> Option<usize> {
    let mut best: Option<&ModelMetrics> = None;
    for m in metrics.values() {
        if best.is_none_or(|b| m.throughput > b.throughput) {
            best = Some(m);
        }
    }
    best.map(|m| m.batch_size)
}

/// 检查延迟随批大小单调不减，返回所有违反的相邻对
fn latency_issues(metrics: &BTreeMap<usize, ModelMetrics>) -> Vec<AnalysisIssue> {
    metrics
        .iter()
        .zip(metrics.iter().skip(1))
        .filter(|((_, small), (_, large))| large.latency_ms < small.latency_ms)
        .map(|((&smaller, small), (&larger, large))| AnalysisIssue::NonMonotonicLatency {
            smaller,
            larger,
            smaller_latency_ms: small.latency_ms,
            larger_latency_ms: large.latency_ms,
        })
        .collect()
}

/// 分析一组按批大小索引的测量结果
pub fn analyze(metrics: &BTreeMap<usize, ModelMetrics>, default_batch_size: usize) -> AnalysisReport {
    let suggested_batch_size = suggest_batch_size(metrics);
    let mut issues = latency_issues(metrics);
    match suggested_batch_size {
        None => issues.push(AnalysisIssue::NoMetrics),
        Some(suggested) if suggested != default_batch_size => {
            issues.push(AnalysisIssue::SuggestionMismatch {
                suggested,
                default: default_batch_size,
            });
        }
        Some(_) => {}
    }
    AnalysisReport {
        suggested_batch_size,
        verdict: Verdict::from_issues(issues),
    }
}

#[cfg(test)]
mod tests;
