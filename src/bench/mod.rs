/*
 * @Author       : 老董
 * @Date         : 2026-02-13
 * @Description  : 基准驱动：分别计时 forward 与 backward，并按批大小扫描
 */

mod stats;

pub use stats::TimingStats;

use crate::analyzer::batch_size_sweep;
use crate::rnns::{FactoryError, LstmConfig, ModelDefinition, create};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BenchError {
    #[error("计时轮数必须为正数")]
    NoIterations,
    #[error(transparent)]
    Factory(#[from] FactoryError),
}

/// 预热轮数与计时轮数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    pub warmup: usize,
    pub iterations: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            warmup: 2,
            iterations: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BenchResult {
    pub forward: TimingStats,
    pub backward: TimingStats,
}

/// 执行一轮：forward 与 backward 分别计时，backward_setup 不计入
fn run_round(definition: &ModelDefinition) -> Result<(Duration, Duration), FactoryError> {
    definition.reset()?;

    let start = Instant::now();
    let outputs = definition.run_forward()?;
    let forward_time = start.elapsed();

    let backward_inputs = definition.backward_setup(&outputs)?;
    let start = Instant::now();
    definition.backward(&backward_inputs)?;
    let backward_time = start.elapsed();

    Ok((forward_time, backward_time))
}

/// 先做`warmup`轮不计时的 forward + backward，再做`iterations`轮计时。
/// 每轮开始前把图恢复到构造时的状态，图不会随轮数增长
pub fn run_bench(definition: &ModelDefinition, config: &BenchConfig) -> Result<BenchResult, BenchError> {
    if config.iterations == 0 {
        return Err(BenchError::NoIterations);
    }
    for _ in 0..config.warmup {
        run_round(definition)?;
    }

    let mut forward = Vec::with_capacity(config.iterations);
    let mut backward = Vec::with_capacity(config.iterations);
    for i in 0..config.iterations {
        let (fwd, bwd) = run_round(definition)?;
        debug!("第{i}轮：forward {fwd:?}，backward {bwd:?}");
        forward.push(fwd);
        backward.push(bwd);
    }
    definition.reset()?;

    let (Some(forward), Some(backward)) = (
        TimingStats::from_samples(&forward),
        TimingStats::from_samples(&backward),
    ) else {
        return Err(BenchError::NoIterations);
    };
    info!(
        "{}（batch={}）：forward 均值{:.3}ms，backward 均值{:.3}ms",
        definition.config().strategy(),
        definition.config().batch_size(),
        forward.mean_ms,
        backward.mean_ms
    );
    Ok(BenchResult { forward, backward })
}

/// 按 1, 2, 4, … 直到`max_batch_size`逐个批大小创建模型并计时。
/// 遇到设备无法容纳的批大小时停止，已测得的结果照常返回
pub fn sweep_batch_sizes(
    config: &LstmConfig,
    bench: &BenchConfig,
    max_batch_size: usize,
) -> Result<BTreeMap<usize, BenchResult>, BenchError> {
    let mut results = BTreeMap::new();
    for batch_size in batch_size_sweep(max_batch_size) {
        let definition = match create(&config.with_batch_size(batch_size)?) {
            Ok(definition) => definition,
            Err(FactoryError::DeviceUnavailable(reason)) => {
                warn!("批大小{batch_size}处停止扫描：{reason}");
                break;
            }
            Err(e) => return Err(e.into()),
        };
        results.insert(batch_size, run_bench(&definition, bench)?);
    }
    Ok(results)
}
