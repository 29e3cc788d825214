use super::{AnalysisIssue, ModelMetrics, Verdict, analyze, suggest_batch_size};
use crate::bench::BenchResult;
use serde::Serialize;
use std::collections::BTreeMap;

/// 一个模型的元数据：是否支持分阶段训练、是否允许自定义批大小，以及训练/推理的扫描结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelMetadata {
    pub staged_train: bool,
    pub allow_customize_batch_size: bool,
    pub train_metrics_by_batch_size: BTreeMap<usize, ModelMetrics>,
    pub eval_metrics_by_batch_size: BTreeMap<usize, ModelMetrics>,
    pub suggested_train_batch_size: Option<usize>,
    pub suggested_eval_batch_size: Option<usize>,
}

impl ModelMetadata {
    /// 由扫描结果生成元数据，建议批大小按吞吐最高者计算
    pub fn new(
        staged_train: bool,
        allow_customize_batch_size: bool,
        train_metrics_by_batch_size: BTreeMap<usize, ModelMetrics>,
        eval_metrics_by_batch_size: BTreeMap<usize, ModelMetrics>,
    ) -> Self {
        Self {
            staged_train,
            allow_customize_batch_size,
            suggested_train_batch_size: suggest_batch_size(&train_metrics_by_batch_size),
            suggested_eval_batch_size: suggest_batch_size(&eval_metrics_by_batch_size),
            train_metrics_by_batch_size,
            eval_metrics_by_batch_size,
        }
    }

    /// 由批大小扫描的计时结果生成元数据：训练指标计 forward + backward，推理指标只计 forward。
    /// forward 与 backward 是分开计时的，所以`staged_train`为真
    pub fn from_sweep(
        allow_customize_batch_size: bool,
        results: &BTreeMap<usize, BenchResult>,
    ) -> Self {
        let train = results
            .iter()
            .map(|(&b, result)| (b, ModelMetrics::from_bench(b, result)))
            .collect();
        let eval = results
            .iter()
            .map(|(&b, result)| (b, ModelMetrics::from_forward(b, result)))
            .collect();
        Self::new(true, allow_customize_batch_size, train, eval)
    }

    /// 不允许自定义批大小的模型直接通过。
    /// 否则推理结果要满足单调性且建议值与`default_eval_batch_size`一致，训练结果（若有）要满足单调性
    pub fn check(&self, default_eval_batch_size: usize) -> Verdict {
        if !self.allow_customize_batch_size {
            return Verdict::Pass;
        }
        let eval = analyze(&self.eval_metrics_by_batch_size, default_eval_batch_size);
        let mut issues = match eval.verdict {
            Verdict::Pass => Vec::new(),
            Verdict::Fail(issues) => issues,
        };
        // 训练的建议值不与默认值比较，只检查单调性
        let train = self
            .suggested_train_batch_size
            .map(|suggested| analyze(&self.train_metrics_by_batch_size, suggested).verdict);
        if let Some(Verdict::Fail(train_issues)) = train {
            issues.extend(
                train_issues
                    .into_iter()
                    .filter(|issue| matches!(issue, AnalysisIssue::NonMonotonicLatency { .. })),
            );
        }
        Verdict::from_issues(issues)
    }
}
