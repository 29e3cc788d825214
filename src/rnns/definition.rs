/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : ModelDefinition：输入、参数、forward、backward_setup、backward 的打包
 */

use super::inputs::ModelInput;
use super::strategy::ForwardStrategy;
use super::{FactoryError, LstmConfig};
use crate::nn::{Graph, Var, Watermark};
use crate::tensor::Tensor;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// forward 的输出
#[derive(Debug, Clone)]
pub enum ModelOutput {
    /// 输出序列`[T, B, H]`与最终状态
    Sequence { output: Var, hidden: (Var, Var) },
    /// 只有最终状态（不收集每步输出的策略）
    State { hidden: Var, cell: Var },
}

impl ModelOutput {
    /// 首个分量：输出序列，或者没有序列时的 hidden
    pub const fn primary(&self) -> &Var {
        match self {
            Self::Sequence { output, .. } => output,
            Self::State { hidden, .. } => hidden,
        }
    }

    /// 最终的 hidden 状态
    pub const fn hidden(&self) -> &Var {
        match self {
            Self::Sequence { hidden, .. } => &hidden.0,
            Self::State { hidden, .. } => hidden,
        }
    }

    /// 最终的 cell 状态
    pub const fn cell(&self) -> &Var {
        match self {
            Self::Sequence { hidden, .. } => &hidden.1,
            Self::State { cell, .. } => cell,
        }
    }
}

/// backward 的输入：反向传播的起点与上游梯度种子
#[derive(Debug, Clone)]
pub struct BackwardInputs {
    pub value: Var,
    pub grad_seed: Option<Tensor>,
}

type SetupFn = Box<dyn Fn(&ModelOutput) -> Result<BackwardInputs, FactoryError>>;
type BackwardFn = Box<dyn Fn(&BackwardInputs) -> Result<(), FactoryError>>;

/// forward 输出 → (value, 梯度种子)
pub enum BackwardSetup {
    /// 原样传出首个分量，不带种子
    Identity,
    Custom(SetupFn),
}

impl BackwardSetup {
    pub fn apply(&self, outputs: &ModelOutput) -> Result<BackwardInputs, FactoryError> {
        match self {
            Self::Identity => Ok(BackwardInputs {
                value: outputs.primary().clone(),
                grad_seed: None,
            }),
            Self::Custom(f) => f(outputs),
        }
    }
}

/// (value, 梯度种子) → 触发反向传播
pub enum Backward {
    NoOp,
    Custom(BackwardFn),
}

impl Backward {
    pub fn apply(&self, inputs: &BackwardInputs) -> Result<(), FactoryError> {
        match self {
            Self::NoOp => Ok(()),
            Self::Custom(f) => f(inputs),
        }
    }
}

/// 为`value`合成同形状的标准正态梯度种子。给定`seed`时每次调用得到相同的种子张量
pub fn simple_backward_setup(value: &Var, seed: Option<u64>) -> Result<BackwardInputs, FactoryError> {
    let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
    let shape = value.value_expected_shape()?;
    Ok(BackwardInputs {
        value: value.clone(),
        grad_seed: Some(Tensor::normal_with_rng(0.0, 1.0, &shape, &mut rng)),
    })
}

/// 取 forward 输出的首个分量（丢弃 cell 状态），再合成梯度种子
pub fn lstm_backward_setup(
    outputs: &ModelOutput,
    seed: Option<u64>,
) -> Result<BackwardInputs, FactoryError> {
    simple_backward_setup(outputs.primary(), seed)
}

/// 以`grad_seed`为上游梯度从`value`开始反向传播，梯度累积到可达的参数上。
///
/// 没有种子时只接受只含1个元素的`value`（种子取1）。
pub fn simple_backward(inputs: &BackwardInputs) -> Result<(), FactoryError> {
    let seed = match &inputs.grad_seed {
        Some(seed) => seed.clone(),
        None => {
            let value = inputs.value.value()?;
            if value.size() != 1 {
                return Err(FactoryError::InvalidConfiguration(format!(
                    "形状为{:?}的输出需要显式的梯度种子",
                    value.shape()
                )));
            }
            Tensor::ones_like(&value)
        }
    };
    inputs.value.backward_with_grad(&seed)?;
    Ok(())
}

/// 一次工厂调用的产物。除了 backward 对参数梯度的累积，构造后不再变化
pub struct ModelDefinition {
    graph: Graph,
    inputs: Vec<ModelInput>,
    parameters: Vec<Var>,
    forward: Box<dyn ForwardStrategy>,
    backward_setup: BackwardSetup,
    backward: Backward,
    config: LstmConfig,
    watermark: Watermark,
}

impl ModelDefinition {
    /// 组装定义。水位线取在此刻，之后`reset`会删掉此后创建的所有节点
    pub fn new(
        graph: Graph,
        inputs: Vec<ModelInput>,
        parameters: Vec<Var>,
        forward: Box<dyn ForwardStrategy>,
        backward_setup: BackwardSetup,
        backward: Backward,
        config: LstmConfig,
    ) -> Self {
        let watermark = graph.watermark();
        Self {
            graph,
            inputs,
            parameters,
            forward,
            backward_setup,
            backward,
            config,
            watermark,
        }
    }

    pub fn inputs(&self) -> &[ModelInput] {
        &self.inputs
    }

    /// 需要累积梯度的全部参数，逐层按 w_ih、w_hh、b_ih、b_hh 排列
    pub fn parameters(&self) -> &[Var] {
        &self.parameters
    }

    pub const fn graph(&self) -> &Graph {
        &self.graph
    }

    pub const fn config(&self) -> &LstmConfig {
        &self.config
    }

    pub fn strategy(&self) -> &dyn ForwardStrategy {
        self.forward.as_ref()
    }

    /// 以位置参数调用 forward，参数个数必须与`inputs()`一致
    pub fn forward(&self, inputs: &[ModelInput]) -> Result<ModelOutput, FactoryError> {
        let expected = self.forward.arity();
        if inputs.len() != expected {
            return Err(FactoryError::ArityMismatch {
                expected,
                got: inputs.len(),
            });
        }
        self.forward.forward(inputs)
    }

    /// 用工厂合成的输入调用 forward
    pub fn run_forward(&self) -> Result<ModelOutput, FactoryError> {
        self.forward(&self.inputs)
    }

    pub fn backward_setup(&self, outputs: &ModelOutput) -> Result<BackwardInputs, FactoryError> {
        self.backward_setup.apply(outputs)
    }

    pub fn backward(&self, inputs: &BackwardInputs) -> Result<(), FactoryError> {
        self.backward.apply(inputs)
    }

    /// 删除构造之后创建的所有节点并清零梯度，供反复计时使用
    pub fn reset(&self) -> Result<(), FactoryError> {
        self.graph.truncate_to(self.watermark);
        self.graph.zero_grad()?;
        Ok(())
    }
}

impl std::fmt::Debug for ModelDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelDefinition")
            .field("strategy", &self.forward.strategy())
            .field("config", &self.config)
            .field("inputs", &self.inputs.len())
            .field("parameters", &self.parameters.len())
            .finish_non_exhaustive()
    }
}
