/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : 四种前向策略。策略在工厂构造时一次性确定，热循环里不再分支。
 *
 * 每种策略由两个内核组成：单步函数（cell）与时间步驱动函数（driver）。
 * 开启编译时两者分别经`jit::compile`编译；driver 在追踪时调用 cell，
 * 所以 driver 的程序里内联了整条序列的展开。
 */

use super::cells::{flat_lstm_cell, lstm_cell, premul_lstm_cell};
use super::definition::ModelOutput;
use super::inputs::{ModelInput, PARAMS_STRIDE};
use super::{FactoryError, LstmConfig, Strategy};
use crate::nn::jit::{TracedFn, compile};
use crate::nn::{GraphError, Var};

type KernelFn = Box<dyn Fn(&[Var]) -> Result<Vec<Var>, GraphError>>;

/// 即时执行或编译后执行的函数
enum Kernel {
    Eager(KernelFn),
    Compiled(TracedFn<KernelFn>),
}

impl Kernel {
    fn new<F>(name: &str, compiled: bool, f: F) -> Self
    where
        F: Fn(&[Var]) -> Result<Vec<Var>, GraphError> + 'static,
    {
        let f: KernelFn = Box::new(f);
        if compiled {
            Self::Compiled(compile(name, f))
        } else {
            Self::Eager(f)
        }
    }

    fn call(&self, args: &[Var]) -> Result<Vec<Var>, GraphError> {
        match self {
            Self::Eager(f) => f(args),
            Self::Compiled(traced) => traced.call(args),
        }
    }

    /// 调用并把输出解成定长数组
    fn call_n<const N: usize>(&self, args: &[Var]) -> Result<[Var; N], GraphError> {
        let outputs = self.call(args)?;
        let got = outputs.len();
        <[Var; N]>::try_from(outputs).map_err(|_| {
            GraphError::ComputationError(format!("内核应返回{N}个输出，实际返回{got}个"))
        })
    }
}

fn kernel_arity_error(name: &str, expected: usize, got: usize) -> GraphError {
    GraphError::InvalidOperation(format!("{name}需要{expected}个参数，但收到{got}个"))
}

/// 标准 cell 的内核：`[x_t, hx, cx, w_ih, w_hh, b_ih, b_hh] -> [hy, cy]`
fn lstm_cell_kernel(name: &'static str, compiled: bool) -> Kernel {
    Kernel::new(
        name,
        compiled,
        move |args: &[Var]| {
            let [input, hx, cx, w_ih, w_hh, b_ih, b_hh] = args else {
                return Err(kernel_arity_error(name, 7, args.len()));
            };
            let (hy, cy) = lstm_cell(input, (hx, cx), w_ih, w_hh, b_ih, b_hh)?;
            Ok(vec![hy, cy])
        },
    )
}

/// 前向策略：输入张量与参数 → 输出
pub trait ForwardStrategy {
    fn strategy(&self) -> Strategy;

    /// forward 接受的位置参数个数
    fn arity(&self) -> usize;

    fn forward(&self, inputs: &[ModelInput]) -> Result<ModelOutput, FactoryError>;
}

/// 根据配置选出策略实现
pub fn strategy_for(config: &LstmConfig) -> Box<dyn ForwardStrategy> {
    let compiled = config.compile();
    match config.strategy() {
        Strategy::Standard => Box::new(StandardLstm::new(compiled)),
        Strategy::Premultiplied => Box::new(PremulLstm::new(compiled)),
        Strategy::Flat => Box::new(FlatLstm::new(compiled)),
        Strategy::Multilayer => Box::new(MultilayerLstm::new(compiled, config.num_layers())),
    }
}

fn arity_mismatch(expected: usize, inputs: &[ModelInput]) -> FactoryError {
    FactoryError::ArityMismatch {
        expected,
        got: inputs.len(),
    }
}

// ==================== Standard ====================

/// 每步计算`x_t @ w_ih^T`，输出逐步收集后堆叠
pub struct StandardLstm {
    driver: Kernel,
}

impl StandardLstm {
    pub fn new(compiled: bool) -> Self {
        let cell = lstm_cell_kernel("lstm_cell", compiled);
        let driver = Kernel::new(
            "lstm",
            compiled,
            move |args: &[Var]| {
                let [x, hx, cx, weights @ ..] = args else {
                    return Err(kernel_arity_error("lstm", 7, args.len()));
                };
                let mut hy = hx.select(0)?;
                let mut cy = cx.select(0)?;
                let mut outputs = Vec::new();
                for x_t in x.unbind()? {
                    let mut step_args = vec![x_t, hy, cy];
                    step_args.extend_from_slice(weights);
                    [hy, cy] = cell.call_n(&step_args)?;
                    outputs.push(hy.clone());
                }
                Ok(vec![Var::stack(&outputs)?, hy.unsqueeze(0)?, cy.unsqueeze(0)?])
            },
        );
        Self { driver }
    }
}

impl ForwardStrategy for StandardLstm {
    fn strategy(&self) -> Strategy {
        Strategy::Standard
    }

    fn arity(&self) -> usize {
        6
    }

    fn forward(&self, inputs: &[ModelInput]) -> Result<ModelOutput, FactoryError> {
        single_layer_forward(&self.driver, inputs)
    }
}

/// Standard 与 Premultiplied 共用的调用约定：`x, (hx, cx), w_ih, w_hh, b_ih, b_hh`
fn single_layer_forward(
    driver: &Kernel,
    inputs: &[ModelInput],
) -> Result<ModelOutput, FactoryError> {
    let [x, hidden, w_ih, w_hh, b_ih, b_hh] = inputs else {
        return Err(arity_mismatch(6, inputs));
    };
    let (hx, cx) = hidden.as_pair()?;
    let args = [
        x.as_tensor()?.clone(),
        hx.clone(),
        cx.clone(),
        w_ih.as_tensor()?.clone(),
        w_hh.as_tensor()?.clone(),
        b_ih.as_tensor()?.clone(),
        b_hh.as_tensor()?.clone(),
    ];
    let [output, hy, cy] = driver.call_n(&args)?;
    Ok(ModelOutput::Sequence {
        output,
        hidden: (hy, cy),
    })
}

// ==================== Premultiplied ====================

/// 循环前用一次矩阵乘法算好整段序列的输入投影
pub struct PremulLstm {
    driver: Kernel,
}

impl PremulLstm {
    pub fn new(compiled: bool) -> Self {
        let cell = Kernel::new(
            "premul_lstm_cell",
            compiled,
            |args: &[Var]| {
                let [igates, hx, cx, w_hh, b_ih, b_hh] = args else {
                    return Err(kernel_arity_error("premul_lstm_cell", 6, args.len()));
                };
                let (hy, cy) = premul_lstm_cell(igates, (hx, cx), w_hh, b_ih, b_hh)?;
                Ok(vec![hy, cy])
            },
        );
        let driver = Kernel::new(
            "lstm_premul",
            compiled,
            move |args: &[Var]| {
                let [x, hx, cx, w_ih, w_hh, b_ih, b_hh] = args else {
                    return Err(kernel_arity_error("lstm_premul", 7, args.len()));
                };
                let shape = x.value_expected_shape()?;
                let &[seq_len, batch, input_size] = shape.as_slice() else {
                    return Err(GraphError::InvalidOperation(format!(
                        "输入序列应为[T, B, I]，实际形状为{shape:?}"
                    )));
                };
                // [T*B, I] @ [I, 4H] -> [T, B, 4H]
                let projected = x
                    .reshape(&[seq_len * batch, input_size])?
                    .matmul(&w_ih.t()?)?;
                let gate_width = projected.value_expected_shape()?[1];
                let igates = projected.reshape(&[seq_len, batch, gate_width])?;

                let mut hy = hx.select(0)?;
                let mut cy = cx.select(0)?;
                let mut outputs = Vec::new();
                for igates_t in igates.unbind()? {
                    let step_args = [
                        igates_t,
                        hy,
                        cy,
                        w_hh.clone(),
                        b_ih.clone(),
                        b_hh.clone(),
                    ];
                    [hy, cy] = cell.call_n(&step_args)?;
                    outputs.push(hy.clone());
                }
                Ok(vec![Var::stack(&outputs)?, hy.unsqueeze(0)?, cy.unsqueeze(0)?])
            },
        );
        Self { driver }
    }
}

impl ForwardStrategy for PremulLstm {
    fn strategy(&self) -> Strategy {
        Strategy::Premultiplied
    }

    fn arity(&self) -> usize {
        6
    }

    fn forward(&self, inputs: &[ModelInput]) -> Result<ModelOutput, FactoryError> {
        single_layer_forward(&self.driver, inputs)
    }
}

// ==================== Flat ====================

/// 参数全部平铺，不收集每步输出，只返回最终状态
pub struct FlatLstm {
    driver: Kernel,
}

impl FlatLstm {
    pub fn new(compiled: bool) -> Self {
        let cell = Kernel::new(
            "flat_lstm_cell",
            compiled,
            |args: &[Var]| {
                let [input, hx, cx, w_ih, w_hh, b_ih, b_hh] = args else {
                    return Err(kernel_arity_error("flat_lstm_cell", 7, args.len()));
                };
                let (hy, cy) = flat_lstm_cell(input, hx, cx, w_ih, w_hh, b_ih, b_hh)?;
                Ok(vec![hy, cy])
            },
        );
        let driver = Kernel::new(
            "lstm_flat",
            compiled,
            move |args: &[Var]| {
                let [x, hx, cx, weights @ ..] = args else {
                    return Err(kernel_arity_error("lstm_flat", 7, args.len()));
                };
                let mut hy = hx.clone();
                let mut cy = cx.clone();
                for x_t in x.unbind()? {
                    let mut step_args = vec![x_t, hy, cy];
                    step_args.extend_from_slice(weights);
                    [hy, cy] = cell.call_n(&step_args)?;
                }
                Ok(vec![hy.unsqueeze(0)?, cy.unsqueeze(0)?])
            },
        );
        Self { driver }
    }
}

impl ForwardStrategy for FlatLstm {
    fn strategy(&self) -> Strategy {
        Strategy::Flat
    }

    fn arity(&self) -> usize {
        7
    }

    fn forward(&self, inputs: &[ModelInput]) -> Result<ModelOutput, FactoryError> {
        if inputs.len() != 7 {
            return Err(arity_mismatch(7, inputs));
        }
        let args = inputs
            .iter()
            .map(|input| input.as_tensor().cloned())
            .collect::<Result<Vec<_>, _>>()?;
        let [hidden, cell] = self.driver.call_n(&args)?;
        Ok(ModelOutput::State { hidden, cell })
    }
}

// ==================== Multilayer ====================

/// 多层：参数按每层4个平铺，上一层的输出序列是下一层的输入序列
pub struct MultilayerLstm {
    num_layers: usize,
    driver: Kernel,
}

impl MultilayerLstm {
    pub fn new(compiled: bool, num_layers: usize) -> Self {
        // 第0层的输入宽度是 input_size，其余层是 hidden_size，编译时形状守卫不同，所以分开
        let first_cell = lstm_cell_kernel("lstm_cell_l0", compiled);
        let cell = lstm_cell_kernel("lstm_cell", compiled);
        let driver = Kernel::new(
            "lstm_multilayer",
            compiled,
            move |args: &[Var]| {
                let [x, hx, cx, params @ ..] = args else {
                    return Err(kernel_arity_error("lstm_multilayer", 3, args.len()));
                };
                if params.len() != PARAMS_STRIDE * num_layers {
                    return Err(GraphError::InvalidOperation(format!(
                        "{num_layers}层LSTM需要{}个参数，但收到{}个",
                        PARAMS_STRIDE * num_layers,
                        params.len()
                    )));
                }
                let mut layer_inputs = x.unbind()?;
                let mut final_hy = Vec::with_capacity(num_layers);
                let mut final_cy = Vec::with_capacity(num_layers);
                for (layer, weights) in params.chunks_exact(PARAMS_STRIDE).enumerate() {
                    let layer_cell = if layer == 0 { &first_cell } else { &cell };
                    let mut hy = hx.select(layer)?;
                    let mut cy = cx.select(layer)?;
                    let mut outputs = Vec::with_capacity(layer_inputs.len());
                    for x_t in layer_inputs {
                        let mut step_args = vec![x_t, hy, cy];
                        step_args.extend_from_slice(weights);
                        [hy, cy] = layer_cell.call_n(&step_args)?;
                        outputs.push(hy.clone());
                    }
                    final_hy.push(hy);
                    final_cy.push(cy);
                    layer_inputs = outputs;
                }
                Ok(vec![
                    Var::stack(&layer_inputs)?,
                    Var::stack(&final_hy)?,
                    Var::stack(&final_cy)?,
                ])
            },
        );
        Self { num_layers, driver }
    }

    pub const fn num_layers(&self) -> usize {
        self.num_layers
    }
}

impl ForwardStrategy for MultilayerLstm {
    fn strategy(&self) -> Strategy {
        Strategy::Multilayer
    }

    fn arity(&self) -> usize {
        3
    }

    fn forward(&self, inputs: &[ModelInput]) -> Result<ModelOutput, FactoryError> {
        let [x, hidden, params] = inputs else {
            return Err(arity_mismatch(3, inputs));
        };
        let (hx, cx) = hidden.as_pair()?;
        let mut args = vec![x.as_tensor()?.clone(), hx.clone(), cx.clone()];
        args.extend_from_slice(params.as_list()?);
        let [output, hy, cy] = self.driver.call_n(&args)?;
        Ok(ModelOutput::Sequence {
            output,
            hidden: (hy, cy),
        })
    }
}
