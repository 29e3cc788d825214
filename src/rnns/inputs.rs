/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : 基准输入与参数的合成，以及 forward 的位置参数类型
 */

use super::{FactoryError, LstmConfig};
use crate::nn::{Graph, GraphError, Init, Var};

/// 每层参数的个数：w_ih、w_hh、b_ih、b_hh
pub const PARAMS_STRIDE: usize = 4;

/// 传给 forward 的一个位置参数
#[derive(Debug, Clone)]
pub enum ModelInput {
    Tensor(Var),
    /// (hidden, cell)
    Pair(Var, Var),
    /// 平铺的参数序列
    List(Vec<Var>),
}

impl ModelInput {
    pub fn as_tensor(&self) -> Result<&Var, FactoryError> {
        match self {
            Self::Tensor(var) => Ok(var),
            other => Err(Self::kind_error("张量", other)),
        }
    }

    pub fn as_pair(&self) -> Result<(&Var, &Var), FactoryError> {
        match self {
            Self::Pair(hidden, cell) => Ok((hidden, cell)),
            other => Err(Self::kind_error("(hidden, cell)二元组", other)),
        }
    }

    pub fn as_list(&self) -> Result<&[Var], FactoryError> {
        match self {
            Self::List(vars) => Ok(vars),
            other => Err(Self::kind_error("参数列表", other)),
        }
    }

    const fn kind_name(&self) -> &'static str {
        match self {
            Self::Tensor(_) => "张量",
            Self::Pair(..) => "(hidden, cell)二元组",
            Self::List(_) => "参数列表",
        }
    }

    fn kind_error(expected: &str, got: &Self) -> FactoryError {
        FactoryError::InvalidConfiguration(format!(
            "forward的输入类型不符：预期{expected}，实际为{}",
            got.kind_name()
        ))
    }
}

/// 合成的基准数据：输入序列、初始状态与各层参数
#[derive(Debug, Clone)]
pub struct LstmInputs {
    /// [T, B, I]
    pub x: Var,
    /// [L, B, H]
    pub hx: Var,
    /// [L, B, H]
    pub cx: Var,
    /// 每层`[w_ih, w_hh, b_ih, b_hh]`
    pub params: Vec<Vec<Var>>,
}

/// 在`graph`上按固定顺序合成输入与参数：x、hx、cx，然后逐层 w_ih、w_hh、b_ih、b_hh。
///
/// 参数按`U(-1/√H, 1/√H)`初始化。随机数全部来自图的随机数生成器，
/// 所以同一种子下两次调用得到逐位相同的张量。
pub fn lstm_inputs(graph: &Graph, config: &LstmConfig) -> LstmInputs {
    let (t, l, b, i, h) = (
        config.seq_length(),
        config.num_layers(),
        config.batch_size(),
        config.input_size(),
        config.hidden_size(),
    );
    let x = graph.randn(&[t, b, i], Some("x"));
    let hx = graph.randn(&[l, b, h], Some("hx"));
    let cx = graph.randn(&[l, b, h], Some("cx"));

    let bound = 1.0 / (h as f32).sqrt();
    let init = Init::Uniform {
        low: -bound,
        high: bound,
    };
    let params = (0..l)
        .map(|layer| {
            let layer_input = if layer == 0 { i } else { h };
            vec![
                graph.parameter(&[4 * h, layer_input], init.clone(), &format!("w_ih_l{layer}")),
                graph.parameter(&[4 * h, h], init.clone(), &format!("w_hh_l{layer}")),
                graph.parameter(&[4 * h], init.clone(), &format!("b_ih_l{layer}")),
                graph.parameter(&[4 * h], init.clone(), &format!("b_hh_l{layer}")),
            ]
        })
        .collect();
    LstmInputs { x, hx, cx, params }
}

/// 把逐层的参数列表转成4个以层为首维的张量：`[w_ih堆叠, w_hh堆叠, b_ih堆叠, b_hh堆叠]`。
///
/// 各层同一位置的参数形状必须相同（多层时第0层的 w_ih 只有在 input_size == hidden_size 时才能堆叠）。
pub fn stack_weights(params: &[Vec<Var>]) -> Result<Vec<Var>, GraphError> {
    if let Some(bad) = params.iter().find(|layer| layer.len() != PARAMS_STRIDE) {
        return Err(GraphError::InvalidOperation(format!(
            "每层应有{PARAMS_STRIDE}个参数，但收到{}个",
            bad.len()
        )));
    }
    (0..PARAMS_STRIDE)
        .map(|k| {
            let column = params.iter().map(|layer| layer[k].clone()).collect::<Vec<_>>();
            Var::stack(&column)
        })
        .collect()
}

/// 把嵌套的列表按顺序拼成平铺列表
pub fn flatten_list<T: Clone>(nested: &[Vec<T>]) -> Vec<T> {
    nested.iter().flatten().cloned().collect()
}
