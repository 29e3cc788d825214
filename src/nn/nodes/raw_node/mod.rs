mod input;
mod ops;
mod parameter;

pub(in crate::nn) use input::Input;
pub(in crate::nn) use ops::*;
pub(in crate::nn) use parameter::Parameter;

use crate::nn::GraphError;
use crate::tensor::Tensor;
use enum_dispatch::enum_dispatch;

#[enum_dispatch]
#[derive(Clone)]
pub(in crate::nn) enum NodeType {
    Input(Input),
    Parameter(Parameter),
    /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓算子↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
    Add(Add),
    Multiply(Multiply),
    MatMul(MatMul),
    Sigmoid(Sigmoid),
    Tanh(Tanh),
    Transpose(Transpose),
    Reshape(Reshape),
    Select(Select),
    Narrow(Narrow),
    Stack(Stack),
    /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑算子↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/
}

#[enum_dispatch(NodeType)]
pub(in crate::nn) trait TraitNode {
    /// 节点类型名，用于自动命名和报错信息
    fn type_name(&self) -> &'static str;

    /// 节点的值。前向传播是即时（eager）的：算子节点在创建时就已根据父节点算出了值
    fn value(&self) -> &Tensor;

    fn set_value(&mut self, _value: &Tensor) -> Result<(), GraphError> {
        Err(GraphError::InvalidOperation(format!(
            "{}节点的值不应该被手动设置",
            self.type_name()
        )))
    }

    /// 已知各父节点的值与本节点的上游梯度，计算对第`parent_index`个父节点的梯度（VJP）
    fn calc_grad_to_parent(
        &self,
        parent_index: usize,
        parents: &[&Tensor],
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError>;

    /// 累积下来的梯度。只有参数节点会保存梯度
    fn grad(&self) -> Option<&Tensor> {
        None
    }

    fn set_grad(&mut self, _grad: Option<&Tensor>) -> Result<(), GraphError> {
        Err(GraphError::InvalidOperation(format!(
            "{}节点不保存梯度",
            self.type_name()
        )))
    }

    /// 算子节点返回自身的算子描述（供图编译时记录），叶子节点返回None
    fn op_kind(&self) -> Option<OpKind> {
        None
    }
}

/// 算子描述：既用于创建算子节点，也是图编译后程序中的指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpKind {
    Add,
    Multiply,
    MatMul,
    Sigmoid,
    Tanh,
    Transpose,
    Reshape { shape: Vec<usize> },
    Select { index: usize },
    Narrow { axis: usize, start: usize, len: usize },
    Stack,
}

impl OpKind {
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Multiply => "multiply",
            Self::MatMul => "mat_mul",
            Self::Sigmoid => "sigmoid",
            Self::Tanh => "tanh",
            Self::Transpose => "transpose",
            Self::Reshape { .. } => "reshape",
            Self::Select { .. } => "select",
            Self::Narrow { .. } => "narrow",
            Self::Stack => "stack",
        }
    }

    /// 根据父节点的值创建（并即时算出值的）算子节点
    pub(in crate::nn) fn build(&self, parents: &[&Tensor]) -> Result<NodeType, GraphError> {
        Ok(match self {
            Self::Add => Add::new(parents)?.into(),
            Self::Multiply => Multiply::new(parents)?.into(),
            Self::MatMul => MatMul::new(parents)?.into(),
            Self::Sigmoid => Sigmoid::new(parents)?.into(),
            Self::Tanh => Tanh::new(parents)?.into(),
            Self::Transpose => Transpose::new(parents)?.into(),
            Self::Reshape { shape } => Reshape::new(parents, shape)?.into(),
            Self::Select { index } => Select::new(parents, *index)?.into(),
            Self::Narrow { axis, start, len } => Narrow::new(parents, *axis, *start, *len)?.into(),
            Self::Stack => Stack::new(parents)?.into(),
        })
    }
}
