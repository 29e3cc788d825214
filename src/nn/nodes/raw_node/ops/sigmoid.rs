use super::check_parents_count;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{OpKind, TraitNode};
use crate::tensor::Tensor;

/// Sigmoid 激活函数节点
///
/// forward: sigmoid(x) = 1 / (1 + e^(-x))
/// backward: d(sigmoid)/dx = sigmoid(x) * (1 - sigmoid(x))
#[derive(Clone)]
pub(in crate::nn) struct Sigmoid {
    value: Tensor,
}

impl Sigmoid {
    pub(in crate::nn) fn new(parents: &[&Tensor]) -> Result<Self, GraphError> {
        check_parents_count("Sigmoid", parents, 1)?;
        Ok(Self {
            value: parents[0].sigmoid(),
        })
    }
}

impl TraitNode for Sigmoid {
    fn type_name(&self) -> &'static str {
        "sigmoid"
    }

    fn value(&self) -> &Tensor {
        &self.value
    }

    fn calc_grad_to_parent(
        &self,
        _parent_index: usize,
        _parents: &[&Tensor],
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        let local_grad = &self.value * &(1.0 - &self.value);
        Ok(upstream_grad * &local_grad)
    }

    fn op_kind(&self) -> Option<OpKind> {
        Some(OpKind::Sigmoid)
    }
}
