use super::check_parents_count;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{OpKind, TraitNode};
use crate::tensor::Tensor;

/// Tanh 激活函数节点
///
/// backward: d(tanh)/dx = 1 - tanh²(x)
#[derive(Clone)]
pub(in crate::nn) struct Tanh {
    value: Tensor,
}

impl Tanh {
    pub(in crate::nn) fn new(parents: &[&Tensor]) -> Result<Self, GraphError> {
        check_parents_count("Tanh", parents, 1)?;
        Ok(Self {
            value: parents[0].tanh(),
        })
    }
}

impl TraitNode for Tanh {
    fn type_name(&self) -> &'static str {
        "tanh"
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
        let local_grad = 1.0 - &(&self.value * &self.value);
        Ok(upstream_grad * &local_grad)
    }

    fn op_kind(&self) -> Option<OpKind> {
        Some(OpKind::Tanh)
    }
}
