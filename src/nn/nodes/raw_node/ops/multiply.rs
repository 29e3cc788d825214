use super::{broadcast_shape_of, check_parents_count};
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{OpKind, TraitNode};
use crate::tensor::Tensor;

/// 逐元素乘法（Hadamard积，支持广播）
///
/// forward: y = a ⊙ b
/// backward: dL/da = dL/dy ⊙ b，dL/db = dL/dy ⊙ a
#[derive(Clone)]
pub(in crate::nn) struct Multiply {
    value: Tensor,
}

impl Multiply {
    pub(in crate::nn) fn new(parents: &[&Tensor]) -> Result<Self, GraphError> {
        check_parents_count("Multiply", parents, 2)?;
        broadcast_shape_of("Multiply", parents[0], parents[1])?;
        Ok(Self {
            value: parents[0] * parents[1],
        })
    }
}

impl TraitNode for Multiply {
    fn type_name(&self) -> &'static str {
        "multiply"
    }

    fn value(&self) -> &Tensor {
        &self.value
    }

    fn calc_grad_to_parent(
        &self,
        parent_index: usize,
        parents: &[&Tensor],
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        let other = parents[1 - parent_index];
        Ok((upstream_grad * other).sum_to_shape(parents[parent_index].shape()))
    }

    fn op_kind(&self) -> Option<OpKind> {
        Some(OpKind::Multiply)
    }
}
