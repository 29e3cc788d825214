use super::{broadcast_shape_of, check_parents_count};
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{OpKind, TraitNode};
use crate::tensor::Tensor;

/// 逐元素加法（支持广播，如`[B, 4H] + [4H]`的偏置相加）
#[derive(Clone)]
pub(in crate::nn) struct Add {
    value: Tensor,
}

impl Add {
    pub(in crate::nn) fn new(parents: &[&Tensor]) -> Result<Self, GraphError> {
        check_parents_count("Add", parents, 2)?;
        broadcast_shape_of("Add", parents[0], parents[1])?;
        Ok(Self {
            value: parents[0] + parents[1],
        })
    }
}

impl TraitNode for Add {
    fn type_name(&self) -> &'static str {
        "add"
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
        // 加法对每个父节点的局部梯度都是1，只需把广播出来的维度求和还原
        Ok(upstream_grad.sum_to_shape(parents[parent_index].shape()))
    }

    fn op_kind(&self) -> Option<OpKind> {
        Some(OpKind::Add)
    }
}
