use super::check_parents_count;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{OpKind, TraitNode};
use crate::tensor::Tensor;

/// 矩阵转置
#[derive(Clone)]
pub(in crate::nn) struct Transpose {
    value: Tensor,
}

impl Transpose {
    pub(in crate::nn) fn new(parents: &[&Tensor]) -> Result<Self, GraphError> {
        check_parents_count("Transpose", parents, 1)?;
        if parents[0].dimension() != 2 {
            return Err(GraphError::InvalidOperation(format!(
                "Transpose节点只支持矩阵，但父节点形状为{:?}",
                parents[0].shape()
            )));
        }
        Ok(Self {
            value: parents[0].transpose(),
        })
    }
}

impl TraitNode for Transpose {
    fn type_name(&self) -> &'static str {
        "transpose"
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
        Ok(upstream_grad.transpose())
    }

    fn op_kind(&self) -> Option<OpKind> {
        Some(OpKind::Transpose)
    }
}
