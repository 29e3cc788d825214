use super::check_parents_count;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{OpKind, TraitNode};
use crate::tensor::Tensor;

/// 沿`axis`截取`[start, start + len)`（阶数不变）。LSTM 把`[B, 4H]`的门分成4块就靠它
#[derive(Clone)]
pub(in crate::nn) struct Narrow {
    value: Tensor,
    axis: usize,
    start: usize,
    len: usize,
}

impl Narrow {
    pub(in crate::nn) fn new(
        parents: &[&Tensor],
        axis: usize,
        start: usize,
        len: usize,
    ) -> Result<Self, GraphError> {
        check_parents_count("Narrow", parents, 1)?;
        let parent = parents[0];
        if axis >= parent.dimension() || start + len > parent.shape()[axis] {
            return Err(GraphError::InvalidOperation(format!(
                "Narrow节点的截取范围越界：axis={axis}，区间[{start}, {})，父节点形状为{:?}",
                start + len,
                parent.shape()
            )));
        }
        Ok(Self {
            value: parent.narrow(axis, start, len),
            axis,
            start,
            len,
        })
    }
}

impl TraitNode for Narrow {
    fn type_name(&self) -> &'static str {
        "narrow"
    }

    fn value(&self) -> &Tensor {
        &self.value
    }

    fn calc_grad_to_parent(
        &self,
        _parent_index: usize,
        parents: &[&Tensor],
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        Ok(Tensor::pad_narrowed(
            upstream_grad,
            parents[0].shape(),
            self.axis,
            self.start,
        ))
    }

    fn op_kind(&self) -> Option<OpKind> {
        Some(OpKind::Narrow {
            axis: self.axis,
            start: self.start,
            len: self.len,
        })
    }
}
