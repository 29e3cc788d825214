use super::check_parents_count;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{OpKind, TraitNode};
use crate::tensor::Tensor;

/// 取出首个维度上的第`index`个切片（阶数减一），如从`[T, B, I]`中取出第t步的`[B, I]`
///
/// backward: 梯度写回父节点形状的全零张量中对应的位置
#[derive(Clone)]
pub(in crate::nn) struct Select {
    value: Tensor,
    index: usize,
}

impl Select {
    pub(in crate::nn) fn new(parents: &[&Tensor], index: usize) -> Result<Self, GraphError> {
        check_parents_count("Select", parents, 1)?;
        let parent = parents[0];
        let len = parent.shape().first().copied().unwrap_or(0);
        if index >= len {
            return Err(GraphError::InvalidOperation(format!(
                "Select节点的索引{index}超出范围：父节点形状为{:?}",
                parent.shape()
            )));
        }
        Ok(Self {
            value: parent.select(index),
            index,
        })
    }
}

impl TraitNode for Select {
    fn type_name(&self) -> &'static str {
        "select"
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
            &upstream_grad.unsqueeze(0),
            parents[0].shape(),
            0,
            self.index,
        ))
    }

    fn op_kind(&self) -> Option<OpKind> {
        Some(OpKind::Select { index: self.index })
    }
}
