use super::check_parents_count;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{OpKind, TraitNode};
use crate::tensor::Tensor;

/// 变形节点：只改变形状，不改变元素（按行优先）顺序
#[derive(Clone)]
pub(in crate::nn) struct Reshape {
    value: Tensor,
    target_shape: Vec<usize>,
}

impl Reshape {
    pub(in crate::nn) fn new(parents: &[&Tensor], target_shape: &[usize]) -> Result<Self, GraphError> {
        check_parents_count("Reshape", parents, 1)?;
        let parent = parents[0];
        let target_size: usize = target_shape.iter().product();
        if parent.size() != target_size {
            return Err(GraphError::ShapeMismatch {
                expected: parent.shape().to_vec(),
                got: target_shape.to_vec(),
                message: format!(
                    "Reshape节点的目标形状元素数({target_size})与父节点元素数({})不一致",
                    parent.size()
                ),
            });
        }
        Ok(Self {
            value: parent.reshape(target_shape),
            target_shape: target_shape.to_vec(),
        })
    }
}

impl TraitNode for Reshape {
    fn type_name(&self) -> &'static str {
        "reshape"
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
        Ok(upstream_grad.reshape(parents[0].shape()))
    }

    fn op_kind(&self) -> Option<OpKind> {
        Some(OpKind::Reshape {
            shape: self.target_shape.clone(),
        })
    }
}
