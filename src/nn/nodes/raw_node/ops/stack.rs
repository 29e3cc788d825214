use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{OpKind, TraitNode};
use crate::tensor::Tensor;

/// 把多个形状相同的父节点沿新增的首个维度堆叠起来，如把T个`[B, H]`堆叠为`[T, B, H]`
#[derive(Clone)]
pub(in crate::nn) struct Stack {
    value: Tensor,
}

impl Stack {
    pub(in crate::nn) fn new(parents: &[&Tensor]) -> Result<Self, GraphError> {
        let Some(first) = parents.first() else {
            return Err(GraphError::InvalidOperation(
                "Stack节点至少需要1个父节点".to_string(),
            ));
        };
        if let Some(other) = parents.iter().find(|p| p.shape() != first.shape()) {
            return Err(GraphError::ShapeMismatch {
                expected: first.shape().to_vec(),
                got: other.shape().to_vec(),
                message: "Stack节点的所有父节点形状必须相同".to_string(),
            });
        }
        Ok(Self {
            value: Tensor::stack(parents),
        })
    }
}

impl TraitNode for Stack {
    fn type_name(&self) -> &'static str {
        "stack"
    }

    fn value(&self) -> &Tensor {
        &self.value
    }

    fn calc_grad_to_parent(
        &self,
        parent_index: usize,
        _parents: &[&Tensor],
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        Ok(upstream_grad.select(parent_index))
    }

    fn op_kind(&self) -> Option<OpKind> {
        Some(OpKind::Stack)
    }
}
