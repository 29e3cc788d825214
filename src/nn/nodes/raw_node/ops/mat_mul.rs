use super::check_parents_count;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{OpKind, TraitNode};
use crate::tensor::Tensor;

/// 矩阵乘法：`[m, k] @ [k, n] -> [m, n]`
///
/// backward: dL/dA = G @ B^T，dL/dB = A^T @ G
#[derive(Clone)]
pub(in crate::nn) struct MatMul {
    value: Tensor,
}

impl MatMul {
    pub(in crate::nn) fn new(parents: &[&Tensor]) -> Result<Self, GraphError> {
        check_parents_count("MatMul", parents, 2)?;
        let (a, b) = (parents[0], parents[1]);
        if a.dimension() != 2 || b.dimension() != 2 {
            return Err(GraphError::InvalidOperation(format!(
                "MatMul节点的两个父节点都必须是矩阵，但形状分别为{:?}和{:?}",
                a.shape(),
                b.shape()
            )));
        }
        if a.shape()[1] != b.shape()[0] {
            return Err(GraphError::ShapeMismatch {
                expected: vec![a.shape()[1], b.shape()[1]],
                got: b.shape().to_vec(),
                message: format!(
                    "MatMul节点的两个父节点形状不兼容：父节点1的列数({})与父节点2的行数({})不相等",
                    a.shape()[1],
                    b.shape()[0],
                ),
            });
        }
        Ok(Self {
            value: a.mat_mul(b),
        })
    }
}

impl TraitNode for MatMul {
    fn type_name(&self) -> &'static str {
        "mat_mul"
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
        Ok(match parent_index {
            0 => upstream_grad.mat_mul(&parents[1].transpose()),
            _ => parents[0].transpose().mat_mul(upstream_grad),
        })
    }

    fn op_kind(&self) -> Option<OpKind> {
        Some(OpKind::MatMul)
    }
}
