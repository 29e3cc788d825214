/*
 * @Author       : 老董
 * @Date         : 2024-01-31 21:19:34
 * @Description  : 算子节点。每个节点在创建时校验父节点并即时算出值，反向时按VJP计算对各父节点的梯度
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-12 10:02:55
 */

mod add;
mod mat_mul;
mod multiply;
mod narrow;
mod reshape;
mod select;
mod sigmoid;
mod stack;
mod tanh;
mod transpose;

pub(in crate::nn) use add::Add;
pub(in crate::nn) use mat_mul::MatMul;
pub(in crate::nn) use multiply::Multiply;
pub(in crate::nn) use narrow::Narrow;
pub(in crate::nn) use reshape::Reshape;
pub(in crate::nn) use select::Select;
pub(in crate::nn) use sigmoid::Sigmoid;
pub(in crate::nn) use stack::Stack;
pub(in crate::nn) use tanh::Tanh;
pub(in crate::nn) use transpose::Transpose;

use crate::nn::GraphError;
use crate::tensor::Tensor;

/// 校验父节点数量
fn check_parents_count(
    type_name: &str,
    parents: &[&Tensor],
    expected: usize,
) -> Result<(), GraphError> {
    if parents.len() != expected {
        return Err(GraphError::InvalidOperation(format!(
            "{type_name}节点需要{expected}个父节点，但收到{}个",
            parents.len()
        )));
    }
    Ok(())
}

/// 二元逐元素算子的广播形状校验
fn broadcast_shape_of(type_name: &str, a: &Tensor, b: &Tensor) -> Result<Vec<usize>, GraphError> {
    Tensor::broadcast_shape(a.shape(), b.shape()).ok_or_else(|| GraphError::ShapeMismatch {
        expected: a.shape().to_vec(),
        got: b.shape().to_vec(),
        message: format!("{type_name}节点的两个父节点形状无法广播"),
    })
}
