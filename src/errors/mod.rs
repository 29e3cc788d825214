/*
 * @Author       : 老董
 * @Date         : 2023-08-17 17:24:24
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-11 10:12:30
 * @Description  : 张量层的错误类型。张量运算本身遵循“形状不对即panic”的约定，
 *                 这里的错误主要用于组织panic消息；计算图与工厂层另有各自的Result错误类型。
 */

use thiserror::Error;
mod ops;
pub use self::ops::*;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TensorError {
    // 数字比较用
    #[error("{value_name}须{operator}{threshold}")]
    ValueMustSatisfyComparison {
        value_name: String,
        operator: ComparisonOperator,
        threshold: usize,
    },
    // 张量二元运算
    #[error(
        "形状不一致，故无法{operator}：第一个张量的形状为{tensor1_shape:?}，第二个张量的形状为{tensor2_shape:?}"
    )]
    OperatorError {
        operator: Operator,
        tensor1_shape: Vec<usize>,
        tensor2_shape: Vec<usize>,
    },

    #[error("张量列表为空")]
    EmptyList,
    #[error("张量形状不一致")]
    InconsitentShape,
    #[error("张量形状不兼容")]
    IncompatibleShape,
    #[error("维度{axis}超出范围：张量的阶数为{rank}")]
    AxisOutOfRange { axis: usize, rank: usize },
    #[error("索引{index}超出范围：该维度的长度为{len}")]
    IndexOutOfRange { index: usize, len: usize },
}
