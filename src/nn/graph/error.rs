/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @Description  : Graph 模块的错误类型
 */

use crate::nn::NodeId;
use thiserror::Error;

/// Graph 操作错误类型
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GraphError {
    #[error("节点{0}不存在")]
    NodeNotFound(NodeId),
    #[error("非法操作：{0}")]
    InvalidOperation(String),
    #[error("形状不匹配（预期{expected:?}，实际{got:?}）：{message}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        message: String,
    },
    #[error("计算错误：{0}")]
    ComputationError(String),
    /// 图编译（追踪/守卫校验/回放）失败
    #[error("图编译失败：{0}")]
    CompilationError(String),
}
