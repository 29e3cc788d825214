/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : 模型工厂的错误类型
 */

use crate::nn::GraphError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FactoryError {
    /// 配置不合法（尺寸为0、多层配置用于单层策略、forward 的输入类型不符等）
    #[error("配置无效：{0}")]
    InvalidConfiguration(String),
    /// 设备不可用，或设备无法容纳本次分配
    #[error("设备不可用：{0}")]
    DeviceUnavailable(String),
    /// 图编译失败（原样透传）
    #[error("图编译失败：{0}")]
    CompilationError(String),
    #[error("forward 的输入个数不符：预期{expected}个，实际{got}个")]
    ArityMismatch { expected: usize, got: usize },
    #[error(transparent)]
    Graph(GraphError),
}

impl From<GraphError> for FactoryError {
    fn from(error: GraphError) -> Self {
        match error {
            GraphError::CompilationError(message) => Self::CompilationError(message),
            other => Self::Graph(other),
        }
    }
}
