use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;
use ndarray::Ix2;

impl Tensor {
    /// 实现矩阵乘法。只接受2阶张量，否则会触发panic。
    /// 需要保证前一个张量的列数（col）等于后一个张量的行数（row），否则也会触发panic。
    pub fn mat_mul(&self, other: &Tensor) -> Tensor {
        assert!(self.dimension() == 2, "输入的张量维度必须为2");
        assert!(other.dimension() == 2, "输入的张量维度必须为2");
        assert!(
            self.shape()[1] == other.shape()[0],
            "{}",
            TensorError::OperatorError {
                operator: Operator::MatMul,
                tensor1_shape: self.shape().to_vec(),
                tensor2_shape: other.shape().to_vec(),
            }
        );
        // 将动态维度数组转换为常量维度数组（阶数已校验）
        let (Ok(self_data), Ok(other_data)) = (
            self.data.view().into_dimensionality::<Ix2>(),
            other.data.view().into_dimensionality::<Ix2>(),
        ) else {
            unreachable!("阶数已校验为2")
        };
        Tensor::from_array(self_data.dot(&other_data).into_dyn())
    }
}
