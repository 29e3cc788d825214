/*
 * @Author       : 老董
 * @Date         : 2023-08-17 17:24:24
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-11 10:33:47
 * @Description  : 张量的乘法，实现了张量与纯数的乘法以及两个张量“逐元素”相乘（支持广播）的运算，并返回一个新的张量。
 *                 注意：这里的乘法概念与线性代数中的矩阵乘法不同，在这里其更类似于哈达玛积（Hadamard product）与数乘的结合。
 *                 矩阵乘法见`mat_mul`。
 */

use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;
use std::ops::Mul;

impl Mul<f32> for Tensor {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Self::from_array(&self.data * scalar)
    }
}

impl Mul<f32> for &Tensor {
    type Output = Tensor;

    fn mul(self, scalar: f32) -> Tensor {
        Tensor::from_array(&self.data * scalar)
    }
}

impl Mul<Tensor> for f32 {
    type Output = Tensor;

    fn mul(self, tensor: Tensor) -> Tensor {
        Tensor::from_array(&tensor.data * self)
    }
}

impl Mul for &Tensor {
    type Output = Tensor;

    fn mul(self, other: &Tensor) -> Tensor {
        assert!(
            self.can_broadcast_with(other),
            "{}",
            TensorError::OperatorError {
                operator: Operator::Mul,
                tensor1_shape: self.shape().to_vec(),
                tensor2_shape: other.shape().to_vec(),
            }
        );
        Tensor::from_array(&self.data * &other.data)
    }
}

impl Mul for Tensor {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        &self * &other
    }
}

impl Mul<&Tensor> for Tensor {
    type Output = Self;

    fn mul(self, other: &Tensor) -> Self {
        &self * other
    }
}
