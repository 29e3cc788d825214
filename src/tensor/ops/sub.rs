use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;
use std::ops::Sub;

impl Sub<Tensor> for f32 {
    type Output = Tensor;

    fn sub(self, tensor: Tensor) -> Tensor {
        Tensor::from_array(self - &tensor.data)
    }
}

impl Sub<&Tensor> for f32 {
    type Output = Tensor;

    fn sub(self, tensor: &Tensor) -> Tensor {
        Tensor::from_array(self - &tensor.data)
    }
}

impl Sub for &Tensor {
    type Output = Tensor;

    fn sub(self, other: &Tensor) -> Tensor {
        assert!(
            self.can_broadcast_with(other),
            "{}",
            TensorError::OperatorError {
                operator: Operator::Sub,
                tensor1_shape: self.shape().to_vec(),
                tensor2_shape: other.shape().to_vec(),
            }
        );
        Tensor::from_array(&self.data - &other.data)
    }
}

impl Sub for Tensor {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        &self - &other
    }
}
