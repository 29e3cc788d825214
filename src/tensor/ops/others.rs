use crate::tensor::Tensor;
use std::cmp::PartialEq;

impl From<f32> for Tensor {
    /// 实现 From<f32> trait 用于将`f32`类型转换为形状为`[1]`的张量
    fn from(scalar: f32) -> Self {
        Tensor::new(&[scalar], &[1])
    }
}

impl PartialEq for Tensor {
    /// 形状与元素逐位相等（用于校验固定种子下的可重复性）
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Tensor {
    /// 对张量中的所有元素求和并返回一个纯数
    pub fn sum(&self) -> f32 {
        self.data.sum()
    }

    /// 逐元素 sigmoid：1 / (1 + e^(-x))
    pub fn sigmoid(&self) -> Tensor {
        Tensor::from_array(self.data.mapv(|x| 1.0 / (1.0 + (-x).exp())))
    }

    /// 逐元素 tanh
    pub fn tanh(&self) -> Tensor {
        Tensor::from_array(self.data.mapv(f32::tanh))
    }
}
