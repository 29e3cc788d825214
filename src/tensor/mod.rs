use ndarray::{Array, ArrayD, IxDyn};
use rand::Rng;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;

use crate::errors::{ComparisonOperator, TensorError};

mod ops {
    pub mod add;
    pub mod mat_mul;
    pub mod mul;
    pub mod others;
    pub mod sub;
}

mod print;
mod property;
mod shape;

#[cfg(test)]
mod tests;

/// 定义张量的结构体。其可以是标量、向量、矩阵或更高维度的数组。
/// 注：只要通Tensor初始化的都是张量（即使标量也是张量）；
/// 而通常意义上的数字（类型为usize、i32、f64等）就只是纯数（number），在这里不被认为是张量。
///
/// 内部数据始终保持标准（行优先、连续）布局，这样`to_vec`与`stack`得到的元素顺序
/// 与逻辑索引顺序一致。
#[derive(Debug, Clone)]
pub struct Tensor {
    data: ArrayD<f32>,
}

impl Tensor {
    /// 创建一个张量，若为标量，`shape`可以是[]、[1]、[1,1]、[1,1,1]...
    /// 若为向量，`shape`可以是[n]、[1,n]、[n,1]；
    /// 若为矩阵，`shape`可以是[n,m]；
    /// 若为更高维度的数组，`shape`可以是[c,n,m,...]；
    /// 注：`data`的长度必须和`shape`中所有元素的乘积相等，否则会panic。
    pub fn new(data: &[f32], shape: &[usize]) -> Self {
        let expected_len = shape.iter().product::<usize>();
        assert!(
            data.len() == expected_len,
            "{}",
            TensorError::ValueMustSatisfyComparison {
                value_name: format!("数据长度（形状{shape:?}）"),
                operator: ComparisonOperator::Equal,
                threshold: expected_len,
            }
        );
        let data = Array::from_shape_vec(IxDyn(shape), data.to_vec())
            .unwrap_or_else(|_| unreachable!("数据长度已校验"));
        Self { data }
    }

    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            data: ArrayD::zeros(IxDyn(shape)),
        }
    }

    pub fn ones(shape: &[usize]) -> Self {
        Self {
            data: ArrayD::ones(IxDyn(shape)),
        }
    }

    /// 用与`other`相同的形状创建全一张量（反向传播的默认上游梯度）
    pub fn ones_like(other: &Self) -> Self {
        Self::ones(other.shape())
    }

    /// 使用给定的随机数生成器，创建一个服从正态分布的随机张量（Box-Muller变换）。
    /// 同一个种子的`rng`总会生成逐位相同的张量。
    pub fn normal_with_rng(mean: f32, std_dev: f32, shape: &[usize], rng: &mut StdRng) -> Self {
        let data_len = shape.iter().product::<usize>();
        let mut data = Vec::with_capacity(data_len);

        while data.len() < data_len {
            // u1取(0, 1)，避免ln(0)
            let u1: f32 = rng.gen_range(f32::EPSILON..1.0);
            let u2: f32 = rng.gen_range(0.0..1.0);
            let r = (-2.0 * u1.ln()).sqrt();
            let theta = 2.0 * std::f32::consts::PI * u2;
            let z0 = mean + std_dev * r * theta.cos();
            let z1 = mean + std_dev * r * theta.sin();

            if z0.is_finite() {
                data.push(z0);
            }
            if data.len() < data_len && z1.is_finite() {
                data.push(z1);
            }
        }

        Self::new(&data, shape)
    }

    /// 使用给定的随机数生成器，创建一个值在[min, max]闭区间内均匀分布的随机张量
    pub fn uniform_with_rng(min: f32, max: f32, shape: &[usize], rng: &mut StdRng) -> Self {
        let dist = Uniform::new_inclusive(min, max);
        let data = (0..shape.iter().product::<usize>())
            .map(|_| dist.sample(rng))
            .collect::<Vec<_>>();
        Self::new(&data, shape)
    }

    /// 用与`other`相同的形状创建标准正态随机张量（PyTorch的`randn_like`）
    pub fn randn_like(other: &Self, rng: &mut StdRng) -> Self {
        Self::normal_with_rng(0.0, 1.0, other.shape(), rng)
    }
}

// 私有方法
impl Tensor {
    /// 把任意布局的ndarray数组包装为张量，并确保是标准布局
    pub(crate) fn from_array(data: ArrayD<f32>) -> Self {
        if data.is_standard_layout() {
            Self { data }
        } else {
            Self {
                data: data.as_standard_layout().into_owned(),
            }
        }
    }

    pub(crate) fn array(&self) -> &ArrayD<f32> {
        &self.data
    }
}
