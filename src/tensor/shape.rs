use super::Tensor;
use crate::errors::TensorError;
use ndarray::{Array, Axis, IxDyn, Slice};

impl Tensor {
    /// 改变张量形状（元素总数必须不变），返回新张量
    pub fn reshape(&self, shape: &[usize]) -> Self {
        let total_elements: usize = self.data.len();
        let new_total_elements: usize = shape.iter().product();
        assert!(
            total_elements == new_total_elements,
            "{}",
            TensorError::IncompatibleShape
        );
        let data = Array::from_shape_vec(IxDyn(shape), self.to_vec())
            .unwrap_or_else(|_| unreachable!("元素总数已校验"));
        Self { data }
    }

    /// 在指定维度上增加一个长度为1的维度。
    ///
    /// # 示例
    ///
    /// ```ignore
    /// let tensor = Tensor::new(&[1.0, 2.0, 3.0], &[3]);
    /// let unsqueezed = tensor.unsqueeze(0); // 在最前面增加一个维度
    /// assert_eq!(unsqueezed.shape(), &[1, 3]);
    /// ```
    pub fn unsqueeze(&self, dim: usize) -> Self {
        assert!(
            dim <= self.dimension(),
            "{}",
            TensorError::AxisOutOfRange {
                axis: dim,
                rank: self.dimension()
            }
        );
        let mut new_shape = self.shape().to_vec();
        new_shape.insert(dim, 1);
        self.reshape(&new_shape)
    }

    /// 矩阵（2阶张量）的转置；1阶及以下的张量原样返回
    pub fn transpose(&self) -> Self {
        if self.dimension() <= 1 {
            return self.clone();
        }
        assert!(
            self.dimension() == 2,
            "{}",
            TensorError::AxisOutOfRange {
                axis: 2,
                rank: self.dimension()
            }
        );
        Self::from_array(self.data.t().to_owned())
    }

    /// 将多个形状严格一致的张量沿新增的首个维度堆叠起来（PyTorch的`torch.stack(xs, 0)`），
    /// 结果形状为`[tensors.len(), ...原形状]`。
    pub fn stack(tensors: &[&Self]) -> Self {
        assert!(!tensors.is_empty(), "{}", TensorError::EmptyList);
        let first_shape = tensors[0].shape();
        assert!(
            tensors.iter().all(|t| t.shape() == first_shape),
            "{}",
            TensorError::InconsitentShape
        );

        let views = tensors.iter().map(|t| t.data.view()).collect::<Vec<_>>();
        let data = ndarray::stack(Axis(0), &views)
            .unwrap_or_else(|_| unreachable!("形状已校验一致"));
        Self::from_array(data)
    }

    /// 取出首个维度上第`index`个切片（维度数减一），即PyTorch的`x[index]`
    pub fn select(&self, index: usize) -> Self {
        assert!(
            self.dimension() >= 1,
            "{}",
            TensorError::AxisOutOfRange { axis: 0, rank: 0 }
        );
        let len = self.shape()[0];
        assert!(index < len, "{}", TensorError::IndexOutOfRange { index, len });
        Self::from_array(self.data.index_axis(Axis(0), index).to_owned())
    }

    /// 沿首个维度拆分成若干个张量（PyTorch的`unbind(0)`）
    pub fn unbind(&self) -> Vec<Self> {
        (0..self.shape().first().copied().unwrap_or(0))
            .map(|i| self.select(i))
            .collect()
    }

    /// 沿维度`axis`截取`[start, start + len)`这一段（维度数不变），即PyTorch的`narrow`
    pub fn narrow(&self, axis: usize, start: usize, len: usize) -> Self {
        assert!(
            axis < self.dimension(),
            "{}",
            TensorError::AxisOutOfRange {
                axis,
                rank: self.dimension()
            }
        );
        let axis_len = self.shape()[axis];
        assert!(
            start + len <= axis_len,
            "{}",
            TensorError::IndexOutOfRange {
                index: start + len,
                len: axis_len
            }
        );
        let sliced = self
            .data
            .slice_axis(Axis(axis), Slice::from(start..start + len));
        Self::from_array(sliced.to_owned())
    }

    /// 把沿维度`axis`截取得到的`part`写回到一个形状为`shape`的全零张量中（`narrow`的反向）
    pub fn pad_narrowed(part: &Self, shape: &[usize], axis: usize, start: usize) -> Self {
        let mut full = Self::zeros(shape);
        let len = part.shape()[axis];
        full.data
            .slice_axis_mut(Axis(axis), Slice::from(start..start + len))
            .assign(&part.data);
        full
    }

    /// 判断两个张量是否满足 NumPy 风格的广播规则
    pub fn can_broadcast_with(&self, other: &Self) -> bool {
        Self::broadcast_shape(self.shape(), other.shape()).is_some()
    }

    /// 计算两个形状广播后的形状，不兼容则返回None
    ///
    /// # 广播规则
    /// - 从右向左对齐维度
    /// - 每个维度必须相等，或其中一个为 1
    /// - 维度数不同时，较短的形状前面补 1
    pub fn broadcast_shape(a: &[usize], b: &[usize]) -> Option<Vec<usize>> {
        let rank = a.len().max(b.len());
        let mut result = vec![0; rank];
        for i in 0..rank {
            let da = if i < rank - a.len() { 1 } else { a[i - (rank - a.len())] };
            let db = if i < rank - b.len() { 1 } else { b[i - (rank - b.len())] };
            if da != db && da != 1 && db != 1 {
                return None;
            }
            result[i] = da.max(db);
        }
        Some(result)
    }

    /// 将（广播后得到的）梯度求和还原为`target`形状，用于广播运算的反向传播
    pub fn sum_to_shape(&self, target: &[usize]) -> Self {
        if self.shape() == target {
            return self.clone();
        }
        let mut data = self.data.clone();
        while data.ndim() > target.len() {
            data = data.sum_axis(Axis(0));
        }
        for (axis, &dim) in target.iter().enumerate() {
            if dim == 1 && data.shape()[axis] != 1 {
                data = data.sum_axis(Axis(axis)).insert_axis(Axis(axis));
            }
        }
        Self::from_array(data)
    }
}
