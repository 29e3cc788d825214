/*
 * @Author       : 老董
 * @Date         : 2026-01-08
 * @Description  : Smart Var - 智能变量句柄，支持算子重载和链式调用
 */

use super::graph::{Graph, GraphInner};
use super::{GraphError, NodeId, OpKind};
use crate::tensor::Tensor;
use rand::rngs::StdRng;
use std::cell::RefCell;
use std::ops::{Add, Mul};
use std::rc::Rc;

// ==================== Init 枚举 ====================

/// 参数初始化策略
#[derive(Debug, Clone)]
pub enum Init {
    /// 全零
    Zeros,
    /// 正态分布
    Normal { mean: f32, std: f32 },
    /// [low, high] 上的均匀分布
    Uniform { low: f32, high: f32 },
}

impl Init {
    /// 生成初始化后的 Tensor（使用指定的 RNG）
    pub fn generate_with_rng(&self, shape: &[usize], rng: &mut StdRng) -> Tensor {
        match self {
            Self::Zeros => Tensor::zeros(shape),
            Self::Normal { mean, std } => Tensor::normal_with_rng(*mean, *std, shape, rng),
            Self::Uniform { low, high } => Tensor::uniform_with_rng(*low, *high, shape, rng),
        }
    }
}

// ==================== Var 结构 ====================

/// 智能变量句柄 - 携带图引用，支持算子重载和链式调用
///
/// # 设计原则
/// - 持有 `Rc<RefCell<GraphInner>>` 引用，实现算子重载
/// - Clone 语义（非 Copy），但开销极低（Rc clone）
/// - 所有可能失败的运算都返回 `Result`，算子重载也不例外
///
/// # 使用示例
/// ```ignore
/// let graph = Graph::new_with_seed(42);
/// let x = graph.input(&data);
/// let gates = (&x.matmul(&w.t()?)? + &b)?;
/// let h = gates.sigmoid()?;
/// h.backward_with_grad(&seed)?;
/// ```
#[derive(Clone)]
pub struct Var {
    /// 节点 ID
    id: NodeId,
    /// 图引用（用户不可见）
    graph: Rc<RefCell<GraphInner>>,
}

impl std::fmt::Debug for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Var").field("id", &self.id).finish()
    }
}

impl Var {
    /// 创建新的 Var（内部使用）
    pub(crate) const fn new(id: NodeId, graph: Rc<RefCell<GraphInner>>) -> Self {
        Self { id, graph }
    }

    /// 获取节点 ID
    pub const fn node_id(&self) -> NodeId {
        self.id
    }

    /// 检查两个 Var 是否来自同一个 Graph
    pub fn same_graph(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.graph, &other.graph)
    }

    /// 获取 Var 所属的 Graph handle
    pub fn get_graph(&self) -> Graph {
        Graph::from_rc(Rc::clone(&self.graph))
    }

    /// 获取节点值的形状
    pub fn value_expected_shape(&self) -> Result<Vec<usize>, GraphError> {
        Ok(self
            .graph
            .borrow()
            .get_node_value_expected_shape(self.id)?
            .to_vec())
    }

    // ==================== 值与梯度 ====================

    /// 获取节点的值（克隆的 Tensor）
    pub fn value(&self) -> Result<Tensor, GraphError> {
        Ok(self.graph.borrow().get_node_value(self.id)?.clone())
    }

    /// 设置叶子节点的值
    pub fn set_value(&self, value: &Tensor) -> Result<(), GraphError> {
        self.graph.borrow_mut().set_node_value(self.id, value)
    }

    /// 获取参数节点累积的梯度（尚未反向传播过则为None）
    pub fn grad(&self) -> Result<Option<Tensor>, GraphError> {
        Ok(self.graph.borrow().get_node_grad(self.id)?.cloned())
    }

    /// 以`upstream_grad`为上游梯度，从本节点开始反向传播
    pub fn backward_with_grad(&self, upstream_grad: &Tensor) -> Result<(), GraphError> {
        self.graph
            .borrow_mut()
            .backward_with_grad(self.id, upstream_grad)
    }

    // ==================== 算子 ====================

    /// 在本节点所在的图上创建一个算子节点
    pub(crate) fn apply_op(op: &OpKind, operands: &[&Self]) -> Result<Self, GraphError> {
        let Some(first) = operands.first() else {
            return Err(GraphError::InvalidOperation(format!(
                "{}算子至少需要1个操作数",
                op.type_name()
            )));
        };
        if operands.iter().any(|v| !v.same_graph(first)) {
            return Err(GraphError::InvalidOperation(format!(
                "不能对来自不同 Graph 的 Var 进行{}运算",
                op.type_name()
            )));
        }
        let parent_ids = operands.iter().map(|v| v.id).collect::<Vec<_>>();
        let id = first.graph.borrow_mut().new_op_node(op, &parent_ids, None)?;
        Ok(Self::new(id, Rc::clone(&first.graph)))
    }

    /// 逐元素加法（支持广播）
    pub fn try_add(&self, other: &Self) -> Result<Self, GraphError> {
        Self::apply_op(&OpKind::Add, &[self, other])
    }

    /// 逐元素乘法（支持广播）
    pub fn try_mul(&self, other: &Self) -> Result<Self, GraphError> {
        Self::apply_op(&OpKind::Multiply, &[self, other])
    }

    /// 矩阵乘法
    pub fn matmul(&self, other: &Self) -> Result<Self, GraphError> {
        Self::apply_op(&OpKind::MatMul, &[self, other])
    }

    /// 矩阵转置
    pub fn t(&self) -> Result<Self, GraphError> {
        Self::apply_op(&OpKind::Transpose, &[self])
    }

    pub fn sigmoid(&self) -> Result<Self, GraphError> {
        Self::apply_op(&OpKind::Sigmoid, &[self])
    }

    pub fn tanh(&self) -> Result<Self, GraphError> {
        Self::apply_op(&OpKind::Tanh, &[self])
    }

    pub fn reshape(&self, shape: &[usize]) -> Result<Self, GraphError> {
        Self::apply_op(
            &OpKind::Reshape {
                shape: shape.to_vec(),
            },
            &[self],
        )
    }

    /// 在`dim`处插入长度为1的维度
    pub fn unsqueeze(&self, dim: usize) -> Result<Self, GraphError> {
        let mut shape = self.value_expected_shape()?;
        if dim > shape.len() {
            return Err(GraphError::InvalidOperation(format!(
                "unsqueeze的维度{dim}超出范围：张量的阶数为{}",
                shape.len()
            )));
        }
        shape.insert(dim, 1);
        self.reshape(&shape)
    }

    /// 取出首个维度上的第`index`个切片
    pub fn select(&self, index: usize) -> Result<Self, GraphError> {
        Self::apply_op(&OpKind::Select { index }, &[self])
    }

    /// 沿首个维度拆分（PyTorch的`unbind(0)`）
    pub fn unbind(&self) -> Result<Vec<Self>, GraphError> {
        let len = self
            .value_expected_shape()?
            .first()
            .copied()
            .unwrap_or(0);
        (0..len).map(|i| self.select(i)).collect()
    }

    /// 沿`axis`截取`[start, start + len)`
    pub fn narrow(&self, axis: usize, start: usize, len: usize) -> Result<Self, GraphError> {
        Self::apply_op(&OpKind::Narrow { axis, start, len }, &[self])
    }

    /// 沿`axis`均分为`chunks`块（PyTorch的`chunk`，要求能整除）
    pub fn chunk(&self, chunks: usize, axis: usize) -> Result<Vec<Self>, GraphError> {
        let shape = self.value_expected_shape()?;
        let Some(&dim) = shape.get(axis) else {
            return Err(GraphError::InvalidOperation(format!(
                "chunk的维度{axis}超出范围：张量形状为{shape:?}"
            )));
        };
        if chunks == 0 || dim % chunks != 0 {
            return Err(GraphError::InvalidOperation(format!(
                "维度{axis}的长度{dim}无法均分为{chunks}块"
            )));
        }
        let len = dim / chunks;
        (0..chunks)
            .map(|i| self.narrow(axis, i * len, len))
            .collect()
    }

    /// 沿新增的首个维度堆叠（PyTorch的`torch.stack(vars, 0)`）
    pub fn stack(vars: &[Self]) -> Result<Self, GraphError> {
        Self::apply_op(&OpKind::Stack, &vars.iter().collect::<Vec<_>>())
    }
}

// ==================== 算子重载 ====================
// 运算可能因形状不匹配而失败，所以输出是 Result：`(&a + &b)?`

impl Add for &Var {
    type Output = Result<Var, GraphError>;

    fn add(self, other: &Var) -> Self::Output {
        self.try_add(other)
    }
}

impl Add for Var {
    type Output = Result<Self, GraphError>;

    fn add(self, other: Self) -> Self::Output {
        self.try_add(&other)
    }
}

impl Mul for &Var {
    type Output = Result<Var, GraphError>;

    fn mul(self, other: &Var) -> Self::Output {
        self.try_mul(other)
    }
}

impl Mul for Var {
    type Output = Result<Self, GraphError>;

    fn mul(self, other: Self) -> Self::Output {
        self.try_mul(&other)
    }
}
