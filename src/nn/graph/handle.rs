/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @Description  : Graph 句柄（用户级 API）
 */

use super::error::GraphError;
use super::inner::{GraphInner, Watermark};
use crate::nn::NodeId;
use crate::nn::var::{Init, Var};
use crate::tensor::Tensor;
use std::cell::RefCell;
use std::rc::Rc;

/// Graph - 计算图句柄（PyTorch 风格用户 API）
///
/// # 设计原则
/// - 是 `Rc<RefCell<GraphInner>>` 的薄封装
/// - Clone 语义：多个 Graph 引用同一个 GraphInner
/// - 创建的 Var 自动持有图引用
#[derive(Clone)]
pub struct Graph {
    inner: Rc<RefCell<GraphInner>>,
}

impl Graph {
    // ==================== 创建 ====================

    /// 创建新图（随机数生成器在首次使用时从系统熵初始化）
    pub fn new() -> Self {
        Self::from_inner(GraphInner::new())
    }

    /// 创建带种子的图（同一种子下创建的随机输入与参数逐位相同）
    pub fn new_with_seed(seed: u64) -> Self {
        Self::from_inner(GraphInner::new_with_seed(seed))
    }

    /// 从现有 GraphInner 创建句柄
    pub fn from_inner(inner: GraphInner) -> Self {
        Self {
            inner: Rc::new(RefCell::new(inner)),
        }
    }

    /// 从现有 Rc 创建句柄
    pub(crate) const fn from_rc(inner: Rc<RefCell<GraphInner>>) -> Self {
        Self { inner }
    }

    /// 获取内部 GraphInner 的不可变引用
    pub fn inner(&self) -> std::cell::Ref<'_, GraphInner> {
        self.inner.borrow()
    }

    /// 获取内部 GraphInner 的可变引用
    pub fn inner_mut(&self) -> std::cell::RefMut<'_, GraphInner> {
        self.inner.borrow_mut()
    }

    /// 将 NodeId 包装成 Var
    pub fn wrap_node_id(&self, node_id: NodeId) -> Var {
        Var::new(node_id, Rc::clone(&self.inner))
    }

    /// 判断两个句柄是否指向同一个图
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // ==================== 创建变量 ====================

    /// 创建输入节点并设置数据
    pub fn input(&self, data: &Tensor) -> Var {
        let node_id = self.inner.borrow_mut().new_input_node(data, None);
        self.wrap_node_id(node_id)
    }

    /// 用图的随机数生成器创建标准正态分布的输入节点
    pub fn randn(&self, shape: &[usize], name: Option<&str>) -> Var {
        let mut g = self.inner.borrow_mut();
        let data = Tensor::normal_with_rng(0.0, 1.0, shape, g.rng_mut());
        let node_id = g.new_input_node(&data, name);
        drop(g);
        self.wrap_node_id(node_id)
    }

    /// 创建参数节点，初始值由`init`用图的随机数生成器生成
    pub fn parameter(&self, shape: &[usize], init: Init, name: &str) -> Var {
        let mut g = self.inner.borrow_mut();
        let data = init.generate_with_rng(shape, g.rng_mut());
        let node_id = g.new_parameter_node(&data, Some(name));
        drop(g);
        self.wrap_node_id(node_id)
    }

    /// 用给定的张量创建参数节点
    pub fn parameter_from(&self, data: &Tensor, name: &str) -> Var {
        let node_id = self.inner.borrow_mut().new_parameter_node(data, Some(name));
        self.wrap_node_id(node_id)
    }

    // ==================== 训练控制 ====================

    /// 清零所有参数的梯度
    pub fn zero_grad(&self) -> Result<(), GraphError> {
        self.inner.borrow_mut().zero_grad()
    }

    /// 图中所有参数（按创建顺序）
    pub fn parameters(&self) -> Vec<Var> {
        let ids = self.inner.borrow().get_parameter_nodes();
        ids.into_iter().map(|id| self.wrap_node_id(id)).collect()
    }

    pub fn nodes_count(&self) -> usize {
        self.inner.borrow().nodes_count()
    }

    // ==================== 水位线 ====================

    /// 记录当前的水位线，之后可用`truncate_to`把图恢复到这一时刻
    pub fn watermark(&self) -> Watermark {
        self.inner.borrow().watermark()
    }

    /// 删除水位线之后创建的所有节点（反复执行前向/反向时避免图无限增长）
    pub fn truncate_to(&self, mark: Watermark) {
        self.inner.borrow_mut().truncate_to(mark);
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
