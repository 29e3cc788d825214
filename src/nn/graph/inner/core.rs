/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @Description  : GraphInner 核心操作：创建、访问器、水位线与截断
 */

use super::super::error::GraphError;
use super::{GraphInner, Watermark};
use crate::nn::NodeId;
use crate::nn::OpKind;
use crate::nn::nodes::NodeHandle;
use crate::tensor::Tensor;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::{BTreeMap, HashMap};

impl GraphInner {
    // ========== 创建 ==========

    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            backward_edges: HashMap::new(),
            next_id: 0,
            rng: None,
        }
    }

    /// 创建一个带固定种子的计算图（确保可重复性）
    pub fn new_with_seed(seed: u64) -> Self {
        Self {
            rng: Some(StdRng::seed_from_u64(seed)),
            ..Self::new()
        }
    }

    // ========== 基础访问器 ==========

    /// 图级别的随机数生成器，未设置种子时从系统熵初始化
    pub fn rng_mut(&mut self) -> &mut StdRng {
        self.rng.get_or_insert_with(StdRng::from_entropy)
    }

    pub fn nodes(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    pub(in crate::nn) fn get_node(&self, id: NodeId) -> Result<&NodeHandle, GraphError> {
        self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))
    }

    pub(in crate::nn) fn get_node_mut(
        &mut self,
        id: NodeId,
    ) -> Result<&mut NodeHandle, GraphError> {
        self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))
    }

    pub fn get_node_parents(&self, id: NodeId) -> Result<Vec<NodeId>, GraphError> {
        // 先检查节点是否存在
        let _ = self.get_node(id)?;
        Ok(self.backward_edges.get(&id).cloned().unwrap_or_default())
    }

    pub fn get_node_name(&self, id: NodeId) -> Result<&str, GraphError> {
        Ok(self.get_node(id)?.name())
    }

    pub fn get_node_value(&self, id: NodeId) -> Result<&Tensor, GraphError> {
        Ok(self.get_node(id)?.value())
    }

    /// 手动设置叶子节点（输入/参数）的值。算子节点的值由父节点决定，不可设置；
    /// 已经创建的下游节点不会被重新计算
    pub fn set_node_value(&mut self, id: NodeId, value: &Tensor) -> Result<(), GraphError> {
        self.get_node_mut(id)?.set_value(value)
    }

    pub fn get_node_value_expected_shape(&self, id: NodeId) -> Result<&[usize], GraphError> {
        Ok(self.get_node(id)?.value().shape())
    }

    /// 节点累积的梯度。只有参数节点会有梯度
    pub fn get_node_grad(&self, id: NodeId) -> Result<Option<&Tensor>, GraphError> {
        let node = self.get_node(id)?;
        if !node.is_parameter() {
            return Err(GraphError::InvalidOperation(format!(
                "{node}不是参数节点，不会保存梯度"
            )));
        }
        Ok(node.grad())
    }

    /// 算子节点的算子描述；叶子节点返回None
    pub fn get_node_op_kind(&self, id: NodeId) -> Result<Option<OpKind>, GraphError> {
        Ok(self.get_node(id)?.op_kind())
    }

    pub fn is_parameter_node(&self, id: NodeId) -> Result<bool, GraphError> {
        Ok(self.get_node(id)?.is_parameter())
    }

    /// 图中所有参数节点（按创建顺序）
    pub fn get_parameter_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|node| node.is_parameter())
            .map(NodeHandle::id)
            .collect()
    }

    // ========== 水位线与截断 ==========

    /// 记录当前时刻的水位线
    pub const fn watermark(&self) -> Watermark {
        Watermark(self.next_id)
    }

    /// 水位线之后（含）创建的所有节点，按创建顺序
    pub fn nodes_since(&self, mark: Watermark) -> Vec<NodeId> {
        self.nodes
            .range(NodeId(mark.0)..)
            .map(|(&id, _)| id)
            .collect()
    }

    /// 删除水位线之后创建的所有节点（释放其中间结果），水位线之前的节点与梯度不受影响
    pub fn truncate_to(&mut self, mark: Watermark) {
        let removed = self.nodes.split_off(&NodeId(mark.0));
        for id in removed.keys() {
            self.backward_edges.remove(id);
        }
    }
}
