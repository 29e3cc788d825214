/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @Description  : GraphInner 节点构建方法（new_*_node）
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::NodeId;
use crate::nn::OpKind;
use crate::nn::nodes::NodeHandle;
use crate::nn::nodes::raw_node::{Input, NodeType, Parameter};
use crate::tensor::Tensor;

impl GraphInner {
    /// 添加节点到列表
    fn add_node_to_list(
        &mut self,
        raw_node: NodeType,
        name: Option<&str>,
        node_type: &str,
        parents: &[NodeId],
    ) -> NodeId {
        let node_id = NodeId(self.next_id);
        self.next_id += 1;
        let node_name = match name {
            Some(name) => name.to_string(),
            None => format!("{node_type}_{}", node_id.0),
        };

        self.backward_edges.insert(node_id, parents.to_vec());
        self.nodes
            .insert(node_id, NodeHandle::new(node_id, &node_name, raw_node));
        node_id
    }

    /// 创建输入节点（不需要梯度的叶子节点）
    pub fn new_input_node(&mut self, value: &Tensor, name: Option<&str>) -> NodeId {
        self.add_node_to_list(Input::new(value).into(), name, "input", &[])
    }

    /// 创建参数节点（反向传播时累积梯度的叶子节点）
    pub fn new_parameter_node(&mut self, value: &Tensor, name: Option<&str>) -> NodeId {
        self.add_node_to_list(Parameter::new(value).into(), name, "parameter", &[])
    }

    /// 创建算子节点并即时算出其值。`parents`的顺序即算子操作数的顺序
    pub fn new_op_node(
        &mut self,
        op: &OpKind,
        parents: &[NodeId],
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let raw_node = {
            let parent_values = parents
                .iter()
                .map(|&id| self.get_node_value(id))
                .collect::<Result<Vec<_>, _>>()?;
            op.build(&parent_values)?
        };
        Ok(self.add_node_to_list(raw_node, name, op.type_name(), parents))
    }
}
