use super::raw_node::{NodeType, OpKind, TraitNode};
use crate::nn::GraphError;
use crate::tensor::Tensor;
use std::fmt;

/// 节点在图中的唯一标识。id 单调递增，因此 id 的大小顺序同时也是节点的拓扑顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 图中保存的节点：id + 名称 + 具体类型的节点
#[derive(Clone)]
pub(in crate::nn) struct NodeHandle {
    id: NodeId,
    name: String,
    raw_node: NodeType,
}

impl NodeHandle {
    pub(in crate::nn) fn new<T: Into<NodeType>>(id: NodeId, name: &str, raw_node: T) -> Self {
        Self {
            id,
            name: name.to_string(),
            raw_node: raw_node.into(),
        }
    }

    pub(in crate::nn) const fn id(&self) -> NodeId {
        self.id
    }

    pub(in crate::nn) fn name(&self) -> &str {
        &self.name
    }

    pub(in crate::nn) fn type_name(&self) -> &'static str {
        self.raw_node.type_name()
    }

    pub(in crate::nn) fn node_type(&self) -> &NodeType {
        &self.raw_node
    }

    pub(in crate::nn) fn value(&self) -> &Tensor {
        self.raw_node.value()
    }

    pub(in crate::nn) fn set_value(&mut self, value: &Tensor) -> Result<(), GraphError> {
        if value.shape() != self.value().shape() {
            return Err(GraphError::ShapeMismatch {
                expected: self.value().shape().to_vec(),
                got: value.shape().to_vec(),
                message: format!("{self}的新值形状必须与原值一致"),
            });
        }
        self.raw_node.set_value(value)
    }

    pub(in crate::nn) fn grad(&self) -> Option<&Tensor> {
        self.raw_node.grad()
    }

    pub(in crate::nn) fn set_grad(&mut self, grad: Option<&Tensor>) -> Result<(), GraphError> {
        self.raw_node.set_grad(grad)
    }

    pub(in crate::nn) fn calc_grad_to_parent(
        &self,
        parent_index: usize,
        parents: &[&Tensor],
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        self.raw_node
            .calc_grad_to_parent(parent_index, parents, upstream_grad)
    }

    pub(in crate::nn) fn op_kind(&self) -> Option<OpKind> {
        self.raw_node.op_kind()
    }

    pub(in crate::nn) const fn is_parameter(&self) -> bool {
        matches!(self.raw_node, NodeType::Parameter(_))
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "节点[id={}, name={}, type={}]",
            self.id,
            self.name,
            self.type_name()
        )
    }
}
