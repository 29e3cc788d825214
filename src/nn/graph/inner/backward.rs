/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @Description  : GraphInner VJP 反向传播
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::NodeId;
use crate::tensor::Tensor;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

impl GraphInner {
    // ========== VJP 反向传播核心 ==========

    /// 以`upstream_grad`为`root`节点的上游梯度做反向传播，梯度累积到可达的参数节点上。
    ///
    /// - `upstream_grad`的形状必须与`root`的值一致，否则返回`ShapeMismatch`
    /// - 参数节点的梯度是累积的（多次调用会相加），需要时先调用`zero_grad`
    pub fn backward_with_grad(
        &mut self,
        root: NodeId,
        upstream_grad: &Tensor,
    ) -> Result<(), GraphError> {
        let root_shape = self.get_node_value_expected_shape(root)?;
        if root_shape != upstream_grad.shape() {
            return Err(GraphError::ShapeMismatch {
                expected: root_shape.to_vec(),
                got: upstream_grad.shape().to_vec(),
                message: "上游梯度的形状必须与反向传播起点节点的值一致".to_string(),
            });
        }

        let needs_grad = self.nodes_requiring_grad(root);
        let mut pending: HashMap<NodeId, Tensor> = HashMap::new();
        pending.insert(root, upstream_grad.clone());
        let mut param_grads = Vec::new();

        // id 降序即逆拓扑序
        for (&id, node) in self.nodes.range(..=root).rev() {
            let Some(grad) = pending.remove(&id) else {
                continue;
            };
            if node.is_parameter() {
                param_grads.push((id, grad));
                continue;
            }

            let parent_ids = self.backward_edges.get(&id).map_or(&[][..], Vec::as_slice);
            let parent_values = parent_ids
                .iter()
                .map(|&parent_id| self.get_node_value(parent_id))
                .collect::<Result<Vec<_>, _>>()?;
            for (index, &parent_id) in parent_ids.iter().enumerate() {
                if !needs_grad.contains(&parent_id) {
                    continue;
                }
                let parent_grad = node.calc_grad_to_parent(index, &parent_values, &grad)?;
                match pending.entry(parent_id) {
                    Entry::Occupied(mut entry) => {
                        let sum = entry.get() + &parent_grad;
                        entry.insert(sum);
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(parent_grad);
                    }
                }
            }
        }

        for (id, grad) in param_grads {
            let node = self.get_node_mut(id)?;
            let accumulated = match node.grad() {
                Some(existing) => existing + &grad,
                None => grad,
            };
            node.set_grad(Some(&accumulated))?;
        }
        Ok(())
    }

    /// 清零所有参数的梯度
    pub fn zero_grad(&mut self) -> Result<(), GraphError> {
        for node in self.nodes.values_mut().filter(|node| node.is_parameter()) {
            node.set_grad(None)?;
        }
        Ok(())
    }

    /// 计算`root`（含）之前哪些节点需要梯度：参数节点，以及任一父节点需要梯度的算子节点。
    /// 只依赖输入的分支在反向时直接跳过
    fn nodes_requiring_grad(&self, root: NodeId) -> HashSet<NodeId> {
        let mut needs_grad = HashSet::new();
        for (&id, node) in self.nodes.range(..=root) {
            let from_parents = self
                .backward_edges
                .get(&id)
                .is_some_and(|parents| parents.iter().any(|p| needs_grad.contains(p)));
            if node.is_parameter() || from_parents {
                needs_grad.insert(id);
            }
        }
        needs_grad
    }
}
