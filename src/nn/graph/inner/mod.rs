/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @Description  : GraphInner 计算图的底层实现
 *
 * 各 impl 块分散在子模块中：
 * - core.rs: 基础操作、水位线与截断
 * - backward.rs: VJP 反向传播
 * - node_builders.rs: new_*_node
 */

mod backward;
mod core;
mod node_builders;

use crate::nn::NodeId;
use crate::nn::nodes::NodeHandle;
use rand::rngs::StdRng;
use std::collections::{BTreeMap, HashMap};

/// 图的完整定义（核心实现）
///
/// 前向传播是即时的：算子节点创建时就已算出值。节点按 id 有序保存，
/// id 单调递增，所以按 id 升序遍历即为拓扑序，反向传播按 id 降序进行。
pub struct GraphInner {
    pub(in crate::nn::graph) nodes: BTreeMap<NodeId, NodeHandle>,
    /// 反向边：child_id -> parent_ids（子节点指向父节点，保持父节点顺序）
    pub(in crate::nn::graph) backward_edges: HashMap<NodeId, Vec<NodeId>>,
    pub(in crate::nn::graph) next_id: u64,
    /// 图级别的随机数生成器（用于输入与参数的初始化）
    /// None 表示尚未使用；首次使用时从系统熵初始化（非确定性）
    pub(in crate::nn::graph) rng: Option<StdRng>,
}

/// 图的“水位线”：记录某一时刻的下一个节点 id。
/// `truncate_to`会删除该时刻之后创建的所有节点，但不会回收 id，
/// 因此被删除节点的旧`Var`不会指向新节点，而是得到`NodeNotFound`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watermark(pub(in crate::nn) u64);

impl Default for GraphInner {
    fn default() -> Self {
        Self::new()
    }
}
