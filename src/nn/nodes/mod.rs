/*
 * @Author       : 老董
 * @Date         : 2024-01-31 21:19:34
 * @Description  : 计算图节点：`NodeHandle`（图中保存的节点）+ `raw_node`（各类型节点的具体实现）
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-12 09:41:17
 */

mod node_handle;
pub(in crate::nn) mod raw_node;

pub(in crate::nn) use node_handle::NodeHandle;
pub use node_handle::NodeId;
pub use raw_node::OpKind;
