/*
 * @Author       : 老董
 * @Date         : 2024-01-31 20:23:53
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-12 10:15:08
 * @Description  : 计算图运行时：即时前向、VJP反向传播、图编译（jit）
 */

mod graph;
pub mod jit;
mod nodes;
mod var;

pub use graph::{Graph, GraphError, GraphInner, Watermark};
pub use nodes::{NodeId, OpKind};
pub use var::{Init, Var};

#[cfg(test)]
mod tests;
