//! # fastrnns
//!
//! LSTM 基准测试的模型定义工厂：在一个小型的即时求值计算图上合成输入与参数，
//! 按四种写法（standard、premultiplied、flat、multilayer）组装 forward，
//! 并提供 backward_setup / backward 钩子，供基准驱动分别计时前向与反向。
//! 可选地把单步函数与时间步驱动函数分别编译（追踪后回放），
//! 还可以按批大小扫描并分析延迟与吞吐。
//!

pub mod analyzer;
pub mod bench;
pub mod errors;
pub mod nn;
pub mod rnns;
pub mod tensor;
pub mod utils;
