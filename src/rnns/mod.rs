/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : 循环网络基准模型工厂（LSTM 的四种前向写法）
 */

mod cells;
mod config;
mod definition;
mod error;
mod factory;
mod inputs;
mod strategy;

pub use cells::{flat_lstm_cell, lstm_cell, premul_lstm_cell};
pub use config::{DEFAULT_MAX_ELEMENTS, Device, LstmConfig, LstmConfigRecord, Strategy};
pub use definition::{
    Backward, BackwardInputs, BackwardSetup, ModelDefinition, ModelOutput, lstm_backward_setup,
    simple_backward, simple_backward_setup,
};
pub use error::FactoryError;
pub use factory::create;
pub use inputs::{LstmInputs, ModelInput, PARAMS_STRIDE, flatten_list, lstm_inputs, stack_weights};
pub use strategy::{
    FlatLstm, ForwardStrategy, MultilayerLstm, PremulLstm, StandardLstm, strategy_for,
};

#[cfg(test)]
mod tests;
