/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : ModelDefinitionFactory：按配置合成输入与参数，选出前向策略并打包成 ModelDefinition
 */

use super::definition::{
    Backward, BackwardSetup, ModelDefinition, ModelOutput, lstm_backward_setup, simple_backward,
};
use super::inputs::{ModelInput, flatten_list, lstm_inputs};
use super::strategy::strategy_for;
use super::{FactoryError, LstmConfig, Strategy};
use crate::nn::Graph;
use log::debug;

/// 按配置创建一个 LSTM 基准模型定义。
///
/// 所有张量都在新建的图上一次性创建；给定`seed`时两次调用得到逐位相同的输入与参数。
/// 设备不可用或容量不足时返回`DeviceUnavailable`。
pub fn create(config: &LstmConfig) -> Result<ModelDefinition, FactoryError> {
    let device = config.device();
    device.ensure_available()?;
    let required = config.estimated_elements().ok_or_else(|| {
        FactoryError::DeviceUnavailable(format!("{device}容量不足：所需元素个数超出可寻址范围"))
    })?;
    device.ensure_capacity(required, config.max_elements())?;

    let graph = config.seed().map_or_else(Graph::new, Graph::new_with_seed);
    let synthesized = lstm_inputs(&graph, config);
    let parameters = flatten_list(&synthesized.params);

    let inputs = match config.strategy() {
        Strategy::Standard | Strategy::Premultiplied => {
            let mut inputs = vec![
                ModelInput::Tensor(synthesized.x),
                ModelInput::Pair(synthesized.hx, synthesized.cx),
            ];
            inputs.extend(parameters.iter().cloned().map(ModelInput::Tensor));
            inputs
        }
        Strategy::Flat => {
            let mut inputs = vec![
                ModelInput::Tensor(synthesized.x),
                ModelInput::Tensor(synthesized.hx.select(0)?),
                ModelInput::Tensor(synthesized.cx.select(0)?),
            ];
            inputs.extend(parameters.iter().cloned().map(ModelInput::Tensor));
            inputs
        }
        Strategy::Multilayer => vec![
            ModelInput::Tensor(synthesized.x),
            ModelInput::Pair(synthesized.hx, synthesized.cx),
            ModelInput::List(parameters.clone()),
        ],
    };

    let seed = config.seed();
    let backward_setup = BackwardSetup::Custom(Box::new(move |outputs: &ModelOutput| {
        lstm_backward_setup(outputs, seed)
    }));
    let backward = Backward::Custom(Box::new(simple_backward));

    debug!(
        "创建LSTM模型定义：策略={}，编译={}，T={}，L={}，B={}，I={}，H={}，设备={}，{}个输入，{}个参数",
        config.strategy(),
        config.compile(),
        config.seq_length(),
        config.num_layers(),
        config.batch_size(),
        config.input_size(),
        config.hidden_size(),
        config.device(),
        inputs.len(),
        parameters.len()
    );

    Ok(ModelDefinition::new(
        graph,
        inputs,
        parameters,
        strategy_for(config),
        backward_setup,
        backward,
        config.clone(),
    ))
}
