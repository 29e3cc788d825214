/*
 * @Author       : 老董
 * @Description  : 工厂测试：形状、可复现性、错误路径
 */

use crate::assert_err;
use crate::nn::GraphError;
use crate::rnns::{
    Device, FactoryError, LstmConfig, LstmConfigRecord, ModelInput, Strategy, create,
};

use super::{small_config, small_record};

#[test]
fn test_small_standard_scenario() -> Result<(), FactoryError> {
    let definition = create(&small_config(Strategy::Standard))?;
    let inputs = definition.inputs();
    assert_eq!(inputs.len(), 6);
    assert_eq!(inputs[0].as_tensor()?.value_expected_shape()?, [5, 2, 8]);
    let (hx, cx) = inputs[1].as_pair()?;
    assert_eq!(hx.value_expected_shape()?, [1, 2, 8]);
    assert_eq!(cx.value_expected_shape()?, [1, 2, 8]);

    let shapes = definition
        .parameters()
        .iter()
        .map(|p| p.value_expected_shape())
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(shapes, vec![vec![32, 8], vec![32, 8], vec![32], vec![32]]);

    let output = definition.run_forward()?;
    assert_eq!(output.primary().value_expected_shape()?, [5, 2, 8]);
    assert_eq!(output.hidden().value_expected_shape()?, [1, 2, 8]);
    assert_eq!(output.cell().value_expected_shape()?, [1, 2, 8]);
    Ok(())
}

#[test]
fn test_input_layout_per_strategy() -> Result<(), FactoryError> {
    let flat = create(&small_config(Strategy::Flat))?;
    assert_eq!(flat.inputs().len(), 7);
    assert!(
        flat.inputs()
            .iter()
            .all(|input| matches!(input, ModelInput::Tensor(_)))
    );
    assert_eq!(flat.inputs()[1].as_tensor()?.value_expected_shape()?, [2, 8]);

    let premul = create(&small_config(Strategy::Premultiplied))?;
    assert_eq!(premul.inputs().len(), 6);

    let multilayer = create(&small_config(Strategy::Multilayer))?;
    let inputs = multilayer.inputs();
    assert_eq!(inputs.len(), 3);
    assert_eq!(inputs[2].as_list()?.len(), 4);
    Ok(())
}

#[test]
fn test_parameters_are_exactly_the_graph_parameters() -> Result<(), FactoryError> {
    let record = LstmConfigRecord {
        num_layers: 3,
        ..small_record(Strategy::Multilayer)
    };
    let definition = create(&LstmConfig::try_from(record)?)?;
    let ids = definition
        .parameters()
        .iter()
        .map(|p| p.node_id())
        .collect::<Vec<_>>();
    let graph_ids = definition
        .graph()
        .parameters()
        .iter()
        .map(|p| p.node_id())
        .collect::<Vec<_>>();
    assert_eq!(ids, graph_ids);
    assert_eq!(ids.len(), 12);
    Ok(())
}

#[test]
fn test_fixed_seed_is_bit_identical() -> Result<(), FactoryError> {
    for strategy in [
        Strategy::Standard,
        Strategy::Premultiplied,
        Strategy::Flat,
        Strategy::Multilayer,
    ] {
        let a = create(&small_config(strategy))?;
        let b = create(&small_config(strategy))?;
        assert_eq!(
            a.inputs()[0].as_tensor()?.value()?,
            b.inputs()[0].as_tensor()?.value()?
        );
        for (pa, pb) in a.parameters().iter().zip(b.parameters()) {
            assert_eq!(pa.value()?, pb.value()?);
        }
    }

    let other_seed = LstmConfig::try_from(LstmConfigRecord {
        seed: Some(43),
        ..small_record(Strategy::Standard)
    })?;
    let a = create(&small_config(Strategy::Standard))?;
    let c = create(&other_seed)?;
    assert_ne!(
        a.inputs()[0].as_tensor()?.value()?,
        c.inputs()[0].as_tensor()?.value()?
    );
    Ok(())
}

#[test]
fn test_seed_zero_is_a_seed() -> Result<(), FactoryError> {
    let config = LstmConfig::try_from(LstmConfigRecord {
        seed: Some(0),
        ..small_record(Strategy::Flat)
    })?;
    let a = create(&config)?;
    let b = create(&config)?;
    assert_eq!(a.parameters()[0].value()?, b.parameters()[0].value()?);
    Ok(())
}

#[test]
fn test_parameters_are_uniformly_bounded() -> Result<(), FactoryError> {
    let definition = create(&small_config(Strategy::Standard))?;
    let bound = 1.0 / 8.0_f32.sqrt();
    for parameter in definition.parameters() {
        assert!(parameter.value()?.to_vec().iter().all(|x| x.abs() <= bound));
    }
    Ok(())
}

#[test]
fn test_unavailable_device() {
    let config = LstmConfig::try_from(LstmConfigRecord {
        device: Device::Cuda(0),
        ..small_record(Strategy::Standard)
    })
    .unwrap();
    assert_err!(create(&config), FactoryError::DeviceUnavailable { .. });
}

#[test]
fn test_capacity_exceeded() {
    let config = LstmConfig::try_from(LstmConfigRecord {
        max_elements: 100,
        ..small_record(Strategy::Standard)
    })
    .unwrap();
    assert_err!(
        create(&config),
        FactoryError::DeviceUnavailable(msg) if msg.contains("容量不足")
    );
}

#[test]
fn test_capacity_estimate_overflow() {
    let config = LstmConfig::try_from(LstmConfigRecord {
        input_size: 1 << 40,
        hidden_size: 1 << 40,
        ..small_record(Strategy::Standard)
    })
    .unwrap();
    assert_eq!(config.estimated_elements(), None);
    assert_err!(
        create(&config),
        FactoryError::DeviceUnavailable(msg) if msg.contains("容量不足")
    );
}

#[test]
fn test_forward_arity_mismatch() -> Result<(), FactoryError> {
    let definition = create(&small_config(Strategy::Standard))?;
    assert_err!(
        definition.forward(&definition.inputs()[..5]),
        FactoryError::ArityMismatch {
            expected: 6,
            got: 5
        }
    );

    let multilayer = create(&small_config(Strategy::Multilayer))?;
    assert_err!(
        multilayer.forward(definition.inputs()),
        FactoryError::ArityMismatch {
            expected: 3,
            got: 6
        }
    );
    Ok(())
}

#[test]
fn test_forward_rejects_wrong_input_kind() -> Result<(), FactoryError> {
    let definition = create(&small_config(Strategy::Standard))?;
    let mut inputs = definition.inputs().to_vec();
    inputs.swap(0, 1);
    assert_err!(
        definition.forward(&inputs),
        FactoryError::InvalidConfiguration(msg) if msg.contains("二元组")
    );
    Ok(())
}

#[test]
fn test_forward_with_mismatched_shapes_is_graph_error() -> Result<(), FactoryError> {
    let definition = create(&small_config(Strategy::Standard))?;
    let mut inputs = definition.inputs().to_vec();
    // b_ih 与 w_ih 对调：一维的偏置无法转置
    inputs.swap(2, 4);
    assert_err!(
        definition.forward(&inputs),
        FactoryError::Graph(GraphError::InvalidOperation(msg)) if msg.contains("Transpose")
    );
    Ok(())
}

#[test]
fn test_reset_releases_forward_nodes() -> Result<(), FactoryError> {
    let definition = create(&small_config(Strategy::Premultiplied))?;
    let before = definition.graph().nodes_count();

    let output = definition.run_forward()?;
    let grads = definition.backward_setup(&output)?;
    definition.backward(&grads)?;
    assert!(definition.graph().nodes_count() > before);
    assert!(definition.parameters()[0].grad()?.is_some());

    definition.reset()?;
    assert_eq!(definition.graph().nodes_count(), before);
    assert_eq!(definition.parameters()[0].grad()?, None);
    // 被删除的节点不能再访问
    assert_err!(output.primary().value(), GraphError::NodeNotFound { .. });

    // 重置后可以再次执行
    let again = definition.run_forward()?;
    assert_eq!(again.hidden().value_expected_shape()?, [1, 2, 8]);
    Ok(())
}
