use crate::assert_err;
use crate::rnns::{DEFAULT_MAX_ELEMENTS, Device, FactoryError, LstmConfig, LstmConfigRecord, Strategy};

use super::small_record;

#[test]
fn test_default_config() {
    let config = LstmConfig::default();
    assert_eq!(config.seq_length(), 100);
    assert_eq!(config.num_layers(), 1);
    assert_eq!(config.input_size(), 512);
    assert_eq!(config.hidden_size(), 512);
    assert_eq!(config.batch_size(), 64);
    assert_eq!(config.device(), Device::Cpu);
    assert_eq!(config.strategy(), Strategy::Standard);
    assert!(!config.compile());
    assert_eq!(config.seed(), None);
    assert_eq!(config.max_elements(), DEFAULT_MAX_ELEMENTS);
}

#[test]
fn test_zero_sizes_are_rejected() {
    for field in ["seq_length", "num_layers", "input_size", "hidden_size", "batch_size"] {
        let mut record = small_record(Strategy::Multilayer);
        match field {
            "seq_length" => record.seq_length = 0,
            "num_layers" => record.num_layers = 0,
            "input_size" => record.input_size = 0,
            "hidden_size" => record.hidden_size = 0,
            _ => record.batch_size = 0,
        }
        assert_err!(
            LstmConfig::try_from(record),
            FactoryError::InvalidConfiguration(msg) if msg.contains(field)
        );
    }
}

#[test]
fn test_single_layer_strategies_reject_multiple_layers() {
    for strategy in [Strategy::Standard, Strategy::Premultiplied, Strategy::Flat] {
        let record = LstmConfigRecord {
            num_layers: 2,
            ..small_record(strategy)
        };
        assert_err!(
            LstmConfig::try_from(record),
            FactoryError::InvalidConfiguration(msg) if msg.contains("只支持单层")
        );
    }
    let record = LstmConfigRecord {
        num_layers: 3,
        ..small_record(Strategy::Multilayer)
    };
    assert!(LstmConfig::try_from(record).is_ok());
}

#[test]
fn test_with_batch_size() {
    let config = LstmConfig::try_from(small_record(Strategy::Flat)).unwrap();
    let bigger = config.with_batch_size(16).unwrap();
    assert_eq!(bigger.batch_size(), 16);
    assert_eq!(bigger.strategy(), Strategy::Flat);
    assert_eq!(bigger.seed(), Some(42));
    assert_err!(
        config.with_batch_size(0),
        FactoryError::InvalidConfiguration("batch_size必须为正数")
    );
}

#[test]
fn test_estimated_elements() {
    // T=5, L=1, B=2, I=8, H=8
    let config = LstmConfig::try_from(small_record(Strategy::Standard)).unwrap();
    let inputs = 5 * 2 * 8 + 2 * 2 * 8;
    let params = 32 * 8 + 32 * 8 + 2 * 32;
    let activations = 5 * 2 * 8 * 8;
    assert_eq!(
        config.estimated_elements(),
        Some(inputs + params + activations)
    );
}

#[test]
fn test_device_parse_and_display() {
    assert_eq!("cpu".parse::<Device>().unwrap(), Device::Cpu);
    assert_eq!(" CUDA ".parse::<Device>().unwrap(), Device::Cuda(0));
    assert_eq!("cuda:1".parse::<Device>().unwrap(), Device::Cuda(1));
    assert_eq!(Device::Cuda(3).to_string(), "cuda:3");
    assert_err!(
        "tpu".parse::<Device>(),
        FactoryError::InvalidConfiguration(msg) if msg.contains("tpu")
    );
    assert_err!("cuda:x".parse::<Device>());
}

#[test]
fn test_device_availability() {
    assert!(Device::Cpu.ensure_available().is_ok());
    assert_err!(
        Device::Cuda(0).ensure_available(),
        FactoryError::DeviceUnavailable(msg) if msg.contains("cuda:0")
    );
    assert!(Device::Cpu.ensure_capacity(100, 100).is_ok());
    assert_err!(
        Device::Cpu.ensure_capacity(101, 100),
        FactoryError::DeviceUnavailable(msg) if msg.contains("容量不足")
    );
}

#[test]
fn test_deserialize_config() {
    let config: LstmConfig = serde_json::from_str(
        r#"{"seq_length": 5, "batch_size": 3, "device": "cuda:1", "strategy": "premultiplied", "compile": true, "seed": 7}"#,
    )
    .unwrap();
    assert_eq!(config.seq_length(), 5);
    assert_eq!(config.batch_size(), 3);
    assert_eq!(config.hidden_size(), 512);
    assert_eq!(config.device(), Device::Cuda(1));
    assert_eq!(config.strategy(), Strategy::Premultiplied);
    assert!(config.compile());
    assert_eq!(config.seed(), Some(7));

    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains(r#""device":"cuda:1""#));
    assert!(json.contains(r#""strategy":"premultiplied""#));
}

#[test]
fn test_deserialize_rejects_invalid_config() {
    let error = serde_json::from_str::<LstmConfig>(r#"{"batch_size": 0}"#).unwrap_err();
    assert!(error.to_string().contains("batch_size必须为正数"));

    let error = serde_json::from_str::<LstmConfig>(r#"{"batch": 4}"#).unwrap_err();
    assert!(error.to_string().contains("unknown field"));

    let error = serde_json::from_str::<LstmConfig>(r#"{"device": "tpu"}"#).unwrap_err();
    assert!(error.to_string().contains("tpu"));
}
