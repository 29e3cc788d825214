mod cells;
mod config;
mod factory;

use super::{LstmConfig, LstmConfigRecord, Strategy};

/// 小尺寸的测试配置：T=5，L=1，I=8，H=8，B=2，seed=42
fn small_record(strategy: Strategy) -> LstmConfigRecord {
    LstmConfigRecord {
        seq_length: 5,
        num_layers: 1,
        input_size: 8,
        hidden_size: 8,
        batch_size: 2,
        strategy,
        seed: Some(42),
        ..LstmConfigRecord::default()
    }
}

fn small_config(strategy: Strategy) -> LstmConfig {
    LstmConfig::try_from(small_record(strategy)).unwrap()
}
