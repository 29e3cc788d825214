/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : LSTM 基准模型的配置：设备、前向策略与经过校验的配置记录
 */

use super::FactoryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 默认的设备容量（元素个数，f32 下约 4 GiB）
pub const DEFAULT_MAX_ELEMENTS: usize = 1 << 30;

/// 张量所在的设备。本运行时只能在 CPU 上分配
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Device {
    #[default]
    Cpu,
    Cuda(usize),
}

impl Device {
    /// 检查本运行时能否在该设备上分配张量
    pub fn ensure_available(&self) -> Result<(), FactoryError> {
        match self {
            Self::Cpu => Ok(()),
            Self::Cuda(_) => Err(FactoryError::DeviceUnavailable(format!(
                "本运行时只支持cpu，无法在{self}上分配张量"
            ))),
        }
    }

    /// 检查设备能否容纳`required`个元素
    pub fn ensure_capacity(&self, required: usize, max_elements: usize) -> Result<(), FactoryError> {
        self.ensure_available()?;
        if required > max_elements {
            return Err(FactoryError::DeviceUnavailable(format!(
                "{self}容量不足：需要约{required}个元素，上限为{max_elements}个"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Cuda(index) => write!(f, "cuda:{index}"),
        }
    }
}

impl FromStr for Device {
    type Err = FactoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "cpu" => Ok(Self::Cpu),
            "cuda" => Ok(Self::Cuda(0)),
            _ => s
                .strip_prefix("cuda:")
                .and_then(|index| index.parse().ok())
                .map(Self::Cuda)
                .ok_or_else(|| FactoryError::InvalidConfiguration(format!("无法识别的设备：{s}"))),
        }
    }
}

impl TryFrom<String> for Device {
    type Error = FactoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Device> for String {
    fn from(device: Device) -> Self {
        device.to_string()
    }
}

/// 前向策略：同一个 LSTM 递推的四种写法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// 每步单独计算 x_t @ w_ih^T
    #[default]
    Standard,
    /// 循环前一次性算好整段序列的 x @ w_ih^T
    Premultiplied,
    /// 扁平参数（不使用元组），不收集每步输出
    Flat,
    /// 多层，参数按每层4个平铺
    Multilayer,
}

impl Strategy {
    /// 是否只支持单层
    pub const fn is_single_layer(&self) -> bool {
        !matches!(self, Self::Multilayer)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Standard => "standard",
            Self::Premultiplied => "premultiplied",
            Self::Flat => "flat",
            Self::Multilayer => "multilayer",
        };
        write!(f, "{name}")
    }
}

/// 未经校验的配置记录（反序列化的直接目标），缺省字段取默认值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LstmConfigRecord {
    pub seq_length: usize,
    pub num_layers: usize,
    pub input_size: usize,
    pub hidden_size: usize,
    pub batch_size: usize,
    pub device: Device,
    pub strategy: Strategy,
    /// 是否分别编译单步函数（cell）与时间步驱动函数
    pub compile: bool,
    pub seed: Option<u64>,
    /// 设备容量（元素个数）
    pub max_elements: usize,
}

impl Default for LstmConfigRecord {
    fn default() -> Self {
        Self {
            seq_length: 100,
            num_layers: 1,
            input_size: 512,
            hidden_size: 512,
            batch_size: 64,
            device: Device::Cpu,
            strategy: Strategy::Standard,
            compile: false,
            seed: None,
            max_elements: DEFAULT_MAX_ELEMENTS,
        }
    }
}

/// 经过校验的配置。只能通过`TryFrom<LstmConfigRecord>`（或反序列化）得到
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "LstmConfigRecord", into = "LstmConfigRecord")]
pub struct LstmConfig {
    record: LstmConfigRecord,
}

impl TryFrom<LstmConfigRecord> for LstmConfig {
    type Error = FactoryError;

    fn try_from(record: LstmConfigRecord) -> Result<Self, Self::Error> {
        for (name, value) in [
            ("seq_length", record.seq_length),
            ("num_layers", record.num_layers),
            ("input_size", record.input_size),
            ("hidden_size", record.hidden_size),
            ("batch_size", record.batch_size),
            ("max_elements", record.max_elements),
        ] {
            if value == 0 {
                return Err(FactoryError::InvalidConfiguration(format!(
                    "{name}必须为正数"
                )));
            }
        }
        if record.strategy.is_single_layer() && record.num_layers != 1 {
            return Err(FactoryError::InvalidConfiguration(format!(
                "{}策略只支持单层，但num_layers为{}",
                record.strategy, record.num_layers
            )));
        }
        Ok(Self { record })
    }
}

impl From<LstmConfig> for LstmConfigRecord {
    fn from(config: LstmConfig) -> Self {
        config.record
    }
}

impl LstmConfig {
    pub const fn seq_length(&self) -> usize {
        self.record.seq_length
    }

    pub const fn num_layers(&self) -> usize {
        self.record.num_layers
    }

    pub const fn input_size(&self) -> usize {
        self.record.input_size
    }

    pub const fn hidden_size(&self) -> usize {
        self.record.hidden_size
    }

    pub const fn batch_size(&self) -> usize {
        self.record.batch_size
    }

    pub const fn device(&self) -> Device {
        self.record.device
    }

    pub const fn strategy(&self) -> Strategy {
        self.record.strategy
    }

    pub const fn compile(&self) -> bool {
        self.record.compile
    }

    pub const fn seed(&self) -> Option<u64> {
        self.record.seed
    }

    pub const fn max_elements(&self) -> usize {
        self.record.max_elements
    }

    pub const fn record(&self) -> &LstmConfigRecord {
        &self.record
    }

    /// 换一个批大小（其余不变），用于批大小扫描
    pub fn with_batch_size(&self, batch_size: usize) -> Result<Self, FactoryError> {
        Self::try_from(LstmConfigRecord {
            batch_size,
            ..self.record.clone()
        })
    }

    /// 估算一次前向需要的元素个数：输入、隐状态、参数，以及每层每步的门激活（约8H）。
    ///
    /// 超出`usize`范围时返回`None`。
    pub fn estimated_elements(&self) -> Option<usize> {
        let (t, l, b, i, h) = (
            self.seq_length(),
            self.num_layers(),
            self.batch_size(),
            self.input_size(),
            self.hidden_size(),
        );
        let product = |factors: &[usize]| {
            factors
                .iter()
                .try_fold(1usize, |acc, &factor| acc.checked_mul(factor))
        };
        [
            // 输入 x 与 hx/cx
            product(&[t, b, i])?,
            product(&[2, l, b, h])?,
            // 参数
            product(&[4, h, i])?,
            product(&[l - 1, 4, h, h])?,
            product(&[l, 4, h, h])?,
            product(&[l, 8, h])?,
            // 激活
            product(&[t, l, b, 8, h])?,
        ]
        .into_iter()
        .try_fold(0usize, usize::checked_add)
    }
}
