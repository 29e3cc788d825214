/*
 * @Author       : 老董
 * @Date         : 2026-02-13
 * @Description  : LSTM 基准的命令行入口：单次计时（bench）或批大小扫描（sweep）
 */

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fastrnns::analyzer::{DEFAULT_MAX_BATCH_SIZE, ModelMetadata, analyze};
use fastrnns::bench::{BenchConfig, run_bench, sweep_batch_sizes};
use fastrnns::rnns::{LstmConfig, create};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "fastrnns", version, about = "LSTM 前向/反向计时与批大小扫描")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 按配置创建模型并计时 forward 与 backward
    Bench {
        /// JSON 配置文件：`{"model": {...}, "bench": {...}}`，缺省字段取默认值
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// 按 1, 2, 4, … 扫描批大小并分析
    Sweep {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = DEFAULT_MAX_BATCH_SIZE)]
        max_batch_size: usize,
        /// 期望的建议批大小，缺省时取配置中的 batch_size
        #[arg(long)]
        default_batch_size: Option<usize>,
    },
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RunConfig {
    model: LstmConfig,
    bench: BenchConfig,
}

fn load_config(path: Option<&Path>) -> Result<RunConfig> {
    let Some(path) = path else {
        return Ok(RunConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("无法读取配置文件{}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("配置文件{}格式有误", path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Bench { config } => {
            let run = load_config(config.as_deref())?;
            info!("配置：{}", serde_json::to_string(&run)?);
            let definition = create(&run.model)?;
            let result = run_bench(&definition, &run.bench)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Sweep {
            config,
            max_batch_size,
            default_batch_size,
        } => {
            let run = load_config(config.as_deref())?;
            let default_batch_size = default_batch_size.unwrap_or(run.model.batch_size());
            let results = sweep_batch_sizes(&run.model, &run.bench, max_batch_size)?;
            let metadata = ModelMetadata::from_sweep(true, &results);
            let report = analyze(&metadata.eval_metrics_by_batch_size, default_batch_size);
            let verdict = metadata.check(default_batch_size);
            println!("{}", serde_json::to_string_pretty(&metadata)?);
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !verdict.is_pass() {
                anyhow::bail!("批大小分析未通过：{verdict:?}");
            }
        }
    }
    Ok(())
}
