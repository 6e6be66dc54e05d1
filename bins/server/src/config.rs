use clap::builder::FalseyValueParser;
use clap::{Args, Parser, Subcommand};

use step_pipeline::StepConfig;

use crate::error::AppError;

#[derive(Parser)]
#[command(name = "s3-step", about = "Архивирование alert'ов в S3")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Читать сообщения из consumer'а и загружать их в bucket
    Run(RunArgs),
}

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Путь к TOML конфиг файлу
    #[arg(long, default_value = "config.toml", env = "CONFIG_PATH")]
    pub config: String,

    /// `host:port` consumer'а, перекрывает consumer.server
    #[arg(long, env = "CONSUMER_SERVER")]
    pub consumer_server: Option<String>,

    /// Перекрывает storage.bucket_name
    #[arg(long, env = "BUCKET_NAME")]
    pub bucket_name: Option<String>,

    /// Перекрывает storage.region_name
    #[arg(long, env = "REGION_NAME")]
    pub region_name: Option<String>,

    /// Уровень логирования debug (если RUST_LOG не задан).
    /// `LOGGING_DEBUG` выключен только значениями false/0/no/off/пусто.
    #[arg(long, env = "LOGGING_DEBUG", value_parser = FalseyValueParser::new())]
    pub logging_debug: bool,
}

// ---- TOML Config ----

pub fn load(path: &str) -> Result<StepConfig, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config { context: "read", detail: format!("'{path}': {e}") })?;
    StepConfig::from_toml_str(&content)
        .map_err(|e| AppError::Config { context: "parse", detail: format!("'{path}': {e}") })
}

/// CLI/env значения важнее файла.
pub fn apply_overrides(cfg: &mut StepConfig, args: &RunArgs) {
    if let Some(server) = &args.consumer_server {
        cfg.consumer.server = server.clone();
    }
    if let Some(bucket) = &args.bucket_name {
        cfg.storage.bucket_name = bucket.clone();
    }
    if let Some(region) = &args.region_name {
        cfg.storage.region_name = region.clone();
    }
}
