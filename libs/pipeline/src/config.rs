use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::key::{KeyFunctions, KeySpec};
use crate::step::StepMetadata;
use crate::ConfigError;

// ═══════════════════════════════════════════════════════════════
//  Key Config
// ═══════════════════════════════════════════════════════════════

/// `key = "candid"` или `key = { function = "last_source" }`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum KeyConfig {
    /// Имя поля сообщения (dot-notation).
    Field(String),
    /// Имя функции из [`KeyFunctions`].
    Function { function: String },
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self::Field("candid".into())
    }
}

// ═══════════════════════════════════════════════════════════════
//  Consumer Config
// ═══════════════════════════════════════════════════════════════

/// Источник сообщений: TCP transport + framing + codec.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsumerConfig {
    /// Адрес `host:port` producer'а фреймов.
    #[serde(default)]
    pub server: String,
    /// Формат payload'а: "avro" или "json".
    #[serde(default = "default_codec")]
    pub codec: String,
    /// `.avsc` для single-datum avro. Пусто: object container file.
    #[serde(default)]
    pub schema_path: String,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Конфигурация framing'а (`[consumer.framing]`), разбирается framing'ом.
    #[serde(default)]
    pub framing: Option<toml::Value>,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            server: String::new(),
            codec: default_codec(),
            schema_path: String::new(),
            connect_timeout_ms: default_connect_timeout_ms(),
            framing: None,
        }
    }
}

fn default_codec() -> String {
    "avro".into()
}
fn default_connect_timeout_ms() -> u64 {
    10_000
}

// ═══════════════════════════════════════════════════════════════
//  Storage Config
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    S3,
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket_name: String,
    pub region_name: String,
    /// S3-совместимый endpoint (minio, localstack). Пусто: AWS.
    pub endpoint_url: String,
    /// Разворачивать key перед именованием объекта.
    pub reverse_key: bool,
    /// Лимит объектов memory backend'а. `None`: значение по умолчанию backend'а.
    pub max_objects: Option<usize>,
}

// ═══════════════════════════════════════════════════════════════
//  StepConfig
// ═══════════════════════════════════════════════════════════════

/// Корень конфигурационного файла.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StepConfig {
    #[serde(default)]
    pub key: KeyConfig,
    #[serde(default)]
    pub step: StepMetadata,
    #[serde(default)]
    pub consumer: ConsumerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl StepConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Проверка после применения CLI/env override'ов.
    pub fn validate(&self, functions: &KeyFunctions) -> Result<(), ConfigError> {
        if self.consumer.server.trim().is_empty() {
            return Err(ConfigError::invalid("consumer", "'server' must not be empty"));
        }
        if !matches!(self.consumer.codec.as_str(), "avro" | "json") {
            return Err(ConfigError::invalid(
                "consumer",
                format!("unknown codec '{}', expected avro or json", self.consumer.codec),
            ));
        }
        if self.storage.bucket_name.trim().is_empty() {
            return Err(ConfigError::invalid("storage", "'bucket_name' must not be empty"));
        }
        if self.storage.backend == StorageBackend::S3 && self.storage.region_name.trim().is_empty() {
            return Err(ConfigError::invalid("storage", "'region_name' is required for the s3 backend"));
        }
        self.key_spec(functions)?;
        Ok(())
    }

    pub fn key_spec(&self, functions: &KeyFunctions) -> Result<KeySpec, ConfigError> {
        Ok(functions.resolve(&self.key)?)
    }
}

/// Разобрать `Option<toml::Value>` компонента в его typed config.
/// Отсутствующая секция даёт `T::default()`.
pub fn component_config<T>(context: &'static str, val: &Option<toml::Value>) -> Result<T, ConfigError>
where
    T: DeserializeOwned + Default,
{
    match val {
        Some(v) => v
            .clone()
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::invalid(context, e.to_string())),
        None => Ok(T::default()),
    }
}
