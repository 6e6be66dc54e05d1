use step_api::{ComponentError, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("key field '{0}' not found in message")]
    MissingField(String),

    #[error("key field '{field}' is {found}, expected a string or a number")]
    InvalidValue { field: String, found: &'static str },

    #[error("key function: {0}")]
    Function(String),

    #[error("unknown key function '{0}'")]
    UnknownFunction(String),
}

/// Ошибка обработки одного сообщения. Не классифицируется и не
/// восстанавливается: решение о retry принимает вызывающий.
#[derive(Debug, thiserror::Error)]
pub enum StepRunError {
    #[error("{0}")]
    Key(#[from] KeyError),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("consumer batch is empty, no payload to upload")]
    EmptyBatch,

    #[error("consumer: {0}")]
    Consumer(#[from] ComponentError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config ({context}): {detail}")]
    Invalid { context: &'static str, detail: String },

    #[error("config parse: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Key(#[from] KeyError),
}

impl ConfigError {
    pub(crate) fn invalid(context: &'static str, detail: impl Into<String>) -> Self {
        Self::Invalid { context, detail: detail.into() }
    }
}
