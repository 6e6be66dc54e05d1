/// Как consumer реагирует на ошибку компонента.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Неверная конфигурация компонента. Step не стартует.
    Config,
    /// Ошибка соединения или чтения потока. Consumer останавливается.
    Io,
    /// Payload не декодируется. Consumer пропускает фрейм и читает дальше.
    Format,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Config => f.write_str("config"),
            ErrorKind::Io => f.write_str("io"),
            ErrorKind::Format => f.write_str("format"),
        }
    }
}

/// Ошибка framing'а, codec'а, transport'а или consumer'а.
///
/// `kind` решает судьбу потока: `Format` пропускается,
/// остальные прерывают `poll`.
#[derive(Clone)]
pub struct ComponentError {
    kind: ErrorKind,
    message: String,
}

impl ComponentError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Config, message: msg.into() }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Io, message: msg.into() }
    }

    pub fn format_err(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Format, message: msg.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Debug for ComponentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::fmt::Display for ComponentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ComponentError {}

impl From<std::io::Error> for ComponentError {
    fn from(e: std::io::Error) -> Self { Self { kind: ErrorKind::Io, message: e.to_string() } }
}

impl From<serde_json::Error> for ComponentError {
    fn from(e: serde_json::Error) -> Self { Self { kind: ErrorKind::Format, message: e.to_string() } }
}

impl From<std::str::Utf8Error> for ComponentError {
    fn from(e: std::str::Utf8Error) -> Self { Self { kind: ErrorKind::Format, message: e.to_string() } }
}

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure of a single `put object` call.
///
/// `source` is the backend's own error (SDK error, I/O error, ...),
/// kept unchanged so callers can inspect or downcast it.
#[derive(Debug, thiserror::Error)]
#[error("put object '{object}' into bucket '{bucket}': {source}")]
pub struct StoreError {
    pub bucket: String,
    pub object: String,
    #[source]
    pub source: BoxError,
}

impl StoreError {
    pub fn new(bucket: &str, object: &str, source: impl Into<BoxError>) -> Self {
        Self {
            bucket: bucket.to_string(),
            object: object.to_string(),
            source: source.into(),
        }
    }
}
