use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use step_api::{Message, resolve_path};

use crate::config::KeyConfig;
use crate::KeyError;

/// Чистая функция message → key.
pub type KeyFn = Arc<dyn Fn(&Message) -> Result<String, KeyError> + Send + Sync>;

// ═══════════════════════════════════════════════════════════════
//  KeySpec
// ═══════════════════════════════════════════════════════════════

/// Как получить object key из сообщения: имя поля или функция.
#[derive(Clone)]
pub enum KeySpec {
    /// Поле сообщения. Если такого ключа нет, путь читается как
    /// dot-notation для вложенных (`"candidate.candid"`).
    Field(String),
    /// Произвольная функция, результат используется как есть.
    Function(KeyFn),
}

impl KeySpec {
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&Message) -> Result<String, KeyError> + Send + Sync + 'static,
    {
        Self::Function(Arc::new(f))
    }

    pub fn derive(&self, message: &Message) -> Result<String, KeyError> {
        match self {
            KeySpec::Function(f) => f(message),
            KeySpec::Field(path) => {
                // Буквальное имя поля важнее вложенного пути.
                let value = message
                    .get(path.as_str())
                    .or_else(|| resolve_path(message, path))
                    .ok_or_else(|| KeyError::MissingField(path.clone()))?;
                key_string(path, value)
            }
        }
    }
}

impl std::fmt::Debug for KeySpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySpec::Field(path) => f.debug_tuple("Field").field(path).finish(),
            KeySpec::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// Render a scalar message value as key text: strings as-is, numbers and
/// booleans in their JSON form (`123` → `"123"`).
pub fn key_string(field: &str, value: &Value) -> Result<String, KeyError> {
    let found = match value {
        Value::String(s) => return Ok(s.clone()),
        Value::Number(n) => return Ok(n.to_string()),
        Value::Bool(b) => return Ok(b.to_string()),
        Value::Null => "null",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    };
    Err(KeyError::InvalidValue { field: field.to_string(), found })
}

// ═══════════════════════════════════════════════════════════════
//  Built-in key functions
// ═══════════════════════════════════════════════════════════════

/// `"{objectid}_{sourceid}"` последнего source'а объекта (максимальный
/// `mjd`). При равных `mjd` берётся первый из них.
pub fn last_source(message: &Message) -> Result<String, KeyError> {
    let sources = message
        .get("sources")
        .and_then(Value::as_array)
        .ok_or_else(|| KeyError::MissingField("sources".into()))?;

    let mut last: Option<(f64, &Value)> = None;
    for (i, source) in sources.iter().enumerate() {
        let mjd = source
            .get("mjd")
            .and_then(Value::as_f64)
            .ok_or_else(|| KeyError::Function(format!("sources[{i}] has no numeric 'mjd'")))?;
        if last.is_none_or(|(max, _)| mjd > max) {
            last = Some((mjd, source));
        }
    }

    let (_, source) = last.ok_or_else(|| KeyError::Function("message has no sources".into()))?;
    let source_id = source
        .get("sourceid")
        .ok_or_else(|| KeyError::MissingField("sources[].sourceid".into()))?;
    let object_id = message
        .get("objectid")
        .ok_or_else(|| KeyError::MissingField("objectid".into()))?;

    Ok(format!(
        "{}_{}",
        key_string("objectid", object_id)?,
        key_string("sourceid", source_id)?
    ))
}

// ═══════════════════════════════════════════════════════════════
//  KeyFunctions registry
// ═══════════════════════════════════════════════════════════════

/// Именованные key-функции. Конфиг не может содержать код, поэтому
/// функция выбирается по имени: `key = { function = "last_source" }`.
#[derive(Clone, Default)]
pub struct KeyFunctions {
    functions: HashMap<String, KeyFn>,
}

impl KeyFunctions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("last_source", last_source);
        registry
    }

    pub fn register<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&Message) -> Result<String, KeyError> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(f));
    }

    pub fn get(&self, name: &str) -> Option<KeyFn> {
        self.functions.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn resolve(&self, cfg: &KeyConfig) -> Result<KeySpec, KeyError> {
        match cfg {
            KeyConfig::Field(name) => Ok(KeySpec::Field(name.clone())),
            KeyConfig::Function { function } => self
                .get(function)
                .map(KeySpec::Function)
                .ok_or_else(|| KeyError::UnknownFunction(function.clone())),
        }
    }
}
