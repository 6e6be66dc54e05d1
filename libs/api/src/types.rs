use bytes::Bytes;

/// Одно событие детекции в структурированном виде.
///
/// Обычно JSON-объект, полученный декодированием payload'а.
pub type Message = serde_json::Value;

// ════════════════════════════════════════════════════════════════
//  Data Format
// ════════════════════════════════════════════════════════════════

/// Формат бинарных данных payload'а.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataFormat {
    #[default]
    Avro,
    Json,
}

impl std::fmt::Display for DataFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataFormat::Avro => write!(f, "avro"),
            DataFormat::Json => write!(f, "json"),
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  Consumed messages
// ════════════════════════════════════════════════════════════════

/// Сообщение, уже буферизованное consumer'ом: оригинальные байты
/// плюс их декодированное представление.
#[derive(Clone, Debug)]
pub struct ConsumedMessage {
    value: Bytes,
    message: Message,
}

impl ConsumedMessage {
    pub fn new(value: impl Into<Bytes>, message: Message) -> Self {
        Self { value: value.into(), message }
    }

    /// Оригинальные байты payload'а.
    pub fn value(&self) -> &Bytes {
        &self.value
    }

    pub fn message(&self) -> &Message {
        &self.message
    }
}

/// Текущий batch consumer'а.
#[derive(Clone, Debug, Default)]
pub struct Batch {
    messages: Vec<ConsumedMessage>,
}

impl Batch {
    pub fn new(messages: Vec<ConsumedMessage>) -> Self {
        Self { messages }
    }

    pub fn single(message: ConsumedMessage) -> Self {
        Self { messages: vec![message] }
    }

    /// Первое сообщение batch'а.
    pub fn head(&self) -> Option<&ConsumedMessage> {
        self.messages.first()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_messages(self) -> Vec<ConsumedMessage> {
        self.messages
    }
}
