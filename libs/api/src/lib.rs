use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;

mod error;
mod types;
mod util;

pub use error::{BoxError, ComponentError, ErrorKind, StoreError};
pub use types::{Batch, ConsumedMessage, DataFormat, Message};
pub use util::resolve_path;

// ════════════════════════════════════════════════════════════════
//  Inbound: stream → frames → messages
// ════════════════════════════════════════════════════════════════

/// Framing: определение границ сообщений в потоке байтов.
///
/// Реализации должны быть stateless, всё состояние буферизации хранится
/// у вызывающего (consumer'а).
pub trait Framing: Send + Sync {
    /// Извлечь один фрейм из буфера.
    /// Возвращает (frame_data, bytes_consumed) или None если фрейм неполный.
    fn decode(&self, buf: &[u8]) -> Result<Option<(Vec<u8>, usize)>, ComponentError>;

    /// Добавить framed данные в выходной буфер.
    fn encode(&self, data: &[u8], buf: &mut Vec<u8>) -> Result<(), ComponentError>;
}

/// Codec: парсер формата payload'а: bytes → Message.
///
/// Codec только читает payload. Сами байты остаются нетронутыми
/// и уходят в storage как есть.
pub trait Codec: Send + Sync {
    /// Парсинг: сырые байты → структурированное сообщение.
    fn decode(&self, data: &[u8]) -> Result<Message, ComponentError>;

    /// Формат payload'ов, которые понимает этот codec.
    fn data_format(&self) -> DataFormat;
}

/// Consumer: внешний источник сообщений.
///
/// Каждый `poll` отдаёт текущий batch: уже буферизованные байты
/// и декодированные сообщения. `None` = поток закончился.
pub trait Consumer: Send {
    fn poll(&mut self) -> Pin<Box<dyn Future<Output = Result<Option<Batch>, ComponentError>> + Send + '_>>;
}

// ════════════════════════════════════════════════════════════════
//  Outbound: object storage
// ════════════════════════════════════════════════════════════════

/// Object storage с семантикой `put object`.
///
/// Клиент создаётся один раз и переиспользуется между вызовами.
/// Ошибки backend'а не переформулируются, они лежат в
/// `StoreError::source` как есть.
pub trait ObjectStore: Send + Sync {
    /// Записать `body` в `bucket` под именем `object`.
    fn put_object<'a>(
        &'a self,
        bucket: &'a str,
        object: &'a str,
        body: Bytes,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + 'a>>;
}
