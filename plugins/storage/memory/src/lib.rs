use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use tokio::sync::RwLock;

use step_api::{ObjectStore, StoreError};

// ═══════════════════════════════════════════════════════════════
//  MemoryStoreConfig
// ═══════════════════════════════════════════════════════════════

fn default_max_objects() -> usize {
    100_000
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct MemoryStoreConfig {
    #[serde(default = "default_max_objects")]
    pub max_objects: usize,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            max_objects: default_max_objects(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  MemoryObjectStore
// ═══════════════════════════════════════════════════════════════

/// Один вызов `put_object`, в порядке поступления.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutRecord {
    pub bucket: String,
    pub object: String,
    pub body: Bytes,
}

#[derive(Default)]
struct Inner {
    objects: HashMap<(String, String), Bytes>,
    /// Порядок вставки объектов, для вытеснения самого старого.
    order: VecDeque<(String, String)>,
    /// Последние `max_objects` put'ов.
    puts: VecDeque<PutRecord>,
}

/// In-memory object storage. Для dry-run запусков и тестов:
/// хранит объекты и журнал последних put'ов. Оба ограничены `max_objects`.
pub struct MemoryObjectStore {
    inner: RwLock<Inner>,
    max_objects: usize,
}

impl MemoryObjectStore {
    pub fn new(max_objects: usize) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            max_objects: max_objects.max(1),
        }
    }

    pub fn from_config(cfg: &MemoryStoreConfig) -> Self {
        Self::new(cfg.max_objects)
    }

    pub async fn get(&self, bucket: &str, object: &str) -> Option<Bytes> {
        let inner = self.inner.read().await;
        inner.objects.get(&(bucket.to_string(), object.to_string())).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.objects.len()
    }

    /// Последние вызовы `put_object`, старые первыми.
    pub async fn puts(&self) -> Vec<PutRecord> {
        self.inner.read().await.puts.iter().cloned().collect()
    }
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::from_config(&MemoryStoreConfig::default())
    }
}

impl ObjectStore for MemoryObjectStore {
    fn put_object<'a>(
        &'a self,
        bucket: &'a str,
        object: &'a str,
        body: Bytes,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + 'a>> {
        Box::pin(async move {
            let mut inner = self.inner.write().await;
            let id = (bucket.to_string(), object.to_string());

            if !inner.objects.contains_key(&id) {
                if inner.objects.len() >= self.max_objects {
                    if let Some(oldest) = inner.order.pop_front() {
                        inner.objects.remove(&oldest);
                    }
                }
                inner.order.push_back(id.clone());
            }
            inner.objects.insert(id, body.clone());
            if inner.puts.len() >= self.max_objects {
                inner.puts.pop_front();
            }
            inner.puts.push_back(PutRecord {
                bucket: bucket.to_string(),
                object: object.to_string(),
                body,
            });
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_and_logs_puts() {
        let store = MemoryObjectStore::default();
        store.put_object("alerts", "123.avro", Bytes::from_static(b"one")).await.unwrap();
        store.put_object("alerts", "123.avro", Bytes::from_static(b"two")).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("alerts", "123.avro").await.unwrap(), Bytes::from_static(b"two"));
        assert!(store.get("other", "123.avro").await.is_none());

        let puts = store.puts().await;
        assert_eq!(puts.len(), 2);
        assert_eq!(puts[0].body, Bytes::from_static(b"one"));
    }

    #[tokio::test]
    async fn evicts_oldest_object_when_full() {
        let store = MemoryObjectStore::new(2);
        for name in ["a.avro", "b.avro", "c.avro"] {
            store.put_object("alerts", name, Bytes::from_static(b"x")).await.unwrap();
        }
        assert_eq!(store.len().await, 2);
        assert!(store.get("alerts", "a.avro").await.is_none());
        assert!(store.get("alerts", "c.avro").await.is_some());
    }

    #[tokio::test]
    async fn put_journal_is_capped() {
        let store = MemoryObjectStore::new(2);
        for i in 0..1000 {
            let body = Bytes::from(vec![0u8; 1024]);
            store.put_object("alerts", &format!("{i}.avro"), body).await.unwrap();
        }

        let puts = store.puts().await;
        assert_eq!(puts.len(), 2);
        assert_eq!(puts[0].object, "998.avro");
        assert_eq!(puts[1].object, "999.avro");
        assert_eq!(store.len().await, 2);
    }
}
