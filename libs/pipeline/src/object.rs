use std::borrow::Cow;
use std::sync::Arc;

use bytes::Bytes;
use step_api::{ObjectStore, StoreError};

/// Домен public URL'ов bucket'ов.
pub const STORAGE_DOMAIN: &str = "s3.amazonaws.com";
/// Все объекты хранятся в корне bucket'а как `<key>.avro`.
pub const OBJECT_EXTENSION: &str = "avro";

pub fn object_name(key: &str) -> String {
    format!("{key}.{OBJECT_EXTENSION}")
}

/// `https://<bucket>.s3.amazonaws.com/<key>.avro`
pub fn object_url(bucket: &str, key: &str) -> String {
    format!("https://{bucket}.{STORAGE_DOMAIN}/{}", object_name(key))
}

/// Key в обратном порядке символов: `"123"` → `"321"`.
pub fn reverse_key(key: &str) -> String {
    key.chars().rev().collect()
}

// ═══════════════════════════════════════════════════════════════
//  ObjectUploader
// ═══════════════════════════════════════════════════════════════

/// Пишет payload в storage под детерминированным именем и возвращает URL.
///
/// Один put на вызов, без retry: ошибка storage уходит вызывающему как есть.
#[derive(Clone)]
pub struct ObjectUploader {
    store: Arc<dyn ObjectStore>,
    reverse_keys: bool,
}

impl ObjectUploader {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store, reverse_keys: false }
    }

    /// Reverse every key before naming the object. Sequential ids then
    /// spread over different key prefixes.
    pub fn with_reversed_keys(mut self, reverse: bool) -> Self {
        self.reverse_keys = reverse;
        self
    }

    fn stored_key<'k>(&self, key: &'k str) -> Cow<'k, str> {
        if self.reverse_keys {
            Cow::Owned(reverse_key(key))
        } else {
            Cow::Borrowed(key)
        }
    }

    /// URL объекта для `key` с учётом reverse_keys.
    pub fn object_url(&self, bucket: &str, key: &str) -> String {
        object_url(bucket, &self.stored_key(key))
    }

    pub async fn upload_file(&self, payload: Bytes, key: &str, bucket: &str) -> Result<String, StoreError> {
        let key = self.stored_key(key);
        let object = object_name(&key);
        self.store.put_object(bucket, &object, payload).await?;
        Ok(object_url(bucket, &key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::Pin;
    use storage_memory::MemoryObjectStore;

    #[test]
    fn url_has_fixed_format() {
        assert_eq!(object_url("fake_bucket", "123"), "https://fake_bucket.s3.amazonaws.com/123.avro");
        assert_eq!(object_url("alerts", "ZTF1_42"), "https://alerts.s3.amazonaws.com/ZTF1_42.avro");
    }

    #[test]
    fn reverse_key_reverses_digits() {
        assert_eq!(reverse_key("1234567"), "7654321");
        assert_eq!(reverse_key(""), "");
    }

    #[tokio::test]
    async fn upload_invokes_store_with_payload_bucket_and_object_name() {
        let store = Arc::new(MemoryObjectStore::default());
        let uploader = ObjectUploader::new(store.clone());

        let url = uploader
            .upload_file(Bytes::from_static(b"fake"), "123", "fake_bucket")
            .await
            .unwrap();
        assert_eq!(url, "https://fake_bucket.s3.amazonaws.com/123.avro");

        let puts = store.puts().await;
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].body, Bytes::from_static(b"fake"));
        assert_eq!(puts[0].bucket, "fake_bucket");
        assert_eq!(puts[0].object, "123.avro");
    }

    #[tokio::test]
    async fn reversed_keys_apply_to_name_and_url() {
        let store = Arc::new(MemoryObjectStore::default());
        let uploader = ObjectUploader::new(store.clone()).with_reversed_keys(true);

        let url = uploader.upload_file(Bytes::from_static(b"x"), "123", "b").await.unwrap();
        assert_eq!(url, "https://b.s3.amazonaws.com/321.avro");
        assert_eq!(uploader.object_url("b", "123"), url);
        assert!(store.get("b", "321.avro").await.is_some());
    }

    struct DeniedStore;

    impl ObjectStore for DeniedStore {
        fn put_object<'a>(
            &'a self,
            bucket: &'a str,
            object: &'a str,
            _body: Bytes,
        ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + 'a>> {
            Box::pin(async move {
                Err(StoreError::new(
                    bucket,
                    object,
                    std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied"),
                ))
            })
        }
    }

    #[tokio::test]
    async fn storage_error_is_returned_unmodified() {
        let uploader = ObjectUploader::new(Arc::new(DeniedStore));
        let err = uploader
            .upload_file(Bytes::from_static(b"x"), "123", "missing-bucket")
            .await
            .unwrap_err();

        assert_eq!(err.bucket, "missing-bucket");
        assert_eq!(err.object, "123.avro");
        let io = err.source.downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(io.kind(), std::io::ErrorKind::PermissionDenied);
    }
}
