use serde::Deserialize;
use step_api::{Batch, Message};

use crate::object::ObjectUploader;
use crate::{KeyError, KeySpec, StepRunError};

/// Описание step'а, логируется при старте.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StepMetadata {
    pub id: String,
    pub name: String,
    pub version: String,
    pub comments: String,
}

impl Default for StepMetadata {
    fn default() -> Self {
        Self {
            id: "s3".into(),
            name: "s3".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            comments: "s3 upload".into(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  S3Step
// ═══════════════════════════════════════════════════════════════

/// Step: message → key → upload буферизованного payload'а.
pub struct S3Step {
    key: KeySpec,
    bucket: String,
    uploader: ObjectUploader,
    metadata: StepMetadata,
}

impl S3Step {
    pub fn new(key: KeySpec, bucket: impl Into<String>, uploader: ObjectUploader) -> Self {
        Self {
            key,
            bucket: bucket.into(),
            uploader,
            metadata: StepMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: StepMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn metadata(&self) -> &StepMetadata {
        &self.metadata
    }

    pub fn get_key(&self, message: &Message) -> Result<String, KeyError> {
        self.key.derive(message)
    }

    /// Обработать одно сообщение.
    ///
    /// Payload берётся из головы текущего batch'а consumer'а, key берётся из
    /// `message`. Возвращает URL загруженного объекта.
    pub async fn execute(&self, message: &Message, batch: &Batch) -> Result<String, StepRunError> {
        if let Some(object_id) = message.get("objectId") {
            tracing::debug!(%object_id, "processing message");
        }

        let payload = batch.head().ok_or(StepRunError::EmptyBatch)?.value().clone();
        let key = self.get_key(message)?;
        let size = payload.len();
        let url = self.uploader.upload_file(payload, &key, &self.bucket).await?;

        tracing::info!(step = %self.metadata.id, %key, %url, size, "uploaded");
        Ok(url)
    }
}
