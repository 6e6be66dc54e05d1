use std::future::Future;
use std::pin::Pin;

use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;

use step_api::{ObjectStore, StoreError};

// ════════════════════════════════════════════════════════════════
//  Configuration
// ════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct S3StoreConfig {
    /// AWS region, e.g. "us-east-1".
    pub region_name: String,
    /// S3-compatible endpoint (MinIO, localstack). Empty = AWS.
    pub endpoint_url: String,
}

// ════════════════════════════════════════════════════════════════
//  S3ObjectStore
// ════════════════════════════════════════════════════════════════

/// `ObjectStore` поверх aws-sdk-s3: один `PutObject` на upload, без retry.
///
/// Credentials берутся из стандартной цепочки SDK (env, profile, IMDS).
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build the SDK client from shared AWS config plus region and endpoint overrides.
    pub async fn connect(cfg: &S3StoreConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if !cfg.region_name.is_empty() {
            loader = loader.region(aws_config::Region::new(cfg.region_name.clone()));
        }
        let shared = loader.load().await;
        Self::from_shared(&shared, cfg)
    }

    /// Клиент поверх уже загруженного `SdkConfig`. Endpoint включает path-style адресацию.
    pub fn from_shared(shared: &aws_config::SdkConfig, cfg: &S3StoreConfig) -> Self {
        let mut builder = aws_sdk_s3::config::Builder::from(shared);
        if !cfg.endpoint_url.is_empty() {
            builder = builder.endpoint_url(&cfg.endpoint_url).force_path_style(true);
        }

        tracing::info!(
            region = %cfg.region_name,
            endpoint = %cfg.endpoint_url,
            "s3 client configured"
        );
        Self::new(Client::from_conf(builder.build()))
    }
}

impl ObjectStore for S3ObjectStore {
    fn put_object<'a>(
        &'a self,
        bucket: &'a str,
        object: &'a str,
        body: Bytes,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + 'a>> {
        Box::pin(async move {
            let size = body.len();
            self.client
                .put_object()
                .bucket(bucket)
                .key(object)
                .body(ByteStream::from(body))
                .send()
                .await
                .map_err(|e| StoreError::new(bucket, object, e))?;
            tracing::debug!(%bucket, %object, size, "put object");
            Ok(())
        })
    }
}
