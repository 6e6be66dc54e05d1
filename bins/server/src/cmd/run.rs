use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use codec_avro::{AvroCodec, AvroCodecConfig};
use codec_json::JsonCodec;
use framing_length_prefixed::{LengthPrefixedConfig, LengthPrefixedFraming};
use step_api::{Codec, Framing, ObjectStore};
use step_pipeline::{
    FrameConsumer, KeyFunctions, ObjectUploader, S3Step, StepConfig, StorageBackend, component_config, run_step,
};
use storage_memory::{MemoryObjectStore, MemoryStoreConfig};
use storage_s3::{S3ObjectStore, S3StoreConfig};
use transport_tcp_client::TcpClientTransport;

use crate::config::{self, RunArgs};
use crate::error::AppError;

pub async fn run(args: RunArgs) -> Result<(), AppError> {
    tracing::info!("s3-step starting");

    // --- Load config ---
    let mut cfg = config::load(&args.config)?;
    config::apply_overrides(&mut cfg, &args);
    let functions = KeyFunctions::with_builtins();
    cfg.validate(&functions)?;
    tracing::info!(
        config = %args.config,
        step = %cfg.step.id,
        version = %cfg.step.version,
        comments = %cfg.step.comments,
        "loaded config"
    );

    // --- Components ---
    let framing: Arc<dyn Framing> = {
        let framing_cfg: LengthPrefixedConfig = component_config("consumer.framing", &cfg.consumer.framing)?;
        Arc::new(LengthPrefixedFraming::new(&framing_cfg)?)
    };
    let codec = build_codec(&cfg)?;
    let store = build_store(&cfg).await;

    let uploader = ObjectUploader::new(store).with_reversed_keys(cfg.storage.reverse_key);
    let step = S3Step::new(cfg.key_spec(&functions)?, cfg.storage.bucket_name.clone(), uploader)
        .with_metadata(cfg.step.clone());

    let transport = TcpClientTransport::new(
        cfg.consumer.server.clone(),
        Duration::from_millis(cfg.consumer.connect_timeout_ms),
    );
    let stream = transport.connect().await?;
    let mut consumer = FrameConsumer::new(transport.addr(), stream, framing, codec);

    // --- CancellationToken for graceful shutdown ---
    let token = CancellationToken::new();
    let signal_token = token.clone();
    let signal = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("shutting down...");
                signal_token.cancel();
            }
            Err(e) => tracing::error!(error = %e, "ctrl-c handler"),
        }
    });

    tracing::info!(bucket = %step.bucket(), server = %transport.addr(), "step ready");
    let result = run_step(&step, &mut consumer, token).await;
    signal.abort();

    let stats = result?;
    tracing::info!(
        batches = stats.batches,
        uploaded = stats.uploaded,
        skipped = consumer.skipped(),
        "shutdown complete"
    );
    Ok(())
}

fn build_codec(cfg: &StepConfig) -> Result<Arc<dyn Codec>, AppError> {
    match cfg.consumer.codec.as_str() {
        "json" => Ok(Arc::new(JsonCodec)),
        "avro" => {
            let avro_cfg = AvroCodecConfig { schema_path: cfg.consumer.schema_path.clone() };
            Ok(Arc::new(AvroCodec::from_config(&avro_cfg)?))
        }
        other => Err(AppError::Config { context: "consumer", detail: format!("unknown codec '{other}'") }),
    }
}

async fn build_store(cfg: &StepConfig) -> Arc<dyn ObjectStore> {
    match cfg.storage.backend {
        StorageBackend::S3 => {
            let s3_cfg = S3StoreConfig {
                region_name: cfg.storage.region_name.clone(),
                endpoint_url: cfg.storage.endpoint_url.clone(),
            };
            Arc::new(S3ObjectStore::connect(&s3_cfg).await)
        }
        StorageBackend::Memory => {
            let mut mem_cfg = MemoryStoreConfig::default();
            if let Some(max) = cfg.storage.max_objects {
                mem_cfg.max_objects = max;
            }
            tracing::warn!(max_objects = mem_cfg.max_objects, "memory storage backend, objects are not persisted");
            Arc::new(MemoryObjectStore::from_config(&mem_cfg))
        }
    }
}
