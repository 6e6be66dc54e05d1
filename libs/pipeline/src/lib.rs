pub mod config;
pub mod error;
mod key;
mod object;
mod runner;
mod source;
mod step;

pub use config::{ConsumerConfig, KeyConfig, StepConfig, StorageBackend, StorageConfig, component_config};
pub use error::{ConfigError, KeyError, StepRunError};
pub use key::{KeyFn, KeyFunctions, KeySpec, key_string, last_source};
pub use object::{OBJECT_EXTENSION, ObjectUploader, STORAGE_DOMAIN, object_name, object_url, reverse_key};
pub use runner::{RunStats, run_step};
pub use source::FrameConsumer;
pub use step::{S3Step, StepMetadata};
