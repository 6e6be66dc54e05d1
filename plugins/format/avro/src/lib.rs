mod codec;
mod convert;

pub use codec::AvroCodec;

// ════════════════════════════════════════════════════════════════
//  Configuration
// ════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct AvroCodecConfig {
    /// Path to Avro schema file (.avsc). Empty: payloads are object
    /// container files carrying their own schema.
    pub schema_path: String,
}
