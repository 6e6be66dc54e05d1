use apache_avro::Schema;
use step_api::{Codec, ComponentError, DataFormat, Message};

use crate::AvroCodecConfig;
use crate::convert::avro_to_value;

// ═══════════════════════════════════════════════════════════════
//  AvroCodec
// ═══════════════════════════════════════════════════════════════

enum Mode {
    /// Object container file: header со schema + блоки записей.
    Container,
    /// Один datum без header'а, schema задана заранее.
    Datum(Schema),
}

/// Avro payload → Message.
///
/// Alert'ы приходят как object container files с одной записью;
/// берётся первая запись контейнера.
pub struct AvroCodec {
    mode: Mode,
}

impl AvroCodec {
    pub fn container() -> Self {
        Self { mode: Mode::Container }
    }

    pub fn with_schema(schema: Schema) -> Self {
        Self { mode: Mode::Datum(schema) }
    }

    pub fn from_config(cfg: &AvroCodecConfig) -> Result<Self, ComponentError> {
        if cfg.schema_path.is_empty() {
            return Ok(Self::container());
        }

        let schema_str = std::fs::read_to_string(&cfg.schema_path).map_err(|e| {
            ComponentError::config(format!(
                "avro: failed to read schema file '{}': {e}",
                cfg.schema_path
            ))
        })?;
        let schema = Schema::parse_str(&schema_str)
            .map_err(|e| ComponentError::config(format!("avro: failed to parse schema: {e}")))?;
        Ok(Self::with_schema(schema))
    }
}

impl Codec for AvroCodec {
    fn decode(&self, data: &[u8]) -> Result<Message, ComponentError> {
        match &self.mode {
            Mode::Container => {
                let mut reader = apache_avro::Reader::new(data)
                    .map_err(|e| ComponentError::format_err(format!("avro container header: {e}")))?;
                match reader.next() {
                    Some(Ok(value)) => Ok(avro_to_value(&value)),
                    Some(Err(e)) => Err(ComponentError::format_err(format!("avro decode: {e}"))),
                    None => Err(ComponentError::format_err("avro container holds no records")),
                }
            }
            Mode::Datum(schema) => {
                let mut reader = data;
                let value = apache_avro::from_avro_datum(schema, &mut reader, None)
                    .map_err(|e| ComponentError::format_err(format!("avro decode: {e}")))?;
                Ok(avro_to_value(&value))
            }
        }
    }

    fn data_format(&self) -> DataFormat {
        DataFormat::Avro
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apache_avro::types::{Record, Value};
    use step_api::ErrorKind;

    const ALERT_SCHEMA: &str = r#"{
        "type": "record",
        "name": "alert",
        "fields": [
            {"name": "objectId", "type": "string"},
            {"name": "candid", "type": "long"},
            {"name": "cutout", "type": ["null", "bytes"]},
            {"name": "candidate", "type": {
                "type": "record",
                "name": "candidate",
                "fields": [
                    {"name": "jd", "type": "double"},
                    {"name": "fid", "type": "int"}
                ]
            }}
        ]
    }"#;

    fn alert_record(schema: &Schema) -> Record<'_> {
        let mut record = Record::new(schema).unwrap();
        record.put("objectId", "ZTF21abcdefg");
        record.put("candid", 1_234_567_890_123i64);
        record.put("cutout", Value::Union(1, Box::new(Value::Bytes(vec![1, 2, 3]))));
        record.put(
            "candidate",
            Value::Record(vec![
                ("jd".to_string(), Value::Double(2459000.5)),
                ("fid".to_string(), Value::Int(2)),
            ]),
        );
        record
    }

    #[test]
    fn decodes_first_record_of_container_file() {
        let schema = Schema::parse_str(ALERT_SCHEMA).unwrap();
        let mut writer = apache_avro::Writer::new(&schema, Vec::new());
        writer.append(alert_record(&schema)).unwrap();
        let bytes = writer.into_inner().unwrap();

        let msg = AvroCodec::container().decode(&bytes).unwrap();
        assert_eq!(msg["objectId"], "ZTF21abcdefg");
        assert_eq!(msg["candid"], 1_234_567_890_123i64);
        assert_eq!(msg["cutout"], "AQID");
        assert_eq!(msg["candidate"]["fid"], 2);
    }

    #[test]
    fn decodes_single_datum_with_schema() {
        let schema = Schema::parse_str(ALERT_SCHEMA).unwrap();
        let bytes = apache_avro::to_avro_datum(&schema, alert_record(&schema)).unwrap();

        let msg = AvroCodec::with_schema(schema).decode(&bytes).unwrap();
        assert_eq!(msg["candid"], 1_234_567_890_123i64);
        assert_eq!(msg["candidate"]["jd"], 2459000.5);
    }

    #[test]
    fn garbage_is_format_error() {
        let err = AvroCodec::container().decode(b"not an avro file").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn missing_schema_file_is_config_error() {
        let cfg = AvroCodecConfig { schema_path: "/nonexistent/alert.avsc".into() };
        let err = AvroCodec::from_config(&cfg).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
