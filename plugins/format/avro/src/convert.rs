use apache_avro::types::Value;
use base64::Engine;
use serde_json::{Map, Value as Json, json};

fn base64_encode(data: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(data)
}

fn object<'a>(entries: impl Iterator<Item = (&'a String, &'a Value)>) -> Json {
    Json::Object(
        entries
            .map(|(k, v)| (k.clone(), avro_to_value(v)))
            .collect::<Map<String, Json>>(),
    )
}

// ═══════════════════════════════════════════════════════════════
//  Avro → Message conversion
// ═══════════════════════════════════════════════════════════════

/// Records и maps → объекты, unions → внутреннее значение,
/// bytes/fixed → base64 строки.
pub(crate) fn avro_to_value(value: &Value) -> Json {
    match value {
        Value::Null | Value::Duration(_) => Json::Null,
        Value::Boolean(b) => Json::Bool(*b),
        Value::Int(i) | Value::Date(i) | Value::TimeMillis(i) => json!(i),
        Value::Long(l)
        | Value::TimeMicros(l)
        | Value::TimestampMillis(l)
        | Value::TimestampMicros(l)
        | Value::TimestampNanos(l)
        | Value::LocalTimestampMillis(l)
        | Value::LocalTimestampMicros(l)
        | Value::LocalTimestampNanos(l) => json!(l),
        Value::Float(f) => json!(f),
        Value::Double(d) => json!(d),
        Value::Bytes(b) | Value::Fixed(_, b) => Json::String(base64_encode(b)),
        Value::String(s) | Value::Enum(_, s) => Json::String(s.clone()),
        Value::Union(_, inner) => avro_to_value(inner),
        Value::Array(items) => Json::Array(items.iter().map(avro_to_value).collect()),
        Value::Map(entries) => object(entries.iter()),
        Value::Record(fields) => object(fields.iter().map(|(k, v)| (k, v))),
        Value::Decimal(d) => {
            let bytes: Vec<u8> = d.try_into().unwrap_or_default();
            Json::String(base64_encode(&bytes))
        }
        Value::BigDecimal(d) => Json::String(d.to_string()),
        Value::Uuid(u) => Json::String(u.to_string()),
    }
}
