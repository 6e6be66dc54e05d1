use step_api::{Codec, ComponentError, DataFormat, Message};

/// JSON payload'ы: один UTF-8 документ на фрейм.
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn decode(&self, data: &[u8]) -> Result<Message, ComponentError> {
        let s = std::str::from_utf8(data)?;
        Ok(serde_json::from_str(s)?)
    }

    fn data_format(&self) -> DataFormat {
        DataFormat::Json
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use step_api::ErrorKind;

    #[test]
    fn decodes_object() {
        let msg = JsonCodec.decode(br#"{"objectId":"ZTF21aaaaaaa","candid":123}"#).unwrap();
        assert_eq!(msg["candid"], 123);
        assert_eq!(msg["objectId"], "ZTF21aaaaaaa");
    }

    #[test]
    fn bad_input_is_format_error() {
        assert_eq!(JsonCodec.decode(b"{\"candid\":").unwrap_err().kind(), ErrorKind::Format);
        assert_eq!(JsonCodec.decode(&[0xff, 0xfe]).unwrap_err().kind(), ErrorKind::Format);
    }
}
