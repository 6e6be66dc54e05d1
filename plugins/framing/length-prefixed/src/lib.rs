use step_api::{ComponentError, Framing};

// ════════════════════════════════════════════════════════════════
//  Configuration
// ════════════════════════════════════════════════════════════════

pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct LengthPrefixedConfig {
    /// Размер заголовка длины в байтах: 1, 2 или 4 (по умолчанию 4).
    pub length_bytes: usize,
    /// Порядок байтов: "big" (по умолчанию) или "little".
    pub byte_order: String,
    /// Максимальный размер payload в байтах (0 = без ограничения).
    /// По умолчанию 16 MiB: битый заголовок не заставит буферизовать гигабайты.
    pub max_payload: usize,
}

impl Default for LengthPrefixedConfig {
    fn default() -> Self {
        Self {
            length_bytes: 4,
            byte_order: "big".to_string(),
            max_payload: DEFAULT_MAX_PAYLOAD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteOrder {
    Big,
    Little,
}

// ════════════════════════════════════════════════════════════════
//  LengthPrefixedFraming
// ════════════════════════════════════════════════════════════════

/// `[len][payload]` фреймы. Каждый фрейм содержит один payload сообщения.
#[derive(Debug, Clone)]
pub struct LengthPrefixedFraming {
    length_bytes: usize,
    byte_order: ByteOrder,
    max_payload: usize,
}

impl LengthPrefixedFraming {
    pub fn new(cfg: &LengthPrefixedConfig) -> Result<Self, ComponentError> {
        if !matches!(cfg.length_bytes, 1 | 2 | 4) {
            return Err(ComponentError::config(format!(
                "length_bytes must be 1, 2, or 4, got {}",
                cfg.length_bytes
            )));
        }

        let byte_order = match cfg.byte_order.as_str() {
            "big" | "be" => ByteOrder::Big,
            "little" | "le" => ByteOrder::Little,
            other => {
                return Err(ComponentError::config(format!(
                    "byte_order must be \"big\" or \"little\", got {other:?}"
                )));
            }
        };

        Ok(Self {
            length_bytes: cfg.length_bytes,
            byte_order,
            max_payload: cfg.max_payload,
        })
    }

    fn read_len(&self, header: &[u8]) -> usize {
        match (self.length_bytes, self.byte_order) {
            (1, _) => header[0] as usize,
            (2, ByteOrder::Big) => u16::from_be_bytes([header[0], header[1]]) as usize,
            (2, ByteOrder::Little) => u16::from_le_bytes([header[0], header[1]]) as usize,
            (_, ByteOrder::Big) => u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize,
            (_, ByteOrder::Little) => u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize,
        }
    }

    fn header_limit(&self) -> usize {
        match self.length_bytes {
            1 => u8::MAX as usize,
            2 => u16::MAX as usize,
            _ => u32::MAX as usize,
        }
    }

    fn check_size(&self, len: usize) -> Result<(), ComponentError> {
        if self.max_payload > 0 && len > self.max_payload {
            return Err(ComponentError::format_err(format!(
                "payload too large: {len} bytes (max {})",
                self.max_payload
            )));
        }
        Ok(())
    }
}

impl Framing for LengthPrefixedFraming {
    fn decode(&self, buf: &[u8]) -> Result<Option<(Vec<u8>, usize)>, ComponentError> {
        if buf.len() < self.length_bytes {
            return Ok(None);
        }

        let len = self.read_len(&buf[..self.length_bytes]);
        self.check_size(len)?;

        let total = self.length_bytes + len;
        if buf.len() < total {
            return Ok(None);
        }

        Ok(Some((buf[self.length_bytes..total].to_vec(), total)))
    }

    fn encode(&self, data: &[u8], buf: &mut Vec<u8>) -> Result<(), ComponentError> {
        let len = data.len();
        self.check_size(len)?;
        if len > self.header_limit() {
            return Err(ComponentError::format_err(format!(
                "payload too large for {}-byte header: {len}",
                self.length_bytes
            )));
        }

        match (self.length_bytes, self.byte_order) {
            (1, _) => buf.push(len as u8),
            (2, ByteOrder::Big) => buf.extend_from_slice(&(len as u16).to_be_bytes()),
            (2, ByteOrder::Little) => buf.extend_from_slice(&(len as u16).to_le_bytes()),
            (_, ByteOrder::Big) => buf.extend_from_slice(&(len as u32).to_be_bytes()),
            (_, ByteOrder::Little) => buf.extend_from_slice(&(len as u32).to_le_bytes()),
        }
        buf.extend_from_slice(data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use step_api::ErrorKind;

    fn framing(length_bytes: usize, byte_order: &str, max_payload: usize) -> LengthPrefixedFraming {
        LengthPrefixedFraming::new(&LengthPrefixedConfig {
            length_bytes,
            byte_order: byte_order.to_string(),
            max_payload,
        })
        .unwrap()
    }

    #[test]
    fn decodes_big_endian_frame_and_reports_consumed() {
        let f = framing(4, "big", 0);
        let buf = [0, 0, 0, 3, b'a', b'b', b'c', 0xff];
        let (frame, consumed) = f.decode(&buf).unwrap().unwrap();
        assert_eq!(frame, b"abc");
        assert_eq!(consumed, 7);
    }

    #[test]
    fn incomplete_header_or_payload_needs_more_data() {
        let f = framing(2, "little", 0);
        assert!(f.decode(&[5]).unwrap().is_none());
        assert!(f.decode(&[5, 0, b'x', b'y']).unwrap().is_none());
    }

    #[test]
    fn encode_then_decode_little_endian() {
        let f = framing(2, "le", 0);
        let mut buf = Vec::new();
        f.encode(b"alert", &mut buf).unwrap();
        assert_eq!(&buf[..2], &[5, 0]);
        let (frame, consumed) = f.decode(&buf).unwrap().unwrap();
        assert_eq!(frame, b"alert");
        assert_eq!(consumed, buf.len());
    }

    #[test]
    fn oversized_payload_is_a_format_error() {
        let f = framing(4, "big", 2);
        let err = f.decode(&[0, 0, 0, 9]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);

        let one_byte = framing(1, "big", 0);
        let err = one_byte.encode(&[0u8; 300], &mut Vec::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn default_config_rejects_corrupt_header_before_buffering() {
        let f = LengthPrefixedFraming::new(&LengthPrefixedConfig::default()).unwrap();
        let declared = (DEFAULT_MAX_PAYLOAD as u32 + 1).to_be_bytes();
        let err = f.decode(&declared).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);

        let mut ok = Vec::new();
        f.encode(&[7u8; 1024], &mut ok).unwrap();
        assert!(f.decode(&ok).unwrap().is_some());
    }

    #[test]
    fn rejects_bad_config() {
        let bad_len = LengthPrefixedConfig { length_bytes: 3, ..Default::default() };
        assert_eq!(LengthPrefixedFraming::new(&bad_len).unwrap_err().kind(), ErrorKind::Config);

        let bad_order = LengthPrefixedConfig { byte_order: "middle".into(), ..Default::default() };
        assert_eq!(LengthPrefixedFraming::new(&bad_order).unwrap_err().kind(), ErrorKind::Config);
    }
}
