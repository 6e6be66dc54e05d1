use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt};

use step_api::{Batch, Codec, ComponentError, ConsumedMessage, Consumer, ErrorKind, Framing};

const READ_CHUNK: usize = 4096;

// ═══════════════════════════════════════════════════════════════
//  FrameConsumer: stream → framing → codec → Batch
// ═══════════════════════════════════════════════════════════════

/// Consumer поверх байтового потока (TCP соединение, файл, ...).
///
/// Каждый фрейм это один payload. Batch всегда из одного сообщения:
/// байты фрейма + декодированное сообщение.
pub struct FrameConsumer<S> {
    name: String,
    stream: S,
    framing: Arc<dyn Framing>,
    codec: Arc<dyn Codec>,
    buf: Vec<u8>,
    skipped: u64,
}

impl<S> FrameConsumer<S>
where
    S: AsyncRead + Unpin + Send,
{
    pub fn new(name: impl Into<String>, stream: S, framing: Arc<dyn Framing>, codec: Arc<dyn Codec>) -> Self {
        Self {
            name: name.into(),
            stream,
            framing,
            codec,
            buf: Vec::with_capacity(8192),
            skipped: 0,
        }
    }

    /// Сколько фреймов пропущено из-за ошибок формата.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    async fn next_batch(&mut self) -> Result<Option<Batch>, ComponentError> {
        let mut tmp = [0u8; READ_CHUNK];

        loop {
            while let Some((frame, consumed)) = self.framing.decode(&self.buf)? {
                self.buf.drain(..consumed);

                match self.codec.decode(&frame) {
                    Ok(message) => return Ok(Some(Batch::single(ConsumedMessage::new(frame, message)))),
                    Err(e) if e.kind() == ErrorKind::Format => {
                        self.skipped += 1;
                        tracing::warn!(
                            consumer = %self.name,
                            format = %self.codec.data_format(),
                            error = ?e,
                            "bad message, skipping"
                        );
                    }
                    Err(e) => return Err(e),
                }
            }

            let n = self.stream.read(&mut tmp).await?;
            if n == 0 {
                if self.buf.is_empty() {
                    tracing::info!(consumer = %self.name, "stream closed");
                    return Ok(None);
                }
                return Err(ComponentError::io(format!(
                    "stream closed inside a frame ({} bytes buffered)",
                    self.buf.len()
                )));
            }
            self.buf.extend_from_slice(&tmp[..n]);
        }
    }
}

impl<S> Consumer for FrameConsumer<S>
where
    S: AsyncRead + Unpin + Send,
{
    fn poll(&mut self) -> Pin<Box<dyn Future<Output = Result<Option<Batch>, ComponentError>> + Send + '_>> {
        Box::pin(self.next_batch())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codec_json::JsonCodec;
    use framing_length_prefixed::{LengthPrefixedConfig, LengthPrefixedFraming};

    fn framing() -> Arc<LengthPrefixedFraming> {
        Arc::new(LengthPrefixedFraming::new(&LengthPrefixedConfig::default()).unwrap())
    }

    fn feed(frames: &[&[u8]]) -> Vec<u8> {
        let f = framing();
        let mut out = Vec::new();
        for frame in frames {
            f.encode(frame, &mut out).unwrap();
        }
        out
    }

    #[tokio::test]
    async fn yields_one_message_per_frame_then_ends() {
        let bytes = feed(&[br#"{"candid":1}"#, br#"{"candid":2}"#]);
        let mut consumer = FrameConsumer::new("test", &bytes[..], framing(), Arc::new(JsonCodec));

        let first = consumer.poll().await.unwrap().unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first.head().unwrap().message()["candid"], 1);
        assert_eq!(&first.head().unwrap().value()[..], br#"{"candid":1}"#);

        let second = consumer.poll().await.unwrap().unwrap();
        assert_eq!(second.head().unwrap().message()["candid"], 2);

        assert!(consumer.poll().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn undecodable_frames_are_skipped() {
        let bytes = feed(&[b"{broken", br#"{"candid":3}"#]);
        let mut consumer = FrameConsumer::new("test", &bytes[..], framing(), Arc::new(JsonCodec));

        let batch = consumer.poll().await.unwrap().unwrap();
        assert_eq!(batch.head().unwrap().message()["candid"], 3);
        assert_eq!(consumer.skipped(), 1);
    }

    #[tokio::test]
    async fn eof_inside_frame_is_io_error() {
        let mut bytes = feed(&[br#"{"candid":4}"#]);
        bytes.truncate(bytes.len() - 2);
        let mut consumer = FrameConsumer::new("test", &bytes[..], framing(), Arc::new(JsonCodec));

        let err = consumer.poll().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[tokio::test]
    async fn corrupt_length_header_fails_fast() {
        let bytes = [0xff, 0xff, 0xff, 0xff, b'{'];
        let mut consumer = FrameConsumer::new("test", &bytes[..], framing(), Arc::new(JsonCodec));

        let err = consumer.poll().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[tokio::test]
    async fn reads_frames_split_across_reads() {
        let bytes = feed(&[br#"{"candid":5}"#]);
        let (client, mut server) = tokio::io::duplex(3);
        let writer = tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;
            server.write_all(&bytes).await.unwrap();
        });

        let mut consumer = FrameConsumer::new("test", client, framing(), Arc::new(JsonCodec));
        let batch = consumer.poll().await.unwrap().unwrap();
        assert_eq!(batch.head().unwrap().message()["candid"], 5);

        writer.await.unwrap();
        assert!(consumer.poll().await.unwrap().is_none());
    }
}
