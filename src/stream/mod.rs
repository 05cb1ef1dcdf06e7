//! Client side decoding of the chat proxy's event stream.

mod decoder;

pub use decoder::{DATA_PREFIX, DONE_MARKER, DecodeError, DecoderLimits, SseDecoder};

use anyhow::Error;
use futures::{Stream, StreamExt};

/// The assistant message as it is being streamed. Text only grows.
#[derive(Debug, Default, Clone)]
pub struct AssistantDraft {
    text: String,
}

impl AssistantDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a delta and return the full text so far.
    pub fn push(&mut self, delta: &str) -> &str {
        self.text.push_str(delta);
        &self.text
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Turn a stream of byte chunks, e.g. `reqwest::Response::bytes_stream`,
/// into a stream of text deltas. The decoder is flushed when the
/// source ends.
pub fn decode_stream<S, B, E>(
    bytes: S,
    limits: DecoderLimits,
) -> impl Stream<Item = Result<String, Error>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<Error>,
{
    async_stream::stream! {
        let mut decoder = SseDecoder::new(limits);
        let mut bytes = Box::pin(bytes);

        while let Some(chunk) = bytes.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    let err: Error = e.into();
                    yield Err(err);
                    return;
                }
            };
            match decoder.feed(chunk.as_ref()) {
                Ok(deltas) => {
                    for delta in deltas {
                        yield Ok(delta);
                    }
                }
                Err(e) => {
                    yield Err(Error::from(e));
                    return;
                }
            }
        }

        match decoder.finish() {
            Ok(deltas) => {
                for delta in deltas {
                    yield Ok(delta);
                }
            }
            Err(e) => yield Err(Error::from(e)),
        }
    }
}
