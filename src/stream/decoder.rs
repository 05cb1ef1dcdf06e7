use serde_json::Value;
use thiserror::Error;

pub const DATA_PREFIX: &str = "data: ";
pub const DONE_MARKER: &str = "[DONE]";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("Stream line exceeded {limit} bytes without a newline")]
    LineTooLong { limit: usize },
}

/// Bounds on how much undecided text the decoder will hold.
#[derive(Debug, Clone, Copy)]
pub struct DecoderLimits {
    /// Longest unterminated line accepted before the stream is
    /// rejected.
    pub max_line_bytes: usize,
    /// Longest payload kept while waiting for its continuation before
    /// it is dropped as malformed.
    pub max_pending_bytes: usize,
}

impl Default for DecoderLimits {
    fn default() -> Self {
        Self {
            max_line_bytes: 1024 * 1024,
            max_pending_bytes: 256 * 1024,
        }
    }
}

#[derive(Debug, PartialEq)]
enum State {
    Scanning,
    /// A `data: ` payload failed to parse. It is held until the
    /// following line either completes it or starts a new record.
    AwaitingContinuation { pending: String },
}

enum Line<'a> {
    Ignored,
    Done,
    Payload(&'a str),
}

enum Flow {
    Continue,
    Done,
}

/// Holds back the tail of a multi-byte character that was split
/// across chunks.
#[derive(Default)]
struct Utf8Carry {
    incomplete: Vec<u8>,
}

impl Utf8Carry {
    fn decode(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.incomplete);
        bytes.extend_from_slice(chunk);

        let mut out = String::with_capacity(bytes.len());
        let mut input = bytes.as_slice();
        loop {
            match std::str::from_utf8(input) {
                Ok(s) => {
                    out.push_str(s);
                    break;
                }
                Err(e) => {
                    let (valid, rest) = input.split_at(e.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            input = &rest[len..];
                        }
                        None => {
                            self.incomplete = rest.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    fn flush(&mut self) -> Option<char> {
        if self.incomplete.is_empty() {
            None
        } else {
            self.incomplete.clear();
            Some(char::REPLACEMENT_CHARACTER)
        }
    }
}

/// Incremental decoder for the `data: <json>` event stream relayed by
/// the chat proxy. Bytes can be split at any point, including inside
/// a UTF-8 character or a JSON payload.
pub struct SseDecoder {
    utf8: Utf8Carry,
    buffer: String,
    state: State,
    limits: DecoderLimits,
    done: bool,
    failed: Option<DecodeError>,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::new(DecoderLimits::default())
    }
}

impl SseDecoder {
    pub fn new(limits: DecoderLimits) -> Self {
        Self {
            utf8: Utf8Carry::default(),
            buffer: String::new(),
            state: State::Scanning,
            limits,
            done: false,
            failed: None,
        }
    }

    /// Whether a `[DONE]` marker has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn is_awaiting_continuation(&self) -> bool {
        matches!(self.state, State::AwaitingContinuation { .. })
    }

    /// Decode the next chunk and return the text deltas it completed,
    /// in stream order. Bytes after `[DONE]` are discarded.
    ///
    /// A line over `max_line_bytes` fails the decoder. Deltas completed
    /// by the same chunk are still returned and the error is reported
    /// by the next call to `feed` or `finish`.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<String>, DecodeError> {
        if let Some(err) = &self.failed {
            return Err(err.clone());
        }
        let mut deltas = Vec::new();
        if self.done {
            return Ok(deltas);
        }

        let text = self.utf8.decode(chunk);
        self.buffer.push_str(&text);

        while let Some(idx) = self.buffer.find('\n') {
            let mut line: String = self.buffer.drain(..=idx).collect();
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
            if let Flow::Done = self.step(&line, &mut deltas) {
                self.buffer.clear();
                break;
            }
        }

        if self.buffer.len() > self.limits.max_line_bytes {
            self.buffer.clear();
            let err = DecodeError::LineTooLong {
                limit: self.limits.max_line_bytes,
            };
            self.failed = Some(err.clone());
            if deltas.is_empty() {
                return Err(err);
            }
        }

        Ok(deltas)
    }

    /// Flush everything still buffered once the source has no more
    /// bytes. A final record without a trailing newline is recovered
    /// here.
    pub fn finish(mut self) -> Result<Vec<String>, DecodeError> {
        if let Some(err) = self.failed.take() {
            return Err(err);
        }
        if self.done {
            return Ok(Vec::new());
        }
        if let Some(c) = self.utf8.flush() {
            self.buffer.push(c);
        }
        let rest = std::mem::take(&mut self.buffer);

        let mut deltas = Vec::new();
        for raw in rest.split('\n') {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            if let Flow::Done = self.step(line, &mut deltas) {
                break;
            }
        }

        if let State::AwaitingContinuation { pending } = &self.state {
            tracing::warn!(
                "Dropping incomplete stream payload at end of stream ({} bytes)",
                pending.len()
            );
        }

        Ok(deltas)
    }

    fn step(&mut self, line: &str, deltas: &mut Vec<String>) -> Flow {
        if let State::AwaitingContinuation { pending } =
            std::mem::replace(&mut self.state, State::Scanning)
        {
            if is_record_boundary(line) {
                tracing::warn!(
                    "Dropping malformed stream payload ({} bytes): {}",
                    pending.len(),
                    truncate_for_log(&pending)
                );
            } else {
                let candidate = format!("{}\n{}", pending, line);
                match parse_delta(&candidate) {
                    Ok(delta) => deltas.extend(delta),
                    Err(_) if candidate.len() > self.limits.max_pending_bytes => {
                        tracing::warn!(
                            "Dropping stream payload over {} bytes: {}",
                            self.limits.max_pending_bytes,
                            truncate_for_log(&candidate)
                        );
                    }
                    Err(_) => {
                        self.state = State::AwaitingContinuation { pending: candidate };
                    }
                }
                return Flow::Continue;
            }
        }

        match classify(line) {
            Line::Ignored => Flow::Continue,
            Line::Done => {
                self.done = true;
                Flow::Done
            }
            Line::Payload(payload) => {
                match parse_delta(payload) {
                    Ok(delta) => deltas.extend(delta),
                    Err(e) => {
                        tracing::debug!("Payload incomplete, waiting for more: {}", e);
                        self.state = State::AwaitingContinuation {
                            pending: payload.to_string(),
                        };
                    }
                }
                Flow::Continue
            }
        }
    }
}

fn classify(line: &str) -> Line<'_> {
    if line.trim().is_empty() || line.starts_with(':') {
        return Line::Ignored;
    }
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return Line::Ignored;
    };
    let payload = payload.trim();
    if payload == DONE_MARKER {
        Line::Done
    } else {
        Line::Payload(payload)
    }
}

fn is_record_boundary(line: &str) -> bool {
    line.trim().is_empty() || line.starts_with(':') || line.starts_with(DATA_PREFIX)
}

/// Extract `choices[0].delta.content`. Empty or missing content is not
/// a delta.
fn parse_delta(payload: &str) -> Result<Option<String>, serde_json::Error> {
    let chunk: Value = serde_json::from_str(payload)?;
    let content = chunk["choices"][0]["delta"]["content"]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(String::from);
    Ok(content)
}

fn truncate_for_log(s: &str) -> String {
    s.chars().take(120).collect()
}
