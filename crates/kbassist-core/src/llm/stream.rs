//! Incremental decoding of `data: ` framed completion streams

use super::StreamEnd;
use crate::error::KbAssistError;
use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

const DONE_SENTINEL: &str = "[DONE]";

/// One decoded frame of interest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    Delta(String),
    Done,
}

/// Line-buffering frame decoder
///
/// Input is split on `\n` at the byte level, so a multi-byte character that
/// straddles two reads stays in the buffer until its line is complete.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    finished: bool,
    malformed: usize,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes and return the events completed by them
    ///
    /// Nothing is returned after the `[DONE]` sentinel.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<SseEvent> {
        if self.finished {
            return Vec::new();
        }
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(event) = self.decode_line(&line[..line.len() - 1]) {
                let done = event == SseEvent::Done;
                events.push(event);
                if done {
                    self.finished = true;
                    self.buffer.clear();
                    break;
                }
            }
        }
        events
    }

    /// Decode whatever is left once the body has ended
    pub fn finish(&mut self) -> Vec<SseEvent> {
        if self.finished || self.buffer.is_empty() {
            return Vec::new();
        }
        let rest = std::mem::take(&mut self.buffer);
        self.finished = true;
        self.decode_line(&rest).into_iter().collect()
    }

    /// Number of frames skipped because they did not parse
    pub fn malformed_frames(&self) -> usize {
        self.malformed
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn decode_line(&mut self, raw: &[u8]) -> Option<SseEvent> {
        let line = match std::str::from_utf8(raw) {
            Ok(line) => line.trim_end_matches('\r'),
            Err(_) => {
                self.malformed += 1;
                return None;
            }
        };

        let data = line.strip_prefix("data:")?.trim_start();
        if data == DONE_SENTINEL {
            return Some(SseEvent::Done);
        }

        match serde_json::from_str::<serde_json::Value>(data) {
            Ok(parsed) => parsed["choices"][0]["delta"]["content"]
                .as_str()
                .filter(|content| !content.is_empty())
                .map(|content| SseEvent::Delta(content.to_string())),
            Err(e) => {
                self.malformed += 1;
                tracing::debug!("Skipping malformed stream frame: {}", e);
                None
            }
        }
    }
}

/// Pump a byte stream through the decoder into `on_chunk`
///
/// `cancel` is polled before every read; a read already in flight is not
/// interrupted.
pub async fn drive_stream<S, B, E>(
    body: S,
    on_chunk: &mut (dyn for<'c> FnMut(&'c str) + Send),
    cancel: Option<&CancellationToken>,
) -> Result<StreamEnd, KbAssistError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<KbAssistError>,
{
    let mut body = std::pin::pin!(body);
    let mut decoder = SseDecoder::new();

    let end = loop {
        if cancel.is_some_and(|c| c.is_cancelled()) {
            tracing::debug!("Stream cancelled by caller");
            break StreamEnd::Cancelled;
        }

        let Some(item) = body.next().await else {
            let tail = decoder.finish();
            break if deliver(tail, on_chunk) {
                StreamEnd::Done
            } else {
                StreamEnd::Eof
            };
        };

        let bytes = item.map_err(Into::into)?;
        if deliver(decoder.push(bytes.as_ref()), on_chunk) {
            break StreamEnd::Done;
        }
    };

    if decoder.malformed_frames() > 0 {
        tracing::debug!(
            "Stream finished ({:?}) with {} malformed frames skipped",
            end,
            decoder.malformed_frames()
        );
    }
    Ok(end)
}

/// Returns true once the sentinel has been seen
fn deliver(
    events: Vec<SseEvent>,
    on_chunk: &mut (dyn for<'c> FnMut(&'c str) + Send),
) -> bool {
    for event in events {
        match event {
            SseEvent::Delta(text) => on_chunk(&text),
            SseEvent::Done => return true,
        }
    }
    false
}
