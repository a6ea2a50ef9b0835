//! Server-sent events decoder
//!
//! Incremental parser for the `text/event-stream` format. Bytes may arrive
//! split at any point, including inside a line or a UTF-8 sequence; frames
//! are emitted only once their terminating blank line has been seen.

use std::time::Duration;

/// Event name used when a frame has no `event:` field
pub const DEFAULT_EVENT: &str = "message";

/// Most bytes buffered for a single frame before it is dropped
pub const MAX_FRAME_BYTES: usize = 1024 * 1024;

/// One dispatched event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: String,
    pub data: String,
    /// Last event ID in effect when the frame was dispatched
    pub id: Option<String>,
}

/// A frame dropped for exceeding the decoder's size limit
///
/// The rest of the frame, up to its blank line, is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OversizedFrame {
    /// Event name seen before the limit was hit
    pub event: String,
    pub limit: usize,
}

/// Incremental `text/event-stream` decoder
#[derive(Debug)]
pub struct SseDecoder {
    line: Vec<u8>,
    after_cr: bool,
    started: bool,
    event: String,
    data: String,
    last_event_id: Option<String>,
    retry: Option<Duration>,
    max_frame_bytes: usize,
    /// Skipping the remainder of an oversized frame
    discarding: bool,
    discarded_line: bool,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::with_max_frame_bytes(MAX_FRAME_BYTES)
    }
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_frame_bytes(max_frame_bytes: usize) -> Self {
        Self {
            line: Vec::new(),
            after_cr: false,
            started: false,
            event: String::new(),
            data: String::new(),
            last_event_id: None,
            retry: None,
            max_frame_bytes,
            discarding: false,
            discarded_line: false,
        }
    }

    /// Feeds a chunk and returns the frames it completed, in order
    ///
    /// A frame growing past the size limit is reported once as
    /// [`OversizedFrame`] in its place.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Result<SseFrame, OversizedFrame>> {
        let mut frames = Vec::new();

        for &byte in chunk {
            if self.after_cr {
                self.after_cr = false;
                if byte == b'\n' {
                    continue;
                }
            }
            match byte {
                b'\n' => self.end_line(&mut frames),
                b'\r' => {
                    self.after_cr = true;
                    self.end_line(&mut frames);
                }
                _ if self.discarding => self.discarded_line = true,
                _ if self.line.len() + self.data.len() >= self.max_frame_bytes => {
                    frames.push(Err(self.drop_frame()));
                }
                _ => self.line.push(byte),
            }
        }

        frames
    }

    /// Clears partial input before a new connection
    ///
    /// The last event ID and reconnection delay survive, as they are needed
    /// to resume.
    pub fn reset(&mut self) {
        self.line.clear();
        self.after_cr = false;
        self.started = false;
        self.event.clear();
        self.data.clear();
        self.discarding = false;
        self.discarded_line = false;
    }

    pub fn last_event_id(&self) -> Option<&str> {
        self.last_event_id.as_deref()
    }

    /// Reconnection delay most recently requested by the server
    pub fn retry(&self) -> Option<Duration> {
        self.retry
    }

    fn drop_frame(&mut self) -> OversizedFrame {
        let event = std::mem::take(&mut self.event);
        self.line.clear();
        self.data.clear();
        self.started = true;
        self.discarding = true;
        self.discarded_line = true;

        OversizedFrame {
            event: if event.is_empty() {
                DEFAULT_EVENT.to_string()
            } else {
                event
            },
            limit: self.max_frame_bytes,
        }
    }

    fn end_line(&mut self, frames: &mut Vec<Result<SseFrame, OversizedFrame>>) {
        if self.discarding {
            // a blank line ends the dropped frame
            self.discarding = std::mem::take(&mut self.discarded_line);
            return;
        }

        let raw = std::mem::take(&mut self.line);
        let mut line = String::from_utf8_lossy(&raw).into_owned();

        if !self.started {
            self.started = true;
            if let Some(stripped) = line.strip_prefix('\u{feff}') {
                line = stripped.to_string();
            }
        }

        if line.is_empty() {
            if let Some(frame) = self.dispatch() {
                frames.push(Ok(frame));
            }
            return;
        }

        if line.starts_with(':') {
            return;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line.as_str(), ""),
        };

        match field {
            "event" => self.event = value.to_string(),
            "data" => {
                self.data.push_str(value);
                self.data.push('\n');
            }
            "id" => {
                if !value.contains('\0') {
                    self.last_event_id = (!value.is_empty()).then(|| value.to_string());
                }
            }
            "retry" => {
                if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
                    if let Ok(ms) = value.parse::<u64>() {
                        self.retry = Some(Duration::from_millis(ms));
                    }
                }
            }
            _ => {}
        }
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = std::mem::take(&mut self.event);
        if self.data.is_empty() {
            return None;
        }

        let mut data = std::mem::take(&mut self.data);
        data.pop();

        Some(SseFrame {
            event: if event.is_empty() {
                DEFAULT_EVENT.to_string()
            } else {
                event
            },
            data,
            id: self.last_event_id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(decoder: &mut SseDecoder, chunk: &[u8]) -> Vec<SseFrame> {
        decoder
            .feed(chunk)
            .into_iter()
            .map(|item| item.expect("frame within size limit"))
            .collect()
    }

    fn frame(event: &str, data: &str) -> SseFrame {
        SseFrame {
            event: event.to_string(),
            data: data.to_string(),
            id: None,
        }
    }

    #[test]
    fn test_named_and_default_events() {
        let mut decoder = SseDecoder::new();
        let frames = feed(
            &mut decoder,
            b"event: heartbeat\ndata: {\"timestamp\":1}\n\ndata: {\"id\":\"t\"}\n\n",
        );

        assert_eq!(
            frames,
            vec![
                frame("heartbeat", r#"{"timestamp":1}"#),
                frame("message", r#"{"id":"t"}"#),
            ]
        );
    }

    #[test]
    fn test_multiline_data_is_joined() {
        let mut decoder = SseDecoder::new();
        let frames = feed(&mut decoder, b"data: {\"id\":\ndata: \"t\"}\n\n");
        assert_eq!(frames, vec![frame("message", "{\"id\":\n\"t\"}")]);
    }

    #[test]
    fn test_crlf_and_cr_line_endings() {
        let mut decoder = SseDecoder::new();
        let mut frames = feed(&mut decoder, b"event: a\r\ndata: 1\r\n\r\n");
        frames.extend(feed(&mut decoder, b"event: b\rdata: 2\r\r"));
        assert_eq!(frames, vec![frame("a", "1"), frame("b", "2")]);
    }

    #[test]
    fn test_crlf_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(feed(&mut decoder, b"data: 1\r").is_empty());
        // the \n completes the CRLF rather than ending an empty line
        assert!(feed(&mut decoder, b"\n").is_empty());
        assert_eq!(feed(&mut decoder, b"\r\n"), vec![frame("message", "1")]);
    }

    #[test]
    fn test_chunk_boundary_inside_utf8() {
        let payload = "data: caf\u{e9}\n\n".as_bytes();
        let split = payload.iter().position(|&b| b == 0xc3).unwrap() + 1;

        let mut decoder = SseDecoder::new();
        assert!(feed(&mut decoder, &payload[..split]).is_empty());
        assert_eq!(feed(&mut decoder, &payload[split..]), vec![frame("message", "caf\u{e9}")]);
    }

    #[test]
    fn test_comments_and_empty_frames_are_skipped() {
        let mut decoder = SseDecoder::new();
        let frames = feed(&mut decoder, b": keep-alive\n\nevent: heartbeat\n\ndata: x\n\n");
        // an event with no data is not dispatched, and its name does not leak
        assert_eq!(frames, vec![frame("message", "x")]);
    }

    #[test]
    fn test_field_without_colon_and_without_space() {
        let mut decoder = SseDecoder::new();
        let frames = feed(&mut decoder, b"data\ndata:x\n\n");
        assert_eq!(frames, vec![frame("message", "\nx")]);
    }

    #[test]
    fn test_id_and_retry() {
        let mut decoder = SseDecoder::new();
        let frames = feed(
            &mut decoder,
            b"id: 42\nretry: 1500\ndata: a\n\nretry: soon\ndata: b\n\n",
        );

        assert_eq!(frames[0].id.as_deref(), Some("42"));
        assert_eq!(frames[1].id.as_deref(), Some("42"));
        assert_eq!(decoder.last_event_id(), Some("42"));
        assert_eq!(decoder.retry(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_incomplete_frame_is_held_until_blank_line() {
        let mut decoder = SseDecoder::new();
        assert!(feed(&mut decoder, b"event: heartbeat\ndata: {\"timest").is_empty());
        assert_eq!(
            feed(&mut decoder, b"amp\":5}\n\n"),
            vec![frame("heartbeat", r#"{"timestamp":5}"#)]
        );
    }

    #[test]
    fn test_reset_discards_partial_frame_but_keeps_id() {
        let mut decoder = SseDecoder::new();
        feed(&mut decoder, b"id: 9\ndata: a\n\nevent: heartbeat\ndata: partial");
        decoder.reset();

        assert_eq!(decoder.last_event_id(), Some("9"));
        let frames = feed(&mut decoder, b"data: b\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, "message");
        assert_eq!(frames[0].data, "b");
    }

    #[test]
    fn test_leading_bom_is_ignored() {
        let mut decoder = SseDecoder::new();
        let frames = feed(&mut decoder, b"\xef\xbb\xbfdata: a\n\n");
        assert_eq!(frames, vec![frame("message", "a")]);
    }

    #[test]
    fn test_oversized_line_is_dropped_until_blank_line() {
        let mut decoder = SseDecoder::with_max_frame_bytes(16);
        let mut items = decoder.feed(b"event: heartbeat\ndata: 0123456789abcdef");
        items.extend(decoder.feed(b"more bytes that never fit\ndata: still dropped\n\n"));
        items.extend(decoder.feed(b"data: ok\n\n"));

        assert_eq!(
            items,
            vec![
                Err(OversizedFrame {
                    event: "heartbeat".to_string(),
                    limit: 16,
                }),
                Ok(frame("message", "ok")),
            ]
        );
    }

    #[test]
    fn test_oversized_multiline_data_is_dropped() {
        let mut decoder = SseDecoder::with_max_frame_bytes(12);
        let items = decoder.feed(b"data: aaaa\ndata: bbbb\ndata: cccc\n\ndata: x\n\n");

        assert_eq!(items.len(), 2);
        assert!(matches!(&items[0], Err(OversizedFrame { event, .. }) if event == "message"));
        assert_eq!(items[1], Ok(frame("message", "x")));
    }

    #[test]
    fn test_reset_stops_discarding() {
        let mut decoder = SseDecoder::with_max_frame_bytes(8);
        assert_eq!(decoder.feed(b"data: 0123456789").len(), 1);
        decoder.reset();

        assert_eq!(decoder.feed(b"data: a\n\n"), vec![Ok(frame("message", "a"))]);
    }
}
