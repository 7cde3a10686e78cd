// Upstream SSE parsing
//
// Line oriented: `event: X` sets the current event type and every `data: Y`
// line is delivered as one event immediately.

use crate::error::{ProxyError, Result};
use crate::models::streaming::{SseEvent, DONE_SENTINEL};
use bytes::Bytes;
use futures::stream::Stream;
use tracing::debug;

/// Longest line the decoder buffers while waiting for its newline.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Incremental decoder; feed it raw body chunks in arrival order.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    current_event: String,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a chunk and return every event completed by it. Fails once an
    /// unterminated line grows past [`MAX_LINE_BYTES`].
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<SseEvent>> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }

        if self.buffer.len() > MAX_LINE_BYTES {
            let len = self.buffer.len();
            self.buffer.clear();
            return Err(ProxyError::UpstreamDecode(format!(
                "SSE line exceeds {} bytes ({} buffered)",
                MAX_LINE_BYTES, len
            )));
        }
        Ok(events)
    }

    /// Flush a final line that arrived without a trailing newline.
    pub fn finish(&mut self) -> Option<SseEvent> {
        if self.buffer.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.buffer);
        self.process_line(&line)
    }

    fn process_line(&mut self, raw: &[u8]) -> Option<SseEvent> {
        let line = String::from_utf8_lossy(raw);
        let line = line.trim_end_matches(['\n', '\r']);

        if line.is_empty() {
            // blank line ends the event block
            self.current_event.clear();
            return None;
        }

        if let Some(name) = line.strip_prefix("event:") {
            self.current_event = name.trim().to_string();
            return None;
        }

        let data = line.strip_prefix("data:")?;
        let data = data.strip_prefix(' ').unwrap_or(data);
        if data.is_empty() || data == DONE_SENTINEL {
            return None;
        }

        let event = if self.current_event.is_empty() {
            event_type_of(data)
        } else {
            self.current_event.clone()
        };
        Some(SseEvent::new(event, data))
    }
}

/// The payload's own `"type"` field, for streams that omit `event:` lines.
fn event_type_of(data: &str) -> String {
    serde_json::from_str::<serde_json::Value>(data)
        .ok()
        .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(str::to_string))
        .unwrap_or_default()
}

/// Parse an SSE byte stream into events, preserving arrival order.
pub fn sse_events<S>(byte_stream: S) -> impl Stream<Item = Result<SseEvent>> + Send
where
    S: Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
{
    use futures::StreamExt;

    async_stream::stream! {
        let mut decoder = SseDecoder::new();
        futures::pin_mut!(byte_stream);

        while let Some(chunk) = byte_stream.next().await {
            match chunk {
                Ok(chunk) => match decoder.feed(&chunk) {
                    Ok(events) => {
                        for event in events {
                            debug!("[SSE] event={} data={}", event.event, event.data.chars().take(200).collect::<String>());
                            yield Ok(event);
                        }
                    }
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                },
                Err(e) => {
                    yield Err(ProxyError::UpstreamConnect(format!("stream read failed: {}", e)));
                    return;
                }
            }
        }

        if let Some(event) = decoder.finish() {
            yield Ok(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_and_data_lines() {
        let mut decoder = SseDecoder::new();
        let events = decoder
            .feed(b"event: message_start\ndata: {\"type\":\"message_start\"}\n\nevent: ping\ndata: {\"type\": \"ping\"}\n\n")
            .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event, "message_start");
        assert_eq!(events[0].data, "{\"type\":\"message_start\"}");
        assert_eq!(events[1].event, "ping");
    }

    #[test]
    fn test_lines_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"event: content_block_delta\nda").unwrap().is_empty());
        let events = decoder.feed(b"ta: {\"delta\":{}}\r\n").unwrap();

        assert_eq!(events, vec![SseEvent::new("content_block_delta", "{\"delta\":{}}")]);
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        let line = "event: x\ndata: {\"text\":\"héllo\"}\n".as_bytes();
        let split = line.iter().position(|b| *b == 0xC3).unwrap() + 1;

        assert!(decoder.feed(&line[..split]).unwrap().is_empty());
        let events = decoder.feed(&line[split..]).unwrap();
        assert_eq!(events[0].data, "{\"text\":\"héllo\"}");
    }

    #[test]
    fn test_missing_event_line_uses_payload_type() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"data: {\"type\":\"message_delta\",\"delta\":{}}\n\n").unwrap();
        assert_eq!(events[0].event, "message_delta");
    }

    #[test]
    fn test_done_and_comments_skipped() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b": keepalive\ndata: [DONE]\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_finish_flushes_unterminated_line() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"event: message_stop\ndata: {}").unwrap().is_empty());
        assert_eq!(decoder.finish(), Some(SseEvent::new("message_stop", "{}")));
        assert_eq!(decoder.finish(), None);
    }

    #[tokio::test]
    async fn test_sse_events_stream() {
        use futures::StreamExt;

        let chunks: Vec<reqwest::Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"event: message_start\ndata: {}\n\n")),
            Ok(Bytes::from_static(b"event: message_stop\ndata: {}")),
        ];
        let events: Vec<_> = sse_events(futures::stream::iter(chunks)).collect().await;

        assert_eq!(events.len(), 2);
        assert_eq!(events[1].as_ref().unwrap().event, "message_stop");
    }

    #[test]
    fn test_overlong_line_is_rejected() {
        let mut decoder = SseDecoder::new();
        let mut chunk = b"data: ".to_vec();
        chunk.resize(MAX_LINE_BYTES, b'x');

        assert!(decoder.feed(&chunk).unwrap().is_empty());
        assert!(matches!(decoder.feed(b"xx"), Err(ProxyError::UpstreamDecode(_))));
    }

    #[test]
    fn test_long_terminated_line_is_accepted() {
        let mut decoder = SseDecoder::new();
        let mut chunk = b"event: x\ndata: ".to_vec();
        chunk.resize(MAX_LINE_BYTES + 64, b'y');
        chunk.push(b'\n');

        let events = decoder.feed(&chunk).unwrap();
        assert_eq!(events.len(), 1);
        assert!(events[0].data.starts_with("yyy"));
    }

    #[tokio::test]
    async fn test_sse_events_ends_on_overlong_line() {
        use futures::StreamExt;

        let chunks: Vec<reqwest::Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"event: message_start\ndata: {}\n\n")),
            Ok(Bytes::from(vec![b'z'; MAX_LINE_BYTES + 1])),
            Ok(Bytes::from_static(b"\nevent: message_stop\ndata: {}\n\n")),
        ];
        let events: Vec<_> = sse_events(futures::stream::iter(chunks)).collect().await;

        assert_eq!(events.len(), 2);
        assert!(events[0].is_ok());
        assert!(matches!(events[1], Err(ProxyError::UpstreamDecode(_))));
    }
}
