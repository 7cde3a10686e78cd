// SSE event translation for streaming responses (Anthropic events → OpenAI chunks)

use crate::error::ProxyError;
use crate::models::openai::{ChatCompletionResponse, Choice, ChoiceMessage, ToolCall};
use crate::models::streaming::{
    ContentBlockDeltaEvent, ContentBlockStart, ContentBlockStartEvent, Delta, MessageDeltaEvent,
    SseEvent, StreamFrame,
};
use crate::translation::response::{convert_usage, map_stop_reason};
use crate::utils::clock::Clock;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

const STREAM_ID: &str = "chatcmpl-stream";
const CHUNK_OBJECT: &str = "chat.completion.chunk";

/// Per-connection transcoding state. Lives exactly as long as one streamed
/// response.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StreamState {
    /// Index the next opened tool call will get.
    pub tool_index: usize,
    pub tool_id: String,
    pub tool_name: String,
    /// Argument text received so far for the current tool call.
    pub tool_args: String,
    pub has_tool: bool,
}

/// Translates Anthropic stream events into OpenAI chunks, one event at a time.
pub struct StreamTranscoder {
    model: String,
    clock: Arc<dyn Clock>,
    state: StreamState,
}

impl StreamTranscoder {
    pub fn new(model: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            model: model.into(),
            clock,
            state: StreamState::default(),
        }
    }

    pub fn state(&self) -> &StreamState {
        &self.state
    }

    /// Translate one upstream event. Each event yields at most one chunk.
    pub fn transcode_event(&mut self, event: &SseEvent) -> Option<ChatCompletionResponse> {
        match event.event.as_str() {
            "message_start" => Some(self.chunk(
                ChoiceMessage {
                    role: "assistant".to_string(),
                    ..Default::default()
                },
                None,
            )),

            "content_block_start" => {
                let payload: ContentBlockStartEvent = decode_payload(event);
                match payload.content_block {
                    Some(ContentBlockStart::ToolUse { id, name }) => {
                        debug!("Opening tool call #{}: {} ({})", self.state.tool_index, name, id);
                        self.state.has_tool = true;
                        self.state.tool_id = id;
                        self.state.tool_name = name;
                        self.state.tool_args.clear();

                        let call = ToolCall::function(
                            self.state.tool_index,
                            &self.state.tool_id,
                            &self.state.tool_name,
                            "",
                        );
                        self.state.tool_index += 1;
                        Some(self.tool_chunk(call))
                    }
                    _ => None,
                }
            }

            "content_block_delta" => {
                let payload: ContentBlockDeltaEvent = decode_payload(event);
                match payload.delta? {
                    Delta::TextDelta { text } => Some(self.chunk(
                        ChoiceMessage {
                            content: text,
                            ..Default::default()
                        },
                        None,
                    )),
                    Delta::ThinkingDelta { thinking } => Some(self.chunk(
                        ChoiceMessage {
                            reasoning_content: thinking,
                            ..Default::default()
                        },
                        None,
                    )),
                    Delta::InputJsonDelta { partial_json } => {
                        let Some(index) = self.state.tool_index.checked_sub(1) else {
                            warn!("Dropping input_json_delta received before any tool_use block");
                            return None;
                        };
                        self.state.tool_args.push_str(&partial_json);
                        // Only the new fragment goes out; clients concatenate
                        let call = ToolCall::function(
                            index,
                            &self.state.tool_id,
                            &self.state.tool_name,
                            partial_json,
                        );
                        Some(self.tool_chunk(call))
                    }
                    Delta::Other => None,
                }
            }

            "message_delta" => {
                let payload: MessageDeltaEvent = decode_payload(event);
                let finish = map_stop_reason(payload.delta.stop_reason.as_deref());
                let mut chunk = self.chunk(ChoiceMessage::default(), Some(finish.to_string()));
                chunk.usage = payload.usage.map(convert_usage);
                Some(chunk)
            }

            _ => None,
        }
    }

    /// Lazily transcode a finite event sequence, ending with [`StreamFrame::Done`].
    pub fn frames<I>(self, events: I) -> Frames<I::IntoIter>
    where
        I: IntoIterator<Item = SseEvent>,
    {
        Frames {
            transcoder: self,
            events: events.into_iter(),
            finished: false,
        }
    }

    fn tool_chunk(&self, call: ToolCall) -> ChatCompletionResponse {
        self.chunk(
            ChoiceMessage {
                tool_calls: vec![call],
                ..Default::default()
            },
            None,
        )
    }

    fn chunk(&self, delta: ChoiceMessage, finish_reason: Option<String>) -> ChatCompletionResponse {
        ChatCompletionResponse {
            id: STREAM_ID.to_string(),
            object: CHUNK_OBJECT.to_string(),
            created: self.clock.now(),
            model: self.model.clone(),
            choices: vec![Choice {
                index: 0,
                message: None,
                delta: Some(delta),
                finish_reason,
            }],
            usage: None,
        }
    }
}

/// Malformed payloads decode to their defaults, which the caller treats as
/// "nothing to emit" (or a plain `stop` for `message_delta`).
fn decode_payload<T: DeserializeOwned + Default>(event: &SseEvent) -> T {
    serde_json::from_str(&event.data).unwrap_or_else(|e| {
        warn!("Malformed {} payload: {}", event.event, e);
        T::default()
    })
}

/// Iterator returned by [`StreamTranscoder::frames`].
pub struct Frames<I> {
    transcoder: StreamTranscoder,
    events: I,
    finished: bool,
}

impl<I: Iterator<Item = SseEvent>> Iterator for Frames<I> {
    type Item = StreamFrame;

    fn next(&mut self) -> Option<StreamFrame> {
        if self.finished {
            return None;
        }
        for event in self.events.by_ref() {
            if let Some(chunk) = self.transcoder.transcode_event(&event) {
                return Some(StreamFrame::Chunk(chunk));
            }
        }
        self.finished = true;
        Some(StreamFrame::Done)
    }
}

/// Async counterpart of [`Frames`]: turns upstream events into SSE body chunks,
/// one `data:` frame per item so each is flushed as soon as it is produced.
///
/// An upstream error aborts the body without the `[DONE]` marker. Chunks are
/// counted against `provider_id`.
pub fn sse_body<S>(
    events: S,
    mut transcoder: StreamTranscoder,
    provider_id: String,
) -> impl Stream<Item = std::result::Result<Bytes, std::io::Error>> + Send
where
    S: Stream<Item = crate::error::Result<SseEvent>> + Send + 'static,
{
    async_stream::stream! {
        futures::pin_mut!(events);
        let mut chunk_count = 0u64;

        while let Some(event) = events.next().await {
            match event {
                Ok(event) => {
                    if let Some(chunk) = transcoder.transcode_event(&event) {
                        chunk_count += 1;
                        crate::metrics::record_stream_chunk(&provider_id);
                        yield Ok(Bytes::from(StreamFrame::Chunk(chunk).to_sse()));
                    }
                }
                Err(e) => {
                    warn!("Upstream stream failed after {} chunks: {}", chunk_count, e);
                    yield Err(to_io_error(e));
                    return;
                }
            }
        }

        debug!("Upstream stream ended after {} chunks", chunk_count);
        yield Ok(Bytes::from(StreamFrame::Done.to_sse()));
    }
}

fn to_io_error(err: ProxyError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}
