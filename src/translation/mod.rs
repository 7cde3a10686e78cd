// Translation module - OpenAI ↔ Anthropic translation

pub mod request;
pub mod response;
pub mod streaming;
pub mod tools;

pub use request::{max_tokens_floor, translate_request, MIN_MAX_TOKENS};
pub use response::{map_stop_reason, translate_response};
pub use streaming::{StreamState, StreamTranscoder};
