// Upstream provider access
//
// `client` performs the outbound HTTP calls; `sse` decodes streamed bodies.

mod client;
pub mod sse;

pub use client::UpstreamClient;
pub use sse::{sse_events, SseDecoder};
