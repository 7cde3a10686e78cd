//! Cross-cutting helpers.
//!
//! - `logging`: tracing initialization and credential redaction.
//! - `clock`: injectable time source for response timestamps.

pub mod clock;
pub mod logging;

pub use clock::{Clock, FixedClock, SystemClock};
