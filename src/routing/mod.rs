//! Model resolution and provider load balancing.
//!
//! - `resolver`: maps a requested model name to a backend model name and the
//!   set of providers able to serve it.
//! - `selector`: weighted random choice among those providers.

pub mod resolver;
pub mod selector;

pub use resolver::{matches_model, resolve_model, ResolvedTarget};
pub use selector::weighted_select;
