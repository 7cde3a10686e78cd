// Proxy module - per-request routing and forwarding

mod dispatcher;
pub mod passthrough;

pub use dispatcher::ProxyDispatcher;
