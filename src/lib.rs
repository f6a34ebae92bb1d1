//! HTTP relay that forwards every request to one fixed upstream and turns a
//! string `precise_amount` in JSON bodies into an exact JSON integer.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod relay;
pub mod resilience;
pub mod security;
pub mod transform;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use relay::RelayPipeline;
