//! HTTP forward proxy with a URL firewall.
//!
//! Every inbound request is checked against an external URL-classification
//! service (the "urldb") before it is relayed upstream. The urldb is sharded:
//! one of several backends is chosen per request by hashing the request URL,
//! so a given URL is always classified by the same backend.

// Core subsystems
pub mod config;
pub mod firewall;
pub mod http;

// Cross-cutting concerns
pub mod lifecycle;

// The URL-classification service itself
pub mod urldb;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
