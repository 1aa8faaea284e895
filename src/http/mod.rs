//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, per-request orchestration)
//!     → [firewall layer classifies the URL]
//!     → rewrite.rs (hop-by-hop stripping, forwarded-for chain)
//!     → upstream Do, response headers copied back verbatim
//! ```

pub mod rewrite;
pub mod server;

pub use server::{AppState, HttpServer};
