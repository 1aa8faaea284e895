//! The URL-classification service consulted by the proxy.
//!
//! # Data Flow
//! ```text
//! blacklist file ("<url> <label>" lines)
//!     → store.rs (in-memory table, immutable once serving)
//!     → service.rs (one-line HTTP protocol: GET <prefix><url> → label)
//! ```
//!
//! The wire contract is a sentinel string: a URL absent from the table
//! answers "SAFE"; a listed URL answers its stored label. The proxy treats
//! anything other than "SAFE" as a Blocked verdict.

pub mod service;
pub mod store;

pub use service::router;
pub use store::UrlStore;
