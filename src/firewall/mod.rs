//! URL firewall consultation subsystem.
//!
//! # Data Flow
//! ```text
//! lookup path (host + escaped path of the inbound request)
//!     → selector.rs (FNV-1a hash → one urldb backend)
//!     → client.rs (GET against the backend, bounded timeout)
//!     → Verdict::Safe | Verdict::Blocked, or a LookupError
//! ```
//!
//! # Design Decisions
//! - Selection is a pure hash over the URL, stable across restarts
//! - The verdict is the raw response body, compared byte-for-byte against
//!   "SAFE"; no structured parsing of any kind
//! - No caching and no retries; every request pays for a fresh lookup

pub mod client;
pub mod selector;

pub use client::{FirewallClient, HyperClient, LookupError, OutboundClient, Verdict};
pub use selector::select_backend;
