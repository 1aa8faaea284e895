//! Deterministic urldb backend selection.
//!
//! # Responsibilities
//! - Hash the lookup URL with 32-bit FNV-1a
//! - Map the hash onto the ordered backend list by modulo
//!
//! # Design Decisions
//! - FNV-1a is non-cryptographic and seedless, so the same URL maps to the
//!   same backend index on every run against an unchanged list
//! - The function is total for non-empty lists; an empty list is a
//!   precondition violation (config validation rejects it at startup)

use crate::config::schema::Backend;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 16_777_619;

/// 32-bit FNV-1a over a byte slice.
pub fn fnv1a_32(data: &[u8]) -> u32 {
    data.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Select the urldb backend responsible for `url`.
///
/// # Panics
/// Panics if `backends` is empty.
pub fn select_backend<'a>(url: &str, backends: &'a [Backend]) -> &'a Backend {
    let index = fnv1a_32(url.as_bytes()) as usize % backends.len();
    &backends[index]
}
