//! Shared building blocks for the sealed-tasting contract suite.
//!
//! This crate provides:
//! - [`CommonError`] — error codes shared by every contract in the workspace.
//! - [`pausable`] — a contract-wide halt flag with a guard for mutating calls.
//! - [`cooldown`] — per-caller rate limiting keyed by action kind.
//!
//! Contract-specific errors extend the range starting at code **100** and
//! above, ensuring no collisions with the common set.

#![no_std]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

use soroban_sdk::contracterror;

pub mod cooldown;
pub mod pausable;

pub use cooldown::*;
pub use pausable::*;

/// TTL bump threshold for persistent entries (~300 days @ ~5s/ledger).
pub const TTL_THRESHOLD: u32 = 5_184_000;
/// TTL target for persistent entries (~600 days @ ~5s/ledger).
pub const TTL_EXTEND_TO: u32 = 10_368_000;

/// Standardised error codes shared by every contract in the suite.
///
/// # Code ranges
/// | Range   | Purpose                        |
/// |---------|--------------------------------|
/// | 1 – 9   | Lifecycle / initialisation     |
/// | 10 – 19 | Authentication & authorisation |
/// | 40 – 49 | Contract state / throttling    |
/// | 100+    | Reserved for contract-specific |
#[contracterror]
#[derive(Clone, Debug, Eq, PartialEq, Copy)]
#[repr(u32)]
pub enum CommonError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    /// Caller lacks the role required by the operation.
    NotAuthorized = 10,
    /// The contract is currently paused and cannot process requests.
    Paused = 40,
    /// The caller acted again before its cooldown window elapsed.
    CooldownActive = 41,
}
