//! Per-caller cooldown windows.
//!
//! Each rate-limited action kind keeps its own last-action timestamp per
//! caller in persistent storage. A caller that has never acted is never
//! throttled, and a window of zero disables the check entirely.
//!
//! [`enforce`] stamps the window as soon as the check passes. A failed
//! invocation rolls back its storage writes, so a call that is rejected
//! later on does not start a new window.

use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::{CommonError, TTL_EXTEND_TO, TTL_THRESHOLD};

const LAST_ACTION: Symbol = symbol_short!("CD_LAST");

/// Default minimum interval between two rate-limited actions, in seconds.
pub const DEFAULT_COOLDOWN_SECS: u64 = 60;

/// Rate-limited action families. Each kind is throttled independently.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ActionKind {
    Submission,
    Decryption,
}

fn last_action_key(kind: ActionKind, caller: &Address) -> (Symbol, ActionKind, Address) {
    (LAST_ACTION, kind, caller.clone())
}

/// Timestamp of the caller's last successful `kind` action, if any.
fn last_action(env: &Env, kind: ActionKind, caller: &Address) -> Option<u64> {
    env.storage()
        .persistent()
        .get(&last_action_key(kind, caller))
}

/// Fails with [`CommonError::CooldownActive`] while `caller` is still inside
/// its window for `kind`. Does not record anything.
fn check(env: &Env, kind: ActionKind, caller: &Address, window: u64) -> Result<(), CommonError> {
    if window == 0 {
        return Ok(());
    }
    if let Some(last) = last_action(env, kind, caller) {
        let now = env.ledger().timestamp();
        if now < last.saturating_add(window) {
            return Err(CommonError::CooldownActive);
        }
    }
    Ok(())
}

/// Stamps `now` as the caller's last `kind` action.
fn record(env: &Env, kind: ActionKind, caller: &Address) {
    let key = last_action_key(kind, caller);
    env.storage()
        .persistent()
        .set(&key, &env.ledger().timestamp());
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Fails with [`CommonError::CooldownActive`] inside the window, otherwise
/// records `now` as the caller's last `kind` action.
pub fn enforce(env: &Env, kind: ActionKind, caller: &Address, window: u64) -> Result<(), CommonError> {
    check(env, kind, caller, window)?;
    record(env, kind, caller);
    Ok(())
}
