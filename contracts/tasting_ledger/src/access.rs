//! Owner / provider roles and the per-call access context.
//!
//! ## Storage keys
//!
//! - `"OWNER"` (instance) → `Address`
//! - `("PROV", addr)` (persistent) → `bool`
//!
//! The owner is always a provider, whether or not it appears in the
//! provider set.

use soroban_sdk::{symbol_short, Address, Env, Symbol};

use common::{ensure_running, pause_state, PauseState, TTL_EXTEND_TO, TTL_THRESHOLD};

use crate::errors::LedgerError;

const OWNER: Symbol = symbol_short!("OWNER");
const PROVIDER: Symbol = symbol_short!("PROV");

fn provider_key(addr: &Address) -> (Symbol, Address) {
    (PROVIDER, addr.clone())
}

pub fn get_owner(env: &Env) -> Result<Address, LedgerError> {
    env.storage()
        .instance()
        .get(&OWNER)
        .ok_or(LedgerError::NotInitialized)
}

pub fn set_owner(env: &Env, owner: &Address) {
    env.storage().instance().set(&OWNER, owner);
}

/// Explicit provider-set membership; does not include the implicit owner.
pub fn is_registered_provider(env: &Env, addr: &Address) -> bool {
    let key = provider_key(addr);
    let registered = env.storage().persistent().get(&key).unwrap_or(false);
    if registered {
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
    registered
}

pub fn add_provider(env: &Env, addr: &Address) -> Result<(), LedgerError> {
    if is_registered_provider(env, addr) {
        return Err(LedgerError::ProviderExists);
    }
    let key = provider_key(addr);
    env.storage().persistent().set(&key, &true);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    Ok(())
}

pub fn remove_provider(env: &Env, addr: &Address) -> Result<(), LedgerError> {
    if !is_registered_provider(env, addr) {
        return Err(LedgerError::ProviderNotFound);
    }
    env.storage().persistent().remove(&provider_key(addr));
    Ok(())
}

/// Snapshot of everything a guard needs to know about the caller, loaded
/// once at the top of an entry point and consulted before any mutation.
#[derive(Clone, Debug)]
pub struct AccessContext {
    pub caller: Address,
    pub owner: Address,
    pub is_provider: bool,
    pub pause: PauseState,
}

impl AccessContext {
    /// Loads the context for `caller`. Does not authenticate; entry points
    /// call `caller.require_auth()` first.
    pub fn load(env: &Env, caller: &Address) -> Result<Self, LedgerError> {
        let owner = get_owner(env)?;
        let is_provider = *caller == owner || is_registered_provider(env, caller);
        Ok(AccessContext {
            caller: caller.clone(),
            owner,
            is_provider,
            pause: pause_state(env),
        })
    }

    pub fn is_owner(&self) -> bool {
        self.caller == self.owner
    }

    pub fn require_owner(&self) -> Result<(), LedgerError> {
        if !self.is_owner() {
            return Err(LedgerError::NotAuthorized);
        }
        Ok(())
    }

    pub fn require_provider(&self) -> Result<(), LedgerError> {
        if !self.is_provider {
            return Err(LedgerError::NotAuthorized);
        }
        Ok(())
    }

    pub fn require_not_paused(&self) -> Result<(), LedgerError> {
        ensure_running(&self.pause)?;
        Ok(())
    }
}
