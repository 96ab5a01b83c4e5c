//! Contract-wide halt switch.
//!
//! The flag lives in instance storage together with who flipped it last and
//! when, so operators can tell a deliberate halt from a stale one.

use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::CommonError;

const PAUSE_STATE: Symbol = symbol_short!("PAUSE_ST");

/// Last recorded pause transition.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PauseState {
    pub paused: bool,
    pub changed_by: Option<Address>,
    pub changed_at: u64,
}

impl PauseState {
    fn running() -> Self {
        PauseState {
            paused: false,
            changed_by: None,
            changed_at: 0,
        }
    }
}

/// Records a pause transition and returns the stored state.
///
/// Callers are responsible for enforcing owner authorization before invoking
/// this function. Event emission is left to the contract so each one can
/// publish under its own topic prefix.
pub fn set_paused(env: &Env, paused: bool, changed_by: &Address) -> PauseState {
    let state = PauseState {
        paused,
        changed_by: Some(changed_by.clone()),
        changed_at: env.ledger().timestamp(),
    };
    env.storage().instance().set(&PAUSE_STATE, &state);
    state
}

/// Current pause state; a contract that was never paused reports `running`.
pub fn pause_state(env: &Env) -> PauseState {
    env.storage()
        .instance()
        .get(&PAUSE_STATE)
        .unwrap_or_else(PauseState::running)
}

pub fn is_paused(env: &Env) -> bool {
    pause_state(env).paused
}

/// Maps the flag onto [`CommonError::Paused`] for callers that already hold
/// a loaded [`PauseState`].
pub fn ensure_running(state: &PauseState) -> Result<(), CommonError> {
    if state.paused {
        return Err(CommonError::Paused);
    }
    Ok(())
}
