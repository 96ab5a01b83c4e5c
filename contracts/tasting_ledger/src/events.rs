//! Events emitted by the tasting ledger.
//!
//! Every event is published under `("TASTE", <name>)` with one of the
//! payload structs below.

use soroban_sdk::{symbol_short, Address, BytesN, Env, IntoVal, Symbol, Val, Vec};

use crate::config::LedgerConfig;

fn emit<T: IntoVal<Env, Val>>(env: &Env, topic: &str, data: T) {
    #[allow(deprecated)]
    env.events()
        .publish((symbol_short!("TASTE"), Symbol::new(env, topic)), data);
}

// ── Event payloads ────────────────────────────────────────────────────────────

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub owner: Address,
    pub oracle: Address,
    pub executor: Address,
    pub context_tag: BytesN<32>,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BatchOpenedEvent {
    pub batch_id: u32,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BatchClosedEvent {
    pub batch_id: u32,
    pub record_count: u32,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordAppendedEvent {
    pub batch_id: u32,
    pub index: u32,
    pub provider: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecryptionRequestedEvent {
    pub request_id: u64,
    pub batch_id: u32,
    pub commitment: BytesN<32>,
    pub requester: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecryptionFinalizedEvent {
    pub request_id: u64,
    pub batch_id: u32,
    pub results: Vec<u64>,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProviderChangedEvent {
    pub provider: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OwnershipTransferredEvent {
    pub previous: Address,
    pub next: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PauseChangedEvent {
    pub caller: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigUpdatedEvent {
    pub config: LedgerConfig,
    pub timestamp: u64,
}

// ── Publishers ────────────────────────────────────────────────────────────────

pub fn publish_initialized(env: &Env, owner: Address, config: &LedgerConfig) {
    emit(
        env,
        "INIT",
        InitializedEvent {
            owner,
            oracle: config.oracle.clone(),
            executor: config.executor.clone(),
            context_tag: config.context_tag.clone(),
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_batch_opened(env: &Env, batch_id: u32) {
    emit(
        env,
        "BATCH_OPEN",
        BatchOpenedEvent {
            batch_id,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_batch_closed(env: &Env, batch_id: u32, record_count: u32) {
    emit(
        env,
        "BATCH_CLS",
        BatchClosedEvent {
            batch_id,
            record_count,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_record_appended(env: &Env, batch_id: u32, index: u32, provider: Address) {
    emit(
        env,
        "REC_ADD",
        RecordAppendedEvent {
            batch_id,
            index,
            provider,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_decryption_requested(
    env: &Env,
    request_id: u64,
    batch_id: u32,
    commitment: BytesN<32>,
    requester: Address,
) {
    emit(
        env,
        "DEC_REQ",
        DecryptionRequestedEvent {
            request_id,
            batch_id,
            commitment,
            requester,
            timestamp: env.ledger().timestamp(),
        },
    );
}

/// Carries the decoded per-category sums; this is the only place plaintext
/// aggregates leave the contract.
pub fn publish_decryption_finalized(env: &Env, request_id: u64, batch_id: u32, results: Vec<u64>) {
    emit(
        env,
        "DEC_DONE",
        DecryptionFinalizedEvent {
            request_id,
            batch_id,
            results,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_provider_added(env: &Env, provider: Address) {
    emit(
        env,
        "PRV_ADD",
        ProviderChangedEvent {
            provider,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_provider_removed(env: &Env, provider: Address) {
    emit(
        env,
        "PRV_REM",
        ProviderChangedEvent {
            provider,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_ownership_transferred(env: &Env, previous: Address, next: Address) {
    emit(
        env,
        "OWN_XFER",
        OwnershipTransferredEvent {
            previous,
            next,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_paused(env: &Env, caller: Address, paused: bool) {
    let topic = if paused { "PAUSED" } else { "UNPAUSED" };
    emit(
        env,
        topic,
        PauseChangedEvent {
            caller,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_config_updated(env: &Env, config: LedgerConfig) {
    emit(
        env,
        "CFG_UPD",
        ConfigUpdatedEvent {
            config,
            timestamp: env.ledger().timestamp(),
        },
    );
}
