//! Batch lifecycle and the append-only record log.
//!
//! ## Storage keys
//!
//! - `"BATCH_ID"` (instance) → `u32`, highest batch id handed out (0 = none)
//! - `("BATCH", id)` (persistent) → [`Batch`]
//! - `("REC", id, index)` (persistent) → [`StoredRecord`]
//!
//! Only the highest batch id accepts appends, and only while it is open.
//! Batches move open → closed exactly once; records are never rewritten.

use soroban_sdk::{symbol_short, Env, Symbol};

use common::{cooldown, ActionKind, TTL_EXTEND_TO, TTL_THRESHOLD};

use crate::access::AccessContext;
use crate::config::LedgerConfig;
use crate::errors::LedgerError;
use crate::events;
use crate::fhe::FheBackend;
use crate::types::{Batch, EncryptedRecord, StoredRecord};

const BATCH_ID: Symbol = symbol_short!("BATCH_ID");
const BATCH: Symbol = symbol_short!("BATCH");
const RECORD: Symbol = symbol_short!("REC");

pub(crate) fn batch_key(id: u32) -> (Symbol, u32) {
    (BATCH, id)
}

pub(crate) fn record_key(batch_id: u32, index: u32) -> (Symbol, u32, u32) {
    (RECORD, batch_id, index)
}

pub fn current_id(env: &Env) -> u32 {
    env.storage().instance().get(&BATCH_ID).unwrap_or(0)
}

pub fn load(env: &Env, id: u32) -> Result<Batch, LedgerError> {
    if id == 0 || id > current_id(env) {
        return Err(LedgerError::InvalidBatch);
    }
    let key = batch_key(id);
    let batch: Batch = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(LedgerError::InvalidBatch)?;
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    Ok(batch)
}

/// Loads `id` and requires it to be closed.
pub fn load_closed(env: &Env, id: u32) -> Result<Batch, LedgerError> {
    let batch = load(env, id)?;
    if !batch.closed {
        return Err(LedgerError::InvalidBatch);
    }
    Ok(batch)
}

fn save(env: &Env, batch: &Batch) {
    let key = batch_key(batch.id);
    env.storage().persistent().set(&key, batch);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn get_record(env: &Env, batch_id: u32, index: u32) -> Result<StoredRecord, LedgerError> {
    let key = record_key(batch_id, index);
    let stored: StoredRecord = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(LedgerError::RecordNotFound)?;
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    Ok(stored)
}

/// Opens batch `current + 1`. Owner only.
pub fn open(env: &Env, ctx: &AccessContext) -> Result<u32, LedgerError> {
    ctx.require_owner()?;
    ctx.require_not_paused()?;

    let id = current_id(env)
        .checked_add(1)
        .ok_or(LedgerError::InvalidBatch)?;
    let batch = Batch {
        id,
        closed: false,
        record_count: 0,
        opened_at: env.ledger().timestamp(),
        closed_at: 0,
    };
    env.storage().instance().set(&BATCH_ID, &id);
    save(env, &batch);

    events::publish_batch_opened(env, id);
    Ok(id)
}

/// Closes batch `id`. Owner only; a closed batch can never reopen.
pub fn close(env: &Env, ctx: &AccessContext, id: u32) -> Result<(), LedgerError> {
    ctx.require_owner()?;
    ctx.require_not_paused()?;

    let mut batch = load(env, id)?;
    if batch.closed {
        return Err(LedgerError::InvalidBatch);
    }
    batch.closed = true;
    batch.closed_at = env.ledger().timestamp();
    save(env, &batch);

    events::publish_batch_closed(env, id, batch.record_count);
    Ok(())
}

/// Appends `record` to the current batch and returns its index.
///
/// Provider only, subject to the submission cooldown and the batch size cap.
/// Every handle must be initialized in the executor before it is stored.
pub fn append<B: FheBackend>(
    env: &Env,
    ctx: &AccessContext,
    backend: &B,
    config: &LedgerConfig,
    record: EncryptedRecord,
) -> Result<u32, LedgerError> {
    ctx.require_not_paused()?;
    ctx.require_provider()?;
    cooldown::enforce(env, ActionKind::Submission, &ctx.caller, config.cooldown_secs)?;

    let id = current_id(env);
    if id == 0 {
        return Err(LedgerError::BatchClosedOrInvalid);
    }
    let mut batch = load(env, id).map_err(|_| LedgerError::BatchClosedOrInvalid)?;
    if batch.closed {
        return Err(LedgerError::BatchClosedOrInvalid);
    }
    if batch.record_count >= config.max_records_per_batch {
        return Err(LedgerError::BatchFull);
    }

    for handle in [
        &record.category,
        &record.score,
        &record.vintage,
        &record.region,
    ] {
        if !backend.is_initialized(handle) {
            return Err(LedgerError::UninitializedCiphertext);
        }
    }

    let index = batch.record_count;
    let stored = StoredRecord {
        record,
        provider: ctx.caller.clone(),
        submitted_at: env.ledger().timestamp(),
    };
    let key = record_key(id, index);
    env.storage().persistent().set(&key, &stored);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);

    batch.record_count = index
        .checked_add(1)
        .ok_or(LedgerError::InvalidInput)?;
    save(env, &batch);

    events::publish_record_appended(env, id, index, ctx.caller.clone());
    Ok(index)
}
