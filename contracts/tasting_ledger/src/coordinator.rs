//! Decryption requests and verified callbacks.
//!
//! A request stores a commitment to the exact aggregate handles it sent to
//! the oracle. When the oracle calls back, the aggregate is recomputed from
//! the ledger as it is *now* and its commitment compared to the stored one;
//! the result is accepted only if they match and the request has not been
//! finalized before.
//!
//! ```text
//! request_decryption ──► Requested ──(callback ok)──► Finalized
//!                            │
//!                            └── oracle never answers: stays Requested
//! ```
//!
//! ## Storage keys
//!
//! - `("DREQ", request_id)` (persistent) → [`DecryptionRequest`], never removed
//! - `"DREQ_CNT"` (instance) → `u64`, number of stored requests

use soroban_sdk::{log, symbol_short, Bytes, BytesN, Env, Symbol, Vec};

use common::{cooldown, ActionKind, TTL_EXTEND_TO, TTL_THRESHOLD};

use crate::access::AccessContext;
use crate::aggregation;
use crate::batch;
use crate::config::LedgerConfig;
use crate::errors::{ErrorClass, LedgerError};
use crate::events;
use crate::fhe::FheBackend;
use crate::oracle::DecryptionGateway;
use crate::types::{AggregateVector, DecryptionRequest, CATEGORY_COUNT};

const REQUEST: Symbol = symbol_short!("DREQ");
const REQUEST_COUNT: Symbol = symbol_short!("DREQ_CNT");
const COMMIT_DOMAIN: &[u8] = b"TASTE:AGG:v1";

/// Width of one plaintext slot in the oracle payload.
pub const PLAINTEXT_WORD: u32 = 32;

pub(crate) fn request_key(request_id: u64) -> (Symbol, u64) {
    (REQUEST, request_id)
}

pub fn request_count(env: &Env) -> u64 {
    env.storage().instance().get(&REQUEST_COUNT).unwrap_or(0)
}

pub fn load_request(env: &Env, request_id: u64) -> Result<DecryptionRequest, LedgerError> {
    let key = request_key(request_id);
    let request: DecryptionRequest = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(LedgerError::UnknownRequest)?;
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    Ok(request)
}

fn save_request(env: &Env, request: &DecryptionRequest) {
    let key = request_key(request.request_id);
    env.storage().persistent().set(&key, request);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// `sha256("TASTE:AGG:v1" ‖ (len ‖ bytes(slot))* ‖ context_tag)`
///
/// Each slot's canonical bytes are length-prefixed (u32, big-endian) so two
/// different vectors can never serialize to the same pre-image.
pub fn commitment<B: FheBackend>(
    env: &Env,
    backend: &B,
    vector: &AggregateVector,
    context_tag: &BytesN<32>,
) -> BytesN<32> {
    let mut buf = Bytes::from_slice(env, COMMIT_DOMAIN);
    for sum in vector.sums.iter() {
        let bytes = backend.to_canonical_bytes(&sum);
        buf.extend_from_array(&bytes.len().to_be_bytes());
        buf.append(&bytes);
    }
    let tag: Bytes = context_tag.clone().into();
    buf.append(&tag);
    env.crypto().sha256(&buf).into()
}

/// Aggregates a closed batch, commits to the result and hands the handles to
/// the oracle. Returns the oracle-assigned request id.
pub fn request<B: FheBackend, G: DecryptionGateway>(
    env: &Env,
    ctx: &AccessContext,
    backend: &B,
    gateway: &G,
    config: &LedgerConfig,
    batch_id: u32,
) -> Result<u64, LedgerError> {
    ctx.require_not_paused()?;
    ctx.require_provider()?;
    batch::load_closed(env, batch_id)?;
    cooldown::enforce(env, ActionKind::Decryption, &ctx.caller, config.cooldown_secs)?;

    let vector = aggregation::aggregate(env, backend, batch_id)?;
    let commitment = commitment(env, backend, &vector, &config.context_tag);

    let request_id = gateway.submit(&vector.sums);
    if env.storage().persistent().has(&request_key(request_id)) {
        log!(env, "oracle reissued request id", request_id);
        return Err(LedgerError::DuplicateRequestId);
    }

    let request = DecryptionRequest {
        request_id,
        batch_id,
        commitment: commitment.clone(),
        requester: ctx.caller.clone(),
        requested_at: env.ledger().timestamp(),
        processed: false,
        results: Vec::new(env),
        finalized_at: 0,
    };
    save_request(env, &request);
    env.storage()
        .instance()
        .set(&REQUEST_COUNT, &request_count(env).saturating_add(1));

    events::publish_decryption_requested(env, request_id, batch_id, commitment, ctx.caller.clone());
    Ok(request_id)
}

/// Validates and finalizes an oracle response.
///
/// Check order: existence, replay, state drift, oracle signatures, payload
/// shape. The replay check runs before any recomputation so a duplicate
/// delivery costs one storage read. Integrity rejections are logged with
/// their error code.
pub fn handle_callback<B: FheBackend, G: DecryptionGateway>(
    env: &Env,
    backend: &B,
    gateway: &G,
    context_tag: &BytesN<32>,
    request_id: u64,
    plaintexts: &Bytes,
    proof: &Bytes,
) -> Result<Vec<u64>, LedgerError> {
    finalize(env, backend, gateway, context_tag, request_id, plaintexts, proof).map_err(|e| {
        if e.class() == ErrorClass::SecurityViolation {
            log!(env, "decryption callback rejected", request_id, e as u32);
        }
        e
    })
}

fn finalize<B: FheBackend, G: DecryptionGateway>(
    env: &Env,
    backend: &B,
    gateway: &G,
    context_tag: &BytesN<32>,
    request_id: u64,
    plaintexts: &Bytes,
    proof: &Bytes,
) -> Result<Vec<u64>, LedgerError> {
    let mut request = load_request(env, request_id)?;
    if request.processed {
        return Err(LedgerError::ReplayAttempt);
    }

    let vector = aggregation::aggregate(env, backend, request.batch_id)?;
    if commitment(env, backend, &vector, context_tag) != request.commitment {
        return Err(LedgerError::StateMismatch);
    }

    if !gateway.check_signatures(request_id, plaintexts, proof) {
        return Err(LedgerError::InvalidSignatures);
    }

    let results = decode_plaintexts(env, plaintexts)?;

    request.processed = true;
    request.results = results.clone();
    request.finalized_at = env.ledger().timestamp();
    save_request(env, &request);

    events::publish_decryption_finalized(env, request_id, request.batch_id, results.clone());
    Ok(results)
}

/// Splits the oracle payload into one `u64` per category.
///
/// The payload is `CATEGORY_COUNT` big-endian 32-byte words; a word whose
/// value does not fit in 64 bits is rejected rather than truncated.
pub fn decode_plaintexts(env: &Env, plaintexts: &Bytes) -> Result<Vec<u64>, LedgerError> {
    if plaintexts.len() != CATEGORY_COUNT * PLAINTEXT_WORD {
        return Err(LedgerError::InvalidPlaintexts);
    }

    let mut out = Vec::new(env);
    for slot in 0..CATEGORY_COUNT {
        let start = slot * PLAINTEXT_WORD;
        let mut word = [0u8; PLAINTEXT_WORD as usize];
        plaintexts
            .slice(start..start + PLAINTEXT_WORD)
            .copy_into_slice(&mut word);

        let (high, low) = word.split_at(word.len() - 8);
        if high.iter().any(|b| *b != 0) {
            return Err(LedgerError::InvalidPlaintexts);
        }
        let mut value = [0u8; 8];
        value.copy_from_slice(low);
        out.push_back(u64::from_be_bytes(value));
    }
    Ok(out)
}
