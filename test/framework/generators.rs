//! # Property-Based Test Generators
//!
//! `proptest` strategies for tasting records, ledger configuration and
//! action sequences. Values are semantic (categories, scores, delays) so the
//! generated cases drive real contract paths.

extern crate std;

use proptest::prelude::*;
use soroban_sdk::Bytes;
use std::vec::Vec;

use tasting_ledger::{CATEGORY_COUNT, MAX_RECORDS_PER_BATCH};

const WORD: u32 = 32;

// ── Scalar Generators ────────────────────────────────────────────────────────

/// Wine category, mostly valid. About one in ten falls outside the category
/// range, which must contribute to no slot.
pub fn category_strategy() -> impl Strategy<Value = u64> {
    prop_oneof![
        9 => 0u64..u64::from(CATEGORY_COUNT),
        1 => u64::from(CATEGORY_COUNT)..=16u64,
    ]
}

/// Tasting score on a 0–100 scale, with both ends weighted up.
pub fn score_strategy() -> impl Strategy<Value = u64> {
    prop_oneof![
        1 => Just(0u64),
        1 => Just(100u64),
        8 => 0u64..=100u64,
    ]
}

/// `(category, score)` pairs for one batch.
pub fn tasting_entries(min: usize, max: usize) -> impl Strategy<Value = Vec<(u64, u64)>> {
    prop::collection::vec((category_strategy(), score_strategy()), min..=max)
}

/// Cooldown windows in seconds, including the disabled case.
pub fn cooldown_strategy() -> impl Strategy<Value = u64> {
    prop_oneof![
        1 => Just(0u64),
        3 => 1u64..=60u64,
        1 => Just(60u64),
        2 => 61u64..=3_600u64,
    ]
}

/// Time advances between actions.
pub fn duration_strategy() -> impl Strategy<Value = u64> {
    prop_oneof![
        1 => Just(0u64),
        1 => Just(1u64),
        3 => 1u64..=60u64,
        2 => 60u64..=3_600u64,
        1 => Just(86_400u64),
    ]
}

// ── Action Generators ────────────────────────────────────────────────────────

/// Every externally reachable ledger action, for state exploration.
///
/// Indices pick from pools (providers, issued requests) modulo their size.
#[derive(Debug, Clone)]
pub enum LedgerAction {
    OpenBatch,
    CloseBatch { batch_id: u32 },
    Append { provider_index: usize, category: u64, score: u64 },
    RequestDecryption { provider_index: usize, batch_id: u32 },
    /// Oracle delivers the genuine result for an outstanding request.
    DeliverResult { request_index: usize },
    /// Oracle delivers again for an already finalized request.
    ReplayResult { request_index: usize },
    AdvanceTime { delta: u64 },
    Pause,
    Unpause,
}

/// Weighted so batches fill up and get requested, with admin actions rare.
pub fn ledger_action_strategy(num_providers: usize) -> impl Strategy<Value = LedgerAction> {
    let provider = 0..num_providers.max(1);
    let batch = 0u32..=6u32;

    prop_oneof![
        8 => Just(LedgerAction::OpenBatch),
        6 => batch.clone().prop_map(|b| LedgerAction::CloseBatch { batch_id: b }),
        25 => (provider.clone(), category_strategy(), score_strategy()).prop_map(|(p, c, s)| {
            LedgerAction::Append { provider_index: p, category: c, score: s }
        }),
        10 => (provider, batch).prop_map(|(p, b)| LedgerAction::RequestDecryption {
            provider_index: p,
            batch_id: b,
        }),
        10 => (0usize..8).prop_map(|r| LedgerAction::DeliverResult { request_index: r }),
        4 => (0usize..8).prop_map(|r| LedgerAction::ReplayResult { request_index: r }),
        20 => duration_strategy().prop_map(|d| LedgerAction::AdvanceTime { delta: d }),
        2 => Just(LedgerAction::Pause),
        2 => Just(LedgerAction::Unpause),
    ]
}

pub fn ledger_action_sequence(
    num_providers: usize,
    max_len: usize,
) -> impl Strategy<Value = Vec<LedgerAction>> {
    prop::collection::vec(ledger_action_strategy(num_providers), 1..=max_len)
}

/// A complete round on batch 1 of a fresh ledger: open, fill with 3 up to
/// `MAX_RECORDS_PER_BATCH` records, try one append past a full batch, close,
/// request, deliver and replay. Clock advances keep every append clear of
/// the default cooldown.
pub fn batch_round_prefix(num_providers: usize) -> impl Strategy<Value = Vec<LedgerAction>> {
    let provider = 0..num_providers.max(1);
    (
        prop::collection::vec(
            (category_strategy(), score_strategy()),
            3..=MAX_RECORDS_PER_BATCH as usize,
        ),
        provider,
    )
        .prop_map(|(entries, requester)| {
            let mut actions = std::vec![LedgerAction::OpenBatch];
            for (i, (category, score)) in entries.iter().enumerate() {
                actions.push(LedgerAction::Append {
                    provider_index: i,
                    category: *category,
                    score: *score,
                });
                actions.push(LedgerAction::AdvanceTime { delta: 60 });
            }
            if entries.len() == MAX_RECORDS_PER_BATCH as usize {
                actions.push(LedgerAction::Append {
                    provider_index: 0,
                    category: 0,
                    score: 1,
                });
            }
            actions.extend([
                LedgerAction::CloseBatch { batch_id: 1 },
                LedgerAction::RequestDecryption {
                    provider_index: requester,
                    batch_id: 1,
                },
                LedgerAction::DeliverResult { request_index: 0 },
                LedgerAction::ReplayResult { request_index: 0 },
            ]);
            actions
        })
}

/// [`batch_round_prefix`] followed by up to `max_tail` random actions.
pub fn ledger_session(
    num_providers: usize,
    max_tail: usize,
) -> impl Strategy<Value = Vec<LedgerAction>> {
    (
        batch_round_prefix(num_providers),
        ledger_action_sequence(num_providers, max_tail),
    )
        .prop_map(|(mut prefix, tail)| {
            prefix.extend(tail);
            prefix
        })
}

// ── Payload Tampering ────────────────────────────────────────────────────────

/// Ways a relayer could alter an oracle payload in transit.
#[derive(Debug, Clone)]
pub enum PayloadTamper {
    /// Bump the low byte of one slot.
    BumpSlot { slot: u32 },
    /// Set a high-order byte so the slot no longer fits in 64 bits.
    WidenSlot { slot: u32 },
    /// Drop the trailing byte.
    Truncate,
    /// Append an extra slot.
    Extend,
}

pub fn tamper_strategy() -> impl Strategy<Value = PayloadTamper> {
    let slot = 0u32..CATEGORY_COUNT;
    prop_oneof![
        3 => slot.clone().prop_map(|s| PayloadTamper::BumpSlot { slot: s }),
        2 => slot.prop_map(|s| PayloadTamper::WidenSlot { slot: s }),
        1 => Just(PayloadTamper::Truncate),
        1 => Just(PayloadTamper::Extend),
    ]
}

/// Applies `tamper` to a well-formed payload. The result always differs
/// from the input.
pub fn tamper_payload(payload: &Bytes, tamper: &PayloadTamper) -> Bytes {
    let mut out = payload.clone();
    match tamper {
        PayloadTamper::BumpSlot { slot } => {
            let at = slot * WORD + WORD - 1;
            let byte = out.get(at).unwrap_or(0);
            out.set(at, byte.wrapping_add(1));
        }
        PayloadTamper::WidenSlot { slot } => {
            out.set(slot * WORD, 0x01);
        }
        PayloadTamper::Truncate => {
            out = payload.slice(0..payload.len() - 1);
        }
        PayloadTamper::Extend => {
            out.extend_from_array(&[0u8; WORD as usize]);
        }
    }
    out
}

/// Whether a tampered payload still has the shape the ledger decodes.
pub fn keeps_shape(tamper: &PayloadTamper) -> bool {
    matches!(tamper, PayloadTamper::BumpSlot { .. })
}
