//! # Tasting Ledger — Integration Tests
//!
//! Property-based tests over the full request/callback round-trip, invariant
//! checks, and state exploration under random action sequences.

extern crate std;

use proptest::prelude::*;
use soroban_sdk::Bytes;

use tasting_ledger::LedgerError;
use test_framework::generators::*;
use test_framework::invariants::*;
use test_framework::state_explorer::*;
use test_framework::*;

// ═════════════════════════════════════════════════════════════════════════════
//  Property-Based Tests
// ═════════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// **Property**: the aggregate of a closed batch decrypts to the
    /// per-category plaintext sums.
    #[test]
    fn prop_aggregate_matches_plaintext_sums(entries in tasting_entries(1, 8)) {
        let mut env = TestEnv::new();
        let harness = LedgerTestHarness::new(&mut env, 3);
        let batch_id = harness.fill_batch(&entries);

        prop_assert_eq!(harness.reveal_sums(batch_id), expected_sums(&entries));
    }

    /// **Property**: a genuine oracle answer finalizes with exactly the model
    /// sums, and a second delivery is always a replay.
    #[test]
    fn prop_round_trip_finalizes_once(entries in tasting_entries(1, 8)) {
        let mut env = TestEnv::new();
        let harness = LedgerTestHarness::new(&mut env, 2);
        let batch_id = harness.fill_batch(&entries);
        let request_id = harness.request(&harness.owner, batch_id);

        prop_assert_eq!(harness.deliver(request_id), expected_sums(&entries));

        let (plaintexts, proof) = harness.fulfill(request_id);
        let replay = harness.client.try_on_decryption_callback(&request_id, &plaintexts, &proof);
        prop_assert_eq!(replay, Err(Ok(LedgerError::ReplayAttempt)));
    }

    /// **Property**: re-aggregating an unchanged batch commits to the same value.
    #[test]
    fn prop_commitment_is_deterministic(entries in tasting_entries(1, 6)) {
        let mut env = TestEnv::new();
        let harness = LedgerTestHarness::new(&mut env, 1);
        let batch_id = harness.fill_batch(&entries);

        let first = harness.client.commitment_for(&batch_id);
        let second = harness.client.commitment_for(&batch_id);
        prop_assert_eq!(&first, &second);

        let request_id = harness.request(&harness.owner, batch_id);
        prop_assert_eq!(harness.client.get_request(&request_id).commitment, first);
    }

    /// **Property**: any executor drift between request and callback is
    /// rejected, and the request stays outstanding.
    #[test]
    fn prop_drift_rejects_callback(
        entries in tasting_entries(1, 6),
        epoch in 1u32..=u32::MAX,
    ) {
        let mut env = TestEnv::new();
        let harness = LedgerTestHarness::new(&mut env, 1);
        let batch_id = harness.fill_batch(&entries);
        let request_id = harness.request(&harness.owner, batch_id);
        let (plaintexts, proof) = harness.fulfill(request_id);

        harness.executor.set_epoch(&epoch);
        let result = harness.client.try_on_decryption_callback(&request_id, &plaintexts, &proof);

        prop_assert_eq!(result, Err(Ok(LedgerError::StateMismatch)));
        prop_assert!(!harness.client.get_request(&request_id).processed);
    }

    /// **Property**: a payload altered in transit never verifies against the
    /// oracle's original proof.
    #[test]
    fn prop_tampered_payload_rejected(
        entries in tasting_entries(1, 6),
        tamper in tamper_strategy(),
    ) {
        let mut env = TestEnv::new();
        let harness = LedgerTestHarness::new(&mut env, 1);
        let batch_id = harness.fill_batch(&entries);
        let request_id = harness.request(&harness.owner, batch_id);
        let (plaintexts, proof) = harness.fulfill(request_id);

        let forged = tamper_payload(&plaintexts, &tamper);
        let result = harness.client.try_on_decryption_callback(&request_id, &forged, &proof);
        prop_assert_eq!(result, Err(Ok(LedgerError::InvalidSignatures)));

        // Even with the oracle's signature, a malformed payload does not decode.
        let signed = harness.oracle.sign(&request_id, &forged);
        let result = harness.client.try_on_decryption_callback(&request_id, &forged, &signed);
        if keeps_shape(&tamper) {
            prop_assert!(result.is_ok());
        } else {
            prop_assert_eq!(result, Err(Ok(LedgerError::InvalidPlaintexts)));
        }
    }

    /// **Property**: a second submission inside the cooldown window is
    /// rejected; at or after the window it is accepted.
    #[test]
    fn prop_submission_cooldown(window in cooldown_strategy(), gap in duration_strategy()) {
        let mut env = TestEnv::new();
        let harness = LedgerTestHarness::new(&mut env, 1);
        harness.client.set_cooldown(&harness.owner, &window);
        harness.open_batch();
        let provider = harness.provider(0);

        harness.client.append_record(provider, &harness.record(0, 1));
        harness.env.advance_time(gap);
        let result = harness.client.try_append_record(provider, &harness.record(0, 2));

        if window > 0 && gap < window {
            prop_assert_eq!(result, Err(Ok(LedgerError::CooldownActive)));
        } else {
            prop_assert_eq!(result, Ok(Ok(1)));
        }
    }

    /// **Property**: batch ids handed out are exactly 1, 2, …, n.
    #[test]
    fn prop_batch_ids_strictly_increase(n in 1u32..=8, close_mask in any::<u8>()) {
        let mut env = TestEnv::new();
        let harness = LedgerTestHarness::new(&mut env, 0);

        for expected in 1..=n {
            prop_assert_eq!(harness.open_batch(), expected);
            if close_mask & (1 << (expected % 8)) != 0 {
                harness.close_batch(expected);
            }
        }
        prop_assert_eq!(harness.client.current_batch_id(), n);
    }

    /// **Property**: invariants and protocol expectations hold after
    /// arbitrary action sequences.
    #[test]
    fn prop_invariants_hold_under_random_actions(
        actions in ledger_action_sequence(3, 30),
    ) {
        let mut env = TestEnv::new();
        let harness = LedgerTestHarness::new(&mut env, 3);
        let mut explorer = StateExplorer::with_defaults(&harness);

        let result = explorer.explore(&actions);
        prop_assert!(result.passed(),
            "Invariant violations: {:?}", result.summary.invariant_violations);
    }

    /// **Property**: a session that starts with a full round on a
    /// multi-record batch finalizes it, and random actions afterwards keep
    /// every invariant.
    #[test]
    fn prop_sessions_finalize_multi_record_batches(
        actions in ledger_session(3, 30),
    ) {
        let mut env = TestEnv::new();
        let harness = LedgerTestHarness::new(&mut env, 3);
        let mut explorer = StateExplorer::with_defaults(&harness);

        let result = explorer.explore(&actions);
        prop_assert!(result.passed(),
            "Invariant violations: {:?}", result.summary.invariant_violations);

        let first = explorer.issued_requests()[0];
        let stored = harness.client.get_request(&first);
        prop_assert!(stored.processed);
        prop_assert_eq!(stored.batch_id, 1);
        prop_assert!(harness.client.get_batch(&1).record_count >= 3);
    }
}

// ═════════════════════════════════════════════════════════════════════════════
//  Invariant Tests
// ═════════════════════════════════════════════════════════════════════════════

#[test]
fn test_invariants_hold_on_fresh_ledger() {
    let mut env = TestEnv::new();
    let harness = LedgerTestHarness::new(&mut env, 2);

    let invariants = InvariantSet::ledger_defaults();
    assert_eq!(invariants.len(), 8);
    invariants.assert_all(&harness.snapshot(&[]));
}

#[test]
fn test_invariants_across_a_full_round() {
    let mut env = TestEnv::new();
    let harness = LedgerTestHarness::new(&mut env, 2);
    let invariants = InvariantSet::ledger_defaults();

    let before = harness.snapshot(&[]);
    let batch_id = harness.fill_batch(&[(0, 10), (1, 20), (0, 30)]);
    let request_id = harness.request(&harness.owner, batch_id);
    let mid = harness.snapshot(&[request_id]);
    invariants.assert_all(&mid);
    assert!(invariants.check_transition(&before, &mid).is_empty());

    assert_eq!(harness.deliver(request_id), std::vec![40, 20, 0, 0]);
    let after = harness.snapshot(&[request_id]);
    invariants.assert_all(&after);
    assert!(invariants.check_transition(&mid, &after).is_empty());
    assert_eq!(after.finalized().count(), 1);
}

#[test]
fn test_transition_check_catches_reopened_batch() {
    let mut env = TestEnv::new();
    let harness = LedgerTestHarness::new(&mut env, 1);
    let batch_id = harness.fill_batch(&[(2, 5)]);
    let before = harness.snapshot(&[]);

    let mut forged = before.clone();
    if let Some(batch) = forged.batches.iter_mut().find(|b| b.id == batch_id) {
        batch.closed = false;
        batch.closed_at = 0;
    }

    let violations = InvariantSet::ledger_defaults().check_transition(&before, &forged);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].0, "closed batches are frozen");
}

#[test]
fn test_snapshot_check_catches_result_without_finalization() {
    let mut env = TestEnv::new();
    let harness = LedgerTestHarness::new(&mut env, 1);
    let batch_id = harness.fill_batch(&[(1, 1)]);
    let request_id = harness.request(&harness.owner, batch_id);

    let mut forged = harness.snapshot(&[request_id]);
    forged.requests[0].results.push_back(1);

    let violations = InvariantSet::ledger_defaults().check_all(&forged);
    assert!(violations
        .iter()
        .any(|(name, _)| name == "results present iff processed"));
}

// ═════════════════════════════════════════════════════════════════════════════
//  State Exploration
// ═════════════════════════════════════════════════════════════════════════════

#[test]
fn test_scripted_exploration_covers_every_entry_point() {
    let mut env = TestEnv::new();
    let harness = LedgerTestHarness::new(&mut env, 2);
    let mut explorer = StateExplorer::with_defaults(&harness);

    let script = std::vec![
        LedgerAction::OpenBatch,
        LedgerAction::Append { provider_index: 0, category: 0, score: 10 },
        LedgerAction::Append { provider_index: 1, category: 1, score: 20 },
        LedgerAction::AdvanceTime { delta: 60 },
        LedgerAction::Append { provider_index: 0, category: 0, score: 30 },
        LedgerAction::CloseBatch { batch_id: 1 },
        LedgerAction::RequestDecryption { provider_index: 0, batch_id: 1 },
        LedgerAction::Pause,
        LedgerAction::DeliverResult { request_index: 0 },
        LedgerAction::ReplayResult { request_index: 0 },
        LedgerAction::Unpause,
    ];
    let result = explorer.explore(&script);

    assert!(result.passed(), "{:?}", result.summary.invariant_violations);
    assert_eq!(result.summary.actions_executed, script.len());
    for entry_point in LEDGER_ENTRY_POINTS {
        assert!(
            result.summary.entry_points_hit.contains(*entry_point),
            "entry point {} not exercised",
            entry_point
        );
    }

    let request_id = explorer.issued_requests()[0];
    let stored = harness.client.get_request(&request_id);
    assert!(stored.processed);
    let results: std::vec::Vec<u64> = stored.results.iter().collect();
    assert_eq!(results, std::vec![40, 20, 0, 0]);
}

#[test]
fn test_exploration_records_expected_errors_without_failing() {
    let mut env = TestEnv::new();
    let harness = LedgerTestHarness::new(&mut env, 1);
    let mut explorer = StateExplorer::new(
        &harness,
        InvariantSet::ledger_defaults(),
        ExplorerConfig {
            max_steps: 10,
            fail_fast: false,
            record_snapshots: true,
        },
    );

    let script = std::vec![
        LedgerAction::Append { provider_index: 0, category: 0, score: 1 },
        LedgerAction::CloseBatch { batch_id: 4 },
        LedgerAction::RequestDecryption { provider_index: 0, batch_id: 1 },
    ];
    let result = explorer.explore(&script);

    assert!(result.passed());
    assert_eq!(result.snapshots.len(), script.len() + 1);
    let codes: std::vec::Vec<u32> = result
        .action_log
        .iter()
        .filter_map(|(_, outcome)| match outcome {
            ActionOutcome::ExpectedError(code) => Some(*code),
            _ => None,
        })
        .collect();
    assert_eq!(
        codes,
        std::vec![
            LedgerError::BatchClosedOrInvalid as u32,
            LedgerError::InvalidBatch as u32,
            LedgerError::InvalidBatch as u32,
        ]
    );
}

#[test]
fn test_out_of_range_category_contributes_nothing() {
    let mut env = TestEnv::new();
    let harness = LedgerTestHarness::new(&mut env, 1);
    let batch_id = harness.fill_batch(&[(9, 50), (2, 7)]);

    assert_eq!(harness.reveal_sums(batch_id), std::vec![0, 0, 7, 0]);
    assert_eq!(expected_sums(&[(9, 50), (2, 7)]), std::vec![0, 0, 7, 0]);
}

#[test]
fn test_empty_proof_never_verifies() {
    let mut env = TestEnv::new();
    let harness = LedgerTestHarness::new(&mut env, 1);
    let batch_id = harness.fill_batch(&[(0, 1)]);
    let request_id = harness.request(&harness.owner, batch_id);
    let (plaintexts, _) = harness.fulfill(request_id);

    let result = harness.client.try_on_decryption_callback(
        &request_id,
        &plaintexts,
        &Bytes::new(&harness.env.env),
    );
    assert_eq!(result, Err(Ok(LedgerError::InvalidSignatures)));
}
