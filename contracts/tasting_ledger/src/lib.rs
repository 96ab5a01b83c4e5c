//! # Sealed Tasting Ledger
//!
//! Providers append encrypted tasting notes into numbered batches. Once the
//! owner closes a batch, anyone can compute per-category encrypted score
//! sums over it, and a provider can ask an external oracle to decrypt those
//! sums. The oracle answers through [`TastingLedgerContract::on_decryption_callback`];
//! the answer is accepted only if the ledger still produces the exact
//! aggregate that was sent out, and only once per request.
//!
//! ## Collaborators
//! ```text
//!                  ┌──────────────┐  fhe_add / fhe_eq / …  ┌──────────────┐
//!  providers ────► │ tasting      │ ─────────────────────► │ FHE executor │
//!                  │ ledger       │                        └──────────────┘
//!                  │              │  submit_request        ┌──────────────┐
//!                  │              │ ─────────────────────► │ decryption   │
//!                  │              │ ◄───────────────────── │ oracle       │
//!                  └──────────────┘  on_decryption_callback└──────────────┘
//! ```
//!
//! ## Roles
//! | Role     | May                                                        |
//! |----------|------------------------------------------------------------|
//! | Owner    | open/close batches, manage providers, pause, reconfigure   |
//! | Provider | append records, request decryption (owner is one implicitly) |
//! | Anyone   | read views, compute aggregates                             |
#![no_std]

pub mod access;
pub mod aggregation;
pub mod batch;
pub mod config;
pub mod coordinator;
pub mod errors;
pub mod events;
pub mod fhe;
pub mod oracle;
pub mod types;

#[cfg(any(test, feature = "testutils"))]
pub mod testutils;


use soroban_sdk::{contract, contractimpl, Address, Bytes, BytesN, Env, Vec};

use access::AccessContext;
use config::LedgerConfig;
use fhe::ExecutorBackend;
use oracle::OracleGateway;

pub use config::MAX_RECORDS_PER_BATCH;
pub use errors::{ErrorClass, LedgerError};
pub use types::{
    AggregateVector, Batch, Ciphertext, DecryptionRequest, EncryptedBool, EncryptedRecord,
    StoredRecord, CATEGORY_COUNT,
};

#[contract]
pub struct TastingLedgerContract;

/// Authenticates `caller` and loads its access context.
fn authorize(env: &Env, caller: &Address) -> Result<AccessContext, LedgerError> {
    caller.require_auth();
    AccessContext::load(env, caller)
}

#[contractimpl]
impl TastingLedgerContract {
    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// One-time setup. `oracle` and `executor` are the collaborator contracts.
    pub fn initialize(
        env: Env,
        owner: Address,
        oracle: Address,
        executor: Address,
    ) -> Result<(), LedgerError> {
        if config::is_initialized(&env) {
            return Err(LedgerError::AlreadyInitialized);
        }
        owner.require_auth();

        let config = LedgerConfig::new(&env, oracle, executor);
        access::set_owner(&env, &owner);
        config::store(&env, &config);

        events::publish_initialized(&env, owner, &config);
        Ok(())
    }

    // ── Batch ledger ──────────────────────────────────────────────────────────

    pub fn open_batch(env: Env, caller: Address) -> Result<u32, LedgerError> {
        let ctx = authorize(&env, &caller)?;
        batch::open(&env, &ctx)
    }

    pub fn close_batch(env: Env, caller: Address, batch_id: u32) -> Result<(), LedgerError> {
        let ctx = authorize(&env, &caller)?;
        batch::close(&env, &ctx, batch_id)
    }

    /// Appends to the current open batch and returns the record's index.
    pub fn append_record(
        env: Env,
        caller: Address,
        record: EncryptedRecord,
    ) -> Result<u32, LedgerError> {
        let ctx = authorize(&env, &caller)?;
        let config = config::load(&env)?;
        let backend = ExecutorBackend::new(&env, &config.executor);
        batch::append(&env, &ctx, &backend, &config, record)
    }

    pub fn current_batch_id(env: Env) -> u32 {
        batch::current_id(&env)
    }

    pub fn get_batch(env: Env, batch_id: u32) -> Result<Batch, LedgerError> {
        batch::load(&env, batch_id)
    }

    pub fn get_record(env: Env, batch_id: u32, index: u32) -> Result<StoredRecord, LedgerError> {
        batch::get_record(&env, batch_id, index)
    }

    // ── Aggregation ───────────────────────────────────────────────────────────

    pub fn aggregate(env: Env, batch_id: u32) -> Result<AggregateVector, LedgerError> {
        let config = config::load(&env)?;
        let backend = ExecutorBackend::new(&env, &config.executor);
        aggregation::aggregate(&env, &backend, batch_id)
    }

    // ── Decryption ────────────────────────────────────────────────────────────

    /// Sends the aggregate of a closed batch to the oracle and returns the
    /// oracle-assigned request id.
    pub fn request_decryption(
        env: Env,
        caller: Address,
        batch_id: u32,
    ) -> Result<u64, LedgerError> {
        let ctx = authorize(&env, &caller)?;
        let config = config::load(&env)?;
        let backend = ExecutorBackend::new(&env, &config.executor);
        let gateway = OracleGateway::new(&env, &config.oracle);
        coordinator::request(&env, &ctx, &backend, &gateway, &config, batch_id)
    }

    /// Oracle entry point. Not gated by pause or caller identity; the oracle's
    /// own signature check authenticates the payload.
    pub fn on_decryption_callback(
        env: Env,
        request_id: u64,
        plaintexts: Bytes,
        proof: Bytes,
    ) -> Result<Vec<u64>, LedgerError> {
        let config = config::load(&env)?;
        let backend = ExecutorBackend::new(&env, &config.executor);
        let gateway = OracleGateway::new(&env, &config.oracle);
        coordinator::handle_callback(
            &env,
            &backend,
            &gateway,
            &config.context_tag,
            request_id,
            &plaintexts,
            &proof,
        )
    }

    pub fn get_request(env: Env, request_id: u64) -> Result<DecryptionRequest, LedgerError> {
        coordinator::load_request(&env, request_id)
    }

    pub fn request_count(env: Env) -> u64 {
        coordinator::request_count(&env)
    }

    /// Commitment the closed batch would produce right now. Relayers compare
    /// it with a stored request before paying for a callback.
    pub fn commitment_for(env: Env, batch_id: u32) -> Result<BytesN<32>, LedgerError> {
        let config = config::load(&env)?;
        let backend = ExecutorBackend::new(&env, &config.executor);
        let vector = aggregation::aggregate(&env, &backend, batch_id)?;
        Ok(coordinator::commitment(
            &env,
            &backend,
            &vector,
            &config.context_tag,
        ))
    }

    // ── Administration ────────────────────────────────────────────────────────

    pub fn add_provider(env: Env, caller: Address, provider: Address) -> Result<(), LedgerError> {
        let ctx = authorize(&env, &caller)?;
        ctx.require_owner()?;
        access::add_provider(&env, &provider)?;
        events::publish_provider_added(&env, provider);
        Ok(())
    }

    pub fn remove_provider(
        env: Env,
        caller: Address,
        provider: Address,
    ) -> Result<(), LedgerError> {
        let ctx = authorize(&env, &caller)?;
        ctx.require_owner()?;
        if provider == ctx.owner {
            return Err(LedgerError::InvalidInput);
        }
        access::remove_provider(&env, &provider)?;
        events::publish_provider_removed(&env, provider);
        Ok(())
    }

    pub fn transfer_ownership(
        env: Env,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), LedgerError> {
        let ctx = authorize(&env, &caller)?;
        ctx.require_owner()?;
        new_owner.require_auth();
        access::set_owner(&env, &new_owner);
        events::publish_ownership_transferred(&env, ctx.owner, new_owner);
        Ok(())
    }

    pub fn pause(env: Env, caller: Address) -> Result<(), LedgerError> {
        let ctx = authorize(&env, &caller)?;
        ctx.require_owner()?;
        common::set_paused(&env, true, &caller);
        events::publish_paused(&env, caller, true);
        Ok(())
    }

    pub fn unpause(env: Env, caller: Address) -> Result<(), LedgerError> {
        let ctx = authorize(&env, &caller)?;
        ctx.require_owner()?;
        common::set_paused(&env, false, &caller);
        events::publish_paused(&env, caller, false);
        Ok(())
    }

    /// Window applies to submissions and decryption requests alike; 0 disables it.
    pub fn set_cooldown(env: Env, caller: Address, seconds: u64) -> Result<(), LedgerError> {
        Self::update_config(&env, &caller, |config| {
            config.cooldown_secs = seconds;
            Ok(())
        })
    }

    /// Caps how many records a batch accepts, between 1 and
    /// [`MAX_RECORDS_PER_BATCH`]. Batches already holding more keep
    /// their records.
    pub fn set_max_records(env: Env, caller: Address, max: u32) -> Result<(), LedgerError> {
        Self::update_config(&env, &caller, |config| {
            if max == 0 || max > MAX_RECORDS_PER_BATCH {
                return Err(LedgerError::InvalidInput);
            }
            config.max_records_per_batch = max;
            Ok(())
        })
    }

    pub fn set_oracle(env: Env, caller: Address, oracle: Address) -> Result<(), LedgerError> {
        Self::update_config(&env, &caller, |config| {
            config.oracle = oracle;
            Ok(())
        })
    }

    /// Outstanding requests will fail with `StateMismatch` once the executor
    /// changes, since their aggregates can no longer be reproduced.
    pub fn set_executor(env: Env, caller: Address, executor: Address) -> Result<(), LedgerError> {
        Self::update_config(&env, &caller, |config| {
            config.executor = executor;
            Ok(())
        })
    }

    pub fn get_owner(env: Env) -> Result<Address, LedgerError> {
        access::get_owner(&env)
    }

    pub fn is_provider(env: Env, addr: Address) -> bool {
        match access::get_owner(&env) {
            Ok(owner) if owner == addr => true,
            _ => access::is_registered_provider(&env, &addr),
        }
    }

    pub fn is_paused(env: Env) -> bool {
        common::is_paused(&env)
    }

    pub fn get_config(env: Env) -> Result<LedgerConfig, LedgerError> {
        config::load(&env)
    }
}

impl TastingLedgerContract {
    fn update_config<F: FnOnce(&mut LedgerConfig) -> Result<(), LedgerError>>(
        env: &Env,
        caller: &Address,
        apply: F,
    ) -> Result<(), LedgerError> {
        let ctx = authorize(env, caller)?;
        ctx.require_owner()?;
        let mut config = config::load(env)?;
        apply(&mut config)?;
        config::store(env, &config);
        events::publish_config_updated(env, config);
        Ok(())
    }
}
