use common::CommonError;
use soroban_sdk::contracterror;

/// Errors surfaced by the tasting ledger.
///
/// Codes below 100 mirror [`CommonError`] so clients can decode either enum
/// with the same table.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum LedgerError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    NotAuthorized = 10,
    RecordNotFound = 21,
    InvalidInput = 30,
    Paused = 40,
    CooldownActive = 41,

    // ── Batch ledger (100–109) ───────────────────────────────
    /// Batch id is zero, unknown, or in the wrong state for the operation.
    InvalidBatch = 100,
    /// No batch has been opened, or the current batch is already closed.
    BatchClosedOrInvalid = 101,
    /// Aggregation was attempted on a batch holding zero records.
    EmptyBatch = 102,
    /// A supplied handle is not bound to an encrypted value.
    UninitializedCiphertext = 103,
    /// The current batch already holds `max_records_per_batch` records.
    BatchFull = 104,

    // ── Decryption coordinator (110–119) ─────────────────────
    UnknownRequest = 110,
    ReplayAttempt = 111,
    /// Recomputed commitment differs from the one stored at request time.
    StateMismatch = 112,
    /// The oracle rejected the plaintext/proof pair.
    InvalidSignatures = 113,
    /// Plaintext payload does not decode into one word per category.
    InvalidPlaintexts = 114,
    /// The oracle handed out a request id that already has a stored context.
    DuplicateRequestId = 115,

    // ── Administration (120–129) ─────────────────────────────
    ProviderExists = 120,
    ProviderNotFound = 121,
}

/// How a caller should react to a failure.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    /// Transient; the same call may succeed later (pause, cooldown).
    RetryLater,
    /// The call itself is wrong and will keep failing.
    CallerError,
    /// Integrity violation on the callback path; never retried.
    SecurityViolation,
}

impl LedgerError {
    pub fn class(&self) -> ErrorClass {
        match self {
            LedgerError::Paused | LedgerError::CooldownActive => ErrorClass::RetryLater,
            LedgerError::UnknownRequest
            | LedgerError::ReplayAttempt
            | LedgerError::StateMismatch
            | LedgerError::InvalidSignatures
            | LedgerError::DuplicateRequestId => ErrorClass::SecurityViolation,
            _ => ErrorClass::CallerError,
        }
    }
}

impl From<CommonError> for LedgerError {
    fn from(e: CommonError) -> Self {
        match e {
            CommonError::NotInitialized => LedgerError::NotInitialized,
            CommonError::AlreadyInitialized => LedgerError::AlreadyInitialized,
            CommonError::NotAuthorized => LedgerError::NotAuthorized,
            CommonError::Paused => LedgerError::Paused,
            CommonError::CooldownActive => LedgerError::CooldownActive,
        }
    }
}
