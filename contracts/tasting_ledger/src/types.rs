use soroban_sdk::{contracttype, Address, BytesN, Vec};

/// Number of wine categories, and therefore the length of every
/// [`AggregateVector`].
pub const CATEGORY_COUNT: u32 = 4;

/// Opaque reference to an encrypted integer held by the FHE executor.
///
/// The handle is only ever passed back to the executor; nothing in this
/// contract interprets its bytes.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ciphertext(pub BytesN<32>);

/// Opaque reference to an encrypted boolean produced by a comparison.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EncryptedBool(pub BytesN<32>);

/// One tasting note, every attribute encrypted client-side.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EncryptedRecord {
    /// Wine category in `0..CATEGORY_COUNT`.
    pub category: Ciphertext,
    pub score: Ciphertext,
    pub vintage: Ciphertext,
    pub region: Ciphertext,
}

/// An appended record plus who submitted it and when.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StoredRecord {
    pub record: EncryptedRecord,
    pub provider: Address,
    pub submitted_at: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Batch {
    pub id: u32,
    pub closed: bool,
    pub record_count: u32,
    pub opened_at: u64,
    /// Zero while the batch is open.
    pub closed_at: u64,
}

/// Per-category encrypted score sums for one closed batch.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AggregateVector {
    pub batch_id: u32,
    pub record_count: u32,
    /// Exactly [`CATEGORY_COUNT`] entries; slot `k` sums scores of category `k`.
    pub sums: Vec<Ciphertext>,
}

/// Stored context of one decryption round-trip. Never deleted.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecryptionRequest {
    pub request_id: u64,
    pub batch_id: u32,
    pub commitment: BytesN<32>,
    pub requester: Address,
    pub requested_at: u64,
    pub processed: bool,
    /// Decoded per-category sums; empty until finalized.
    pub results: Vec<u64>,
    pub finalized_at: u64,
}
