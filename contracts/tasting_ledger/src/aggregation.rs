use soroban_sdk::{Env, Vec};

use crate::batch;
use crate::errors::LedgerError;
use crate::fhe::FheBackend;
use crate::types::{AggregateVector, Ciphertext, CATEGORY_COUNT};

const SLOTS: usize = CATEGORY_COUNT as usize;

/// Per-category encrypted score sums over a closed batch.
///
/// For every record and every slot `k` this computes
/// `sum_k += score * cast(category == k)`, so the category is never branched
/// on in the clear. The pass visits every record for every slot without an
/// early exit. The executor derives handles from operation inputs, so the
/// same closed batch always yields the same vector; the decryption
/// coordinator relies on that to detect drift.
pub fn aggregate<B: FheBackend>(
    env: &Env,
    backend: &B,
    batch_id: u32,
) -> Result<AggregateVector, LedgerError> {
    let batch = batch::load_closed(env, batch_id)?;
    if batch.record_count == 0 {
        return Err(LedgerError::EmptyBatch);
    }

    let categories: [Ciphertext; SLOTS] =
        core::array::from_fn(|k| backend.as_constant(k as u64));
    let zero = backend.as_constant(0);
    let mut sums: [Ciphertext; SLOTS] = core::array::from_fn(|_| zero.clone());

    for index in 0..batch.record_count {
        let record = batch::get_record(env, batch_id, index)?.record;
        for (sum, category) in sums.iter_mut().zip(categories.iter()) {
            let matches = backend.equals(&record.category, category);
            let indicator = backend.cast(&matches);
            let contribution = backend.mul(&record.score, &indicator);
            *sum = backend.add(sum, &contribution);
        }
    }

    let mut out = Vec::new(env);
    for sum in sums {
        out.push_back(sum);
    }
    Ok(AggregateVector {
        batch_id,
        record_count: batch.record_count,
        sums: out,
    })
}
