//! UTXO Pool Module
//!
//! This module implements the set of currently spendable outputs.
//! Keys are `(transaction hash, output index)` pairs; values are the outputs themselves.

use crate::{Output, Transaction, UtxoId};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("UTXO {0} not found in pool")]
    NotFound(UtxoId),
}

/// Aggregate view of a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PoolStats {
    pub utxo_count: usize,
    pub total_value: i128,
}

/// Pool of unspent transaction outputs
///
/// The pool owns its map outright, so `clone()` is the independent copy:
/// mutating a clone never shows through to the original, and vice versa.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtxoPool {
    /// Unspent outputs, indexed by the creating transaction's hash and output position
    utxos: HashMap<UtxoId, Output>,
}

impl UtxoPool {
    /// Creates a new empty pool
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &UtxoId) -> bool {
        self.utxos.contains_key(id)
    }

    /// Look up the output behind `id`
    ///
    /// # Returns
    /// * `Ok(&Output)` if the UTXO is in the pool
    /// * `Err(PoolError::NotFound)` otherwise; hot paths check [`UtxoPool::contains`] first
    pub fn get(&self, id: &UtxoId) -> Result<&Output, PoolError> {
        self.utxos.get(id).ok_or(PoolError::NotFound(*id))
    }

    /// Insert or overwrite the mapping for `id`
    pub fn add(&mut self, id: UtxoId, output: Output) {
        self.utxos.insert(id, output);
    }

    /// Delete the mapping for `id`. Absent ids are ignored.
    pub fn remove(&mut self, id: &UtxoId) {
        self.utxos.remove(id);
    }

    /// Snapshot of the current keys
    pub fn all_ids(&self) -> HashSet<UtxoId> {
        self.utxos.keys().copied().collect()
    }

    /// Add every output of a finalized transaction, e.g. a genesis coinbase.
    pub fn seed(&mut self, tx: &Transaction) {
        for (id, output) in tx.created_utxos() {
            self.add(id, *output);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UtxoId, &Output)> {
        self.utxos.iter()
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            utxo_count: self.utxos.len(),
            total_value: self.utxos.values().map(|output| output.value as i128).sum(),
        }
    }
}
