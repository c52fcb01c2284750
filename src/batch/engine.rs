//! Epoch Engine Module
//!
//! This module runs successive batches through a validator.
//! Each epoch is assigned a unique sequential number and timestamp.

use crate::{
    Transaction, TxReceipt,
    pool::UtxoPool,
    validation::{EcdsaVerifier, Validator, Verifier},
};
use serde::Serialize;
use tracing::info;

/// Result of one epoch
#[derive(Debug, Clone, Serialize)]
pub struct EpochReceipt {
    pub epoch: u64,
    /// Accepted transactions, in acceptance order
    pub accepted: Vec<Transaction>,
    /// One receipt per candidate, in encounter order
    pub receipts: Vec<TxReceipt>,
    pub timestamp: u64,
}

impl EpochReceipt {
    pub fn rejected_count(&self) -> usize {
        self.receipts.len() - self.accepted.len()
    }
}

/// Epoch engine
///
/// Owns the authoritative validator and a sequential epoch counter.
pub struct EpochEngine<V = EcdsaVerifier> {
    validator: Validator<V>,
    /// Next epoch number to assign (starts at 1, increments for each epoch)
    next_epoch: u64,
}

impl EpochEngine {
    /// Creates a new engine over a copy of `pool`
    pub fn new(pool: &UtxoPool) -> Self {
        Self::with_validator(Validator::new(pool))
    }
}

impl<V: Verifier> EpochEngine<V> {
    pub fn with_validator(validator: Validator<V>) -> Self {
        Self {
            validator,
            next_epoch: 1, // Epochs start from 1
        }
    }

    /// Run one batch of candidates and seal it as the next epoch
    ///
    /// # Arguments
    /// * `candidates` - Proposed transactions, in the order they are to be considered
    pub fn run_epoch(&mut self, candidates: &[Transaction]) -> EpochReceipt {
        let receipts = self.validator.process_batch_with_receipts(candidates);
        let accepted = candidates
            .iter()
            .zip(&receipts)
            .filter(|(_, receipt)| receipt.is_accepted())
            .map(|(tx, _)| tx.clone())
            .collect();

        let receipt = EpochReceipt {
            epoch: self.next_epoch,
            accepted,
            receipts,
            timestamp: chrono::Utc::now().timestamp() as u64,
        };
        info!(
            "Epoch #{} sealed: {} of {} candidates accepted",
            receipt.epoch,
            receipt.accepted.len(),
            candidates.len()
        );

        // Increment for next epoch
        self.next_epoch += 1;
        receipt
    }

    /// Number the next call to [`EpochEngine::run_epoch`] will be assigned
    pub fn next_epoch(&self) -> u64 {
        self.next_epoch
    }

    pub fn pool(&self) -> &UtxoPool {
        self.validator.pool()
    }

    pub fn into_pool(self) -> UtxoPool {
        self.validator.into_pool()
    }
}
