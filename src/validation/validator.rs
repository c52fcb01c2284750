use crate::{
    ConfirmationStatus, Transaction, TxReceipt, ValidationError,
    pool::UtxoPool,
    validation::{EcdsaVerifier, Verifier},
};
use ethers::types::Address;
use std::collections::HashSet;
use tracing::{debug, info};

/// Validates transactions against, and applies them to, its own UTXO pool.
///
/// The pool is copied in at construction; nothing the validator does is
/// visible through the caller's original pool.
pub struct Validator<V = EcdsaVerifier> {
    pool: UtxoPool,
    verifier: V,
}

impl Validator {
    /// Creates a validator over a copy of `pool`, checking ECDSA signatures
    pub fn new(pool: &UtxoPool) -> Self {
        Self::with_verifier(pool, EcdsaVerifier)
    }
}

impl<V: Verifier> Validator<V> {
    /// Creates a validator over a copy of `pool` with a custom signature scheme
    pub fn with_verifier(pool: &UtxoPool, verifier: V) -> Self {
        Self {
            pool: pool.clone(),
            verifier,
        }
    }

    /// The current pool, reflecting every batch processed so far
    pub fn pool(&self) -> &UtxoPool {
        &self.pool
    }

    pub fn into_pool(self) -> UtxoPool {
        self.pool
    }

    pub fn is_valid(&self, tx: &Transaction) -> bool {
        self.validate(tx).is_ok()
    }

    /// Validate a transaction against the current pool
    /// Returns Ok(()) if valid, Err(ValidationError) with the first failed check otherwise
    ///
    /// # Checks
    /// 1. At least one input
    /// 2. Every referenced UTXO is in the pool
    /// 3. Every input is signed by the owner of the output it spends
    /// 4. No UTXO is claimed twice
    /// 5. No output is negative
    /// 6. Inputs total at least the outputs total
    pub fn validate(&self, tx: &Transaction) -> Result<(), ValidationError> {
        if tx.num_inputs() == 0 {
            return Err(ValidationError::NoInputs);
        }

        let mut claimed = HashSet::with_capacity(tx.num_inputs());
        let mut input_sum: i128 = 0;

        for (index, input) in tx.inputs().iter().enumerate() {
            let id = input.utxo_id();
            if !self.pool.contains(&id) {
                return Err(ValidationError::MissingUtxo(id));
            }
            let spent = self
                .pool
                .get(&id)
                .map_err(|_| ValidationError::MissingUtxo(id))?;

            if !claimed.insert(id) {
                return Err(ValidationError::DuplicateInput(id));
            }

            self.verify_input(tx, index, &spent.recipient)?;
            input_sum += i128::from(spent.value);
        }

        let mut output_sum: i128 = 0;
        for (index, output) in tx.outputs().iter().enumerate() {
            if output.value < 0 {
                return Err(ValidationError::NegativeOutput {
                    output: index,
                    value: output.value,
                });
            }
            output_sum += i128::from(output.value);
        }

        if output_sum > input_sum {
            return Err(ValidationError::InsufficientInputValue {
                inputs: input_sum,
                outputs: output_sum,
            });
        }

        Ok(())
    }

    fn verify_input(
        &self,
        tx: &Transaction,
        index: usize,
        owner: &Address,
    ) -> Result<(), ValidationError> {
        let invalid = ValidationError::InvalidSignature { input: index };
        let signature = tx.input(index).and_then(|input| input.signature.as_ref());
        let message = tx.signable_bytes(index);

        match (signature, message) {
            (Some(signature), Some(message))
                if self.verifier.verify(owner, &message, signature) =>
            {
                Ok(())
            }
            _ => Err(invalid),
        }
    }

    /// Process one epoch of candidate transactions
    ///
    /// Candidates are considered strictly in the order given, each against the
    /// pool as updated by the ones accepted before it. Rejected candidates are
    /// dropped without touching the pool.
    ///
    /// # Returns
    /// The accepted transactions, in acceptance order
    pub fn process_batch(&mut self, candidates: &[Transaction]) -> Vec<Transaction> {
        let receipts = self.process_batch_with_receipts(candidates);
        candidates
            .iter()
            .zip(receipts)
            .filter(|(_, receipt)| receipt.is_accepted())
            .map(|(tx, _)| tx.clone())
            .collect()
    }

    /// Same selection as [`Validator::process_batch`], reporting every candidate
    ///
    /// # Returns
    /// One receipt per candidate, in encounter order
    pub fn process_batch_with_receipts(&mut self, candidates: &[Transaction]) -> Vec<TxReceipt> {
        let mut receipts = Vec::with_capacity(candidates.len());

        for tx in candidates {
            let status = match self.validate(tx) {
                Ok(()) => {
                    self.apply(tx);
                    ConfirmationStatus::Accepted
                }
                Err(reason) => {
                    debug!("Rejected transaction {:?}: {}", tx.hash(), reason);
                    ConfirmationStatus::Rejected { reason }
                }
            };
            receipts.push(TxReceipt {
                tx_hash: tx.hash(),
                status,
            });
        }

        let accepted = receipts.iter().filter(|receipt| receipt.is_accepted()).count();
        info!(
            "Processed batch: {} accepted, {} rejected, {} UTXOs in pool",
            accepted,
            receipts.len() - accepted,
            self.pool.len()
        );

        receipts
    }

    /// Spend the transaction's inputs and add its outputs
    fn apply(&mut self, tx: &Transaction) {
        for input in tx.inputs() {
            self.pool.remove(&input.utxo_id());
        }
        for (id, output) in tx.created_utxos() {
            self.pool.add(id, *output);
        }
        debug!(
            "Applied transaction {:?}: spent {}, created {}",
            tx.hash(),
            tx.num_inputs(),
            tx.num_outputs()
        );
    }
}
