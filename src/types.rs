use ethers::types::{Address, Signature, H256};
use ethers::utils::keccak256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Value in the smallest denomination.
///
/// Signed so that a negative output can be represented (and rejected);
/// sums are always taken in `i128`.
pub type Amount = i64;

/// Key of an unspent output: the hash of the transaction that created it
/// and the position of the output inside that transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtxoId {
    pub tx_hash: H256,
    pub index: u32,
}

impl UtxoId {
    pub fn new(tx_hash: H256, index: u32) -> Self {
        Self { tx_hash, index }
    }
}

impl std::fmt::Display for UtxoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}:{}", self.tx_hash, self.index)
    }
}

/// A spendable amount locked to a recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub value: Amount,
    pub recipient: Address,
}

impl Output {
    pub fn new(value: Amount, recipient: Address) -> Self {
        Self { value, recipient }
    }
}

/// A claim on a previous output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    pub prev_tx_hash: H256,
    pub output_index: u32,
    /// `None` until the owner of the referenced output signs this slot.
    pub signature: Option<Signature>,
}

impl Input {
    pub fn new(prev_tx_hash: H256, output_index: u32) -> Self {
        Self {
            prev_tx_hash,
            output_index,
            signature: None,
        }
    }

    /// The pool key this input spends
    pub fn utxo_id(&self) -> UtxoId {
        UtxoId::new(self.prev_tx_hash, self.output_index)
    }
}

/// A transfer of value from a set of unspent outputs to a list of new outputs.
///
/// Built incrementally: add inputs and outputs, sign each input slot over
/// [`Transaction::signable_bytes`], then [`Transaction::finalize`] to fix the hash.
/// Outputs created by the transaction are addressed as `(hash, position)`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transaction {
    hash: H256,
    inputs: Vec<Input>,
    outputs: Vec<Output>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Input-less transaction minting `value` to `recipient`.
    ///
    /// Only useful for seeding a genesis pool; the validator always rejects it.
    pub fn coinbase(value: Amount, recipient: Address) -> Self {
        let mut tx = Self::new();
        tx.add_output(value, recipient);
        tx.finalize();
        tx
    }

    pub fn add_input(&mut self, prev_tx_hash: H256, output_index: u32) {
        self.inputs.push(Input::new(prev_tx_hash, output_index));
    }

    pub fn add_output(&mut self, value: Amount, recipient: Address) {
        self.outputs.push(Output::new(value, recipient));
    }

    /// Remove the input at `index`, returning it if it existed.
    pub fn remove_input(&mut self, index: usize) -> Option<Input> {
        (index < self.inputs.len()).then(|| self.inputs.remove(index))
    }

    /// Remove the first input spending `utxo`, returning it if it existed.
    pub fn remove_input_by_utxo(&mut self, utxo: &UtxoId) -> Option<Input> {
        let position = self.inputs.iter().position(|input| input.utxo_id() == *utxo)?;
        Some(self.inputs.remove(position))
    }

    /// Attach `signature` to input slot `index`. Returns `false` if the slot doesn't exist.
    pub fn add_signature(&mut self, signature: Signature, index: usize) -> bool {
        match self.inputs.get_mut(index) {
            Some(input) => {
                input.signature = Some(signature);
                true
            }
            None => false,
        }
    }

    /// Canonical message the owner of input `index` signs.
    ///
    /// Layout: the input's previous hash (32 bytes) and output index (4 bytes, BE),
    /// then every output as value (8 bytes, BE) and recipient (20 bytes).
    /// Binding the input position keeps one signature from authorizing another slot.
    pub fn signable_bytes(&self, index: usize) -> Option<Vec<u8>> {
        let input = self.inputs.get(index)?;
        let mut data = Vec::with_capacity(36 + self.outputs.len() * 28);
        data.extend_from_slice(input.prev_tx_hash.as_bytes());
        data.extend_from_slice(&input.output_index.to_be_bytes());
        for output in &self.outputs {
            data.extend_from_slice(&output.value.to_be_bytes());
            data.extend_from_slice(output.recipient.as_bytes());
        }
        Some(data)
    }

    /// Keccak-256 of [`Transaction::signable_bytes`], the digest actually signed.
    pub fn signing_hash(&self, index: usize) -> Option<H256> {
        self.signable_bytes(index).map(|data| H256::from(keccak256(data)))
    }

    /// Full serialization of the transaction, signatures included.
    pub fn raw_bytes(&self) -> Vec<u8> {
        let mut data = Vec::new();
        for input in &self.inputs {
            data.extend_from_slice(input.prev_tx_hash.as_bytes());
            data.extend_from_slice(&input.output_index.to_be_bytes());
            if let Some(signature) = &input.signature {
                data.extend_from_slice(&signature.to_vec());
            }
        }
        for output in &self.outputs {
            data.extend_from_slice(&output.value.to_be_bytes());
            data.extend_from_slice(output.recipient.as_bytes());
        }
        data
    }

    /// Fix the transaction's identity. Call once every signature is attached.
    pub fn finalize(&mut self) {
        self.hash = self.compute_hash();
    }

    pub fn compute_hash(&self) -> H256 {
        H256::from(keccak256(self.raw_bytes()))
    }

    /// Zero until [`Transaction::finalize`] is called.
    pub fn hash(&self) -> H256 {
        self.hash
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub fn input(&self, index: usize) -> Option<&Input> {
        self.inputs.get(index)
    }

    pub fn output(&self, index: usize) -> Option<&Output> {
        self.outputs.get(index)
    }

    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Pool keys of the outputs this transaction creates, paired with the outputs.
    pub fn created_utxos(&self) -> impl Iterator<Item = (UtxoId, &Output)> + '_ {
        self.outputs
            .iter()
            .enumerate()
            .map(|(index, output)| (UtxoId::new(self.hash, index as u32), output))
    }
}

/// Reasons a transaction is rejected against the current pool
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("transaction has no inputs")]
    NoInputs,
    #[error("input references unknown or spent output {0}")]
    MissingUtxo(UtxoId),
    #[error("signature on input {input} does not match the output owner")]
    InvalidSignature { input: usize },
    #[error("output {0} is claimed more than once")]
    DuplicateInput(UtxoId),
    #[error("output {output} has negative value {value}")]
    NegativeOutput { output: usize, value: Amount },
    #[error("outputs total {outputs} exceeds inputs total {inputs}")]
    InsufficientInputValue { inputs: i128, outputs: i128 },
}

/// Outcome for a single candidate in a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmationStatus {
    Accepted,
    Rejected { reason: ValidationError },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: H256,
    pub status: ConfirmationStatus,
}

impl TxReceipt {
    pub fn is_accepted(&self) -> bool {
        matches!(self.status, ConfirmationStatus::Accepted)
    }
}
