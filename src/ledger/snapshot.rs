//! JSON encodings for pool snapshots and transaction batches.

use crate::{Amount, Output, Transaction, UtxoId, pool::UtxoPool};
use ethers::types::{Address, H256};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed input: {0}")]
    MalformedInput(String),
}

impl From<serde_json::Error> for LoadError {
    fn from(error: serde_json::Error) -> Self {
        LoadError::MalformedInput(error.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub tx_hash: H256,
    pub index: u32,
    pub recipient: Address,
    pub value: Amount,
}

/// Serialized form of a [`UtxoPool`]
///
/// # Example JSON
/// ```json
/// {"utxos": [{"tx_hash": "0x…", "index": 0, "recipient": "0x…", "value": 10}]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub utxos: Vec<SnapshotEntry>,
}

impl PoolSnapshot {
    /// Entries are sorted by UTXO id so equal pools encode identically
    pub fn from_pool(pool: &UtxoPool) -> Self {
        let mut entries: Vec<_> = pool.iter().collect();
        entries.sort_by_key(|(id, _)| **id);

        let utxos = entries
            .into_iter()
            .map(|(id, output)| SnapshotEntry {
                tx_hash: id.tx_hash,
                index: id.index,
                recipient: output.recipient,
                value: output.value,
            })
            .collect();
        Self { utxos }
    }

    /// Rebuild the pool, refusing snapshots that list a UTXO twice
    pub fn into_pool(self) -> Result<UtxoPool, LoadError> {
        let mut pool = UtxoPool::new();
        for entry in self.utxos {
            let id = UtxoId::new(entry.tx_hash, entry.index);
            if pool.contains(&id) {
                return Err(LoadError::MalformedInput(format!(
                    "UTXO {id} listed more than once"
                )));
            }
            pool.add(id, Output::new(entry.value, entry.recipient));
        }
        Ok(pool)
    }
}

pub fn parse_pool(json: &str) -> Result<UtxoPool, LoadError> {
    serde_json::from_str::<PoolSnapshot>(json)?.into_pool()
}

pub fn load_pool(path: impl AsRef<Path>) -> Result<UtxoPool, LoadError> {
    let path = path.as_ref();
    let pool = parse_pool(&fs::read_to_string(path)?)?;
    info!("Loaded {} UTXOs from {}", pool.len(), path.display());
    Ok(pool)
}

pub fn save_pool(path: impl AsRef<Path>, pool: &UtxoPool) -> Result<(), LoadError> {
    let json = serde_json::to_string_pretty(&PoolSnapshot::from_pool(pool))?;
    fs::write(path, json)?;
    Ok(())
}

/// Parse a list of batches, each a list of finalized transactions.
///
/// A transaction whose recorded hash doesn't match its contents is malformed.
pub fn parse_batches(json: &str) -> Result<Vec<Vec<Transaction>>, LoadError> {
    let batches: Vec<Vec<Transaction>> = serde_json::from_str(json)?;
    for (epoch, batch) in batches.iter().enumerate() {
        for (position, tx) in batch.iter().enumerate() {
            if tx.hash() != tx.compute_hash() {
                return Err(LoadError::MalformedInput(format!(
                    "batch {epoch}, transaction {position}: hash {:?} does not match contents",
                    tx.hash()
                )));
            }
        }
    }
    Ok(batches)
}

pub fn load_batches(path: impl AsRef<Path>) -> Result<Vec<Vec<Transaction>>, LoadError> {
    let path = path.as_ref();
    let batches = parse_batches(&fs::read_to_string(path)?)?;
    info!("Loaded {} batches from {}", batches.len(), path.display());
    Ok(batches)
}
