//! This crate implements the ledger-update core of a centrally issued ("Scrooge") coin.
//! Given a pool of unspent transaction outputs and a batch of candidate transactions,
//! it decides which candidates are valid and mutually non-conflicting, and applies them.

pub mod types; // Transactions, outputs, UTXO ids and validation errors.
pub mod pool; // The set of currently spendable outputs.
pub mod validation; // Single-transaction checks and batch selection.
pub mod batch; // Sequential epochs over a validator.
pub mod ledger; // JSON snapshot and batch files at the boundary.
pub mod config; // Configuration for the binary.

// Re-export commonly used types for easier access.
pub use types::*;
pub use config::Config;
pub use pool::UtxoPool;
pub use validation::Validator;
