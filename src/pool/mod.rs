//! UTXO Pool Module
//!
//! This module holds the authoritative set of spendable outputs that
//! transactions are validated against and applied to.

mod utxo_pool;

pub use utxo_pool::{PoolError, PoolStats, UtxoPool};
