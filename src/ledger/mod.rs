//! Ledger File Module
//!
//! Boundary between the validation core and the outside world: reads the
//! genesis pool and candidate batches from JSON files and writes the
//! resulting pool back out. Anything that fails to decode is reported as
//! `LoadError::MalformedInput` before it reaches the validator.

mod snapshot;

pub use snapshot::{
    LoadError, PoolSnapshot, SnapshotEntry, load_batches, load_pool, parse_batches, parse_pool,
    save_pool,
};
