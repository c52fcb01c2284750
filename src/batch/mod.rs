//! Epoch Processing Module
//!
//! This module seals batches of candidate transactions into numbered epochs:
//! - EpochEngine: runs each batch through the validator and keeps the authoritative pool
//! - EpochReceipt: what was accepted, what was rejected and why

mod engine;

pub use engine::{EpochEngine, EpochReceipt};
