//! Transaction Validation Module
//!
//! This module validates transactions against the UTXO pool and applies
//! batches of them. Performs ownership (signature) checks, double-spend
//! detection, and value conservation.

mod validator;
mod verifier;

#[cfg(test)]
mod tests;

pub use validator::Validator;
pub use verifier::{EcdsaVerifier, Verifier};
