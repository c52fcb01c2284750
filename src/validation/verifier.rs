use ethers::types::{Address, Signature, H256};
use ethers::utils::keccak256;
use tracing::warn;

/// Signature-checking capability used by the validator.
///
/// `identity` is the recipient recorded in the output being spent and
/// `message` is the spending transaction's signable bytes for one input slot.
pub trait Verifier {
    fn verify(&self, identity: &Address, message: &[u8], signature: &Signature) -> bool;
}

impl<F> Verifier for F
where
    F: Fn(&Address, &[u8], &Signature) -> bool,
{
    fn verify(&self, identity: &Address, message: &[u8], signature: &Signature) -> bool {
        self(identity, message, signature)
    }
}

/// Recoverable secp256k1 signatures over the Keccak-256 digest of the message
#[derive(Debug, Clone, Copy, Default)]
pub struct EcdsaVerifier;

impl Verifier for EcdsaVerifier {
    fn verify(&self, identity: &Address, message: &[u8], signature: &Signature) -> bool {
        let digest = H256::from(keccak256(message));

        // Recover the signer from the signature and compare against the owner
        match signature.recover(digest) {
            Ok(recovered) if recovered == *identity => true,
            Ok(recovered) => {
                warn!(
                    "Signature verification failed: signer mismatch (expected {:?}, got {:?})",
                    identity, recovered
                );
                false
            }
            Err(e) => {
                warn!("Signature recovery failed: {}", e);
                false
            }
        }
    }
}
