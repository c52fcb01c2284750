//! Tests for transaction validation and batch processing
//!
//! Transactions are signed with real secp256k1 keys and checked through the
//! default ECDSA verifier unless a test says otherwise.

#[cfg(test)]
mod tests {
    use crate::{
        ConfirmationStatus, Transaction, UtxoId, ValidationError,
        pool::UtxoPool,
        validation::Validator,
    };
    use ethers::signers::{LocalWallet, Signer};
    use ethers::types::{Address, H256, Signature};

    /// Deterministic test key
    fn wallet(seed: u8) -> LocalWallet {
        LocalWallet::from_bytes(&[seed; 32]).expect("valid secp256k1 key")
    }

    fn sign(tx: &mut Transaction, index: usize, owner: &LocalWallet) {
        let digest = tx.signing_hash(index).expect("input exists");
        let signature = owner.sign_hash(digest).expect("signing succeeds");
        assert!(tx.add_signature(signature, index));
    }

    /// Build, sign and finalize a transaction spending `inputs` into `outputs`
    fn spend(inputs: &[(UtxoId, &LocalWallet)], outputs: &[(i64, Address)]) -> Transaction {
        let mut tx = Transaction::new();
        for (utxo, _) in inputs {
            tx.add_input(utxo.tx_hash, utxo.index);
        }
        for (value, recipient) in outputs {
            tx.add_output(*value, *recipient);
        }
        for (index, (_, owner)) in inputs.iter().enumerate() {
            sign(&mut tx, index, owner);
        }
        tx.finalize();
        tx
    }

    /// Pool holding a single coinbase output of `value` owned by `owner`
    fn genesis(owner: &LocalWallet, value: i64) -> (UtxoPool, UtxoId) {
        let coinbase = Transaction::coinbase(value, owner.address());
        let mut pool = UtxoPool::new();
        pool.seed(&coinbase);
        (pool, UtxoId::new(coinbase.hash(), 0))
    }

    #[test]
    fn test_end_to_end_single_transfer() {
        let alice = wallet(1);
        let bob = wallet(2);
        let (pool, u1) = genesis(&alice, 10);

        let tx1 = spend(&[(u1, &alice)], &[(10, bob.address())]);
        let mut validator = Validator::new(&pool);
        assert!(validator.is_valid(&tx1));

        let accepted = validator.process_batch(&[tx1.clone()]);
        assert_eq!(accepted, vec![tx1.clone()]);

        let result = validator.pool();
        assert_eq!(result.len(), 1);
        assert!(!result.contains(&u1));
        let created = result.get(&UtxoId::new(tx1.hash(), 0)).unwrap();
        assert_eq!(created.value, 10);
        assert_eq!(created.recipient, bob.address());
    }

    #[test]
    fn test_rejects_transaction_without_inputs() {
        let alice = wallet(1);
        let (pool, _) = genesis(&alice, 10);
        let validator = Validator::new(&pool);

        let mut empty = Transaction::new();
        empty.add_output(0, alice.address());
        empty.finalize();
        assert_eq!(validator.validate(&empty), Err(ValidationError::NoInputs));

        let coinbase = Transaction::coinbase(5, alice.address());
        assert!(!validator.is_valid(&coinbase));
    }

    #[test]
    fn test_rejects_missing_utxo() {
        let alice = wallet(1);
        let (pool, u1) = genesis(&alice, 10);
        let validator = Validator::new(&pool);

        let phantom = UtxoId::new(H256::repeat_byte(0xee), 0);
        let tx = spend(&[(u1, &alice), (phantom, &alice)], &[(5, alice.address())]);
        assert_eq!(validator.validate(&tx), Err(ValidationError::MissingUtxo(phantom)));

        let wrong_index = UtxoId::new(u1.tx_hash, 1);
        let tx = spend(&[(wrong_index, &alice)], &[(5, alice.address())]);
        assert!(!validator.is_valid(&tx));
    }

    #[test]
    fn test_rejects_signature_from_wrong_key() {
        let alice = wallet(1);
        let mallory = wallet(3);
        let (pool, u1) = genesis(&alice, 10);
        let validator = Validator::new(&pool);

        let tx = spend(&[(u1, &mallory)], &[(10, mallory.address())]);
        assert_eq!(
            validator.validate(&tx),
            Err(ValidationError::InvalidSignature { input: 0 })
        );
    }

    #[test]
    fn test_rejects_unsigned_input() {
        let alice = wallet(1);
        let (pool, u1) = genesis(&alice, 10);
        let validator = Validator::new(&pool);

        let mut tx = Transaction::new();
        tx.add_input(u1.tx_hash, u1.index);
        tx.add_output(10, alice.address());
        tx.finalize();
        assert!(!validator.is_valid(&tx));
    }

    #[test]
    fn test_signature_bound_to_input_slot() {
        let alice = wallet(1);
        let mut pool = UtxoPool::new();
        let first = Transaction::coinbase(5, alice.address());
        let second = Transaction::coinbase(6, alice.address());
        pool.seed(&first);
        pool.seed(&second);
        let validator = Validator::new(&pool);

        let mut tx = Transaction::new();
        tx.add_input(first.hash(), 0);
        tx.add_input(second.hash(), 0);
        tx.add_output(11, alice.address());
        sign(&mut tx, 0, &alice);
        let reused = tx.input(0).and_then(|input| input.signature.clone()).unwrap();
        tx.add_signature(reused, 1);
        tx.finalize();

        assert_eq!(
            validator.validate(&tx),
            Err(ValidationError::InvalidSignature { input: 1 })
        );
    }

    #[test]
    fn test_rejects_signature_after_outputs_change() {
        let alice = wallet(1);
        let bob = wallet(2);
        let (pool, u1) = genesis(&alice, 10);
        let validator = Validator::new(&pool);

        let mut tx = spend(&[(u1, &alice)], &[(4, bob.address())]);
        tx.add_output(6, bob.address());
        tx.finalize();
        assert!(!validator.is_valid(&tx));
    }

    #[test]
    fn test_rejects_intra_transaction_double_spend() {
        let alice = wallet(1);
        let (pool, u1) = genesis(&alice, 10);
        let validator = Validator::new(&pool);

        // Each signature is individually valid
        let tx = spend(&[(u1, &alice), (u1, &alice)], &[(15, alice.address())]);
        assert_eq!(validator.validate(&tx), Err(ValidationError::DuplicateInput(u1)));

        let tx = spend(&[(u1, &alice), (u1, &alice)], &[(1, alice.address())]);
        assert!(!validator.is_valid(&tx));
    }

    #[test]
    fn test_rejects_negative_output() {
        let alice = wallet(1);
        let bob = wallet(2);
        let (pool, u1) = genesis(&alice, 10);
        let validator = Validator::new(&pool);

        let tx = spend(&[(u1, &alice)], &[(15, bob.address()), (-5, alice.address())]);
        assert_eq!(
            validator.validate(&tx),
            Err(ValidationError::NegativeOutput { output: 1, value: -5 })
        );
    }

    #[test]
    fn test_zero_value_output_allowed() {
        let alice = wallet(1);
        let bob = wallet(2);
        let (pool, u1) = genesis(&alice, 10);
        let validator = Validator::new(&pool);

        let tx = spend(&[(u1, &alice)], &[(10, bob.address()), (0, alice.address())]);
        assert!(validator.is_valid(&tx));
    }

    #[test]
    fn test_value_conservation() {
        let alice = wallet(1);
        let bob = wallet(2);
        let (pool, u1) = genesis(&alice, 10);
        let validator = Validator::new(&pool);

        let exact = spend(&[(u1, &alice)], &[(7, bob.address()), (3, alice.address())]);
        assert!(validator.is_valid(&exact));

        let with_fee = spend(&[(u1, &alice)], &[(9, bob.address())]);
        assert!(validator.is_valid(&with_fee));

        let inflating = spend(&[(u1, &alice)], &[(7, bob.address()), (4, alice.address())]);
        assert_eq!(
            validator.validate(&inflating),
            Err(ValidationError::InsufficientInputValue { inputs: 10, outputs: 11 })
        );
    }

    #[test]
    fn test_large_sums_do_not_overflow() {
        let alice = wallet(1);
        let mut pool = UtxoPool::new();
        let first = Transaction::coinbase(i64::MAX, alice.address());
        let second = Transaction::coinbase(i64::MAX - 1, alice.address());
        pool.seed(&first);
        pool.seed(&second);
        let validator = Validator::new(&pool);

        let inputs = [
            (UtxoId::new(first.hash(), 0), &alice),
            (UtxoId::new(second.hash(), 0), &alice),
        ];
        let tx = spend(&inputs, &[(i64::MAX, alice.address()), (i64::MAX - 1, alice.address())]);
        assert!(validator.is_valid(&tx));

        let tx = spend(&inputs, &[(i64::MAX, alice.address()), (i64::MAX, alice.address())]);
        assert!(!validator.is_valid(&tx));
    }

    #[test]
    fn test_is_valid_is_idempotent() {
        let alice = wallet(1);
        let bob = wallet(2);
        let (pool, u1) = genesis(&alice, 10);
        let validator = Validator::new(&pool);

        let good = spend(&[(u1, &alice)], &[(10, bob.address())]);
        let bad = spend(&[(u1, &bob)], &[(10, bob.address())]);
        for _ in 0..3 {
            assert!(validator.is_valid(&good));
            assert!(!validator.is_valid(&bad));
        }
        assert_eq!(validator.pool(), &pool);
    }

    #[test]
    fn test_batch_rejects_double_spend_across_transactions() {
        let alice = wallet(1);
        let bob = wallet(2);
        let carol = wallet(3);
        let (pool, u) = genesis(&alice, 10);

        let a = spend(&[(u, &alice)], &[(10, bob.address())]);
        let b = spend(&[(u, &alice)], &[(10, carol.address())]);

        let mut validator = Validator::new(&pool);
        let accepted = validator.process_batch(&[a.clone(), b.clone()]);
        assert_eq!(accepted, vec![a.clone()]);

        let result = validator.pool();
        assert!(!result.contains(&u));
        assert!(result.contains(&UtxoId::new(a.hash(), 0)));
        assert!(!result.contains(&UtxoId::new(b.hash(), 0)));
    }

    #[test]
    fn test_batch_chained_transactions_depend_on_order() {
        let alice = wallet(1);
        let bob = wallet(2);
        let carol = wallet(3);
        let (pool, u) = genesis(&alice, 10);

        let a = spend(&[(u, &alice)], &[(10, bob.address())]);
        let b = spend(&[(UtxoId::new(a.hash(), 0), &bob)], &[(10, carol.address())]);

        let mut validator = Validator::new(&pool);
        let accepted = validator.process_batch(&[b.clone(), a.clone()]);
        assert_eq!(accepted, vec![a.clone()]);

        let mut validator = Validator::new(&pool);
        let accepted = validator.process_batch(&[a.clone(), b.clone()]);
        assert_eq!(accepted, vec![a.clone(), b.clone()]);

        let result = validator.pool();
        assert_eq!(result.len(), 1);
        assert_eq!(
            result.get(&UtxoId::new(b.hash(), 0)).unwrap().recipient,
            carol.address()
        );
    }

    #[test]
    fn test_batch_does_not_touch_callers_pool() {
        let alice = wallet(1);
        let bob = wallet(2);
        let (pool, u) = genesis(&alice, 10);
        let snapshot = pool.clone();

        let tx = spend(&[(u, &alice)], &[(10, bob.address())]);
        let mut validator = Validator::new(&pool);
        validator.process_batch(&[tx]);

        assert_eq!(pool, snapshot);
        assert!(pool.contains(&u));
        assert!(!validator.pool().contains(&u));
    }

    #[test]
    fn test_rejected_transactions_leave_pool_unchanged() {
        let alice = wallet(1);
        let bob = wallet(2);
        let (pool, u) = genesis(&alice, 10);

        let inflating = spend(&[(u, &alice)], &[(11, bob.address())]);
        let forged = spend(&[(u, &bob)], &[(10, bob.address())]);

        let mut validator = Validator::new(&pool);
        let accepted = validator.process_batch(&[inflating, forged]);
        assert!(accepted.is_empty());
        assert_eq!(validator.into_pool(), pool);
    }

    #[test]
    fn test_receipts_report_each_candidate() {
        let alice = wallet(1);
        let bob = wallet(2);
        let (pool, u) = genesis(&alice, 10);

        let a = spend(&[(u, &alice)], &[(10, bob.address())]);
        let b = spend(&[(u, &alice)], &[(5, bob.address())]);
        let empty = Transaction::coinbase(1, bob.address());

        let mut validator = Validator::new(&pool);
        let receipts = validator.process_batch_with_receipts(&[a.clone(), b.clone(), empty]);

        assert_eq!(receipts.len(), 3);
        assert_eq!(receipts[0].tx_hash, a.hash());
        assert_eq!(receipts[0].status, ConfirmationStatus::Accepted);
        assert_eq!(
            receipts[1].status,
            ConfirmationStatus::Rejected {
                reason: ValidationError::MissingUtxo(u)
            }
        );
        assert_eq!(
            receipts[2].status,
            ConfirmationStatus::Rejected {
                reason: ValidationError::NoInputs
            }
        );
    }

    #[test]
    fn test_custom_verifier_substitution() {
        let alice = wallet(1);
        let (pool, u) = genesis(&alice, 10);
        let tx = spend(&[(u, &alice)], &[(10, alice.address())]);

        let deny_all = |_: &Address, _: &[u8], _: &Signature| false;
        let validator = Validator::with_verifier(&pool, deny_all);
        assert!(!validator.is_valid(&tx));

        // Any signature passes, but the other checks still apply
        let allow_all = |_: &Address, _: &[u8], _: &Signature| true;
        let validator = Validator::with_verifier(&pool, allow_all);
        let forged = spend(&[(u, &wallet(9))], &[(10, alice.address())]);
        assert!(validator.is_valid(&forged));
        let inflating = spend(&[(u, &wallet(9))], &[(11, alice.address())]);
        assert!(!validator.is_valid(&inflating));
    }

    #[test]
    fn test_result_independent_of_failure_order() {
        let alice = wallet(1);
        let mallory = wallet(3);
        let (pool, u) = genesis(&alice, 10);
        let validator = Validator::new(&pool);

        // Wrong signer, duplicate claim, negative output and inflation all at once
        let tx = spend(
            &[(u, &mallory), (u, &mallory)],
            &[(100, mallory.address()), (-1, mallory.address())],
        );
        assert!(!validator.is_valid(&tx));
        assert!(validator.validate(&tx).is_err());
    }
}
