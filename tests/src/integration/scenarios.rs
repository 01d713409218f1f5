//! # Reference Scenarios
//!
//! 1. Append 1..=13, walk the whole list, then `next` reports no value
//! 2. Skip 9 of 13, `next` lands on 10
//! 3. `slice(17, 12)` over `i + 1` for 100 elements is `18..=29`
//! 4. Two signers on the same `(safe, chainId, nonce)` get one entry each
//! 5. A high-s signature is rejected
//! 6. An encrypted registration with neither signature nor payload fails

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use shared_bus::{EventFilter, EventPublisher, EventTopic, RegistryEvent};
    use shared_types::{CallContext, U256};
    use sr_01_compact_list::{CompactIndexedList, InMemoryKVStore};
    use sr_02_signature_verification::SignatureError;
    use sr_03_transaction_registry::{RegistryError, SignatureLedgerKey, TransactionRegistryApi};
    use sr_04_encrypted_registry::{EncryptedRegistryApi, EncryptedRegistryError, RegisterRequest};

    fn list_of(values: impl IntoIterator<Item = u64>) -> (CompactIndexedList<u64>, InMemoryKVStore) {
        let mut store = InMemoryKVStore::new();
        let list = CompactIndexedList::new(b"scenario/".to_vec());
        for value in values {
            list.append(&mut store, &value).unwrap();
        }
        (list, store)
    }

    // =============================================================================
    // COMPACT INDEXED LIST
    // =============================================================================

    #[test]
    fn scenario_1_full_iteration_then_exhausted() {
        let (list, store) = list_of(1..=13);

        let mut cursor = list.iter(&store).unwrap();
        let mut seen = Vec::new();
        loop {
            let (next, has_value) = cursor.next();
            if !has_value {
                break;
            }
            seen.push(list.value(&store, &next).unwrap());
            cursor = next;
        }

        assert_eq!(seen, (1..=13).collect::<Vec<u64>>());
        let (_, has_value) = cursor.next();
        assert!(!has_value);
    }

    #[test]
    fn scenario_2_skip_then_next() {
        let (list, store) = list_of(1..=13);

        let cursor = list.iter(&store).unwrap().skip(9);
        assert_eq!(cursor.count(), 4);

        let (cursor, has_value) = cursor.next();
        assert!(has_value);
        assert_eq!(list.value(&store, &cursor).unwrap(), 10);
    }

    #[test]
    fn scenario_3_slice_window() {
        let (list, store) = list_of((0..100).map(|i| i + 1));

        assert_eq!(
            list.slice(&store, 17, 12).unwrap(),
            (18..=29).collect::<Vec<u64>>()
        );
    }

    // =============================================================================
    // PLAINTEXT REGISTRY
    // =============================================================================

    #[test]
    fn scenario_4_two_signers_same_nonce() {
        let (mut registry, bus) = memory_plaintext_registry();
        let (alice, bob) = (generate_key(), generate_key());
        let nonce = U256::from(5u64);
        let tx = transfer(1_000);
        let expected = digest(U256::one(), SAFE, &tx, nonce);

        for (block, key) in [(1u64, &alice), (2, &bob)] {
            let enqueued = registry
                .enqueue_transaction(
                    &CallContext::new(RELAYER, block),
                    signed_enqueue(key, U256::one(), SAFE, nonce, tx.clone()),
                )
                .unwrap();
            assert_eq!(enqueued.list_index, 0);
            assert_eq!(enqueued.newly_stored, block == 1);
        }

        for key in [&alice, &bob] {
            let ledger = SignatureLedgerKey::new(address_of(key), SAFE, U256::one(), nonce);
            assert_eq!(registry.retrieve_signatures_count(&ledger), Ok(1));

            let page = registry.retrieve_signatures(&ledger, 0, 10).unwrap();
            assert_eq!(page.total, 1);
            assert_eq!(page.items[0].tx_hash, expected);
        }

        let record = registry.retrieve_transaction(&expected).unwrap();
        assert!(record.stored);
        assert_eq!(record.transaction, tx);

        // Stored once, signed twice
        let stored = bus.logs(0, u64::MAX, &EventFilter::topics(vec![EventTopic::TransactionStored]));
        let signed = bus.logs(0, u64::MAX, &EventFilter::topics(vec![EventTopic::SignatureStored]));
        assert_eq!(stored.len(), 1);
        assert_eq!(signed.len(), 2);
    }

    #[test]
    fn scenario_5_malleable_signature_rejected() {
        let (mut registry, bus) = memory_plaintext_registry();
        let alice = generate_key();
        let nonce = U256::from(5u64);
        let tx = transfer(1_000);

        let mut request = signed_enqueue(&alice, U256::one(), SAFE, nonce, tx.clone());
        let canonical: [u8; 65] = request.signature.as_slice().try_into().unwrap();
        request.signature = malleate(&canonical).to_vec();

        assert_eq!(
            registry.enqueue_transaction(&CallContext::new(RELAYER, 1), request),
            Err(RegistryError::Signature(SignatureError::MalleableSignature))
        );
        assert!(!registry
            .retrieve_transaction(&digest(U256::one(), SAFE, &tx, nonce))
            .unwrap()
            .stored);
        assert!(registry.store().is_empty());
        assert_eq!(bus.events_published(), 0);
    }

    // =============================================================================
    // ENCRYPTED REGISTRY
    // =============================================================================

    #[test]
    fn scenario_6_nothing_to_enqueue() {
        let (mut registry, bus) = encrypted_registry(InMemoryKVStore::new());

        let result = registry.register_transaction(
            &CallContext::new(RELAYER, 1),
            RegisterRequest {
                chain_id: U256::one(),
                safe: SAFE,
                nonce: U256::zero(),
                struct_hash: [0x33; 32],
                signature: Vec::new(),
                encrypted_payload: Vec::new(),
            },
        );

        assert_eq!(result, Err(EncryptedRegistryError::NothingToEnqueue));
        assert!(registry.store().is_empty());
        assert_eq!(bus.events_published(), 0);
    }

    #[test]
    fn registered_payload_is_recoverable_from_pointer() {
        let (mut registry, bus) = encrypted_registry(InMemoryKVStore::new());
        let owner = generate_key();
        let struct_hash = [0x44; 32];
        let signed_digest = sr_02_signature_verification::DomainHasher::new(U256::one(), SAFE)
            .typed_data_hash(&struct_hash);

        let registration = registry
            .register_transaction(
                &CallContext::new(RELAYER, 77),
                RegisterRequest {
                    chain_id: U256::one(),
                    safe: SAFE,
                    nonce: U256::zero(),
                    struct_hash,
                    signature: sr_02_signature_verification::test_helpers::sign_digest(
                        &signed_digest,
                        &owner,
                    )
                    .to_vec(),
                    encrypted_payload: b"sealed for the owners".to_vec(),
                },
            )
            .unwrap();
        assert_eq!(registration.signer, Some(address_of(&owner)));

        // A reader knowing only (chainId, safe, nonce, notary) follows the pointer
        let key = sr_04_encrypted_registry::RegistrationLedgerKey::new(
            U256::one(),
            SAFE,
            U256::zero(),
            RELAYER,
        );
        let page = registry.retrieve_registrations(&key, 0, 10).unwrap();
        let pointer = page.items[0];

        let logs = bus.logs_in_block(pointer.block_number, &EventFilter::registration(pointer.uid));
        match &logs[..] {
            [record] => match &record.event {
                RegistryEvent::SafeTransactionRegistered {
                    encrypted_payload, ..
                } => assert_eq!(encrypted_payload, b"sealed for the owners"),
                other => panic!("unexpected event {other:?}"),
            },
            other => panic!("expected one log, got {other:?}"),
        }
    }
}
