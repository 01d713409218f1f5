//! # Pagination Laws and Ledger Isolation
//!
//! Every paginated read returns `min(count, max(0, len - start))` items and
//! the full length, whatever the arguments. Ledgers keyed by different
//! tuples never see each other's entries.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use proptest::prelude::*;
    use shared_types::{CallContext, U256};
    use sr_01_compact_list::{CompactIndexedList, InMemoryKVStore};
    use sr_03_transaction_registry::{
        DuplicatePolicy, RegistryConfig, RegistryError, SignatureLedgerKey,
        TransactionRegistryApi,
    };
    use sr_04_encrypted_registry::{EncryptedRegistryApi, RegisterRequest, RegistrationLedgerKey};

    fn expected_len(len: u64, start: u64, count: u64) -> usize {
        count.min(len.saturating_sub(start)) as usize
    }

    proptest! {
        #[test]
        fn list_page_law(len in 0u64..40, start in 0u64..60, count in 0u64..60) {
            let mut store = InMemoryKVStore::new();
            let list: CompactIndexedList<u64> = CompactIndexedList::new(b"law/".to_vec());
            for value in 0..len {
                list.append(&mut store, &value).unwrap();
            }

            let page = list.retrieve(&store, start, count).unwrap();
            prop_assert_eq!(page.total, len);
            prop_assert_eq!(page.items.len(), expected_len(len, start, count));
            let walked = list
                .collect(&store, list.iter(&store).unwrap().skip(start).take(count))
                .unwrap();
            prop_assert_eq!(page.items, walked);
        }

        #[test]
        fn registration_page_law(len in 0u64..12, start in 0u64..20, count in 0u64..20) {
            let (mut registry, _) = encrypted_registry(InMemoryKVStore::new());
            for block in 0..len {
                registry
                    .register_transaction(
                        &CallContext::new(RELAYER, block),
                        RegisterRequest {
                            chain_id: U256::one(),
                            safe: SAFE,
                            nonce: U256::zero(),
                            struct_hash: [0x33; 32],
                            signature: Vec::new(),
                            encrypted_payload: vec![block as u8],
                        },
                    )
                    .unwrap();
            }

            let key = RegistrationLedgerKey::new(U256::one(), SAFE, U256::zero(), RELAYER);
            let page = registry.retrieve_registrations(&key, start, count).unwrap();
            prop_assert_eq!(page.total, len);
            prop_assert_eq!(page.items.len(), expected_len(len, start, count));
            for (offset, pointer) in page.items.iter().enumerate() {
                prop_assert_eq!(pointer.block_number, start + offset as u64);
                prop_assert_eq!(pointer.uid, key.uid(start + offset as u64));
            }
        }
    }

    #[test]
    fn signature_pages_clip() {
        let (mut registry, _) = memory_plaintext_registry();
        let alice = generate_key();
        for value in 0..5u64 {
            registry
                .enqueue_transaction(
                    &CallContext::new(RELAYER, value),
                    signed_enqueue(&alice, U256::one(), SAFE, U256::zero(), transfer(value)),
                )
                .unwrap();
        }

        let key = SignatureLedgerKey::new(address_of(&alice), SAFE, U256::one(), U256::zero());
        let tail = registry.retrieve_signatures(&key, 3, 100).unwrap();
        assert_eq!((tail.items.len(), tail.total), (2, 5));
        let past_end = registry.retrieve_signatures(&key, 9, 1).unwrap();
        assert_eq!((past_end.items.len(), past_end.total), (0, 5));
        let huge = registry.retrieve_signatures(&key, u64::MAX, u64::MAX).unwrap();
        assert!(huge.items.is_empty());
    }

    #[test]
    fn signature_ledgers_isolated_per_dimension() {
        let (mut registry, _) = memory_plaintext_registry();
        let alice = generate_key();
        let base = SignatureLedgerKey::new(address_of(&alice), SAFE, U256::one(), U256::from(5u64));

        registry
            .enqueue_transaction(
                &CallContext::new(RELAYER, 1),
                signed_enqueue(&alice, base.chain_id, base.safe, base.nonce, transfer(1)),
            )
            .unwrap();
        assert_eq!(registry.retrieve_signatures_count(&base), Ok(1));

        let neighbours = [
            SignatureLedgerKey {
                signer: [0x01; 20],
                ..base
            },
            SignatureLedgerKey {
                safe: [0x02; 20],
                ..base
            },
            SignatureLedgerKey {
                chain_id: U256::from(137u64),
                ..base
            },
            SignatureLedgerKey {
                nonce: U256::from(6u64),
                ..base
            },
        ];
        for key in neighbours {
            assert_eq!(registry.retrieve_signatures_count(&key), Ok(0), "{key:?}");
        }
    }

    #[test]
    fn duplicate_policy_across_crates() {
        let alice = generate_key();
        let request = || signed_enqueue(&alice, U256::one(), SAFE, U256::zero(), transfer(9));
        let key = SignatureLedgerKey::new(address_of(&alice), SAFE, U256::one(), U256::zero());

        let (mut appending, _) = memory_plaintext_registry();
        appending.enqueue_transaction(&CallContext::new(RELAYER, 1), request()).unwrap();
        assert_eq!(
            appending
                .enqueue_transaction(&CallContext::new(RELAYER, 2), request())
                .map(|enqueued| enqueued.list_index),
            Ok(1)
        );
        assert_eq!(appending.retrieve_signatures_count(&key), Ok(2));

        let (mut rejecting, _) = plaintext_registry(
            InMemoryKVStore::new(),
            RegistryConfig {
                duplicate_signatures: DuplicatePolicy::Reject,
            },
        );
        rejecting.enqueue_transaction(&CallContext::new(RELAYER, 1), request()).unwrap();
        assert_eq!(
            rejecting.enqueue_transaction(&CallContext::new(RELAYER, 2), request()),
            Err(RegistryError::DuplicateSignature {
                signer: address_of(&alice)
            })
        );
        assert_eq!(rejecting.retrieve_signatures_count(&key), Ok(1));
    }
}
