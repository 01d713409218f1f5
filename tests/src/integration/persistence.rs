//! # Persistence
//!
//! Both registries over `FileBackedKVStore`: committed calls survive a
//! reopen along with their event log, rejected calls leave nothing behind
//! in the journal.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use shared_bus::RegistryEvent;
    use shared_types::{CallContext, U256};
    use sr_01_compact_list::FileBackedKVStore;
    use sr_03_transaction_registry::{SignatureLedgerKey, TransactionRegistryApi};
    use sr_04_encrypted_registry::{
        EncryptedRegistryApi, EncryptionKeyRegistration, RegisterRequest, RegistrationLedgerKey,
    };
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn plaintext_registry_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plaintext.journal");
        let (alice, bob) = (generate_key(), generate_key());
        let tx = transfer(42);
        let nonce = U256::from(3u64);

        {
            let (mut registry, _) =
                plaintext_registry(FileBackedKVStore::open(&path).unwrap(), Default::default());
            for (block, key) in [(1u64, &alice), (2, &bob)] {
                registry
                    .enqueue_transaction(
                        &CallContext::new(RELAYER, block),
                        signed_enqueue(key, U256::one(), SAFE, nonce, tx.clone()),
                    )
                    .unwrap();
            }
        }

        let (mut registry, _) =
            plaintext_registry(FileBackedKVStore::open(&path).unwrap(), Default::default());
        let record = registry
            .retrieve_transaction(&digest(U256::one(), SAFE, &tx, nonce))
            .unwrap();
        assert!(record.stored);
        assert_eq!(record.transaction, tx);

        let alice_key = SignatureLedgerKey::new(address_of(&alice), SAFE, U256::one(), nonce);
        assert_eq!(registry.retrieve_signatures_count(&alice_key), Ok(1));

        // Appends continue from the persisted length
        let enqueued = registry
            .enqueue_transaction(
                &CallContext::new(RELAYER, 3),
                signed_enqueue(&alice, U256::one(), SAFE, nonce, transfer(43)),
            )
            .unwrap();
        assert_eq!(enqueued.list_index, 1);
        assert!(enqueued.newly_stored);
        assert_eq!(registry.last_block().unwrap(), Some(3));
    }

    #[test]
    fn rejected_call_does_not_grow_journal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plaintext.journal");
        let (mut registry, _) =
            plaintext_registry(FileBackedKVStore::open(&path).unwrap(), Default::default());

        registry
            .enqueue_transaction(
                &CallContext::new(RELAYER, 1),
                signed_enqueue(&generate_key(), U256::one(), SAFE, U256::zero(), transfer(1)),
            )
            .unwrap();
        let before = fs::metadata(&path).unwrap().len();

        let mut bad = signed_enqueue(&generate_key(), U256::one(), SAFE, U256::zero(), transfer(2));
        bad.signature.truncate(64);
        assert!(registry
            .enqueue_transaction(&CallContext::new(RELAYER, 2), bad)
            .is_err());

        assert_eq!(fs::metadata(&path).unwrap().len(), before);
    }

    #[test]
    fn encrypted_registry_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("encrypted.journal");
        let key = RegistrationLedgerKey::new(U256::one(), SAFE, U256::zero(), RELAYER);
        let owner = [0xA1; 20];

        {
            let (mut registry, _) = encrypted_registry(FileBackedKVStore::open(&path).unwrap());
            registry
                .register_transaction(
                    &CallContext::new(RELAYER, 10),
                    RegisterRequest {
                        chain_id: U256::one(),
                        safe: SAFE,
                        nonce: U256::zero(),
                        struct_hash: [0x33; 32],
                        signature: Vec::new(),
                        encrypted_payload: b"ciphertext".to_vec(),
                    },
                )
                .unwrap();
            registry
                .register_encryption_key(
                    &CallContext::new(owner, 11),
                    EncryptionKeyRegistration {
                        context: [0x01; 32],
                        public_key: [0x02; 32],
                    },
                )
                .unwrap();
        }

        let (registry, _) = encrypted_registry(FileBackedKVStore::open(&path).unwrap());
        let page = registry.retrieve_registrations(&key, 0, 10).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].block_number, 10);
        assert_eq!(page.items[0].uid, key.uid(0));
        assert_eq!(
            registry.retrieve_encryption_public_keys(&[owner]),
            Ok(vec![[0x02; 32]])
        );

        // The payload lives only in the event; the reopened log still has it
        let log = registry.event_log().unwrap();
        let payload = log
            .iter()
            .filter(|(block, _)| *block == page.items[0].block_number)
            .flat_map(|(_, events)| events)
            .find_map(|event| match event {
                RegistryEvent::SafeTransactionRegistered {
                    uid,
                    encrypted_payload,
                    ..
                } if *uid == key.uid(0) => Some(encrypted_payload.clone()),
                _ => None,
            });
        assert_eq!(payload.as_deref(), Some(&b"ciphertext"[..]));
        assert_eq!(registry.last_block(), Ok(Some(11)));
    }
}
