//! # Transaction Registry Service
//!
//! Implements `TransactionRegistryApi` over an injected `KeyValueStore` and
//! `EventPublisher`.

use crate::domain::config::{DuplicatePolicy, RegistryConfig};
use crate::domain::entities::{
    EnqueueRequest, Enqueued, SignatureEntry, SignatureLedgerKey, TransactionRecord,
};
use crate::domain::errors::RegistryError;
use crate::domain::store::{event_log, SignatureLedger, TransactionStore};
use crate::ports::inbound::TransactionRegistryApi;
use shared_bus::{EventPublisher, RegistryEvent};
use shared_types::{Address, CallContext, Hash, SafeTransaction, U256};
use sr_01_compact_list::{BatchOperation, KeyValueStore, Page};
use sr_02_signature_verification::{recover_signer, DomainHasher};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The plaintext registry.
pub struct TransactionRegistryService<S, P>
where
    S: KeyValueStore,
    P: EventPublisher,
{
    store: S,
    publisher: Arc<P>,
    config: RegistryConfig,
}

impl<S, P> TransactionRegistryService<S, P>
where
    S: KeyValueStore,
    P: EventPublisher,
{
    pub fn new(store: S, publisher: Arc<P>, config: RegistryConfig) -> Self {
        Self {
            store,
            publisher,
            config,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Read access to the backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Every block this registry emitted events in, with those events.
    pub fn event_log(&self) -> Result<Vec<(u64, Vec<RegistryEvent>)>, RegistryError> {
        Ok(event_log().load(&self.store)?)
    }

    /// Highest block this registry emitted an event in.
    pub fn last_block(&self) -> Result<Option<u64>, RegistryError> {
        Ok(event_log().last_block(&self.store)?)
    }

    /// The digest a Safe owner signs for `transaction` at `nonce`.
    pub fn transaction_hash(
        chain_id: U256,
        safe: Address,
        transaction: &SafeTransaction,
        nonce: U256,
    ) -> Hash {
        DomainHasher::new(chain_id, safe).transaction_hash(transaction, nonce)
    }
}

impl<S, P> TransactionRegistryApi for TransactionRegistryService<S, P>
where
    S: KeyValueStore,
    P: EventPublisher,
{
    fn enqueue_transaction(
        &mut self,
        ctx: &CallContext,
        request: EnqueueRequest,
    ) -> Result<Enqueued, RegistryError> {
        let EnqueueRequest {
            safe,
            chain_id,
            nonce,
            transaction,
            signature,
        } = request;

        let digest = Self::transaction_hash(chain_id, safe, &transaction, nonce);
        let recovered = recover_signer(&digest, &signature).map_err(|e| {
            warn!(error = %e, digest = ?digest, "[sr-03] signature rejected");
            e
        })?;
        let signer = recovered.signer;

        let key = SignatureLedgerKey::new(signer, safe, chain_id, nonce);
        let ledger = SignatureLedger::for_key(&key);
        let entry = SignatureEntry::new(recovered.signature, digest);

        let mut operations: Vec<BatchOperation> = Vec::new();

        let store_op = TransactionStore::insert_operation(&self.store, &digest, &transaction)?;
        let newly_stored = store_op.is_some();
        operations.extend(store_op);

        if self.config.duplicate_signatures == DuplicatePolicy::Reject {
            let marker = ledger.duplicate_key(&entry);
            if self.store.exists(&marker)? {
                warn!(signer = ?signer, digest = ?digest, "[sr-03] duplicate signature rejected");
                return Err(RegistryError::DuplicateSignature { signer });
            }
            operations.push(BatchOperation::insert_if_absent(marker, Vec::new()));
        }

        let (list_index, ledger_ops) = ledger.append_operations(&self.store, &entry)?;
        operations.extend(ledger_ops);

        let mut events = Vec::with_capacity(2);
        if newly_stored {
            events.push(RegistryEvent::TransactionStored {
                digest,
                safe,
                chain_id,
                nonce,
                transaction,
            });
        }
        events.push(RegistryEvent::SignatureStored {
            signer,
            safe,
            digest,
            chain_id,
            nonce,
            list_index,
        });
        operations.extend(event_log().append_operations(&self.store, ctx.block_number, &events)?);

        self.store.atomic_batch_write(operations)?;

        for event in events {
            self.publisher.publish(ctx.block_number, event);
        }

        info!(
            signer = ?signer,
            safe = ?safe,
            chain_id = %chain_id,
            nonce = %nonce,
            list_index,
            newly_stored,
            "[sr-03] signature stored"
        );

        Ok(Enqueued {
            list_index,
            newly_stored,
        })
    }

    fn retrieve_transaction(&self, digest: &Hash) -> Result<TransactionRecord, RegistryError> {
        let record = TransactionStore::get(&self.store, digest)?;
        debug!(digest = ?digest, stored = record.stored, "[sr-03] transaction read");
        Ok(record)
    }

    fn retrieve_signatures(
        &self,
        key: &SignatureLedgerKey,
        start: u64,
        count: u64,
    ) -> Result<Page<SignatureEntry>, RegistryError> {
        let page = SignatureLedger::for_key(key).retrieve(&self.store, start, count)?;
        debug!(start, count, total = page.total, "[sr-03] signatures read");
        Ok(page)
    }

    fn retrieve_signatures_count(&self, key: &SignatureLedgerKey) -> Result<u64, RegistryError> {
        SignatureLedger::for_key(key).count(&self.store)
    }
}
