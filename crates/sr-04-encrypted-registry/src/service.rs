//! # Encrypted Registry Service

use crate::domain::entities::{
    EncryptionKeyRegistration, RegisterRequest, Registration, RegistrationLedgerKey,
    RegistrationPointer,
};
use crate::domain::errors::EncryptedRegistryError;
use crate::domain::store::{event_log, EncryptionKeyDirectory, RegistrationLedger};
use crate::ports::inbound::EncryptedRegistryApi;
use shared_bus::{EventPublisher, RegistryEvent};
use shared_types::{Address, CallContext, Hash};
use sr_01_compact_list::{KeyValueStore, Page};
use sr_02_signature_verification::{recover_signer, DomainHasher};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The encrypted registry.
pub struct EncryptedRegistryService<S, P>
where
    S: KeyValueStore,
    P: EventPublisher,
{
    store: S,
    publisher: Arc<P>,
}

impl<S, P> EncryptedRegistryService<S, P>
where
    S: KeyValueStore,
    P: EventPublisher,
{
    pub fn new(store: S, publisher: Arc<P>) -> Self {
        Self { store, publisher }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Every block this registry emitted events in, with those events.
    pub fn event_log(&self) -> Result<Vec<(u64, Vec<RegistryEvent>)>, EncryptedRegistryError> {
        Ok(event_log().load(&self.store)?)
    }

    /// Highest block this registry emitted an event in.
    pub fn last_block(&self) -> Result<Option<u64>, EncryptedRegistryError> {
        Ok(event_log().last_block(&self.store)?)
    }

    /// The caller's current key, if any.
    pub fn encryption_key(
        &self,
        signer: &Address,
    ) -> Result<Option<EncryptionKeyRegistration>, EncryptedRegistryError> {
        EncryptionKeyDirectory::get(&self.store, signer)
    }
}

impl<S, P> EncryptedRegistryApi for EncryptedRegistryService<S, P>
where
    S: KeyValueStore,
    P: EventPublisher,
{
    fn register_transaction(
        &mut self,
        ctx: &CallContext,
        request: RegisterRequest,
    ) -> Result<Registration, EncryptedRegistryError> {
        let RegisterRequest {
            chain_id,
            safe,
            nonce,
            struct_hash,
            signature,
            encrypted_payload,
        } = request;

        if signature.is_empty() && encrypted_payload.is_empty() {
            warn!(safe = ?safe, "[sr-04] empty registration rejected");
            return Err(EncryptedRegistryError::NothingToEnqueue);
        }

        let signed = if signature.is_empty() {
            None
        } else {
            let digest = DomainHasher::new(chain_id, safe).typed_data_hash(&struct_hash);
            let recovered = recover_signer(&digest, &signature).map_err(|e| {
                warn!(error = %e, safe = ?safe, "[sr-04] signature rejected");
                e
            })?;
            Some(recovered)
        };

        let notary = ctx.caller;
        let mut operations = Vec::new();
        let mut events = Vec::with_capacity(2);

        if let Some(recovered) = &signed {
            events.push(RegistryEvent::SafeTransactionSigned {
                signer: recovered.signer,
                safe,
                chain_id,
                nonce,
                struct_hash,
                signature: recovered.signature,
            });
        }

        let registered = if encrypted_payload.is_empty() {
            None
        } else {
            let key = RegistrationLedgerKey::new(chain_id, safe, nonce, notary);
            let (index, pointer, ledger_ops) = RegistrationLedger::for_key(&key)
                .append_operations(&self.store, ctx.block_number)?;
            operations.extend(ledger_ops);
            events.push(RegistryEvent::SafeTransactionRegistered {
                uid: pointer.uid,
                notary,
                safe,
                chain_id,
                nonce,
                encrypted_payload,
            });
            Some((index, pointer))
        };

        operations.extend(event_log().append_operations(&self.store, ctx.block_number, &events)?);
        self.store.atomic_batch_write(operations)?;

        for event in events {
            self.publisher.publish(ctx.block_number, event);
        }

        let registration = Registration {
            uid: registered.map(|(_, pointer)| pointer.uid),
            list_index: registered.map(|(index, _)| index),
            signer: signed.map(|recovered| recovered.signer),
        };
        info!(
            safe = ?safe,
            chain_id = %chain_id,
            nonce = %nonce,
            notary = ?notary,
            signed = registration.signer.is_some(),
            list_index = ?registration.list_index,
            "[sr-04] transaction registered"
        );

        Ok(registration)
    }

    fn register_encryption_key(
        &mut self,
        ctx: &CallContext,
        registration: EncryptionKeyRegistration,
    ) -> Result<(), EncryptedRegistryError> {
        let signer = ctx.caller;
        let event = RegistryEvent::EncryptionKeyRegistered {
            signer,
            context: registration.context,
            public_key: registration.public_key,
        };

        let mut operations = vec![EncryptionKeyDirectory::put_operation(&signer, registration)];
        operations.extend(event_log().append_operations(
            &self.store,
            ctx.block_number,
            std::slice::from_ref(&event),
        )?);
        self.store.atomic_batch_write(operations)?;

        self.publisher.publish(ctx.block_number, event);
        info!(signer = ?signer, "[sr-04] encryption key registered");
        Ok(())
    }

    fn retrieve_registrations(
        &self,
        key: &RegistrationLedgerKey,
        start: u64,
        count: u64,
    ) -> Result<Page<RegistrationPointer>, EncryptedRegistryError> {
        let page = RegistrationLedger::for_key(key).retrieve(&self.store, start, count)?;
        debug!(start, count, total = page.total, "[sr-04] registrations read");
        Ok(page)
    }

    fn retrieve_registration_count(
        &self,
        key: &RegistrationLedgerKey,
    ) -> Result<u64, EncryptedRegistryError> {
        RegistrationLedger::for_key(key).count(&self.store)
    }

    fn retrieve_encryption_public_keys(
        &self,
        signers: &[Address],
    ) -> Result<Vec<Hash>, EncryptedRegistryError> {
        EncryptionKeyDirectory::public_keys(&self.store, signers)
    }
}
