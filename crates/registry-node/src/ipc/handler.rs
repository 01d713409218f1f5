//! # IPC Handler
//!
//! Decodes request lines, dispatches them to the registries in the
//! container and encodes one response line per request.

use super::messages::{
    ErrorBody, ErrorKind, RegistryRequest, RegistryResponse, RequestEnvelope, ResponseBody,
};
use crate::container::RegistryContainer;
use registry_telemetry::{
    gather_metrics, metric_inc, CURRENT_BLOCK, ENCRYPTION_KEYS_REGISTERED, REGISTRATIONS,
    SIGNATURES_STORED, SIGNATURE_FAILURES, TRANSACTIONS_STORED,
};
use shared_bus::EventFilter;
use shared_types::SafeTransaction;
use sr_02_signature_verification::{DomainHasher, SignatureError};
use sr_03_transaction_registry::{
    EnqueueRequest, RegistryError, SignatureLedgerKey, TransactionRegistryApi,
};
use sr_04_encrypted_registry::{
    EncryptedRegistryApi, EncryptedRegistryError, EncryptionKeyRegistration, RegisterRequest,
    RegistrationLedgerKey,
};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

/// Serves requests against one container.
pub struct IpcHandler {
    container: Arc<RegistryContainer>,
}

impl IpcHandler {
    pub fn new(container: Arc<RegistryContainer>) -> Self {
        Self { container }
    }

    /// Read request lines until EOF, answering each in order.
    ///
    /// Blank lines are skipped. Returns the number of requests served.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<u64>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let mut served = 0u64;

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let mut encoded = self.handle_line(&line);
            encoded.push('\n');
            writer.write_all(encoded.as_bytes()).await?;
            writer.flush().await?;
            served += 1;
        }

        info!(served, "Request stream closed");
        Ok(served)
    }

    /// Answer one request line with one response line (without newline).
    pub fn handle_line(&self, line: &str) -> String {
        let response = match serde_json::from_str::<RequestEnvelope>(line) {
            Ok(envelope) => self.handle(envelope),
            Err(e) => {
                warn!(error = %e, "Malformed request line");
                RegistryResponse::err(0, ErrorBody::new(ErrorKind::InvalidRequest, e.to_string()))
            }
        };

        serde_json::to_string(&response).unwrap_or_else(|e| {
            format!(
                r#"{{"id":{},"error":{{"kind":"internal","message":"{}"}}}}"#,
                response.id,
                e.to_string().replace('"', "'")
            )
        })
    }

    /// Dispatch one decoded request.
    pub fn handle(&self, envelope: RequestEnvelope) -> RegistryResponse {
        let RequestEnvelope { id, request } = envelope;
        let method = request.method();
        debug!(id, method, "Request received");

        match self.dispatch(request) {
            Ok(result) => RegistryResponse::ok(id, result),
            Err(error) => {
                warn!(id, method, kind = ?error.kind, message = %error.message, "Request failed");
                RegistryResponse::err(id, error)
            }
        }
    }

    fn dispatch(&self, request: RegistryRequest) -> Result<ResponseBody, ErrorBody> {
        let method = request.method();
        match request {
            RegistryRequest::EnqueueTransaction {
                from,
                safe,
                chain_id,
                nonce,
                transaction,
                signature,
            } => {
                let mut registry = self.container.transaction_registry();
                let ctx = self.container.next_call(from.0);
                CURRENT_BLOCK.set(ctx.block_number as f64);

                let enqueued = registry
                    .enqueue_transaction(
                        &ctx,
                        EnqueueRequest {
                            safe: safe.0,
                            chain_id,
                            nonce,
                            transaction: transaction.into(),
                            signature: signature.0,
                        },
                    )
                    .map_err(|e| registry_error(method, e))?;

                metric_inc!(SIGNATURES_STORED);
                if enqueued.newly_stored {
                    metric_inc!(TRANSACTIONS_STORED);
                }

                Ok(ResponseBody::Enqueued {
                    block_number: ctx.block_number,
                    list_index: enqueued.list_index,
                    newly_stored: enqueued.newly_stored,
                })
            }

            RegistryRequest::RetrieveTransaction { digest } => {
                let record = self
                    .container
                    .transaction_registry()
                    .retrieve_transaction(&digest.0)
                    .map_err(|e| registry_error(method, e))?;
                Ok(ResponseBody::Transaction {
                    stored: record.stored,
                    transaction: record.transaction.into(),
                })
            }

            RegistryRequest::RetrieveSignatures {
                signer,
                safe,
                chain_id,
                nonce,
                start,
                count,
            } => {
                let key = SignatureLedgerKey::new(signer.0, safe.0, chain_id, nonce);
                let page = self
                    .container
                    .transaction_registry()
                    .retrieve_signatures(&key, start, count)
                    .map_err(|e| registry_error(method, e))?;
                Ok(ResponseBody::Signatures {
                    total: page.total,
                    items: page.items.into_iter().map(Into::into).collect(),
                })
            }

            RegistryRequest::RetrieveSignaturesCount {
                signer,
                safe,
                chain_id,
                nonce,
            } => {
                let key = SignatureLedgerKey::new(signer.0, safe.0, chain_id, nonce);
                let count = self
                    .container
                    .transaction_registry()
                    .retrieve_signatures_count(&key)
                    .map_err(|e| registry_error(method, e))?;
                Ok(ResponseBody::Count { count })
            }

            RegistryRequest::TransactionHash {
                chain_id,
                safe,
                nonce,
                transaction,
            } => {
                let digest = DomainHasher::new(chain_id, safe.0)
                    .transaction_hash(&SafeTransaction::from(transaction), nonce);
                Ok(ResponseBody::TransactionHash {
                    digest: digest.into(),
                })
            }

            RegistryRequest::RegisterTransaction {
                from,
                chain_id,
                safe,
                nonce,
                struct_hash,
                signature,
                encrypted_payload,
            } => {
                let mut registry = self.container.encrypted_registry();
                let ctx = self.container.next_call(from.0);
                CURRENT_BLOCK.set(ctx.block_number as f64);

                let registration = registry
                    .register_transaction(
                        &ctx,
                        RegisterRequest {
                            chain_id,
                            safe: safe.0,
                            nonce,
                            struct_hash: struct_hash.0,
                            signature: signature.0,
                            encrypted_payload: encrypted_payload.0,
                        },
                    )
                    .map_err(|e| encrypted_error(method, e))?;

                if registration.uid.is_some() {
                    metric_inc!(REGISTRATIONS);
                }
                Ok(ResponseBody::Registered {
                    block_number: ctx.block_number,
                    uid: registration.uid.map(Into::into),
                    list_index: registration.list_index,
                    signer: registration.signer.map(Into::into),
                })
            }

            RegistryRequest::RegisterEncryptionKey {
                from,
                context,
                public_key,
            } => {
                let mut registry = self.container.encrypted_registry();
                let ctx = self.container.next_call(from.0);
                CURRENT_BLOCK.set(ctx.block_number as f64);

                registry
                    .register_encryption_key(
                        &ctx,
                        EncryptionKeyRegistration {
                            context: context.0,
                            public_key: public_key.0,
                        },
                    )
                    .map_err(|e| encrypted_error(method, e))?;

                metric_inc!(ENCRYPTION_KEYS_REGISTERED);
                Ok(ResponseBody::KeyRegistered {
                    block_number: ctx.block_number,
                })
            }

            RegistryRequest::RetrieveRegistrations {
                chain_id,
                safe,
                nonce,
                notary,
                start,
                count,
            } => {
                let key = RegistrationLedgerKey::new(chain_id, safe.0, nonce, notary.0);
                let page = self
                    .container
                    .encrypted_registry()
                    .retrieve_registrations(&key, start, count)
                    .map_err(|e| encrypted_error(method, e))?;
                Ok(ResponseBody::Registrations {
                    total: page.total,
                    items: page.items.into_iter().map(Into::into).collect(),
                })
            }

            RegistryRequest::RetrieveRegistrationCount {
                chain_id,
                safe,
                nonce,
                notary,
            } => {
                let key = RegistrationLedgerKey::new(chain_id, safe.0, nonce, notary.0);
                let count = self
                    .container
                    .encrypted_registry()
                    .retrieve_registration_count(&key)
                    .map_err(|e| encrypted_error(method, e))?;
                Ok(ResponseBody::Count { count })
            }

            RegistryRequest::RetrieveEncryptionPublicKeys { signers } => {
                let signers: Vec<_> = signers.into_iter().map(|signer| signer.0).collect();
                let keys = self
                    .container
                    .encrypted_registry()
                    .retrieve_encryption_public_keys(&signers)
                    .map_err(|e| encrypted_error(method, e))?;
                Ok(ResponseBody::PublicKeys {
                    keys: keys.into_iter().map(Into::into).collect(),
                })
            }

            RegistryRequest::GetLogs {
                from_block,
                to_block,
                topics,
                safe,
                uid,
            } => {
                let filter = EventFilter {
                    topics,
                    safe: safe.map(|safe| safe.0),
                    uid: uid.map(|uid| uid.0),
                };
                let logs = self.container.event_bus.logs(from_block, to_block, &filter);
                Ok(ResponseBody::Logs {
                    logs: logs.into_iter().map(Into::into).collect(),
                })
            }

            RegistryRequest::Metrics => gather_metrics()
                .map(|text| ResponseBody::Metrics { text })
                .map_err(|e| ErrorBody::new(ErrorKind::Internal, e.to_string())),
        }
    }
}

fn signature_reason(error: &SignatureError) -> &'static str {
    match error {
        SignatureError::InvalidLength(_) => "invalid_length",
        SignatureError::InvalidFormat => "invalid_format",
        SignatureError::MalleableSignature => "malleable",
        SignatureError::InvalidRecoveryId(_) => "invalid_recovery_id",
        SignatureError::RecoveryFailed => "recovery_failed",
        SignatureError::ZeroAddress => "zero_address",
    }
}

fn signature_failure(method: &str, error: &SignatureError) -> ErrorBody {
    metric_inc!(SIGNATURE_FAILURES, &[method, signature_reason(error)]);
    ErrorBody::new(ErrorKind::InvalidSignature, error.to_string())
}

fn registry_error(method: &str, error: RegistryError) -> ErrorBody {
    match &error {
        RegistryError::Signature(e) => signature_failure(method, e),
        RegistryError::DuplicateSignature { .. } => {
            ErrorBody::new(ErrorKind::DuplicateSignature, error.to_string())
        }
        RegistryError::List(_)
        | RegistryError::Storage(_)
        | RegistryError::CorruptRecord { .. } => {
            ErrorBody::new(ErrorKind::Storage, error.to_string())
        }
    }
}

fn encrypted_error(method: &str, error: EncryptedRegistryError) -> ErrorBody {
    match &error {
        EncryptedRegistryError::Signature(e) => signature_failure(method, e),
        EncryptedRegistryError::NothingToEnqueue => {
            ErrorBody::new(ErrorKind::NothingToEnqueue, error.to_string())
        }
        EncryptedRegistryError::List(_)
        | EncryptedRegistryError::Storage(_)
        | EncryptedRegistryError::CorruptKeyRecord { .. } => {
            ErrorBody::new(ErrorKind::Storage, error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::NodeConfig;
    use crate::ipc::hex::{HexAddress, HexBytes, HexHash};
    use crate::ipc::messages::{EventDto, TransactionDto};
    use shared_types::U256;
    use sr_02_signature_verification::test_helpers::{address_of, generate_key, malleate, sign_digest};

    const SAFE: [u8; 20] = [0x5A; 20];
    const CALLER: [u8; 20] = [0xCA; 20];

    fn handler() -> IpcHandler {
        IpcHandler::new(Arc::new(RegistryContainer::new(NodeConfig::default()).unwrap()))
    }

    fn call(handler: &IpcHandler, request: RegistryRequest) -> RegistryResponse {
        handler.handle(RequestEnvelope { id: 1, request })
    }

    fn transfer() -> TransactionDto {
        TransactionDto {
            to: [0x11; 20].into(),
            value: U256::from(1_000u64),
            ..TransactionDto::default()
        }
    }

    fn enqueue(signature: Vec<u8>) -> RegistryRequest {
        RegistryRequest::EnqueueTransaction {
            from: CALLER.into(),
            safe: SAFE.into(),
            chain_id: U256::one(),
            nonce: U256::from(5u64),
            transaction: transfer(),
            signature: signature.into(),
        }
    }

    fn digest() -> [u8; 32] {
        DomainHasher::new(U256::one(), SAFE)
            .transaction_hash(&SafeTransaction::from(transfer()), U256::from(5u64))
    }

    #[test]
    fn test_second_signer_reuses_stored_transaction() {
        let handler = handler();
        call(&handler, enqueue(sign_digest(&digest(), &generate_key()).to_vec()));

        let response = call(&handler, enqueue(sign_digest(&digest(), &generate_key()).to_vec()));
        assert_eq!(
            response.result,
            Some(ResponseBody::Enqueued {
                block_number: 2,
                list_index: 0,
                newly_stored: false
            })
        );
        assert!(TRANSACTIONS_STORED.get() >= 1.0);
    }

    #[test]
    fn test_enqueue_then_read_back() {
        let handler = handler();
        let alice = generate_key();

        let response = call(&handler, enqueue(sign_digest(&digest(), &alice).to_vec()));
        assert_eq!(
            response.result,
            Some(ResponseBody::Enqueued {
                block_number: 1,
                list_index: 0,
                newly_stored: true
            })
        );

        let response = call(
            &handler,
            RegistryRequest::RetrieveSignatures {
                signer: address_of(&alice).into(),
                safe: SAFE.into(),
                chain_id: U256::one(),
                nonce: U256::from(5u64),
                start: 0,
                count: 10,
            },
        );
        match response.result {
            Some(ResponseBody::Signatures { items, total }) => {
                assert_eq!(total, 1);
                assert_eq!(items[0].tx_hash, HexHash::from(digest()));
            }
            other => panic!("unexpected result {other:?}"),
        }

        let response = call(
            &handler,
            RegistryRequest::RetrieveTransaction {
                digest: digest().into(),
            },
        );
        assert_eq!(
            response.result,
            Some(ResponseBody::Transaction {
                stored: true,
                transaction: transfer()
            })
        );
    }

    #[test]
    fn test_transaction_hash_matches_service() {
        let response = call(
            &handler(),
            RegistryRequest::TransactionHash {
                chain_id: U256::one(),
                safe: SAFE.into(),
                nonce: U256::from(5u64),
                transaction: transfer(),
            },
        );
        assert_eq!(
            response.result,
            Some(ResponseBody::TransactionHash {
                digest: digest().into()
            })
        );
    }

    #[test]
    fn test_malleable_signature_is_reported() {
        let handler = handler();
        let signature = malleate(&sign_digest(&digest(), &generate_key()));

        let response = call(&handler, enqueue(signature.to_vec()));
        let error = response.error.unwrap();
        assert_eq!(error.kind, ErrorKind::InvalidSignature);
        assert!(handler.container.event_bus.logs(0, u64::MAX, &EventFilter::all()).is_empty());
    }

    #[test]
    fn test_nothing_to_enqueue_is_reported() {
        let response = call(
            &handler(),
            RegistryRequest::RegisterTransaction {
                from: CALLER.into(),
                chain_id: U256::one(),
                safe: SAFE.into(),
                nonce: U256::zero(),
                struct_hash: [0x33; 32].into(),
                signature: HexBytes::default(),
                encrypted_payload: HexBytes::default(),
            },
        );
        assert_eq!(response.error.unwrap().kind, ErrorKind::NothingToEnqueue);
    }

    #[test]
    fn test_registration_is_found_through_logs() {
        let handler = handler();
        let response = call(
            &handler,
            RegistryRequest::RegisterTransaction {
                from: CALLER.into(),
                chain_id: U256::one(),
                safe: SAFE.into(),
                nonce: U256::zero(),
                struct_hash: [0x33; 32].into(),
                signature: HexBytes::default(),
                encrypted_payload: vec![0xC1, 0xFE].into(),
            },
        );
        let (block_number, uid) = match response.result {
            Some(ResponseBody::Registered {
                block_number,
                uid: Some(uid),
                ..
            }) => (block_number, uid),
            other => panic!("unexpected result {other:?}"),
        };

        let response = call(
            &handler,
            RegistryRequest::RetrieveRegistrations {
                chain_id: U256::one(),
                safe: SAFE.into(),
                nonce: U256::zero(),
                notary: CALLER.into(),
                start: 0,
                count: 1,
            },
        );
        match response.result {
            Some(ResponseBody::Registrations { items, total }) => {
                assert_eq!(total, 1);
                assert_eq!(items[0].block_number, block_number);
                assert_eq!(items[0].uid, uid);
            }
            other => panic!("unexpected result {other:?}"),
        }

        let response = call(
            &handler,
            RegistryRequest::GetLogs {
                from_block: block_number,
                to_block: block_number,
                topics: Vec::new(),
                safe: None,
                uid: Some(uid),
            },
        );
        match response.result {
            Some(ResponseBody::Logs { logs }) => {
                assert_eq!(logs.len(), 1);
                match &logs[0].event {
                    EventDto::SafeTransactionRegistered {
                        encrypted_payload, ..
                    } => assert_eq!(encrypted_payload.0, vec![0xC1, 0xFE]),
                    other => panic!("unexpected event {other:?}"),
                }
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_public_keys_with_sentinel() {
        let handler = handler();
        call(
            &handler,
            RegistryRequest::RegisterEncryptionKey {
                from: CALLER.into(),
                context: [0u8; 32].into(),
                public_key: [7u8; 32].into(),
            },
        );

        let stranger: HexAddress = [0x99; 20].into();
        let response = call(
            &handler,
            RegistryRequest::RetrieveEncryptionPublicKeys {
                signers: vec![CALLER.into(), stranger],
            },
        );
        assert_eq!(
            response.result,
            Some(ResponseBody::PublicKeys {
                keys: vec![[7u8; 32].into(), [0u8; 32].into()]
            })
        );
    }

    #[test]
    fn test_malformed_line() {
        let line = handler().handle_line("{\"method\":\"no_such_method\"}");
        let response: RegistryResponse = serde_json::from_str(&line).unwrap();
        assert_eq!(response.id, 0);
        assert_eq!(response.error.unwrap().kind, ErrorKind::InvalidRequest);
    }

    #[tokio::test]
    async fn test_serve_answers_each_line() {
        let handler = handler();
        let input = concat!(
            r#"{"id":1,"method":"retrieve_signatures_count","signer":"0x0101010101010101010101010101010101010101","safe":"0x0202020202020202020202020202020202020202","chain_id":"0x1","nonce":"0x5"}"#,
            "\n\n",
            "not json\n",
            r#"{"id":3,"method":"metrics"}"#,
            "\n",
        );
        let mut output = Vec::new();

        let served = handler.serve(input.as_bytes(), &mut output).await.unwrap();
        assert_eq!(served, 3);

        let responses: Vec<RegistryResponse> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(responses[0].result, Some(ResponseBody::Count { count: 0 }));
        assert_eq!(responses[1].error.as_ref().unwrap().kind, ErrorKind::InvalidRequest);
        assert_eq!(responses[2].id, 3);
        assert!(matches!(responses[2].result, Some(ResponseBody::Metrics { .. })));
    }
}
