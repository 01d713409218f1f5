//! # Node Wire Surface
//!
//! Raw JSON lines through `IpcHandler` against a container built from
//! `NodeConfig`, the way the binary runs.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use registry_node::container::{StorageBackend, StorageConfig};
    use registry_node::ipc::{ErrorKind, RegistryResponse, ResponseBody};
    use registry_node::{IpcHandler, NodeConfig, RegistryContainer};
    use serde_json::json;
    use shared_types::U256;
    use sr_02_signature_verification::test_helpers::sign_digest;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn hex0x(bytes: &[u8]) -> String {
        format!("0x{}", hex::encode(bytes))
    }

    fn handler(config: NodeConfig) -> IpcHandler {
        IpcHandler::new(Arc::new(RegistryContainer::new(config).unwrap()))
    }

    fn send(handler: &IpcHandler, request: serde_json::Value) -> RegistryResponse {
        serde_json::from_str(&handler.handle_line(&request.to_string())).unwrap()
    }

    fn enqueue_line(id: u64, signature: &[u8]) -> serde_json::Value {
        json!({
            "id": id,
            "method": "enqueue_transaction",
            "from": hex0x(&RELAYER),
            "safe": hex0x(&SAFE),
            "chain_id": "0x1",
            "nonce": "0x5",
            "transaction": { "to": hex0x(&[0x11; 20]), "value": "0x3e8" },
            "signature": hex0x(signature),
        })
    }

    #[test]
    fn enqueue_count_and_logs_over_json() {
        let handler = handler(NodeConfig::default());
        let alice = generate_key();
        let tx_digest = digest(U256::one(), SAFE, &transfer(1_000), U256::from(5u64));

        let response = send(&handler, enqueue_line(1, &sign_digest(&tx_digest, &alice)));
        assert_eq!(response.id, 1);
        assert_eq!(
            response.result,
            Some(ResponseBody::Enqueued {
                block_number: 1,
                list_index: 0,
                newly_stored: true
            })
        );

        let response = send(
            &handler,
            json!({
                "id": 2,
                "method": "retrieve_signatures_count",
                "signer": hex0x(&address_of(&alice)),
                "safe": hex0x(&SAFE),
                "chain_id": "0x1",
                "nonce": "0x5",
            }),
        );
        assert_eq!(response.result, Some(ResponseBody::Count { count: 1 }));

        let response = send(
            &handler,
            json!({ "id": 3, "method": "get_logs", "from_block": 1, "to_block": 1 }),
        );
        match response.result {
            Some(ResponseBody::Logs { logs }) => {
                // TransactionStored precedes SignatureStored within the call
                assert_eq!(logs.len(), 2);
                assert_eq!(logs[0].log_index, 0);
                assert_eq!(logs[1].log_index, 1);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn wrong_length_signature_is_an_error_line() {
        let handler = handler(NodeConfig::default());
        let response = send(&handler, enqueue_line(9, &[0u8; 64]));

        assert_eq!(response.id, 9);
        assert!(response.result.is_none());
        assert_eq!(response.error.unwrap().kind, ErrorKind::InvalidSignature);
    }

    #[test]
    fn file_backend_state_survives_restart() {
        let dir = TempDir::new().unwrap();
        let config = NodeConfig {
            storage: StorageConfig {
                backend: StorageBackend::File,
                data_dir: dir.path().to_path_buf(),
            },
            ..NodeConfig::default()
        };
        let alice = generate_key();
        let tx_digest = digest(U256::one(), SAFE, &transfer(1_000), U256::from(5u64));

        {
            let handler = handler(config.clone());
            let response = send(&handler, enqueue_line(1, &sign_digest(&tx_digest, &alice)));
            assert!(response.error.is_none());
        }

        let handler = handler(config);
        let response = send(
            &handler,
            json!({
                "id": 2,
                "method": "retrieve_transaction",
                "digest": hex0x(&tx_digest),
            }),
        );
        match response.result {
            Some(ResponseBody::Transaction { stored, transaction }) => {
                assert!(stored);
                assert_eq!(transaction.value, U256::from(1_000u64));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }
}
