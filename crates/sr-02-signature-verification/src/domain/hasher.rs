//! # Domain Hasher
//!
//! EIP-712 hashing of Safe transactions.
//!
//! The domain is bound to the Safe and chain the transaction targets, not to
//! the registry that stores it, so the same digest is valid wherever the
//! transaction is proposed.
//!
//! ```text
//! domain     = H(DOMAIN_TYPEHASH ‖ chainId ‖ safe)
//! structHash = H(SAFE_TX_TYPEHASH ‖ to ‖ value ‖ H(data) ‖ operation ‖
//!                safeTxGas ‖ baseGas ‖ gasPrice ‖ gasToken ‖
//!                refundReceiver ‖ nonce)
//! digest     = H(0x19 ‖ 0x01 ‖ domain ‖ structHash)
//! ```
//!
//! Every input is a 32-byte ABI word.

use super::ecdsa::keccak256;
use shared_types::{Address, Hash, SafeTransaction, U256};

/// `keccak256("EIP712Domain(uint256 chainId,address verifyingContract)")`
pub const DOMAIN_TYPEHASH: Hash = [
    0x47, 0xe7, 0x95, 0x34, 0xa2, 0x45, 0x95, 0x2e, 0x8b, 0x16, 0x89, 0x3a, 0x33, 0x6b, 0x85, 0xa3,
    0xd9, 0xea, 0x9f, 0xa8, 0xc5, 0x73, 0xf3, 0xd8, 0x03, 0xaf, 0xb9, 0x2a, 0x79, 0x46, 0x92, 0x18,
];

/// `keccak256("SafeTx(address to,uint256 value,bytes data,uint8 operation,uint256 safeTxGas,uint256 baseGas,uint256 gasPrice,address gasToken,address refundReceiver,uint256 nonce)")`
pub const SAFE_TX_TYPEHASH: Hash = [
    0xbb, 0x83, 0x10, 0xd4, 0x86, 0x36, 0x8d, 0xb6, 0xbd, 0x6f, 0x84, 0x94, 0x02, 0xfd, 0xd7, 0x3a,
    0xd5, 0x3d, 0x31, 0x6b, 0x5a, 0x4b, 0x26, 0x44, 0xad, 0x6e, 0xfe, 0x0f, 0x94, 0x12, 0x86, 0xd8,
];

const ETH_SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Left-pad an address into an ABI word.
pub fn address_word(address: &Address) -> Hash {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address);
    word
}

/// Big-endian ABI word of a uint256.
pub fn uint_word(value: U256) -> Hash {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}

/// Hash the concatenation of ABI words.
pub fn hash_words(words: &[Hash]) -> Hash {
    let mut buf = Vec::with_capacity(words.len() * 32);
    for word in words {
        buf.extend_from_slice(word);
    }
    keccak256(&buf)
}

/// The hash a signer produces when signing `digest` through `eth_sign`.
pub fn eth_signed_message_hash(digest: &Hash) -> Hash {
    let mut buf = Vec::with_capacity(ETH_SIGNED_MESSAGE_PREFIX.len() + 32);
    buf.extend_from_slice(ETH_SIGNED_MESSAGE_PREFIX);
    buf.extend_from_slice(digest);
    keccak256(&buf)
}

/// Hasher bound to one `(chainId, safe)` domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainHasher {
    chain_id: U256,
    safe: Address,
    separator: Hash,
}

impl DomainHasher {
    /// Bind a hasher to the Safe at `safe` on `chain_id`.
    pub fn new(chain_id: U256, safe: Address) -> Self {
        let separator = hash_words(&[DOMAIN_TYPEHASH, uint_word(chain_id), address_word(&safe)]);
        Self {
            chain_id,
            safe,
            separator,
        }
    }

    pub fn chain_id(&self) -> U256 {
        self.chain_id
    }

    pub fn safe(&self) -> Address {
        self.safe
    }

    /// The EIP-712 domain separator.
    pub fn domain_separator(&self) -> Hash {
        self.separator
    }

    /// Struct hash of a Safe transaction at `nonce`.
    pub fn struct_hash(tx: &SafeTransaction, nonce: U256) -> Hash {
        hash_words(&[
            SAFE_TX_TYPEHASH,
            address_word(&tx.to),
            uint_word(tx.value),
            keccak256(&tx.data),
            uint_word(U256::from(tx.operation.as_u8())),
            uint_word(tx.safe_tx_gas),
            uint_word(tx.base_gas),
            uint_word(tx.gas_price),
            address_word(&tx.gas_token),
            address_word(&tx.refund_receiver),
            uint_word(nonce),
        ])
    }

    /// `H(0x1901 ‖ domain ‖ structHash)`.
    pub fn typed_data_hash(&self, struct_hash: &Hash) -> Hash {
        let mut buf = [0u8; 66];
        buf[0] = 0x19;
        buf[1] = 0x01;
        buf[2..34].copy_from_slice(&self.separator);
        buf[34..].copy_from_slice(struct_hash);
        keccak256(&buf)
    }

    /// The digest signers sign and the transaction store is keyed by.
    pub fn transaction_hash(&self, tx: &SafeTransaction, nonce: U256) -> Hash {
        self.typed_data_hash(&Self::struct_hash(tx, nonce))
    }
}
