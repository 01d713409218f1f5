//! # ECDSA Recovery (secp256k1)
//!
//! Pure domain logic for recovering the signer of a Safe transaction digest.
//!
//! ## Security Notes
//!
//! - **Malleability Prevention (EIP-2)**: S must not exceed SECP256K1_HALF_ORDER
//! - **Scalar Range Validation**: R and S must be in [1, n-1]
//! - **Zero Address**: a recovery that yields the zero address is rejected
//! - **Constant-Time Operations**: Uses `subtle` for scalar comparisons

use super::codec::{RawSignature, SignatureScheme};
use super::errors::SignatureError;
use super::hasher::eth_signed_message_hash;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};
use shared_types::{Address, CompactSignature, Hash, ZERO_ADDRESS};
use subtle::{Choice, ConstantTimeEq};

/// secp256k1 curve order n
/// n = 0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141
const SECP256K1_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// floor(n / 2), the largest canonical S.
pub const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

/// A successfully recovered signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveredSignature {
    /// Address that produced the signature.
    pub signer: Address,
    /// The signature in storage form.
    pub signature: CompactSignature,
    /// Whether the digest was signed directly or through `eth_sign`.
    pub scheme: SignatureScheme,
}

/// Recover the signer of `digest` from a 65-byte `r ‖ s ‖ v` signature.
///
/// Validations, in order:
/// 1. length is exactly 65 bytes
/// 2. v is 27/28, or 31/32 for an `eth_sign` signature over
///    `H("\x19Ethereum Signed Message:\n32" ‖ digest)`
/// 3. R and S are in [1, n-1]
/// 4. S ≤ n/2 (EIP-2)
/// 5. public key recovery succeeds and yields a non-zero address
pub fn recover_signer(digest: &Hash, signature: &[u8]) -> Result<RecoveredSignature, SignatureError> {
    let raw = RawSignature::from_slice(signature)?;
    let (parity, scheme) = raw.recovery()?;

    let message = match scheme {
        SignatureScheme::TypedData => *digest,
        SignatureScheme::EthSign => eth_signed_message_hash(digest),
    };
    let signer = recover_address(&message, &raw.r, &raw.s, parity)?;

    Ok(RecoveredSignature {
        signer,
        signature: raw.to_compact()?,
        scheme,
    })
}

/// Recover the signer of a prehashed message from a compact signature.
pub fn recover_compact(message: &Hash, signature: &CompactSignature) -> Result<Address, SignatureError> {
    recover_address(message, &signature.r, &signature.s(), signature.parity())
}

/// Validate the scalars and recover the signing address.
fn recover_address(
    message: &Hash,
    r: &[u8; 32],
    s: &[u8; 32],
    parity: u8,
) -> Result<Address, SignatureError> {
    use zeroize::Zeroize;

    if !is_valid_scalar(r) || !is_valid_scalar(s) {
        return Err(SignatureError::InvalidFormat);
    }
    if !is_low_s(s) {
        return Err(SignatureError::MalleableSignature);
    }

    let recovery_id =
        RecoveryId::try_from(parity).map_err(|_| SignatureError::InvalidRecoveryId(parity))?;

    let mut sig_bytes = [0u8; 64];
    sig_bytes[..32].copy_from_slice(r);
    sig_bytes[32..].copy_from_slice(s);
    let parsed = Signature::from_slice(&sig_bytes);
    sig_bytes.zeroize();
    let sig = parsed.map_err(|_| SignatureError::InvalidFormat)?;

    let recovered_key = VerifyingKey::recover_from_prehash(message, &sig, recovery_id)
        .map_err(|_| SignatureError::RecoveryFailed)?;

    let address = address_from_pubkey(&recovered_key);
    if address == ZERO_ADDRESS {
        return Err(SignatureError::ZeroAddress);
    }
    Ok(address)
}

/// Keccak256 hash function.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Derive Ethereum address from public key.
pub fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let pubkey_bytes = public_key.to_encoded_point(false);
    let pubkey_slice = pubkey_bytes.as_bytes();

    // Keccak256 hash of public key (without 0x04 prefix)
    let hash = keccak256(&pubkey_slice[1..]);

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Constant-time big-endian comparison: (less, greater).
fn ct_compare(a: &[u8; 32], b: &[u8; 32]) -> (Choice, Choice) {
    let mut less = Choice::from(0u8);
    let mut greater = Choice::from(0u8);

    for i in 0..32 {
        let not_decided = !(less | greater);
        let byte_less = Choice::from((a[i] < b[i]) as u8);
        let byte_greater = Choice::from((a[i] > b[i]) as u8);

        less |= not_decided & byte_less;
        greater |= not_decided & byte_greater;
    }

    (less, greater)
}

/// Check S is at most half the curve order (EIP-2).
///
/// S equal to the half order is canonical; only S > n/2 is malleable.
pub fn is_low_s(s: &[u8; 32]) -> bool {
    let (_, greater) = ct_compare(s, &SECP256K1_HALF_ORDER);
    (!greater).into()
}

/// Check a scalar is in [1, n-1].
pub fn is_valid_scalar(scalar: &[u8; 32]) -> bool {
    let mut is_zero = Choice::from(1u8);
    for &byte in scalar {
        is_zero &= byte.ct_eq(&0u8);
    }

    let (less, _) = ct_compare(scalar, &SECP256K1_ORDER);
    (!is_zero & less).into()
}

/// s' = n - s, the malleable counterpart of `s`.
pub fn invert_s(s: &[u8; 32]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut borrow: i32 = 0;

    for i in (0..32).rev() {
        let diff = (SECP256K1_ORDER[i] as i32) - (s[i] as i32) - borrow;
        if diff < 0 {
            result[i] = (diff + 256) as u8;
            borrow = 1;
        } else {
            result[i] = diff as u8;
            borrow = 0;
        }
    }

    result
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(any(test, feature = "test-utils"))]
pub mod test_helpers {
    use super::*;
    use k256::ecdsa::SigningKey;

    /// Generate a random signing key.
    pub fn generate_key() -> SigningKey {
        SigningKey::random(&mut rand::thread_rng())
    }

    /// Address of a signing key.
    pub fn address_of(key: &SigningKey) -> Address {
        address_from_pubkey(key.verifying_key())
    }

    /// Sign a prehashed message; returns canonical `r ‖ s ‖ v` with v ∈ {27, 28}.
    pub fn sign_prehash(message: &Hash, key: &SigningKey) -> [u8; 65] {
        let (sig, recid) = key
            .sign_prehash_recoverable(message)
            .expect("signing failed");

        let sig_bytes = sig.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&sig_bytes[..32]);
        s.copy_from_slice(&sig_bytes[32..]);

        // Normalize S to low value (EIP-2), flipping the parity with it
        let (s, parity) = if is_low_s(&s) {
            (s, recid.to_byte())
        } else {
            (invert_s(&s), recid.to_byte() ^ 1)
        };

        RawSignature { r, s, v: 27 + parity }.to_bytes()
    }

    /// Sign a Safe transaction digest directly.
    pub fn sign_digest(digest: &Hash, key: &SigningKey) -> [u8; 65] {
        sign_prehash(digest, key)
    }

    /// Sign a digest through `eth_sign`; v is shifted into {31, 32}.
    pub fn sign_digest_eth(digest: &Hash, key: &SigningKey) -> [u8; 65] {
        let mut signature = sign_prehash(&eth_signed_message_hash(digest), key);
        signature[64] += 4;
        signature
    }

    /// The high-S twin of a canonical signature.
    pub fn malleate(signature: &[u8; 65]) -> [u8; 65] {
        let mut raw = RawSignature::from_slice(signature).expect("65 bytes");
        raw.s = invert_s(&raw.s);
        raw.v = if raw.v % 2 == 1 { raw.v + 1 } else { raw.v - 1 };
        raw.to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::test_helpers::*;
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_recovers_typed_data_signer() {
        let key = generate_key();
        let digest = keccak256(b"safe tx");
        let recovered = recover_signer(&digest, &sign_digest(&digest, &key)).unwrap();

        assert_eq!(recovered.signer, address_of(&key));
        assert_eq!(recovered.scheme, SignatureScheme::TypedData);
    }

    #[test]
    fn test_recovers_eth_sign_signer() {
        let key = generate_key();
        let digest = keccak256(b"safe tx");
        let signature = sign_digest_eth(&digest, &key);
        assert!(signature[64] == 31 || signature[64] == 32);

        let recovered = recover_signer(&digest, &signature).unwrap();
        assert_eq!(recovered.signer, address_of(&key));
        assert_eq!(recovered.scheme, SignatureScheme::EthSign);
    }

    #[test]
    fn test_eth_sign_without_shift_recovers_someone_else() {
        let key = generate_key();
        let digest = keccak256(b"safe tx");
        let mut signature = sign_digest_eth(&digest, &key);
        signature[64] -= 4;

        let recovered = recover_signer(&digest, &signature);
        assert_ne!(recovered.map(|r| r.signer), Ok(address_of(&key)));
    }

    #[test]
    fn test_malleable_signature_rejected() {
        let key = generate_key();
        let digest = keccak256(b"safe tx");
        let signature = sign_digest(&digest, &key);

        assert_eq!(
            recover_signer(&digest, &malleate(&signature)),
            Err(SignatureError::MalleableSignature)
        );
    }

    #[test]
    fn test_zero_scalars_rejected() {
        let digest = keccak256(b"safe tx");
        let mut signature = [0u8; 65];
        signature[64] = 27;
        assert_eq!(
            recover_signer(&digest, &signature),
            Err(SignatureError::InvalidFormat)
        );

        signature[..32].copy_from_slice(&SECP256K1_ORDER);
        signature[63] = 1;
        assert_eq!(
            recover_signer(&digest, &signature),
            Err(SignatureError::InvalidFormat)
        );
    }

    #[test]
    fn test_length_checked_first() {
        let digest = keccak256(b"safe tx");
        assert_eq!(
            recover_signer(&digest, &[0u8; 64]),
            Err(SignatureError::InvalidLength(64))
        );
    }

    #[test]
    fn test_half_order_is_canonical() {
        assert!(is_low_s(&SECP256K1_HALF_ORDER));

        let mut above = SECP256K1_HALF_ORDER;
        above[31] += 1;
        assert!(!is_low_s(&above));
    }

    #[test]
    fn test_scalar_bounds() {
        assert!(!is_valid_scalar(&[0u8; 32]));
        assert!(!is_valid_scalar(&SECP256K1_ORDER));
        assert!(is_valid_scalar(&invert_s(&[0x01; 32])));

        let mut max = SECP256K1_ORDER;
        max[31] -= 1;
        assert!(is_valid_scalar(&max));
    }

    #[test]
    fn test_compact_recovery_matches() {
        let key = generate_key();
        let digest = keccak256(b"compact");
        let recovered = recover_signer(&digest, &sign_digest(&digest, &key)).unwrap();

        assert_eq!(
            recover_compact(&digest, &recovered.signature),
            Ok(address_of(&key))
        );
    }

    #[test]
    fn test_keccak_empty() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_only_canonical_twin_accepted(message in any::<[u8; 32]>()) {
            let key = generate_key();
            let signature = sign_digest(&message, &key);

            prop_assert!(recover_signer(&message, &signature).is_ok());
            prop_assert_eq!(
                recover_signer(&message, &malleate(&signature)),
                Err(SignatureError::MalleableSignature)
            );
        }
    }
}
