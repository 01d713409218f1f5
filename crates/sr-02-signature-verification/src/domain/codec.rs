//! # Signature Codec
//!
//! Conversions between the 65-byte `r ‖ s ‖ v` form signers submit and the
//! 64-byte compact `(r, vs)` form the ledgers store.
//!
//! The compact form keeps the y-parity but not the signing scheme: a
//! signature submitted with `v ∈ {31, 32}` expands back with `v ∈ {27, 28}`.

use super::errors::SignatureError;
use shared_types::CompactSignature;

/// How the signer produced the signature, as told by `v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureScheme {
    /// Signed the typed-data digest directly (`v ∈ {27, 28}`).
    TypedData,
    /// Signed the digest through `eth_sign` (`v ∈ {31, 32}`).
    EthSign,
}

/// A signature in submitted `r ‖ s ‖ v` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub v: u8,
}

impl RawSignature {
    /// Encoded length in bytes.
    pub const LENGTH: usize = 65;

    /// Split `r ‖ s ‖ v`. Any length other than 65 is rejected.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SignatureError> {
        if bytes.len() != Self::LENGTH {
            return Err(SignatureError::InvalidLength(bytes.len()));
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Self { r, s, v: bytes[64] })
    }

    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.v;
        out
    }

    /// Recovery parity and signing scheme encoded in `v`.
    pub fn recovery(&self) -> Result<(u8, SignatureScheme), SignatureError> {
        match self.v {
            27 | 28 => Ok((self.v - 27, SignatureScheme::TypedData)),
            31 | 32 => Ok((self.v - 31, SignatureScheme::EthSign)),
            other => Err(SignatureError::InvalidRecoveryId(other)),
        }
    }

    /// Fold into compact form. `s` must already be canonical.
    pub fn to_compact(&self) -> Result<CompactSignature, SignatureError> {
        let (parity, _) = self.recovery()?;
        if self.s[0] & 0x80 != 0 {
            return Err(SignatureError::MalleableSignature);
        }
        let mut vs = self.s;
        vs[0] |= parity << 7;
        Ok(CompactSignature { r: self.r, vs })
    }
}

impl From<&CompactSignature> for RawSignature {
    fn from(signature: &CompactSignature) -> Self {
        Self {
            r: signature.r,
            s: signature.s(),
            v: signature.v(),
        }
    }
}
