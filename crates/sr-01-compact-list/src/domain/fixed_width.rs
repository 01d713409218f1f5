//! # Fixed-Width Elements
//!
//! The encoding contract for values stored in a `CompactIndexedList`.

use shared_types::Hash;

/// A value with a constant encoded size.
///
/// `encode` must append exactly `WIDTH` bytes and `decode` receives exactly
/// `WIDTH` bytes. `WIDTH` must be non-zero.
pub trait FixedWidth: Sized {
    /// Encoded size in bytes.
    const WIDTH: usize;

    /// Append the encoding of `self` to `out`.
    fn encode(&self, out: &mut Vec<u8>);

    /// Decode a value from exactly `WIDTH` bytes.
    fn decode(bytes: &[u8]) -> Self;
}

macro_rules! impl_fixed_width_uint {
    ($($ty:ty),*) => {
        $(
            impl FixedWidth for $ty {
                const WIDTH: usize = std::mem::size_of::<$ty>();

                fn encode(&self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_be_bytes());
                }

                fn decode(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$ty>()];
                    buf.copy_from_slice(bytes);
                    <$ty>::from_be_bytes(buf)
                }
            }
        )*
    };
}

impl_fixed_width_uint!(u32, u64, u128);

impl FixedWidth for Hash {
    const WIDTH: usize = 32;

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self);
    }

    fn decode(bytes: &[u8]) -> Self {
        let mut hash = [0u8; 32];
        hash.copy_from_slice(bytes);
        hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u64_is_big_endian() {
        let mut out = Vec::new();
        0x0102_0304_0506_0708u64.encode(&mut out);
        assert_eq!(out, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(u64::decode(&out), 0x0102_0304_0506_0708);
    }

    #[test]
    fn test_widths() {
        assert_eq!(<u32 as FixedWidth>::WIDTH, 4);
        assert_eq!(<u128 as FixedWidth>::WIDTH, 16);
        assert_eq!(<Hash as FixedWidth>::WIDTH, 32);
    }
}
