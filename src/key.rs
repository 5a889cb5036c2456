//! Fixed-length keys.

use crate::error::Error;

/// Supported key lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyLen {
    /// 16-byte keys (UUIDs).
    Uuid,
    /// 20-byte keys (addresses).
    Address,
    /// 32-byte keys (content or transaction hashes).
    Hash,
}

impl KeyLen {
    /// Number of bytes in a key of this length.
    #[inline]
    pub const fn bytes(self) -> usize {
        match self {
            KeyLen::Uuid => 16,
            KeyLen::Address => 20,
            KeyLen::Hash => 32,
        }
    }
}

impl TryFrom<usize> for KeyLen {
    type Error = Error;

    fn try_from(len: usize) -> Result<Self, Error> {
        match len {
            16 => Ok(KeyLen::Uuid),
            20 => Ok(KeyLen::Address),
            32 => Ok(KeyLen::Hash),
            other => Err(Error::UnsupportedKeyLength(other)),
        }
    }
}

/// An owned copy of a key's bytes, used as the in-shard map key.
///
/// Always built by copying, so the caller is free to reuse its buffer
/// as soon as an operation returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixedKey {
    /// 16-byte key.
    Uuid([u8; 16]),
    /// 20-byte key.
    Address([u8; 20]),
    /// 32-byte key.
    Hash([u8; 32]),
}

impl FixedKey {
    /// Copy `bytes` into a key of the given length.
    pub fn copy_from(key_len: KeyLen, bytes: &[u8]) -> Result<Self, Error> {
        let mismatch = || Error::KeyLengthMismatch {
            expected: key_len.bytes(),
            actual: bytes.len(),
        };
        match key_len {
            KeyLen::Uuid => bytes.try_into().map(FixedKey::Uuid).map_err(|_| mismatch()),
            KeyLen::Address => bytes
                .try_into()
                .map(FixedKey::Address)
                .map_err(|_| mismatch()),
            KeyLen::Hash => bytes.try_into().map(FixedKey::Hash).map_err(|_| mismatch()),
        }
    }

    /// The key's bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            FixedKey::Uuid(b) => b,
            FixedKey::Address(b) => b,
            FixedKey::Hash(b) => b,
        }
    }
}

impl From<[u8; 16]> for FixedKey {
    fn from(bytes: [u8; 16]) -> Self {
        FixedKey::Uuid(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_len_from_usize() {
        assert_eq!(KeyLen::try_from(16).unwrap(), KeyLen::Uuid);
        assert_eq!(KeyLen::try_from(20).unwrap(), KeyLen::Address);
        assert_eq!(KeyLen::try_from(32).unwrap(), KeyLen::Hash);
        assert_eq!(KeyLen::try_from(24), Err(Error::UnsupportedKeyLength(24)));
        assert_eq!(KeyLen::try_from(0), Err(Error::UnsupportedKeyLength(0)));
    }

    #[test]
    fn test_copy_from_is_a_copy() {
        let mut buf = [7u8; 20];
        let key = FixedKey::copy_from(KeyLen::Address, &buf).unwrap();
        buf[0] = 0;
        assert_ne!(key.as_bytes(), &buf[..]);
        assert_eq!(key.as_bytes(), &[7u8; 20]);
    }

    #[test]
    fn test_copy_from_wrong_length() {
        let err = FixedKey::copy_from(KeyLen::Hash, &[0u8; 20]).unwrap_err();
        assert_eq!(
            err,
            Error::KeyLengthMismatch {
                expected: 32,
                actual: 20
            }
        );
    }

    #[test]
    fn test_uuid_key_matches_slice_key() {
        let bytes = [3u8; 16];
        assert_eq!(
            FixedKey::from(bytes),
            FixedKey::copy_from(KeyLen::Uuid, &bytes).unwrap()
        );
    }
}
