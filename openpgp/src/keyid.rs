use std::fmt;
use std::str::FromStr;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::Error;
use crate::Fingerprint;
use crate::Result;

/// A short identifier for certificates and keys.
///
/// A `KeyID` identifies a public key.  It is used, for example, in
/// issuer subpackets and v3 signatures to reference the alleged
/// signing key.  For v4 keys the key id is defined as the lower 8
/// bytes of the key's fingerprint ([Section 12.2 of RFC 4880]).
///
/// Note: This enum cannot be exhaustively matched to allow future
/// extensions.
///
///   [Section 12.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-12.2
#[non_exhaustive]
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyID {
    /// Lower 8 byte SHA-1 hash.
    V4([u8; 8]),
    /// Used for holding identifiers of unknown length.
    Invalid(Box<[u8]>),
}
assert_send_and_sync!(KeyID);

impl fmt::Display for KeyID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for KeyID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("KeyID")
            .field(&self.to_hex())
            .finish()
    }
}

impl FromStr for KeyID {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl From<u64> for KeyID {
    fn from(id: u64) -> Self {
        KeyID::V4(id.to_be_bytes())
    }
}

impl From<&KeyID> for u64 {
    fn from(id: &KeyID) -> Self {
        match id {
            KeyID::V4(bytes) => u64::from_be_bytes(*bytes),
            KeyID::Invalid(_) => 0,
        }
    }
}

impl From<&Fingerprint> for KeyID {
    fn from(fp: &Fingerprint) -> Self {
        match fp {
            Fingerprint::V4(fp) =>
                KeyID::from_bytes(&fp[fp.len() - 8..]),
            Fingerprint::Invalid(fp) =>
                KeyID::Invalid(fp.clone()),
        }
    }
}

impl KeyID {
    /// Creates a `KeyID` from a byte slice in big endian
    /// representation.
    pub fn from_bytes(raw: &[u8]) -> KeyID {
        if raw.len() == 8 {
            let mut keyid: [u8; 8] = Default::default();
            keyid.copy_from_slice(raw);
            KeyID::V4(keyid)
        } else {
            KeyID::Invalid(raw.to_vec().into_boxed_slice())
        }
    }

    /// Creates a `KeyID` from a hexadecimal string.
    ///
    /// Whitespace and an optional `0x` prefix are tolerated.
    pub fn from_hex(hex: &str) -> Result<KeyID> {
        let bytes = crate::fmt::from_hex(hex, true)
            .ok_or_else(|| Error::InvalidArgument(
                format!("{:?} is not a valid key ID", hex)))?;
        Ok(KeyID::from_bytes(&bytes))
    }

    /// Returns the raw key id as a byte slice in big endian
    /// representation.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            KeyID::V4(ref id) => id,
            KeyID::Invalid(ref id) => id,
        }
    }

    /// Converts this key id to its canonical hexadecimal
    /// representation.
    pub fn to_hex(&self) -> String {
        crate::fmt::to_hex(self.as_bytes(), false)
    }

    /// Returns whether this is the wildcard key id, all zeros.
    pub fn is_wildcard(&self) -> bool {
        self.as_bytes().iter().all(|b| *b == 0)
    }

    /// Returns whether this is a well-formed 8-octet key id.
    pub fn is_valid(&self) -> bool {
        matches!(self, KeyID::V4(_))
    }
}

#[cfg(test)]
impl Arbitrary for KeyID {
    fn arbitrary(g: &mut Gen) -> Self {
        KeyID::from(u64::arbitrary(g))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let id = KeyID::from_hex("D03F 6F86 5226 FE8B").unwrap();
        assert_eq!(id.to_hex(), "D03F6F865226FE8B");
        assert_eq!(u64::from(&id), 0xD03F6F865226FE8Bu64);
    }

    #[test]
    fn from_fingerprint() {
        let fp = Fingerprint::from_hex(
            "3E8877C877274692975189F5D03F6F865226FE8B").unwrap();
        assert_eq!(KeyID::from(&fp).to_hex(), "D03F6F865226FE8B");
    }

    #[test]
    fn wildcard() {
        assert!(KeyID::from(0u64).is_wildcard());
        assert!(!KeyID::from(1u64).is_wildcard());
    }
}
