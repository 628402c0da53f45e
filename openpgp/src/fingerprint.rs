use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::Error;
use crate::Result;

/// A long identifier for certificates and keys.
///
/// A v4 fingerprint is a SHA-1 hash over the key's public key packet
/// as described in [Section 12.2 of RFC 4880].  This codec does not
/// compute fingerprints; it only transports them, e.g. in revocation
/// key subpackets.
///
/// Note: This enum cannot be exhaustively matched to allow future
/// extensions.
///
///   [Section 12.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-12.2
#[non_exhaustive]
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Fingerprint {
    /// A 20 byte SHA-1 hash of the public key packet as defined in
    /// the RFC.
    V4([u8; 20]),
    /// Used for holding fingerprint data of unknown length.
    Invalid(Box<[u8]>),
}
assert_send_and_sync!(Fingerprint);

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Fingerprint")
            .field(&self.to_hex())
            .finish()
    }
}

impl FromStr for Fingerprint {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl From<[u8; 20]> for Fingerprint {
    fn from(bytes: [u8; 20]) -> Self {
        Fingerprint::V4(bytes)
    }
}

impl Fingerprint {
    /// Creates a `Fingerprint` from a byte slice in big endian
    /// representation.
    pub fn from_bytes(raw: &[u8]) -> Fingerprint {
        if raw.len() == 20 {
            let mut fp: [u8; 20] = Default::default();
            fp.copy_from_slice(raw);
            Fingerprint::V4(fp)
        } else {
            Fingerprint::Invalid(raw.to_vec().into_boxed_slice())
        }
    }

    /// Creates a `Fingerprint` from a hexadecimal string.
    ///
    /// Whitespace and an optional `0x` prefix are tolerated.
    pub fn from_hex(hex: &str) -> Result<Fingerprint> {
        let bytes = crate::fmt::from_hex(hex, true)
            .ok_or_else(|| Error::InvalidArgument(
                format!("{:?} is not a valid fingerprint", hex)))?;
        Ok(Fingerprint::from_bytes(&bytes))
    }

    /// Returns the raw fingerprint as a byte slice in big endian
    /// representation.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Fingerprint::V4(ref fp) => fp,
            Fingerprint::Invalid(ref fp) => fp,
        }
    }

    /// Converts this fingerprint to its canonical hexadecimal
    /// representation.
    pub fn to_hex(&self) -> String {
        crate::fmt::to_hex(self.as_bytes(), false)
    }

    /// Returns whether this is a well-formed v4 fingerprint.
    pub fn is_valid(&self) -> bool {
        matches!(self, Fingerprint::V4(_))
    }
}

impl Borrow<[u8]> for Fingerprint {
    fn borrow(&self) -> &[u8] {
        self.as_bytes()
    }
}

#[cfg(test)]
impl Arbitrary for Fingerprint {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut fp = [0u8; 20];
        fp.iter_mut().for_each(|p| *p = Arbitrary::arbitrary(g));
        Fingerprint::V4(fp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_formatting() {
        let fp = Fingerprint::from_hex(
            "0123 4567 89AB CDEF 0123 4567 89AB CDEF 0123 4567").unwrap();
        assert!(fp.is_valid());
        assert_eq!(fp.to_hex(),
                   "0123456789ABCDEF0123456789ABCDEF01234567");
    }

    #[test]
    fn odd_length_is_invalid() {
        assert!(Fingerprint::from_hex("AB CDE").is_err());
        let fp = Fingerprint::from_bytes(&[1, 2, 3]);
        assert!(!fp.is_valid());
        assert_eq!(fp.as_bytes(), &[1, 2, 3]);
    }
}
