use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use super::Bitfield;

/// Describes how a key may be used, and stores additional information.
///
/// Key flags are described in [Section 5.2.3.21 of RFC 4880].
///
///   [Section 5.2.3.21 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2.3.21
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyFlags(Bitfield);
assert_send_and_sync!(KeyFlags);

impl fmt::Debug for KeyFlags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.for_certification() {
            f.write_str("C")?;
        }
        if self.for_signing() {
            f.write_str("S")?;
        }
        if self.for_transport_encryption() {
            f.write_str("Et")?;
        }
        if self.for_storage_encryption() {
            f.write_str("Er")?;
        }
        if self.for_authentication() {
            f.write_str("A")?;
        }
        if self.is_split_key() {
            f.write_str("D")?;
        }
        if self.is_group_key() {
            f.write_str("G")?;
        }

        let known = KEY_FLAG_CERTIFY | KEY_FLAG_SIGN
            | KEY_FLAG_ENCRYPT_FOR_TRANSPORT | KEY_FLAG_ENCRYPT_AT_REST
            | KEY_FLAG_SPLIT_KEY | KEY_FLAG_AUTHENTICATE
            | KEY_FLAG_GROUP_KEY;
        for i in self.0.iter_set() {
            if i >= 8 || (1 << i) & known == 0 {
                write!(f, "+#{}", i)?;
            }
        }

        if self.0.padding_bytes() > 0 {
            write!(f, "+padding({} bytes)", self.0.padding_bytes())?;
        }

        Ok(())
    }
}

impl KeyFlags {
    /// Creates a new instance from `bytes`.
    pub fn new<B: AsRef<[u8]>>(bytes: B) -> Self {
        KeyFlags(bytes.as_ref().to_vec().into())
    }

    /// Returns an empty key flag set.
    pub fn empty() -> Self {
        KeyFlags::new(&[][..])
    }

    /// Returns a slice containing the raw values.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Compares two key flag sets for semantic equality, ignoring
    /// padding.
    pub fn normalized_eq(&self, other: &Self) -> bool {
        self.0.normalized_eq(&other.0)
    }

    /// This key may be used to certify other keys.
    pub fn for_certification(&self) -> bool {
        self.0.get(0)
    }

    /// Sets the certification flag.
    pub fn set_certification(mut self) -> Self {
        self.0.set(0);
        self
    }

    /// This key may be used to sign data.
    pub fn for_signing(&self) -> bool {
        self.0.get(1)
    }

    /// Sets the signing flag.
    pub fn set_signing(mut self) -> Self {
        self.0.set(1);
        self
    }

    /// This key may be used to encrypt communications.
    pub fn for_transport_encryption(&self) -> bool {
        self.0.get(2)
    }

    /// Sets the transport encryption flag.
    pub fn set_transport_encryption(mut self) -> Self {
        self.0.set(2);
        self
    }

    /// This key may be used to encrypt storage.
    pub fn for_storage_encryption(&self) -> bool {
        self.0.get(3)
    }

    /// Sets the storage encryption flag.
    pub fn set_storage_encryption(mut self) -> Self {
        self.0.set(3);
        self
    }

    /// The private component of this key may have been split by a
    /// secret-sharing mechanism.
    pub fn is_split_key(&self) -> bool {
        self.0.get(4)
    }

    /// This key may be used for authentication.
    pub fn for_authentication(&self) -> bool {
        self.0.get(5)
    }

    /// Sets the authentication flag.
    pub fn set_authentication(mut self) -> Self {
        self.0.set(5);
        self
    }

    /// The private component of this key may be in the possession of
    /// more than one person.
    pub fn is_group_key(&self) -> bool {
        self.0.get(7)
    }

    /// Returns whether no flags are set.
    pub fn is_empty(&self) -> bool {
        self.0.iter_set().next().is_none()
    }
}

const KEY_FLAG_CERTIFY: u8 = 0x01;
const KEY_FLAG_SIGN: u8 = 0x02;
const KEY_FLAG_ENCRYPT_FOR_TRANSPORT: u8 = 0x04;
const KEY_FLAG_ENCRYPT_AT_REST: u8 = 0x08;
const KEY_FLAG_SPLIT_KEY: u8 = 0x10;
const KEY_FLAG_AUTHENTICATE: u8 = 0x20;
const KEY_FLAG_GROUP_KEY: u8 = 0x80;

#[cfg(test)]
impl Arbitrary for KeyFlags {
    fn arbitrary(g: &mut Gen) -> Self {
        Self::new(Vec::arbitrary(g))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    quickcheck! {
        fn roundtrip(val: KeyFlags) -> bool {
            let q = KeyFlags::new(val.as_bytes());
            val == q
        }
    }

    #[test]
    fn set() {
        let f = KeyFlags::empty().set_certification().set_signing();
        assert!(f.for_certification());
        assert!(f.for_signing());
        assert!(!f.for_authentication());
        assert_eq!(f.as_bytes(), &[0x03]);
    }
}
