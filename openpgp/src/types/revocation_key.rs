use crate::Error;
use crate::Fingerprint;
use crate::Result;
use crate::types::PublicKeyAlgorithm;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

/// Designates a key as a valid third-party revoker.
///
/// This is described in [Section 5.2.3.15 of RFC 4880].
///
///   [Section 5.2.3.15 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2.3.15
///
/// The class octet is preserved verbatim: bit 0x80 must be set, bit
/// 0x40 marks the relationship as sensitive, and the remaining bits
/// are reserved.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RevocationKey {
    /// The class octet.
    pub(crate) class: u8,

    /// The public key algorithm of the authorized key.
    pub(crate) pk_algo: PublicKeyAlgorithm,

    /// Fingerprint of authorized key.
    pub(crate) fp: Fingerprint,
}
assert_send_and_sync!(RevocationKey);

impl RevocationKey {
    /// The mask covering the reserved bits of the class octet.
    pub const CLASS_MUST_BE_SET: u8 = 0x80;

    /// The class bit marking the relationship as sensitive.
    pub const CLASS_SENSITIVE: u8 = 0x40;

    /// Creates a new instance.
    pub fn new(pk_algo: PublicKeyAlgorithm, fp: Fingerprint, sensitive: bool)
               -> Self
    {
        let class = Self::CLASS_MUST_BE_SET
            | if sensitive { Self::CLASS_SENSITIVE } else { 0 };
        RevocationKey { class, pk_algo, fp }
    }

    /// Creates a new instance from the raw class octet.
    pub fn from_raw(class: u8, pk_algo: PublicKeyAlgorithm, fp: Fingerprint)
                    -> Result<Self>
    {
        if class & Self::CLASS_MUST_BE_SET == 0 {
            return Err(Error::InvalidArgument(
                format!("revocation key class octet 0x{:02x} lacks bit 0x80",
                        class)).into());
        }
        Ok(RevocationKey { class, pk_algo, fp })
    }

    /// Returns the class octet, verbatim.
    pub fn class(&self) -> u8 {
        self.class
    }

    /// Returns the revoker's identity.
    pub fn revoker(&self) -> (PublicKeyAlgorithm, &Fingerprint) {
        (self.pk_algo, &self.fp)
    }

    /// Returns whether or not the relation between revoker and
    /// revokee is of a sensitive nature.
    pub fn sensitive(&self) -> bool {
        self.class & Self::CLASS_SENSITIVE > 0
    }
}

#[cfg(test)]
impl Arbitrary for RevocationKey {
    fn arbitrary(g: &mut Gen) -> Self {
        RevocationKey::new(PublicKeyAlgorithm::arbitrary(g),
                           Fingerprint::arbitrary(g),
                           bool::arbitrary(g))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_checked() {
        let fp = Fingerprint::from_bytes(&[7; 20]);
        assert!(RevocationKey::from_raw(0x00, PublicKeyAlgorithm::DSA,
                                        fp.clone()).is_err());
        let rk = RevocationKey::from_raw(0xc0, PublicKeyAlgorithm::DSA, fp)
            .unwrap();
        assert!(rk.sensitive());
        assert_eq!(rk.class(), 0xc0);
    }
}
