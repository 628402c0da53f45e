//! Elliptic curves.

use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

/// Elliptic curves used in OpenPGP.
///
/// [RFC 6637] specifies how the NIST curves are embedded into
/// OpenPGP; EdDSA and Curve25519 are embedded the same way.  A curve
/// is identified on the wire by the content octets of its ASN.1
/// object identifier, prefixed with a one-octet length.  The length
/// octets 0 and 0xFF are reserved for future extensions and are
/// rejected by the parser.
///
///   [RFC 6637]: https://tools.ietf.org/html/rfc6637
#[non_exhaustive]
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Curve {
    /// NIST curve P-256.
    NistP256,
    /// NIST curve P-384.
    NistP384,
    /// NIST curve P-521.
    NistP521,
    /// brainpoolP256r1.
    BrainpoolP256,
    /// brainpoolP384r1.
    BrainpoolP384,
    /// brainpoolP512r1.
    BrainpoolP512,
    /// D.J. Bernstein's "Twisted" Edwards curve Ed25519.
    Ed25519,
    /// Elliptic curve Diffie-Hellman using D.J. Bernstein's
    /// Curve25519.
    Cv25519,
    /// Unknown curve.
    Unknown(Box<[u8]>),
}
assert_send_and_sync!(Curve);

const NIST_P256_OID: &[u8] =
    &[0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x03, 0x01, 0x07];
const NIST_P384_OID: &[u8] = &[0x2B, 0x81, 0x04, 0x00, 0x22];
const NIST_P521_OID: &[u8] = &[0x2B, 0x81, 0x04, 0x00, 0x23];
const BRAINPOOL_P256_OID: &[u8] =
    &[0x2B, 0x24, 0x03, 0x03, 0x02, 0x08, 0x01, 0x01, 0x07];
const BRAINPOOL_P384_OID: &[u8] =
    &[0x2B, 0x24, 0x03, 0x03, 0x02, 0x08, 0x01, 0x01, 0x0B];
const BRAINPOOL_P512_OID: &[u8] =
    &[0x2B, 0x24, 0x03, 0x03, 0x02, 0x08, 0x01, 0x01, 0x0D];
const ED25519_OID: &[u8] =
    &[0x2B, 0x06, 0x01, 0x04, 0x01, 0xDA, 0x47, 0x0F, 0x01];
const CV25519_OID: &[u8] =
    &[0x2B, 0x06, 0x01, 0x04, 0x01, 0x97, 0x55, 0x01, 0x05, 0x01];

impl Curve {
    /// Parses the given OID.
    pub fn from_oid(oid: &[u8]) -> Curve {
        // Match on OIDs, see section 11 of RFC6637.
        match oid {
            NIST_P256_OID => Curve::NistP256,
            NIST_P384_OID => Curve::NistP384,
            NIST_P521_OID => Curve::NistP521,
            BRAINPOOL_P256_OID => Curve::BrainpoolP256,
            BRAINPOOL_P384_OID => Curve::BrainpoolP384,
            BRAINPOOL_P512_OID => Curve::BrainpoolP512,
            ED25519_OID => Curve::Ed25519,
            CV25519_OID => Curve::Cv25519,
            oid => Curve::Unknown(Vec::from(oid).into_boxed_slice()),
        }
    }

    /// Returns this curve's OID.
    pub fn oid(&self) -> &[u8] {
        match self {
            Curve::NistP256 => NIST_P256_OID,
            Curve::NistP384 => NIST_P384_OID,
            Curve::NistP521 => NIST_P521_OID,
            Curve::BrainpoolP256 => BRAINPOOL_P256_OID,
            Curve::BrainpoolP384 => BRAINPOOL_P384_OID,
            Curve::BrainpoolP512 => BRAINPOOL_P512_OID,
            Curve::Ed25519 => ED25519_OID,
            Curve::Cv25519 => CV25519_OID,
            Curve::Unknown(oid) => oid,
        }
    }

    /// Returns the length of a coordinate in bits.
    ///
    /// Returns `None` for unknown curves.
    pub fn bits(&self) -> Option<usize> {
        use self::Curve::*;
        match self {
            NistP256 => Some(256),
            NistP384 => Some(384),
            NistP521 => Some(521),
            BrainpoolP256 => Some(256),
            BrainpoolP384 => Some(384),
            BrainpoolP512 => Some(512),
            Ed25519 => Some(256),
            Cv25519 => Some(256),
            Unknown(_) => None,
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::Curve::*;

        if f.alternate() {
            let hex = crate::fmt::to_hex(self.oid(), false);
            match self {
                NistP256 => write!(f, "NIST curve P-256 (OID: {})", hex),
                NistP384 => write!(f, "NIST curve P-384 (OID: {})", hex),
                NistP521 => write!(f, "NIST curve P-521 (OID: {})", hex),
                BrainpoolP256 => write!(f, "brainpoolP256r1 (OID: {})", hex),
                BrainpoolP384 => write!(f, "brainpoolP384r1 (OID: {})", hex),
                BrainpoolP512 => write!(f, "brainpoolP512r1 (OID: {})", hex),
                Ed25519 => write!(f, "D.J. Bernstein's \"Twisted\" Edwards curve Ed25519 (OID: {})", hex),
                Cv25519 => write!(f, "Bernstein's Curve25519 (OID: {})", hex),
                Unknown(_) => write!(f, "Unknown curve (OID: {})", hex),
            }
        } else {
            match self {
                NistP256 => f.write_str("NIST P-256"),
                NistP384 => f.write_str("NIST P-384"),
                NistP521 => f.write_str("NIST P-521"),
                BrainpoolP256 => f.write_str("brainpoolP256r1"),
                BrainpoolP384 => f.write_str("brainpoolP384r1"),
                BrainpoolP512 => f.write_str("brainpoolP512r1"),
                Ed25519 => f.write_str("Ed25519"),
                Cv25519 => f.write_str("Curve25519"),
                Unknown(_) =>
                    write!(f, "Unknown curve {}",
                           crate::fmt::to_hex(self.oid(), false)),
            }
        }
    }
}

impl fmt::Debug for Curve {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:#}", self)
    }
}

#[cfg(test)]
impl Arbitrary for Curve {
    fn arbitrary(g: &mut Gen) -> Self {
        match u8::arbitrary(g) % 9 {
            0 => Curve::NistP256,
            1 => Curve::NistP384,
            2 => Curve::NistP521,
            3 => Curve::BrainpoolP256,
            4 => Curve::BrainpoolP384,
            5 => Curve::BrainpoolP512,
            6 => Curve::Ed25519,
            7 => Curve::Cv25519,
            8 => {
                // An unknown OID, short and not colliding with the
                // known ones.
                let mut oid = vec![0x2B];
                for _ in 0..(u8::arbitrary(g) % 6) {
                    oid.push(u8::arbitrary(g));
                }
                Curve::Unknown(oid.into_boxed_slice())
            },
            _ => unreachable!(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    quickcheck! {
        fn oid_roundtrip(curve: Curve) -> bool {
            curve == Curve::from_oid(curve.oid())
        }
    }

    #[test]
    fn known_oids() {
        assert_eq!(Curve::from_oid(NIST_P256_OID), Curve::NistP256);
        assert_eq!(Curve::from_oid(&[0x2B, 0x2B]),
                   Curve::Unknown(vec![0x2B, 0x2B].into_boxed_slice()));
    }
}
