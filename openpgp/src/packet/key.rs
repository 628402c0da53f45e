//! Public key packets.
//!
//! Key packets hold the public key material and the metadata needed
//! to compute the key's fingerprint.  Both the primary key (tag 6)
//! and subkeys (tag 14) use the same body format; the [`Packet`]
//! variant records which tag a key was framed with.
//!
//! See [Section 5.5 of RFC 4880] for details.
//!
//!   [Section 5.5 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.5

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::packet;
use crate::crypto::mpi;
use crate::types::{PublicKeyAlgorithm, Timestamp};

/// Holds a public key packet.
///
/// Version 4 is the current format; version 3 (and its version 2
/// twin) is obsolete, restricted to RSA, and carries an expiration
/// period in days.
///
/// Note: This enum cannot be exhaustively matched to allow future
/// extensions.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// A version 3 key (or its version 2 twin).
    V3(Key3),
    /// A version 4 key.
    V4(Key4),
}
assert_send_and_sync!(Key);

impl Key {
    /// Gets the version.
    pub fn version(&self) -> u8 {
        match self {
            Key::V3(k) => k.version(),
            Key::V4(_) => 4,
        }
    }

    /// Gets the key's creation time.
    pub fn creation_time(&self) -> Timestamp {
        match self {
            Key::V3(k) => k.creation_time(),
            Key::V4(k) => k.creation_time(),
        }
    }

    /// Gets the public key algorithm.
    pub fn pk_algo(&self) -> PublicKeyAlgorithm {
        match self {
            Key::V3(k) => k.pk_algo(),
            Key::V4(k) => k.pk_algo(),
        }
    }

    /// Gets the key packet's MPIs.
    pub fn mpis(&self) -> &mpi::PublicKey {
        match self {
            Key::V3(k) => k.mpis(),
            Key::V4(k) => k.mpis(),
        }
    }

    pub(crate) fn common(&self) -> &packet::Common {
        match self {
            Key::V3(k) => &k.common,
            Key::V4(k) => &k.common,
        }
    }
}

/// Holds a version 3 public key packet.
///
/// V3 keys are deprecated.  They contain an expiration period, and
/// are restricted to the RSA algorithms; the parser rejects anything
/// else.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Key3 {
    pub(crate) common: packet::Common,
    /// The version octet, 2 or 3.
    version: u8,
    /// When the key was created.
    creation_time: Timestamp,
    /// The validity period in days, 0 meaning forever.
    days_valid: u16,
    /// Public key algorithm of this signature.
    pk_algo: PublicKeyAlgorithm,
    /// Public key MPIs.
    mpis: mpi::PublicKey,
}
assert_send_and_sync!(Key3);

impl Key3 {
    /// Creates an OpenPGP public key packet.
    pub fn new(creation_time: Timestamp, days_valid: u16,
               pk_algo: PublicKeyAlgorithm, mpis: mpi::PublicKey)
               -> Self {
        Key3 {
            common: Default::default(),
            version: 3,
            creation_time,
            days_valid,
            pk_algo,
            mpis,
        }
    }

    pub(crate) fn with_common(common: packet::Common, version: u8,
                              creation_time: Timestamp, days_valid: u16,
                              pk_algo: PublicKeyAlgorithm,
                              mpis: mpi::PublicKey)
                              -> Self {
        Key3 {
            common,
            version,
            creation_time,
            days_valid,
            pk_algo,
            mpis,
        }
    }

    /// Gets the version octet.
    ///
    /// Version 2 keys are identical to version 3 keys except for the
    /// version number.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Gets the key's creation time.
    pub fn creation_time(&self) -> Timestamp {
        self.creation_time
    }

    /// Gets the validity period in days.  0 means the key never
    /// expires.
    pub fn days_valid(&self) -> u16 {
        self.days_valid
    }

    /// Gets the public key algorithm.
    pub fn pk_algo(&self) -> PublicKeyAlgorithm {
        self.pk_algo
    }

    /// Gets the key packet's MPIs.
    pub fn mpis(&self) -> &mpi::PublicKey {
        &self.mpis
    }
}

impl From<Key3> for Key {
    fn from(k: Key3) -> Self {
        Key::V3(k)
    }
}

/// Holds a version 4 public key packet.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Key4 {
    pub(crate) common: packet::Common,
    /// When the key was created.
    creation_time: Timestamp,
    /// Public key algorithm of this signature.
    pk_algo: PublicKeyAlgorithm,
    /// Public key MPIs.
    mpis: mpi::PublicKey,
}
assert_send_and_sync!(Key4);

impl Key4 {
    /// Creates an OpenPGP public key packet.
    pub fn new(creation_time: Timestamp, pk_algo: PublicKeyAlgorithm,
               mpis: mpi::PublicKey)
               -> Self {
        Key4 {
            common: Default::default(),
            creation_time,
            pk_algo,
            mpis,
        }
    }

    pub(crate) fn with_common(common: packet::Common,
                              creation_time: Timestamp,
                              pk_algo: PublicKeyAlgorithm,
                              mpis: mpi::PublicKey)
                              -> Self {
        Key4 {
            common,
            creation_time,
            pk_algo,
            mpis,
        }
    }

    /// Gets the key's creation time.
    pub fn creation_time(&self) -> Timestamp {
        self.creation_time
    }

    /// Gets the public key algorithm.
    pub fn pk_algo(&self) -> PublicKeyAlgorithm {
        self.pk_algo
    }

    /// Gets the key packet's MPIs.
    pub fn mpis(&self) -> &mpi::PublicKey {
        &self.mpis
    }
}

impl From<Key4> for Key {
    fn from(k: Key4) -> Self {
        Key::V4(k)
    }
}

#[cfg(test)]
impl Arbitrary for Key {
    fn arbitrary(g: &mut Gen) -> Self {
        if bool::arbitrary(g) {
            // V3 keys are RSA only.
            let mpis = mpi::PublicKey::RSA {
                e: mpi::MPI::arbitrary(g),
                n: mpi::MPI::arbitrary(g),
            };
            Key::V3(Key3::new(Timestamp::arbitrary(g), u16::arbitrary(g),
                              PublicKeyAlgorithm::RSAEncryptSign, mpis))
        } else {
            let mpis = mpi::PublicKey::arbitrary(g);
            let algo = mpis.algo().expect("arbitrary generates known algos");
            Key::V4(Key4::new(Timestamp::arbitrary(g), algo, mpis))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Parse;
    use crate::serialize::MarshalInto;

    quickcheck! {
        fn roundtrip(p: Key) -> bool {
            let q = Key::from_bytes(&p.to_vec().unwrap()).unwrap();
            p == q
        }
    }

    #[test]
    fn parse_v3() {
        let raw = b"\x03\
                    \x12\x34\x56\x78\
                    \xab\xcd\
                    \x01\
                    \x00\x11\x01\x42\x23\
                    \x00\x02\x03";
        let key = Key::from_bytes(raw).unwrap();
        assert_eq!(key.version(), 3);
        assert_eq!(key.creation_time(), 0x12345678.into());
        assert_eq!(key.pk_algo(), PublicKeyAlgorithm::RSAEncryptSign);
        match &key {
            Key::V3(k) => assert_eq!(k.days_valid(), 0xabcd),
            _ => panic!("expected a v3 key"),
        }

        // Test writing.
        assert_eq!(key.to_vec().unwrap(), raw);
    }

    #[test]
    fn parse_v4() {
        let raw = b"\x04\
                    \x12\x34\x56\x78\
                    \x01\
                    \x00\x11\x01\x42\x23\
                    \x00\x02\x03";
        let key = Key::from_bytes(raw).unwrap();
        assert_eq!(key.version(), 4);
        assert_eq!(key.creation_time(), 0x12345678.into());
        assert_eq!(key.pk_algo(), PublicKeyAlgorithm::RSAEncryptSign);
        match key.mpis() {
            mpi::PublicKey::RSA { n, e } => {
                assert_eq!(n.bits(), 17);
                assert_eq!(e.value(), &[0x03]);
            },
            _ => panic!("expected RSA material"),
        }

        // Test writing.
        assert_eq!(key.to_vec().unwrap(), raw);
    }

    #[test]
    fn v3_requires_rsa() {
        // DSA material under a v3 header.
        let raw = b"\x03\
                    \x12\x34\x56\x78\
                    \xab\xcd\
                    \x11\
                    \x00\x02\x03";
        assert!(Key::from_bytes(raw).is_err());
    }
}
