//! Signature packets.
//!
//! Signature packets are used both for certification purposes as
//! well as for document signing purposes.  See [Section 5.2 of RFC
//! 4880] for details.
//!
//!   [Section 5.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::KeyID;
use crate::crypto::mpi;
use crate::packet;
use crate::types::{HashAlgorithm, PublicKeyAlgorithm, SignatureType,
                   Timestamp};

pub mod subpacket;
pub use subpacket::{Subpacket, SubpacketArea, SubpacketTag, SubpacketValue};

/// Holds a signature packet.
///
/// Note: This enum cannot be exhaustively matched to allow future
/// extensions.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Signature {
    /// A version 3 signature (or its version 2 twin).
    V3(Signature3),
    /// A version 4 signature.
    V4(Signature4),
}
assert_send_and_sync!(Signature);

impl Signature {
    /// Gets the version.
    pub fn version(&self) -> u8 {
        match self {
            Signature::V3(s) => s.version(),
            Signature::V4(_) => 4,
        }
    }

    /// Gets the signature type.
    pub fn typ(&self) -> SignatureType {
        match self {
            Signature::V3(s) => s.typ(),
            Signature::V4(s) => s.typ(),
        }
    }

    /// Gets the public key algorithm.
    pub fn pk_algo(&self) -> PublicKeyAlgorithm {
        match self {
            Signature::V3(s) => s.pk_algo(),
            Signature::V4(s) => s.pk_algo(),
        }
    }

    /// Gets the hash algorithm.
    pub fn hash_algo(&self) -> HashAlgorithm {
        match self {
            Signature::V3(s) => s.hash_algo(),
            Signature::V4(s) => s.hash_algo(),
        }
    }

    /// Gets the left 16 bits of the signed hash value.
    pub fn digest_prefix(&self) -> &[u8; 2] {
        match self {
            Signature::V3(s) => s.digest_prefix(),
            Signature::V4(s) => s.digest_prefix(),
        }
    }

    /// Gets the signature packet's MPIs.
    pub fn mpis(&self) -> &mpi::Signature {
        match self {
            Signature::V3(s) => s.mpis(),
            Signature::V4(s) => s.mpis(),
        }
    }

    pub(crate) fn common(&self) -> &packet::Common {
        match self {
            Signature::V3(s) => &s.common,
            Signature::V4(s) => &s.common,
        }
    }
}

impl From<Signature> for crate::Packet {
    fn from(s: Signature) -> Self {
        crate::Packet::Signature(s)
    }
}

/// Holds a version 3 signature packet.
///
/// V3 signatures are deprecated.  The signed metadata (signature
/// type, creation time, and issuer) is carried in fixed fields
/// instead of subpackets.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature3 {
    pub(crate) common: packet::Common,
    /// The version octet, 2 or 3.
    version: u8,
    /// Type of signature.
    typ: SignatureType,
    /// When the signature was made.
    creation_time: Timestamp,
    /// The key that allegedly made the signature.
    issuer: KeyID,
    /// Public key algorithm used for this signature.
    pk_algo: PublicKeyAlgorithm,
    /// Hash algorithm used to compute the signature.
    hash_algo: HashAlgorithm,
    /// Lower 16 bits of the signed hash value.
    digest_prefix: [u8; 2],
    /// Signature MPIs.
    mpis: mpi::Signature,
}
assert_send_and_sync!(Signature3);

impl Signature3 {
    /// Creates a new signature packet.
    #[allow(clippy::too_many_arguments)]
    pub fn new(typ: SignatureType, creation_time: Timestamp, issuer: KeyID,
               pk_algo: PublicKeyAlgorithm, hash_algo: HashAlgorithm,
               digest_prefix: [u8; 2], mpis: mpi::Signature)
               -> Self {
        Signature3 {
            common: Default::default(),
            version: 3,
            typ,
            creation_time,
            issuer,
            pk_algo,
            hash_algo,
            digest_prefix,
            mpis,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn with_common(common: packet::Common, version: u8,
                              typ: SignatureType, creation_time: Timestamp,
                              issuer: KeyID, pk_algo: PublicKeyAlgorithm,
                              hash_algo: HashAlgorithm,
                              digest_prefix: [u8; 2], mpis: mpi::Signature)
                              -> Self {
        Signature3 {
            common,
            version,
            typ,
            creation_time,
            issuer,
            pk_algo,
            hash_algo,
            digest_prefix,
            mpis,
        }
    }

    /// Gets the version octet.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Gets the signature type.
    pub fn typ(&self) -> SignatureType {
        self.typ
    }

    /// Gets the signature's creation time.
    pub fn creation_time(&self) -> Timestamp {
        self.creation_time
    }

    /// Gets the id of the key that allegedly made the signature.
    pub fn issuer(&self) -> &KeyID {
        &self.issuer
    }

    /// Gets the public key algorithm.
    pub fn pk_algo(&self) -> PublicKeyAlgorithm {
        self.pk_algo
    }

    /// Gets the hash algorithm.
    pub fn hash_algo(&self) -> HashAlgorithm {
        self.hash_algo
    }

    /// Gets the left 16 bits of the signed hash value.
    pub fn digest_prefix(&self) -> &[u8; 2] {
        &self.digest_prefix
    }

    /// Gets the signature packet's MPIs.
    pub fn mpis(&self) -> &mpi::Signature {
        &self.mpis
    }
}

impl From<Signature3> for Signature {
    fn from(s: Signature3) -> Self {
        Signature::V3(s)
    }
}

/// Holds a version 4 signature packet.
///
/// The signed metadata lives in two subpacket areas.  The hashed
/// area is protected by the signature; the unhashed area is not and
/// must be treated with suspicion.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature4 {
    pub(crate) common: packet::Common,
    /// Type of signature.
    typ: SignatureType,
    /// Public key algorithm used for this signature.
    pk_algo: PublicKeyAlgorithm,
    /// Hash algorithm used to compute the signature.
    hash_algo: HashAlgorithm,
    /// Subpackets that are part of the signature.
    hashed_area: SubpacketArea,
    /// Subpackets that are not part of the signature.
    unhashed_area: SubpacketArea,
    /// Lower 16 bits of the signed hash value.
    digest_prefix: [u8; 2],
    /// Signature MPIs.
    mpis: mpi::Signature,
}
assert_send_and_sync!(Signature4);

impl Signature4 {
    /// Creates a new signature packet.
    #[allow(clippy::too_many_arguments)]
    pub fn new(typ: SignatureType, pk_algo: PublicKeyAlgorithm,
               hash_algo: HashAlgorithm, hashed_area: SubpacketArea,
               unhashed_area: SubpacketArea, digest_prefix: [u8; 2],
               mpis: mpi::Signature)
               -> Self {
        Signature4 {
            common: Default::default(),
            typ,
            pk_algo,
            hash_algo,
            hashed_area,
            unhashed_area,
            digest_prefix,
            mpis,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn with_common(common: packet::Common, typ: SignatureType,
                              pk_algo: PublicKeyAlgorithm,
                              hash_algo: HashAlgorithm,
                              hashed_area: SubpacketArea,
                              unhashed_area: SubpacketArea,
                              digest_prefix: [u8; 2], mpis: mpi::Signature)
                              -> Self {
        Signature4 {
            common,
            typ,
            pk_algo,
            hash_algo,
            hashed_area,
            unhashed_area,
            digest_prefix,
            mpis,
        }
    }

    /// Gets the signature type.
    pub fn typ(&self) -> SignatureType {
        self.typ
    }

    /// Gets the public key algorithm.
    pub fn pk_algo(&self) -> PublicKeyAlgorithm {
        self.pk_algo
    }

    /// Gets the hash algorithm.
    pub fn hash_algo(&self) -> HashAlgorithm {
        self.hash_algo
    }

    /// Gets a reference to the hashed area.
    pub fn hashed_area(&self) -> &SubpacketArea {
        &self.hashed_area
    }

    /// Gets a mutable reference to the hashed area.
    pub fn hashed_area_mut(&mut self) -> &mut SubpacketArea {
        &mut self.hashed_area
    }

    /// Gets a reference to the unhashed area.
    pub fn unhashed_area(&self) -> &SubpacketArea {
        &self.unhashed_area
    }

    /// Gets a mutable reference to the unhashed area.
    pub fn unhashed_area_mut(&mut self) -> &mut SubpacketArea {
        &mut self.unhashed_area
    }

    /// Gets the left 16 bits of the signed hash value.
    pub fn digest_prefix(&self) -> &[u8; 2] {
        &self.digest_prefix
    }

    /// Gets the signature packet's MPIs.
    pub fn mpis(&self) -> &mpi::Signature {
        &self.mpis
    }

    /// Gets the signature's creation time from the hashed area, if
    /// present.
    pub fn signature_creation_time(&self) -> Option<Timestamp> {
        self.hashed_area.subpacket(SubpacketTag::SignatureCreationTime)
            .and_then(|sp| match sp.value() {
                SubpacketValue::SignatureCreationTime(t) => Some(*t),
                _ => None,
            })
    }

    /// Gets the issuer's key id, looking at both areas.
    pub fn issuer(&self) -> Option<&KeyID> {
        self.hashed_area.subpacket(SubpacketTag::Issuer)
            .or_else(|| self.unhashed_area.subpacket(SubpacketTag::Issuer))
            .and_then(|sp| match sp.value() {
                SubpacketValue::Issuer(id) => Some(id),
                _ => None,
            })
    }
}

impl From<Signature4> for Signature {
    fn from(s: Signature4) -> Self {
        Signature::V4(s)
    }
}

#[cfg(test)]
impl Arbitrary for Signature {
    fn arbitrary(g: &mut Gen) -> Self {
        if bool::arbitrary(g) {
            let (pk_algo, mpis) = arbitrary_signature_mpis(g);
            Signature::V3(Signature3::new(
                SignatureType::arbitrary(g),
                Timestamp::arbitrary(g),
                KeyID::arbitrary(g),
                pk_algo,
                HashAlgorithm::arbitrary(g),
                [u8::arbitrary(g), u8::arbitrary(g)],
                mpis))
        } else {
            Signature::V4(Signature4::arbitrary(g))
        }
    }
}

#[cfg(test)]
impl Arbitrary for Signature4 {
    fn arbitrary(g: &mut Gen) -> Self {
        let (pk_algo, mpis) = arbitrary_signature_mpis(g);
        Signature4::new(
            SignatureType::arbitrary(g),
            pk_algo,
            HashAlgorithm::arbitrary(g),
            SubpacketArea::arbitrary(g),
            SubpacketArea::arbitrary(g),
            [u8::arbitrary(g), u8::arbitrary(g)],
            mpis)
    }
}

#[cfg(test)]
fn arbitrary_signature_mpis(g: &mut Gen)
                            -> (PublicKeyAlgorithm, mpi::Signature) {
    use PublicKeyAlgorithm::*;
    loop {
        let pk_algo = match u8::arbitrary(g) % 4 {
            0 => RSAEncryptSign,
            1 => DSA,
            2 => ECDSA,
            3 => EdDSA,
            _ => unreachable!(),
        };
        if let Some(mpis) = mpi::Signature::arbitrary_for(g, pk_algo) {
            break (pk_algo, mpis);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Parse;
    use crate::serialize::MarshalInto;

    quickcheck! {
        fn roundtrip(p: Signature) -> bool {
            let q = Signature::from_bytes(&p.to_vec().unwrap()).unwrap();
            p == q
        }
    }

    #[test]
    fn v3_fixed_fields() {
        let sig = Signature3::new(
            SignatureType::Binary,
            0x5a649c0a.into(),
            KeyID::from(0x0123456789abcdefu64),
            PublicKeyAlgorithm::RSAEncryptSign,
            HashAlgorithm::SHA256,
            [0xbe, 0xef],
            mpi::Signature::RSA { s: mpi::MPI::new(&[0x2a]) });
        let body = Signature::from(sig.clone()).to_vec().unwrap();
        assert_eq!(&body[..2], &[0x03, 0x05]);

        let parsed = Signature::from_bytes(&body).unwrap();
        match parsed {
            Signature::V3(s) => {
                assert_eq!(s.issuer(), &KeyID::from(0x0123456789abcdefu64));
                assert_eq!(s.digest_prefix(), &[0xbe, 0xef]);
            },
            _ => panic!("expected a v3 signature"),
        }
    }
}
