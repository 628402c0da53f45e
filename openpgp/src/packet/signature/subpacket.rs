//! Signature subpackets.
//!
//! The signature subpackets are defined in [Section 5.2.3.1 of RFC
//! 4880].  A subpacket area is the concatenation of length-prefixed,
//! type-tagged records.  The type octet's high bit is the *critical*
//! flag: a critical subpacket of an unknown type must cause the
//! evaluation of the signature to fail; parsing, however, succeeds
//! and preserves the subpacket through the [`SubpacketValue::Unknown`]
//! variant.
//!
//!   [Section 5.2.3.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2.3.1

use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::KeyID;
use crate::packet::Signature;
use crate::types::{
    CompressionAlgorithm,
    Duration,
    Features,
    HashAlgorithm,
    KeyFlags,
    KeyServerPreferences,
    PublicKeyAlgorithm,
    ReasonForRevocation,
    RevocationKey,
    SymmetricAlgorithm,
    Timestamp,
};

/// The subpacket types specified by [Section 5.2.3.1 of RFC 4880].
///
///   [Section 5.2.3.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2.3.1
///
/// The values correspond to the serialized format (without the
/// critical bit).
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SubpacketTag {
    /// The time the signature was made.
    SignatureCreationTime,
    /// The validity period of the signature.
    SignatureExpirationTime,
    /// Whether a certification may be exported.
    ExportableCertification,
    /// The depth and amount of trust conferred by a trust signature.
    TrustSignature,
    /// A regular expression limiting the scope of a trust signature.
    RegularExpression,
    /// Whether the signature can be revoked.
    Revocable,
    /// The validity period of the key.
    KeyExpirationTime,
    /// The symmetric algorithms preferred by the key holder.
    PreferredSymmetricAlgorithms,
    /// A key authorized to issue revocations for this key.
    RevocationKey,
    /// The key id of the key that made the signature.
    Issuer,
    /// A "notation" on the signature.
    NotationData,
    /// The hash algorithms preferred by the key holder.
    PreferredHashAlgorithms,
    /// The compression algorithms preferred by the key holder.
    PreferredCompressionAlgorithms,
    /// The key holder's key server preferences.
    KeyServerPreferences,
    /// The key holder's preferred key server.
    PreferredKeyServer,
    /// Whether the certified user id is the primary one.
    PrimaryUserID,
    /// A URI pointing to the policy under which the signature was
    /// issued.
    PolicyURI,
    /// The intended use of the key.
    KeyFlags,
    /// The user id of the key holder as which the signature was made.
    SignersUserID,
    /// Why the key or certification was revoked.
    ReasonForRevocation,
    /// The features supported by the key holder's implementation.
    Features,
    /// A digest of the target of a signature revision.
    SignatureTarget,
    /// A complete signature packet body.
    EmbeddedSignature,
    /// Reserved and unassigned subpacket types.
    Unknown(u8),
}
assert_send_and_sync!(SubpacketTag);

impl From<u8> for SubpacketTag {
    fn from(u: u8) -> Self {
        match u {
            2 => SubpacketTag::SignatureCreationTime,
            3 => SubpacketTag::SignatureExpirationTime,
            4 => SubpacketTag::ExportableCertification,
            5 => SubpacketTag::TrustSignature,
            6 => SubpacketTag::RegularExpression,
            7 => SubpacketTag::Revocable,
            9 => SubpacketTag::KeyExpirationTime,
            11 => SubpacketTag::PreferredSymmetricAlgorithms,
            12 => SubpacketTag::RevocationKey,
            16 => SubpacketTag::Issuer,
            20 => SubpacketTag::NotationData,
            21 => SubpacketTag::PreferredHashAlgorithms,
            22 => SubpacketTag::PreferredCompressionAlgorithms,
            23 => SubpacketTag::KeyServerPreferences,
            24 => SubpacketTag::PreferredKeyServer,
            25 => SubpacketTag::PrimaryUserID,
            26 => SubpacketTag::PolicyURI,
            27 => SubpacketTag::KeyFlags,
            28 => SubpacketTag::SignersUserID,
            29 => SubpacketTag::ReasonForRevocation,
            30 => SubpacketTag::Features,
            31 => SubpacketTag::SignatureTarget,
            32 => SubpacketTag::EmbeddedSignature,
            u => SubpacketTag::Unknown(u),
        }
    }
}

impl From<SubpacketTag> for u8 {
    fn from(t: SubpacketTag) -> Self {
        match t {
            SubpacketTag::SignatureCreationTime => 2,
            SubpacketTag::SignatureExpirationTime => 3,
            SubpacketTag::ExportableCertification => 4,
            SubpacketTag::TrustSignature => 5,
            SubpacketTag::RegularExpression => 6,
            SubpacketTag::Revocable => 7,
            SubpacketTag::KeyExpirationTime => 9,
            SubpacketTag::PreferredSymmetricAlgorithms => 11,
            SubpacketTag::RevocationKey => 12,
            SubpacketTag::Issuer => 16,
            SubpacketTag::NotationData => 20,
            SubpacketTag::PreferredHashAlgorithms => 21,
            SubpacketTag::PreferredCompressionAlgorithms => 22,
            SubpacketTag::KeyServerPreferences => 23,
            SubpacketTag::PreferredKeyServer => 24,
            SubpacketTag::PrimaryUserID => 25,
            SubpacketTag::PolicyURI => 26,
            SubpacketTag::KeyFlags => 27,
            SubpacketTag::SignersUserID => 28,
            SubpacketTag::ReasonForRevocation => 29,
            SubpacketTag::Features => 30,
            SubpacketTag::SignatureTarget => 31,
            SubpacketTag::EmbeddedSignature => 32,
            SubpacketTag::Unknown(u) => u,
        }
    }
}

#[cfg(test)]
impl Arbitrary for SubpacketTag {
    fn arbitrary(g: &mut Gen) -> Self {
        (u8::arbitrary(g) & 0x7f).into()
    }
}

/// The length of a subpacket.
///
/// The length prefix uses the same variable encoding as new-format
/// packet body lengths, except that partial body lengths are not
/// allowed.  A length below 192 may legally be encoded in the longer
/// forms; the raw octets of such a redundant encoding are retained
/// so that the subpacket round-trips bit for bit.
#[derive(Clone, Debug)]
pub(crate) struct SubpacketLength {
    /// The length.
    pub(crate) len: u32,
    /// The length encoding used when this was not the minimal
    /// encoding of `len`.
    pub(crate) raw: Option<Vec<u8>>,
}

impl SubpacketLength {
    pub(crate) fn new(len: u32, raw: Option<Vec<u8>>) -> Self {
        Self { len, raw }
    }
}

/// Flags of a notation data subpacket.
///
/// The first of the four flag octets carries the human-readable flag
/// in its most significant bit; the other bits and octets are
/// unassigned and preserved verbatim.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotationDataFlags([u8; 4]);
assert_send_and_sync!(NotationDataFlags);

const NOTATION_DATA_FLAG_HUMAN_READABLE: u8 = 0x80;

impl NotationDataFlags {
    /// Creates a new set of flags from its wire representation.
    pub fn new(flags: [u8; 4]) -> Self {
        NotationDataFlags(flags)
    }

    /// Creates an empty set of flags.
    pub fn empty() -> Self {
        NotationDataFlags([0; 4])
    }

    /// Creates a set of flags with the human-readable flag set.
    pub fn human_readable() -> Self {
        NotationDataFlags([NOTATION_DATA_FLAG_HUMAN_READABLE, 0, 0, 0])
    }

    /// Returns the raw flag octets.
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Returns whether the value is human-readable UTF-8 text.
    pub fn is_human_readable(&self) -> bool {
        self.0[0] & NOTATION_DATA_FLAG_HUMAN_READABLE != 0
    }
}

impl fmt::Debug for NotationDataFlags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("NotationDataFlags")
            .field(&crate::fmt::to_hex(&self.0, false))
            .finish()
    }
}

/// Payload of a notation data subpacket.
///
/// The name is required to be valid UTF-8 only if the human-readable
/// flag is set; otherwise it is an uninterpreted octet string and
/// readers must not validate it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NotationData {
    flags: NotationDataFlags,
    name: Vec<u8>,
    value: Vec<u8>,
}
assert_send_and_sync!(NotationData);

impl NotationData {
    /// Creates a new notation.
    pub fn new<N, V>(flags: NotationDataFlags, name: N, value: V) -> Self
        where N: AsRef<[u8]>,
              V: AsRef<[u8]>,
    {
        NotationData {
            flags,
            name: name.as_ref().to_vec(),
            value: value.as_ref().to_vec(),
        }
    }

    /// Returns the flags.
    pub fn flags(&self) -> &NotationDataFlags {
        &self.flags
    }

    /// Returns the name, an octet string.
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// Returns the value, an octet string.
    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

/// The value carried by a subpacket.
///
/// Unknown and reserved subpacket types are preserved through the
/// `Unknown` variant, type octet and body verbatim.
///
/// Note: This enum cannot be exhaustively matched to allow future
/// extensions.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SubpacketValue {
    /// The time the signature was made.
    SignatureCreationTime(Timestamp),
    /// The validity period of the signature, relative to its creation
    /// time.
    SignatureExpirationTime(Duration),
    /// Whether a certification may be exported.
    ExportableCertification(bool),
    /// The depth and amount of trust conferred by a trust signature.
    TrustSignature {
        /// A level of 1 certifies the signee as a trusted
        /// introducer; higher levels let the signee delegate that.
        level: u8,
        /// 60 partial, 120 complete trust.
        trust: u8,
    },
    /// A regular expression limiting the scope of a trust signature.
    ///
    /// The wire form, including any trailing NUL octet, is preserved.
    RegularExpression(Vec<u8>),
    /// Whether the signature can be revoked.
    Revocable(bool),
    /// The validity period of the key, relative to its creation time.
    KeyExpirationTime(Duration),
    /// The symmetric algorithms preferred by the key holder.
    PreferredSymmetricAlgorithms(Vec<SymmetricAlgorithm>),
    /// A key authorized to issue revocations for this key.
    RevocationKey(RevocationKey),
    /// The key id of the key that made the signature.
    Issuer(KeyID),
    /// A "notation" on the signature.
    NotationData(NotationData),
    /// The hash algorithms preferred by the key holder.
    PreferredHashAlgorithms(Vec<HashAlgorithm>),
    /// The compression algorithms preferred by the key holder.
    PreferredCompressionAlgorithms(Vec<CompressionAlgorithm>),
    /// The key holder's key server preferences.
    KeyServerPreferences(KeyServerPreferences),
    /// The key holder's preferred key server.
    PreferredKeyServer(Vec<u8>),
    /// Whether the certified user id is the primary one.
    PrimaryUserID(bool),
    /// A URI pointing to the policy under which the signature was
    /// issued.
    PolicyURI(Vec<u8>),
    /// The intended use of the key.
    KeyFlags(KeyFlags),
    /// The user id of the key holder as which the signature was made.
    SignersUserID(Vec<u8>),
    /// Why the key or certification was revoked.
    ReasonForRevocation {
        /// Machine-readable reason for revocation.
        code: ReasonForRevocation,
        /// Human-readable reason for revocation.
        reason: Vec<u8>,
    },
    /// The features supported by the key holder's implementation.
    Features(Features),
    /// A digest of the target of a signature revision.
    SignatureTarget {
        /// Public-key algorithm of the target signature.
        pk_algo: PublicKeyAlgorithm,
        /// Hash algorithm of the target signature.
        hash_algo: HashAlgorithm,
        /// Hash digest of the target signature.
        digest: Vec<u8>,
    },
    /// A complete signature packet body.
    EmbeddedSignature(Box<Signature>),
    /// An unknown or reserved subpacket.
    Unknown {
        /// The tag octet, without the critical bit.
        tag: u8,
        /// The body, verbatim.
        body: Vec<u8>,
    },
}
assert_send_and_sync!(SubpacketValue);

impl SubpacketValue {
    /// Returns the subpacket tag for this value.
    pub fn tag(&self) -> SubpacketTag {
        use self::SubpacketValue::*;
        match self {
            SignatureCreationTime(_) => SubpacketTag::SignatureCreationTime,
            SignatureExpirationTime(_) =>
                SubpacketTag::SignatureExpirationTime,
            ExportableCertification(_) =>
                SubpacketTag::ExportableCertification,
            TrustSignature { .. } => SubpacketTag::TrustSignature,
            RegularExpression(_) => SubpacketTag::RegularExpression,
            Revocable(_) => SubpacketTag::Revocable,
            KeyExpirationTime(_) => SubpacketTag::KeyExpirationTime,
            PreferredSymmetricAlgorithms(_) =>
                SubpacketTag::PreferredSymmetricAlgorithms,
            RevocationKey(_) => SubpacketTag::RevocationKey,
            Issuer(_) => SubpacketTag::Issuer,
            NotationData(_) => SubpacketTag::NotationData,
            PreferredHashAlgorithms(_) =>
                SubpacketTag::PreferredHashAlgorithms,
            PreferredCompressionAlgorithms(_) =>
                SubpacketTag::PreferredCompressionAlgorithms,
            KeyServerPreferences(_) => SubpacketTag::KeyServerPreferences,
            PreferredKeyServer(_) => SubpacketTag::PreferredKeyServer,
            PrimaryUserID(_) => SubpacketTag::PrimaryUserID,
            PolicyURI(_) => SubpacketTag::PolicyURI,
            KeyFlags(_) => SubpacketTag::KeyFlags,
            SignersUserID(_) => SubpacketTag::SignersUserID,
            ReasonForRevocation { .. } => SubpacketTag::ReasonForRevocation,
            Features(_) => SubpacketTag::Features,
            SignatureTarget { .. } => SubpacketTag::SignatureTarget,
            EmbeddedSignature(_) => SubpacketTag::EmbeddedSignature,
            Unknown { tag, .. } => SubpacketTag::Unknown(*tag),
        }
    }
}

/// One subpacket of a signature's subpacket area.
///
/// Framing details (the length prefix encoding) are not part of the
/// subpacket's value: two subpackets that differ only in their
/// length encoding compare equal.
#[derive(Clone, Debug)]
pub struct Subpacket {
    /// The length.
    pub(crate) length: SubpacketLength,
    /// Critical flag.
    critical: bool,
    /// Packet value, must match the packet type.
    value: SubpacketValue,
}
assert_send_and_sync!(Subpacket);

impl PartialEq for Subpacket {
    fn eq(&self, other: &Subpacket) -> bool {
        self.critical == other.critical
            && self.value == other.value
    }
}

impl Eq for Subpacket {}

impl std::hash::Hash for Subpacket {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.critical.hash(state);
        self.value.hash(state);
    }
}

impl Subpacket {
    /// Creates a new subpacket.
    pub fn new(value: SubpacketValue, critical: bool) -> Self {
        Subpacket {
            length: SubpacketLength::new(0, None),
            critical,
            value,
        }
    }

    pub(crate) fn with_length(length: SubpacketLength,
                              value: SubpacketValue, critical: bool)
                              -> Self {
        Subpacket {
            length,
            critical,
            value,
        }
    }

    /// Returns whether the critical bit is set.
    pub fn critical(&self) -> bool {
        self.critical
    }

    /// Returns the subpacket tag.
    pub fn tag(&self) -> SubpacketTag {
        self.value.tag()
    }

    /// Returns the subpacket's value.
    pub fn value(&self) -> &SubpacketValue {
        &self.value
    }
}

/// Subpacket area, consisting of subpackets.
///
/// A v4 signature has two areas: the hashed and the unhashed one.
/// On the wire an area is prefixed with its total length in two
/// octets; the parser verifies that the subpackets' lengths add up
/// to exactly that.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SubpacketArea {
    packets: Vec<Subpacket>,
}
assert_send_and_sync!(SubpacketArea);

impl From<Vec<Subpacket>> for SubpacketArea {
    fn from(sps: Vec<Subpacket>) -> Self {
        SubpacketArea { packets: sps }
    }
}

impl<'a> IntoIterator for &'a SubpacketArea {
    type Item = &'a Subpacket;
    type IntoIter = std::slice::Iter<'a, Subpacket>;

    fn into_iter(self) -> Self::IntoIter {
        self.packets.iter()
    }
}

impl SubpacketArea {
    /// Returns a new, empty area.
    pub fn new() -> Self {
        Default::default()
    }

    /// Iterates over the subpackets.
    pub fn iter(&self) -> impl Iterator<Item = &Subpacket> + Send + Sync {
        self.packets.iter()
    }

    /// Returns the number of subpackets.
    pub fn len(&self) -> usize {
        self.packets.len()
    }

    /// Returns whether the area holds no subpackets.
    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// Returns the first subpacket with the given tag, if any.
    pub fn subpacket(&self, tag: SubpacketTag) -> Option<&Subpacket> {
        self.iter().find(|sp| sp.tag() == tag)
    }

    /// Adds the given subpacket.
    pub fn add(&mut self, packet: Subpacket) {
        self.packets.push(packet);
    }
}

#[cfg(test)]
impl Arbitrary for SubpacketValue {
    fn arbitrary(g: &mut Gen) -> Self {
        use self::SubpacketValue::*;
        loop {
            break match u8::arbitrary(g) % 23 {
                0 => SignatureCreationTime(Timestamp::arbitrary(g)),
                1 => SignatureExpirationTime(Duration::arbitrary(g)),
                2 => ExportableCertification(bool::arbitrary(g)),
                3 => TrustSignature {
                    level: u8::arbitrary(g),
                    trust: u8::arbitrary(g),
                },
                4 => RegularExpression(Vec::<u8>::arbitrary(g)),
                5 => Revocable(bool::arbitrary(g)),
                6 => KeyExpirationTime(Duration::arbitrary(g)),
                7 => PreferredSymmetricAlgorithms(
                    Vec::<SymmetricAlgorithm>::arbitrary(g)),
                8 => RevocationKey(
                    crate::types::RevocationKey::arbitrary(g)),
                9 => Issuer(KeyID::arbitrary(g)),
                10 => {
                    let flags = if bool::arbitrary(g) {
                        NotationDataFlags::human_readable()
                    } else {
                        NotationDataFlags::new(
                            [u8::arbitrary(g) & !0x80, u8::arbitrary(g),
                             u8::arbitrary(g), u8::arbitrary(g)])
                    };
                    let name = if flags.is_human_readable() {
                        String::arbitrary(g).into_bytes()
                    } else {
                        Vec::<u8>::arbitrary(g)
                    };
                    if name.len() > 0xffff {
                        continue;
                    }
                    let value = Vec::<u8>::arbitrary(g);
                    if value.len() > 0xffff {
                        continue;
                    }
                    NotationData(super::subpacket::NotationData::new(
                        flags, name, value))
                },
                11 => PreferredHashAlgorithms(
                    Vec::<HashAlgorithm>::arbitrary(g)),
                12 => PreferredCompressionAlgorithms(
                    Vec::<CompressionAlgorithm>::arbitrary(g)),
                13 => KeyServerPreferences(
                    crate::types::KeyServerPreferences::arbitrary(g)),
                14 => PreferredKeyServer(Vec::<u8>::arbitrary(g)),
                15 => PrimaryUserID(bool::arbitrary(g)),
                16 => PolicyURI(Vec::<u8>::arbitrary(g)),
                17 => KeyFlags(crate::types::KeyFlags::arbitrary(g)),
                18 => SignersUserID(Vec::<u8>::arbitrary(g)),
                19 => ReasonForRevocation {
                    code: crate::types::ReasonForRevocation::arbitrary(g),
                    reason: Vec::<u8>::arbitrary(g),
                },
                20 => Features(crate::types::Features::arbitrary(g)),
                21 => SignatureTarget {
                    pk_algo: PublicKeyAlgorithm::arbitrary(g),
                    hash_algo: HashAlgorithm::arbitrary(g),
                    digest: Vec::<u8>::arbitrary(g),
                },
                22 => Unknown {
                    // An unassigned tag.
                    tag: 110 + u8::arbitrary(g) % 16,
                    body: Vec::<u8>::arbitrary(g),
                },
                _ => unreachable!(),
            };
        }
    }
}

#[cfg(test)]
impl Arbitrary for Subpacket {
    fn arbitrary(g: &mut Gen) -> Self {
        Subpacket::new(SubpacketValue::arbitrary(g), bool::arbitrary(g))
    }
}

#[cfg(test)]
impl Arbitrary for SubpacketArea {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut area = SubpacketArea::new();
        for _ in 0..(u8::arbitrary(g) % 4) {
            area.add(Subpacket::arbitrary(g));
        }
        area
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Parse;
    use crate::serialize::MarshalInto;

    quickcheck! {
        fn roundtrip(sp: Subpacket) -> bool {
            let buf = sp.to_vec().unwrap();
            let q = Subpacket::from_bytes(&buf).unwrap();
            sp == q
        }
    }

    #[test]
    fn tag_roundtrip() {
        for i in 0..0x80u8 {
            let t = SubpacketTag::from(i);
            assert_eq!(u8::from(t), i);
        }
    }

    #[test]
    fn lookup_by_tag() {
        let mut area = SubpacketArea::new();
        area.add(Subpacket::new(
            SubpacketValue::SignatureCreationTime(42.into()), false));
        area.add(Subpacket::new(
            SubpacketValue::Issuer(KeyID::from(1u64)), false));

        assert!(area.subpacket(SubpacketTag::Issuer).is_some());
        assert!(area.subpacket(SubpacketTag::PolicyURI).is_none());
    }
}
