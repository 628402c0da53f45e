//! Packet-related types.
//!
//! OpenPGP data is organized into a sequence of packets ([Section 4
//! of RFC 4880]).  This module defines one value type per packet
//! variant, the [`Packet`] enum tying them together, and the header
//! framing types.
//!
//! The packet family is closed: packets this codec does not model
//! (e.g. secret-key packets and session-key packets) and unassigned
//! tags are represented by [`Unknown`], which preserves the body
//! verbatim so that it can be serialized again.
//!
//!   [Section 4 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4

use std::fmt;

pub mod header;
pub use header::Header;

mod tag;
pub use tag::Tag;

mod compressed_data;
pub use compressed_data::CompressedData;
pub mod key;
pub use key::Key;
mod literal;
pub use literal::Literal;
mod marker;
pub use marker::Marker;
mod mdc;
pub use mdc::MDC;
mod sed;
pub use sed::SED;
mod seip;
pub use seip::SEIP;
pub mod signature;
pub use signature::Signature;
mod trust;
pub use trust::Trust;
mod unknown;
pub use unknown::Unknown;
pub mod user_attribute;
pub use user_attribute::UserAttribute;
mod userid;
pub use userid::UserID;

/// Fields used by all packets.
///
/// Currently this tracks the framing a packet was parsed with so
/// that re-serialization can reproduce it.  Two packets that differ
/// only in framing compare equal.
#[derive(Clone, Debug, Default)]
pub struct Common {
    /// The header this packet was parsed with, if any.
    header: Option<Header>,
}
assert_send_and_sync!(Common);

impl Common {
    pub(crate) fn with_header(header: Header) -> Self {
        Common {
            header: Some(header),
        }
    }

    /// Returns the header observed when this packet was parsed.
    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }
}

impl PartialEq for Common {
    fn eq(&self, _other: &Common) -> bool {
        // The framing is not considered part of the packet value.
        true
    }
}

impl Eq for Common {}

impl std::hash::Hash for Common {
    fn hash<H: std::hash::Hasher>(&self, _: &mut H) {
    }
}

/// Enumeration of packet types.
///
/// The different OpenPGP packets are detailed in [Section 5 of RFC 4880].
///
/// The [`Unknown`] packet allows unsupported and unassigned packets
/// to be round-tripped losslessly.
///
/// Note: This enum cannot be exhaustively matched to allow future
/// extensions.
///
///   [Section 5 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Packet {
    /// Marker packet.
    Marker(Marker),
    /// Literal data packet.
    Literal(Literal),
    /// Compressed data packet.
    CompressedData(CompressedData),
    /// Symmetrically encrypted data packet.
    SED(SED),
    /// Symmetric encrypted and integrity protected data packet.
    SEIP(SEIP),
    /// Modification detection code packet.
    MDC(MDC),
    /// Trust packet.
    Trust(Trust),
    /// User ID packet.
    UserID(UserID),
    /// User attribute packet.
    UserAttribute(UserAttribute),
    /// Public key packet.
    PublicKey(Key),
    /// Public subkey packet.
    PublicSubkey(Key),
    /// Signature packet.
    Signature(Signature),
    /// Unknown packet.
    Unknown(Unknown),
}
assert_send_and_sync!(Packet);

impl Packet {
    /// Returns the `Tag` of the given `Packet`.
    pub fn tag(&self) -> Tag {
        match self {
            Packet::Marker(_) => Tag::Marker,
            Packet::Literal(_) => Tag::Literal,
            Packet::CompressedData(_) => Tag::CompressedData,
            Packet::SED(_) => Tag::SED,
            Packet::SEIP(_) => Tag::SEIP,
            Packet::MDC(_) => Tag::MDC,
            Packet::Trust(_) => Tag::Trust,
            Packet::UserID(_) => Tag::UserID,
            Packet::UserAttribute(_) => Tag::UserAttribute,
            Packet::PublicKey(_) => Tag::PublicKey,
            Packet::PublicSubkey(_) => Tag::PublicSubkey,
            Packet::Signature(_) => Tag::Signature,
            Packet::Unknown(p) => p.tag(),
        }
    }

    /// Returns the parsed `Tag` of the given `Packet` if known.
    ///
    /// Unlike [`Packet::tag`], this function returns `None` for
    /// unknown packets.
    pub fn kind(&self) -> Option<Tag> {
        match self {
            Packet::Unknown(_) => None,
            _ => Some(self.tag()),
        }
    }

    pub(crate) fn common(&self) -> &Common {
        match self {
            Packet::Marker(p) => &p.common,
            Packet::Literal(p) => &p.common,
            Packet::CompressedData(p) => &p.common,
            Packet::SED(p) => &p.common,
            Packet::SEIP(p) => &p.common,
            Packet::MDC(p) => &p.common,
            Packet::Trust(p) => &p.common,
            Packet::UserID(p) => &p.common,
            Packet::UserAttribute(p) => &p.common,
            Packet::PublicKey(p) => p.common(),
            Packet::PublicSubkey(p) => p.common(),
            Packet::Signature(p) => p.common(),
            Packet::Unknown(p) => &p.common,
        }
    }

    /// Returns the header observed when this packet was parsed, if
    /// any.
    pub fn header(&self) -> Option<&Header> {
        self.common().header()
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}
