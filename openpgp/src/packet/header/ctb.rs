//! Cipher Type Byte.
//!
//! See [Section 4.2 of RFC 4880] for more details.
//!
//!   [Section 4.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.2

use crate::Error;
use crate::Result;
use crate::packet::Tag;

/// The length encoded for an old style CTB.
///
/// The `PacketLengthType` is only part of the [old CTB], and is
/// partially used to determine the packet's size.
///
/// See [Section 4.2.1 of RFC 4880] for more details.
///
///   [old CTB]: CTBOld
///   [Section 4.2.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.2.1
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PacketLengthType {
    /// A one-octet Body Length header encodes a length of 0 to 255
    /// octets.
    OneOctet,
    /// A two-octet Body Length header encodes a length of 256 to
    /// 65535 octets.
    TwoOctets,
    /// A four-octet Body Length header encodes a length of up to
    /// 4,294,967,295 (0xFFFFFFFF) octets in length.
    FourOctets,
    /// The packet is of indeterminate length.
    ///
    /// The header is 1 octet long, and the implementation must
    /// determine how long the packet is.
    Indeterminate,
}
assert_send_and_sync!(PacketLengthType);

impl TryFrom<u8> for PacketLengthType {
    type Error = anyhow::Error;

    fn try_from(u: u8) -> Result<Self> {
        match u {
            0 => Ok(PacketLengthType::OneOctet),
            1 => Ok(PacketLengthType::TwoOctets),
            2 => Ok(PacketLengthType::FourOctets),
            3 => Ok(PacketLengthType::Indeterminate),
            _ => Err(Error::InvalidArgument(
                format!("Invalid packet length type {}", u)).into()),
        }
    }
}

impl From<PacketLengthType> for u8 {
    fn from(l: PacketLengthType) -> Self {
        match l {
            PacketLengthType::OneOctet => 0,
            PacketLengthType::TwoOctets => 1,
            PacketLengthType::FourOctets => 2,
            PacketLengthType::Indeterminate => 3,
        }
    }
}

/// A sum type for the different CTB variants.
///
/// There are two CTB variants: the [old CTB format] and the [new CTB
/// format].
///
///   [old CTB format]: CTBOld
///   [new CTB format]: CTBNew
///
/// Note: This enum cannot be exhaustively matched to allow future
/// extensions.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CTB {
    /// New (current) packet header format.
    New(CTBNew),
    /// Old PGP 2.6 header format.
    Old(CTBOld),
}
assert_send_and_sync!(CTB);

impl CTB {
    /// Constructs a new-style CTB.
    pub fn new(tag: Tag) -> Self {
        CTB::New(CTBNew::new(tag))
    }

    /// Returns the packet's tag.
    pub fn tag(&self) -> Tag {
        match self {
            CTB::New(c) => c.tag(),
            CTB::Old(c) => c.tag(),
        }
    }
}

impl TryFrom<u8> for CTB {
    type Error = anyhow::Error;

    /// Parses a CTB as described in [Section 4.2 of RFC 4880].
    ///
    ///   [Section 4.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.2
    fn try_from(ptag: u8) -> Result<CTB> {
        // The top bit of the ptag must be set.
        if ptag & 0b1000_0000 == 0 {
            return Err(Error::MalformedPacket(
                format!("Malformed CTB: MSB of ptag ({:#010b}) not set",
                        ptag)).into());
        }

        let new_format = ptag & 0b0100_0000 != 0;
        let ctb = if new_format {
            let tag = ptag & 0b0011_1111;
            CTB::New(CTBNew::new(tag.into()))
        } else {
            let tag = (ptag & 0b0011_1100) >> 2;
            let length_type = PacketLengthType::try_from(ptag & 0b0000_0011)?;
            CTB::Old(CTBOld {
                tag: tag.into(),
                length_type,
            })
        };

        Ok(ctb)
    }
}

/// A CTB using the new format encoding.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CTBNew {
    /// Packet tag.
    tag: Tag,
}
assert_send_and_sync!(CTBNew);

impl CTBNew {
    /// Constructs a new-style CTB.
    pub fn new(tag: Tag) -> Self {
        CTBNew {
            tag,
        }
    }

    /// Returns the packet's tag.
    pub fn tag(&self) -> Tag {
        self.tag
    }
}

/// A CTB using the old format encoding.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CTBOld {
    /// Packet tag.
    tag: Tag,
    /// Type of length specifier.
    length_type: PacketLengthType,
}
assert_send_and_sync!(CTBOld);

impl CTBOld {
    /// Constructs an old-style CTB.
    ///
    /// Only the tags 0 to 15 can be encoded in the old format.
    pub fn new(tag: Tag, length_type: PacketLengthType) -> Result<Self> {
        let n: u8 = tag.into();

        // Only tags 0 to 15 are supported.
        if n > 15 {
            return Err(Error::InvalidArgument(
                format!("Only tags 0 to 15 are supported in the old \
                         format, got: {}", tag)).into());
        }

        Ok(CTBOld {
            tag,
            length_type,
        })
    }

    /// Returns the packet's tag.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Returns the packet's length type.
    pub fn length_type(&self) -> PacketLengthType {
        self.length_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_old() {
        // 0x99 = 0b10_0110_01: old format, tag 6, two-octet length.
        let ctb = CTB::try_from(0x99).unwrap();
        match &ctb {
            CTB::Old(old) => {
                assert_eq!(old.tag(), Tag::PublicKey);
                assert_eq!(old.length_type(), PacketLengthType::TwoOctets);
            },
            _ => panic!("expected old format"),
        }
    }

    #[test]
    fn parse_new() {
        // 0xCB: new format, tag 11.
        let ctb = CTB::try_from(0xCB).unwrap();
        assert_eq!(ctb.tag(), Tag::Literal);
        assert!(matches!(ctb, CTB::New(_)));
    }

    #[test]
    fn msb_must_be_set() {
        assert!(CTB::try_from(0x3f).is_err());
    }

    #[test]
    fn old_tag_range() {
        assert!(CTBOld::new(Tag::UserAttribute,
                            PacketLengthType::OneOctet).is_err());
        assert!(CTBOld::new(Tag::PublicKey,
                            PacketLengthType::OneOctet).is_ok());
    }
}
