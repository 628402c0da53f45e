//! Packet headers.
//!
//! An OpenPGP packet is framed by a cipher type byte carrying the
//! packet's tag, followed by a length field ([Section 4.2 of RFC
//! 4880]).  Both an old and a new header format exist, with
//! different length encodings.
//!
//!   [Section 4.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.2

use crate::Error;
use crate::Result;

mod ctb;
pub use ctb::{CTB, CTBNew, CTBOld, PacketLengthType};

/// A packet's header.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Header {
    /// The packet's CTB.
    ctb: CTB,
    /// The packet's length.
    length: BodyLength,
}
assert_send_and_sync!(Header);

impl Header {
    /// Creates a new header.
    pub fn new(ctb: CTB, length: BodyLength) -> Self {
        Header { ctb, length }
    }

    /// Returns the packet's CTB.
    pub fn ctb(&self) -> &CTB {
        &self.ctb
    }

    /// Returns the packet's length.
    pub fn length(&self) -> &BodyLength {
        &self.length
    }

    /// Checks that the header is valid.
    ///
    /// Streamed bodies (partial body lengths and the old-format
    /// indeterminate length) are restricted to the data packets.
    pub fn valid(&self) -> Result<()> {
        let tag = self.ctb.tag();

        match self.length {
            BodyLength::Full(_) => Ok(()),
            BodyLength::Partial(_) | BodyLength::Indeterminate => {
                if tag.can_stream() {
                    Ok(())
                } else {
                    Err(Error::MalformedPacket(
                        format!("Partial body or indeterminate length \
                                 not allowed for {}", tag)).into())
                }
            },
        }
    }
}

/// A packet's size.
///
/// A packet's size can be expressed in three different ways.  Either
/// the size of the packet is fully known (`Full`), the packet is
/// chunked using OpenPGP's partial body encoding (`Partial`), or the
/// packet extends to the end of the input (`Indeterminate`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyLength {
    /// The packet's size is known.
    Full(u32),
    /// The parameter is the number of bytes in the current chunk.
    ///
    /// This type is only used with new format packets.
    Partial(u32),
    /// The packet extends until an EOF is encountered.
    ///
    /// This type is only used with old format packets.
    Indeterminate,
}
assert_send_and_sync!(BodyLength);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::Tag;

    #[test]
    fn streaming_restricted_to_data_packets() {
        let h = Header::new(CTB::new(Tag::Signature),
                            BodyLength::Partial(512));
        assert!(h.valid().is_err());

        let h = Header::new(CTB::new(Tag::Literal),
                            BodyLength::Partial(512));
        assert!(h.valid().is_ok());

        let h = Header::new(CTB::Old(CTBOld::new(
            Tag::CompressedData, PacketLengthType::Indeterminate).unwrap()),
                            BodyLength::Indeterminate);
        assert!(h.valid().is_ok());
    }
}
