//! User Attribute packets and subpackets.
//!
//! See [Section 5.12 of RFC 4880] for details.
//!
//!   [Section 5.12 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.12

use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::Packet;
use crate::packet;

/// Holds a UserAttribute packet.
///
/// A user attribute is a list of subpackets.  The only standardized
/// subpacket is the image subpacket (type 1); all other types are
/// preserved verbatim.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct UserAttribute {
    pub(crate) common: packet::Common,
    /// The subpackets.
    subpackets: Vec<Subpacket>,
}
assert_send_and_sync!(UserAttribute);

impl UserAttribute {
    /// Returns a new `UserAttribute` packet.
    pub fn new(subpackets: Vec<Subpacket>) -> Self {
        UserAttribute {
            common: Default::default(),
            subpackets,
        }
    }

    pub(crate) fn with_common(common: packet::Common,
                              subpackets: Vec<Subpacket>) -> Self {
        UserAttribute {
            common,
            subpackets,
        }
    }

    /// Iterates over the subpackets.
    pub fn subpackets(&self) -> impl Iterator<Item = &Subpacket> + Send + Sync {
        self.subpackets.iter()
    }
}

impl From<UserAttribute> for Packet {
    fn from(s: UserAttribute) -> Self {
        Packet::UserAttribute(s)
    }
}

/// A user attribute subpacket.
///
/// Note: This enum cannot be exhaustively matched to allow future
/// extensions.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Subpacket {
    /// An image.
    Image(Image),
    /// An unknown subpacket.
    Unknown {
        /// The type octet.
        tag: u8,
        /// The body, verbatim.
        body: Vec<u8>,
    },
}
assert_send_and_sync!(Subpacket);

impl Subpacket {
    /// Returns the subpacket's type octet.
    pub fn tag(&self) -> u8 {
        match self {
            Subpacket::Image(_) => IMAGE_SUBPACKET_TAG,
            Subpacket::Unknown { tag, .. } => *tag,
        }
    }
}

pub(crate) const IMAGE_SUBPACKET_TAG: u8 = 1;

/// An image attribute subpacket.
///
/// The image subpacket starts with an image header whose length is a
/// 16-bit *little-endian* quantity covering the whole header
/// including the length octets.  Header version 1 fixes the header
/// length at 16 octets, but the parser accepts longer headers and
/// preserves the surplus octets verbatim.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Image {
    /// The image header version octet.
    version: u8,
    /// The image format octet; 1 is JPEG.
    format: u8,
    /// Header octets beyond the fixed four, verbatim.
    header_rest: Vec<u8>,
    /// The image data.
    data: Vec<u8>,
}
assert_send_and_sync!(Image);

/// The image format octet denoting JPEG.
pub const IMAGE_FORMAT_JPEG: u8 = 1;

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Image")
            .field("version", &self.version)
            .field("format", &self.format)
            .field("header_rest",
                   &format!("{} bytes", self.header_rest.len()))
            .field("data", &format!("{} bytes", self.data.len()))
            .finish()
    }
}

impl Image {
    /// Creates a version 1 JPEG image subpacket.
    pub fn new_jpeg(data: Vec<u8>) -> Self {
        Image {
            version: 1,
            format: IMAGE_FORMAT_JPEG,
            // Twelve reserved octets per the v1 header format.
            header_rest: vec![0; 12],
            data,
        }
    }

    pub(crate) fn with_parts(version: u8, format: u8, header_rest: Vec<u8>,
                             data: Vec<u8>) -> Self {
        Image {
            version,
            format,
            header_rest,
            data,
        }
    }

    /// Returns the image header version.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Returns the image format octet.
    pub fn format(&self) -> u8 {
        self.format
    }

    /// Returns the header octets following the fixed fields.
    pub fn header_rest(&self) -> &[u8] {
        &self.header_rest
    }

    /// Returns the length of the image header in octets.
    pub fn header_len(&self) -> u16 {
        // Length octets, version, format, surplus.
        (4 + self.header_rest.len()) as u16
    }

    /// Returns the image data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl From<Image> for Subpacket {
    fn from(i: Image) -> Self {
        Subpacket::Image(i)
    }
}

#[cfg(test)]
impl Arbitrary for UserAttribute {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut subpackets = Vec::new();
        for _ in 0..(1 + u8::arbitrary(g) % 3) {
            subpackets.push(if bool::arbitrary(g) {
                Subpacket::Image(Image::new_jpeg(Vec::<u8>::arbitrary(g)))
            } else {
                Subpacket::Unknown {
                    // An unassigned type octet.
                    tag: 2 + u8::arbitrary(g) % 100,
                    body: Vec::<u8>::arbitrary(g),
                }
            });
        }
        UserAttribute::new(subpackets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Parse;
    use crate::serialize::MarshalInto;

    quickcheck! {
        fn roundtrip(p: UserAttribute) -> bool {
            let q = UserAttribute::from_bytes(&p.to_vec().unwrap()).unwrap();
            p == q
        }
    }

    #[test]
    fn image_header() {
        let img = Image::new_jpeg(vec![0xff, 0xd8]);
        assert_eq!(img.header_len(), 16);
        assert_eq!(img.version(), 1);
        assert_eq!(img.format(), IMAGE_FORMAT_JPEG);
    }

    #[test]
    fn oversized_header_is_preserved() {
        // Header length 0x14 = 20: four octets of surplus beyond the
        // fixed 16.
        let mut body = vec![
            0x14, 0x00,             // header length, little endian
            0x01,                   // version
            0x01,                   // format
        ];
        body.extend_from_slice(&[0u8; 16]);   // 12 reserved + 4 surplus
        body.extend_from_slice(b"JFIF");      // image data

        let ua_body = {
            // Subpacket framing: length, type octet.
            let mut b = Vec::new();
            let len = (1 + body.len()) as u32;
            assert!(len < 192);
            b.push(len as u8);
            b.push(IMAGE_SUBPACKET_TAG);
            b.extend_from_slice(&body);
            b
        };

        let ua = UserAttribute::from_bytes(&ua_body).unwrap();
        match ua.subpackets().next().unwrap() {
            Subpacket::Image(img) => {
                assert_eq!(img.header_len(), 20);
                assert_eq!(img.header_rest().len(), 16);
                assert_eq!(img.data(), b"JFIF");
            },
            _ => panic!("expected an image"),
        }

        assert_eq!(ua.to_vec().unwrap(), ua_body);
    }
}
