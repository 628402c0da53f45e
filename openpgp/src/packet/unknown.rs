use std::fmt;

use crate::Packet;
use crate::packet;
use crate::packet::Tag;

/// Holds an unknown packet.
///
/// This is used by the parser to hold packets with unassigned or
/// unsupported tags.  The tag and body are preserved verbatim so
/// that the packet sequence can be serialized again without loss.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Unknown {
    pub(crate) common: packet::Common,
    /// Packet tag.
    tag: Tag,
    /// The unknown packet's body.
    body: Vec<u8>,
}
assert_send_and_sync!(Unknown);

impl fmt::Debug for Unknown {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Unknown")
            .field("tag", &self.tag)
            .field("body", &format!("{} bytes", self.body.len()))
            .finish()
    }
}

impl Unknown {
    /// Returns a new `Unknown` packet.
    pub fn new(tag: Tag) -> Self {
        Unknown {
            common: Default::default(),
            tag,
            body: Vec::new(),
        }
    }

    pub(crate) fn with_common(common: packet::Common, tag: Tag,
                              body: Vec<u8>) -> Self {
        Unknown {
            common,
            tag,
            body,
        }
    }

    /// Gets the unknown packet's tag.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Sets the unknown packet's tag.
    pub fn set_tag(&mut self, tag: Tag) -> Tag {
        std::mem::replace(&mut self.tag, tag)
    }

    /// Gets the unknown packet's body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Sets the unknown packet's body.
    pub fn set_body(&mut self, data: Vec<u8>) -> Vec<u8> {
        std::mem::replace(&mut self.body, data)
    }
}

impl From<Unknown> for Packet {
    fn from(s: Unknown) -> Self {
        Packet::Unknown(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Parse;
    use crate::serialize::MarshalInto;

    #[test]
    fn roundtrip_unknown_tag() {
        // Tag 39 is unassigned.
        let raw = [0xC0 | 39, 0x03, 0x01, 0x02, 0x03];
        let p = Packet::from_bytes(&raw).unwrap();
        match &p {
            Packet::Unknown(u) => {
                assert_eq!(u.tag(), Tag::Unknown(39));
                assert_eq!(u.body(), &[1, 2, 3]);
            },
            _ => panic!("expected unknown packet"),
        }
        assert_eq!(p.to_vec().unwrap(), raw);
    }

    #[test]
    fn unsupported_tags_are_preserved() {
        // A PKESK packet; not modelled by this codec, but preserved.
        let raw = [0xC1, 0x02, 0xaa, 0xbb];
        let p = Packet::from_bytes(&raw).unwrap();
        assert_eq!(p.tag(), Tag::PKESK);
        assert_eq!(p.kind(), None);
        assert_eq!(p.to_vec().unwrap(), raw);
    }
}
