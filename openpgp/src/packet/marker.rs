use crate::packet;
use crate::Packet;

/// Holds a Marker packet.
///
/// See [Section 5.8 of RFC 4880] for details.  The body is the fixed
/// string `PGP`; the packet must be ignored when received, and the
/// parser rejects anything else under this tag.
///
///   [Section 5.8 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.8
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Marker {
    pub(crate) common: packet::Common,
}
assert_send_and_sync!(Marker);

impl Marker {
    /// The body of the marker packet.
    pub(crate) const BODY: &'static [u8] = b"PGP";

    pub(crate) fn new(common: packet::Common) -> Self {
        Marker { common }
    }
}

impl From<Marker> for Packet {
    fn from(p: Marker) -> Self {
        Packet::Marker(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Parse;
    use crate::serialize::MarshalInto;

    #[test]
    fn roundtrip() {
        let raw = [0xCA, 0x03, b'P', b'G', b'P'];
        let p = Packet::from_bytes(&raw).unwrap();
        assert_eq!(p, Packet::Marker(Marker::default()));
        assert_eq!(p.to_vec().unwrap(), raw);
    }

    #[test]
    fn bad_body() {
        let raw = [0xCA, 0x03, b'G', b'P', b'G'];
        assert!(Packet::from_bytes(&raw).is_err());
    }
}
