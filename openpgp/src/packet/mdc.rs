#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::Packet;
use crate::packet;

/// Holds a Modification Detection Code packet.
///
/// The MDC packet holds a SHA-1 digest over the plaintext of the
/// preceding [SEIP] packet.  See [Section 5.14 of RFC 4880] for
/// details.  This codec transports the digest; checking it is the
/// crypto provider's job.
///
///   [SEIP]: super::SEIP
///   [Section 5.14 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.14
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct MDC {
    pub(crate) common: packet::Common,
    /// Our SHA-1 hash.
    digest: [u8; 20],
}
assert_send_and_sync!(MDC);

impl MDC {
    /// Creates an MDC packet.
    pub fn new(digest: [u8; 20]) -> Self {
        MDC {
            common: Default::default(),
            digest,
        }
    }

    pub(crate) fn with_common(common: packet::Common, digest: [u8; 20])
                              -> Self {
        MDC {
            common,
            digest,
        }
    }

    /// Gets the packet's hash value.
    pub fn digest(&self) -> &[u8] {
        &self.digest[..]
    }
}

impl From<MDC> for Packet {
    fn from(s: MDC) -> Self {
        Packet::MDC(s)
    }
}

impl From<[u8; 20]> for MDC {
    fn from(digest: [u8; 20]) -> Self {
        MDC::new(digest)
    }
}

#[cfg(test)]
impl Arbitrary for MDC {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut digest = [0u8; 20];
        digest.iter_mut().for_each(|p| *p = Arbitrary::arbitrary(g));
        MDC::new(digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Parse;
    use crate::serialize::MarshalInto;

    quickcheck! {
        fn roundtrip(p: MDC) -> bool {
            let q = MDC::from_bytes(&p.to_vec().unwrap()).unwrap();
            p == q
        }
    }

    #[test]
    fn wrong_size_rejected() {
        assert!(MDC::from_bytes(&[0; 19]).is_err());
        assert!(MDC::from_bytes(&[0; 21]).is_err());
    }
}
