use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::Packet;
use crate::packet;

/// Holds an encrypted data packet with integrity protection.
///
/// The SEIP packet pairs the ciphertext with a [Modification
/// Detection Code] computed over the plaintext.  See [Section 5.13
/// of RFC 4880] for details.  Only version 1 is defined; the parser
/// rejects any other version octet.
///
///   [Modification Detection Code]: super::MDC
///   [Section 5.13 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.13
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SEIP {
    pub(crate) common: packet::Common,
    /// The encrypted payload.
    body: Vec<u8>,
}
assert_send_and_sync!(SEIP);

impl fmt::Debug for SEIP {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SEIP")
            .field("version", &self.version())
            .field("body", &format!("{} bytes", self.body.len()))
            .finish()
    }
}

impl Default for SEIP {
    fn default() -> Self {
        Self::new()
    }
}

impl SEIP {
    /// Returns a new `SEIP` packet.
    pub fn new() -> Self {
        SEIP {
            common: Default::default(),
            body: Vec::new(),
        }
    }

    pub(crate) fn with_common(common: packet::Common) -> Self {
        SEIP {
            common,
            body: Vec::new(),
        }
    }

    /// Gets the version.
    ///
    /// Only version 1 exists.
    pub fn version(&self) -> u8 {
        1
    }

    /// Gets the encrypted payload.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Sets the encrypted payload.
    pub fn set_body(&mut self, data: Vec<u8>) -> Vec<u8> {
        std::mem::replace(&mut self.body, data)
    }
}

impl From<SEIP> for Packet {
    fn from(s: SEIP) -> Self {
        Packet::SEIP(s)
    }
}

#[cfg(test)]
impl Arbitrary for SEIP {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut p = SEIP::new();
        p.set_body(Vec::<u8>::arbitrary(g));
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Parse;
    use crate::serialize::MarshalInto;

    quickcheck! {
        fn roundtrip(p: SEIP) -> bool {
            let q = SEIP::from_bytes(&p.to_vec().unwrap()).unwrap();
            p == q
        }
    }

    #[test]
    fn version_checked() {
        // Version 2 does not exist.
        assert!(SEIP::from_bytes(&[0x02, 0xde, 0xad]).is_err());
    }
}
