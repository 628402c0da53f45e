use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::Packet;
use crate::packet;

/// Holds a symmetrically encrypted data packet.
///
/// The SED packet contains the ciphertext without any integrity
/// protection; it was obsoleted by the [SEIP] packet.  See [Section
/// 5.7 of RFC 4880] for details.
///
///   [SEIP]: super::SEIP
///   [Section 5.7 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.7
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SED {
    pub(crate) common: packet::Common,
    /// The encrypted payload.
    body: Vec<u8>,
}
assert_send_and_sync!(SED);

impl fmt::Debug for SED {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SED")
            .field("body", &format!("{} bytes", self.body.len()))
            .finish()
    }
}

impl Default for SED {
    fn default() -> Self {
        Self::new()
    }
}

impl SED {
    /// Returns a new `SED` packet.
    pub fn new() -> Self {
        SED {
            common: Default::default(),
            body: Vec::new(),
        }
    }

    pub(crate) fn with_common(common: packet::Common) -> Self {
        SED {
            common,
            body: Vec::new(),
        }
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

impl From<SED> for Packet {
    fn from(s: SED) -> Self {
        Packet::SED(s)
    }
}

#[cfg(test)]
impl Arbitrary for SED {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut p = SED::new();
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
        fn roundtrip(p: SED) -> bool {
            let q = SED::from_bytes(&p.to_vec().unwrap()).unwrap();
            p == q
        }
    }
}
