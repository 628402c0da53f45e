use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::Packet;
use crate::packet;

/// Holds a Trust packet.
///
/// Trust packets hold implementation-defined data and are normally
/// only found in key rings.  See [Section 5.10 of RFC 4880] for
/// details.  The body is carried verbatim.
///
///   [Section 5.10 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.10
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Trust {
    pub(crate) common: packet::Common,
    value: Vec<u8>,
}
assert_send_and_sync!(Trust);

impl fmt::Debug for Trust {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Trust")
            .field("value", &crate::fmt::to_hex(&self.value, true))
            .finish()
    }
}

impl From<Vec<u8>> for Trust {
    fn from(value: Vec<u8>) -> Self {
        Trust {
            common: Default::default(),
            value,
        }
    }
}

impl Trust {
    pub(crate) fn with_common(common: packet::Common, value: Vec<u8>)
                              -> Self {
        Trust { common, value }
    }

    /// Gets the trust packet's value.
    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

impl From<Trust> for Packet {
    fn from(s: Trust) -> Self {
        Packet::Trust(s)
    }
}

#[cfg(test)]
impl Arbitrary for Trust {
    fn arbitrary(g: &mut Gen) -> Self {
        Vec::<u8>::arbitrary(g).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Parse;
    use crate::serialize::MarshalInto;

    quickcheck! {
        fn roundtrip(p: Trust) -> bool {
            let q = Trust::from_bytes(&p.to_vec().unwrap()).unwrap();
            p == q
        }
    }
}
