use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::Packet;
use crate::packet;

/// Holds a UserID packet.
///
/// The standard specifies that the content is [UTF-8 encoded text],
/// but the codec preserves whatever octets appear on the wire.  By
/// convention, the content is a UTF-8 encoded RFC 2822 mailbox:
/// `Name (Comment) <email@example.org>`.
///
///   [UTF-8 encoded text]: https://tools.ietf.org/html/rfc4880#section-5.11
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct UserID {
    pub(crate) common: packet::Common,
    /// The user id.
    value: Vec<u8>,
}
assert_send_and_sync!(UserID);

impl fmt::Debug for UserID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("UserID")
            .field("value", &String::from_utf8_lossy(&self.value))
            .finish()
    }
}

impl fmt::Display for UserID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.value))
    }
}

impl From<Vec<u8>> for UserID {
    fn from(u: Vec<u8>) -> Self {
        UserID {
            common: Default::default(),
            value: u,
        }
    }
}

impl From<&[u8]> for UserID {
    fn from(u: &[u8]) -> Self {
        u.to_vec().into()
    }
}

impl From<&str> for UserID {
    fn from(u: &str) -> Self {
        u.as_bytes().into()
    }
}

impl UserID {
    pub(crate) fn with_common(common: packet::Common, value: Vec<u8>)
                              -> Self {
        UserID { common, value }
    }

    /// Gets the user ID packet's value.
    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

impl From<UserID> for Packet {
    fn from(s: UserID) -> Self {
        Packet::UserID(s)
    }
}

#[cfg(test)]
impl Arbitrary for UserID {
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
        fn roundtrip(p: UserID) -> bool {
            let q = UserID::from_bytes(&p.to_vec().unwrap()).unwrap();
            p == q
        }
    }

    #[test]
    fn display() {
        let u = UserID::from("Test McTestface <test@example.org>");
        assert_eq!(u.to_string(), "Test McTestface <test@example.org>");
    }
}
