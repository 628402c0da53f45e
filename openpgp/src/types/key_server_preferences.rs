use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use super::Bitfield;

/// Describes preferences regarding key servers.
///
/// Key server preferences are described in [Section 5.2.3.17 of RFC
/// 4880].
///
///   [Section 5.2.3.17 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2.3.17
///
/// The only standard flag, `no_modify`, requests that key servers
/// only accept updates to the certificate from its owner.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyServerPreferences(Bitfield);
assert_send_and_sync!(KeyServerPreferences);

impl fmt::Debug for KeyServerPreferences {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut need_comma = false;
        if self.no_modify() {
            f.write_str("no modify")?;
            need_comma = true;
        }

        for i in self.0.iter_set() {
            if i == KEYSERVER_PREFERENCE_NO_MODIFY {
                continue;
            }
            if need_comma { f.write_str(", ")?; }
            write!(f, "#{}", i)?;
            need_comma = true;
        }

        if self.0.padding_bytes() > 0 {
            if need_comma { f.write_str(", ")?; }
            write!(f, "+padding({} bytes)", self.0.padding_bytes())?;
        }

        Ok(())
    }
}

impl KeyServerPreferences {
    /// Creates a new instance from `bytes`.
    pub fn new<B: AsRef<[u8]>>(bytes: B) -> Self {
        KeyServerPreferences(bytes.as_ref().to_vec().into())
    }

    /// Returns an empty key server preference set.
    pub fn empty() -> Self {
        Self::new(&[][..])
    }

    /// Returns a slice containing the raw values.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Compares two preference sets for semantic equality, ignoring
    /// padding.
    pub fn normalized_eq(&self, other: &Self) -> bool {
        self.0.normalized_eq(&other.0)
    }

    /// Returns whether the certificate's owner requests that the
    /// certificate is only modified by the owner.
    pub fn no_modify(&self) -> bool {
        self.0.get(KEYSERVER_PREFERENCE_NO_MODIFY)
    }

    /// Sets the no-modify flag.
    pub fn set_no_modify(mut self) -> Self {
        self.0.set(KEYSERVER_PREFERENCE_NO_MODIFY);
        self
    }
}

/// The key holder requests that this key only be modified or updated
/// by the key holder or an administrator of the key server.
///
/// This is bit 7 of the first octet, i.e. 0x80.
const KEYSERVER_PREFERENCE_NO_MODIFY: usize = 7;

#[cfg(test)]
impl Arbitrary for KeyServerPreferences {
    fn arbitrary(g: &mut Gen) -> Self {
        Self::new(Vec::arbitrary(g))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    quickcheck! {
        fn roundtrip(val: KeyServerPreferences) -> bool {
            let q = KeyServerPreferences::new(val.as_bytes());
            val == q
        }
    }

    #[test]
    fn no_modify() {
        let f = KeyServerPreferences::new([0x80]);
        assert!(f.no_modify());
        let f = KeyServerPreferences::empty().set_no_modify();
        assert_eq!(f.as_bytes(), &[0x80]);
    }
}
