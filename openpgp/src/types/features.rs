use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use super::Bitfield;

/// Describes the features supported by an OpenPGP implementation.
///
/// The feature flags are defined in [Section 5.2.3.24 of RFC 4880].
///
///   [Section 5.2.3.24 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2.3.24
///
/// The feature flags are set by the user's OpenPGP implementation to
/// signal to any senders what features the implementation supports.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Features(Bitfield);
assert_send_and_sync!(Features);

impl fmt::Debug for Features {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut need_comma = false;
        if self.supports_seipd() {
            f.write_str("SEIPD")?;
            need_comma = true;
        }

        for i in self.0.iter_set() {
            match i {
                FEATURE_FLAG_SEIPD => (),
                i => {
                    if need_comma { f.write_str(", ")?; }
                    write!(f, "#{}", i)?;
                    need_comma = true;
                },
            }
        }

        if self.0.padding_bytes() > 0 {
            if need_comma { f.write_str(", ")?; }
            write!(f, "+padding({} bytes)", self.0.padding_bytes())?;
        }

        Ok(())
    }
}

impl Features {
    /// Creates a new instance from `bytes`.
    pub fn new<B: AsRef<[u8]>>(bytes: B) -> Self {
        Features(bytes.as_ref().to_vec().into())
    }

    /// Returns an empty feature set.
    pub fn empty() -> Self {
        Self::new(&[][..])
    }

    /// Compares two feature sets for semantic equality, ignoring
    /// padding.
    pub fn normalized_eq(&self, other: &Self) -> bool {
        self.0.normalized_eq(&other.0)
    }

    /// Returns a slice containing the raw values.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Whether the Symmetrically Encrypted and Integrity Protected
    /// Data packet (and the Modification Detection Code system) is
    /// supported.
    pub fn supports_seipd(&self) -> bool {
        self.0.get(FEATURE_FLAG_SEIPD)
    }

    /// Sets the SEIPD feature flag.
    pub fn set_seipd(mut self) -> Self {
        self.0.set(FEATURE_FLAG_SEIPD);
        self
    }
}

/// Symmetrically Encrypted and Integrity Protected Data packet
/// support.
const FEATURE_FLAG_SEIPD: usize = 0;

#[cfg(test)]
impl Arbitrary for Features {
    fn arbitrary(g: &mut Gen) -> Self {
        Self::new(Vec::arbitrary(g))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    quickcheck! {
        fn roundtrip(val: Features) -> bool {
            let q = Features::new(val.as_bytes());
            val == q
        }
    }

    #[test]
    fn set() {
        let f = Features::empty().set_seipd();
        assert!(f.supports_seipd());
        assert_eq!(f.as_bytes(), &[0x01]);
    }
}
