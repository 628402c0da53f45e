//! Wire representations of points in time and durations.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

/// A timestamp representable by OpenPGP.
///
/// OpenPGP timestamps are the number of seconds since the Unix epoch,
/// stored as an unsigned 32-bit big-endian integer ([Section 3.5 of
/// RFC 4880]).
///
///   [Section 3.5 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-3.5
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u32);
assert_send_and_sync!(Timestamp);

impl From<u32> for Timestamp {
    fn from(t: u32) -> Self {
        Timestamp(t)
    }
}

impl From<Timestamp> for u32 {
    fn from(t: Timestamp) -> Self {
        t.0
    }
}

impl From<Timestamp> for SystemTime {
    fn from(t: Timestamp) -> Self {
        UNIX_EPOCH + std::time::Duration::new(t.0 as u64, 0)
    }
}

impl Timestamp {
    /// Returns the raw number of seconds since the Unix epoch.
    pub fn as_secs(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
impl Arbitrary for Timestamp {
    fn arbitrary(g: &mut Gen) -> Self {
        Timestamp(u32::arbitrary(g))
    }
}

/// A duration representable by OpenPGP.
///
/// Durations appear in expiration subpackets as seconds relative to a
/// packet's creation time, stored as an unsigned 32-bit big-endian
/// integer.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration(u32);
assert_send_and_sync!(Duration);

impl From<u32> for Duration {
    fn from(d: u32) -> Self {
        Duration(d)
    }
}

impl From<Duration> for u32 {
    fn from(d: Duration) -> Self {
        d.0
    }
}

impl From<Duration> for std::time::Duration {
    fn from(d: Duration) -> Self {
        std::time::Duration::new(d.0 as u64, 0)
    }
}

impl Duration {
    /// Returns the duration as seconds.
    pub fn as_secs(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Duration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Duration({})", self.0)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} seconds", self.0)
    }
}

#[cfg(test)]
impl Arbitrary for Duration {
    fn arbitrary(g: &mut Gen) -> Self {
        Duration(u32::arbitrary(g))
    }
}
