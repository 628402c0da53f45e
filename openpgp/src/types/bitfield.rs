//! A variable-sized set of boolean flags.

/// A variable-sized set of boolean flags.
///
/// The `Bitfield` models the wire representation of OpenPGP flag
/// fields like [`KeyFlags`] and [`Features`]: a variable-length
/// sequence of octets where bit `n` is bit `n % 8` of octet `n / 8`.
/// Unknown bits and trailing padding are preserved so that the field
/// serializes back to its input.
///
/// [`KeyFlags`]: super::KeyFlags
/// [`Features`]: super::Features
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bitfield {
    raw: Vec<u8>,
}
assert_send_and_sync!(Bitfield);

impl From<Vec<u8>> for Bitfield {
    fn from(raw: Vec<u8>) -> Self {
        Self { raw }
    }
}

impl AsRef<[u8]> for Bitfield {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl std::fmt::Debug for Bitfield {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut need_comma = false;
        for i in self.iter_set() {
            if need_comma {
                f.write_str(", ")?;
            }
            write!(f, "{}", i)?;
            need_comma = true;
        }

        // Mention any padding, as equality is sensitive to this.
        let mut padding = 0;
        for i in (0..self.raw.len()).rev() {
            if self.raw[i] == 0 {
                padding += 1;
            } else {
                break;
            }
        }
        if padding > 0 {
            if need_comma {
                f.write_str(", ")?;
            }
            write!(f, "+padding({} bytes)", padding)?;
        }

        Ok(())
    }
}

impl Bitfield {
    /// Returns all bits that are set starting from bit 0, the
    /// least-significant bit in the left-most byte.
    pub fn iter_set(&self) -> impl Iterator<Item = usize> + Send + Sync + '_ {
        self.raw.iter()
            .flat_map(|b| {
                (0..8).map(move |i| {
                    b & (1 << i) != 0
                })
            })
            .enumerate()
            .filter_map(|(i, v)| if v { Some(i) } else { None })
    }

    /// Returns the number of trailing zero bytes.
    pub fn padding_bytes(&self) -> usize {
        self.raw.iter().rev().take_while(|b| **b == 0).count()
    }

    /// Compares two feature sets for semantic equality, ignoring
    /// padding.
    pub fn normalized_eq(&self, other: &Self) -> bool {
        let (small, big) = if self.raw.len() < other.raw.len() {
            (self, other)
        } else {
            (other, self)
        };

        for (s, b) in small.raw.iter().zip(big.raw.iter()) {
            if s != b {
                return false;
            }
        }

        for &b in &big.raw[small.raw.len()..] {
            if b != 0 {
                return false;
            }
        }

        true
    }

    /// Returns a slice containing the raw values.
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Returns whether the specified flag is set.
    pub fn get(&self, bit: usize) -> bool {
        let byte = bit / 8;

        if byte >= self.raw.len() {
            // Unset bits are false.
            false
        } else {
            (self.raw[byte] & (1 << (bit % 8))) != 0
        }
    }

    /// Canonicalizes the object, removing any trailing zero bytes.
    pub fn canonicalize(&mut self) {
        while !self.raw.is_empty() && self.raw[self.raw.len() - 1] == 0 {
            self.raw.truncate(self.raw.len() - 1);
        }
    }

    /// Sets the specified flag.
    pub fn set(&mut self, bit: usize) {
        let byte = bit / 8;
        while self.raw.len() <= byte {
            self.raw.push(0);
        }
        self.raw[byte] |= 1 << (bit % 8);
    }

    /// Clears the specified flag.
    ///
    /// Note: This does not remove any trailing zero bytes.
    pub fn clear(&mut self, bit: usize) {
        let byte = bit / 8;
        if byte < self.raw.len() {
            self.raw[byte] &= !(1 << (bit % 8));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get() {
        let mut f = Bitfield::default();
        assert!(!f.get(0));
        assert!(!f.get(63));

        f.set(2);
        f.set(9);
        assert!(f.get(2));
        assert!(f.get(9));
        assert_eq!(f.as_bytes(), &[0x04, 0x02]);

        f.clear(9);
        assert!(!f.get(9));
        assert_eq!(f.as_bytes(), &[0x04, 0x00]);
        assert_eq!(f.padding_bytes(), 1);

        f.canonicalize();
        assert_eq!(f.as_bytes(), &[0x04]);
    }

    #[test]
    fn normalized_eq() {
        let a = Bitfield::from(vec![0x01]);
        let b = Bitfield::from(vec![0x01, 0x00]);
        let c = Bitfield::from(vec![0x01, 0x02]);
        assert!(a.normalized_eq(&b));
        assert!(!a.normalized_eq(&c));
        assert!(a != b);
    }
}
