//! Formatting helpers.

/// Formats the given bytes as hexadecimal digits.
pub(crate) fn to_hex(s: &[u8], pretty: bool) -> String {
    use std::fmt::Write;

    let mut result = String::with_capacity(s.len() * 3);
    for (i, b) in s.iter().enumerate() {
        // No separator before the first octet.
        if pretty && i > 0 && i % 2 == 0 {
            result.push(' ');
        }
        write!(&mut result, "{:02X}", b).expect("writing to String is infallible");
    }
    result
}

/// Parses a hexadecimal string, optionally containing whitespace and
/// an `0x` prefix.
pub(crate) fn from_hex(hex: &str, pretty: bool) -> Option<Vec<u8>> {
    const BAD: u8 = 255u8;
    const PREFIX: u8 = 254u8;

    let mut nibbles = hex.chars().filter_map(|x| {
        match x {
            '0' => Some(0u8),
            '1' => Some(1u8),
            '2' => Some(2u8),
            '3' => Some(3u8),
            '4' => Some(4u8),
            '5' => Some(5u8),
            '6' => Some(6u8),
            '7' => Some(7u8),
            '8' => Some(8u8),
            '9' => Some(9u8),
            'a' | 'A' => Some(10u8),
            'b' | 'B' => Some(11u8),
            'c' | 'C' => Some(12u8),
            'd' | 'D' => Some(13u8),
            'e' | 'E' => Some(14u8),
            'f' | 'F' => Some(15u8),
            'x' | 'X' if pretty => Some(PREFIX),
            _ if pretty && x.is_whitespace() => None,
            _ => Some(BAD),
        }
    }).collect::<Vec<u8>>();

    if pretty && nibbles.len() >= 2 && nibbles[0] == 0 && nibbles[1] == PREFIX
    {
        // Drop the '0x' prefix.
        nibbles.remove(0);
        nibbles.remove(0);
    }

    if nibbles.iter().any(|&b| b == BAD || b == PREFIX) {
        // Not a hex character.
        return None;
    }

    // We need an even number of nibbles.
    if nibbles.len() % 2 != 0 {
        return None;
    }

    let bytes = nibbles.chunks(2).map(|nibbles| {
        (nibbles[0] << 4) | nibbles[1]
    }).collect::<Vec<u8>>();

    Some(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let data = &[0xde, 0xad, 0xbe, 0xef][..];
        assert_eq!(to_hex(data, false), "DEADBEEF");
        assert_eq!(to_hex(data, true), "DEAD BEEF");
        assert_eq!(from_hex("DEADBEEF", false).unwrap(), data);
        assert_eq!(from_hex("dead beef", true).unwrap(), data);
        assert_eq!(from_hex("0xdeadbeef", true).unwrap(), data);
        assert!(from_hex("DEADBEE", false).is_none());
        assert!(from_hex("DEADBEEG", false).is_none());
        assert!(from_hex("dead beef", false).is_none());
    }
}
