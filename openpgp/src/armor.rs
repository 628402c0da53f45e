//! ASCII Armor.
//!
//! This module deals with ASCII Armored data (see [Section 6 of RFC
//! 4880]).  Armor wraps binary OpenPGP data in a base64 encoding
//! with type-identifying header and footer lines and a CRC-24
//! checksum, so that it survives 7-bit transports like e-mail and
//! HTML forms.
//!
//! This crate only provides the writer; it is used to publish
//! keyblocks to HKP keyservers.
//!
//!   [Section 6 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-6

use std::io;
use std::io::Write;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as base64std;

use crate::Result;

/// The encoded output stream must be represented in lines of no more
/// than 76 characters each (see [Section 6.3 of RFC 4880]).  GnuPG
/// uses 64.
///
///   [Section 6.3 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-6.3
const LINE_LENGTH: usize = 64;

/// Specifies the type of data (see [Section 6.2 of RFC 4880]).
///
///   [Section 6.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-6.2
#[non_exhaustive]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A generic OpenPGP message.  (Since its introduction in RFC
    /// 2440, the variants Kind::PublicKey, Kind::SecretKey, and
    /// Kind::Signature are considered deprecated.)
    Message,
    /// A transferable public key.
    PublicKey,
    /// A detached signature.
    Signature,
}
assert_send_and_sync!(Kind);

impl Kind {
    fn blurb(&self) -> &str {
        match self {
            Kind::Message => "MESSAGE",
            Kind::PublicKey => "PUBLIC KEY BLOCK",
            Kind::Signature => "SIGNATURE",
        }
    }

    fn begin(&self) -> String {
        format!("-----BEGIN PGP {}-----", self.blurb())
    }

    fn end(&self) -> String {
        format!("-----END PGP {}-----", self.blurb())
    }
}

/// A filter that applies ASCII Armor to the data written to it.
pub struct Writer<W: Write> {
    inner: W,
    kind: Kind,
    buf: Vec<u8>,
}
assert_send_and_sync!(Writer<Vec<u8>>);

impl<W: Write> Writer<W> {
    /// Constructs a new filter for the given type of data.
    pub fn new(inner: W, kind: Kind) -> Result<Self> {
        Ok(Writer {
            inner,
            kind,
            buf: Vec::new(),
        })
    }

    /// Writes the header and footer and returns the underlying
    /// writer.
    ///
    /// The armored data is only complete after this is called.
    pub fn finalize(mut self) -> Result<W> {
        writeln!(self.inner, "{}", self.kind.begin())?;
        writeln!(self.inner)?;

        let encoded = base64std.encode(&self.buf);
        for line in encoded.as_bytes().chunks(LINE_LENGTH) {
            self.inner.write_all(line)?;
            writeln!(self.inner)?;
        }

        let crc = crc24(&self.buf);
        let crc_bytes = [(crc >> 16) as u8, (crc >> 8) as u8, crc as u8];
        writeln!(self.inner, "={}", base64std.encode(crc_bytes))?;
        writeln!(self.inner, "{}", self.kind.end())?;

        Ok(self.inner)
    }
}

impl<W: Write> Write for Writer<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

const CRC24_INIT: u32 = 0xB704CE;
const CRC24_POLY: u32 = 0x864CFB;

/// Computes the CRC-24 checksum defined in [Section 6.1 of RFC 4880].
///
///   [Section 6.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-6.1
fn crc24(data: &[u8]) -> u32 {
    let mut crc = CRC24_INIT;
    for octet in data {
        crc ^= (*octet as u32) << 16;
        for _ in 0..8 {
            crc <<= 1;
            if crc & 0x1000000 > 0 {
                crc ^= CRC24_POLY;
            }
        }
    }
    crc & 0xFFFFFF
}

#[cfg(test)]
mod tests {
    use super::*;

    fn armor(data: &[u8], kind: Kind) -> String {
        let mut w = Writer::new(Vec::new(), kind).unwrap();
        w.write_all(data).unwrap();
        String::from_utf8(w.finalize().unwrap()).unwrap()
    }

    #[test]
    fn framing() {
        let out = armor(b"hello", Kind::PublicKey);
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("-----BEGIN PGP PUBLIC KEY BLOCK-----"));
        assert_eq!(lines.next(), Some(""));
        let rest: Vec<&str> = lines.collect();
        assert_eq!(rest.last(), Some(&"-----END PGP PUBLIC KEY BLOCK-----"));
        assert!(rest[rest.len() - 2].starts_with('='));
    }

    #[test]
    fn payload_decodes_back() {
        let data: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let out = armor(&data, Kind::Message);

        let mut payload = String::new();
        for line in out.lines()
            .skip(2)
            .take_while(|l| !l.starts_with('=') && !l.starts_with("-----"))
        {
            assert!(line.len() <= LINE_LENGTH);
            payload.push_str(line);
        }

        assert_eq!(base64std.decode(&payload).unwrap(), data);
    }

    #[test]
    fn crc24_known_values() {
        // The empty message checksums to the initialization value.
        assert_eq!(crc24(b""), CRC24_INIT);
        assert_ne!(crc24(b"A"), crc24(b"B"));
    }
}
