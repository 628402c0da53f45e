//! Assuan-dialect protocol support.
//!
//! The wire format is ASCII and line based; lines are terminated by
//! `\n` and limited to [`MAX_LINE_LENGTH`] octets.  A server emits
//! `OK`, `ERR`, `S` (status), `D` (data), `#` (comment), and
//! `INQUIRE` lines; a client emits command lines and, while an
//! inquiry is pending, `D`, `END`, or `CAN` lines.
//!
//! Binary data on `D` lines is percent-escaped: `%`, CR and LF are
//! transmitted as `%25`, `%0D`, and `%0A`.  Command arguments use
//! "percent-plus" escaping, where additionally `+` stands for a
//! space.

use std::fmt;
use std::io::Write;

use crate::Error;
use crate::Result;

pub mod client;
pub use client::Client;
pub mod server;
pub use server::{Command, Connection, Server};

/// The maximum length of a line, including the terminating `\n`.
pub const MAX_LINE_LENGTH: usize = 1000;

/// Percent-escapes the given data for use in a `D` line.
pub fn escape_data(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    for b in data {
        match b {
            b'%' => out.extend_from_slice(b"%25"),
            b'\r' => out.extend_from_slice(b"%0D"),
            b'\n' => out.extend_from_slice(b"%0A"),
            b => out.push(*b),
        }
    }
    out
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Reverses the percent-escaping applied to a `D` line's payload.
pub fn unescape_data(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        match data[i] {
            b'%' => {
                let hi = data.get(i + 1).copied().and_then(hex_digit);
                let lo = data.get(i + 2).copied().and_then(hex_digit);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi << 4 | lo);
                        i += 3;
                    },
                    _ => return Err(Error::MalformedLine(
                        "dangling percent escape".into()).into()),
                }
            },
            b => {
                out.push(b);
                i += 1;
            },
        }
    }
    Ok(out)
}

/// Decodes a "percent-plus" escaped command argument.
///
/// `%XX` decodes to the octet `0xXX`, `+` decodes to a space, and
/// everything else is copied verbatim.  An incomplete escape
/// sequence is copied verbatim, too; this mirrors the permissive
/// behavior of the C implementation.  Note that the result may
/// contain a NUL octet; it is the application's business how to
/// treat it.
pub fn percent_plus_decode(s: &str) -> Vec<u8> {
    let data = s.as_bytes();
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        match data[i] {
            b'%' => {
                let hi = data.get(i + 1).copied().and_then(hex_digit);
                let lo = data.get(i + 2).copied().and_then(hex_digit);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi << 4 | lo);
                        i += 3;
                    },
                    _ => {
                        out.push(b'%');
                        i += 1;
                    },
                }
            },
            b'+' => {
                out.push(b' ');
                i += 1;
            },
            b => {
                out.push(b);
                i += 1;
            },
        }
    }
    out
}

/// Server response.
#[derive(Debug, PartialEq, Eq)]
pub enum Response {
    /// Operation successful.
    Ok {
        /// Optional human-readable message.
        message: Option<String>,
    },
    /// An error occurred.
    Error {
        /// Error code.
        code: usize,
        /// Optional human-readable message.
        message: Option<String>,
    },
    /// Information about the ongoing operation.
    Status {
        /// Indicates what the status message is about.
        keyword: String,
        /// Human-readable message.
        message: String,
    },
    /// A comment for debugging purposes.
    Comment {
        /// Human-readable message.
        message: String,
    },
    /// Raw data.
    Data {
        /// A chunk of raw data, unescaped.
        partial: Vec<u8>,
    },
    /// Request for information.
    Inquire {
        /// The subject of the inquiry.
        keyword: String,
        /// Optional parameters.
        parameters: Option<Vec<u8>>,
    },
    /// A separator between multiple data items in one response.
    End,
}

impl Response {
    /// Parses the given response line.
    pub fn parse(b: &[u8]) -> Result<Response> {
        // All control lines are UTF-8; data lines are handled as
        // bytes before unescaping.
        if let Some(rest) = b.strip_prefix(b"D ") {
            return Ok(Response::Data {
                partial: unescape_data(rest)?,
            });
        }

        let line = std::str::from_utf8(b).map_err(
            |_| Error::MalformedLine(String::from_utf8_lossy(b).into()))?;

        let mut tokens = line.splitn(2, ' ');
        let keyword = tokens.next().unwrap_or_default();
        let rest = tokens.next();

        match keyword {
            "OK" => Ok(Response::Ok {
                message: rest.map(Into::into),
            }),
            "ERR" => {
                let mut rest = rest.unwrap_or_default().splitn(2, ' ');
                let code = rest.next().unwrap_or_default().parse()
                    .map_err(|_| Error::MalformedLine(line.into()))?;
                Ok(Response::Error {
                    code,
                    message: rest.next().map(Into::into),
                })
            },
            "S" => {
                let mut rest = rest.unwrap_or_default().splitn(2, ' ');
                let keyword = rest.next().unwrap_or_default();
                if keyword.is_empty() {
                    return Err(Error::MalformedLine(line.into()).into());
                }
                Ok(Response::Status {
                    keyword: keyword.into(),
                    message: rest.next().unwrap_or_default().into(),
                })
            },
            "#" => Ok(Response::Comment {
                message: rest.unwrap_or_default().into(),
            }),
            "D" => Ok(Response::Data { partial: Vec::new() }),
            "END" => Ok(Response::End),
            "INQUIRE" => {
                let mut rest = rest.unwrap_or_default().splitn(2, ' ');
                let keyword = rest.next().unwrap_or_default();
                if keyword.is_empty() {
                    return Err(Error::MalformedLine(line.into()).into());
                }
                Ok(Response::Inquire {
                    keyword: keyword.into(),
                    parameters: rest.next()
                        .map(|p| p.as_bytes().to_vec()),
                })
            },
            _ => Err(Error::UnexpectedResponse(line.into()).into()),
        }
    }

    /// Writes the response as a single protocol line.
    pub fn serialize(&self, o: &mut dyn Write) -> Result<()> {
        match self {
            Response::Ok { message: Some(m) } => writeln!(o, "OK {}", m)?,
            Response::Ok { message: None } => writeln!(o, "OK")?,
            Response::Error { code, message: Some(m) } =>
                writeln!(o, "ERR {} {}", code, m)?,
            Response::Error { code, message: None } =>
                writeln!(o, "ERR {}", code)?,
            Response::Status { keyword, message } =>
                writeln!(o, "S {} {}", keyword, message)?,
            Response::Comment { message } =>
                writeln!(o, "# {}", message)?,
            Response::Data { partial } => {
                o.write_all(b"D ")?;
                o.write_all(&escape_data(partial))?;
                o.write_all(b"\n")?;
            },
            Response::Inquire { keyword, parameters: Some(p) } => {
                write!(o, "INQUIRE {} ", keyword)?;
                o.write_all(&escape_data(p))?;
                o.write_all(b"\n")?;
            },
            Response::Inquire { keyword, parameters: None } =>
                writeln!(o, "INQUIRE {}", keyword)?,
            Response::End => writeln!(o, "END")?,
        }
        Ok(())
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Response::Ok { .. } => write!(f, "OK"),
            Response::Error { code, .. } => write!(f, "ERR {}", code),
            Response::Status { keyword, .. } => write!(f, "S {}", keyword),
            Response::Comment { .. } => write!(f, "#"),
            Response::Data { partial } =>
                write!(f, "D ({} bytes)", partial.len()),
            Response::Inquire { keyword, .. } =>
                write!(f, "INQUIRE {}", keyword),
            Response::End => write!(f, "END"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escaping() {
        let data = b"50%\r\n rebate";
        let escaped = escape_data(data);
        assert_eq!(&escaped, b"50%25%0D%0A rebate");
        assert_eq!(unescape_data(&escaped).unwrap(), data);
        assert!(unescape_data(b"100%").is_err());
    }

    #[test]
    fn percent_plus() {
        assert_eq!(percent_plus_decode("a+b%20c%00d"),
                   b"a b c\x00d".to_vec());
        // Incomplete escapes are copied verbatim.
        assert_eq!(percent_plus_decode("50%"), b"50%".to_vec());
        assert_eq!(percent_plus_decode("50%x1"), b"50%x1".to_vec());
    }

    #[test]
    fn response_roundtrip() {
        for r in [
            Response::Ok { message: None },
            Response::Ok { message: Some("done".into()) },
            Response::Error { code: 7, message: Some("no CRL known".into()) },
            Response::Status {
                keyword: "KEYSERVER".into(),
                message: "hkp://example.org".into(),
            },
            Response::Data { partial: b"binary\n%data".to_vec() },
            Response::Inquire { keyword: "TARGETCERT".into(),
                                parameters: None },
        ] {
            let mut buf = Vec::new();
            r.serialize(&mut buf).unwrap();
            assert_eq!(buf.last(), Some(&b'\n'));
            let parsed = Response::parse(&buf[..buf.len() - 1]).unwrap();
            assert_eq!(r, parsed);
        }
    }
}
