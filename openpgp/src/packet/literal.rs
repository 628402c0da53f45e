use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::Error;
use crate::Packet;
use crate::Result;
use crate::packet;
use crate::types::{DataFormat, Timestamp};

/// Holds a literal packet.
///
/// A literal packet contains unstructured data.  Since the size can
/// be very large, it is advised to process messages containing such
/// packets using a `PacketParser` or a `PacketPileParser` and process
/// the data in a streaming manner rather than the using the
/// `PacketPile::from_file` and related interfaces.
///
/// See [Section 5.9 of RFC 4880] for details.
///
///   [Section 5.9 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.9
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    /// CTB packet header fields.
    pub(crate) common: packet::Common,
    /// A one-octet field that describes how the data is formatted.
    format: DataFormat,
    /// Filename, a string of up to 255 octets.
    ///
    /// An empty filename is not distinguished from an absent one on
    /// the wire, so it is stored verbatim.
    filename: Vec<u8>,
    /// A four-octet number that indicates a date associated with the
    /// literal data.  0 means unknown.
    date: Timestamp,
    /// The literal data packet is a container packet, but cannot
    /// store packets.
    body: Vec<u8>,
}
assert_send_and_sync!(Literal);

impl fmt::Debug for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let filename = String::from_utf8_lossy(&self.filename);

        let threshold = 36;
        let prefix = &self.body[..std::cmp::min(threshold, self.body.len())];
        let mut prefix_fmt = String::from_utf8_lossy(prefix).into_owned();
        if self.body.len() > threshold {
            prefix_fmt.push_str("...");
        }
        prefix_fmt.push_str(&format!(" ({} bytes)", self.body.len())[..]);

        f.debug_struct("Literal")
            .field("format", &self.format)
            .field("filename", &filename)
            .field("date", &self.date)
            .field("body", &prefix_fmt)
            .finish()
    }
}

impl Default for Literal {
    fn default() -> Self {
        Self::new(Default::default())
    }
}

impl Literal {
    /// Returns a new `Literal` packet.
    pub fn new(format: DataFormat) -> Literal {
        Literal {
            common: Default::default(),
            format,
            filename: Vec::new(),
            date: 0.into(),
            body: Vec::new(),
        }
    }

    pub(crate) fn with_common(common: packet::Common,
                              format: DataFormat) -> Literal {
        Literal {
            common,
            format,
            filename: Vec::new(),
            date: 0.into(),
            body: Vec::new(),
        }
    }

    /// Gets the Literal packet's body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Sets the Literal packet's body.
    pub fn set_body(&mut self, data: Vec<u8>) -> Vec<u8> {
        std::mem::replace(&mut self.body, data)
    }

    /// Gets the Literal packet's content disposition.
    pub fn format(&self) -> DataFormat {
        self.format
    }

    /// Sets the Literal packet's content disposition.
    pub fn set_format(&mut self, format: DataFormat) -> DataFormat {
        ::std::mem::replace(&mut self.format, format)
    }

    /// Gets the literal packet's filename.
    ///
    /// Note: when a literal data packet is protected by a signature,
    /// only the literal data packet's body is protected, not the
    /// meta-data.  As such, this field should normally be ignored.
    pub fn filename(&self) -> Option<&[u8]> {
        if self.filename.is_empty() {
            None
        } else {
            Some(&self.filename)
        }
    }

    /// Sets the literal packet's filename field.
    ///
    /// The standard does not specify an encoding.  Filenames must
    /// not be longer than 255 bytes.
    pub fn set_filename<F>(&mut self, filename: F) -> Result<Vec<u8>>
        where F: AsRef<[u8]>
    {
        let filename = filename.as_ref();
        if filename.len() > 255 {
            return Err(Error::InvalidArgument(
                "filename too long".into()).into());
        }
        Ok(std::mem::replace(&mut self.filename, filename.to_vec()))
    }

    /// Gets the literal packet's date field.
    ///
    /// Note: when a literal data packet is protected by a signature,
    /// only the literal data packet's body is protected, not the
    /// meta-data.  As such, this field should normally be ignored.
    pub fn date(&self) -> Option<Timestamp> {
        if self.date.as_secs() == 0 {
            None
        } else {
            Some(self.date)
        }
    }

    /// Sets the literal packet's date field.
    pub fn set_date<T>(&mut self, timestamp: T) -> Option<Timestamp>
        where T: Into<Option<Timestamp>>
    {
        let old = self.date;
        self.date = timestamp.into().unwrap_or_else(|| 0.into());
        if old.as_secs() == 0 {
            None
        } else {
            Some(old)
        }
    }

    pub(crate) fn filename_raw(&self) -> &[u8] {
        &self.filename
    }

    pub(crate) fn date_raw(&self) -> Timestamp {
        self.date
    }
}

impl From<Literal> for Packet {
    fn from(s: Literal) -> Self {
        Packet::Literal(s)
    }
}

#[cfg(test)]
impl Arbitrary for Literal {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut l = Literal::new(DataFormat::arbitrary(g));
        l.set_body(Vec::<u8>::arbitrary(g));
        while let Err(_) = l.set_filename(Vec::<u8>::arbitrary(g)) {
            // Too long, try again.
        }
        l.set_date(Some(Timestamp::arbitrary(g)));
        l
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Parse;
    use crate::serialize::MarshalInto;

    quickcheck! {
        fn roundtrip(p: Literal) -> bool {
            let q = Literal::from_bytes(&p.to_vec().unwrap()).unwrap();
            p == q
        }
    }

    #[test]
    fn accessors() {
        let mut l = Literal::new(DataFormat::Text);
        assert_eq!(l.filename(), None);
        assert_eq!(l.date(), None);
        l.set_filename(b"foo").unwrap();
        assert_eq!(l.filename(), Some(&b"foo"[..]));
        assert!(l.set_filename(vec![0; 256]).is_err());
        l.set_date(Some(1234.into()));
        assert_eq!(l.date(), Some(1234.into()));
    }
}
