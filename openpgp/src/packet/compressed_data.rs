use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::Packet;
use crate::packet;
use crate::types::CompressionAlgorithm;

/// Holds a compressed data packet.
///
/// A compressed data packet contains a compressed stream of packets.
/// See [Section 5.6 of RFC 4880] for details.
///
/// This codec does not implement the compression algorithms; the
/// compressed stream is carried verbatim and handed to (or received
/// from) the consumer undecoded.
///
///   [Section 5.6 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.6
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CompressedData {
    pub(crate) common: packet::Common,
    /// Algorithm used to compress the payload.
    algo: CompressionAlgorithm,
    /// The compressed payload.
    body: Vec<u8>,
}
assert_send_and_sync!(CompressedData);

impl fmt::Debug for CompressedData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CompressedData")
            .field("algo", &self.algo)
            .field("body", &format!("{} bytes", self.body.len()))
            .finish()
    }
}

impl CompressedData {
    /// Returns a new `CompressedData` packet.
    pub fn new(algo: CompressionAlgorithm) -> Self {
        CompressedData {
            common: Default::default(),
            algo,
            body: Vec::new(),
        }
    }

    pub(crate) fn with_common(common: packet::Common,
                              algo: CompressionAlgorithm) -> Self {
        CompressedData {
            common,
            algo,
            body: Vec::new(),
        }
    }

    /// Returns the compression algorithm.
    pub fn algo(&self) -> CompressionAlgorithm {
        self.algo
    }

    /// Sets the compression algorithm.
    pub fn set_algo(&mut self, algo: CompressionAlgorithm)
                    -> CompressionAlgorithm {
        std::mem::replace(&mut self.algo, algo)
    }

    /// Gets the compressed payload.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Sets the compressed payload.
    pub fn set_body(&mut self, data: Vec<u8>) -> Vec<u8> {
        std::mem::replace(&mut self.body, data)
    }
}

impl From<CompressedData> for Packet {
    fn from(s: CompressedData) -> Self {
        Packet::CompressedData(s)
    }
}

#[cfg(test)]
impl Arbitrary for CompressedData {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut c = CompressedData::new(CompressionAlgorithm::arbitrary(g));
        c.set_body(Vec::<u8>::arbitrary(g));
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Parse;
    use crate::serialize::MarshalInto;

    quickcheck! {
        fn roundtrip(p: CompressedData) -> bool {
            let q = CompressedData::from_bytes(&p.to_vec().unwrap()).unwrap();
            p == q
        }
    }
}
