//! Packet parsing infrastructure.
//!
//! OpenPGP defines a binary representation suitable for storing and
//! communicating OpenPGP data structures ([Section 3 of RFC 4880]).
//! Parsing is the process of interpreting the binary representation.
//!
//! Parsing in this crate is strict and synchronous: every parser
//! works over an already-materialized byte slice through a bounded
//! [`Reader`], fails with [`Error::Truncated`] if a read would cross
//! the end of the input, and surfaces the precise error at the first
//! violated invariant.  There is no resynchronization; when pulling
//! a sequence of packets from a [`PacketParser`], the first error is
//! fatal for the stream.
//!
//! The [`Parse`] trait is implemented at two levels.  For [`Packet`]
//! and [`PacketPile`], `from_bytes` expects framed packets (header
//! plus body).  For the individual packet types ([`Literal`],
//! [`Key`], [`Signature`], ...), `from_bytes` expects a bare packet
//! body; this is also the form embedded signature subpackets use.
//!
//!   [Section 3 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-3

use std::convert::TryFrom;

use crate::Error;
use crate::KeyID;
use crate::Fingerprint;
use crate::Packet;
use crate::Result;
use crate::crypto::mpi::MPI;
use crate::packet::header::{BodyLength, CTB, Header};
use crate::packet::key::{Key, Key3, Key4};
use crate::packet::signature::subpacket::{
    NotationData, NotationDataFlags, Subpacket, SubpacketArea,
    SubpacketLength, SubpacketTag, SubpacketValue,
};
use crate::packet::signature::{Signature, Signature3, Signature4};
use crate::packet::user_attribute::{self, UserAttribute};
use crate::packet::{
    Common, CompressedData, Literal, MDC, Marker, SED, SEIP, Tag, Trust,
    Unknown, UserID,
};
use crate::types::{Curve, Timestamp};

mod mpis;

/// A length-checked cursor over a byte slice.
///
/// All primitive reads advance the cursor; a read that would cross
/// the end of the slice fails with [`Error::Truncated`] and does not
/// consume anything.
#[derive(Clone, Copy, Debug)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Creates a reader over the given slice.
    pub fn new(buf: &'a [u8]) -> Self {
        Reader { buf, pos: 0 }
    }

    /// Returns the number of octets left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Returns whether all input has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn require(&self, n: usize) -> Result<()> {
        if self.remaining() < n {
            Err(Error::Truncated(n - self.remaining()).into())
        } else {
            Ok(())
        }
    }

    /// Reads a single octet.
    pub fn u8(&mut self) -> Result<u8> {
        self.require(1)?;
        let b = self.buf[self.pos];
        self.pos += 1;
        Ok(b)
    }

    /// Reads a big-endian 16 bit quantity.
    pub fn be_u16(&mut self) -> Result<u16> {
        let b = self.bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    /// Reads a little-endian 16 bit quantity.
    ///
    /// This is only used by the image attribute header, a historical
    /// curiosity.
    pub fn le_u16(&mut self) -> Result<u16> {
        let b = self.bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    /// Reads a big-endian 32 bit quantity.
    pub fn be_u32(&mut self) -> Result<u32> {
        let b = self.bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Reads `n` octets.
    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.require(n)?;
        let s = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(s)
    }

    /// Reads all remaining octets.
    pub fn rest(&mut self) -> &'a [u8] {
        let s = &self.buf[self.pos..];
        self.pos = self.buf.len();
        s
    }

    /// Splits off a reader over the next `n` octets.
    pub fn take(&mut self, n: usize) -> Result<Reader<'a>> {
        Ok(Reader::new(self.bytes(n)?))
    }

    /// Asserts that all input has been consumed.
    pub fn expect_end(&self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::MalformedPacket(
                format!("{} octets of trailing data", self.remaining()))
                .into())
        }
    }
}

/// An abstract interface to parse OpenPGP data types.
///
/// For the framed types ([`Packet`], [`PacketPile`]) the input is a
/// packet stream; for everything else it is a bare body.
pub trait Parse<'a, T> {
    /// Reads from the given slice.
    fn from_bytes(data: &'a [u8]) -> Result<T>;

    /// Reads from the given reader.
    fn from_reader<R: std::io::Read>(reader: R) -> Result<T>;
}

/// Implements `Parse` for a packet body type.
macro_rules! impl_body_parse {
    ($typ:ident) => {
        impl<'a> Parse<'a, $typ> for $typ {
            fn from_bytes(data: &'a [u8]) -> Result<$typ> {
                let mut reader = Reader::new(data);
                let p = $typ::parse(&mut reader, Common::default())?;
                reader.expect_end()?;
                Ok(p)
            }

            fn from_reader<R: std::io::Read>(mut reader: R) -> Result<$typ> {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf)?;
                let mut reader = Reader::new(&buf);
                let p = $typ::parse(&mut reader, Common::default())?;
                reader.expect_end()?;
                Ok(p)
            }
        }
    };
}

impl_body_parse!(Marker);
impl_body_parse!(Literal);
impl_body_parse!(CompressedData);
impl_body_parse!(SED);
impl_body_parse!(SEIP);
impl_body_parse!(MDC);
impl_body_parse!(Trust);
impl_body_parse!(UserID);
impl_body_parse!(UserAttribute);
impl_body_parse!(Key);
impl_body_parse!(Signature);

impl<'a> Parse<'a, Packet> for Packet {
    fn from_bytes(data: &'a [u8]) -> Result<Packet> {
        let mut reader = Reader::new(data);
        let p = Packet::parse(&mut reader)?;
        reader.expect_end()?;
        Ok(p)
    }

    fn from_reader<R: std::io::Read>(mut reader: R) -> Result<Packet> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        let mut reader = Reader::new(&buf);
        let p = Packet::parse(&mut reader)?;
        reader.expect_end()?;
        Ok(p)
    }
}

impl<'a> Parse<'a, Subpacket> for Subpacket {
    fn from_bytes(data: &'a [u8]) -> Result<Subpacket> {
        let mut reader = Reader::new(data);
        let p = Subpacket::parse(&mut reader)?;
        reader.expect_end()?;
        Ok(p)
    }

    fn from_reader<R: std::io::Read>(mut reader: R) -> Result<Subpacket> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        let mut reader = Reader::new(&buf);
        let p = Subpacket::parse(&mut reader)?;
        reader.expect_end()?;
        Ok(p)
    }
}

impl<'a> Parse<'a, MPI> for MPI {
    fn from_bytes(data: &'a [u8]) -> Result<MPI> {
        let mut reader = Reader::new(data);
        let p = MPI::parse(&mut reader)?;
        reader.expect_end()?;
        Ok(p)
    }

    fn from_reader<R: std::io::Read>(mut reader: R) -> Result<MPI> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        let mut reader = Reader::new(&buf);
        let p = MPI::parse(&mut reader)?;
        reader.expect_end()?;
        Ok(p)
    }
}

impl MPI {
    /// Parses an OpenPGP MPI.
    ///
    /// See [Section 3.2 of RFC 4880] for details.  The declared bit
    /// length must be the true bit length of the integer: unused
    /// leading bits must be zero, and no leading zero octets may be
    /// encoded.
    ///
    ///   [Section 3.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-3.2
    pub(crate) fn parse(reader: &mut Reader) -> Result<MPI> {
        let bits = reader.be_u16()? as usize;
        let len = (bits + 7) / 8;
        let value = reader.bytes(len)?;

        let mpi = MPI::new(value);
        if mpi.bits() != bits {
            return Err(Error::MalformedMPI(
                format!("declared {} bits, but the value has {}",
                        bits, mpi.bits())).into());
        }

        Ok(mpi)
    }
}

impl Curve {
    /// Parses a length-prefixed OID.
    ///
    /// The length octets 0 and 0xFF are reserved by [Section 11 of
    /// RFC 6637] and rejected.
    ///
    ///   [Section 11 of RFC 6637]: https://tools.ietf.org/html/rfc6637#section-11
    pub(crate) fn parse(reader: &mut Reader) -> Result<Curve> {
        let len = reader.u8()?;
        if len == 0 || len == 0xff {
            return Err(Error::MalformedOid(
                format!("reserved OID length octet 0x{:02x}", len)).into());
        }
        Ok(Curve::from_oid(reader.bytes(len as usize)?))
    }
}

impl BodyLength {
    /// Parses a new format body length as described in [Section
    /// 4.2.2 of RFC 4880].
    ///
    ///   [Section 4.2.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.2.2
    pub(crate) fn parse_new_format(reader: &mut Reader) -> Result<BodyLength>
    {
        let octet1 = reader.u8()?;
        Ok(match octet1 {
            0..=191 =>
                BodyLength::Full(octet1 as u32),
            192..=223 => {
                let octet2 = reader.u8()?;
                BodyLength::Full(((octet1 as u32 - 192) << 8)
                                 + octet2 as u32 + 192)
            },
            255 =>
                BodyLength::Full(reader.be_u32()?),
            224..=254 =>
                BodyLength::Partial(1u32 << (octet1 & 0x1f)),
        })
    }

    /// Parses an old format body length as described in [Section
    /// 4.2.1 of RFC 4880].
    ///
    ///   [Section 4.2.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.2.1
    pub(crate) fn parse_old_format(reader: &mut Reader,
                                   length_type: PacketLengthType)
                                   -> Result<BodyLength>
    {
        match length_type {
            PacketLengthType::OneOctet =>
                Ok(BodyLength::Full(reader.u8()? as u32)),
            PacketLengthType::TwoOctets =>
                Ok(BodyLength::Full(reader.be_u16()? as u32)),
            PacketLengthType::FourOctets =>
                Ok(BodyLength::Full(reader.be_u32()?)),
            PacketLengthType::Indeterminate =>
                Ok(BodyLength::Indeterminate),
        }
    }
}
use crate::packet::header::PacketLengthType;

impl Header {
    /// Parses a packet header.
    pub fn parse(reader: &mut Reader) -> Result<Header> {
        let ctb = CTB::try_from(reader.u8()?)?;
        let length = match &ctb {
            CTB::New(_) => BodyLength::parse_new_format(reader)?,
            CTB::Old(ctb) =>
                BodyLength::parse_old_format(reader, ctb.length_type())?,
        };
        Ok(Header::new(ctb, length))
    }
}

impl Packet {
    /// Parses one framed packet.
    pub(crate) fn parse(reader: &mut Reader) -> Result<Packet> {
        let header = Header::parse(reader)?;
        header.valid()?;
        let tag = header.ctb().tag();

        let body: std::borrow::Cow<[u8]> = match *header.length() {
            BodyLength::Full(n) =>
                reader.bytes(n as usize)?.into(),
            BodyLength::Indeterminate =>
                reader.rest().into(),
            BodyLength::Partial(first) => {
                // Chunks are concatenated; the body parsers always
                // see a flat body.
                let mut buf = reader.bytes(first as usize)?.to_vec();
                loop {
                    match BodyLength::parse_new_format(reader)? {
                        BodyLength::Full(n) => {
                            buf.extend_from_slice(
                                reader.bytes(n as usize)?);
                            break;
                        },
                        BodyLength::Partial(n) => {
                            buf.extend_from_slice(
                                reader.bytes(n as usize)?);
                        },
                        BodyLength::Indeterminate =>
                            unreachable!("not a new format length"),
                    }
                }
                buf.into()
            },
        };

        Packet::parse_body(tag, &body, header)
    }

    /// Parses a packet body and attaches the given header.
    fn parse_body(tag: Tag, body: &[u8], header: Header) -> Result<Packet> {
        let common = Common::with_header(header);
        let mut reader = Reader::new(body);

        let packet: Packet = match tag {
            Tag::Marker =>
                Marker::parse(&mut reader, common)?.into(),
            Tag::Literal =>
                Literal::parse(&mut reader, common)?.into(),
            Tag::CompressedData =>
                CompressedData::parse(&mut reader, common)?.into(),
            Tag::SED =>
                SED::parse(&mut reader, common)?.into(),
            Tag::SEIP =>
                SEIP::parse(&mut reader, common)?.into(),
            Tag::MDC =>
                MDC::parse(&mut reader, common)?.into(),
            Tag::Trust =>
                Trust::parse(&mut reader, common)?.into(),
            Tag::UserID =>
                UserID::parse(&mut reader, common)?.into(),
            Tag::UserAttribute =>
                UserAttribute::parse(&mut reader, common)?.into(),
            Tag::PublicKey =>
                Packet::PublicKey(Key::parse(&mut reader, common)?),
            Tag::PublicSubkey =>
                Packet::PublicSubkey(Key::parse(&mut reader, common)?),
            Tag::Signature =>
                Signature::parse(&mut reader, common)?.into(),
            _ => return Ok(
                Unknown::with_common(common, tag, body.to_vec()).into()),
        };

        reader.expect_end()?;
        Ok(packet)
    }
}

impl Marker {
    fn parse(reader: &mut Reader, common: Common) -> Result<Marker> {
        let body = reader.bytes(Marker::BODY.len())?;
        if body != Marker::BODY {
            return Err(Error::MalformedPacket(
                format!("invalid marker packet body {:?}", body)).into());
        }
        Ok(Marker::new(common))
    }
}

impl Literal {
    fn parse(reader: &mut Reader, common: Common) -> Result<Literal> {
        let format = reader.u8()?.into();
        let filename_len = reader.u8()? as usize;
        let filename = reader.bytes(filename_len)?;
        let date: Timestamp = reader.be_u32()?.into();
        let body = reader.rest();

        let mut literal = Literal::with_common(common, format);
        literal.set_filename(filename)
            .expect("can't exceed 255 bytes");
        literal.set_date(if date.as_secs() == 0 { None } else { Some(date) });
        literal.set_body(body.to_vec());
        Ok(literal)
    }
}

impl CompressedData {
    fn parse(reader: &mut Reader, common: Common) -> Result<CompressedData> {
        let algo = reader.u8()?.into();
        let mut c = CompressedData::with_common(common, algo);
        c.set_body(reader.rest().to_vec());
        Ok(c)
    }
}

impl SED {
    fn parse(reader: &mut Reader, common: Common) -> Result<SED> {
        let mut p = SED::with_common(common);
        p.set_body(reader.rest().to_vec());
        Ok(p)
    }
}

impl SEIP {
    fn parse(reader: &mut Reader, common: Common) -> Result<SEIP> {
        let version = reader.u8()?;
        if version != 1 {
            return Err(Error::MalformedPacket(
                format!("unknown SEIP version {}", version)).into());
        }
        let mut p = SEIP::with_common(common);
        p.set_body(reader.rest().to_vec());
        Ok(p)
    }
}

impl MDC {
    fn parse(reader: &mut Reader, common: Common) -> Result<MDC> {
        let mut digest = [0u8; 20];
        digest.copy_from_slice(reader.bytes(20)?);
        Ok(MDC::with_common(common, digest))
    }
}

impl Trust {
    fn parse(reader: &mut Reader, common: Common) -> Result<Trust> {
        Ok(Trust::with_common(common, reader.rest().to_vec()))
    }
}

impl UserID {
    fn parse(reader: &mut Reader, common: Common) -> Result<UserID> {
        Ok(UserID::with_common(common, reader.rest().to_vec()))
    }
}

impl UserAttribute {
    fn parse(reader: &mut Reader, common: Common) -> Result<UserAttribute> {
        let mut subpackets = Vec::new();
        while !reader.is_empty() {
            subpackets.push(user_attribute::Subpacket::parse(reader)?);
        }
        Ok(UserAttribute::with_common(common, subpackets))
    }
}

impl user_attribute::Subpacket {
    fn parse(reader: &mut Reader)
             -> Result<user_attribute::Subpacket> {
        let length = SubpacketLength::parse(reader)?;
        if length.len < 1 {
            return Err(Error::MalformedPacket(
                "zero-length user attribute subpacket".into()).into());
        }
        let mut sub = reader.take(length.len as usize)?;
        let tag = sub.u8()?;

        let sp = match tag {
            user_attribute::IMAGE_SUBPACKET_TAG =>
                user_attribute::Subpacket::Image(
                    user_attribute::Image::parse(&mut sub)?),
            _ =>
                user_attribute::Subpacket::Unknown {
                    tag,
                    body: sub.rest().to_vec(),
                },
        };

        sub.expect_end()?;
        Ok(sp)
    }
}

impl user_attribute::Image {
    fn parse(reader: &mut Reader) -> Result<user_attribute::Image> {
        let header_len = reader.le_u16()? as usize;
        if header_len < 4 {
            return Err(Error::MalformedPacket(
                format!("image header length {} too small", header_len))
                .into());
        }
        let version = reader.u8()?;
        let format = reader.u8()?;
        let header_rest = reader.bytes(header_len - 4)?;
        let data = reader.rest();
        Ok(user_attribute::Image::with_parts(
            version, format, header_rest.to_vec(), data.to_vec()))
    }
}

impl Key {
    fn parse(reader: &mut Reader, common: Common) -> Result<Key> {
        let version = reader.u8()?;
        match version {
            2 | 3 => {
                let creation_time = reader.be_u32()?.into();
                let days_valid = reader.be_u16()?;
                let pk_algo = reader.u8()?.into();
                if !crate::types::PublicKeyAlgorithm::is_rsa(&pk_algo) {
                    return Err(Error::MalformedPacket(
                        format!("v{} keys are restricted to RSA, got {}",
                                version, pk_algo)).into());
                }
                let mpis = mpis::public_key_parse(pk_algo, reader)?;
                Ok(Key::V3(Key3::with_common(
                    common, version, creation_time, days_valid, pk_algo,
                    mpis)))
            },
            4 => {
                let creation_time = reader.be_u32()?.into();
                let pk_algo = reader.u8()?.into();
                let mpis = mpis::public_key_parse(pk_algo, reader)?;
                Ok(Key::V4(Key4::with_common(
                    common, creation_time, pk_algo, mpis)))
            },
            _ => Err(Error::MalformedPacket(
                format!("unknown key packet version {}", version)).into()),
        }
    }
}

impl Signature {
    pub(crate) fn parse(reader: &mut Reader, common: Common)
                        -> Result<Signature> {
        let version = reader.u8()?;
        match version {
            2 | 3 => {
                let hashed_len = reader.u8()?;
                if hashed_len != 5 {
                    return Err(Error::MalformedPacket(
                        format!("v3 signature hashed length must be 5, \
                                 got {}", hashed_len)).into());
                }
                let typ = reader.u8()?.into();
                let creation_time = reader.be_u32()?.into();
                let issuer = KeyID::from_bytes(reader.bytes(8)?);
                let pk_algo = reader.u8()?.into();
                let hash_algo = reader.u8()?.into();
                let mut digest_prefix = [0u8; 2];
                digest_prefix.copy_from_slice(reader.bytes(2)?);
                let mpis = mpis::signature_parse(pk_algo, reader)?;
                Ok(Signature::V3(Signature3::with_common(
                    common, version, typ, creation_time, issuer, pk_algo,
                    hash_algo, digest_prefix, mpis)))
            },
            4 => {
                let typ = reader.u8()?.into();
                let pk_algo = reader.u8()?.into();
                let hash_algo = reader.u8()?.into();

                let hashed_len = reader.be_u16()? as usize;
                let mut hashed = reader.take(hashed_len)?;
                let hashed_area = SubpacketArea::parse(&mut hashed)?;

                let unhashed_len = reader.be_u16()? as usize;
                let mut unhashed = reader.take(unhashed_len)?;
                let unhashed_area = SubpacketArea::parse(&mut unhashed)?;

                let mut digest_prefix = [0u8; 2];
                digest_prefix.copy_from_slice(reader.bytes(2)?);
                let mpis = mpis::signature_parse(pk_algo, reader)?;
                Ok(Signature::V4(Signature4::with_common(
                    common, typ, pk_algo, hash_algo, hashed_area,
                    unhashed_area, digest_prefix, mpis)))
            },
            _ => Err(Error::MalformedPacket(
                format!("unknown signature packet version {}", version))
                .into()),
        }
    }
}

impl SubpacketLength {
    /// Parses a subpacket length.
    ///
    /// This is the new-format body length encoding, except that
    /// partial body lengths are not permitted.  A redundant (longer
    /// than necessary) encoding is accepted, and its raw octets are
    /// kept for re-serialization.
    pub(crate) fn parse(reader: &mut Reader) -> Result<SubpacketLength> {
        let octet1 = reader.u8()?;
        match octet1 {
            0..=191 =>
                Ok(SubpacketLength::new(octet1 as u32, None)),
            192..=223 => {
                let octet2 = reader.u8()?;
                // This encoding cannot express a length below 192,
                // so it is always minimal.
                Ok(SubpacketLength::new(
                    ((octet1 as u32 - 192) << 8) + octet2 as u32 + 192,
                    None))
            },
            255 => {
                let len = reader.be_u32()?;
                let raw = if len > 8383 {
                    None
                } else {
                    let b = len.to_be_bytes();
                    Some(vec![255, b[0], b[1], b[2], b[3]])
                };
                Ok(SubpacketLength::new(len, raw))
            },
            224..=254 =>
                Err(Error::MalformedPacket(
                    "partial body length in subpacket".into()).into()),
        }
    }
}

impl SubpacketArea {
    /// Parses a subpacket area.
    ///
    /// The reader must cover exactly the area; the subpackets'
    /// lengths must add up to the declared area length.
    pub(crate) fn parse(reader: &mut Reader) -> Result<SubpacketArea> {
        let mut packets = Vec::new();
        while !reader.is_empty() {
            packets.push(Subpacket::parse(reader)?);
        }
        Ok(packets.into())
    }
}

impl Subpacket {
    /// Parses a single length-prefixed subpacket.
    pub(crate) fn parse(reader: &mut Reader) -> Result<Subpacket> {
        let length = SubpacketLength::parse(reader)?;
        if length.len < 1 {
            return Err(Error::MalformedPacket(
                "zero-length subpacket".into()).into());
        }

        let mut sub = reader.take(length.len as usize)?;
        let tag_octet = sub.u8()?;
        let critical = tag_octet & 0x80 != 0;
        let value = SubpacketValue::parse(tag_octet & 0x7f, &mut sub)?;
        sub.expect_end()?;

        Ok(Subpacket::with_length(length, value, critical))
    }
}

fn parse_bool(reader: &mut Reader) -> Result<bool> {
    match reader.u8()? {
        0 => Ok(false),
        1 => Ok(true),
        b => Err(Error::MalformedPacket(
            format!("invalid boolean octet 0x{:02x}", b)).into()),
    }
}

impl SubpacketValue {
    fn parse(tag_octet: u8, reader: &mut Reader) -> Result<SubpacketValue> {
        use self::SubpacketValue::*;

        Ok(match SubpacketTag::from(tag_octet) {
            SubpacketTag::SignatureCreationTime =>
                SignatureCreationTime(reader.be_u32()?.into()),
            SubpacketTag::SignatureExpirationTime =>
                SignatureExpirationTime(reader.be_u32()?.into()),
            SubpacketTag::ExportableCertification =>
                ExportableCertification(parse_bool(reader)?),
            SubpacketTag::TrustSignature =>
                TrustSignature {
                    level: reader.u8()?,
                    trust: reader.u8()?,
                },
            SubpacketTag::RegularExpression =>
                RegularExpression(reader.rest().to_vec()),
            SubpacketTag::Revocable =>
                Revocable(parse_bool(reader)?),
            SubpacketTag::KeyExpirationTime =>
                KeyExpirationTime(reader.be_u32()?.into()),
            SubpacketTag::PreferredSymmetricAlgorithms =>
                PreferredSymmetricAlgorithms(
                    reader.rest().iter().map(|b| (*b).into()).collect()),
            SubpacketTag::RevocationKey => {
                let class = reader.u8()?;
                let pk_algo = reader.u8()?.into();
                let fp = Fingerprint::from_bytes(reader.bytes(20)?);
                RevocationKey(
                    crate::types::RevocationKey::from_raw(
                        class, pk_algo, fp)?)
            },
            SubpacketTag::Issuer =>
                Issuer(KeyID::from_bytes(reader.bytes(8)?)),
            SubpacketTag::NotationData => {
                let mut flag_bytes = [0u8; 4];
                flag_bytes.copy_from_slice(reader.bytes(4)?);
                let flags = NotationDataFlags::new(flag_bytes);
                let name_len = reader.be_u16()? as usize;
                let value_len = reader.be_u16()? as usize;
                let name = reader.bytes(name_len)?;
                let value = reader.bytes(value_len)?;
                if flags.is_human_readable() {
                    // Only then is the name required to be UTF-8.
                    std::str::from_utf8(name).map_err(|_| {
                        Error::MalformedPacket(
                            "human-readable notation name is not UTF-8"
                                .into())
                    })?;
                }
                NotationData(
                    crate::packet::signature::subpacket::NotationData::new(
                        flags, name, value))
            },
            SubpacketTag::PreferredHashAlgorithms =>
                PreferredHashAlgorithms(
                    reader.rest().iter().map(|b| (*b).into()).collect()),
            SubpacketTag::PreferredCompressionAlgorithms =>
                PreferredCompressionAlgorithms(
                    reader.rest().iter().map(|b| (*b).into()).collect()),
            SubpacketTag::KeyServerPreferences =>
                KeyServerPreferences(
                    crate::types::KeyServerPreferences::new(reader.rest())),
            SubpacketTag::PreferredKeyServer =>
                PreferredKeyServer(reader.rest().to_vec()),
            SubpacketTag::PrimaryUserID =>
                PrimaryUserID(parse_bool(reader)?),
            SubpacketTag::PolicyURI =>
                PolicyURI(reader.rest().to_vec()),
            SubpacketTag::KeyFlags =>
                KeyFlags(crate::types::KeyFlags::new(reader.rest())),
            SubpacketTag::SignersUserID =>
                SignersUserID(reader.rest().to_vec()),
            SubpacketTag::ReasonForRevocation =>
                ReasonForRevocation {
                    code: reader.u8()?.into(),
                    reason: reader.rest().to_vec(),
                },
            SubpacketTag::Features =>
                Features(crate::types::Features::new(reader.rest())),
            SubpacketTag::SignatureTarget =>
                SignatureTarget {
                    pk_algo: reader.u8()?.into(),
                    hash_algo: reader.u8()?.into(),
                    digest: reader.rest().to_vec(),
                },
            SubpacketTag::EmbeddedSignature =>
                EmbeddedSignature(Box::new(
                    Signature::parse(reader, Common::default())?)),
            SubpacketTag::Unknown(tag) =>
                Unknown {
                    tag,
                    body: reader.rest().to_vec(),
                },
        })
    }
}

/// A lazy packet sequence parser.
///
/// The parser yields one packet at a time.  Partial body chunks are
/// concatenated before the variant parser is invoked; an
/// indeterminate body extends to the end of the input.  Errors are
/// fatal for the stream: after yielding `Err`, the iterator is
/// exhausted.
pub struct PacketParser<'a> {
    reader: Reader<'a>,
    done: bool,
}
assert_send_and_sync!(PacketParser<'static>);

impl<'a> PacketParser<'a> {
    /// Creates a parser over the given byte slice.
    pub fn from_bytes(data: &'a [u8]) -> Self {
        PacketParser {
            reader: Reader::new(data),
            done: false,
        }
    }
}

impl<'a> Iterator for PacketParser<'a> {
    type Item = Result<Packet>;

    fn next(&mut self) -> Option<Result<Packet>> {
        if self.done || self.reader.is_empty() {
            return None;
        }

        match Packet::parse(&mut self.reader) {
            Ok(p) => Some(Ok(p)),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            },
        }
    }
}

/// An unstructured [packet] sequence.
///
///   [packet]: crate::packet
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PacketPile {
    packets: Vec<Packet>,
}
assert_send_and_sync!(PacketPile);

impl From<Vec<Packet>> for PacketPile {
    fn from(packets: Vec<Packet>) -> Self {
        PacketPile { packets }
    }
}

impl From<Packet> for PacketPile {
    fn from(packet: Packet) -> Self {
        PacketPile { packets: vec![packet] }
    }
}

impl PacketPile {
    /// Returns an iterator over the packets.
    pub fn children(&self) -> impl Iterator<Item = &Packet> + Send + Sync {
        self.packets.iter()
    }

    /// Consumes the pile, returning the packets.
    pub fn into_children(self) -> impl Iterator<Item = Packet> + Send + Sync {
        self.packets.into_iter()
    }
}

impl<'a> Parse<'a, PacketPile> for PacketPile {
    fn from_bytes(data: &'a [u8]) -> Result<PacketPile> {
        PacketParser::from_bytes(data)
            .collect::<Result<Vec<Packet>>>()
            .map(Into::into)
    }

    fn from_reader<R: std::io::Read>(mut reader: R) -> Result<PacketPile> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        PacketParser::from_bytes(&buf)
            .collect::<Result<Vec<Packet>>>()
            .map(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialize::{Marshal, MarshalInto};
    use crate::types::DataFormat;

    /// A new-format literal packet, mode `b`, filename `H`,
    /// timestamp 0x48010203, body `hi!\n`.
    const LITERAL: &[u8] = &[
        0xCB, 0x0B,
        0x62,
        0x01, 0x48,
        0x48, 0x01, 0x02, 0x03,
        0x68, 0x69, 0x21, 0x0A,
    ];

    #[test]
    fn literal() {
        let p = Packet::from_bytes(LITERAL).unwrap();
        match &p {
            Packet::Literal(l) => {
                assert_eq!(l.format(), DataFormat::Binary);
                assert_eq!(l.filename(), Some(&b"H"[..]));
                assert_eq!(l.date(), Some(0x48010203.into()));
                assert_eq!(l.body(), b"hi!\n");
            },
            _ => panic!("expected a literal packet"),
        }

        // Byte-for-byte round trip.
        assert_eq!(p.to_vec().unwrap(), LITERAL);
    }

    #[test]
    fn truncated_public_key() {
        // An old-format public key packet with a two-octet length of
        // 13, but only 10 octets of body.
        let data: &[u8] = &[
            0x99, 0x00, 0x0D,
            0x04, 0x5A, 0x64, 0x9C, 0x0A, 0x01, 0x00, 0x11, 0x01, 0x42,
        ];
        let err = Packet::from_bytes(data).unwrap_err();
        match err.downcast_ref::<Error>() {
            Some(Error::Truncated(n)) => assert_eq!(*n, 3),
            e => panic!("expected Truncated, got {:?}", e),
        }
    }

    #[test]
    fn partial_body() {
        // A literal packet in two chunks: a partial chunk of four
        // octets, closed by a definite length of three.
        let data: &[u8] = &[
            0xCB,
            0xE2,                           // 1 << 2 = 4 octet chunk
            0x62, 0x00, 0x00, 0x00,
            0x03,                           // final chunk
            0x00, 0x00, 0x47,
        ];
        let p = Packet::from_bytes(data).unwrap();
        match &p {
            Packet::Literal(l) => {
                assert_eq!(l.filename(), None);
                assert_eq!(l.date(), None);
                assert_eq!(l.body(), b"G");
            },
            _ => panic!("expected a literal packet"),
        }

        // The default serializer emits a definite length.
        let out = p.to_vec().unwrap();
        assert_eq!(out, &[0xCB, 0x07,
                          0x62, 0x00, 0x00, 0x00, 0x00, 0x00, 0x47]);
    }

    #[test]
    fn partial_body_not_allowed_for_signatures() {
        let data: &[u8] = &[0xC2, 0xE2, 0x00, 0x00, 0x00, 0x00];
        assert!(Packet::from_bytes(data).is_err());
    }

    #[test]
    fn indeterminate_length() {
        // Old format CTB for a literal packet with indeterminate
        // length: 0b10_1011_11.
        let mut data: Vec<u8> = vec![0xAF];
        data.extend_from_slice(&[0x62, 0x00, 0x00, 0x00, 0x00, 0x00]);
        data.extend_from_slice(b"hi");

        let p = Packet::from_bytes(&data).unwrap();
        match &p {
            Packet::Literal(l) => assert_eq!(l.body(), b"hi"),
            _ => panic!("expected a literal packet"),
        }

        // Indeterminate framing is preserved.
        assert_eq!(p.to_vec().unwrap(), data);
    }

    #[test]
    fn stream() {
        let mut data = Vec::new();
        data.extend_from_slice(&[0xCA, 0x03, b'P', b'G', b'P']);
        data.extend_from_slice(LITERAL);

        let pile = PacketPile::from_bytes(&data).unwrap();
        assert_eq!(pile.children().count(), 2);

        let mut out = Vec::new();
        pile.serialize(&mut out).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn stream_error_is_fatal() {
        let mut data = Vec::new();
        data.extend_from_slice(&[0xCA, 0x03, b'X', b'Y', b'Z']);   // bad marker
        data.extend_from_slice(LITERAL);

        let mut parser = PacketParser::from_bytes(&data);
        assert!(parser.next().unwrap().is_err());
        assert!(parser.next().is_none());
    }

    #[test]
    fn bounded_reads_on_all_prefixes() {
        let mut data = Vec::new();
        data.extend_from_slice(&[0xCA, 0x03, b'P', b'G', b'P']);
        data.extend_from_slice(LITERAL);
        // A small v4 signature with one subpacket.
        data.extend_from_slice(&[
            0xC2, 0x13,
            0x04, 0x00, 0x01, 0x08,
            0x00, 0x06, 0x05, 0x02, 0x48, 0x01, 0x02, 0x03,
            0x00, 0x00,
            0xbe, 0xef,
            0x00, 0x02, 0x03,
        ]);

        // The whole blob parses.
        assert!(PacketPile::from_bytes(&data).is_ok());

        // Every proper prefix either parses to a shorter sequence
        // (if cut on a packet boundary) or fails; it never panics or
        // overruns.
        for cut in 0..data.len() {
            let _ = PacketPile::from_bytes(&data[..cut]);
        }
    }

    #[test]
    fn area_length_consistency() {
        // Hashed area declares 7 octets, but contains a 5+1 octet
        // subpacket followed by a length octet pointing past the
        // area's end.
        let data: &[u8] = &[
            0x04, 0x00, 0x01, 0x08,
            0x00, 0x07,
            0x05, 0x02, 0x48, 0x01, 0x02, 0x03,
            0x05,                           // overruns the area
            0x00, 0x00,
            0xbe, 0xef,
            0x00, 0x02, 0x03,
        ];
        assert!(Signature::from_bytes(data).is_err());
    }

    #[test]
    fn redundant_subpacket_length_roundtrips() {
        // A signature creation time subpacket using a redundant
        // five-octet length encoding.
        let data: &[u8] = &[
            0xFF, 0x00, 0x00, 0x00, 0x05,
            0x02,
            0x48, 0x01, 0x02, 0x03,
        ];
        let sp = Subpacket::from_bytes(data).unwrap();
        assert_eq!(sp.tag(), SubpacketTag::SignatureCreationTime);
        assert_eq!(sp.to_vec().unwrap(), data);
    }
}
