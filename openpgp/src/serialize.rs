//! Packet serialization infrastructure.
//!
//! Every value type that has a wire representation implements
//! [`Marshal`]; [`MarshalInto`] provides the corresponding
//! convenience buffer interface.
//!
//! For the individual packet types, `serialize` emits the bare
//! packet body, mirroring what their [`Parse`] implementations
//! consume.  [`Packet`] (and [`PacketPile`]) emit full framing: the
//! header encoding is selected as follows.  A packet parsed from an
//! old-format frame is serialized in the old format again, keeping
//! the original length type when the body still fits it, and keeping
//! indeterminate framing as such.  Everything else gets a new-format
//! frame with the shortest definite length encoding; in particular,
//! bodies parsed from partial-body chunks are emitted with a
//! definite length.  [`Packet::serialize_canonical`] ignores the
//! remembered framing altogether.
//!
//!   [`Parse`]: crate::parse::Parse

use std::io::Write;

use crate::Error;
use crate::Packet;
use crate::Result;
use crate::crypto::mpi;
use crate::packet::header::{CTB, CTBOld, PacketLengthType};
use crate::packet::key::Key;
use crate::packet::signature::subpacket::{
    Subpacket, SubpacketArea, SubpacketLength, SubpacketValue,
};
use crate::packet::signature::Signature;
use crate::packet::user_attribute::{self, UserAttribute};
use crate::packet::{
    CompressedData, Literal, MDC, Marker, SED, SEIP, Tag, Trust, Unknown,
    UserID,
};
use crate::parse::PacketPile;
use crate::types::Curve;

/// Serializes OpenPGP data structures.
pub trait Marshal {
    /// Writes a serialized version of the object to `o`.
    fn serialize(&self, o: &mut dyn Write) -> Result<()>;
}

/// Serializes OpenPGP data structures into pre-allocated buffers.
pub trait MarshalInto {
    /// Serializes the object into a vector.
    fn to_vec(&self) -> Result<Vec<u8>>;
}

impl<T: Marshal + ?Sized> MarshalInto for T {
    fn to_vec(&self) -> Result<Vec<u8>> {
        let mut o = Vec::new();
        self.serialize(&mut o)?;
        Ok(o)
    }
}

/// Writes a new-format body length with the shortest encoding.
pub(crate) fn write_new_length(o: &mut dyn Write, len: u32) -> Result<()> {
    if len < 192 {
        o.write_all(&[len as u8])?;
    } else if len < 8384 {
        let v = len - 192;
        o.write_all(&[(v >> 8) as u8 + 192, (v & 0xff) as u8])?;
    } else {
        o.write_all(&[0xff])?;
        o.write_all(&len.to_be_bytes())?;
    }
    Ok(())
}

fn write_new_envelope(tag: Tag, body: &[u8], o: &mut dyn Write)
                      -> Result<()> {
    o.write_all(&[0b1100_0000 | u8::from(tag)])?;
    write_new_length(o, body.len() as u32)?;
    o.write_all(body)?;
    Ok(())
}

fn write_old_envelope(ctb: &CTBOld, body: &[u8], o: &mut dyn Write)
                      -> Result<()> {
    use self::PacketLengthType::*;

    let tag = u8::from(ctb.tag());
    let len = body.len() as u32;

    // Keep the parsed length type if the body still fits, otherwise
    // fall back to the smallest one that does.
    let length_type = match ctb.length_type() {
        Indeterminate => Indeterminate,
        OneOctet if len <= 0xff => OneOctet,
        OneOctet | TwoOctets if len <= 0xffff => TwoOctets,
        _ => FourOctets,
    };

    o.write_all(&[0b1000_0000 | (tag << 2) | u8::from(length_type)])?;
    match length_type {
        OneOctet => o.write_all(&[len as u8])?,
        TwoOctets => o.write_all(&(len as u16).to_be_bytes())?,
        FourOctets => o.write_all(&len.to_be_bytes())?,
        Indeterminate => (),
    }
    o.write_all(body)?;
    Ok(())
}

impl Packet {
    fn body_to_vec(&self) -> Result<Vec<u8>> {
        let mut v = Vec::new();
        match self {
            Packet::Marker(p) => p.serialize(&mut v)?,
            Packet::Literal(p) => p.serialize(&mut v)?,
            Packet::CompressedData(p) => p.serialize(&mut v)?,
            Packet::SED(p) => p.serialize(&mut v)?,
            Packet::SEIP(p) => p.serialize(&mut v)?,
            Packet::MDC(p) => p.serialize(&mut v)?,
            Packet::Trust(p) => p.serialize(&mut v)?,
            Packet::UserID(p) => p.serialize(&mut v)?,
            Packet::UserAttribute(p) => p.serialize(&mut v)?,
            Packet::PublicKey(p) => p.serialize(&mut v)?,
            Packet::PublicSubkey(p) => p.serialize(&mut v)?,
            Packet::Signature(p) => p.serialize(&mut v)?,
            Packet::Unknown(p) => p.serialize(&mut v)?,
        }
        Ok(v)
    }

    /// Serializes the packet with a canonical new-format frame,
    /// ignoring the framing it was parsed with.
    pub fn serialize_canonical(&self, o: &mut dyn Write) -> Result<()> {
        let body = self.body_to_vec()?;
        check_body_len(body.len())?;
        write_new_envelope(self.tag(), &body, o)
    }
}

fn check_body_len(len: usize) -> Result<()> {
    if len > u32::MAX as usize {
        Err(Error::InvalidOperation(
            "packet body exceeds the maximum encodable length".into())
            .into())
    } else {
        Ok(())
    }
}

impl Marshal for Packet {
    fn serialize(&self, o: &mut dyn Write) -> Result<()> {
        let body = self.body_to_vec()?;
        check_body_len(body.len())?;

        if let Some(header) = self.header() {
            if let CTB::Old(ctb) = header.ctb() {
                return write_old_envelope(ctb, &body, o);
            }
        }

        write_new_envelope(self.tag(), &body, o)
    }
}

impl Marshal for PacketPile {
    fn serialize(&self, o: &mut dyn Write) -> Result<()> {
        for p in self.children() {
            p.serialize(o)?;
        }
        Ok(())
    }
}

impl Marshal for mpi::MPI {
    fn serialize(&self, o: &mut dyn Write) -> Result<()> {
        let bits = self.bits();
        if bits > 0xffff {
            return Err(Error::InvalidOperation(
                format!("MPI of {} bits is too large", bits)).into());
        }
        o.write_all(&(bits as u16).to_be_bytes())?;
        o.write_all(self.value())?;
        Ok(())
    }
}

impl Marshal for Curve {
    fn serialize(&self, o: &mut dyn Write) -> Result<()> {
        let oid = self.oid();
        if oid.is_empty() || oid.len() >= 0xff {
            return Err(Error::InvalidOperation(
                format!("OID of {} octets is not encodable", oid.len()))
                .into());
        }
        o.write_all(&[oid.len() as u8])?;
        o.write_all(oid)?;
        Ok(())
    }
}

impl Marshal for mpi::PublicKey {
    fn serialize(&self, o: &mut dyn Write) -> Result<()> {
        use crate::crypto::mpi::PublicKey::*;
        match self {
            RSA { e, n } => {
                n.serialize(o)?;
                e.serialize(o)?;
            },

            DSA { p, q, g, y } => {
                p.serialize(o)?;
                q.serialize(o)?;
                g.serialize(o)?;
                y.serialize(o)?;
            },

            ElGamal { p, g, y } => {
                p.serialize(o)?;
                g.serialize(o)?;
                y.serialize(o)?;
            },

            EdDSA { curve, q } => {
                curve.serialize(o)?;
                q.serialize(o)?;
            },

            ECDSA { curve, q } => {
                curve.serialize(o)?;
                q.serialize(o)?;
            },

            ECDH { curve, q, hash, sym } => {
                curve.serialize(o)?;
                q.serialize(o)?;
                o.write_all(&[3, 1, (*hash).into(), (*sym).into()])?;
            },

            Unknown { mpis, rest } => {
                for mpi in mpis.iter() {
                    mpi.serialize(o)?;
                }
                o.write_all(rest)?;
            },
        }
        Ok(())
    }
}

impl Marshal for mpi::Signature {
    fn serialize(&self, o: &mut dyn Write) -> Result<()> {
        use crate::crypto::mpi::Signature::*;
        match self {
            RSA { s } => {
                s.serialize(o)?;
            },

            DSA { r, s } | ECDSA { r, s } | EdDSA { r, s } => {
                r.serialize(o)?;
                s.serialize(o)?;
            },

            Unknown { mpis, rest } => {
                for mpi in mpis.iter() {
                    mpi.serialize(o)?;
                }
                o.write_all(rest)?;
            },
        }
        Ok(())
    }
}

impl Marshal for Marker {
    fn serialize(&self, o: &mut dyn Write) -> Result<()> {
        o.write_all(Marker::BODY)?;
        Ok(())
    }
}

impl Marshal for Literal {
    fn serialize(&self, o: &mut dyn Write) -> Result<()> {
        let filename = self.filename_raw();
        debug_assert!(filename.len() <= 255);

        o.write_all(&[self.format().into(), filename.len() as u8])?;
        o.write_all(filename)?;
        o.write_all(&self.date_raw().as_secs().to_be_bytes())?;
        o.write_all(self.body())?;
        Ok(())
    }
}

impl Marshal for CompressedData {
    fn serialize(&self, o: &mut dyn Write) -> Result<()> {
        o.write_all(&[self.algo().into()])?;
        o.write_all(self.body())?;
        Ok(())
    }
}

impl Marshal for SED {
    fn serialize(&self, o: &mut dyn Write) -> Result<()> {
        o.write_all(self.body())?;
        Ok(())
    }
}

impl Marshal for SEIP {
    fn serialize(&self, o: &mut dyn Write) -> Result<()> {
        o.write_all(&[self.version()])?;
        o.write_all(self.body())?;
        Ok(())
    }
}

impl Marshal for MDC {
    fn serialize(&self, o: &mut dyn Write) -> Result<()> {
        o.write_all(self.digest())?;
        Ok(())
    }
}

impl Marshal for Trust {
    fn serialize(&self, o: &mut dyn Write) -> Result<()> {
        o.write_all(self.value())?;
        Ok(())
    }
}

impl Marshal for UserID {
    fn serialize(&self, o: &mut dyn Write) -> Result<()> {
        o.write_all(self.value())?;
        Ok(())
    }
}

impl Marshal for UserAttribute {
    fn serialize(&self, o: &mut dyn Write) -> Result<()> {
        for sp in self.subpackets() {
            sp.serialize(o)?;
        }
        Ok(())
    }
}

impl Marshal for user_attribute::Subpacket {
    fn serialize(&self, o: &mut dyn Write) -> Result<()> {
        let mut body = Vec::new();
        body.push(self.tag());
        match self {
            user_attribute::Subpacket::Image(img) =>
                img.serialize(&mut body)?,
            user_attribute::Subpacket::Unknown { body: b, .. } =>
                body.extend_from_slice(b),
        }

        write_new_length(o, body.len() as u32)?;
        o.write_all(&body)?;
        Ok(())
    }
}

impl Marshal for user_attribute::Image {
    fn serialize(&self, o: &mut dyn Write) -> Result<()> {
        if self.header_rest().len() + 4 > 0xffff {
            return Err(Error::InvalidOperation(
                "image header too large".into()).into());
        }
        o.write_all(&self.header_len().to_le_bytes())?;
        o.write_all(&[self.version(), self.format()])?;
        o.write_all(self.header_rest())?;
        o.write_all(self.data())?;
        Ok(())
    }
}

impl Marshal for Key {
    fn serialize(&self, o: &mut dyn Write) -> Result<()> {
        match self {
            Key::V3(k) => {
                o.write_all(&[k.version()])?;
                o.write_all(&k.creation_time().as_secs().to_be_bytes())?;
                o.write_all(&k.days_valid().to_be_bytes())?;
                o.write_all(&[k.pk_algo().into()])?;
                k.mpis().serialize(o)?;
            },
            Key::V4(k) => {
                o.write_all(&[4])?;
                o.write_all(&k.creation_time().as_secs().to_be_bytes())?;
                o.write_all(&[k.pk_algo().into()])?;
                k.mpis().serialize(o)?;
            },
        }
        Ok(())
    }
}

impl Marshal for Signature {
    fn serialize(&self, o: &mut dyn Write) -> Result<()> {
        match self {
            Signature::V3(s) => {
                o.write_all(&[s.version(), 5, s.typ().into()])?;
                o.write_all(&s.creation_time().as_secs().to_be_bytes())?;
                o.write_all(s.issuer().as_bytes())?;
                o.write_all(&[s.pk_algo().into(), s.hash_algo().into()])?;
                o.write_all(s.digest_prefix())?;
                s.mpis().serialize(o)?;
            },
            Signature::V4(s) => {
                o.write_all(&[4, s.typ().into(), s.pk_algo().into(),
                              s.hash_algo().into()])?;

                let hashed = s.hashed_area().to_vec()?;
                write_area_length(o, hashed.len())?;
                o.write_all(&hashed)?;

                let unhashed = s.unhashed_area().to_vec()?;
                write_area_length(o, unhashed.len())?;
                o.write_all(&unhashed)?;

                o.write_all(s.digest_prefix())?;
                s.mpis().serialize(o)?;
            },
        }
        Ok(())
    }
}

fn write_area_length(o: &mut dyn Write, len: usize) -> Result<()> {
    if len > 0xffff {
        return Err(Error::InvalidOperation(
            format!("subpacket area of {} octets does not fit the \
                     two-octet length field", len)).into());
    }
    o.write_all(&(len as u16).to_be_bytes())?;
    Ok(())
}

impl Marshal for SubpacketArea {
    fn serialize(&self, o: &mut dyn Write) -> Result<()> {
        for sp in self.iter() {
            sp.serialize(o)?;
        }
        Ok(())
    }
}

impl Marshal for Subpacket {
    fn serialize(&self, o: &mut dyn Write) -> Result<()> {
        let mut body = Vec::new();
        body.push(u8::from(self.tag())
                  | if self.critical() { 0x80 } else { 0 });
        self.value().serialize_value(&mut body)?;

        self.length.write(o, body.len() as u32)?;
        o.write_all(&body)?;
        Ok(())
    }
}

impl SubpacketLength {
    /// Writes the length, reusing a redundant parsed encoding when
    /// it still matches.
    fn write(&self, o: &mut dyn Write, computed_len: u32) -> Result<()> {
        match &self.raw {
            Some(raw) if self.len == computed_len => {
                o.write_all(raw)?;
                Ok(())
            },
            _ => write_new_length(o, computed_len),
        }
    }
}

impl SubpacketValue {
    pub(crate) fn serialize_value(&self, o: &mut dyn Write) -> Result<()> {
        use self::SubpacketValue::*;
        match self {
            SignatureCreationTime(t) =>
                o.write_all(&t.as_secs().to_be_bytes())?,
            SignatureExpirationTime(d) =>
                o.write_all(&d.as_secs().to_be_bytes())?,
            ExportableCertification(v) =>
                o.write_all(&[*v as u8])?,
            TrustSignature { level, trust } =>
                o.write_all(&[*level, *trust])?,
            RegularExpression(re) =>
                o.write_all(re)?,
            Revocable(v) =>
                o.write_all(&[*v as u8])?,
            KeyExpirationTime(d) =>
                o.write_all(&d.as_secs().to_be_bytes())?,
            PreferredSymmetricAlgorithms(algos) =>
                for a in algos {
                    o.write_all(&[(*a).into()])?;
                },
            RevocationKey(rk) => {
                let (pk_algo, fp) = rk.revoker();
                if fp.as_bytes().len() != 20 {
                    return Err(Error::InvalidOperation(
                        "revocation key fingerprint must be 20 octets"
                            .into()).into());
                }
                o.write_all(&[rk.class(), pk_algo.into()])?;
                o.write_all(fp.as_bytes())?;
            },
            Issuer(id) =>
                o.write_all(id.as_bytes())?,
            NotationData(nd) => {
                if nd.name().len() > 0xffff || nd.value().len() > 0xffff {
                    return Err(Error::InvalidOperation(
                        "notation name or value too large".into()).into());
                }
                o.write_all(nd.flags().as_bytes())?;
                o.write_all(&(nd.name().len() as u16).to_be_bytes())?;
                o.write_all(&(nd.value().len() as u16).to_be_bytes())?;
                o.write_all(nd.name())?;
                o.write_all(nd.value())?;
            },
            PreferredHashAlgorithms(algos) =>
                for a in algos {
                    o.write_all(&[(*a).into()])?;
                },
            PreferredCompressionAlgorithms(algos) =>
                for a in algos {
                    o.write_all(&[(*a).into()])?;
                },
            KeyServerPreferences(p) =>
                o.write_all(p.as_bytes())?,
            PreferredKeyServer(uri) =>
                o.write_all(uri)?,
            PrimaryUserID(v) =>
                o.write_all(&[*v as u8])?,
            PolicyURI(uri) =>
                o.write_all(uri)?,
            KeyFlags(f) =>
                o.write_all(f.as_bytes())?,
            SignersUserID(uid) =>
                o.write_all(uid)?,
            ReasonForRevocation { code, reason } => {
                o.write_all(&[(*code).into()])?;
                o.write_all(reason)?;
            },
            Features(f) =>
                o.write_all(f.as_bytes())?,
            SignatureTarget { pk_algo, hash_algo, digest } => {
                o.write_all(&[(*pk_algo).into(), (*hash_algo).into()])?;
                o.write_all(digest)?;
            },
            EmbeddedSignature(sig) =>
                sig.serialize(o)?,
            Unknown { body, .. } =>
                o.write_all(body)?,
        }
        Ok(())
    }
}

impl Marshal for Unknown {
    fn serialize(&self, o: &mut dyn Write) -> Result<()> {
        o.write_all(self.body())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Parse;

    #[test]
    fn old_format_frame_is_preserved() {
        // A v4 RSA public key body under an old one-octet frame.
        let raw: &[u8] = &[0x98, 0x0e,
                           0x04, 0x12, 0x34, 0x56, 0x78, 0x01,
                           0x00, 0x11, 0x01, 0x42, 0x23,
                           0x00, 0x02, 0x03];
        let p = Packet::from_bytes(raw).unwrap();
        assert_eq!(p.tag(), Tag::PublicKey);

        // Old framing is kept on re-serialization.
        assert_eq!(p.to_vec().unwrap(), raw);

        // The canonical serializer switches to a new-format frame
        // with the same body.
        let mut canonical = Vec::new();
        p.serialize_canonical(&mut canonical).unwrap();
        assert_eq!(canonical[0], 0xc6);
        assert_eq!(canonical[1], 0x0e);
        assert_eq!(&canonical[2..], &raw[2..]);

        // Both decodings yield the same packet value.
        assert_eq!(Packet::from_bytes(&canonical).unwrap(), p);
    }

    #[test]
    fn new_length_encodings() {
        let mut buf = Vec::new();
        write_new_length(&mut buf, 100).unwrap();
        assert_eq!(buf, &[100]);

        buf.clear();
        write_new_length(&mut buf, 192).unwrap();
        assert_eq!(buf, &[192, 0]);

        buf.clear();
        write_new_length(&mut buf, 8383).unwrap();
        assert_eq!(buf, &[223, 255]);

        buf.clear();
        write_new_length(&mut buf, 8384).unwrap();
        assert_eq!(buf, &[0xff, 0, 0, 0x20, 0xc0]);
    }

    #[test]
    fn old_length_promotion() {
        // A literal packet parsed from a one-octet frame whose body
        // is then grown beyond 255 octets must be promoted to a
        // two-octet frame.
        let mut raw = vec![0xAC, 0x07];
        raw.extend_from_slice(&[0x62, 0x00, 0x00, 0x00, 0x00, 0x00, 0x47]);
        let mut p = Packet::from_bytes(&raw).unwrap();

        if let Packet::Literal(l) = &mut p {
            l.set_body(vec![0x47; 300]);
        } else {
            panic!("expected a literal packet");
        }

        let out = p.to_vec().unwrap();
        // 0xAD: old format, tag 11, two-octet length.
        assert_eq!(out[0], 0xAD);
        assert_eq!(&out[1..3], &(306u16).to_be_bytes());
    }
}
