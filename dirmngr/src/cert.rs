//! The opaque certificate handle.
//!
//! X.509 parsing is the business of an external ASN.1 reader; this
//! service only transports certificates, keys them by fingerprint,
//! and hands them to the caches and validators.  A [`Cert`] is
//! therefore little more than a DER blob paired with the SHA-1 hash
//! over it.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as base64std;
use sha1collisiondetection::{Digest, Sha1CD};

use crate::Error;
use crate::Result;

/// An X.509 certificate, opaque to this crate.
#[derive(Clone, PartialEq, Eq)]
pub struct Cert {
    der: Vec<u8>,
    fingerprint: [u8; 20],
}

impl std::fmt::Debug for Cert {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Cert")
            .field("fingerprint", &self.fingerprint_hex())
            .field("der", &format!("{} bytes", self.der.len()))
            .finish()
    }
}

impl Cert {
    /// Creates a certificate handle from a DER blob.
    ///
    /// Only the outermost framing is checked here; interpreting the
    /// certificate is left to the external reader.
    pub fn from_der<B: Into<Vec<u8>>>(der: B) -> Result<Cert> {
        let der = der.into();

        // Every DER-encoded certificate is a constructed SEQUENCE.
        if der.is_empty() || der[0] != 0x30 {
            return Err(Error::InvalidCertificate(
                "not a DER-encoded certificate".into()).into());
        }

        let mut h = Sha1CD::new();
        h.update(&der);
        let digest = h.finalize_cd().map_err(
            |_| Error::InvalidCertificate(
                "colliding SHA-1 digest".into()))?;
        let mut fingerprint = [0u8; 20];
        fingerprint.copy_from_slice(digest.as_slice());

        Ok(Cert { der, fingerprint })
    }

    /// Returns the DER blob.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Returns the SHA-1 hash over the DER blob.
    pub fn fingerprint(&self) -> &[u8; 20] {
        &self.fingerprint
    }

    /// Returns the fingerprint as upper-case hex digits.
    pub fn fingerprint_hex(&self) -> String {
        use std::fmt::Write;
        let mut s = String::with_capacity(40);
        for b in &self.fingerprint {
            write!(&mut s, "{:02X}", b).expect("writing to String is infallible");
        }
        s
    }
}

/// Reads a list of PEM-encoded certificates.
///
/// This is used by the `VALIDATE --tls` command, whose peers supply
/// the certificate chain the way TLS software keeps it on disk.
pub fn read_pem_certs(data: &[u8]) -> Result<Vec<Cert>> {
    const BEGIN: &str = "-----BEGIN CERTIFICATE-----";
    const END: &str = "-----END CERTIFICATE-----";

    let text = std::str::from_utf8(data).map_err(
        |_| Error::InvalidCertificate("PEM data is not ASCII".into()))?;

    let mut certs = Vec::new();
    let mut payload: Option<String> = None;
    for line in text.lines() {
        let line = line.trim();
        if line == BEGIN {
            if payload.is_some() {
                return Err(Error::InvalidCertificate(
                    "nested PEM BEGIN".into()).into());
            }
            payload = Some(String::new());
        } else if line == END {
            let b64 = payload.take().ok_or_else(
                || Error::InvalidCertificate("stray PEM END".into()))?;
            let der = base64std.decode(b64.as_bytes()).map_err(
                |e| Error::InvalidCertificate(
                    format!("bad base64 in PEM: {}", e)))?;
            certs.push(Cert::from_der(der)?);
        } else if let Some(p) = payload.as_mut() {
            p.push_str(line);
        }
    }

    if payload.is_some() {
        return Err(Error::InvalidCertificate(
            "unterminated PEM block".into()).into());
    }

    Ok(certs)
}

#[cfg(test)]
pub(crate) fn dummy_der(seed: u8) -> Vec<u8> {
    // A syntactically plausible DER SEQUENCE; the external reader
    // never sees these in tests.
    vec![0x30, 0x03, 0x02, 0x01, seed]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn der_framing_checked() {
        assert!(Cert::from_der(vec![]).is_err());
        assert!(Cert::from_der(vec![0x04, 0x00]).is_err());
        assert!(Cert::from_der(dummy_der(1)).is_ok());
    }

    #[test]
    fn fingerprint_is_stable() {
        let a = Cert::from_der(dummy_der(1)).unwrap();
        let b = Cert::from_der(dummy_der(1)).unwrap();
        let c = Cert::from_der(dummy_der(2)).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint_hex().len(), 40);
    }

    #[test]
    fn pem_list() {
        let der = dummy_der(7);
        let b64 = base64std.encode(&der);
        let pem = format!(
            "-----BEGIN CERTIFICATE-----\n{}\n-----END CERTIFICATE-----\n\
             -----BEGIN CERTIFICATE-----\n{}\n-----END CERTIFICATE-----\n",
            b64, b64);
        let certs = read_pem_certs(pem.as_bytes()).unwrap();
        assert_eq!(certs.len(), 2);
        assert_eq!(certs[0].der(), &der[..]);

        assert!(read_pem_certs(b"-----BEGIN CERTIFICATE-----\nAAAA")
                .is_err());
    }
}
