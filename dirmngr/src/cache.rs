//! Interfaces to the external caches and checkers.
//!
//! The certificate cache, CRL cache, OCSP checker, and chain
//! validator are process-wide collaborators with their own storage
//! and synchronization.  The command handlers only see the narrow
//! traits defined here; every implementation must be safe to share
//! between connections.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;

use crate::Error;
use crate::Result;
use crate::cert::Cert;

/// The verdict of a CRL cache query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrlVerdict {
    /// The certificate is not listed in a current CRL.
    Valid,
    /// The certificate is listed; it has been revoked.
    Revoked,
    /// No current CRL for the issuer is cached; loading one may
    /// help.
    DontKnow,
    /// A CRL is present but cannot be used (expired, unverifiable).
    CantUse,
}

/// The certificate revocation list cache.
pub trait CrlCache: Send + Sync {
    /// Looks up the certificate with the given issuer hash and
    /// serial number.
    ///
    /// `force_refresh` requests that cached CRLs are re-fetched
    /// before consulting them.
    fn isvalid(&self, issuer_hash: &str, serial: &str, force_refresh: bool)
               -> CrlVerdict;

    /// Checks the given certificate against the CRLs.
    ///
    /// Fails with [`Error::NoCrlKnown`] if no usable CRL covers the
    /// certificate, and with [`Error::CertificateRevoked`] if it is
    /// listed.
    fn cert_isvalid(&self, cert: &Cert, force_refresh: bool) -> Result<()>;

    /// Loads the CRLs named by the certificate's distribution
    /// points.
    fn reload_crl(&self, cert: &Cert) -> Result<()>;

    /// Loads a CRL from the given file.
    fn load(&self, path: &Path) -> Result<()>;

    /// Writes a human-readable list of the cached CRLs.
    fn list(&self, out: &mut dyn Write) -> Result<()>;

    /// Inserts a CRL fetched from `url`.
    fn insert(&self, url: &str, crl: &[u8]) -> Result<()>;
}

/// The certificate cache.
pub trait CertCache: Send + Sync {
    /// Returns the certificate with the given fingerprint, if
    /// cached.
    fn get_by_fingerprint(&self, fpr: &[u8; 20]) -> Option<Cert>;

    /// Runs `sink` on every cached certificate matching `pattern`.
    ///
    /// Fails with [`Error::NoData`] if nothing matches, and with
    /// [`Error::InvalidArgument`] for pattern forms the cache cannot
    /// handle.
    fn get_by_pattern(&self, pattern: &str,
                      sink: &mut dyn FnMut(&Cert) -> Result<()>)
                      -> Result<()>;

    /// Inserts a certificate.
    fn insert(&self, cert: &Cert) -> Result<()>;
}

/// The on-line certificate status checker.
pub trait OcspClient: Send + Sync {
    /// Asks the responsible OCSP responder about the certificate.
    ///
    /// With no certificate given, the current target certificate of
    /// the session is meant.  `force_default_responder` restricts
    /// the query to the configured default responder.
    fn isvalid(&self, cert: Option<&Cert>, issuer: Option<&Cert>,
               force_default_responder: bool)
               -> Result<()>;
}

/// Flags modifying chain validation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ValidateFlags {
    /// Use the trust anchors from the configuration.
    pub trust_config: bool,
    /// Validate under TLS semantics rather than S/MIME.
    pub tls: bool,
    /// Additionally use the system's trust anchors.
    pub trust_system: bool,
    /// Skip CRL checks.
    pub no_crl: bool,
}

/// The certificate chain validator.
pub trait ChainValidator: Send + Sync {
    /// Validates the chain from `cert` up to a trust anchor.
    ///
    /// On success, the constructed chain is appended to `out_chain`
    /// if the caller asked for it.
    fn validate_chain(&self, cert: &Cert, anchor: Option<&Cert>,
                      flags: ValidateFlags,
                      out_chain: Option<&mut Vec<Cert>>)
                      -> Result<()>;
}

/// Retrieves certificates and CRLs over HTTP.
pub trait CertFetcher: Send + Sync {
    /// Fetches a single certificate from the given URL.
    fn fetch_cert_by_url(&self, url: &str) -> Result<Vec<u8>>;

    /// Fetches a CRL from the given URL.
    fn fetch_crl(&self, url: &str) -> Result<Vec<u8>>;
}

/// The bundle of collaborators a server works with.
#[derive(Clone)]
pub struct Backends {
    /// The CRL cache.
    pub crl: Arc<dyn CrlCache>,
    /// The certificate cache.
    pub certs: Arc<dyn CertCache>,
    /// The OCSP checker.
    pub ocsp: Arc<dyn OcspClient>,
    /// The chain validator.
    pub validator: Arc<dyn ChainValidator>,
    /// The HTTP fetcher for certificates and CRLs.
    pub fetcher: Arc<dyn CertFetcher>,
}

/// A certificate cache backed by process memory.
///
/// Certificates are keyed by their SHA-1 fingerprint.  Pattern
/// lookup understands hexadecimal fingerprints (optionally prefixed
/// with `0x`); name patterns require the external X.509 reader and
/// are reported as [`Error::InvalidArgument`].
#[derive(Default)]
pub struct MemoryCertCache {
    certs: Mutex<HashMap<[u8; 20], Cert>>,
}

impl MemoryCertCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Default::default()
    }
}

impl CertCache for MemoryCertCache {
    fn get_by_fingerprint(&self, fpr: &[u8; 20]) -> Option<Cert> {
        self.certs.lock().expect("not poisoned").get(fpr).cloned()
    }

    fn get_by_pattern(&self, pattern: &str,
                      sink: &mut dyn FnMut(&Cert) -> Result<()>)
                      -> Result<()> {
        let hex = pattern.strip_prefix("0x").unwrap_or(pattern);
        let fpr = parse_hex_fingerprint(hex).ok_or_else(
            || Error::InvalidArgument(
                format!("unsupported pattern {:?}", pattern)))?;

        match self.get_by_fingerprint(&fpr) {
            Some(cert) => sink(&cert),
            None => Err(Error::NoData.into()),
        }
    }

    fn insert(&self, cert: &Cert) -> Result<()> {
        self.certs.lock().expect("not poisoned")
            .insert(*cert.fingerprint(), cert.clone());
        Ok(())
    }
}

/// A CRL cache without a backing store.
///
/// Interpreting CRLs requires the external X.509 reader; without
/// one, every query answers that the CRL cannot be used, and loads
/// are refused.  This is what a stand-alone binary runs with until a
/// real cache is wired up.
#[derive(Debug, Default)]
pub struct UnconfiguredCrlCache {}

impl UnconfiguredCrlCache {
    /// Creates the cache.
    pub fn new() -> Self {
        Default::default()
    }
}

impl CrlCache for UnconfiguredCrlCache {
    fn isvalid(&self, _issuer_hash: &str, _serial: &str,
               _force_refresh: bool)
               -> CrlVerdict {
        CrlVerdict::CantUse
    }

    fn cert_isvalid(&self, _cert: &Cert, _force_refresh: bool)
                    -> Result<()> {
        Err(Error::NoCrlKnown.into())
    }

    fn reload_crl(&self, _cert: &Cert) -> Result<()> {
        Err(Error::NotSupported("no CRL store configured".into()).into())
    }

    fn load(&self, _path: &Path) -> Result<()> {
        Err(Error::NotSupported("no CRL store configured".into()).into())
    }

    fn list(&self, _out: &mut dyn Write) -> Result<()> {
        Ok(())
    }

    fn insert(&self, _url: &str, _crl: &[u8]) -> Result<()> {
        Err(Error::NotSupported("no CRL store configured".into()).into())
    }
}

/// An OCSP checker that is switched off.
#[derive(Debug, Default)]
pub struct DisabledOcsp {}

impl DisabledOcsp {
    /// Creates the checker.
    pub fn new() -> Self {
        Default::default()
    }
}

impl OcspClient for DisabledOcsp {
    fn isvalid(&self, _cert: Option<&Cert>, _issuer: Option<&Cert>,
               _force_default_responder: bool)
               -> Result<()> {
        Err(Error::NotSupported("OCSP is disabled".into()).into())
    }
}

/// A chain validator without any trust anchors.
///
/// With no anchors configured, no chain can be trusted.
#[derive(Debug, Default)]
pub struct AnchorlessValidator {}

impl AnchorlessValidator {
    /// Creates the validator.
    pub fn new() -> Self {
        Default::default()
    }
}

impl ChainValidator for AnchorlessValidator {
    fn validate_chain(&self, _cert: &Cert, _anchor: Option<&Cert>,
                      _flags: ValidateFlags,
                      _out_chain: Option<&mut Vec<Cert>>)
                      -> Result<()> {
        Err(Error::NotTrusted.into())
    }
}

pub(crate) fn parse_hex_fingerprint(s: &str) -> Option<[u8; 20]> {
    if s.len() != 40 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let mut fpr = [0u8; 20];
    for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
        let hex = std::str::from_utf8(chunk).ok()?;
        fpr[i] = u8::from_str_radix(hex, 16).ok()?;
    }
    Some(fpr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::dummy_der;

    #[test]
    fn memory_cache() {
        let cache = MemoryCertCache::new();
        let cert = Cert::from_der(dummy_der(1)).unwrap();
        cache.insert(&cert).unwrap();

        assert_eq!(cache.get_by_fingerprint(cert.fingerprint()),
                   Some(cert.clone()));
        assert_eq!(cache.get_by_fingerprint(&[0; 20]), None);

        let mut hits = 0;
        cache.get_by_pattern(&cert.fingerprint_hex(), &mut |c| {
            assert_eq!(c.der(), cert.der());
            hits += 1;
            Ok(())
        }).unwrap();
        assert_eq!(hits, 1);

        // A syntactically valid fingerprint that is not cached.
        let miss = "0000000000000000000000000000000000000000";
        let err = cache.get_by_pattern(miss, &mut |_| Ok(())).unwrap_err();
        assert_eq!(err.downcast_ref::<Error>(), Some(&Error::NoData));

        // Name patterns need the external reader.
        let err = cache.get_by_pattern("=Doe, John", &mut |_| Ok(()))
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(),
                         Some(Error::InvalidArgument(_))));
    }
}
