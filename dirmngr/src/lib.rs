//! Certificate revocation and OpenPGP keyserver directory service.
//!
//! This crate implements the core of the directory service: a
//! line-oriented command server (see [`madrona_ipc::assuan`]) that
//! answers certificate-revocation questions (CRL and OCSP), validates
//! certificate chains, manages per-session OpenPGP keyserver lists,
//! and relays keyserver searches, retrievals, and submissions over
//! HKP.
//!
//! The heavy machinery lives elsewhere: the CRL cache, certificate
//! cache, OCSP checker, and chain validator are external
//! collaborators accessed through the traits in [`cache`]; X.509
//! certificates are carried as opaque DER blobs ([`cert::Cert`]).
//! This crate contains the protocol plumbing and the decision flow
//! tying those collaborators together.

#![warn(missing_docs)]

pub mod cache;
pub mod cert;
pub mod config;
pub mod ks;
pub mod server;
pub mod uri;

/// Result type for fallible operations in this crate.
pub type Result<T> = ::std::result::Result<T, anyhow::Error>;

/// Errors returned by this crate.
///
/// Every error kind carries a stable numeric code used on `ERR`
/// lines of the command channel; see [`Error::code`].
///
/// Note: This enum cannot be exhaustively matched to allow future
/// extensions.
#[non_exhaustive]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Bad command syntax.
    #[error("Parameter error: {0}")]
    Parameter(String),

    /// Input ended in the middle of a value.
    #[error("Truncated data: {0}")]
    Truncated(String),

    /// A malformed OpenPGP packet.
    #[error("Invalid packet: {0}")]
    InvalidPacket(String),

    /// A malformed certificate.
    #[error("Invalid certificate: {0}")]
    InvalidCertificate(String),

    /// The peer was asked for a certificate but returned none.
    #[error("Missing certificate")]
    MissingCertificate,

    /// No CRL is known that covers the certificate in question.
    #[error("No CRL known")]
    NoCrlKnown,

    /// The certificate has been revoked.
    #[error("Certificate revoked")]
    CertificateRevoked,

    /// The certificate chain does not end in a trusted anchor.
    #[error("Not trusted")]
    NotTrusted,

    /// The operation is not supported in this configuration.
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// An unknown option was given.
    #[error("Unknown option: {0}")]
    UnknownOption(String),

    /// An unknown command was given.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// A network operation exceeded its deadline.
    #[error("Operation timed out")]
    Timeout,

    /// A network operation failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A lookup yielded no data.
    #[error("No data")]
    NoData,

    /// Memory exhaustion; fatal for the command, not the session.
    #[error("Out of memory")]
    OutOfMemory,

    /// An internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns the stable numeric code carried on `ERR` lines.
    pub fn code(&self) -> u32 {
        use Error::*;
        match self {
            InvalidArgument(_) => 1,
            Parameter(_) => 2,
            Truncated(_) => 3,
            InvalidPacket(_) => 4,
            InvalidCertificate(_) => 5,
            MissingCertificate => 6,
            NoCrlKnown => 7,
            CertificateRevoked => 8,
            NotTrusted => 9,
            NotSupported(_) => 10,
            UnknownOption(_) => 11,
            UnknownCommand(_) => 12,
            Timeout => 13,
            Transport(_) => 14,
            NoData => 15,
            OutOfMemory => 16,
            Internal(_) => 17,
        }
    }
}

/// Maps any error to the numeric code and description for the `ERR`
/// line of the command channel.
///
/// Errors from the IPC layer and the OpenPGP codec are translated
/// into the corresponding [`Error`] kinds; anything else is reported
/// as an internal error.
pub fn wire_error(err: &anyhow::Error) -> (u32, String) {
    if let Some(e) = err.downcast_ref::<Error>() {
        return (e.code(), e.to_string());
    }

    if let Some(e) = err.downcast_ref::<madrona_ipc::Error>() {
        use madrona_ipc::Error as Ipc;
        let kind = match e {
            Ipc::UnknownCommand(c) => Error::UnknownCommand(c.clone()),
            Ipc::UnknownOption(o) => Error::UnknownOption(o.clone()),
            Ipc::LineTooLong(_) | Ipc::MalformedLine(_) =>
                Error::Parameter(e.to_string()),
            Ipc::InquiryTooLarge(_) =>
                Error::Parameter(e.to_string()),
            _ => Error::Transport(e.to_string()),
        };
        return (kind.code(), kind.to_string());
    }

    if let Some(e) = err.downcast_ref::<madrona_openpgp::Error>() {
        use madrona_openpgp::Error as Pgp;
        let kind = match e {
            Pgp::Truncated(_) => Error::Truncated(e.to_string()),
            _ => Error::InvalidPacket(e.to_string()),
        };
        return (kind.code(), kind.to_string());
    }

    let kind = Error::Internal(err.to_string());
    (kind.code(), kind.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(Error::NoCrlKnown.code(), 7);
        assert_eq!(Error::NotSupported("x".into()).code(), 10);
        assert_eq!(Error::MissingCertificate.code(), 6);
    }

    #[test]
    fn wire_mapping() {
        let e = anyhow::Error::from(
            madrona_ipc::Error::UnknownCommand("FROB".into()));
        assert_eq!(wire_error(&e).0, Error::UnknownCommand("".into()).code());

        let e = anyhow::Error::from(madrona_openpgp::Error::Truncated(3));
        assert_eq!(wire_error(&e).0, 3);

        let e = anyhow::anyhow!("whatever");
        assert_eq!(wire_error(&e).0, 17);
    }
}
