//! OpenPGP data types and associated machinery.
//!
//! This crate provides a codec for the OpenPGP data format as defined
//! by [RFC 4880]: parsing and serialization of packets, signature and
//! user-attribute subpackets, multiprecision integers, and object
//! identifiers.  OpenPGP is a standard by the IETF.  It was derived
//! from the PGP software, which was created by Phil Zimmermann in
//! 1991.
//!
//! Parsing is strict: a parser either consumes a well-formed value or
//! fails at the first violated invariant, and it never reads past the
//! provided input.  Every successfully parsed value re-serializes to
//! the bytes it was parsed from; unknown packet tags and unknown
//! subpacket types round-trip through raw variants that preserve
//! their bytes verbatim.
//!
//! A non-goal of this crate is the evaluation of cryptographic
//! artifacts: hashing, signature verification, and decryption are the
//! business of a crypto provider, not of the codec.
//!
//! [RFC 4880]: https://tools.ietf.org/html/rfc4880

#![warn(missing_docs)]

// Public re-exports.
//
// We should provide public re-exports for any crate defining types
// that we use in our public API.  This allows downstream consumers to
// name the types without explicitly depending on the third-party
// crates, and provides the correct version of the crates.
pub use anyhow;

#[cfg(test)]
#[macro_use]
extern crate quickcheck;

#[macro_use]
mod macros;

pub mod armor;
pub mod crypto;
mod fingerprint;
pub use fingerprint::Fingerprint;
pub(crate) mod fmt;
mod keyid;
pub use keyid::KeyID;
pub mod packet;
pub use packet::Packet;
pub use packet::Tag;
pub mod parse;
pub use parse::PacketPile;
pub mod serialize;
pub mod types;

/// Result type for fallible operations in this crate.
pub type Result<T> = ::std::result::Result<T, anyhow::Error>;

/// Errors returned by this crate.
///
/// Note: This enum cannot be exhaustively matched to allow future
/// extensions.
#[non_exhaustive]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid operation.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A malformed packet.
    #[error("Malformed packet: {0}")]
    MalformedPacket(String),

    /// A malformed MPI.
    #[error("Malformed MPI: {0}")]
    MalformedMPI(String),

    /// A malformed object identifier.
    #[error("Malformed OID: {0}")]
    MalformedOid(String),

    /// The input ended in the middle of a value.
    ///
    /// The payload is the number of octets that were missing.
    #[error("Truncated input: {0} more octets needed")]
    Truncated(usize),
}

#[cfg(test)]
mod lib_tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(Error::Truncated(3).to_string(),
                   "Truncated input: 3 more octets needed");
    }
}
