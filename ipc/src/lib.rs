//! Interprocess communication for the directory service.
//!
//! This crate implements the line-oriented command protocol spoken
//! between the directory service and its clients, a dialect of the
//! venerable Assuan protocol: `\n`-terminated ASCII lines carrying
//! commands, `OK`/`ERR` responses, `S` status lines, `D` data lines,
//! and `INQUIRE` call-backs through which a command handler can
//! synchronously request data from the peer mid-command.
//!
//! The transport is a pipe or socket between cooperating processes
//! on the same machine; the protocol provides no transport security
//! of its own.

#![warn(missing_docs)]

pub mod assuan;

/// Result type for fallible operations in this crate.
pub type Result<T> = ::std::result::Result<T, anyhow::Error>;

/// Errors returned by this crate.
///
/// Note: This enum cannot be exhaustively matched to allow future
/// extensions.
#[non_exhaustive]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The remote peer closed the connection.
    #[error("Connection closed unexpectedly")]
    ConnectionClosed,

    /// A malformed line was encountered.
    #[error("Malformed line: {0}")]
    MalformedLine(String),

    /// A line exceeded the protocol's line length limit.
    #[error("Line of {0} octets exceeds the limit of {limit}",
            limit = assuan::MAX_LINE_LENGTH)]
    LineTooLong(usize),

    /// The peer sent more inquiry data than the handler allowed.
    #[error("Inquiry data exceeds the limit of {0} octets")]
    InquiryTooLarge(usize),

    /// The peer cancelled an inquiry.
    #[error("Operation cancelled by peer")]
    Cancelled,

    /// The peer sent something that does not fit the protocol state.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The command is not known to the server.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// The option is not known to the server.
    #[error("Unknown option: {0}")]
    UnknownOption(String),
}
