//! Process-wide configuration.

use std::path::PathBuf;
use std::time::Duration;

/// The compile-time default keyserver, used when neither the session
/// nor the configuration names one.
pub const DEFAULT_KEYSERVER: &str = "hkps://keys.openpgp.org";

/// Process-wide options.
///
/// These are fixed at startup; everything a client may change at
/// runtime lives in the per-session [`Controller`].
///
/// [`Controller`]: crate::server::Controller
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether OCSP queries are allowed at all.
    pub allow_ocsp: bool,

    /// Globally configured keyserver URLs.
    ///
    /// Sessions start out with these; an empty list means the
    /// compile-time default is installed on first use.
    pub keyservers: Vec<String>,

    /// Timeout for outbound network operations.
    pub connect_timeout: Duration,

    /// Lowered timeout selected by the `--quick` option of the
    /// keyserver commands.
    pub connect_quick_timeout: Duration,

    /// The home directory, used to resolve caches and configuration.
    pub homedir: PathBuf,

    /// Whether all network access is routed over an onion network.
    pub use_tor: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            allow_ocsp: false,
            keyservers: Vec::new(),
            connect_timeout: Duration::from_secs(15),
            connect_quick_timeout: Duration::from_secs(2),
            homedir: PathBuf::from("."),
            use_tor: false,
        }
    }
}
