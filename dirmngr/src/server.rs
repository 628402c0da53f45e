//! The command server.
//!
//! One server session speaks the line protocol from
//! [`madrona_ipc::assuan`] over a pipe to a cooperating process.
//! Each accepted connection owns a [`Controller`] holding the
//! per-session state: the keyserver list, option flags, and the
//! network deadline.  The command handlers translate between the
//! wire protocol and the collaborator interfaces in [`crate::cache`]
//! and [`crate::ks`].

use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use madrona_ipc::assuan::server::{Command, Connection, Server};
use madrona_ipc::assuan::percent_plus_decode;

use crate::Error;
use crate::Result;
use crate::cache::{Backends, CrlVerdict, ValidateFlags};
use crate::cert::{Cert, read_pem_certs};
use crate::config::{Config, DEFAULT_KEYSERVER};
use crate::ks::{self, KeyserverItem, NetOpts};

/// To avoid DoS attacks we limit the size of a certificate to
/// something reasonable.
pub const MAX_CERT_LENGTH: usize = 16 * 1024;

/// The limit for the CERTLIST inquiry.  We allow for up to 20
/// certificates but also take PEM encoding into account.
pub const MAX_CERTLIST_LENGTH: usize = (MAX_CERT_LENGTH * 20 * 4) / 3;

/// The same goes for OpenPGP keyblocks, but here we need to allow
/// for much longer blocks; a 200k keyblock is not too unusual for
/// keys with many signatures.
pub const MAX_KEYBLOCK_LENGTH: usize = 20 * 1024 * 1024;

/// Per-connection state.
///
/// Allocated when a connection is accepted and dropped when it
/// closes.  `stopme` additionally requests process termination after
/// the session ends.
pub struct Controller {
    pub(crate) config: Arc<Config>,
    pub(crate) backends: Backends,

    /// Per-session list of keyservers, most recently added first.
    pub(crate) keyservers: Vec<KeyserverItem>,

    /// Set by `OPTION force-crl-refresh`.
    pub(crate) force_crl_refresh: bool,

    /// Set by `OPTION http-proxy`.
    pub(crate) http_proxy: Option<String>,

    /// Set by `OPTION http-crl`, inverted.
    pub(crate) http_no_crl: bool,

    /// Deadline for network operations.
    pub(crate) timeout: Duration,

    /// If set, the process should exit after this session.
    pub(crate) stopme: bool,

    /// Certificates collected for OCSP use during this session.
    pub(crate) ocsp_certs: Vec<Cert>,
}

impl Controller {
    /// Creates the state for a fresh connection.
    pub fn new(config: Arc<Config>, backends: Backends) -> Self {
        let timeout = config.connect_timeout;
        Controller {
            config,
            backends,
            keyservers: Vec::new(),
            force_crl_refresh: false,
            http_proxy: None,
            http_no_crl: false,
            timeout,
            stopme: false,
            ocsp_certs: Vec::new(),
        }
    }

    /// Returns whether process termination was requested.
    pub fn stopme(&self) -> bool {
        self.stopme
    }

    fn net_opts(&self) -> NetOpts {
        NetOpts {
            timeout: self.timeout,
            http_proxy: self.http_proxy.clone(),
        }
    }
}

/// Returns whether the option `name` is given on the line.
fn has_option(line: &str, name: &str) -> bool {
    line.split_whitespace().any(|t| t == name)
}

/// Skips leading `--option` words and returns the argument part of
/// the line.
fn skip_options(line: &str) -> &str {
    let mut rest = line.trim_start();
    while rest.starts_with("--") {
        match rest.find(' ') {
            Some(i) => rest = rest[i..].trim_start(),
            None => return "",
        }
    }
    rest
}

/// Extracts a SHA-1 fingerprint from the start of the line.
///
/// Colons within the fingerprint are allowed to separate two hex
/// digits; this allows for easier cutting and pasting using the
/// usual fingerprint rendering.  Fingerprints are optional here, so
/// a malformed one merely yields `None`.
fn get_fingerprint_from_line(line: &str) -> Option<[u8; 20]> {
    let s = line.as_bytes();
    let mut fpr = [0u8; 20];
    let mut i = 0;
    let mut pos = 0;

    while pos < s.len() && s[pos] != b' ' {
        if s[pos] == b':' {
            pos += 1;
            continue;
        }
        if pos + 1 < s.len()
            && s[pos].is_ascii_hexdigit()
            && s[pos + 1].is_ascii_hexdigit()
        {
            if i >= 20 {
                return None;    // Fingerprint too long.
            }
            let hex = [s[pos], s[pos + 1]];
            let hex = std::str::from_utf8(&hex).expect("is ASCII");
            fpr[i] = u8::from_str_radix(hex, 16).expect("is hex");
            i += 1;
            pos += 2;
        } else {
            return None;        // Invalid.
        }
    }

    if i == 20 {
        Some(fpr)
    } else {
        None                    // Fingerprint too short.
    }
}

/// Splits the line into percent-plus decoded patterns.
fn decode_patterns(line: &str) -> Result<Vec<String>> {
    line.split_whitespace()
        .map(|p| String::from_utf8(percent_plus_decode(p)).map_err(
            |_| Error::InvalidArgument(
                format!("pattern {:?} is not UTF-8", p)).into()))
        .collect()
}

/// Inquires a certificate from the client.
fn inquire_cert(conn: &mut Connection, keyword: &str) -> Result<Cert> {
    let value = conn.inquire(keyword, None, MAX_CERT_LENGTH)?;
    if value.is_empty() {
        // No data returned; return a comprehensible error.
        return Err(Error::MissingCertificate.into());
    }
    Cert::from_der(value)
}

/// The bound for ISTRUSTED replies; the expected data is `1`, plus
/// some slack for cruft.
const MAX_ISTRUSTED_REPLY: usize = 100;

/// Asks the client to return the certificate identified by `name`,
/// or the current target certificate if `name` is `None`.
///
/// Returns `Ok(None)` if the client has nothing to send.  This and
/// its siblings below are meant for the external validation
/// machinery, which may need additional certificates mid-command.
pub fn get_cert_local(conn: &mut Connection, name: Option<&str>)
                      -> Result<Option<Cert>> {
    let value = conn.inquire("SENDCERT", name, MAX_CERT_LENGTH)?;
    if value.is_empty() {
        Ok(None)
    } else {
        Cert::from_der(value).map(Some)
    }
}

/// Asks the client to return the certificate that issued the
/// certificate identified by `name`, or the issuer of the current
/// target certificate if `name` is `None`.
pub fn get_issuing_cert_local(conn: &mut Connection, name: Option<&str>)
                              -> Result<Option<Cert>> {
    let value = conn.inquire("SENDISSUERCERT", name, MAX_CERT_LENGTH)?;
    if value.is_empty() {
        Ok(None)
    } else {
        Cert::from_der(value).map(Some)
    }
}

/// Asks the client to return a certificate with subject `name` and
/// the given hex-encoded subjectKeyIdentifier.
pub fn get_cert_local_ski(conn: &mut Connection, name: &str,
                          hex_keyid: &str)
                          -> Result<Option<Cert>> {
    let params = format!("{} /{}", hex_keyid, name);
    let value = conn.inquire("SENDCERT_SKI", Some(&params),
                             MAX_CERT_LENGTH)?;
    if value.is_empty() {
        Ok(None)
    } else {
        Cert::from_der(value).map(Some)
    }
}

/// Asks the client whether it trusts the certificate with the given
/// hex-encoded fingerprint.
///
/// The expected reply is `1`, possibly followed by cruft; anything
/// else means the certificate is not trusted.
pub fn get_istrusted_from_client(conn: &mut Connection, hexfpr: &str)
                                 -> Result<()> {
    let value = conn.inquire("ISTRUSTED", Some(hexfpr),
                             MAX_ISTRUSTED_REPLY)?;
    match value.first() {
        Some(b'1') if value.len() == 1 || value[1] == b' ' => Ok(()),
        _ => Err(Error::NotTrusted.into()),
    }
}

/// Acquires the target certificate, either from the cache by
/// fingerprint or through an inquiry.
fn acquire_target_cert(conn: &mut Connection, ctrl: &Controller, line: &str)
                       -> Result<Cert> {
    let cached = get_fingerprint_from_line(line)
        .and_then(|fpr| ctrl.backends.certs.get_by_fingerprint(&fpr));
    match cached {
        Some(cert) => Ok(cert),
        None => inquire_cert(conn, "TARGETCERT"),
    }
}

fn is_no_crl_known(err: &anyhow::Error) -> bool {
    err.downcast_ref::<Error>() == Some(&Error::NoCrlKnown)
}

/// If no keyserver is configured for the session, installs the
/// global ones, or the compile-time default.
fn ensure_keyserver(ctrl: &mut Controller) -> Result<()> {
    if !ctrl.keyservers.is_empty() {
        return Ok(());          // Already set for this session.
    }
    if ctrl.config.keyservers.is_empty() {
        // No global option set.  Fall back to the default.
        ctrl.keyservers.push(KeyserverItem::new(DEFAULT_KEYSERVER)?);
        return Ok(());
    }
    for ks in &ctrl.config.keyservers {
        let item = KeyserverItem::new(ks)?;
        ctrl.keyservers.insert(0, item);
    }
    Ok(())
}

const HLP_ISVALID: &str = "\
ISVALID [--only-ocsp] [--force-default-responder] <certificate_id>|<certificate_fpr>

Check whether the certificate identified by CERTIFICATE_ID is valid.
The CERTIFICATE_ID is a hex string consisting of two parts, delimited
by a single dot: the SHA-1 hash of the issuer name and the serial
number.  Alternatively the certificate's fingerprint may be given, in
which case an OCSP request is done.  The command may call back using
the inquiry SENDCERT.";

fn cmd_isvalid(conn: &mut Connection, ctrl: &mut Controller, line: &str)
               -> Result<()> {
    let only_ocsp = has_option(line, "--only-ocsp");
    let force_default_responder =
        has_option(line, "--force-default-responder");
    let line = skip_options(line);

    let arg = line.split_whitespace().next().unwrap_or("");
    let (issuerhash, serialno, ocsp_mode) = match arg.find('.') {
        Some(i) => (&arg[..i], &arg[i + 1..], false),
        None => {
            if arg.len() != 40 {
                return Err(Error::Parameter(
                    "serialno missing in cert ID".into()).into());
            }
            (arg, "", true)
        },
    };

    let mut did_inquire = false;
    loop {
        if ocsp_mode {
            // Note, that we ignore the given fingerprint and instead
            // rely on the current certificate semantics used with
            // this command.
            if !ctrl.config.allow_ocsp {
                return Err(Error::NotSupported("OCSP is disabled".into())
                           .into());
            }
            return ctrl.backends.ocsp.isvalid(
                None, None, force_default_responder);
        } else if only_ocsp {
            return Err(Error::NoCrlKnown.into());
        }

        match ctrl.backends.crl.isvalid(issuerhash, serialno,
                                        ctrl.force_crl_refresh) {
            CrlVerdict::Valid => return Ok(()),
            CrlVerdict::Revoked =>
                return Err(Error::CertificateRevoked.into()),
            CrlVerdict::CantUse => return Err(Error::NoCrlKnown.into()),
            CrlVerdict::DontKnow => {
                if did_inquire {
                    return Err(Error::NoCrlKnown.into());
                }
                // The client usually sends us just the cert ID,
                // assuming that the request can be satisfied from
                // the cache.  Ask it for the certificate and load
                // the CRL for it.
                let cert = inquire_cert(conn, "SENDCERT")?;
                ctrl.backends.crl.reload_crl(&cert)?;
                did_inquire = true;
            },
        }
    }
}

const HLP_CHECKCRL: &str = "\
CHECKCRL [<fingerprint>]

Check whether the certificate with FINGERPRINT (SHA-1 hash of the
entire X.509 certificate blob) is valid or not by consulting the CRL
responsible for this certificate.  If the fingerprint has not been
given or the certificate is not known, the function inquires the
certificate using

  INQUIRE TARGETCERT

and the caller is expected to return the certificate for the request
as a binary blob.";

fn cmd_checkcrl(conn: &mut Connection, ctrl: &mut Controller, line: &str)
                -> Result<()> {
    let cert = acquire_target_cert(conn, ctrl, skip_options(line))?;

    match ctrl.backends.crl.cert_isvalid(&cert, ctrl.force_crl_refresh) {
        Err(e) if is_no_crl_known(&e) => {
            // Reload the CRL for this certificate and retry once.
            ctrl.backends.crl.reload_crl(&cert)?;
            ctrl.backends.crl.cert_isvalid(&cert, false)
        },
        r => r,
    }
}

const HLP_CHECKOCSP: &str = "\
CHECKOCSP [--force-default-responder] [<fingerprint>]

Check whether the certificate with FINGERPRINT (SHA-1 hash of the
entire X.509 certificate blob) is valid or not by asking an OCSP
responder responsible for this certificate.  If the fingerprint has
not been given or there is no cached result, the function inquires
the certificate using

  INQUIRE TARGETCERT

If the option --force-default-responder is given, only the default
OCSP responder will be used.";

fn cmd_checkocsp(conn: &mut Connection, ctrl: &mut Controller, line: &str)
                 -> Result<()> {
    let force_default_responder =
        has_option(line, "--force-default-responder");
    let cert = acquire_target_cert(conn, ctrl, skip_options(line))?;

    if !ctrl.config.allow_ocsp {
        return Err(Error::NotSupported("OCSP is disabled".into()).into());
    }

    // Keep the certificate around; the session releases it on RESET
    // or close.
    ctrl.ocsp_certs.push(cert.clone());
    ctrl.backends.ocsp.isvalid(Some(&cert), None, force_default_responder)
}

const HLP_LOOKUP: &str = "\
LOOKUP [--url] [--single] [--cache-only] <pattern>

Lookup certificates matching PATTERN.  With --url the pattern is
expected to be one URL.  To allow for multiple patterns (which are
ORed), quoting is required: spaces are translated to \"+\" or \"%20\";
the usual percent escaping applies.  If --single is given, only the
first match is returned.  If --cache-only is given, no external
lookup is done so that only certificates from the cache are
returned.";

fn cmd_lookup(conn: &mut Connection, ctrl: &mut Controller, line: &str)
              -> Result<()> {
    let lookup_url = has_option(line, "--url");
    let single = has_option(line, "--single");
    let cache_only = has_option(line, "--cache-only");
    let line = skip_options(line);

    if lookup_url && cache_only {
        return Err(Error::NoData.into());
    }
    if lookup_url && single {
        return Err(Error::NotSupported(
            "--url together with --single".into()).into());
    }

    if lookup_url {
        // Fetch a single certificate given its URL.
        let data = ctrl.backends.fetcher.fetch_cert_by_url(line.trim())
            .map_err(|e| {
                log::error!("fetch_cert_by_url failed: {}", e);
                e
            })?;
        conn.data(&data)?;
        conn.end()?;
        return Ok(());
    }

    let patterns = decode_patterns(line)?;
    let mut local_count = 0;
    let mut any_no_data = false;

    // First look through the internal cache.
    if !(single && !cache_only) {
        'patterns: for p in &patterns {
            let certs = &ctrl.backends.certs;
            match certs.get_by_pattern(p, &mut |cert| {
                conn.data(cert.der())?;
                conn.end()
            }) {
                Ok(()) => {
                    local_count += 1;
                    if single {
                        break 'patterns;
                    }
                },
                Err(e) => match e.downcast_ref::<Error>() {
                    Some(Error::NoData) => {
                        if cache_only {
                            any_no_data = true;
                        }
                    },
                    // No real fault; the internal pattern lookup
                    // cannot cope with all types of pattern.
                    Some(Error::InvalidArgument(_)) if !cache_only => (),
                    _ => return Err(e),
                },
            }
        }
    }

    // Querying the configured servers for the remaining patterns is
    // not implemented; only the cache and --url fetches are served.

    if local_count == 0 && any_no_data {
        return Err(Error::NoData.into());
    }
    Ok(())
}

const HLP_LOADCRL: &str = "\
LOADCRL [--url] <filename|url>

Load the CRL in the file with name FILENAME into our cache.  Note
that FILENAME should be given with an absolute path because the
daemon's cwd is not known.  With --url the CRL is directly loaded
from the given URL.";

fn cmd_loadcrl(conn: &mut Connection, ctrl: &mut Controller, line: &str)
               -> Result<()> {
    let _ = conn;
    let use_url = has_option(line, "--url");
    let line = skip_options(line);

    if use_url {
        let crl = ctrl.backends.fetcher.fetch_crl(line).map_err(|e| {
            log::error!("fetching CRL from {:?} failed: {}", line, e);
            e
        })?;
        ctrl.backends.crl.insert(line, &crl).map_err(|e| {
            log::error!("processing CRL from {:?} failed: {}", line, e);
            e
        })
    } else {
        let path = String::from_utf8(percent_plus_decode(line)).map_err(
            |_| Error::InvalidArgument("file name is not UTF-8".into()))?;
        ctrl.backends.crl.load(std::path::Path::new(&path))
    }
}

const HLP_LISTCRLS: &str = "\
LISTCRLS

List the content of all CRLs in a readable format.";

fn cmd_listcrls(conn: &mut Connection, ctrl: &mut Controller, _line: &str)
                -> Result<()> {
    let mut list = Vec::new();
    ctrl.backends.crl.list(&mut list)?;
    conn.data(&list)?;
    Ok(())
}

const HLP_CACHECERT: &str = "\
CACHECERT

Put a certificate into the internal cache.  To get the actual
certificate, this command immediately inquires it using

  INQUIRE TARGETCERT

and the caller is expected to return the certificate for the request
as a binary blob.";

fn cmd_cachecert(conn: &mut Connection, ctrl: &mut Controller, _line: &str)
                 -> Result<()> {
    let cert = inquire_cert(conn, "TARGETCERT")?;
    ctrl.backends.certs.insert(&cert)
}

const HLP_VALIDATE: &str = "\
VALIDATE [--systrust] [--tls] [--no-crl]

Validate a certificate using the certificate validation function
used internally.  To get the actual certificate, this command
immediately inquires it using

  INQUIRE TARGETCERT

The option --tls modifies this by asking for a list of certificates
with

  INQUIRE CERTLIST

Here the first certificate is the target certificate, the remaining
certificates are suggested intermediary certificates.  All
certificates need to be PEM encoded.

The option --systrust changes the behaviour to include the system
provided root certificates as trust anchors.  The option --no-crl
skips CRL checks.";

fn cmd_validate(conn: &mut Connection, ctrl: &mut Controller, line: &str)
                -> Result<()> {
    let systrust_mode = has_option(line, "--systrust");
    let tls_mode = has_option(line, "--tls");
    let no_crl = has_option(line, "--no-crl");

    let cert = if tls_mode {
        let value = conn.inquire("CERTLIST", None, MAX_CERTLIST_LENGTH)?;
        if value.is_empty() {
            return Err(Error::MissingCertificate.into());
        }
        let certlist = read_pem_certs(&value)?;
        let mut certlist = certlist.into_iter();
        let cert = certlist.next()
            .ok_or(Error::MissingCertificate)?;

        // Insert the supplied intermediates into the cache so the
        // validator can find them.
        for intermediate in certlist {
            if let Err(e) = ctrl.backends.certs.insert(&intermediate) {
                log::info!("failed to cache intermediate certificate: {}",
                           e);
            }
        }
        cert
    } else {
        let cert = inquire_cert(conn, "TARGETCERT")?;
        // If we have this certificate in our cache, use the cached
        // version for validation because this will take care of any
        // cached results.
        ctrl.backends.certs.get_by_fingerprint(cert.fingerprint())
            .unwrap_or(cert)
    };

    let flags = ValidateFlags {
        trust_config: true,
        tls: tls_mode,
        trust_system: systrust_mode,
        no_crl,
    };
    ctrl.backends.validator.validate_chain(&cert, None, flags, None)
}

const HLP_KEYSERVER: &str = "\
KEYSERVER [<options>] [<uri>]
Options are:
  --help
  --clear      Remove all configured keyservers

If called without arguments list all configured keyserver URLs.  If
called with an URI add this as keyserver.  Note that keyservers are
configured on a per-session base.  A default keyserver may already be
present, thus the \"--clear\" option must be used to get full
control.  If \"--clear\" and an URI are used together the clear
command is obviously executed first.  A RESET command does not change
the list of configured keyservers.";

fn cmd_keyserver(conn: &mut Connection, ctrl: &mut Controller, line: &str)
                 -> Result<()> {
    let clear_flag = has_option(line, "--clear");
    let help_flag = has_option(line, "--help");
    let line = skip_options(line);
    let add_flag = !line.is_empty();

    if help_flag {
        conn.help_text(
            "Supported keyserver schemes are hkp, hkps, http, and https.\n\
             hkp maps to http with default port 11371; hkps maps to https.")?;
        return Ok(());
    }

    let item = if add_flag {
        Some(KeyserverItem::new(line)?)
    } else {
        None
    };
    if clear_flag {
        ctrl.keyservers.clear();
    }
    if let Some(item) = item {
        ctrl.keyservers.insert(0, item);
    }

    if !add_flag && !clear_flag {
        // List configured keyservers.  However, we first add a
        // global keyserver.
        ensure_keyserver(ctrl)?;
        for item in &ctrl.keyservers {
            conn.status("KEYSERVER", &item.uri)?;
        }
    }
    Ok(())
}

const HLP_KS_SEARCH: &str = "\
KS_SEARCH {<pattern>}

Search the configured OpenPGP keyservers (see command KEYSERVER) for
keys matching PATTERN.";

fn cmd_ks_search(conn: &mut Connection, ctrl: &mut Controller, line: &str)
                 -> Result<()> {
    if has_option(line, "--quick") {
        ctrl.timeout = ctrl.config.connect_quick_timeout;
    }
    let patterns = decode_patterns(skip_options(line))?;

    ensure_keyserver(ctrl)?;

    let mut out = Vec::new();
    ks::ks_action_search(&ctrl.net_opts(), &ctrl.keyservers, &patterns,
                         &mut out)?;
    conn.data(&out)
}

const HLP_KS_GET: &str = "\
KS_GET {<pattern>}

Get the keys matching PATTERN from the configured OpenPGP keyservers
(see command KEYSERVER).  Each pattern should be a keyid, a
fingerprint, or an exact name indicated by the '=' prefix.";

fn cmd_ks_get(conn: &mut Connection, ctrl: &mut Controller, line: &str)
              -> Result<()> {
    if has_option(line, "--quick") {
        ctrl.timeout = ctrl.config.connect_quick_timeout;
    }
    // Patterns are by definition percent-plus escaped.  We only
    // support keyids, fingerprints and exact names, so the client
    // has little need for the escaping, but decode anyway.
    let patterns = decode_patterns(skip_options(line))?;

    ensure_keyserver(ctrl)?;

    let mut out = Vec::new();
    ks::ks_action_get(&ctrl.net_opts(), &ctrl.keyservers, &patterns,
                      &mut out)?;
    conn.data(&out)
}

const HLP_KS_FETCH: &str = "\
KS_FETCH <URL>

Get the key(s) from URL.";

fn cmd_ks_fetch(conn: &mut Connection, ctrl: &mut Controller, line: &str)
                -> Result<()> {
    if has_option(line, "--quick") {
        ctrl.timeout = ctrl.config.connect_quick_timeout;
    }
    let url = skip_options(line).trim();

    ensure_keyserver(ctrl)?;

    let mut out = Vec::new();
    ks::ks_action_fetch(&ctrl.net_opts(), url, &mut out)?;
    conn.data(&out)
}

const HLP_KS_PUT: &str = "\
KS_PUT

Send a key to the configured OpenPGP keyservers.  The actual key
material is then requested using

  INQUIRE KEYBLOCK

The client shall respond with a binary version of the keyblock.
Finally,

  INQUIRE KEYBLOCK_INFO

requests colon delimited meta data lines for the keyblock.";

fn cmd_ks_put(conn: &mut Connection, ctrl: &mut Controller, line: &str)
              -> Result<()> {
    let _ = skip_options(line);

    ensure_keyserver(ctrl)?;

    // Ask for the key material.
    let keyblock = conn.inquire("KEYBLOCK", None, MAX_KEYBLOCK_LENGTH)?;
    if keyblock.is_empty() {
        // No data returned; return a comprehensible error.
        return Err(Error::MissingCertificate.into());
    }

    // Ask for the key meta data.  Not actually needed for HKP
    // servers, but we do it anyway to test the client
    // implementation.
    let info = conn.inquire("KEYBLOCK_INFO", None, MAX_KEYBLOCK_LENGTH)?;

    ks::ks_action_put(&ctrl.net_opts(), &ctrl.keyservers, &keyblock, &info)
}

const HLP_GETINFO: &str = "\
GETINFO <what>

Multi purpose command to return certain information.
Supported values of WHAT are:

version     - Return the version of the program.
pid         - Return the process id of the server.
tor         - Return OK if running in Tor mode.";

fn cmd_getinfo(conn: &mut Connection, ctrl: &mut Controller, line: &str)
               -> Result<()> {
    match line.trim() {
        "version" => conn.data(env!("CARGO_PKG_VERSION").as_bytes()),
        "pid" => conn.data(std::process::id().to_string().as_bytes()),
        "tor" => {
            if ctrl.config.use_tor {
                Ok(())
            } else {
                Err(Error::NotSupported("Tor mode is not enabled".into())
                    .into())
            }
        },
        _ => Err(Error::Parameter("unknown value for WHAT".into()).into()),
    }
}

const HLP_KILLDIRMNGR: &str = "\
KILLDIRMNGR

Terminate the process after the end of this session.";

fn cmd_killdirmngr(conn: &mut Connection, ctrl: &mut Controller,
                   _line: &str)
                   -> Result<()> {
    ctrl.stopme = true;
    conn.request_close();
    Ok(())
}

/// The command table.
static COMMANDS: &[Command<Controller>] = &[
    Command { name: "ISVALID", help: HLP_ISVALID, run: cmd_isvalid },
    Command { name: "CHECKCRL", help: HLP_CHECKCRL, run: cmd_checkcrl },
    Command { name: "CHECKOCSP", help: HLP_CHECKOCSP, run: cmd_checkocsp },
    Command { name: "LOOKUP", help: HLP_LOOKUP, run: cmd_lookup },
    Command { name: "LOADCRL", help: HLP_LOADCRL, run: cmd_loadcrl },
    Command { name: "LISTCRLS", help: HLP_LISTCRLS, run: cmd_listcrls },
    Command { name: "CACHECERT", help: HLP_CACHECERT, run: cmd_cachecert },
    Command { name: "VALIDATE", help: HLP_VALIDATE, run: cmd_validate },
    Command { name: "KEYSERVER", help: HLP_KEYSERVER, run: cmd_keyserver },
    Command { name: "KS_SEARCH", help: HLP_KS_SEARCH, run: cmd_ks_search },
    Command { name: "KS_GET", help: HLP_KS_GET, run: cmd_ks_get },
    Command { name: "KS_FETCH", help: HLP_KS_FETCH, run: cmd_ks_fetch },
    Command { name: "KS_PUT", help: HLP_KS_PUT, run: cmd_ks_put },
    Command { name: "GETINFO", help: HLP_GETINFO, run: cmd_getinfo },
    Command { name: "KILLDIRMNGR", help: HLP_KILLDIRMNGR,
              run: cmd_killdirmngr },
];

/// Handles `OPTION` lines.
fn option_handler(ctrl: &mut Controller, key: &str, value: &str)
                  -> Result<()> {
    fn flag(value: &str) -> bool {
        !value.is_empty() && value.parse::<i64>().map(|v| v != 0)
            .unwrap_or(false)
    }

    match key {
        "force-crl-refresh" => {
            ctrl.force_crl_refresh = flag(value);
            Ok(())
        },
        "http-proxy" => {
            if value.is_empty() || value == "none" {
                ctrl.http_proxy = None;
            } else {
                ctrl.http_proxy = Some(value.into());
            }
            Ok(())
        },
        "http-crl" => {
            ctrl.http_no_crl = !flag(value);
            Ok(())
        },
        _ => Err(Error::UnknownOption(key.into()).into()),
    }
}

/// Handles `RESET` lines: per-command state is cleared, the
/// keyserver list is retained.
fn reset_handler(ctrl: &mut Controller) {
    ctrl.ocsp_certs.clear();
}

/// Runs the command loop on the given channel.
///
/// This allocates a fresh [`Controller`], serves the session until
/// EOF or `BYE`, and returns whether the client requested process
/// termination.
pub fn start_command_handler<R: BufRead, W: Write>(
    mut reader: R, mut writer: W, config: Arc<Config>, backends: Backends)
    -> Result<bool> {
    let mut ctrl = Controller::new(config, backends);
    let greeting = format!("Madrona's Dirmngr {} at your service",
                           env!("CARGO_PKG_VERSION"));

    let server = Server::new(COMMANDS, greeting)
        .with_option_handler(option_handler)
        .with_reset_handler(reset_handler)
        .with_error_mapper(crate::wire_error);
    server.serve(&mut reader, &mut writer, &mut ctrl)?;

    Ok(ctrl.stopme())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options() {
        let line = "--only-ocsp --force-default-responder  abc.01";
        assert!(has_option(line, "--only-ocsp"));
        assert!(!has_option(line, "--only"));
        assert_eq!(skip_options(line), "abc.01");
        assert_eq!(skip_options("--clear"), "");
        assert_eq!(skip_options("plain"), "plain");
    }

    #[test]
    fn fingerprints() {
        let fpr = "3E8877C877274692975189F5D03F6F865226FE8B";
        assert!(get_fingerprint_from_line(fpr).is_some());
        assert!(get_fingerprint_from_line(
            "3E:88:77:C8:77:27:46:92:97:51:89:F5:D0:3F:6F:86:52:26:FE:8B")
                .is_some());
        assert!(get_fingerprint_from_line(&fpr[..38]).is_none());
        assert!(get_fingerprint_from_line(&format!("{}FF", fpr)).is_none());
        assert!(get_fingerprint_from_line("xyz").is_none());
        assert!(get_fingerprint_from_line("").is_none());
    }

    #[test]
    fn patterns() {
        assert_eq!(decode_patterns("a+b %41  c").unwrap(),
                   vec!["a b", "A", "c"]);
    }

    /// A command table exercising the inquiry helpers used by the
    /// external validation machinery.
    static PROBE: &[Command<u8>] = &[
        Command {
            name: "PROBE",
            help: "PROBE\n\nExercise the inquiry helpers.",
            run: |conn, _state, _args| {
                get_istrusted_from_client(conn, "AABB")?;
                let cert = get_cert_local_ski(conn, "CN=Test CA", "00A1")?;
                assert!(cert.is_some());
                assert!(get_cert_local(conn, None)?.is_none());
                Ok(())
            },
        },
    ];

    fn run_probe(client_script: &[u8]) -> String {
        let mut input = b"PROBE\n".to_vec();
        input.extend_from_slice(client_script);
        input.extend_from_slice(b"BYE\n");

        let mut reader = std::io::BufReader::new(&input[..]);
        let mut out = Vec::new();
        let server = Server::new(PROBE, "probe".into());
        let mut state = 0u8;
        server.serve(&mut reader, &mut out, &mut state).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn inquiry_helpers() {
        // ISTRUSTED is answered with "1 cruft"; SENDCERT_SKI with a
        // DER blob; SENDCERT with nothing.
        let mut script = b"D 1 cruft\nEND\n".to_vec();
        script.extend_from_slice(b"D ");
        // A DER SEQUENCE; none of its octets need escaping.
        script.extend_from_slice(&[0x30, 0x03, 0x02, 0x01, 0x07]);
        script.extend_from_slice(b"\nEND\n");
        script.extend_from_slice(b"END\n");

        let out = run_probe(&script);
        assert!(out.contains("INQUIRE ISTRUSTED AABB\n"), "{}", out);
        assert!(out.contains("INQUIRE SENDCERT_SKI 00A1 /CN=Test CA\n"),
                "{}", out);
        assert!(out.contains("INQUIRE SENDCERT\n"), "{}", out);
        assert!(!out.contains("ERR"), "{}", out);
    }

    #[test]
    fn istrusted_rejects_other_replies() {
        let out = run_probe(b"D 0\nEND\n");
        assert!(out.contains("ERR"), "{}", out);
    }
}
