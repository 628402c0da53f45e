//! Keyserver access.
//!
//! This module talks to OpenPGP keyservers over the [HKP] protocol:
//! searching (`KS_SEARCH`), retrieving (`KS_GET`, `KS_FETCH`), and
//! publishing (`KS_PUT`) keys.  The `ks_action_*` entry points are
//! what the command handlers call; they drive the asynchronous HTTP
//! client from the synchronous command loop and enforce the
//! session's network deadline.
//!
//! [HKP]: https://tools.ietf.org/html/draft-shaw-openpgp-hkp-00

use std::future::Future;
use std::time::Duration;

use percent_encoding::{AsciiSet, CONTROLS, percent_encode};
use reqwest::{StatusCode, Url};

use madrona_openpgp::armor;
use madrona_openpgp::parse::{PacketPile, Parse};

use crate::Error;
use crate::Result;
use crate::uri::{self, ParsedUri};

/// <https://url.spec.whatwg.org/#fragment-percent-encode-set>
const KEYSERVER_ENCODE_SET: &AsciiSet =
    // Formerly DEFAULT_ENCODE_SET
    &CONTROLS.add(b' ').add(b'"').add(b'#').add(b'<').add(b'>').add(b'`')
    .add(b'?').add(b'{').add(b'}')
    // The SKS keyserver as of version 1.1.6 is a bit picky with
    // respect to the encoding.
    .add(b'-').add(b'+').add(b'/');

/// A configured keyserver of a session.
#[derive(Debug, Clone)]
pub struct KeyserverItem {
    /// The URL as given by the client.
    pub uri: String,
    /// The parsed form.
    pub parsed: ParsedUri,
}

impl KeyserverItem {
    /// Parses the given URL into a list item.
    pub fn new(uri: &str) -> Result<Self> {
        Ok(KeyserverItem {
            uri: uri.into(),
            parsed: uri::parse_uri(uri)?,
        })
    }
}

/// Network options inherited from the session.
#[derive(Debug, Clone)]
pub struct NetOpts {
    /// Deadline for the whole operation.
    pub timeout: Duration,
    /// HTTP proxy, if configured.
    pub http_proxy: Option<String>,
}

fn transport_err<E: std::fmt::Display>(e: E) -> anyhow::Error {
    Error::Transport(e.to_string()).into()
}

fn make_client(opts: &NetOpts) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(proxy) = &opts.http_proxy {
        builder = builder.proxy(
            reqwest::Proxy::all(proxy.as_str()).map_err(transport_err)?);
    }
    builder.build().map_err(transport_err)
}

/// For accessing keyservers using HKP.
pub struct KeyServer {
    client: reqwest::Client,
    /// The URL given to the constructor.
    url: Url,
    /// The URL we use for the requests.
    request_url: Url,
}

impl KeyServer {
    /// Returns a handle for the given URL.
    pub fn new(opts: &NetOpts, url: &str) -> Result<Self> {
        Self::with_client(url, make_client(opts)?)
    }

    /// Returns a handle for the given URL with a custom `Client`.
    pub fn with_client(url: &str, client: reqwest::Client) -> Result<Self> {
        let url = Url::parse(url).map_err(
            |e| Error::InvalidArgument(
                format!("bad keyserver URL {:?}: {}", url, e)))?;

        let s = url.scheme();
        let (scheme, default_port) = match s {
            "hkp" => ("http", uri::HKP_PORT),
            "hkps" => ("https", 443),
            "http" => ("http", 80),
            "https" => ("https", 443),
            _ => return Err(Error::NotSupported(
                format!("{} keyservers", s)).into()),
        };

        let request_url =
            format!("{}://{}:{}",
                    scheme,
                    url.host_str().ok_or_else(
                        || Error::InvalidArgument(
                            "keyserver URL without a host".into()))?,
                    url.port().unwrap_or(default_port))
            .parse().map_err(transport_err)?;

        Ok(KeyServer { client, url, request_url })
    }

    /// Returns the keyserver's base URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn get_raw(&self, url: Url) -> Result<Vec<u8>> {
        let res = self.client.get(url).send().await.map_err(transport_err)?;
        match res.status() {
            StatusCode::OK =>
                Ok(res.bytes().await.map_err(transport_err)?.to_vec()),
            StatusCode::NOT_FOUND => Err(Error::NoData.into()),
            n => Err(Error::Transport(
                format!("unexpected HTTP status {}", n)).into()),
        }
    }

    /// Searches for keys matching `pattern`.
    pub async fn search(&self, pattern: &str) -> Result<Vec<u8>> {
        let url = self.request_url.join(
            &format!("pks/lookup?op=index&options=mr&search={}",
                     percent_encode(pattern.as_bytes(),
                                    KEYSERVER_ENCODE_SET)))
            .map_err(transport_err)?;
        self.get_raw(url).await
    }

    /// Retrieves the keys matching `pattern`.
    ///
    /// The pattern must be a keyid, a fingerprint, or an exact name
    /// indicated by the `=` prefix.
    pub async fn get(&self, pattern: &str) -> Result<Vec<u8>> {
        let query = classify_get_pattern(pattern)?;
        let url = self.request_url.join(
            &format!("pks/lookup?op=get&options=mr&{}", query))
            .map_err(transport_err)?;
        self.get_raw(url).await
    }

    /// Sends the given armored keyblock to the server.
    pub async fn put(&self, armored: &[u8]) -> Result<()> {
        let url = self.request_url.join("pks/add").map_err(transport_err)?;

        // Prepare to send url-encoded data.
        let mut post_data = b"keytext=".to_vec();
        post_data.extend_from_slice(
            percent_encode(armored, KEYSERVER_ENCODE_SET)
                .collect::<String>().as_bytes());
        let length = post_data.len();

        let res = self.client.post(url)
            .header("content-type", "application/x-www-form-urlencoded")
            .header("content-length", length.to_string())
            .body(post_data).send().await.map_err(transport_err)?;

        match res.status() {
            StatusCode::OK => Ok(()),
            n => Err(Error::Transport(
                format!("unexpected HTTP status {}", n)).into()),
        }
    }
}

/// Maps a `KS_GET` pattern onto an HKP query fragment.
fn classify_get_pattern(pattern: &str) -> Result<String> {
    if let Some(name) = pattern.strip_prefix('=') {
        if name.is_empty() {
            return Err(Error::InvalidArgument(
                "empty exact-match pattern".into()).into());
        }
        return Ok(format!("search={}&exact=on",
                          percent_encode(name.as_bytes(),
                                         KEYSERVER_ENCODE_SET)));
    }

    let hex = pattern.strip_prefix("0x").unwrap_or(pattern);
    let is_hex = !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit());
    match (is_hex, hex.len()) {
        (true, 8) | (true, 16) | (true, 32) | (true, 40) =>
            Ok(format!("search=0x{}", hex)),
        _ => Err(Error::InvalidArgument(
            format!("{:?} is not a keyid, fingerprint, or =name",
                    pattern)).into()),
    }
}

fn block_on_with_timeout<T, F>(opts: &NetOpts, fut: F) -> Result<T>
    where F: Future<Output = Result<T>>,
{
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Internal(e.to_string()))?;
    rt.block_on(async {
        tokio::time::timeout(opts.timeout, fut).await
            .map_err(|_| anyhow::Error::from(Error::Timeout))?
    })
}

/// Searches the configured keyservers for `patterns`.
///
/// The servers are tried in order until one yields data.  Only the
/// first pattern is used; this mirrors the original service.
pub fn ks_action_search(opts: &NetOpts, keyservers: &[KeyserverItem],
                        patterns: &[String], out: &mut Vec<u8>)
                        -> Result<()> {
    let pattern = patterns.first().ok_or_else(
        || Error::InvalidArgument("no search pattern".into()))?;

    block_on_with_timeout(opts, async {
        let mut first_err = None;
        for ks in keyservers {
            let server = match KeyServer::new(opts, &ks.uri) {
                Ok(s) => s,
                Err(e) => {
                    first_err.get_or_insert(e);
                    continue;
                },
            };
            match server.search(pattern).await {
                Ok(data) => {
                    out.extend_from_slice(&data);
                    return Ok(());
                },
                Err(e) => {
                    log::info!("search on {:?} failed: {}", ks.uri, e);
                    first_err.get_or_insert(e);
                },
            }
        }
        Err(first_err.unwrap_or_else(|| Error::NoData.into()))
    })
}

/// Retrieves the keys matching `patterns` from the configured
/// keyservers.
///
/// The first server that yields data for any pattern wins; the
/// matching keys are concatenated.
pub fn ks_action_get(opts: &NetOpts, keyservers: &[KeyserverItem],
                     patterns: &[String], out: &mut Vec<u8>)
                     -> Result<()> {
    if patterns.is_empty() {
        return Err(Error::InvalidArgument("no pattern".into()).into());
    }
    // Reject malformed patterns before any network traffic.
    for p in patterns {
        classify_get_pattern(p)?;
    }

    block_on_with_timeout(opts, async {
        let mut first_err = None;
        for ks in keyservers {
            let server = match KeyServer::new(opts, &ks.uri) {
                Ok(s) => s,
                Err(e) => {
                    first_err.get_or_insert(e);
                    continue;
                },
            };

            let mut server_out = Vec::new();
            let mut any = false;
            let mut failed = false;
            for p in patterns {
                match server.get(p).await {
                    Ok(data) => {
                        server_out.extend_from_slice(&data);
                        any = true;
                    },
                    Err(e) => {
                        if e.downcast_ref::<Error>() != Some(&Error::NoData) {
                            log::info!("get from {:?} failed: {}",
                                       ks.uri, e);
                            failed = true;
                        }
                        first_err.get_or_insert(e);
                    },
                }
            }

            if any && !failed {
                out.extend_from_slice(&server_out);
                return Ok(());
            }
        }
        Err(first_err.unwrap_or_else(|| Error::NoData.into()))
    })
}

/// Fetches the key(s) at `url`.
pub fn ks_action_fetch(opts: &NetOpts, url: &str, out: &mut Vec<u8>)
                       -> Result<()> {
    let parsed = uri::parse_uri(url)?;
    if !parsed.is_http && !parsed.is_https {
        return Err(Error::NotSupported(
            format!("fetching from {} URLs", parsed.scheme)).into());
    }

    let data = block_on_with_timeout(opts, async {
        let client = make_client(opts)?;
        let res = client.get(url).send().await.map_err(transport_err)?;
        match res.status() {
            StatusCode::OK =>
                Ok(res.bytes().await.map_err(transport_err)?.to_vec()),
            StatusCode::NOT_FOUND => Err(Error::NoData.into()),
            n => Err(Error::Transport(
                format!("unexpected HTTP status {}", n)).into()),
        }
    })?;

    out.extend_from_slice(&data);
    Ok(())
}

/// Sends `keyblock` to all configured keyservers.
///
/// One accepting server counts as success.  The keyblock must be a
/// binary OpenPGP packet sequence; it is armored for submission.
pub fn ks_action_put(opts: &NetOpts, keyservers: &[KeyserverItem],
                     keyblock: &[u8], info: &[u8])
                     -> Result<()> {
    // The meta data is not needed for HKP, but clients send it and
    // broken keyblocks should be diagnosed before hitting the net.
    log::debug!("keyblock info: {} bytes", info.len());
    PacketPile::from_bytes(keyblock)?;

    let armored = {
        use std::io::Write;
        let mut w = armor::Writer::new(Vec::new(), armor::Kind::PublicKey)?;
        w.write_all(keyblock)?;
        w.finalize()?
    };

    block_on_with_timeout(opts, async {
        let mut first_err = None;
        let mut any = false;
        for ks in keyservers {
            let server = match KeyServer::new(opts, &ks.uri) {
                Ok(s) => s,
                Err(e) => {
                    first_err.get_or_insert(e);
                    continue;
                },
            };
            match server.put(&armored).await {
                Ok(()) => any = true,
                Err(e) => {
                    log::info!("put to {:?} failed: {}", ks.uri, e);
                    first_err.get_or_insert(e);
                },
            }
        }
        if any {
            Ok(())
        } else {
            Err(first_err.unwrap_or_else(|| Error::NoData.into()))
        }
    })
}

/// A [`CertFetcher`] going over plain HTTP(S).
///
/// [`CertFetcher`]: crate::cache::CertFetcher
pub struct HttpFetcher {
    opts: NetOpts,
}

impl HttpFetcher {
    /// Creates a fetcher with the given network options.
    pub fn new(opts: NetOpts) -> Self {
        HttpFetcher { opts }
    }
}

impl crate::cache::CertFetcher for HttpFetcher {
    fn fetch_cert_by_url(&self, url: &str) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        ks_action_fetch(&self.opts, url, &mut out)?;
        Ok(out)
    }

    fn fetch_crl(&self, url: &str) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        ks_action_fetch(&self.opts, url, &mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_url_mapping() {
        let opts = NetOpts {
            timeout: Duration::from_secs(1),
            http_proxy: None,
        };
        let ks = KeyServer::new(&opts, "hkp://keys.example.org").unwrap();
        assert_eq!(ks.url().as_str(), "hkp://keys.example.org");

        assert!(KeyServer::new(&opts, "keys.example.org").is_err());
        assert!(KeyServer::new(&opts, "ldap://keys.example.org").is_err());
    }

    #[test]
    fn get_patterns() {
        assert!(classify_get_pattern("D03F6F865226FE8B").is_ok());
        assert!(classify_get_pattern("0xD03F6F865226FE8B").is_ok());
        assert!(classify_get_pattern(
            "3E8877C877274692975189F5D03F6F865226FE8B").is_ok());
        assert_eq!(classify_get_pattern("=John Doe").unwrap(),
                   "search=John%20Doe&exact=on");
        assert!(classify_get_pattern("john@example.org").is_err());
        assert!(classify_get_pattern("=").is_err());
    }
}
