//! Keyserver endpoint addresses.
//!
//! Keyservers are addressed by URL.  The parser is permissive: the
//! HKP schemes are mapped onto their HTTP equivalents with their
//! well-known default ports, plain HTTP(S) is passed through, and
//! unknown schemes are accepted and carried opaquely so that
//! alternative transports can be configured even if this service
//! cannot speak them.

use url::Url;

use crate::Error;
use crate::Result;

/// The default port of the HKP protocol.
pub const HKP_PORT: u16 = 11371;

/// A parsed endpoint address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUri {
    /// The scheme, lower case.
    pub scheme: String,
    /// The userinfo part, if present.
    pub userinfo: Option<String>,
    /// The host, if the scheme has an authority.
    pub host: Option<String>,
    /// The port, with scheme defaults filled in.
    pub port: Option<u16>,
    /// The path.
    pub path: String,
    /// The query string, if present.
    pub query: Option<String>,
    /// Whether this is addressed over plain HTTP.
    pub is_http: bool,
    /// Whether this is addressed over HTTPS.
    pub is_https: bool,
    /// Whether the URI is opaque (has no authority part).
    pub opaque: bool,
}

/// Parses an endpoint address.
pub fn parse_uri(uri: &str) -> Result<ParsedUri> {
    let url = Url::parse(uri).map_err(
        |e| Error::InvalidArgument(format!("bad URI {:?}: {}", uri, e)))?;

    let scheme = url.scheme().to_ascii_lowercase();
    let (is_http, is_https, default_port) = match scheme.as_str() {
        "http" => (true, false, Some(80)),
        "hkp" => (true, false, Some(HKP_PORT)),
        "https" => (false, true, Some(443)),
        "hkps" => (false, true, Some(443)),
        _ => (false, false, None),
    };

    let userinfo = if url.username().is_empty() && url.password().is_none() {
        None
    } else {
        Some(match url.password() {
            Some(p) => format!("{}:{}", url.username(), p),
            None => url.username().to_string(),
        })
    };

    Ok(ParsedUri {
        userinfo,
        host: url.host_str().map(Into::into),
        port: url.port().or(default_port),
        path: url.path().into(),
        query: url.query().map(Into::into),
        is_http,
        is_https,
        opaque: url.cannot_be_a_base(),
        scheme,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hkp_defaults() {
        let u = parse_uri("hkp://keys.example.org").unwrap();
        assert!(u.is_http);
        assert!(!u.is_https);
        assert_eq!(u.host.as_deref(), Some("keys.example.org"));
        assert_eq!(u.port, Some(HKP_PORT));
        assert!(!u.opaque);
    }

    #[test]
    fn hkps_defaults() {
        let u = parse_uri("hkps://keys.example.org").unwrap();
        assert!(u.is_https);
        assert_eq!(u.port, Some(443));
    }

    #[test]
    fn explicit_port_wins() {
        let u = parse_uri("hkp://keys.example.org:8080").unwrap();
        assert_eq!(u.port, Some(8080));
    }

    #[test]
    fn http_passthrough() {
        let u = parse_uri("https://example.org/pks/lookup?op=index").unwrap();
        assert!(u.is_https);
        assert_eq!(u.path, "/pks/lookup");
        assert_eq!(u.query.as_deref(), Some("op=index"));
    }

    #[test]
    fn userinfo() {
        let u = parse_uri("http://user:pw@example.org/").unwrap();
        assert_eq!(u.userinfo.as_deref(), Some("user:pw"));
    }

    #[test]
    fn unknown_scheme_is_opaque() {
        let u = parse_uri("ldap://x.example.org/cn=foo").unwrap();
        assert!(!u.is_http && !u.is_https);
        assert_eq!(u.scheme, "ldap");

        let u = parse_uri("mailto:alice@example.org").unwrap();
        assert!(u.opaque);

        assert!(parse_uri("not a uri").is_err());
    }
}
