//! End-to-end tests of the command server.
//!
//! Each test drives a real session over a socket pair: the server
//! loop runs in its own thread, the test plays the client.

use std::io::{BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use madrona_dirmngr::Error;
use madrona_dirmngr::Result;
use madrona_dirmngr::cache::{
    Backends, CertCache, ChainValidator, CrlCache, CrlVerdict, DisabledOcsp,
    MemoryCertCache, OcspClient, ValidateFlags,
};
use madrona_dirmngr::cert::Cert;
use madrona_dirmngr::config::{Config, DEFAULT_KEYSERVER};
use madrona_dirmngr::server::start_command_handler;
use madrona_ipc::assuan::{Client, Response};

/// A syntactically plausible DER blob.
fn dummy_der(seed: u8) -> Vec<u8> {
    vec![0x30, 0x03, 0x02, 0x01, seed]
}

/// A scriptable CRL cache.
#[derive(Default)]
struct MockCrl {
    /// Verdicts popped by successive `isvalid` calls.
    verdicts: Mutex<Vec<CrlVerdict>>,
    /// Errors (or successes) popped by successive `cert_isvalid`
    /// calls.
    cert_verdicts: Mutex<Vec<Option<Error>>>,
    /// Number of `reload_crl` calls.
    reloads: Mutex<usize>,
    /// What `list` writes.
    list_data: Vec<u8>,
}

impl MockCrl {
    fn with_verdicts(verdicts: Vec<CrlVerdict>) -> Self {
        MockCrl {
            verdicts: Mutex::new(verdicts),
            ..Default::default()
        }
    }

    fn reloads(&self) -> usize {
        *self.reloads.lock().unwrap()
    }
}

impl CrlCache for MockCrl {
    fn isvalid(&self, _issuer_hash: &str, _serial: &str, _force: bool)
               -> CrlVerdict {
        let mut v = self.verdicts.lock().unwrap();
        assert!(!v.is_empty(), "unexpected isvalid call");
        v.remove(0)
    }

    fn cert_isvalid(&self, _cert: &Cert, _force: bool) -> Result<()> {
        let mut v = self.cert_verdicts.lock().unwrap();
        assert!(!v.is_empty(), "unexpected cert_isvalid call");
        match v.remove(0) {
            None => Ok(()),
            Some(e) => Err(e.into()),
        }
    }

    fn reload_crl(&self, _cert: &Cert) -> Result<()> {
        *self.reloads.lock().unwrap() += 1;
        Ok(())
    }

    fn load(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn list(&self, out: &mut dyn Write) -> Result<()> {
        out.write_all(&self.list_data)?;
        Ok(())
    }

    fn insert(&self, _url: &str, _crl: &[u8]) -> Result<()> {
        Ok(())
    }
}

/// A validator recording its invocations.
#[derive(Default)]
struct MockValidator {
    calls: Mutex<Vec<ValidateFlags>>,
}

impl ChainValidator for MockValidator {
    fn validate_chain(&self, _cert: &Cert, _anchor: Option<&Cert>,
                      flags: ValidateFlags,
                      _out_chain: Option<&mut Vec<Cert>>)
                      -> Result<()> {
        self.calls.lock().unwrap().push(flags);
        Ok(())
    }
}

/// An OCSP checker that approves everything.
#[derive(Default)]
struct ApprovingOcsp {}

impl OcspClient for ApprovingOcsp {
    fn isvalid(&self, _cert: Option<&Cert>, _issuer: Option<&Cert>,
               _force: bool)
               -> Result<()> {
        Ok(())
    }
}

/// A fetcher serving canned data.
#[derive(Default)]
struct MockFetcher {
    data: Vec<u8>,
}

impl madrona_dirmngr::cache::CertFetcher for MockFetcher {
    fn fetch_cert_by_url(&self, _url: &str) -> Result<Vec<u8>> {
        Ok(self.data.clone())
    }

    fn fetch_crl(&self, _url: &str) -> Result<Vec<u8>> {
        Ok(self.data.clone())
    }
}

fn backends() -> Backends {
    Backends {
        crl: Arc::new(MockCrl::default()),
        certs: Arc::new(MemoryCertCache::new()),
        ocsp: Arc::new(DisabledOcsp::new()),
        validator: Arc::new(MockValidator::default()),
        fetcher: Arc::new(MockFetcher::default()),
    }
}

type TestClient = Client<BufReader<UnixStream>, UnixStream>;

fn connect(config: Config, backends: Backends)
           -> (TestClient, JoinHandle<Result<bool>>) {
    let (client_sock, server_sock) = UnixStream::pair().expect("socketpair");

    let handle = std::thread::spawn(move || {
        let reader = BufReader::new(
            server_sock.try_clone().expect("clone"));
        start_command_handler(reader, server_sock, Arc::new(config),
                              backends)
    });

    let reader = BufReader::new(client_sock.try_clone().expect("clone"));
    let (client, greeting) =
        Client::connect(reader, client_sock).expect("greeting");
    assert!(matches!(greeting, Response::Ok { .. }));
    (client, handle)
}

fn expect_ok(r: &Response) {
    assert!(matches!(r, Response::Ok { .. }), "expected OK, got {:?}", r);
}

fn expect_err(r: &Response, code: usize) {
    match r {
        Response::Error { code: c, .. } =>
            assert_eq!(*c, code, "unexpected error code in {:?}", r),
        r => panic!("expected ERR {}, got {:?}", code, r),
    }
}

#[test]
fn isvalid_inquires_once_then_succeeds() {
    // Scenario: the CRL cache first answers DontKnow; after the
    // client supplies the certificate and the CRL is reloaded, the
    // verdict is Valid.
    let crl = Arc::new(MockCrl::with_verdicts(
        vec![CrlVerdict::DontKnow, CrlVerdict::Valid]));
    let mut b = backends();
    b.crl = crl.clone();
    let (mut client, _handle) = connect(Config::default(), b);

    client.send(
        "ISVALID 0123456789abcdef0123456789abcdef01234567.01").unwrap();
    let (_, _, r) = client.complete().unwrap();
    match r {
        Response::Inquire { keyword, .. } => assert_eq!(keyword, "SENDCERT"),
        r => panic!("expected an inquiry, got {:?}", r),
    }

    client.data_reply(&dummy_der(1)).unwrap();
    let (_, _, r) = client.complete().unwrap();
    expect_ok(&r);
    assert_eq!(crl.reloads(), 1);
}

#[test]
fn isvalid_retry_is_capped() {
    // The cache keeps answering DontKnow; exactly one inquiry is
    // made, then the command fails with no-crl-known.
    let crl = Arc::new(MockCrl::with_verdicts(
        vec![CrlVerdict::DontKnow, CrlVerdict::DontKnow]));
    let mut b = backends();
    b.crl = crl.clone();
    let (mut client, _handle) = connect(Config::default(), b);

    client.send(
        "ISVALID 0123456789abcdef0123456789abcdef01234567.01").unwrap();
    let (_, _, r) = client.complete().unwrap();
    assert!(matches!(r, Response::Inquire { .. }));

    client.data_reply(&dummy_der(1)).unwrap();
    let (_, _, r) = client.complete().unwrap();
    expect_err(&r, 7);          // no-crl-known
    assert_eq!(crl.reloads(), 1);
}

#[test]
fn isvalid_verdicts() {
    for (verdict, code) in [
        (CrlVerdict::Revoked, 8),   // certificate-revoked
        (CrlVerdict::CantUse, 7),   // no-crl-known
    ] {
        let mut b = backends();
        b.crl = Arc::new(MockCrl::with_verdicts(vec![verdict]));
        let (mut client, _handle) = connect(Config::default(), b);

        client.send("ISVALID deadbeef.2a").unwrap();
        let (_, _, r) = client.complete().unwrap();
        expect_err(&r, code);
    }
}

#[test]
fn isvalid_ocsp_disabled() {
    // A bare 40-hex fingerprint selects OCSP mode, which is
    // disabled: not-supported.
    let (mut client, _handle) = connect(Config::default(), backends());
    client.send(
        "ISVALID --only-ocsp AABBCCDDEEFF00112233445566778899AABBCCDD")
        .unwrap();
    let (_, _, r) = client.complete().unwrap();
    expect_err(&r, 10);         // not-supported
}

#[test]
fn isvalid_ocsp_enabled() {
    let mut b = backends();
    b.ocsp = Arc::new(ApprovingOcsp::default());
    let config = Config { allow_ocsp: true, ..Default::default() };
    let (mut client, _handle) = connect(config, b);

    client.send(
        "ISVALID AABBCCDDEEFF00112233445566778899AABBCCDD").unwrap();
    let (_, _, r) = client.complete().unwrap();
    expect_ok(&r);
}

#[test]
fn isvalid_requires_serialno() {
    let (mut client, _handle) = connect(Config::default(), backends());
    client.send("ISVALID deadbeef").unwrap();
    let (_, _, r) = client.complete().unwrap();
    expect_err(&r, 2);          // parameter
}

#[test]
fn checkcrl_uses_cached_cert() {
    let cert = Cert::from_der(dummy_der(3)).unwrap();
    let mut b = backends();
    b.certs.insert(&cert).unwrap();
    b.crl = Arc::new(MockCrl {
        cert_verdicts: Mutex::new(vec![None]),
        ..Default::default()
    });
    let (mut client, _handle) = connect(Config::default(), b);

    client.send(&format!("CHECKCRL {}", cert.fingerprint_hex())).unwrap();
    // No inquiry; straight to OK.
    let (_, _, r) = client.complete().unwrap();
    expect_ok(&r);
}

#[test]
fn checkcrl_inquires_and_reloads_once() {
    let crl = Arc::new(MockCrl {
        cert_verdicts: Mutex::new(vec![Some(Error::NoCrlKnown), None]),
        ..Default::default()
    });
    let mut b = backends();
    b.crl = crl.clone();
    let (mut client, _handle) = connect(Config::default(), b);

    client.send("CHECKCRL").unwrap();
    let (_, _, r) = client.complete().unwrap();
    match r {
        Response::Inquire { keyword, .. } =>
            assert_eq!(keyword, "TARGETCERT"),
        r => panic!("expected an inquiry, got {:?}", r),
    }

    client.data_reply(&dummy_der(4)).unwrap();
    let (_, _, r) = client.complete().unwrap();
    expect_ok(&r);
    assert_eq!(crl.reloads(), 1);
}

#[test]
fn checkcrl_empty_cert_is_missing() {
    let (mut client, _handle) = connect(Config::default(), backends());
    client.send("CHECKCRL").unwrap();
    let (_, _, r) = client.complete().unwrap();
    assert!(matches!(r, Response::Inquire { .. }));

    client.data_reply(b"").unwrap();
    let (_, _, r) = client.complete().unwrap();
    expect_err(&r, 6);          // missing-certificate
}

#[test]
fn checkocsp_disabled() {
    let (mut client, _handle) = connect(Config::default(), backends());
    client.send("CHECKOCSP").unwrap();
    let (_, _, r) = client.complete().unwrap();
    assert!(matches!(r, Response::Inquire { .. }));
    client.data_reply(&dummy_der(5)).unwrap();
    let (_, _, r) = client.complete().unwrap();
    expect_err(&r, 10);
}

#[test]
fn keyserver_clear_and_add_is_atomic() {
    let (mut client, _handle) = connect(Config::default(), backends());

    client.send("KEYSERVER --clear hkp://example.org").unwrap();
    let (_, _, r) = client.complete().unwrap();
    expect_ok(&r);

    client.send("KEYSERVER").unwrap();
    let (_, statuses, r) = client.complete().unwrap();
    expect_ok(&r);
    assert_eq!(statuses, vec![("KEYSERVER".to_string(),
                               "hkp://example.org".to_string())]);
}

#[test]
fn keyserver_sequence() {
    let (mut client, _handle) = connect(Config::default(), backends());

    for cmd in ["KEYSERVER --clear", "KEYSERVER hkp://example.org"] {
        client.send(cmd).unwrap();
        let (_, _, r) = client.complete().unwrap();
        expect_ok(&r);
    }

    client.send("KEYSERVER").unwrap();
    let (_, statuses, r) = client.complete().unwrap();
    expect_ok(&r);
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].1, "hkp://example.org");
}

#[test]
fn keyserver_default_fallback() {
    let (mut client, _handle) = connect(Config::default(), backends());
    client.send("KEYSERVER").unwrap();
    let (_, statuses, r) = client.complete().unwrap();
    expect_ok(&r);
    assert_eq!(statuses,
               vec![("KEYSERVER".to_string(), DEFAULT_KEYSERVER.to_string())]);
}

#[test]
fn keyserver_survives_reset() {
    let (mut client, _handle) = connect(Config::default(), backends());
    client.send("KEYSERVER --clear hkp://example.org").unwrap();
    expect_ok(&client.complete().unwrap().2);

    client.send("RESET").unwrap();
    expect_ok(&client.complete().unwrap().2);

    client.send("KEYSERVER").unwrap();
    let (_, statuses, r) = client.complete().unwrap();
    expect_ok(&r);
    assert_eq!(statuses[0].1, "hkp://example.org");
}

#[test]
fn keyserver_rejects_garbage() {
    let (mut client, _handle) = connect(Config::default(), backends());
    client.send("KEYSERVER not a uri").unwrap();
    let (_, _, r) = client.complete().unwrap();
    expect_err(&r, 1);          // invalid-argument
}

#[test]
fn ks_put_empty_keyblock() {
    let (mut client, _handle) = connect(Config::default(), backends());
    client.send("KS_PUT").unwrap();
    let (_, _, r) = client.complete().unwrap();
    match r {
        Response::Inquire { keyword, .. } => assert_eq!(keyword, "KEYBLOCK"),
        r => panic!("expected an inquiry, got {:?}", r),
    }

    client.data_reply(b"").unwrap();
    let (_, _, r) = client.complete().unwrap();
    expect_err(&r, 6);          // missing-certificate
}

#[test]
fn ks_put_rejects_garbage_keyblock() {
    let (mut client, _handle) = connect(Config::default(), backends());
    client.send("KS_PUT").unwrap();
    let (_, _, r) = client.complete().unwrap();
    assert!(matches!(r, Response::Inquire { .. }));
    // Not an OpenPGP packet sequence.
    client.data_reply(b"\x00\x01\x02").unwrap();

    let (_, _, r) = client.complete().unwrap();
    match r {
        Response::Inquire { keyword, .. } =>
            assert_eq!(keyword, "KEYBLOCK_INFO"),
        r => panic!("expected an inquiry, got {:?}", r),
    }
    client.data_reply(b"").unwrap();

    let (_, _, r) = client.complete().unwrap();
    expect_err(&r, 4);          // invalid-packet
}

#[test]
fn cachecert_and_cache_only_lookup() {
    let b = backends();
    let certs = b.certs.clone();
    let (mut client, _handle) = connect(Config::default(), b);

    client.send("CACHECERT").unwrap();
    let (_, _, r) = client.complete().unwrap();
    assert!(matches!(r, Response::Inquire { .. }));
    let der = dummy_der(6);
    client.data_reply(&der).unwrap();
    expect_ok(&client.complete().unwrap().2);

    let cert = Cert::from_der(der.clone()).unwrap();
    assert!(certs.get_by_fingerprint(cert.fingerprint()).is_some());

    client.send(&format!("LOOKUP --cache-only {}",
                         cert.fingerprint_hex())).unwrap();
    let (data, _, r) = client.complete().unwrap();
    expect_ok(&r);
    assert_eq!(data, der);

    // An uncached fingerprint yields no-data.
    client.send(
        "LOOKUP --cache-only 0000000000000000000000000000000000000000")
        .unwrap();
    let (_, _, r) = client.complete().unwrap();
    expect_err(&r, 15);         // no-data
}

#[test]
fn lookup_url_streams_fetched_cert() {
    let mut b = backends();
    b.fetcher = Arc::new(MockFetcher { data: b"fetched".to_vec() });
    let (mut client, _handle) = connect(Config::default(), b);

    client.send("LOOKUP --url http://example.org/cert.der").unwrap();
    let (data, _, r) = client.complete().unwrap();
    expect_ok(&r);
    assert_eq!(data, b"fetched");

    client.send("LOOKUP --url --cache-only http://example.org/x").unwrap();
    expect_err(&client.complete().unwrap().2, 15);

    client.send("LOOKUP --url --single http://example.org/x").unwrap();
    expect_err(&client.complete().unwrap().2, 10);
}

#[test]
fn validate_tls_chain() {
    use base64::Engine as _;
    let mut b = backends();
    let validator = Arc::new(MockValidator::default());
    b.validator = validator.clone();
    let certs = b.certs.clone();
    let (mut client, _handle) = connect(Config::default(), b);

    let target = dummy_der(7);
    let intermediate = dummy_der(8);
    let pem = format!(
        "-----BEGIN CERTIFICATE-----\n{}\n-----END CERTIFICATE-----\n\
         -----BEGIN CERTIFICATE-----\n{}\n-----END CERTIFICATE-----\n",
        base64::engine::general_purpose::STANDARD.encode(&target),
        base64::engine::general_purpose::STANDARD.encode(&intermediate));

    client.send("VALIDATE --tls --systrust").unwrap();
    let (_, _, r) = client.complete().unwrap();
    match r {
        Response::Inquire { keyword, .. } => assert_eq!(keyword, "CERTLIST"),
        r => panic!("expected an inquiry, got {:?}", r),
    }
    client.data_reply(pem.as_bytes()).unwrap();
    expect_ok(&client.complete().unwrap().2);

    let calls = validator.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].trust_config);
    assert!(calls[0].tls);
    assert!(calls[0].trust_system);
    assert!(!calls[0].no_crl);

    // The intermediate was inserted into the cache.
    let ic = Cert::from_der(intermediate).unwrap();
    assert!(certs.get_by_fingerprint(ic.fingerprint()).is_some());
}

#[test]
fn validate_plain_cert() {
    let mut b = backends();
    let validator = Arc::new(MockValidator::default());
    b.validator = validator.clone();
    let (mut client, _handle) = connect(Config::default(), b);

    client.send("VALIDATE --no-crl").unwrap();
    let (_, _, r) = client.complete().unwrap();
    match r {
        Response::Inquire { keyword, .. } =>
            assert_eq!(keyword, "TARGETCERT"),
        r => panic!("expected an inquiry, got {:?}", r),
    }
    client.data_reply(&dummy_der(9)).unwrap();
    expect_ok(&client.complete().unwrap().2);

    let calls = validator.calls.lock().unwrap();
    assert!(calls[0].no_crl);
    assert!(!calls[0].tls);
}

#[test]
fn listcrls_data_is_escaped_on_the_wire() {
    let mut b = backends();
    b.crl = Arc::new(MockCrl {
        list_data: b"issuer: CN=Test\r\n100%\nnext".to_vec(),
        ..Default::default()
    });
    let (mut client, _handle) = connect(Config::default(), b);

    client.send("LISTCRLS").unwrap();
    let (data, _, r) = client.complete().unwrap();
    expect_ok(&r);
    assert_eq!(data, b"issuer: CN=Test\r\n100%\nnext");
}

#[test]
fn loadcrl_from_url() {
    let mut b = backends();
    b.fetcher = Arc::new(MockFetcher { data: b"crl".to_vec() });
    let (mut client, _handle) = connect(Config::default(), b);

    client.send("LOADCRL --url http://example.org/x.crl").unwrap();
    expect_ok(&client.complete().unwrap().2);
}

#[test]
fn options() {
    let (mut client, _handle) = connect(Config::default(), backends());

    for cmd in ["OPTION force-crl-refresh=1",
                "OPTION http-proxy=http://proxy.example.org:3128",
                "OPTION http-proxy none",
                "OPTION http-crl 0"] {
        client.send(cmd).unwrap();
        expect_ok(&client.complete().unwrap().2);
    }

    client.send("OPTION no-such-option=1").unwrap();
    expect_err(&client.complete().unwrap().2, 11);  // unknown-option
}

#[test]
fn getinfo() {
    let (mut client, _handle) = connect(Config::default(), backends());

    client.send("GETINFO version").unwrap();
    let (data, _, r) = client.complete().unwrap();
    expect_ok(&r);
    assert_eq!(data, env!("CARGO_PKG_VERSION").as_bytes());

    client.send("GETINFO pid").unwrap();
    let (data, _, r) = client.complete().unwrap();
    expect_ok(&r);
    assert!(!data.is_empty());

    client.send("GETINFO tor").unwrap();
    expect_err(&client.complete().unwrap().2, 10);

    client.send("GETINFO moon-phase").unwrap();
    expect_err(&client.complete().unwrap().2, 2);
}

#[test]
fn unknown_command() {
    let (mut client, _handle) = connect(Config::default(), backends());
    client.send("FROBNICATE now").unwrap();
    expect_err(&client.complete().unwrap().2, 12);
}

#[test]
fn command_during_inquiry_is_a_protocol_violation() {
    let crl = Arc::new(MockCrl::with_verdicts(vec![CrlVerdict::DontKnow]));
    let mut b = backends();
    b.crl = crl;
    let (mut client, _handle) = connect(Config::default(), b);

    client.send("ISVALID deadbeef.01").unwrap();
    let (_, _, r) = client.complete().unwrap();
    assert!(matches!(r, Response::Inquire { .. }));

    // Pipelining a command across the inquiry fails the command...
    client.send("GETINFO version").unwrap();
    let (_, _, r) = client.complete().unwrap();
    assert!(matches!(r, Response::Error { .. }));

    // ... but the session stays usable.
    client.send("GETINFO version").unwrap();
    let (data, _, r) = client.complete().unwrap();
    expect_ok(&r);
    assert_eq!(data, env!("CARGO_PKG_VERSION").as_bytes());
}

#[test]
fn killdirmngr_requests_shutdown() {
    let (mut client, handle) = connect(Config::default(), backends());
    client.send("KILLDIRMNGR").unwrap();
    expect_ok(&client.complete().unwrap().2);

    // The session ends and the handler reports the stop request.
    assert!(client.next_response().unwrap().is_none());
    assert!(handle.join().unwrap().unwrap());
}

#[test]
fn bye_ends_session_without_shutdown() {
    let (mut client, handle) = connect(Config::default(), backends());
    client.send("BYE").unwrap();
    expect_ok(&client.complete().unwrap().2);
    assert!(!handle.join().unwrap().unwrap());
}
