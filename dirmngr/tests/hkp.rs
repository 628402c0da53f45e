//! Tests of the keyserver action layer against a real HTTP server.

use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, combinators::BoxBody};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use madrona_dirmngr::Error;
use madrona_dirmngr::ks::{
    KeyserverItem, NetOpts, ks_action_fetch, ks_action_get,
    ks_action_put, ks_action_search,
};

const SEARCH_RESULT: &str = "info:1:1\npub:D03F6F865226FE8B:1:2048:1511551738::\n";
const KEY_RESULT: &str = "-----BEGIN PGP PUBLIC KEY BLOCK-----\n...\n";

/// A one-packet OpenPGP keyblock: a user id packet.
const KEYBLOCK: &[u8] = &[0xCD, 0x03, b'a', b'b', b'c'];

async fn service(
    req: Request<hyper::body::Incoming>,
) -> Result<Response<BoxBody<Bytes, hyper::Error>>, hyper::Error> {
    match (req.method(), req.uri().path()) {
        (&Method::GET, "/pks/lookup") => {
            let args = req.uri().query().expect("expected a query string");
            let mut op = None;
            let mut search = None;
            for (key, value) in url::form_urlencoded::parse(args.as_bytes()) {
                match key.as_ref() {
                    "op" => op = Some(value.into_owned()),
                    "options" => assert_eq!(value, "mr"),
                    "search" => search = Some(value.into_owned()),
                    "exact" => assert_eq!(value, "on"),
                    k => panic!("Bad query: {}:{}", k, value),
                }
            }

            match op.as_deref() {
                Some("index") => {
                    assert_eq!(search.as_deref(), Some("alice"));
                    Ok(Response::new(full(SEARCH_RESULT)))
                },
                Some("get") => {
                    assert_eq!(search.as_deref(), Some("0xD03F6F865226FE8B"));
                    Ok(Response::new(full(KEY_RESULT)))
                },
                op => panic!("Bad op: {:?}", op),
            }
        },
        (&Method::POST, "/pks/add") => {
            let b = req.collect().await?.to_bytes();

            let mut seen = false;
            for (key, value) in url::form_urlencoded::parse(&b) {
                match key.as_ref() {
                    "keytext" => {
                        assert!(value.contains(
                            "-----BEGIN PGP PUBLIC KEY BLOCK-----"));
                        seen = true;
                    },
                    k => panic!("Bad post: {}:{}", k, value),
                }
            }
            assert!(seen);

            Ok(Response::new(full("Ok")))
        },
        (&Method::GET, "/key.bin") => {
            Ok(Response::new(full(&b"rawkey"[..])))
        },
        (&Method::GET, "/slow") => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Response::new(full("too late")))
        },
        _ => {
            Ok(Response::builder()
               .status(StatusCode::NOT_FOUND)
               .body(full("Not found")).unwrap())
        },
    }
}

fn full<T: Into<Bytes>>(chunk: T) -> BoxBody<Bytes, hyper::Error> {
    Full::new(chunk.into())
        .map_err(|never| match never {})
        .boxed()
}

/// Starts a server on a random port and returns its address.
fn start_server() -> SocketAddr {
    let (tx, rx) = std::sync::mpsc::channel();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async move {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();

            loop {
                let (stream, _) = listener.accept().await.unwrap();
                let io = TokioIo::new(stream);
                tokio::task::spawn(async move {
                    if let Err(err) = http1::Builder::new()
                        .serve_connection(io, service_fn(service))
                        .await
                    {
                        eprintln!("Error serving connection: {:?}", err);
                    }
                });
            }
        });
    });

    rx.recv().unwrap()
}

fn opts() -> NetOpts {
    NetOpts {
        timeout: Duration::from_secs(10),
        http_proxy: None,
    }
}

fn keyservers(addr: SocketAddr) -> Vec<KeyserverItem> {
    vec![KeyserverItem::new(&format!("hkp://{}", addr)).unwrap()]
}

#[test]
fn search() {
    let addr = start_server();
    let mut out = Vec::new();
    ks_action_search(&opts(), &keyservers(addr),
                     &["alice".to_string()], &mut out).unwrap();
    assert_eq!(out, SEARCH_RESULT.as_bytes());
}

#[test]
fn search_needs_a_pattern() {
    let err = ks_action_search(&opts(), &[], &[], &mut Vec::new())
        .unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(),
                     Some(Error::InvalidArgument(_))));
}

#[test]
fn get() {
    let addr = start_server();
    let mut out = Vec::new();
    ks_action_get(&opts(), &keyservers(addr),
                  &["0xD03F6F865226FE8B".to_string()], &mut out).unwrap();
    assert_eq!(out, KEY_RESULT.as_bytes());
}

#[test]
fn get_requires_keyid_patterns() {
    // Rejected before any network traffic; no server needed.
    let ks = vec![KeyserverItem::new("hkp://localhost").unwrap()];
    let err = ks_action_get(&opts(), &ks,
                            &["alice@example.org".to_string()],
                            &mut Vec::new())
        .unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(),
                     Some(Error::InvalidArgument(_))));
}

#[test]
fn put() {
    let addr = start_server();
    ks_action_put(&opts(), &keyservers(addr), KEYBLOCK, b"uid:abc:")
        .unwrap();
}

#[test]
fn put_validates_the_keyblock() {
    // No server contacted for a broken keyblock.
    let ks = vec![KeyserverItem::new("hkp://localhost").unwrap()];
    assert!(ks_action_put(&opts(), &ks, b"\xff\xff", b"").is_err());
}

#[test]
fn fetch() {
    let addr = start_server();
    let mut out = Vec::new();
    ks_action_fetch(&opts(), &format!("http://{}/key.bin", addr),
                    &mut out).unwrap();
    assert_eq!(out, b"rawkey");
}

#[test]
fn fetch_missing_is_no_data() {
    let addr = start_server();
    let err = ks_action_fetch(&opts(), &format!("http://{}/nothing", addr),
                              &mut Vec::new())
        .unwrap_err();
    assert_eq!(err.downcast_ref::<Error>(), Some(&Error::NoData));
}

#[test]
fn fetch_rejects_unknown_schemes() {
    let err = ks_action_fetch(&opts(), "ldap://example.org/x",
                              &mut Vec::new())
        .unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(),
                     Some(Error::NotSupported(_))));
}

#[test]
fn network_operations_observe_the_deadline() {
    let addr = start_server();
    let opts = NetOpts {
        timeout: Duration::from_millis(250),
        http_proxy: None,
    };
    let err = ks_action_fetch(&opts, &format!("http://{}/slow", addr),
                              &mut Vec::new())
        .unwrap_err();
    assert_eq!(err.downcast_ref::<Error>(), Some(&Error::Timeout));
}

#[test]
fn search_fails_over_to_the_next_server() {
    let addr = start_server();
    // Nothing listens on port 1; the second server answers.
    let ks = vec![
        KeyserverItem::new("hkp://127.0.0.1:1").unwrap(),
        KeyserverItem::new(&format!("hkp://{}", addr)).unwrap(),
    ];
    let mut out = Vec::new();
    ks_action_search(&opts(), &ks, &["alice".to_string()], &mut out)
        .unwrap();
    assert_eq!(out, SEARCH_RESULT.as_bytes());
}
