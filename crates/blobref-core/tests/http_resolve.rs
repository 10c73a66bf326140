//! Integration tests: http:// references against a local server.

mod common;

use blobref_core::checksum::{digest_hex, ChecksumAlgorithm};
use blobref_core::config::HttpConfig;
use blobref_core::{ContentStream, Error, ErrorCategory, Resolver};
use common::blob_server::{self, Route};
use std::collections::HashMap;
use std::io::Read;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

fn resolver() -> Resolver<HashMap<String, String>> {
    Resolver::with_env(HashMap::new())
}

#[test]
fn load_issues_exactly_one_get_to_the_exact_url() {
    let server = blob_server::start(vec![("/keys/cosign.pub", Route::ok("PUBLIC KEY"))]);
    let url = server.url("/keys/cosign.pub?rev=3");

    let body = resolver().load(&url).unwrap();

    assert_eq!(body, b"PUBLIC KEY");
    assert_eq!(server.requests(), vec!["GET /keys/cosign.pub?rev=3".to_string()]);
}

#[test]
fn load_with_checksum_over_http() {
    let body: Vec<u8> = (0u8..200).cycle().take(100 * 1024).collect();
    let server = blob_server::start(vec![("/blob.bin", Route::ok(body.clone()))]);
    let url = server.url("/blob.bin");
    let sha256 = digest_hex(ChecksumAlgorithm::Sha256, &body);

    let verified = resolver()
        .load_with_checksum(&url, &format!("sha256:{sha256}"))
        .unwrap();
    assert_eq!(verified, body);

    let mut wrong = sha256.clone();
    let flipped = if wrong.starts_with('0') { "1" } else { "0" };
    wrong.replace_range(0..1, flipped);
    let err = resolver()
        .load_with_checksum(&url, &format!("sha256:{wrong}"))
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Integrity);
    match err {
        Error::ChecksumMismatch {
            reference,
            expected,
            computed,
        } => {
            assert_eq!(reference, url);
            assert_eq!(expected, wrong);
            assert_eq!(computed, sha256);
        }
        other => panic!("expected ChecksumMismatch, got {other:?}"),
    }
}

#[test]
fn malformed_checksum_sends_no_request() {
    let server = blob_server::start(vec![("/blob.bin", Route::ok("data"))]);
    let err = resolver()
        .load_with_checksum(&server.url("/blob.bin"), "sha256:aa:bb")
        .unwrap_err();
    assert!(matches!(err, Error::MalformedChecksum { .. }));
    assert!(server.requests().is_empty());
}

#[test]
fn error_status_body_is_returned_by_default() {
    let server = blob_server::start(vec![]);
    let body = resolver().load(&server.url("/missing")).unwrap();
    assert_eq!(body, b"not found");
}

#[test]
fn error_status_rejected_when_configured() {
    let server = blob_server::start(vec![(
        "/down",
        Route::status("503 Service Unavailable", "try later"),
    )]);
    let strict = resolver().with_http_config(HttpConfig {
        reject_error_status: true,
        ..HttpConfig::default()
    });
    let url = server.url("/down");

    match strict.load(&url) {
        Err(Error::HttpStatus { url: u, code }) => {
            assert_eq!(u, url);
            assert_eq!(code, 503);
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
    assert!(matches!(strict.open(&url), Err(Error::HttpStatus { code: 503, .. })));
}

#[test]
fn redirects_are_followed() {
    let server = blob_server::start(vec![
        ("/old", Route::redirect("/new")),
        ("/new", Route::ok("moved content")),
    ]);
    let body = resolver().load(&server.url("/old")).unwrap();
    assert_eq!(body, b"moved content");
    assert_eq!(
        server.requests(),
        vec!["GET /old".to_string(), "GET /new".to_string()]
    );
}

#[test]
fn connection_refused_is_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let url = format!("http://127.0.0.1:{port}/x");

    let err = resolver().load(&url).unwrap_err();
    assert!(matches!(err, Error::Http(_)));
    assert_eq!(err.category(), ErrorCategory::Environment);

    assert!(matches!(resolver().open(&url), Err(Error::Http(_))));
}

#[test]
fn open_streams_http_body() {
    let body: Vec<u8> = (0u8..=255).cycle().take(512 * 1024).collect();
    let server = blob_server::start(vec![("/big.bin", Route::ok(body.clone()))]);

    let mut stream = resolver().open(&server.url("/big.bin")).unwrap();
    assert!(matches!(stream, ContentStream::Http(_)));
    let mut got = Vec::new();
    stream.read_to_end(&mut got).unwrap();
    assert_eq!(got, body);
    assert_eq!(server.requests(), vec!["GET /big.bin".to_string()]);
}

#[test]
fn open_empty_body() {
    let server = blob_server::start(vec![("/empty", Route::ok(Vec::new()))]);
    let mut stream = resolver().open(&server.url("/empty")).unwrap();
    let mut got = Vec::new();
    stream.read_to_end(&mut got).unwrap();
    assert!(got.is_empty());
}

#[test]
fn dropping_partially_read_stream_releases_transfer() {
    let body: Vec<u8> = (0u8..=255).cycle().take(16 * 1024 * 1024).collect();
    let server = blob_server::start(vec![("/huge.bin", Route::ok(body.clone()))]);

    let mut stream = resolver().open(&server.url("/huge.bin")).unwrap();
    let mut head = [0u8; 1024];
    stream.read_exact(&mut head).unwrap();
    assert_eq!(&head[..], &body[..1024]);

    // Drop joins the worker, so it only returns once the transfer is gone.
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        drop(stream);
        let _ = tx.send(());
    });
    rx.recv_timeout(Duration::from_secs(10))
        .expect("dropping the stream should abort the transfer");
    assert_eq!(server.requests(), vec!["GET /huge.bin".to_string()]);
}

#[test]
fn truncated_body_fails_load() {
    let server = blob_server::start(vec![("/cut.bin", Route::truncated(vec![1u8; 5000], 100_000))]);

    match resolver().load(&server.url("/cut.bin")) {
        Err(err @ Error::Http(_)) => assert_eq!(err.category(), ErrorCategory::Environment),
        other => panic!("expected transport error, got {other:?}"),
    }
    assert!(matches!(
        resolver().load_with_checksum(&server.url("/cut.bin"), &digest_hex(ChecksumAlgorithm::Sha256, &[1u8; 5000])),
        Err(Error::Http(_))
    ));
}

#[test]
fn truncated_body_fails_stream_read() {
    let server = blob_server::start(vec![("/cut.bin", Route::truncated(vec![1u8; 5000], 100_000))]);

    let mut stream = resolver().open(&server.url("/cut.bin")).unwrap();
    let mut got = Vec::new();
    let err = stream.read_to_end(&mut got).unwrap_err();

    assert!(got.len() <= 5000);
    assert!(
        err.get_ref()
            .is_some_and(|inner| inner.downcast_ref::<curl::Error>().is_some()),
        "expected curl error inside {err:?}"
    );
    // The error is sticky: later reads report end of stream, not more data.
    assert_eq!(stream.read(&mut [0u8; 16]).unwrap(), 0);
}
