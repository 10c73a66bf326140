//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves canned responses by request path and records every request line,
//! so tests can assert exactly which GETs were issued.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub struct Route {
    pub status: &'static str,
    pub body: Vec<u8>,
    pub location: Option<String>,
    /// Content-Length to announce instead of the real body length.
    pub advertised_len: Option<usize>,
}

impl Route {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: "200 OK",
            body: body.into(),
            location: None,
            advertised_len: None,
        }
    }

    pub fn status(status: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            location: None,
            advertised_len: None,
        }
    }

    pub fn redirect(location: &str) -> Self {
        Self {
            status: "302 Found",
            body: Vec::new(),
            location: Some(location.to_string()),
            advertised_len: None,
        }
    }

    /// 200 that announces `advertised_len` bytes, sends `body` and hangs up.
    pub fn truncated(body: impl Into<Vec<u8>>, advertised_len: usize) -> Self {
        Self {
            advertised_len: Some(advertised_len),
            ..Self::ok(body)
        }
    }
}

pub struct BlobServer {
    /// Base URL without trailing slash, e.g. "http://127.0.0.1:12345".
    pub base: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl BlobServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Request lines seen so far, e.g. "GET /key.pem?x=1".
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Starts a server in a background thread. Paths not in `routes` get 404.
/// The server runs until the process exits.
pub fn start(routes: Vec<(&str, Route)>) -> BlobServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Arc<HashMap<String, Route>> = Arc::new(
        routes
            .into_iter()
            .map(|(path, route)| (path.to_string(), route))
            .collect(),
    );
    let requests = Arc::new(Mutex::new(Vec::new()));
    {
        let requests = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let routes = Arc::clone(&routes);
                let requests = Arc::clone(&requests);
                thread::spawn(move || handle(stream, &routes, &requests));
            }
        });
    }
    BlobServer {
        base: format!("http://127.0.0.1:{}", port),
        requests,
    }
}

fn handle(mut stream: TcpStream, routes: &HashMap<String, Route>, requests: &Mutex<Vec<String>>) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let Ok(request) = std::str::from_utf8(&buf[..n]) else {
        return;
    };
    let mut parts = request.lines().next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("").to_string();
    let target = parts.next().unwrap_or("").to_string();
    requests.lock().unwrap().push(format!("{method} {target}"));

    let path = target.split('?').next().unwrap_or("");
    let route = routes
        .get(path)
        .cloned()
        .unwrap_or_else(|| Route::status("404 Not Found", "not found"));
    let location = route
        .location
        .as_deref()
        .map(|l| format!("Location: {l}\r\n"))
        .unwrap_or_default();
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
        route.status,
        route.advertised_len.unwrap_or(route.body.len()),
        location
    );
    let _ = stream.write_all(head.as_bytes());
    if method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(&route.body);
    }
}
