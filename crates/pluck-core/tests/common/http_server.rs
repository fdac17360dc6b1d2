//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a fixed set of routes, can demand an exact `Authorization` value
//! on every request, and records every `Authorization` header of each
//! request so tests can check what was sent on every redirect hop.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Route {
    /// 200 with this body.
    Body(Vec<u8>),
    /// Redirect status with a `Location` header.
    Redirect { status: u16, location: String },
    /// Bare status with a short body and no `Location`.
    Status(u16),
    /// 200 advertising `declared_len` bytes but sending only `body`, then closing.
    Truncated { body: Vec<u8>, declared_len: usize },
    /// 200 with `body` after sleeping for `delay`.
    Delayed { delay: Duration, body: Vec<u8> },
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// All `Authorization` values, in the order they were received.
    pub authorizations: Vec<String>,
}

pub struct TestServer {
    base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl TestServer {
    pub fn start(routes: Vec<(&str, Route)>) -> Self {
        Self::start_with_auth(routes, None)
    }

    /// Like `start`, but answers 401 unless one `Authorization` header equals `required_auth`.
    pub fn start_with_auth(routes: Vec<(&str, Route)>, required_auth: Option<&str>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let routes: Arc<HashMap<String, Route>> = Arc::new(
            routes
                .into_iter()
                .map(|(path, route)| (path.to_string(), route))
                .collect(),
        );
        let required_auth = required_auth.map(str::to_string);
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let routes = Arc::clone(&routes);
                let required_auth = required_auth.clone();
                let recorded = Arc::clone(&recorded);
                thread::spawn(move || handle(stream, &routes, required_auth.as_deref(), &recorded));
            }
        });

        TestServer {
            base_url: format!("http://127.0.0.1:{}", port),
            requests,
        }
    }

    /// Absolute URL for `path` (which starts with `/`).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// URL on 127.0.0.1 where nothing is listening.
pub fn closed_port_url(path: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}{}", port, path)
}

fn handle(
    mut stream: TcpStream,
    routes: &HashMap<String, Route>,
    required_auth: Option<&str>,
    recorded: &Mutex<Vec<RecordedRequest>>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let head = match read_head(&mut stream) {
        Some(h) => h,
        None => return,
    };
    let request = parse_request(&head);
    recorded.lock().unwrap().push(request.clone());

    if let Some(expected) = required_auth {
        if !request.authorizations.iter().any(|v| v == expected) {
            respond(
                &mut stream,
                401,
                &[("WWW-Authenticate", "Basic realm=\"test\"")],
                b"unauthorized",
            );
            return;
        }
    }

    match routes.get(&request.path) {
        None => respond(&mut stream, 404, &[], b"not found"),
        Some(Route::Body(body)) => respond(&mut stream, 200, &[], body),
        Some(Route::Redirect { status, location }) => {
            respond(&mut stream, *status, &[("Location", location.as_str())], b"moved")
        }
        Some(Route::Status(status)) => respond(&mut stream, *status, &[], b"status"),
        Some(Route::Truncated { body, declared_len }) => {
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                declared_len
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(body);
            let _ = stream.flush();
        }
        Some(Route::Delayed { delay, body }) => {
            thread::sleep(*delay);
            respond(&mut stream, 200, &[], body);
        }
    }
}

fn respond(stream: &mut TcpStream, status: u16, headers: &[(&str, &str)], body: &[u8]) {
    let mut head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        status,
        reason(status),
        body.len()
    );
    for (name, value) in headers {
        head.push_str(&format!("{}: {}\r\n", name, value));
    }
    head.push_str("\r\n");
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
    let _ = stream.flush();
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Reads until the end of the request head (GET requests carry no body).
fn read_head(stream: &mut TcpStream) -> Option<String> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(_) => return None,
        };
        data.extend_from_slice(&buf[..n]);
        if data.windows(4).any(|w| w == b"\r\n\r\n") || data.len() > 64 * 1024 {
            break;
        }
    }
    if data.is_empty() {
        return None;
    }
    String::from_utf8(data).ok()
}

fn parse_request(head: &str) -> RecordedRequest {
    let mut lines = head.lines();
    let mut parts = lines.next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("").to_string();
    let target = parts.next().unwrap_or("");
    let path = target.split('?').next().unwrap_or("").to_string();

    let mut authorizations = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("authorization") {
                authorizations.push(value.trim().to_string());
            }
        }
    }

    RecordedRequest {
        method,
        path,
        authorizations,
    }
}
