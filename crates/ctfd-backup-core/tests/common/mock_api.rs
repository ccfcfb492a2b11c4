//! Minimal HTTP/1.1 server standing in for a CTFd instance in integration tests.
//!
//! Serves canned responses per request target (path plus query string),
//! counts hits per target and tracks how many requests are in flight at once.
//! Unknown targets get a 404 JSON body. Every response closes the connection.

use serde_json::{json, Value};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
struct Route {
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
    delay: Option<Duration>,
}

#[derive(Default)]
struct State {
    routes: Mutex<HashMap<String, Route>>,
    hits: Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

pub struct MockApi {
    url: String,
    state: Arc<State>,
}

impl MockApi {
    /// Starts the server on an ephemeral port. It runs until the process exits.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(State::default());
        let shared = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let state = Arc::clone(&shared);
                thread::spawn(move || handle(stream, &state));
            }
        });
        Self {
            url: format!("http://127.0.0.1:{}", port),
            state,
        }
    }

    /// Base URL without a trailing slash.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn route(&self, target: &str, route: Route) {
        self.state
            .routes
            .lock()
            .unwrap()
            .insert(target.to_string(), route);
    }

    /// 200 with a CTFd envelope `{"success": true, "data": data}`.
    pub fn json(&self, target: &str, data: Value) {
        self.json_delayed(target, data, None);
    }

    pub fn json_delayed(&self, target: &str, data: Value, delay: Option<Duration>) {
        let body = json!({"success": true, "data": data}).to_string().into_bytes();
        self.route(
            target,
            Route {
                status: 200,
                content_type: "application/json",
                body,
                delay,
            },
        );
    }

    /// An error status with a JSON body.
    pub fn status(&self, target: &str, status: u16) {
        let body = json!({"success": false, "message": "error"}).to_string().into_bytes();
        self.route(
            target,
            Route {
                status,
                content_type: "application/json",
                body,
                delay: None,
            },
        );
    }

    pub fn raw(&self, target: &str, status: u16, content_type: &'static str, body: Vec<u8>) {
        self.raw_delayed(target, status, content_type, body, None);
    }

    pub fn raw_delayed(
        &self,
        target: &str,
        status: u16,
        content_type: &'static str,
        body: Vec<u8>,
        delay: Option<Duration>,
    ) {
        self.route(
            target,
            Route {
                status,
                content_type,
                body,
                delay,
            },
        );
    }

    /// Number of requests received for `target` (path plus query).
    pub fn hits(&self, target: &str) -> usize {
        self.state
            .hits
            .lock()
            .unwrap()
            .get(target)
            .copied()
            .unwrap_or(0)
    }

    /// Highest number of requests that were being served at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.state.peak.load(Ordering::SeqCst)
    }
}

fn handle(mut stream: TcpStream, state: &State) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let Some(target) = read_target(&mut stream) else {
        return;
    };

    let now = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    state.peak.fetch_max(now, Ordering::SeqCst);
    *state.hits.lock().unwrap().entry(target.clone()).or_insert(0) += 1;

    let route = state.routes.lock().unwrap().get(&target).cloned();
    let route = route.unwrap_or_else(|| Route {
        status: 404,
        content_type: "application/json",
        body: br#"{"message": "not found"}"#.to_vec(),
        delay: None,
    });
    if let Some(delay) = route.delay {
        thread::sleep(delay);
    }
    // Released before replying: the client may send its next request as soon
    // as this response arrives.
    state.in_flight.fetch_sub(1, Ordering::SeqCst);

    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        route.status,
        reason(route.status),
        route.content_type,
        route.body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&route.body);
    let _ = stream.flush();
}

/// Reads the request head and returns the request target of a GET.
fn read_target(stream: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let head = std::str::from_utf8(&buf).ok()?;
    let mut parts = head.lines().next()?.split_whitespace();
    let method = parts.next()?;
    if !method.eq_ignore_ascii_case("GET") {
        return None;
    }
    parts.next().map(str::to_string)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
