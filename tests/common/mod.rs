//! Shared utilities for integration testing.

#![allow(dead_code)]

use metrics::{
    Counter, CounterFn, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
};
use reqwest::StatusCode;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use xregion_http::http::{transport_fn, RawResponse, TransportError, TransportRequest};
use xregion_http::{ClientConfig, HttpService, Transport};

pub const DOMAIN: &str = "samples";
pub const ACTIVE_ORIGIN: &str = "https://a1.example.com";
pub const PASSIVE_ORIGIN: &str = "https://p1.example.com";
pub const FLAG_PATH: &str = "/api/feature-flags/crossRegion.clusterToRegionalDomainUrl";

/// Every request a recording transport has seen, in order.
pub type Recorded = Arc<Mutex<Vec<TransportRequest>>>;

/// An in-process transport that records requests and answers via `route`.
/// Domain lookups are delayed by `domain_delay` to let concurrent callers overlap.
pub fn recording_transport<F>(domain_delay: Duration, route: F) -> (Arc<dyn Transport>, Recorded)
where
    F: Fn(&TransportRequest) -> Result<RawResponse, TransportError> + Send + Sync + 'static,
{
    let recorded: Recorded = Arc::new(Mutex::new(Vec::new()));
    let route = Arc::new(route);
    let log = recorded.clone();

    let transport = transport_fn(move |request: TransportRequest| {
        log.lock().unwrap().push(request.clone());
        let route = route.clone();
        async move {
            if request.url.starts_with("/api/domains/") && !domain_delay.is_zero() {
                tokio::time::sleep(domain_delay).await;
            }
            route(&request)
        }
    });

    (transport, recorded)
}

/// Topology of the `samples` domain: a1 is active, p1 passive, each with a
/// regional origin flag. Any other URL answers 200 with `{"url": <url>}`.
pub fn topology(request: &TransportRequest) -> Result<RawResponse, TransportError> {
    let body = match request.url.as_str() {
        "/api/domains/samples" => json!({ "activeCluster": "a1", "passiveCluster": "p1" }),
        url if url == format!("{FLAG_PATH}?cluster=a1") => json!({ "value": ACTIVE_ORIGIN }),
        url if url == format!("{FLAG_PATH}?cluster=p1") => json!({ "value": PASSIVE_ORIGIN }),
        url if url.starts_with("/api/domains/") => {
            return Ok(RawResponse::json(
                StatusCode::NOT_FOUND,
                &json!({ "error": "domain not found" }),
            ))
        }
        url => json!({ "url": url }),
    };
    Ok(RawResponse::json(StatusCode::OK, &body))
}

pub fn service(transport: Arc<dyn Transport>) -> HttpService {
    HttpService::new(&ClientConfig::default(), transport)
}

pub fn urls(recorded: &Recorded) -> Vec<String> {
    recorded.lock().unwrap().iter().map(|r| r.url.clone()).collect()
}

pub fn count_prefix(recorded: &Recorded, prefix: &str) -> usize {
    recorded
        .lock()
        .unwrap()
        .iter()
        .filter(|r| r.url.starts_with(prefix))
        .count()
}

/// Captures counter increments as `name{label=value,..}` strings.
///
/// Install with `metrics::set_default_local_recorder`; tokio's default test
/// runtime polls on a single thread, so the local recorder sees every update.
#[derive(Clone, Default)]
pub struct CounterLog {
    increments: Arc<Mutex<Vec<String>>>,
}

impl CounterLog {
    pub fn contains(&self, counter: &str) -> bool {
        self.increments.lock().unwrap().iter().any(|c| c == counter)
    }

    pub fn matching(&self, prefix: &str) -> Vec<String> {
        self.increments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .cloned()
            .collect()
    }
}

struct LoggedCounter {
    key: String,
    log: Arc<Mutex<Vec<String>>>,
}

impl CounterFn for LoggedCounter {
    fn increment(&self, _value: u64) {
        self.log.lock().unwrap().push(self.key.clone());
    }

    fn absolute(&self, _value: u64) {}
}

impl Recorder for CounterLog {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        let labels: Vec<String> = key
            .labels()
            .map(|label| format!("{}={}", label.key(), label.value()))
            .collect();
        Counter::from_arc(Arc::new(LoggedCounter {
            key: format!("{}{{{}}}", key.name(), labels.join(",")),
            log: self.increments.clone(),
        }))
    }

    fn register_gauge(&self, _key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::noop()
    }

    fn register_histogram(&self, _key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::noop()
    }
}

/// Canned response from a mock backend.
pub struct MockResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl MockResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    fn to_http(&self) -> String {
        let reason = StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown");
        let mut head = format!(
            "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
            self.status,
            reason,
            self.body.len()
        );
        for (name, value) in &self.headers {
            head.push_str(&format!("{name}: {value}\r\n"));
        }
        format!("{head}\r\n{}", self.body)
    }
}

/// Start a programmable mock backend on an ephemeral port.
///
/// `handler` receives the raw request (head and body) and returns the response.
pub async fn start_backend<F>(handler: F) -> SocketAddr
where
    F: Fn(&str) -> MockResponse + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        let request = read_request(&mut socket).await;
                        let response = handler(&request);
                        let _ = socket.write_all(response.to_http().as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let content_length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

/// An address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
