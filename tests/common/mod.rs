//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use path_proxy::{HttpServer, ProxyConfig, Shutdown};
use tokio::net::TcpListener;

/// Size of the body served by `/large`.
pub const LARGE_BODY_LEN: usize = 2 * 1024 * 1024;

/// A request as the mock upstream saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Handle to a running mock upstream.
#[derive(Clone)]
pub struct Upstream {
    pub addr: SocketAddr,
    pub requests: Arc<Mutex<Vec<Recorded>>>,
    /// `/hang` handlers dropped before they finished.
    pub abandoned: Arc<AtomicUsize>,
}

/// Counts its own drop unless disarmed.
struct AbandonGuard {
    counter: Arc<AtomicUsize>,
    armed: bool,
}

impl Drop for AbandonGuard {
    fn drop(&mut self) {
        if self.armed {
            self.counter.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl Upstream {
    /// Absolute URL of `path` on this upstream.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn abandoned(&self) -> usize {
        self.abandoned.load(Ordering::SeqCst)
    }
}

/// Start a mock upstream on an ephemeral port.
///
/// Routes:
/// - `/echo`: 200, restrictive framing headers, cookies, fixed body
/// - `/redirect`: 302 to `/echo?from=redirect`
/// - `/temporary`: 307 to `/echo`
/// - `/bounce?to=<encoded-url>`: 307 to the decoded `to` URL
/// - `/teapot`: 418
/// - `/slow`: 200 after three seconds
/// - `/large`: 200 with a `LARGE_BODY_LEN` byte body
/// - `/hang`: never answers in time; counts in `abandoned` when dropped
pub async fn start_upstream() -> Upstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let upstream = Upstream {
        addr: listener.local_addr().unwrap(),
        requests: Arc::new(Mutex::new(Vec::new())),
        abandoned: Arc::new(AtomicUsize::new(0)),
    };

    let state = upstream.clone();
    let app = Router::new().fallback(move |request: Request<Body>| {
        let state = state.clone();
        async move { upstream_handler(state, request).await }
    });

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    upstream
}

fn redirect_to(status: StatusCode, location: &str) -> Response {
    Response::builder()
        .status(status)
        .header("location", location)
        .body(Body::empty())
        .unwrap()
}

async fn upstream_handler(upstream: Upstream, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_default();

    upstream.requests.lock().unwrap().push(Recorded {
        method: parts.method,
        path_and_query,
        headers: parts.headers,
        body,
    });

    match parts.uri.path() {
        "/echo" => Response::builder()
            .status(StatusCode::OK)
            .header("content-type", "text/plain")
            .header("content-security-policy", "default-src 'self'")
            .header("x-frame-options", "DENY")
            .header("set-cookie", "session=abc; Domain=upstream.test; Path=/")
            .header("cache-control", "max-age=60")
            .body(Body::from("upstream body"))
            .unwrap(),
        "/redirect" => redirect_to(StatusCode::FOUND, "/echo?from=redirect"),
        "/temporary" => redirect_to(StatusCode::TEMPORARY_REDIRECT, "/echo"),
        "/bounce" => {
            let to = parts
                .uri
                .query()
                .and_then(|q| q.strip_prefix("to="))
                .map(|to| urlencoding::decode(to).unwrap().into_owned())
                .unwrap_or_default();
            redirect_to(StatusCode::TEMPORARY_REDIRECT, &to)
        }
        "/hang" => {
            let mut guard = AbandonGuard {
                counter: upstream.abandoned.clone(),
                armed: true,
            };
            tokio::time::sleep(Duration::from_secs(10)).await;
            guard.armed = false;
            (StatusCode::OK, "too late").into_response()
        }
        "/teapot" => (StatusCode::IM_A_TEAPOT, "short and stout").into_response(),
        "/slow" => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            (StatusCode::OK, "finally").into_response()
        }
        "/large" => (StatusCode::OK, vec![b'x'; LARGE_BODY_LEN]).into_response(),
        _ => (StatusCode::NOT_FOUND, "no such upstream route").into_response(),
    }
}

/// Start the proxy on an ephemeral port. Keep the `Shutdown` alive for the
/// duration of the test.
pub async fn start_proxy(mut config: ProxyConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    tokio::spawn(server.run(listener, shutdown.subscribe()));

    (addr, shutdown)
}

/// Client that talks to the proxy directly and never follows redirects itself.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// Proxy URL for `target` in prefix mode with the default marker.
pub fn prefixed(proxy: SocketAddr, target: &str) -> String {
    format!("http://{}/proxx/{}", proxy, urlencoding::encode(target))
}

/// Proxy URL for `target` in bare mode.
pub fn bare(proxy: SocketAddr, target: &str) -> String {
    format!("http://{}/{}", proxy, urlencoding::encode(target))
}
