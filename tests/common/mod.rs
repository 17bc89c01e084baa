//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Request, Response, StatusCode};
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceExt;

use booking_gateway::config::GatewayConfig;
use booking_gateway::{GatewayServer, ResponseEnvelope};

/// What the mock upstream saw.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// What the mock upstream answers.
#[derive(Debug, Clone)]
pub struct MockReply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    pub delay: Option<Duration>,
}

impl MockReply {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn raw(status: u16, content_type: &'static str, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// A running mock upstream.
#[derive(Clone)]
pub struct MockUpstream {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockUpstream {
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.recorded
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("upstream received no request")
    }
}

/// Start a programmable upstream on an ephemeral port.
pub async fn start_programmable_upstream<F>(reply: F) -> MockUpstream
where
    F: Fn(&RecordedRequest) -> MockReply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let recorded = Arc::new(Mutex::new(Vec::new()));
    let reply = Arc::new(reply);

    let upstream = MockUpstream {
        addr,
        hits: hits.clone(),
        recorded: recorded.clone(),
    };

    let app = Router::new().fallback(move |request: Request<Body>| {
        let hits = hits.clone();
        let recorded = recorded.clone();
        let reply = reply.clone();
        async move {
            let (parts, body) = request.into_parts();
            let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
            let seen = RecordedRequest {
                method: parts.method.to_string(),
                path_and_query: parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str().to_string())
                    .unwrap_or_default(),
                headers: parts.headers,
                body,
            };

            hits.fetch_add(1, Ordering::SeqCst);
            let answer = (*reply)(&seen);
            recorded.lock().unwrap().push(seen);

            if let Some(delay) = answer.delay {
                tokio::time::sleep(delay).await;
            }
            Response::builder()
                .status(answer.status)
                .header(header::CONTENT_TYPE, answer.content_type)
                .body(Body::from(answer.body))
                .unwrap()
        }
    });

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    upstream
}

/// Address nothing listens on.
pub fn closed_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Default config pointed at the given upstream base URL.
pub fn gateway_config(base_url: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.upstream.base_url = base_url.to_string();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config
}

/// Response as seen by a gateway caller.
#[derive(Debug)]
pub struct GatewayReply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub envelope: ResponseEnvelope,
}

/// Drive one request through the gateway router in-process.
pub async fn call(server: &GatewayServer, request: Request<Body>) -> GatewayReply {
    let response = server.router().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let envelope = serde_json::from_slice(&body)
        .unwrap_or_else(|e| panic!("gateway body is not an envelope ({e}): {body:?}"));

    GatewayReply {
        status,
        headers,
        envelope,
    }
}

/// A GET request carrying a bearer token.
pub fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}
