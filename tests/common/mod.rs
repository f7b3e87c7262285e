//! Shared utilities for integration tests: a programmable mock CDM node.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::Router;
use tokio::net::TcpListener;

use cdm_bootstrap::bootstrap::BootstrapClient;
use cdm_bootstrap::client::{CdmClient, Credentials};
use cdm_bootstrap::config::{AdminUser, ClusterConfig, ClusterNode, NodeConfig};

/// Poll interval used by tests; keeps real-time tests short.
pub const TEST_INTERVAL: Duration = Duration::from_millis(50);

/// A request as seen by the mock node.
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: String,
}

/// Every request the mock node received, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct RequestLog(Arc<Mutex<Vec<MockRequest>>>);

impl RequestLog {
    pub fn all(&self) -> Vec<MockRequest> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    fn push(&self, request: MockRequest) {
        self.0.lock().unwrap().push(request);
    }
}

/// Start a programmable mock node on an ephemeral port.
///
/// `f` maps each request to `(status, json body)`.
pub async fn start_mock_node<F>(f: F) -> (SocketAddr, RequestLog)
where
    F: Fn(&MockRequest) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    serve(listener, f)
}

/// Start a mock node on a specific address (used to bring a node "up" late).
pub async fn start_mock_node_at<F>(addr: SocketAddr, f: F) -> RequestLog
where
    F: Fn(&MockRequest) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind(addr).await.unwrap();
    serve(listener, f).1
}

/// Reserve a local port with nothing listening on it.
pub fn unused_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

fn serve<F>(listener: TcpListener, f: F) -> (SocketAddr, RequestLog)
where
    F: Fn(&MockRequest) -> (u16, String) + Send + Sync + 'static,
{
    let addr = listener.local_addr().unwrap();
    let log = RequestLog::default();
    let f = Arc::new(f);

    let handler_log = log.clone();
    let app = Router::new().fallback(
        move |method: Method, uri: Uri, headers: HeaderMap, body: String| {
            let f = f.clone();
            let log = handler_log.clone();
            async move {
                let request = MockRequest {
                    method,
                    path: uri.path().to_string(),
                    query: uri.query().map(str::to_string),
                    headers,
                    body,
                };
                let (status, body) = f(&request);
                log.push(request);
                (
                    StatusCode::from_u16(status).unwrap(),
                    [(header::CONTENT_TYPE, "application/json")],
                    body,
                )
            }
        },
    );

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, log)
}

/// Plain-HTTP node settings for `addr`.
pub fn node_config(addr: SocketAddr) -> NodeConfig {
    NodeConfig {
        address: addr.to_string(),
        scheme: "http".into(),
        allow_insecure_tls: false,
        request_timeout_secs: 2,
    }
}

/// Bootstrap client for a mock node with short poll intervals.
pub fn bootstrap_client(addr: SocketAddr, credentials: Option<Credentials>) -> BootstrapClient {
    let client = CdmClient::new(&node_config(addr), credentials).unwrap();
    BootstrapClient::new(client).with_intervals(TEST_INTERVAL, TEST_INTERVAL)
}

/// A minimal valid single-node cluster.
pub fn cluster() -> ClusterConfig {
    ClusterConfig {
        name: "test-cluster".into(),
        admin: AdminUser {
            id: "admin".into(),
            email: "ops@example.com".into(),
            password: "correct-horse".into(),
        },
        dns_name_servers: vec!["10.0.0.2".into()],
        dns_search_domains: vec![],
        ntp_servers: vec!["pool.ntp.org".into()],
        enable_encryption: true,
        management_gateway: Some("10.0.0.1".into()),
        management_subnet_mask: Some("255.255.255.0".into()),
        nodes: [(
            "node-1".to_string(),
            ClusterNode {
                management_ip: "10.0.0.11".into(),
            },
        )]
        .into_iter()
        .collect(),
        cloud_storage: None,
    }
}
