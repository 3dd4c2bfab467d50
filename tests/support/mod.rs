#![allow(dead_code)]

use httpmock::MockServer;
use serde_json::{Value, json};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use donation_pay::{AppState, Config, DonationApiClient, Environment};

pub const TOKEN: &str = "test-token";

/// Port 1 is never listening; requests fail before any response.
pub const UNREACHABLE_BASE_URL: &str = "http://127.0.0.1:1";

pub fn client(server: &MockServer) -> DonationApiClient {
    client_at(&server.base_url())
}

pub fn client_at(base_url: &str) -> DonationApiClient {
    DonationApiClient::new(base_url, Some(TOKEN.to_string()), Duration::from_secs(5))
        .expect("build client")
}

pub fn anonymous_client(base_url: &str) -> DonationApiClient {
    DonationApiClient::new(base_url, None, Duration::from_secs(5)).expect("build client")
}

pub fn unreachable_client() -> DonationApiClient {
    DonationApiClient::new(UNREACHABLE_BASE_URL, Some(TOKEN.to_string()), Duration::from_secs(5))
        .expect("build client")
}

pub fn config(base_url: &str, token: Option<&str>) -> Config {
    Config {
        environment: Environment::Development,
        api_base_url: base_url.trim_end_matches('/').to_string(),
        api_token: token.map(|t| t.to_string()),
        request_timeout: Duration::from_secs(5),
        proxy_host: "127.0.0.1".to_string(),
        proxy_port: 0,
    }
}

pub fn proxy_state(base_url: &str, token: Option<&str>) -> AppState {
    AppState::new(config(base_url, token)).expect("build state")
}

pub fn intent_json(id: &str, amount: f64, currency: &str, status: &str) -> Value {
    json!({
        "paymentIntentId": id,
        "amount": amount,
        "currency": currency,
        "status": status,
        "expiresAt": "2030-01-01T00:15:00Z"
    })
}

pub fn donation_json(id: i64, amount: f64, status: &str) -> Value {
    json!({
        "id": id,
        "donor": {"id": 11, "name": "Test Donor"},
        "amount": amount,
        "donationText": "keep going",
        "donationTime": "2026-10-01T08:30:00Z",
        "status": status
    })
}

/// Accepts one connection, answers it with `status` and a JSON `body`, and
/// yields the raw request head (request line plus headers).
pub async fn capture_one_request(status: &'static str, body: Value) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let head = loop {
            let n = socket.read(&mut chunk).await.expect("read request");
            assert!(n > 0, "connection closed before request head");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_string();
                let body_len = header_values(&head, "content-length")
                    .first()
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(0);
                while buf.len() < end + 4 + body_len {
                    let n = socket.read(&mut chunk).await.expect("read body");
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                }
                break head;
            }
        };

        let payload = body.to_string();
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{payload}",
            payload.len()
        );
        socket.write_all(response.as_bytes()).await.expect("write response");
        let _ = socket.shutdown().await;
        head
    });

    (format!("http://{addr}"), handle)
}

/// Values of every occurrence of header `name` (case-insensitive) in a raw head.
pub fn header_values(head: &str, name: &str) -> Vec<String> {
    head.lines()
        .skip(1)
        .filter_map(|line| line.split_once(':'))
        .filter(|(k, _)| k.trim().eq_ignore_ascii_case(name))
        .map(|(_, v)| v.trim().to_string())
        .collect()
}
