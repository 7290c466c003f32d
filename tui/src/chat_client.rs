//! HTTP transport to the Linux Grandfa backend.
//!
//! Exactly one request shape exists: `POST {base}/api/chat/` with a JSON
//! body. Every failure mode — unreachable host, non-2xx status, malformed
//! body — collapses into [`OFFLINE_REPLY`], so the renderer never branches
//! on errors. A health probe (`GET {base}/api/chat/health`) exists as a
//! supplementary diagnostic.
//!
//! The background worker processes ops strictly sequentially; together with
//! the app's busy flag this enforces the single-flight constraint.

use nesti_protocol::ChatReply;
use nesti_protocol::ChatRequest;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::app_event::AppEvent;
use crate::app_event_sender::AppEventSender;
use crate::version::NESTI_VERSION;

/// Fixed reply shown whenever the backend cannot be reached or errors out.
pub const OFFLINE_REPLY: &str = "Aw shucks! This old penguin's havin' trouble connectin' to the \
                                 server. Make sure the backend is runnin' and try again, would ya?";

const CHAT_PATH: &str = "/api/chat/";
const HEALTH_PATH: &str = "/api/chat/health";

#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(format!("nesti/{NESTI_VERSION}"))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send one chat request and return the reply body to display.
    ///
    /// Never fails: transport errors become [`OFFLINE_REPLY`].
    pub async fn send_chat(&self, request: ChatRequest) -> String {
        match self.try_send_chat(&request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!("chat request failed: {err:#}");
                OFFLINE_REPLY.to_string()
            }
        }
    }

    async fn try_send_chat(&self, request: &ChatRequest) -> anyhow::Result<String> {
        let reply = self
            .http
            .post(self.endpoint(CHAT_PATH))
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<ChatReply>()
            .await?;
        Ok(reply.response)
    }

    /// Probe the health endpoint. Any 2xx is healthy; every error, including
    /// transport-level ones, reads as unreachable.
    pub async fn check_health(&self) -> bool {
        match self.http.get(self.endpoint(HEALTH_PATH)).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                tracing::debug!("health probe failed: {err}");
                false
            }
        }
    }
}

/// Work items for the chat worker.
#[derive(Debug, PartialEq)]
pub(crate) enum ChatOp {
    SendChat { message: String, images: Vec<String> },
    CheckHealth,
}

/// Run the transport on its own task, bridging `ChatOp`s to `AppEvent`s.
///
/// Ops are handled one at a time in arrival order, so a health probe queued
/// behind a chat request cannot reorder around it.
pub(crate) fn spawn_chat_worker(
    client: ChatClient,
    mut op_rx: UnboundedReceiver<ChatOp>,
    event_tx: AppEventSender,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(op) = op_rx.recv().await {
            match op {
                ChatOp::SendChat { message, images } => {
                    let reply = client.send_chat(ChatRequest::new(message, images)).await;
                    event_tx.send(AppEvent::AssistantReply(reply));
                }
                ChatOp::CheckHealth => {
                    let healthy = client.check_health().await;
                    event_tx.send(AppEvent::HealthResult(healthy));
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::io::AsyncReadExt;
    use tokio::io::AsyncWriteExt;

    /// Serve exactly one canned HTTP response on an ephemeral port and
    /// return the base URL plus the captured request bytes.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::sync::oneshot::Receiver<Vec<u8>>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let (request_tx, request_rx) = tokio::sync::oneshot::channel();

        tokio::spawn(async move {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let request = read_http_request(&mut socket).await;

            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: \
                 {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
            let _ = request_tx.send(request);
        });

        (format!("http://{addr}"), request_rx)
    }

    /// Read headers plus a content-length body; enough HTTP for these tests.
    async fn read_http_request(socket: &mut tokio::net::TcpStream) -> Vec<u8> {
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let Ok(n) = socket.read(&mut buf).await else {
                break;
            };
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            if let Some(headers_end) = find_headers_end(&request) {
                let headers = String::from_utf8_lossy(&request[..headers_end]).to_lowercase();
                let content_length = headers
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if request.len() >= headers_end + content_length {
                    break;
                }
            }
        }
        request
    }

    fn find_headers_end(request: &[u8]) -> Option<usize> {
        request
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .map(|pos| pos + 4)
    }

    #[tokio::test]
    async fn successful_reply_is_returned_verbatim() {
        let (base_url, request_rx) =
            serve_once("200 OK", r#"{"response":"howdy","role":"assistant"}"#).await;
        let client = ChatClient::new(&base_url).expect("client");

        let reply = client
            .send_chat(ChatRequest::new("hello", Vec::new()))
            .await;
        assert_eq!(reply, "howdy");

        let request = request_rx.await.expect("captured request");
        let request = String::from_utf8_lossy(&request);
        assert!(request.starts_with("POST /api/chat/ HTTP/1.1"));
        assert!(request.contains(r#""images":null"#));
    }

    #[tokio::test]
    async fn server_error_yields_the_fallback_reply() {
        let (base_url, _request_rx) =
            serve_once("500 Internal Server Error", r#"{"detail":"boom"}"#).await;
        let client = ChatClient::new(&base_url).expect("client");

        let reply = client.send_chat(ChatRequest::new("hi", Vec::new())).await;
        assert_eq!(reply, OFFLINE_REPLY);
    }

    #[tokio::test]
    async fn malformed_body_yields_the_fallback_reply() {
        let (base_url, _request_rx) = serve_once("200 OK", "not json at all").await;
        let client = ChatClient::new(&base_url).expect("client");

        let reply = client.send_chat(ChatRequest::new("hi", Vec::new())).await;
        assert_eq!(reply, OFFLINE_REPLY);
    }

    #[tokio::test]
    async fn unreachable_host_yields_the_fallback_reply() {
        // Bind then drop a listener so the port is very likely closed.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);

        let client = ChatClient::new(&format!("http://{addr}")).expect("client");
        let reply = client.send_chat(ChatRequest::new("hi", Vec::new())).await;
        assert_eq!(reply, OFFLINE_REPLY);
    }

    #[tokio::test]
    async fn attachment_data_uris_appear_verbatim_in_the_request() {
        let (base_url, request_rx) =
            serve_once("200 OK", r#"{"response":"nice shot","role":"assistant"}"#).await;
        let client = ChatClient::new(&base_url).expect("client");

        let uri = nesti_protocol::ImageFormat::Png.to_data_uri(b"\x89PNG\r\n\x1a\npixels");
        let reply = client
            .send_chat(ChatRequest::new("what's this?", vec![uri.clone()]))
            .await;
        assert_eq!(reply, "nice shot");

        let request = request_rx.await.expect("captured request");
        assert!(String::from_utf8_lossy(&request).contains(&uri));
    }

    #[tokio::test]
    async fn health_probe_maps_status_to_reachability() {
        let (base_url, _rx) = serve_once("200 OK", r#"{"status":"healthy"}"#).await;
        let client = ChatClient::new(&base_url).expect("client");
        assert!(client.check_health().await);

        let (base_url, _rx) = serve_once("503 Service Unavailable", "").await;
        let client = ChatClient::new(&base_url).expect("client");
        assert!(!client.check_health().await);
    }

    #[tokio::test]
    async fn health_probe_swallows_transport_errors() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);

        let client = ChatClient::new(&format!("http://{addr}")).expect("client");
        assert!(!client.check_health().await);
    }
}
