//! HttpTransport - reqwest による PATCH 送信
//!
//! - body は decoded JSON（Content-Type: application/json）
//! - payload type はヒントヘッダ（既定 `X-Payload-Type`）で送る
//! - 2xx 以外はすべて TransportError（リトライ判断は Dispatcher）

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::HeaderName;
use tracing::debug;

use crate::config::HttpConfig;
use crate::domain::{TargetUri, TransportError};
use crate::ports::{DecodedPayload, Transport};

#[derive(Debug, thiserror::Error)]
pub enum HttpTransportError {
    #[error("invalid payload type header name '{0}'")]
    InvalidHeader(String),

    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

pub struct HttpTransport {
    http: Client,
    payload_type_header: HeaderName,
}

impl HttpTransport {
    pub fn new(timeout: Duration, payload_type_header: &str) -> Result<Self, HttpTransportError> {
        let payload_type_header = HeaderName::from_bytes(payload_type_header.as_bytes())
            .map_err(|_| HttpTransportError::InvalidHeader(payload_type_header.to_string()))?;
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            payload_type_header,
        })
    }

    pub fn from_config(config: &HttpConfig) -> Result<Self, HttpTransportError> {
        debug!(?config, "building http transport");
        Self::new(config.timeout(), &config.payload_type_header)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn patch(
        &self,
        target: &TargetUri,
        payload: &DecodedPayload,
    ) -> Result<String, TransportError> {
        let response = self
            .http
            .patch(target.as_str())
            .header(self.payload_type_header.clone(), payload.payload_type().as_str())
            .json(payload.value())
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        let body = response.text().await.map_err(classify)?;
        debug!(status = status.as_u16(), "patch response");

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

fn classify(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PayloadType;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Accepts one connection, answers with `status` and `body`, and returns the raw request.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/api/sak/42", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            request
        });
        (url, handle)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(split) = text.find("\r\n\r\n") {
                let content_length = text[..split]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= split + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8(buf).unwrap()
    }

    fn payload() -> DecodedPayload {
        DecodedPayload::new(
            PayloadType::new("egrunnerverv.sak.v1").unwrap(),
            json!({"status": "open"}),
        )
    }

    fn transport() -> HttpTransport {
        HttpTransport::new(Duration::from_secs(5), "X-Payload-Type").unwrap()
    }

    #[tokio::test]
    async fn sends_patch_with_json_body_and_type_header() {
        let (url, server) = serve_once("200 OK", "accepted").await;

        let response = transport()
            .patch(&TargetUri::parse(url).unwrap(), &payload())
            .await
            .unwrap();
        let request = server.await.unwrap().to_ascii_lowercase();

        assert_eq!(response, "accepted");
        assert!(request.starts_with("patch /api/sak/42 http/1.1"));
        assert!(request.contains("content-type: application/json"));
        assert!(request.contains("x-payload-type: egrunnerverv.sak.v1"));
        assert!(request.ends_with(r#"{"status":"open"}"#));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (url, _server) = serve_once("503 Service Unavailable", "try later").await;

        let err = transport()
            .patch(&TargetUri::parse(url).unwrap(), &payload())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            TransportError::Status {
                status: 503,
                body: "try later".into()
            }
        );
    }

    #[tokio::test]
    async fn refused_connection_is_a_connect_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        drop(listener);

        let err = transport()
            .patch(&TargetUri::parse(url).unwrap(), &payload())
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Connect(_)), "{err:?}");
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        let _server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(socket);
        });
        let transport = HttpTransport::new(Duration::from_millis(200), "X-Payload-Type").unwrap();

        let err = transport
            .patch(&TargetUri::parse(url).unwrap(), &payload())
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Timeout(_)), "{err:?}");
    }

    #[test]
    fn rejects_invalid_header_names() {
        assert!(matches!(
            HttpTransport::new(Duration::from_secs(1), "bad header"),
            Err(HttpTransportError::InvalidHeader(_))
        ));
    }
}
