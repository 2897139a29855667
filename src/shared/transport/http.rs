use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::{
    DeviceTransport, FanSpeedRequest, ManualWateringRequest, Subsystem, SubsystemRequest,
    TransportError, REQUEST_ID_HEADER,
};
use crate::domain::Configuration;
use crate::error::ErrorResponse;
use crate::id_generator::{IdGenerator, RandomIdGenerator};

/// Talks to a controller over its HTTP API
pub struct HttpDeviceTransport {
    client: Client,
    base_url: String,
    ids: Arc<dyn IdGenerator>,
}

impl HttpDeviceTransport {
    /// `base_url` is the controller root, e.g. `http://growit.local`.
    /// Every request is cut off after `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            ids: Arc::new(RandomIdGenerator::new()),
        })
    }

    /// Replace the request ID source
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request tagged with a fresh request ID and sort out the status
    async fn send(&self, request: RequestBuilder, route: &str) -> Result<Response, TransportError> {
        let request_id = self.ids.request_id();
        debug!(request_id = %request_id, route, "Sending device request");

        let response = request
            .header(REQUEST_ID_HEADER, &request_id)
            .send()
            .await
            .map_err(|e| {
                warn!(request_id = %request_id, route, error = %e, "Device request failed");
                TransportError::Network(e.to_string())
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(mut error) => {
                if error.request_id.is_empty() {
                    error.request_id = request_id.clone();
                }
                warn!(
                    request_id = %request_id,
                    route,
                    status = status.as_u16(),
                    error_code = %error.error,
                    "Device rejected request"
                );
                Err(TransportError::Rejected(error))
            }
            Err(_) => {
                warn!(
                    request_id = %request_id,
                    route,
                    status = status.as_u16(),
                    "Device returned an error without a payload"
                );
                Err(TransportError::Network(format!("HTTP {}: {}", status, body)))
            }
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

#[async_trait]
impl DeviceTransport for HttpDeviceTransport {
    async fn get_config(&self) -> Result<Configuration, TransportError> {
        let request = self.client.get(self.url("/api/config"));
        let response = self.send(request, "GET /api/config").await?;
        Self::decode(response).await
    }

    async fn post_config(&self, config: &Configuration) -> Result<(), TransportError> {
        let request = self.client.post(self.url("/api/config")).json(config);
        self.send(request, "POST /api/config").await?;
        Ok(())
    }

    async fn reset_config(&self) -> Result<Configuration, TransportError> {
        let request = self.client.post(self.url("/api/config/reset"));
        let response = self.send(request, "POST /api/config/reset").await?;
        Self::decode(response).await
    }

    async fn set_subsystem(
        &self,
        subsystem: Subsystem,
        enabled: bool,
    ) -> Result<(), TransportError> {
        let path = format!("/api/control/{}", subsystem);
        let request = self
            .client
            .post(self.url(&path))
            .json(&SubsystemRequest { enabled });
        self.send(request, "POST /api/control").await?;
        Ok(())
    }

    async fn manual_watering(&self, amount_ml: u32) -> Result<(), TransportError> {
        let request = self
            .client
            .post(self.url("/api/irrigation/manual"))
            .json(&ManualWateringRequest { amount_ml });
        self.send(request, "POST /api/irrigation/manual").await?;
        Ok(())
    }

    async fn set_fan_speed(&self, rpm: u32) -> Result<(), TransportError> {
        let request = self
            .client
            .post(self.url("/api/ventilation/speed"))
            .json(&FanSpeedRequest { rpm });
        self.send(request, "POST /api/ventilation/speed").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id_generator::FixedIdGenerator;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    const REQUEST_ID: &str = "550e8400-e29b-41d4-a716-446655440000";

    /// Serve one canned HTTP response and hand back the request head
    async fn serve_once(status_line: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&head).to_string()
        });

        (base_url, handle)
    }

    fn transport(base_url: &str) -> HttpDeviceTransport {
        HttpDeviceTransport::new(base_url, Duration::from_secs(5))
            .unwrap()
            .with_id_generator(Arc::new(FixedIdGenerator::single(REQUEST_ID)))
    }

    #[tokio::test]
    async fn test_get_config_sends_request_id() {
        let body = serde_json::to_string(&Configuration::factory()).unwrap();
        let (base_url, server) = serve_once("200 OK", &body).await;

        let config = transport(&base_url).get_config().await.unwrap();
        let head = server.await.unwrap().to_lowercase();

        assert_eq!(config, Configuration::factory());
        assert!(head.starts_with("get /api/config "));
        assert!(head.contains(&format!("x-request-id: {}", REQUEST_ID)));
    }

    #[tokio::test]
    async fn test_error_body_becomes_rejected() {
        let body = r#"{"error":"INVALID_VALUE","message":"Pump pin in use"}"#;
        let (base_url, _server) = serve_once("400 Bad Request", body).await;

        let result = transport(&base_url).reset_config().await;

        match result {
            Err(TransportError::Rejected(error)) => {
                assert_eq!(error.error, "INVALID_VALUE");
                assert_eq!(error.request_id, REQUEST_ID);
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_without_body_is_network() {
        let (base_url, _server) = serve_once("503 Service Unavailable", "busy").await;

        let result = transport(&base_url).get_config().await;

        assert!(matches!(result, Err(TransportError::Network(_))));
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode() {
        let (base_url, _server) = serve_once("200 OK", "{\"system\": 12").await;

        let result = transport(&base_url).get_config().await;

        assert!(matches!(result, Err(TransportError::Decode(_))));
    }

    #[tokio::test]
    async fn test_unreachable_device_is_network() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let result = transport(&base_url).get_config().await;

        assert!(matches!(result, Err(TransportError::Network(_))));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let transport =
            HttpDeviceTransport::new("http://growit.local/", Duration::from_secs(1)).unwrap();
        assert_eq!(transport.base_url(), "http://growit.local");
        assert_eq!(transport.url("/api/config"), "http://growit.local/api/config");
    }
}
