//! `reqwest`-backed implementation of the `maxbot-core` transport port.

use async_trait::async_trait;

use maxbot_core::transport::{Method, Transport, TransportRequest, TransportResponse};
use maxbot_core::{Error, Result};

/// Transport built on a shared [`reqwest::Client`].
///
/// The inner client owns the connection pool, so sequential calls through
/// one `ReqwestTransport` reuse connections. `reqwest::Client` is documented
/// as safe to share across tasks/threads, so this adapter may also be used
/// concurrently. No default timeout is set on the pool; per-request
/// timeouts come from the executor.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Transport(format!("http client build failed: {e}")))?;
        Ok(Self { http })
    }

    /// Wrap an already configured client (proxy, extra headers, ...).
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let mut builder = self
            .http
            .request(method_of(request.method), &request.url)
            .query(&request.query);

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Transport(format!("request timed out: {e}"))
            } else {
                Error::Transport(format!("request failed: {e}"))
            }
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("failed to read response body: {e}")))?;

        Ok(TransportResponse {
            status,
            content_type,
            body,
        })
    }
}

fn method_of(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Patch => reqwest::Method::PATCH,
    }
}
