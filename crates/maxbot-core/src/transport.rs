use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

/// HTTP methods used by the Max Bot API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
        }
    }
}

/// One outbound HTTP request, fully resolved by the request executor
/// (absolute URL, merged query including the access token).
#[derive(Clone, Debug)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub timeout: Option<Duration>,
}

/// Raw response as reported by the transport. Interpretation (JSON vs text,
/// success vs failure) is the executor's job, not the transport's.
#[derive(Clone, Debug)]
pub struct TransportResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl TransportResponse {
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Port for the component that performs the actual socket I/O.
///
/// Implementations map their own failures (connect errors, timeouts) into
/// [`crate::Error::Transport`] so a timed-out call never carries an HTTP
/// status. Connection reuse across sequential calls is the implementation's
/// concern; thread-safety for concurrent calls must be documented by the
/// adapter, not assumed by callers.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}
