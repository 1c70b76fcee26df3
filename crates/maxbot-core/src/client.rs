//! Request executor: authentication, URL building and outcome
//! classification. Endpoint wrappers live in [`crate::api`].

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::errors::ApiError;
use crate::transport::{Method, Transport, TransportRequest};
use crate::Result;

pub const DEFAULT_BASE_URL: &str = "https://platform-api.max.ru";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// The access token always travels as this query parameter; callers cannot
/// override it through their own query pairs.
const ACCESS_TOKEN_KEY: &str = "access_token";

/// Client for the Max Bot API.
///
/// Holds the credential context (token, base endpoint, default timeout) for
/// its whole lifetime; to change credentials, construct a new client. All
/// I/O goes through the [`Transport`] port, which also owns connection
/// reuse. `request` performs exactly one round trip: no retries, no backoff;
/// that policy belongs to the caller.
pub struct MaxClient {
    access_token: String,
    base_url: String,
    timeout: Option<Duration>,
    transport: Arc<dyn Transport>,
}

/// Successful response payload after content negotiation: parsed JSON when
/// the transport reported a JSON content type and the body parsed, the raw
/// text otherwise.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Json(Value),
    Text(String),
}

impl Payload {
    pub fn into_json(self) -> Option<Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Text(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Text(_) => None,
        }
    }
}

impl MaxClient {
    pub fn new(access_token: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
            transport,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Client-wide default timeout. `None` disables client-side enforcement
    /// and leaves timeouts to the transport or caller.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Execute one authenticated request and classify the outcome.
    ///
    /// Non-2xx statuses become [`crate::Error::Http`] with whatever the body
    /// yielded; a 2xx with an unparseable or non-JSON body comes back as
    /// [`Payload::Text`]. A per-call `timeout` overrides the client default.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
        timeout: Option<Duration>,
    ) -> Result<Payload> {
        let url = self.build_url(path);

        let mut merged: Vec<(String, String)> = query
            .iter()
            .filter(|(key, _)| *key != ACCESS_TOKEN_KEY)
            .map(|(key, value)| ((*key).to_string(), value.clone()))
            .collect();
        merged.push((ACCESS_TOKEN_KEY.to_string(), self.access_token.clone()));

        tracing::debug!(method = method.as_str(), path, "max api request");

        let response = self
            .transport
            .send(TransportRequest {
                method,
                url,
                query: merged,
                body,
                timeout: timeout.or(self.timeout),
            })
            .await?;

        // A body claiming JSON but failing to parse is not an error by
        // itself; the status decides the branch.
        let parsed = if response.is_json() {
            serde_json::from_str::<Value>(&response.body).ok()
        } else {
            None
        };

        if !response.is_success() {
            let err = ApiError::from_response(response.status, parsed);
            tracing::debug!(status = response.status, error = %err, "max api error response");
            return Err(err.into());
        }

        Ok(match parsed {
            Some(value) => Payload::Json(value),
            None => Payload::Text(response.body),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeTransport;
    use super::*;
    use crate::errors::Error;

    fn client(transport: FakeTransport) -> (MaxClient, Arc<FakeTransport>) {
        let transport = Arc::new(transport);
        let client = MaxClient::new("secret-token", transport.clone());
        (client, transport)
    }

    #[tokio::test]
    async fn appends_access_token_to_caller_query() {
        let (client, transport) = client(FakeTransport::new());
        client
            .request(
                Method::Get,
                "/chats",
                &[("count", "50".to_string())],
                None,
                None,
            )
            .await
            .unwrap();

        assert_eq!(transport.query_value("count").as_deref(), Some("50"));
        assert_eq!(
            transport.query_value("access_token").as_deref(),
            Some("secret-token")
        );
    }

    #[tokio::test]
    async fn caller_cannot_override_access_token() {
        let (client, transport) = client(FakeTransport::new());
        client
            .request(
                Method::Get,
                "/me",
                &[("access_token", "forged".to_string())],
                None,
                None,
            )
            .await
            .unwrap();

        let tokens: Vec<String> = transport
            .last_request()
            .query
            .iter()
            .filter(|(k, _)| k == "access_token")
            .map(|(_, v)| v.clone())
            .collect();
        assert_eq!(tokens, vec!["secret-token".to_string()]);
    }

    #[tokio::test]
    async fn joins_path_with_exactly_one_separator() {
        let (client, transport) = client(FakeTransport::new());
        client
            .request(Method::Get, "me", &[], None, None)
            .await
            .unwrap();
        assert_eq!(
            transport.last_request().url,
            "https://platform-api.max.ru/me"
        );

        client
            .request(Method::Get, "/me", &[], None, None)
            .await
            .unwrap();
        assert_eq!(
            transport.last_request().url,
            "https://platform-api.max.ru/me"
        );
    }

    #[tokio::test]
    async fn trailing_slash_on_base_url_is_stripped() {
        let transport = Arc::new(FakeTransport::new());
        let client = MaxClient::new("t", transport.clone())
            .with_base_url("https://example.test/api/");
        client
            .request(Method::Get, "/me", &[], None, None)
            .await
            .unwrap();
        assert_eq!(transport.last_request().url, "https://example.test/api/me");
    }

    #[tokio::test]
    async fn per_call_timeout_overrides_client_default() {
        let (client, transport) = client(FakeTransport::new());
        client
            .request(Method::Get, "/me", &[], None, None)
            .await
            .unwrap();
        assert_eq!(transport.last_request().timeout, Some(DEFAULT_TIMEOUT));

        client
            .request(
                Method::Get,
                "/updates",
                &[],
                None,
                Some(Duration::from_secs(35)),
            )
            .await
            .unwrap();
        assert_eq!(
            transport.last_request().timeout,
            Some(Duration::from_secs(35))
        );
    }

    #[tokio::test]
    async fn no_timeout_when_neither_is_set() {
        let transport = Arc::new(FakeTransport::new());
        let client = MaxClient::new("t", transport.clone()).with_timeout(None);
        client
            .request(Method::Get, "/me", &[], None, None)
            .await
            .unwrap();
        assert_eq!(transport.last_request().timeout, None);
    }

    #[tokio::test]
    async fn http_error_carries_code_and_message() {
        let (client, _) = client(FakeTransport::new().respond_with(
            404,
            Some("application/json"),
            r#"{"code":"chat_not_found","message":"no such chat"}"#,
        ));
        let err = client
            .request(Method::Get, "/chats/1", &[], None, None)
            .await
            .unwrap_err();

        match err {
            Error::Http(api) => {
                assert_eq!(api.status, 404);
                assert_eq!(api.code.as_deref(), Some("chat_not_found"));
                assert_eq!(api.message.as_deref(), Some("no such chat"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn http_error_with_unparseable_body_keeps_status_only() {
        let (client, _) = client(FakeTransport::new().respond_with(
            500,
            Some("application/json"),
            "<html>gateway</html>",
        ));
        let err = client
            .request(Method::Get, "/me", &[], None, None)
            .await
            .unwrap_err();

        match err {
            Error::Http(api) => {
                assert_eq!(api.status, 500);
                assert_eq!(api.code, None);
                assert_eq!(api.details, None);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn plain_text_success_returns_raw_text() {
        let (client, _) =
            client(FakeTransport::new().respond_with(200, Some("text/plain"), "ok"));
        let payload = client
            .request(Method::Get, "/me", &[], None, None)
            .await
            .unwrap();
        assert_eq!(payload, Payload::Text("ok".to_string()));
    }

    #[tokio::test]
    async fn claimed_json_that_fails_to_parse_returns_text_on_success() {
        let (client, _) = client(FakeTransport::new().respond_with(
            200,
            Some("application/json"),
            "not json",
        ));
        let payload = client
            .request(Method::Get, "/me", &[], None, None)
            .await
            .unwrap();
        assert_eq!(payload, Payload::Text("not json".to_string()));
    }

    #[tokio::test]
    async fn json_success_returns_parsed_value() {
        let (client, _) = client(FakeTransport::new().respond_json(r#"{"user_id": 1}"#));
        let payload = client
            .request(Method::Get, "/me", &[], None, None)
            .await
            .unwrap();
        assert_eq!(
            payload.as_json().and_then(|v| v.get("user_id")).and_then(|v| v.as_i64()),
            Some(1)
        );
    }
}
