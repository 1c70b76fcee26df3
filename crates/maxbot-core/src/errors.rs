use std::fmt;

use serde_json::{Map, Value};

/// Core error type for the Max Bot API client.
///
/// Adapter crates map their specific failures into this type so callers can
/// branch on what went wrong (no connection vs HTTP failure vs bad payload)
/// without knowing which transport was used.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    /// Caller misuse caught before any I/O is attempted.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Connection-level failure (DNS, TLS, timeout). Carries no HTTP status.
    #[error("transport error: {0}")]
    Transport(String),

    /// The API answered with a 4xx/5xx status.
    #[error(transparent)]
    Http(#[from] ApiError),

    /// A response entity is missing a required field or has the wrong shape.
    #[error("malformed {entity}: field `{field}`: {reason}")]
    MalformedEntity {
        entity: &'static str,
        field: String,
        reason: String,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn malformed(
        entity: &'static str,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::MalformedEntity {
            entity,
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Normalized HTTP failure reported by the Max Bot API.
///
/// `code` and `message` come from the error body when the API sends one;
/// `details` keeps the full parsed body for callers that need more than the
/// extracted pair. All three are `None` when the body was absent or not JSON.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiError {
    pub status: u16,
    pub code: Option<String>,
    pub message: Option<String>,
    pub details: Option<Map<String, Value>>,
}

impl ApiError {
    /// Single construction point for HTTP failures.
    ///
    /// `parsed` is the best-effort JSON body; anything that is not a JSON
    /// object yields an error with only the status filled in.
    pub fn from_response(status: u16, parsed: Option<Value>) -> Self {
        let details = match parsed {
            Some(Value::Object(map)) => Some(map),
            _ => None,
        };
        let code = details
            .as_ref()
            .and_then(|map| map.get("code"))
            .and_then(Value::as_str)
            .map(str::to_owned);
        let message = details
            .as_ref()
            .and_then(|map| map.get("message"))
            .and_then(Value::as_str)
            .map(str::to_owned);

        Self {
            status,
            code,
            message,
            details,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(code) = &self.code {
            write!(f, ": code={code}")?;
        }
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_code_and_message_from_json_object() {
        let err = ApiError::from_response(
            404,
            Some(json!({"code": "chat_not_found", "message": "no such chat"})),
        );
        assert_eq!(err.status, 404);
        assert_eq!(err.code.as_deref(), Some("chat_not_found"));
        assert_eq!(err.message.as_deref(), Some("no such chat"));
        assert!(err.details.is_some());
        assert_eq!(err.to_string(), "HTTP 404: code=chat_not_found: no such chat");
    }

    #[test]
    fn non_object_body_yields_bare_status() {
        let err = ApiError::from_response(500, Some(json!(["not", "an", "object"])));
        assert_eq!(err.status, 500);
        assert_eq!(err.code, None);
        assert_eq!(err.message, None);
        assert_eq!(err.details, None);
        assert_eq!(err.to_string(), "HTTP 500");
    }

    #[test]
    fn absent_body_yields_bare_status() {
        let err = ApiError::from_response(502, None);
        assert_eq!(err.details, None);
        assert_eq!(err.to_string(), "HTTP 502");
    }

    #[test]
    fn non_string_code_is_ignored() {
        let err = ApiError::from_response(400, Some(json!({"code": 7, "message": "bad"})));
        assert_eq!(err.code, None);
        assert_eq!(err.message.as_deref(), Some("bad"));
    }
}
