use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Failure talking to the managed platform.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The platform rejected the call. `message` is the platform's own
    /// wording and is surfaced to API clients unmodified.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Transport-level failure before any platform verdict.
    #[error("platform request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Access-token acquisition failed.
    #[error("token exchange failed: {0}")]
    Token(String),
}

/// Decode a platform response body, turning non-2xx statuses into
/// [`PlatformError::Api`] with the platform's message.
pub(crate) async fn decode_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, PlatformError> {
    let status = response.status();
    if status.is_success() {
        Ok(response.json::<T>().await?)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(PlatformError::Api {
            status: status.as_u16(),
            message: provider_message(&body, status.as_u16()),
        })
    }
}

/// Pull the human-readable message out of the platform's standard
/// `{"error": {"message": ...}}` envelope, falling back to the raw body.
fn provider_message(body: &str, status: u16) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    parsed
        .as_ref()
        .and_then(|v| v.get("error"))
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_else(|| {
            if body.is_empty() {
                format!("platform returned status {status}")
            } else {
                body.to_string()
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_message_from_error_envelope() {
        let body = r#"{"error":{"code":400,"message":"EMAIL_EXISTS","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(provider_message(body, 400), "EMAIL_EXISTS");
    }

    #[test]
    fn falls_back_to_raw_body() {
        assert_eq!(provider_message("upstream exploded", 502), "upstream exploded");
    }

    #[test]
    fn falls_back_to_status_for_empty_body() {
        assert_eq!(provider_message("", 503), "platform returned status 503");
    }

    #[test]
    fn api_error_displays_bare_message() {
        let err = PlatformError::Api {
            status: 400,
            message: "EMAIL_EXISTS".into(),
        };
        assert_eq!(err.to_string(), "EMAIL_EXISTS");
    }
}
