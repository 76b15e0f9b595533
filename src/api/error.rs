use reqwest::StatusCode;
use thiserror::Error;
use tracing::warn;

/// Errors from the remote REST APIs
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// 400 Bad Request
    #[error("Bad Request: {0}")]
    BadRequest(String),
    /// 401 Unauthorized
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// 403 Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),
    /// 404 Not Found
    #[error("Not Found: {0}")]
    NotFound(String),
    /// 429 Too Many Requests, or a provider quota notice
    #[error("Rate Limited: {0}")]
    RateLimited(String),
    /// 5xx Server Error
    #[error("Server Error ({0}): {1}")]
    ServerError(u16, String),
    /// Other HTTP errors
    #[error("HTTP Error ({0}): {1}")]
    HttpError(u16, String),
    /// Provider answered 200 but reported an error in the body
    #[error("Provider Error: {0}")]
    Provider(String),
    /// Network/request error
    #[error("Request Error: {0}")]
    RequestError(String),
    /// Deserialization error
    #[error("Deserialization Error: {0}")]
    DeserializationError(String),
}

impl ApiError {
    /// Map a non-success response to an error, keeping the most useful part of the body
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let body_text = response.text().await.unwrap_or_default();
        Self::from_status(status, body_text)
    }

    pub(crate) fn from_status(status: StatusCode, body_text: String) -> Self {
        let status_code = status.as_u16();
        let message = extract_message(&body_text).unwrap_or(body_text);

        match status_code {
            400 => ApiError::BadRequest(message),
            401 => ApiError::Unauthorized(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            429 => {
                warn!("Rate limited: {}", message);
                ApiError::RateLimited(message)
            }
            500..=599 => {
                warn!("Server error {}: {}", status_code, message);
                ApiError::ServerError(status_code, message)
            }
            _ => ApiError::HttpError(status_code, message),
        }
    }
}

/// Pull a human message out of a JSON error body.
///
/// Understands `{"message": ..}` and the `{"errors": [{"message": ..}]}` list form.
fn extract_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;

    if let Some(message) = json.get("message").and_then(|v| v.as_str()) {
        return Some(message.to_string());
    }

    let messages: Vec<&str> = json
        .get("errors")?
        .as_array()?
        .iter()
        .filter_map(|e| e.get("message").and_then(|m| m.as_str()))
        .collect();

    if messages.is_empty() {
        None
    } else {
        Some(messages.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, "nope".into()),
            ApiError::Unauthorized(ref m) if m == "nope"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, String::new()),
            ApiError::RateLimited(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, String::new()),
            ApiError::ServerError(502, _)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::IM_A_TEAPOT, String::new()),
            ApiError::HttpError(418, _)
        ));
    }

    #[test]
    fn test_extracts_error_list() {
        let body = r#"{"errors":[{"message":"The from address does not match a verified Sender Identity.","field":"from"},{"message":"second"}]}"#;
        let err = ApiError::from_status(StatusCode::FORBIDDEN, body.to_string());
        assert_eq!(
            err.to_string(),
            "Forbidden: The from address does not match a verified Sender Identity.; second"
        );
    }

    #[test]
    fn test_extracts_plain_message() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"message":"bad symbol"}"#.into());
        assert_eq!(err.to_string(), "Bad Request: bad symbol");
    }

    #[test]
    fn test_keeps_raw_body_when_not_json() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, "<html>gone</html>".into());
        assert_eq!(err.to_string(), "Not Found: <html>gone</html>");
    }
}
