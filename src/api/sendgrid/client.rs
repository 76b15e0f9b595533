use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client as HttpClient;

use super::models::MailRequest;
use crate::api::ApiError;

/// SendGrid v3 API client for transactional mail
pub struct SendGridClient {
    http_client: HttpClient,
    api_key: String,
    base_url: String,
}

impl SendGridClient {
    const DEFAULT_BASE_URL: &'static str = "https://api.sendgrid.com";

    /// Create a new SendGrid client
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, Self::DEFAULT_BASE_URL.to_string())
    }

    /// Create a new client with custom base URL (for testing)
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            base_url,
        }
    }

    /// Create default headers with authorization
    fn create_headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let auth_value = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|e| ApiError::RequestError(format!("Failed to create auth header: {}", e)))?;
        headers.insert(AUTHORIZATION, auth_value);

        Ok(headers)
    }

    /// POST /v3/mail/send
    ///
    /// SendGrid queues the message and answers 202 with an empty body.
    ///
    /// # Returns
    /// * `Ok(u16)` - HTTP status of the accepted request
    /// * `Err(ApiError)` - Transport failure or rejected request
    pub async fn send_mail(&self, mail: &MailRequest) -> Result<u16, ApiError> {
        let url = format!("{}/v3/mail/send", self.base_url.trim_end_matches('/'));
        let headers = self.create_headers()?;

        let response = self
            .http_client
            .post(&url)
            .headers(headers)
            .json(mail)
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }

        Ok(response.status().as_u16())
    }
}
