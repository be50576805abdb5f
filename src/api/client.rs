//! Backend API Client
//! Blocking HTTP calls to the analysis service. Meant to run on worker threads.

use super::models::{
    AnalysisResult, Credentials, ErrorBody, HistoryRecord, LoginResponse, Profile,
};
use reqwest::blocking::{multipart, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message} (HTTP {status})")]
    Server { status: u16, message: String },
    #[error("Not signed in")]
    Unauthenticated,
}

/// Thin client for the `/api` endpoints.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let request = self.http.post(self.url("login")).json(credentials);
        Self::send_json(request)
    }

    pub fn register(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let request = self.http.post(self.url("register")).json(credentials);
        Self::send(request).map(|_| ())
    }

    pub fn profile(&self) -> Result<Profile, ApiError> {
        let request = self.authorized(self.http.get(self.url("profile")))?;
        Self::send_json(request)
    }

    pub fn update_profile(&self, profile: &Profile) -> Result<(), ApiError> {
        let request = self.authorized(self.http.put(self.url("profile")).json(profile))?;
        Self::send(request).map(|_| ())
    }

    /// Upload a JPEG image for analysis.
    pub fn analyze(&self, jpeg: Vec<u8>) -> Result<AnalysisResult, ApiError> {
        let part = multipart::Part::bytes(jpeg)
            .file_name("capture.jpg")
            .mime_str("image/jpeg")?;
        let form = multipart::Form::new().part("image", part);
        let request = self.authorized(self.http.post(self.url("analyze")).multipart(form))?;
        Self::send_json(request)
    }

    pub fn history(&self) -> Result<Vec<HistoryRecord>, ApiError> {
        let request = self.authorized(self.http.get(self.url("history")))?;
        Self::send_json(request)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        let token = self.token.as_deref().ok_or(ApiError::Unauthenticated)?;
        Ok(request.bearer_auth(token))
    }

    fn send(request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send()?;
        let status = response.status();
        debug!(url = %response.url(), status = status.as_u16(), "api response");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        Err(ApiError::Server {
            status: status.as_u16(),
            message: error_message(&body, status.canonical_reason().unwrap_or("Request failed")),
        })
    }

    fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        Ok(Self::send(request)?.json()?)
    }
}

/// Prefer the service's `{"error": "..."}` message over the status text.
fn error_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .ok()
        .filter(|msg| !msg.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new("http://localhost:5000/", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn urls_are_joined_under_api() {
        let client = client();
        assert_eq!(client.url("login"), "http://localhost:5000/api/login");
        assert_eq!(client.url("/history"), "http://localhost:5000/api/history");
    }

    #[test]
    fn protected_calls_need_a_token() {
        let client = client();
        assert!(matches!(client.history(), Err(ApiError::Unauthenticated)));
        assert!(matches!(client.profile(), Err(ApiError::Unauthenticated)));
    }

    #[test]
    fn token_is_sent_as_bearer() {
        let mut client = client();
        client.set_token(Some("abc".into()));
        let request = client
            .authorized(client.http.get(client.url("history")))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(request.headers()["authorization"], "Bearer abc");

        client.set_token(None);
        assert!(matches!(client.history(), Err(ApiError::Unauthenticated)));
    }

    #[test]
    fn server_error_message_is_preferred() {
        assert_eq!(
            error_message(r#"{"error": "Invalid credentials"}"#, "Unauthorized"),
            "Invalid credentials"
        );
        assert_eq!(error_message("<html>oops</html>", "Bad Gateway"), "Bad Gateway");
        assert_eq!(error_message(r#"{"error": ""}"#, "Bad Request"), "Bad Request");
    }
}
