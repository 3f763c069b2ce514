//! HTTP client for the Ambu-Life API.
//!
//! A single client instance serves every data-fetching operation. Before each
//! request the stored bearer token is read and attached under both header
//! conventions the server checks (`Authorization: Bearer` and `x-auth-token`).
//! A 401 response clears the token store before the error surfaces; there is
//! no retry. Requests and responses are logged at debug level.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, GENERIC_ERROR};
use crate::models::{Envelope, LoginPayload, User};
use crate::token::TokenStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// An outgoing request, transport-agnostic.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// A received response. Failure statuses are responses, not transport errors.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Seam between the client and the wire, so tests can substitute a canned
/// transport.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Production transport backed by a `ureq` agent with a fixed timeout.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout(std::time::Duration::from_millis(timeout_ms))
                .build(),
        }
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut req = match request.method {
            Method::Get => self.agent.get(&request.url),
            Method::Post => self.agent.post(&request.url),
        };
        for (name, value) in &request.headers {
            req = req.set(name, value);
        }

        let result = match &request.body {
            Some(body) => req.send_json(body.clone()),
            None => req.call(),
        };

        match result {
            Ok(resp) => {
                let status = resp.status();
                let body = resp
                    .into_string()
                    .map_err(|e| ApiError::Transport(e.to_string()))?;
                Ok(HttpResponse { status, body })
            }
            Err(ureq::Error::Status(status, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                Ok(HttpResponse { status, body })
            }
            Err(e) => Err(ApiError::Transport(e.to_string())),
        }
    }
}

/// The shared API client: base URL, transport, and the token store it reads
/// before every request (and clears on 401).
pub struct ApiClient {
    base_url: String,
    tokens: TokenStore,
    transport: Box<dyn Transport>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout_ms: u64, tokens: TokenStore) -> Self {
        Self::with_transport(base_url, tokens, Box::new(UreqTransport::new(timeout_ms)))
    }

    pub fn with_transport(base_url: &str, tokens: TokenStore, transport: Box<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
            transport,
        }
    }

    /// Exchange credentials for a token and the session fields.
    pub fn login(&self, email: &str, password: &str) -> Result<LoginPayload, ApiError> {
        self.request(
            Method::Post,
            "/auth/login",
            Some(serde_json::json!({ "email": email, "password": password })),
        )
    }

    /// Fetch the full profile of the authenticated user.
    pub fn current_user(&self) -> Result<User, ApiError> {
        self.request(Method::Get, "/auth/me", None)
    }

    fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);

        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        let token = self.tokens.get();
        if let Some(token) = &token {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
            headers.push(("x-auth-token".to_string(), token.clone()));
        }

        tracing::debug!(
            method = method.as_str(),
            url = %url,
            authenticated = token.is_some(),
            "api request"
        );

        let resp = self.transport.send(&HttpRequest {
            method,
            url,
            headers,
            body,
        })?;

        tracing::debug!(status = resp.status, body = %resp.body, "api response");

        if resp.status == 401 {
            if let Err(e) = self.tokens.clear() {
                tracing::warn!(error = %e, "failed to clear token after 401");
            }
            return Err(ApiError::Unauthorized);
        }

        if resp.status >= 400 {
            return Err(ApiError::Api {
                status: resp.status,
                message: extract_message(&resp.body),
            });
        }

        let envelope: Envelope<T> =
            serde_json::from_str(&resp.body).map_err(|e| ApiError::Decode(e.to_string()))?;
        if !envelope.success {
            return Err(ApiError::Api {
                status: resp.status,
                message: envelope
                    .message
                    .unwrap_or_else(|| GENERIC_ERROR.to_string()),
            });
        }
        envelope
            .data
            .ok_or_else(|| ApiError::Decode("envelope is missing data".to_string()))
    }
}

/// Pull the server's `message` field out of an error body, falling back to
/// generic text.
fn extract_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from))
        .unwrap_or_else(|| GENERIC_ERROR.to_string())
}


#[cfg(test)]
mod tests {
    use super::testing::MockTransport;
    use super::*;
    use std::rc::Rc;

    fn client_with_mock(dir: &tempfile::TempDir) -> (ApiClient, Rc<MockTransport>, TokenStore) {
        let tokens = TokenStore::new(dir.path().join("token"));
        let mock = Rc::new(MockTransport::new());
        let client = ApiClient::with_transport(
            "https://api.test/api/",
            tokens.clone(),
            Box::new(Rc::clone(&mock)),
        );
        (client, mock, tokens)
    }

    #[test]
    fn test_attaches_both_auth_headers_when_token_present() {
        let dir = tempfile::tempdir().unwrap();
        let (client, mock, tokens) = client_with_mock(&dir);
        tokens.set("abc").unwrap();
        mock.push_response(
            200,
            r#"{"success": true, "data": {"_id": "u1", "name": "Karim"}}"#,
        );

        client.current_user().unwrap();

        let seen = mock.seen.borrow();
        let headers = &seen[0].headers;
        assert!(headers.contains(&("Authorization".to_string(), "Bearer abc".to_string())));
        assert!(headers.contains(&("x-auth-token".to_string(), "abc".to_string())));
        // Trailing slash on the base URL is normalized.
        assert_eq!(seen[0].url, "https://api.test/api/auth/me");
    }

    #[test]
    fn test_no_auth_headers_without_token() {
        let dir = tempfile::tempdir().unwrap();
        let (client, mock, _tokens) = client_with_mock(&dir);
        mock.push_response(
            200,
            r#"{"success": true, "data": {"token": "t", "role": "admin"}}"#,
        );

        client.login("a@b.dz", "pw").unwrap();

        let seen = mock.seen.borrow();
        assert!(seen[0]
            .headers
            .iter()
            .all(|(name, _)| name != "Authorization" && name != "x-auth-token"));
        assert_eq!(seen[0].method, Method::Post);
    }

    #[test]
    fn test_401_clears_token_store() {
        let dir = tempfile::tempdir().unwrap();
        let (client, mock, tokens) = client_with_mock(&dir);
        tokens.set("stale").unwrap();
        mock.push_response(401, r#"{"success": false, "message": "jwt expired"}"#);

        let err = client.current_user().unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
        assert_eq!(tokens.get(), None);
    }

    #[test]
    fn test_error_status_extracts_server_message() {
        let dir = tempfile::tempdir().unwrap();
        let (client, mock, _tokens) = client_with_mock(&dir);
        mock.push_response(400, r#"{"success": false, "message": "Invalid credentials"}"#);

        let err = client.login("a@b.dz", "wrong").unwrap_err();
        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid credentials");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_error_status_with_unparseable_body_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let (client, mock, _tokens) = client_with_mock(&dir);
        mock.push_response(500, "<html>Internal Server Error</html>");

        let err = client.current_user().unwrap_err();
        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, GENERIC_ERROR);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_success_false_envelope_is_an_api_error() {
        let dir = tempfile::tempdir().unwrap();
        let (client, mock, _tokens) = client_with_mock(&dir);
        mock.push_response(200, r#"{"success": false, "message": "account disabled"}"#);

        let err = client.current_user().unwrap_err();
        match err {
            ApiError::Api { message, .. } => assert_eq!(message, "account disabled"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_transport_failure_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        let (client, mock, tokens) = client_with_mock(&dir);
        tokens.set("abc").unwrap();
        mock.push_transport_error("connection refused");

        let err = client.current_user().unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        // A transport failure is not a 401; the token survives.
        assert_eq!(tokens.get().as_deref(), Some("abc"));
    }
}
