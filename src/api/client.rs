//! Client for the bookshelf REST API.
//!
//! The backend wraps every payload in a `{ok, data, error}` envelope and
//! authenticates requests with a JWT bearer token obtained from
//! `POST /auth/login`.

use anyhow::{Context, Result};
use reqwest::{header, Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::AuthStore;
use crate::models::{Book, BookPage, Identity, UserProfile};

use super::ApiError;

/// HTTP request timeout in seconds.
/// The catalog endpoints are small; anything slower than this is down.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Page size requested from the listing endpoint (server caps at 100).
const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Response envelope used by every endpoint.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    token: String,
    user: UserProfile,
}

/// Query parameters for the book listing. Unset filters stay out of the
/// query string so the server applies its own defaults (created_at DESC).
#[derive(Debug, Clone, Serialize)]
pub struct BookQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
}

impl Default for BookQuery {
    fn default() -> Self {
        Self {
            q: None,
            category: None,
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
            sort: None,
            order: None,
        }
    }
}

pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: AuthStore,
}

impl ApiClient {
    /// Create a client against `base_url` with the shared auth store.
    /// The underlying connection pool is shared across all requests.
    pub fn new(base_url: impl Into<String>, auth: AuthStore) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Headers for an outgoing request: the bearer token iff the auth store
    /// currently holds one. Nothing else is touched.
    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = self.auth.token() {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Map a non-success status to an `ApiError`. A 401 additionally clears
    /// the auth store; the error itself still reaches the caller unchanged,
    /// there is no retry and no token refresh.
    fn handle_error_status(&self, status: StatusCode, body: &str) -> ApiError {
        let err = ApiError::from_status(status, body);
        if matches!(err, ApiError::Unauthorized) {
            warn!("Server rejected the token (401), clearing stored session");
            self.auth.clear_session();
        }
        err
    }

    /// Check if a response is successful, turning failures into errors.
    async fn check_response(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(self.handle_error_status(status, &body).into())
        }
    }

    fn into_data<T>(envelope: Envelope<T>, what: &str) -> Result<T> {
        if !envelope.ok {
            let message = envelope.error.unwrap_or_else(|| "request failed".to_string());
            return Err(ApiError::InvalidResponse(format!("{}: {}", what, message)).into());
        }
        envelope
            .data
            .ok_or_else(|| ApiError::InvalidResponse(format!("{}: missing data", what)).into())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = self.check_response(response).await?;
        let envelope: Envelope<T> = response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))?;
        Self::into_data(envelope, path)
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send POST request to {}", url))?;

        let response = self.check_response(response).await?;
        let envelope: Envelope<T> = response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))?;
        Self::into_data(envelope, path)
    }

    // ===== Auth endpoints =====

    /// Sign in and store the resulting session.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile> {
        let body = serde_json::json!({ "email": email, "password": password });
        let data: LoginData = self.post("/auth/login", &body).await?;
        if data.token.is_empty() {
            return Err(ApiError::InvalidResponse("login returned an empty token".to_string()).into());
        }
        debug!(email = %data.user.email, "Login succeeded");
        self.auth.set_session(data.token, data.user.clone())?;
        Ok(data.user)
    }

    /// Create an account; the server signs the new user in immediately.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<UserProfile> {
        let body = serde_json::json!({ "email": email, "password": password, "name": name });
        let data: LoginData = self.post("/auth/register", &body).await?;
        if data.token.is_empty() {
            return Err(ApiError::InvalidResponse("register returned an empty token".to_string()).into());
        }
        self.auth.set_session(data.token, data.user.clone())?;
        Ok(data.user)
    }

    /// Ask the server who the current token belongs to.
    pub async fn me(&self) -> Result<Identity> {
        self.get("/auth/me").await
    }

    // ===== Catalog endpoints =====

    /// Fetch one page of the book listing.
    pub async fn fetch_books(&self, query: &BookQuery) -> Result<BookPage> {
        let url = self.url("/books");
        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = self.check_response(response).await?;
        let envelope: Envelope<BookPage> = response
            .json()
            .await
            .context("Failed to parse book listing response")?;
        Self::into_data(envelope, "/books")
    }

    /// Fetch a single book by id.
    pub async fn fetch_book(&self, id: u64) -> Result<Book> {
        self.get(&format!("/books/{}", id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::sync::Arc;

    fn profile() -> UserProfile {
        UserProfile {
            id: 1,
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            role: "user".to_string(),
        }
    }

    fn client_with_store() -> (ApiClient, AuthStore) {
        let auth = AuthStore::new(Arc::new(MemoryStorage::new()));
        let client = ApiClient::new("http://localhost:8080/", auth.clone()).unwrap();
        (client, auth)
    }

    #[test]
    fn bearer_header_tracks_the_auth_store() {
        let (client, auth) = client_with_store();

        // No session: no Authorization header.
        let headers = client.auth_headers().unwrap();
        assert!(headers.get(header::AUTHORIZATION).is_none());

        // Session set: header carries the token.
        auth.set_session("abc123".to_string(), profile()).unwrap();
        let headers = client.auth_headers().unwrap();
        let value = headers.get(header::AUTHORIZATION).unwrap();
        assert_eq!(value.to_str().unwrap(), "Bearer abc123");

        // Cleared again: header disappears.
        auth.clear_session();
        let headers = client.auth_headers().unwrap();
        assert!(headers.get(header::AUTHORIZATION).is_none());
    }

    #[test]
    fn unauthorized_clears_session_and_propagates() {
        let storage: Arc<dyn crate::storage::Storage> = Arc::new(MemoryStorage::new());
        let auth = AuthStore::new(Arc::clone(&storage));
        let client = ApiClient::new("http://localhost:8080", auth.clone()).unwrap();
        auth.set_session("abc123".to_string(), profile()).unwrap();

        let err = client.handle_error_status(StatusCode::UNAUTHORIZED, "invalid token");
        assert!(matches!(err, ApiError::Unauthorized));
        assert!(!auth.is_authenticated());
        assert_eq!(auth.token(), None);
        assert_eq!(storage.get("token"), None);
    }

    #[test]
    fn unauthorized_after_logout_is_harmless() {
        let (client, auth) = client_with_store();
        auth.set_session("abc123".to_string(), profile()).unwrap();
        auth.clear_session();

        let err = client.handle_error_status(StatusCode::UNAUTHORIZED, "");
        assert!(matches!(err, ApiError::Unauthorized));
        assert!(!auth.is_authenticated());
    }

    #[test]
    fn other_errors_leave_the_session_alone() {
        let (client, auth) = client_with_store();
        auth.set_session("abc123".to_string(), profile()).unwrap();

        let err = client.handle_error_status(StatusCode::NOT_FOUND, "book not found");
        assert!(matches!(err, ApiError::NotFound(_)));
        assert!(auth.is_authenticated());
    }

    #[test]
    fn book_query_serializes_only_set_filters() {
        let query = BookQuery::default();
        let value = serde_json::to_value(&query).unwrap();
        let fields = value.as_object().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["page"], 1);
        assert_eq!(fields["limit"], 10);

        let query = BookQuery {
            q: Some("orwell".to_string()),
            sort: Some("price".to_string()),
            order: Some("ASC".to_string()),
            ..BookQuery::default()
        };
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(value["q"], "orwell");
        assert_eq!(value["sort"], "price");
        assert_eq!(value["order"], "ASC");
    }

    #[test]
    fn envelope_unwrapping() {
        let ok: Envelope<i32> = serde_json::from_str(r#"{"ok":true,"data":5}"#).unwrap();
        assert_eq!(ApiClient::into_data(ok, "/t").unwrap(), 5);

        let failed: Envelope<i32> =
            serde_json::from_str(r#"{"ok":false,"error":"nope"}"#).unwrap();
        assert!(ApiClient::into_data(failed, "/t").is_err());

        let empty: Envelope<i32> = serde_json::from_str(r#"{"ok":true}"#).unwrap();
        assert!(ApiClient::into_data(empty, "/t").is_err());
    }
}
