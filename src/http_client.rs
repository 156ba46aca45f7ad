use anyhow::Context;
use futures::future::FutureExt;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::refresh::{self, RefreshOutcome, RefreshSlot, RefreshStart};
use crate::auth::CredentialStore;
use crate::error::{ApiError, Result};
use crate::request::{ApiRequest, Attempt};

/// HTTP client for the Little Lemon API with credential recovery.
///
/// Clones share the connection pool, the credential store and the
/// in-flight refresh slot.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    /// Shared HTTP client with connection pooling
    http: Client,

    /// Backend base URL without a trailing slash
    base_url: String,

    /// Where the credential pair lives
    store: Arc<dyn CredentialStore>,

    /// At most one refresh in flight for this client
    refresh: RefreshSlot,
}

impl ApiClient {
    /// Create a new client with its own connection pool
    pub fn new(
        base_url: &str,
        store: Arc<dyn CredentialStore>,
        connect_timeout: u64,
        request_timeout: u64,
    ) -> anyhow::Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout))
            .timeout(Duration::from_secs(request_timeout))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self::with_http_client(http, base_url, store))
    }

    /// Wrap an existing `reqwest::Client`
    pub fn with_http_client(http: Client, base_url: &str, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: base_url.trim_end_matches('/').to_string(),
                store,
                refresh: RefreshSlot::new(),
            }),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.inner.store
    }

    /// Get the underlying HTTP client
    pub fn client(&self) -> &Client {
        &self.inner.http
    }

    /// Send an authenticated request.
    ///
    /// Attaches the stored access token and, on a 401, refreshes it once and
    /// resubmits. Every other failure is returned unchanged.
    pub async fn send(&self, request: &ApiRequest) -> Result<Response> {
        let attempt = self.attach()?;

        match self.send_attempt(request, &attempt).await {
            Err(err) if err.is_unauthorized() && !attempt.is_retry() => {
                self.recover(request, &attempt, err).await
            }
            other => other,
        }
    }

    /// Send without a credential and without recovery (auth endpoints)
    pub async fn send_public(&self, request: &ApiRequest) -> Result<Response> {
        self.send_attempt(request, &Attempt::first(None)).await
    }

    /// Send an authenticated request and decode the JSON body
    pub async fn send_json<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T> {
        let response = self.send(request).await?;
        decode_json(request, response).await
    }

    /// Send an authenticated request, discarding the body
    pub async fn send_empty(&self, request: &ApiRequest) -> Result<()> {
        self.send(request).await?;
        Ok(())
    }

    /// Attach the stored access token, if any, to a first attempt
    fn attach(&self) -> Result<Attempt> {
        Ok(Attempt::first(self.inner.store.access_token()?))
    }

    async fn send_attempt(&self, request: &ApiRequest, attempt: &Attempt) -> Result<Response> {
        let method = request.method().clone();
        let path = request.path().to_string();

        tracing::debug!(
            method = %method,
            path = %path,
            attempt = attempt.number(),
            authenticated = attempt.bearer().is_some(),
            "Sending API request"
        );

        let built = request.build(&self.inner.http, &self.inner.base_url, attempt.bearer())?;

        let response = match self.inner.http.execute(built).await {
            Ok(response) => response,
            Err(e) => {
                let error_kind = if e.is_timeout() {
                    "timeout"
                } else if e.is_connect() {
                    "connection_failed"
                } else if e.is_request() {
                    "request_error"
                } else {
                    "unknown"
                };

                tracing::warn!(
                    error_kind = error_kind,
                    error = %e,
                    method = %method,
                    path = %path,
                    "API request error"
                );
                return Err(ApiError::Transport(e));
            }
        };

        let status = response.status();
        if status.is_success() {
            tracing::debug!(status = %status, path = %path, "API request successful");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(
            status = status.as_u16(),
            method = %method,
            path = %path,
            attempt = attempt.number(),
            response_body = %body,
            "API request failed with error response"
        );

        Err(ApiError::Status { status, body })
    }

    /// Refresh-and-retry after a 401. `original` is what the caller sees if
    /// recovery is impossible.
    async fn recover(
        &self,
        request: &ApiRequest,
        attempt: &Attempt,
        original: ApiError,
    ) -> Result<Response> {
        let Some(refresh_token) = self.inner.store.refresh_token()? else {
            tracing::info!(path = %request.path(), "Received 401 and no refresh token is stored");
            return Err(original);
        };

        tracing::warn!(path = %request.path(), "Received 401, recovering access token");
        let outcome = self
            .inner
            .refresh
            .run(|| self.refresh_start(attempt, refresh_token))
            .await;

        let token = match outcome {
            Ok(token) => token,
            Err(reason) => {
                tracing::warn!(reason = %reason, "Token refresh failed");
                return Err(original);
            }
        };

        let retry = attempt.retry(token);
        self.send_attempt(request, &retry).await
    }

    /// Decide, under the slot lock, whether a new refresh is needed
    fn refresh_start(
        &self,
        attempt: &Attempt,
        refresh_token: String,
    ) -> std::result::Result<RefreshStart, String> {
        match self.inner.store.access_token() {
            // A refresh settled after this request left; reuse its token
            Ok(Some(current)) if Some(current.as_str()) != attempt.bearer() => {
                tracing::debug!("Access token changed since send, retrying");
                Ok(RefreshStart::Current(current))
            }
            Ok(_) => Ok(RefreshStart::Refresh(self.start_refresh(refresh_token))),
            Err(e) => Err(e.to_string()),
        }
    }

    /// Refresh future stored in the slot; owns everything it touches
    fn start_refresh(&self, refresh_token: String) -> futures::future::BoxFuture<'static, RefreshOutcome> {
        let inner = Arc::clone(&self.inner);

        async move {
            match refresh::request_access_token(&inner.http, &inner.base_url, &refresh_token).await
            {
                Ok(access) => {
                    inner
                        .store
                        .set_access_token(&access)
                        .map_err(|e| e.to_string())?;
                    Ok(access)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Refresh rejected, clearing stored credentials");
                    if let Err(clear_err) = inner.store.clear() {
                        tracing::error!(error = %clear_err, "Failed to clear stored credentials");
                    }
                    Err(e.to_string())
                }
            }
        }
        .boxed()
    }
}

/// Decode a successful response body as JSON
pub async fn decode_json<T: DeserializeOwned>(request: &ApiRequest, response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| {
        ApiError::Decode(format!("{} {}: {}", request.method(), request.path(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryStore;

    #[test]
    fn test_base_url_is_normalized() {
        let client = ApiClient::new(
            "http://localhost:8000/",
            Arc::new(MemoryStore::new()),
            30,
            300,
        )
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_attach_uses_stored_access_token() {
        let client = ApiClient::with_http_client(
            Client::new(),
            "http://localhost:8000",
            Arc::new(MemoryStore::with_pair("A1", "R1")),
        );
        let attempt = client.attach().unwrap();
        assert_eq!(attempt.bearer(), Some("A1"));
        assert!(!attempt.is_retry());
    }

    #[test]
    fn test_attach_without_token_is_unauthenticated() {
        let client = ApiClient::with_http_client(
            Client::new(),
            "http://localhost:8000",
            Arc::new(MemoryStore::new()),
        );
        assert_eq!(client.attach().unwrap().bearer(), None);
    }

    #[test]
    fn test_clones_share_state() {
        let client = ApiClient::with_http_client(
            Client::new(),
            "http://localhost:8000",
            Arc::new(MemoryStore::new()),
        );
        let clone = client.clone();
        clone.store().set_access_token("A9").unwrap();
        assert_eq!(client.attach().unwrap().bearer(), Some("A9"));
    }
}
