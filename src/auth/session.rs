// Login, logout and registration

use serde_json::Value;

use super::types::{CredentialPair, LoginRequest, LoginResponse, RefreshRequest, RegisterRequest};
use crate::error::Result;
use crate::http_client::{decode_json, ApiClient};
use crate::request::ApiRequest;

const LOGIN_PATH: &str = "/auth/jwt/create/";
const BLACKLIST_PATH: &str = "/auth/jwt/blacklist/";
const REGISTER_PATH: &str = "/auth/users/";

/// Session lifecycle on top of an [`ApiClient`]
#[derive(Clone)]
pub struct Session {
    client: ApiClient,
}

impl Session {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Exchange username/password for a credential pair and store both tokens
    pub async fn login(&self, username: &str, password: &str) -> Result<CredentialPair> {
        tracing::debug!(username = %username, "Logging in");

        let request = ApiRequest::post(LOGIN_PATH).json(&LoginRequest { username, password })?;
        let response = self.client.send_public(&request).await?;
        let data: LoginResponse = decode_json(&request, response).await?;

        let pair = CredentialPair::from(data);
        self.client.store().store_pair(&pair)?;

        tracing::info!(username = %username, "Logged in");
        Ok(pair)
    }

    /// Create a user account; does not log in
    pub async fn register(&self, username: &str, password: &str, email: Option<&str>) -> Result<Value> {
        let request = ApiRequest::post(REGISTER_PATH).json(&RegisterRequest {
            username,
            password,
            email,
        })?;
        let response = self.client.send_public(&request).await?;
        decode_json(&request, response).await
    }

    /// Blacklist the refresh token server-side (best effort) and clear both tokens
    pub async fn logout(&self) -> Result<()> {
        let store = self.client.store();

        match store.refresh_token() {
            Ok(Some(refresh)) => {
                if let Err(e) = self.blacklist(&refresh).await {
                    tracing::warn!(error = %e, "Failed to blacklist refresh token");
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to read refresh token"),
        }

        store.clear()?;
        tracing::info!("Logged out");
        Ok(())
    }

    async fn blacklist(&self, refresh: &str) -> Result<()> {
        let request = ApiRequest::post(BLACKLIST_PATH).json(&RefreshRequest { refresh })?;
        self.client.send_public(&request).await?;
        Ok(())
    }

    /// True when an access token is stored
    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.client.store().access_token()?.is_some())
    }
}
