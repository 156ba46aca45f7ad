use serde_json::Value;

use super::{keys, LemonApi, PROFILE_TTL};
use crate::auth::CredentialPair;
use crate::error::Result;
use crate::models::Me;
use crate::request::ApiRequest;

impl LemonApi {
    /// Log in and drop everything cached for the previous identity
    pub async fn login(&self, username: &str, password: &str) -> Result<CredentialPair> {
        let pair = self.session.login(username, password).await?;
        self.cache.clear();
        Ok(pair)
    }

    pub async fn logout(&self) -> Result<()> {
        self.cache.clear();
        self.session.logout().await
    }

    pub async fn register(&self, username: &str, password: &str, email: Option<&str>) -> Result<Value> {
        self.session.register(username, password, email).await
    }

    pub fn is_authenticated(&self) -> Result<bool> {
        self.session.is_authenticated()
    }

    /// Profile and role flags of the logged-in user
    pub async fn me(&self) -> Result<Me> {
        self.query(keys::PROFILE, Some(PROFILE_TTL), ApiRequest::get("/api/me"))
            .await
    }

    /// Profile of the logged-in user, or `Forbidden` unless they are a manager
    pub async fn require_manager(&self) -> Result<Me> {
        let me = self.me().await?;
        me.require_manager()?;
        Ok(me)
    }
}
