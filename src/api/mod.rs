// Typed resource operations for the Little Lemon backend
// Reads go through the query cache, mutations invalidate what they touch.

mod account;
mod cart;
mod menu;
mod orders;

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use crate::auth::Session;
use crate::cache::QueryCache;
use crate::error::{ApiError, Result};
use crate::http_client::ApiClient;
use crate::request::ApiRequest;

/// Cache keys. None of them is a prefix of another unless it is meant to be
/// invalidated together with it.
pub(crate) mod keys {
    pub const PROFILE: &str = "profile";
    pub const CATEGORIES: &str = "categories";
    pub const MENU_ITEMS: &str = "menu-items";
    pub const CART: &str = "cart";
    pub const ORDERS: &str = "orders";
    pub const DELIVERY_CREW: &str = "delivery-crew";
}

/// Profile reads stay fresh for a minute
pub const PROFILE_TTL: Duration = Duration::from_secs(60);

/// Entry point for everything the front-end does with the backend
#[derive(Clone)]
pub struct LemonApi {
    client: ApiClient,
    session: Session,
    cache: QueryCache,
}

impl LemonApi {
    pub fn new(client: ApiClient, cache: QueryCache) -> Self {
        Self {
            session: Session::new(client.clone()),
            client,
            cache,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Cached read: serve `key` from the cache or fetch it with `request`
    async fn query<T: DeserializeOwned>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        request: ApiRequest,
    ) -> Result<T> {
        if let Some(value) = self.cache.get(key) {
            match serde_json::from_value(value) {
                Ok(decoded) => {
                    tracing::debug!(key = %key, "Query served from cache");
                    return Ok(decoded);
                }
                Err(e) => {
                    tracing::debug!(key = %key, error = %e, "Dropping undecodable cache entry");
                    self.cache.invalidate(key);
                }
            }
        }

        let value: Value = self
            .client
            .send_json(&request)
            .await
            .map_err(|e| self.forget_on_logout(e))?;
        let decoded = serde_json::from_value(value.clone()).map_err(|e| {
            ApiError::Decode(format!("{} {}: {}", request.method(), request.path(), e))
        })?;

        match ttl {
            Some(ttl) => self.cache.insert_with_ttl(key, value, ttl),
            None => self.cache.insert(key, value),
        }
        Ok(decoded)
    }

    /// Run a mutation and invalidate the affected queries once it succeeds
    async fn mutate<T: DeserializeOwned>(&self, request: ApiRequest, invalidates: &[&str]) -> Result<T> {
        let result = self
            .client
            .send_json(&request)
            .await
            .map_err(|e| self.forget_on_logout(e))?;
        self.invalidate(invalidates);
        Ok(result)
    }

    /// Mutation whose response body is ignored
    async fn mutate_empty(&self, request: ApiRequest, invalidates: &[&str]) -> Result<()> {
        self.client
            .send_empty(&request)
            .await
            .map_err(|e| self.forget_on_logout(e))?;
        self.invalidate(invalidates);
        Ok(())
    }

    /// A 401 that left no access token behind ends the session: drop every
    /// cached read so nothing from it outlives the credentials.
    fn forget_on_logout(&self, err: ApiError) -> ApiError {
        if err.is_unauthorized() && !matches!(self.session.is_authenticated(), Ok(true)) {
            tracing::info!("Session ended by the backend, clearing cached queries");
            self.cache.clear();
        }
        err
    }

    fn invalidate(&self, keys: &[&str]) {
        for key in keys {
            self.cache.invalidate(key);
        }
    }
}
