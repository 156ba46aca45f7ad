// Token refresh logic

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use reqwest::Client;
use tokio::sync::Mutex;

use super::types::{RefreshRequest, RefreshResponse};
use crate::error::{ApiError, Result};
use crate::request::ApiRequest;

/// Refresh endpoint path
pub const REFRESH_PATH: &str = "/auth/jwt/refresh/";

/// Outcome shared by every waiter of one refresh: the new access token, or
/// the reason the refresh failed.
pub type RefreshOutcome = std::result::Result<String, String>;

type SharedRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

/// What a caller found when it reached the empty slot
pub enum RefreshStart {
    /// A refresh already settled and stored this token; use it as is
    Current(String),
    /// Nothing usable is stored; run this refresh
    Refresh(BoxFuture<'static, RefreshOutcome>),
}

/// Single-slot holder for the in-flight refresh.
///
/// The slot is filled when a refresh starts and emptied by the refresh itself
/// right before it settles, so every caller that joins during that window
/// observes the same outcome.
#[derive(Default)]
pub struct RefreshSlot {
    inflight: Arc<Mutex<Option<SharedRefresh>>>,
}

impl RefreshSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the in-flight refresh, or consult `start` if the slot is empty.
    ///
    /// `start` runs while the slot lock is held, so a refresh that settles
    /// concurrently is either joined here or already visible to `start`.
    pub async fn run<F>(&self, start: F) -> RefreshOutcome
    where
        F: FnOnce() -> std::result::Result<RefreshStart, String>,
    {
        let shared = {
            let mut slot = self.inflight.lock().await;
            match slot.as_ref() {
                Some(existing) => {
                    tracing::debug!("Joining in-flight token refresh");
                    existing.clone()
                }
                None => {
                    let refresh = match start()? {
                        RefreshStart::Current(token) => return Ok(token),
                        RefreshStart::Refresh(refresh) => refresh,
                    };
                    tracing::debug!("Starting token refresh");
                    let inflight = Arc::clone(&self.inflight);
                    let shared = async move {
                        let outcome = refresh.await;
                        inflight.lock().await.take();
                        outcome
                    }
                    .boxed()
                    .shared();
                    *slot = Some(shared.clone());
                    shared
                }
            }
        };

        shared.await
    }

    /// True when no refresh is in flight
    pub async fn is_idle(&self) -> bool {
        self.inflight.lock().await.is_none()
    }
}

/// Exchange a refresh token for a new access token.
///
/// Sent without a bearer credential and outside the recovery pipeline.
pub async fn request_access_token(
    client: &Client,
    base_url: &str,
    refresh_token: &str,
) -> Result<String> {
    let request = ApiRequest::post(REFRESH_PATH)
        .json(&RefreshRequest {
            refresh: refresh_token,
        })?
        .build(client, base_url, None)?;

    let response = client.execute(request).await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Status { status, body });
    }

    let data: RefreshResponse = response
        .json()
        .await
        .map_err(|e| ApiError::Decode(format!("Failed to parse refresh response: {}", e)))?;

    if data.access.is_empty() {
        return Err(ApiError::Decode(
            "Refresh response does not contain an access token".to_string(),
        ));
    }

    tracing::info!("Access token refreshed");
    Ok(data.access)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio_test::{assert_pending, assert_ready, task};

    type StartResult = std::result::Result<RefreshStart, String>;

    fn counting_refresh(
        calls: &Arc<AtomicUsize>,
        outcome: RefreshOutcome,
    ) -> impl FnOnce() -> StartResult {
        let calls = Arc::clone(calls);
        move || {
            Ok(RefreshStart::Refresh(
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    outcome
                }
                .boxed(),
            ))
        }
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_refresh() {
        let slot = Arc::new(RefreshSlot::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let slot = Arc::clone(&slot);
            let start = counting_refresh(&calls, Ok("A2".to_string()));
            handles.push(tokio::spawn(async move { slot.run(start).await }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Ok("A2".to_string()));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(slot.is_idle().await);
    }

    #[tokio::test]
    async fn test_failure_is_shared_and_slot_cleared() {
        let slot = Arc::new(RefreshSlot::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let (a, b) = tokio::join!(
            slot.run(counting_refresh(&calls, Err("expired".to_string()))),
            slot.run(counting_refresh(&calls, Err("unused".to_string()))),
        );
        assert_eq!(a, Err("expired".to_string()));
        assert_eq!(b, Err("expired".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(slot.is_idle().await);
    }

    #[tokio::test]
    async fn test_new_refresh_after_settle() {
        let slot = RefreshSlot::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let first = slot.run(counting_refresh(&calls, Ok("A2".to_string()))).await;
        let second = slot.run(counting_refresh(&calls, Ok("A3".to_string()))).await;

        assert_eq!(first, Ok("A2".to_string()));
        assert_eq!(second, Ok("A3".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_joiner_waits_for_inflight_refresh() {
        let slot = RefreshSlot::new();
        let (tx, rx) = tokio::sync::oneshot::channel::<String>();

        let mut first = task::spawn(slot.run(move || {
            Ok(RefreshStart::Refresh(
                async move { rx.await.map_err(|e| e.to_string()) }.boxed(),
            ))
        }));
        assert_pending!(first.poll());

        let mut second = task::spawn(slot.run(|| -> StartResult {
            Err("second caller started its own refresh".to_string())
        }));
        assert_pending!(second.poll());

        tx.send("A2".to_string()).unwrap();
        assert_eq!(assert_ready!(first.poll()), Ok("A2".to_string()));
        assert_eq!(assert_ready!(second.poll()), Ok("A2".to_string()));
        assert!(tokio_test::block_on(slot.is_idle()));
    }

    #[test]
    fn test_current_token_skips_refresh() {
        let slot = RefreshSlot::new();
        let outcome = tokio_test::block_on(
            slot.run(|| Ok(RefreshStart::Current("A2".to_string()))),
        );
        assert_eq!(outcome, Ok("A2".to_string()));
        assert!(tokio_test::block_on(slot.is_idle()));
    }

    #[test]
    fn test_start_error_leaves_slot_empty() {
        let slot = RefreshSlot::new();
        let outcome =
            tokio_test::block_on(slot.run(|| -> StartResult { Err("store unavailable".to_string()) }));
        assert_eq!(outcome, Err("store unavailable".to_string()));
        assert!(tokio_test::block_on(slot.is_idle()));
    }
}
