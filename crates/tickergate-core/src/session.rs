//! Session lifecycle: lazily acquired, reactively invalidated.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::http_client::{HttpClient, HttpRequest};
use crate::{GatewayError, Session};

/// Collaborator that mints a fresh session, typically by driving a
/// headless browser through the upstream consent flow. Acquisition
/// failures are surfaced as [`GatewayError::auth_acquisition`] and
/// never retried by the store.
pub trait SessionAcquirer: Send + Sync {
    fn acquire<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Session, GatewayError>> + Send + 'a>>;
}

/// Process-wide holder of the single live session.
///
/// The slot is an async mutex held across the acquisition await, which
/// gives single-flight for free: while one caller is acquiring, every
/// concurrent `get_or_acquire` parks on the lock and then reads the
/// freshly stored session.
pub struct SessionStore {
    acquirer: Arc<dyn SessionAcquirer>,
    slot: Mutex<Option<Arc<Session>>>,
}

impl SessionStore {
    pub fn new(acquirer: Arc<dyn SessionAcquirer>) -> Self {
        Self {
            acquirer,
            slot: Mutex::new(None),
        }
    }

    /// Return the current session, acquiring one if none exists.
    ///
    /// Callers receive an immutable snapshot; sessions change by
    /// replacement only.
    pub async fn get_or_acquire(&self) -> Result<Arc<Session>, GatewayError> {
        let mut slot = self.slot.lock().await;
        if let Some(session) = slot.as_ref() {
            return Ok(Arc::clone(session));
        }

        tracing::debug!("acquiring upstream session");
        let session = Arc::new(self.acquirer.acquire().await?);
        tracing::debug!(acquired_at = %session.acquired_at, "session acquired");
        *slot = Some(Arc::clone(&session));
        Ok(session)
    }

    /// Discard the current session so the next `get_or_acquire`
    /// re-acquires. Reactive only; there is no expiry timer.
    pub async fn invalidate(&self) {
        let mut slot = self.slot.lock().await;
        if slot.take().is_some() {
            tracing::debug!("session invalidated");
        }
    }
}

/// Production acquirer: seeds the upstream cookie jar with one plain
/// request, then asks the token endpoint for the crumb that must
/// accompany every authenticated call. The transport is expected to
/// own a cookie store, so the session itself carries no cookie header.
pub struct CrumbSessionAcquirer {
    http: Arc<dyn HttpClient>,
    cookie_seed_url: String,
    crumb_url: String,
}

impl CrumbSessionAcquirer {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            cookie_seed_url: String::from("https://fc.yahoo.com"),
            crumb_url: String::from("https://query1.finance.yahoo.com/v1/test/getcrumb"),
        }
    }

    pub fn with_urls(
        mut self,
        cookie_seed_url: impl Into<String>,
        crumb_url: impl Into<String>,
    ) -> Self {
        self.cookie_seed_url = cookie_seed_url.into();
        self.crumb_url = crumb_url.into();
        self
    }
}

impl SessionAcquirer for CrumbSessionAcquirer {
    fn acquire<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Session, GatewayError>> + Send + 'a>> {
        Box::pin(async move {
            // The seed endpoint answers 404 while still setting the
            // cookies the crumb endpoint requires.
            self.http
                .execute(HttpRequest::get(&self.cookie_seed_url))
                .await
                .map_err(|e| {
                    GatewayError::auth_acquisition(format!("cookie seed failed: {e}"))
                })?;

            let response = self
                .http
                .execute(HttpRequest::get(&self.crumb_url))
                .await
                .map_err(|e| {
                    GatewayError::auth_acquisition(format!("crumb request failed: {e}"))
                })?;

            if !response.is_success() {
                return Err(GatewayError::auth_acquisition(format!(
                    "crumb endpoint returned status {}",
                    response.status
                )));
            }

            let token = response.body.trim().to_owned();
            if token.is_empty() || token.contains("Too Many Requests") {
                return Err(GatewayError::auth_acquisition(
                    "crumb endpoint returned no usable token",
                ));
            }

            Ok(Session::new(token, ""))
        })
    }
}
