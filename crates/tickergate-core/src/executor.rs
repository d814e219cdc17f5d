//! Resilient request executor for session-gated endpoints.

use std::sync::Arc;

use crate::http_client::{HttpClient, HttpRequest, HttpResponse};
use crate::retry::AuthRetryPolicy;
use crate::session::SessionStore;
use crate::{GatewayError, Session};

/// Wraps authenticated upstream calls with the invalidate-and-retry
/// policy driven by the [`SessionStore`].
///
/// Endpoints that do not require a session call the transport directly
/// and bypass this type entirely.
pub struct SessionExecutor {
    store: Arc<SessionStore>,
    http: Arc<dyn HttpClient>,
    policy: AuthRetryPolicy,
}

impl SessionExecutor {
    pub fn new(store: Arc<SessionStore>, http: Arc<dyn HttpClient>) -> Self {
        Self {
            store,
            http,
            policy: AuthRetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: AuthRetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Execute a session-parameterized request.
    ///
    /// An auth rejection (401/404 from an auth-required endpoint)
    /// invalidates the session and retries with a fresh one, up to
    /// the policy cap. Any other failure aborts immediately and
    /// propagates unchanged.
    pub async fn execute<F>(&self, build_request: F) -> Result<HttpResponse, GatewayError>
    where
        F: Fn(&Session) -> HttpRequest,
    {
        let mut attempt: u32 = 0;
        loop {
            let session = self.store.get_or_acquire().await?;
            let request = build_request(&session);
            let response = self
                .http
                .execute(request)
                .await
                .map_err(|e| GatewayError::transport(e.message().to_owned()))?;

            if response.is_auth_rejection() {
                self.store.invalidate().await;
                if attempt >= self.policy.max_retries {
                    return Err(GatewayError::authentication(format!(
                        "upstream kept rejecting credentials (status {}) after {} retries",
                        response.status, attempt
                    )));
                }
                tracing::debug!(
                    status = response.status,
                    attempt,
                    "auth rejected, re-acquiring session"
                );
                tokio::time::sleep(self.policy.delay_for_attempt(attempt)).await;
                attempt += 1;
                continue;
            }

            if !response.is_success() {
                return Err(GatewayError::transport(format!(
                    "upstream returned status {}",
                    response.status
                )));
            }

            return Ok(response);
        }
    }
}
