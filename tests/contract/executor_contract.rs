//! Contract tests for the resilient executor.
//!
//! Every transport implementation plugged into the executor must see
//! the same recovery behavior: auth rejections trigger exactly one
//! session invalidation each, nothing else is ever retried, and the
//! session is reused across successful calls.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tickergate_core::{
    AuthRetryPolicy, Backoff, GatewayError, GatewayErrorKind, HttpClient, HttpError, HttpRequest,
    HttpResponse, Session, SessionAcquirer, SessionExecutor, SessionStore,
};

struct NumberedAcquirer {
    acquisitions: AtomicUsize,
}

impl NumberedAcquirer {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            acquisitions: AtomicUsize::new(0),
        })
    }

    fn count(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }
}

impl SessionAcquirer for NumberedAcquirer {
    fn acquire<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Session, GatewayError>> + Send + 'a>> {
        Box::pin(async move {
            let n = self.acquisitions.fetch_add(1, Ordering::SeqCst);
            Ok(Session::new(format!("crumb-{n}"), ""))
        })
    }
}

struct SequenceTransport {
    script: Mutex<Vec<Result<HttpResponse, HttpError>>>,
    calls: AtomicUsize,
}

impl SequenceTransport {
    fn new(script: Vec<Result<HttpResponse, HttpError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HttpClient for SequenceTransport {
    fn execute<'a>(
        &'a self,
        _request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .script
            .lock()
            .expect("script should not be poisoned")
            .remove(0);
        Box::pin(async move { next })
    }
}

fn executor_for(
    transport: Arc<SequenceTransport>,
    acquirer: Arc<NumberedAcquirer>,
    max_retries: u32,
) -> SessionExecutor {
    SessionExecutor::new(Arc::new(SessionStore::new(acquirer)), transport).with_policy(
        AuthRetryPolicy {
            max_retries,
            backoff: Backoff::Fixed {
                delay: Duration::from_millis(0),
            },
        },
    )
}

struct RecoveryCase {
    name: &'static str,
    rejection_status: u16,
}

/// Both statuses the upstream uses for stale credentials must drive
/// the same invalidate-and-retry path.
#[tokio::test]
async fn every_auth_rejection_status_triggers_recovery() {
    let cases = [
        RecoveryCase {
            name: "unauthorized",
            rejection_status: 401,
        },
        RecoveryCase {
            name: "masked_not_found",
            rejection_status: 404,
        },
    ];

    for case in cases {
        let acquirer = NumberedAcquirer::new();
        let transport = SequenceTransport::new(vec![
            Ok(HttpResponse::with_status(case.rejection_status, "")),
            Ok(HttpResponse::ok_json("{}")),
        ]);
        let executor = executor_for(transport.clone(), acquirer.clone(), 5);

        let response = executor
            .execute(|session| {
                HttpRequest::get(format!("https://api.test/data?crumb={}", session.token))
            })
            .await
            .unwrap_or_else(|error| panic!("case '{}': {error}", case.name));

        assert!(response.is_success(), "case '{}'", case.name);
        assert_eq!(transport.calls(), 2, "case '{}': one retry", case.name);
        assert_eq!(
            acquirer.count(),
            2,
            "case '{}': one re-acquisition",
            case.name
        );
    }
}

/// Statuses outside 401/404 are upstream failures, never credential
/// problems, and must not burn a session.
#[tokio::test]
async fn non_auth_statuses_never_trigger_recovery() {
    for status in [400, 429, 500, 502, 503] {
        let acquirer = NumberedAcquirer::new();
        let transport = SequenceTransport::new(vec![Ok(HttpResponse::with_status(status, ""))]);
        let executor = executor_for(transport.clone(), acquirer.clone(), 5);

        let error = executor
            .execute(|session| {
                HttpRequest::get(format!("https://api.test/data?crumb={}", session.token))
            })
            .await
            .expect_err("non-auth status must propagate");

        assert_eq!(error.kind(), GatewayErrorKind::Transport, "status {status}");
        assert_eq!(transport.calls(), 1, "status {status}: no retry");
        assert_eq!(acquirer.count(), 1, "status {status}: session kept");
    }
}

#[tokio::test]
async fn successful_calls_reuse_one_session() {
    let acquirer = NumberedAcquirer::new();
    let transport = SequenceTransport::new(vec![
        Ok(HttpResponse::ok_json("{}")),
        Ok(HttpResponse::ok_json("{}")),
        Ok(HttpResponse::ok_json("{}")),
    ]);
    let executor = executor_for(transport.clone(), acquirer.clone(), 5);

    let tokens = Mutex::new(Vec::new());
    for _ in 0..3 {
        executor
            .execute(|session| {
                tokens
                    .lock()
                    .expect("token log should not be poisoned")
                    .push(session.token.clone());
                HttpRequest::get("https://api.test/data")
            })
            .await
            .expect("success");
    }

    assert_eq!(acquirer.count(), 1, "one acquisition across all calls");
    let tokens = tokens.into_inner().expect("token log");
    assert!(tokens.iter().all(|token| token == "crumb-0"));
}

#[tokio::test]
async fn the_retry_cap_bounds_recovery_attempts() {
    let acquirer = NumberedAcquirer::new();
    let transport = SequenceTransport::new(
        (0..3)
            .map(|_| Ok(HttpResponse::with_status(401, "")))
            .collect(),
    );
    let executor = executor_for(transport.clone(), acquirer.clone(), 2);

    let error = executor
        .execute(|session| {
            HttpRequest::get(format!("https://api.test/data?crumb={}", session.token))
        })
        .await
        .expect_err("cap must trip");

    assert_eq!(error.kind(), GatewayErrorKind::Authentication);
    assert_eq!(transport.calls(), 3, "initial attempt plus two retries");
}
