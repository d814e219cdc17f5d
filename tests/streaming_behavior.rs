//! Behavior-driven tests for the streaming multiplexer.
//!
//! These verify channel isolation: every subscription owns its
//! upstream connection, ticks fan out only to their own channel, and
//! tearing one channel down never disturbs a sibling.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::Semaphore;

use tickergate_core::{
    instrument_id, EventBus, GatewayError, GatewayErrorKind, StreamMultiplexer, Symbol,
    TickConnection, TickSource,
};
use tickergate_tests::{parse_symbol, raw_tick, ScriptedTickSource};

fn mux_with(source: Arc<ScriptedTickSource>) -> StreamMultiplexer {
    StreamMultiplexer::new(source, Arc::new(EventBus::default()))
}

async fn wait_for_open_connections(source: &ScriptedTickSource, expected: usize) {
    for _ in 0..100 {
        if source.open_connections() == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!(
        "expected {expected} open connections, found {}",
        source.open_connections()
    );
}

#[tokio::test]
async fn each_subscription_opens_its_own_upstream_connection() {
    let source = Arc::new(ScriptedTickSource::new(vec![Vec::new(), Vec::new()]));
    let mux = mux_with(source.clone());

    let _alpha = mux
        .subscribe(vec![parse_symbol("XYZ")], "alpha")
        .await
        .expect("alpha subscribes");
    let _beta = mux
        .subscribe(vec![parse_symbol("XYZ")], "beta")
        .await
        .expect("beta subscribes");

    // Same symbol, yet no connection sharing
    assert_eq!(source.open_connections(), 2);
    assert_eq!(mux.channel_count(), 2);
}

#[tokio::test]
async fn ticks_fan_out_only_to_their_own_channel() {
    // Given: two channels watching the same symbol, with distinct
    // upstream feeds
    let source = Arc::new(ScriptedTickSource::new(vec![
        vec![raw_tick("XYZ", 10.0)],
        vec![raw_tick("XYZ", 20.0)],
    ]));
    let mux = mux_with(source);

    let alpha = mux
        .subscribe(vec![parse_symbol("XYZ")], "alpha")
        .await
        .expect("alpha subscribes");
    let beta = mux
        .subscribe(vec![parse_symbol("XYZ")], "beta")
        .await
        .expect("beta subscribes");

    let mut alpha_ticks = alpha.ticks();
    let mut beta_ticks = beta.ticks();

    // Then: each receiver observes its own connection's tick only
    let tick = alpha_ticks.recv().await.expect("alpha receives");
    assert_eq!(tick.price, Some(10.0));
    assert_eq!(tick.symbol, "XYZ");
    assert_eq!(tick.id, instrument_id("XYZ"));

    let tick = beta_ticks.recv().await.expect("beta receives");
    assert_eq!(tick.price, Some(20.0));
}

#[tokio::test]
async fn unsubscribing_one_channel_leaves_siblings_streaming() {
    let source = Arc::new(ScriptedTickSource::new(vec![
        Vec::new(),
        vec![raw_tick("XYZ", 31.0), raw_tick("XYZ", 32.0)],
    ]));
    let mux = mux_with(source.clone());

    let alpha = mux
        .subscribe(vec![parse_symbol("XYZ")], "alpha")
        .await
        .expect("alpha subscribes");
    let beta = mux
        .subscribe(vec![parse_symbol("XYZ")], "beta")
        .await
        .expect("beta subscribes");
    let mut beta_ticks = beta.ticks();
    let mut alpha_ticks = alpha.ticks();

    // When: alpha tears down
    alpha.unsubscribe();
    wait_for_open_connections(&source, 1).await;
    assert_eq!(mux.channel_count(), 1);

    // Then: alpha's receiver observes the close while beta keeps
    // streaming undisturbed
    loop {
        match alpha_ticks.recv().await {
            Err(RecvError::Closed) => break,
            Ok(_) | Err(RecvError::Lagged(_)) => {}
        }
    }

    let tick = beta_ticks.recv().await.expect("beta still receives");
    assert_eq!(tick.price, Some(31.0));
    let tick = beta_ticks.recv().await.expect("beta receives the next");
    assert_eq!(tick.price, Some(32.0));
}

#[tokio::test]
async fn dropping_the_handle_releases_the_channel() {
    let source = Arc::new(ScriptedTickSource::new(vec![Vec::new()]));
    let mux = mux_with(source.clone());

    {
        let _handle = mux
            .subscribe(vec![parse_symbol("XYZ")], "scoped")
            .await
            .expect("subscribes");
        assert_eq!(source.open_connections(), 1);
    }

    wait_for_open_connections(&source, 0).await;
    assert_eq!(mux.channel_count(), 0);
}

#[tokio::test]
async fn duplicate_channel_ids_are_rejected_without_a_new_connection() {
    let source = Arc::new(ScriptedTickSource::new(vec![Vec::new(), Vec::new()]));
    let mux = mux_with(source.clone());

    let _first = mux
        .subscribe(vec![parse_symbol("XYZ")], "alpha")
        .await
        .expect("first subscribes");

    let error = mux
        .subscribe(vec![parse_symbol("ABC")], "alpha")
        .await
        .expect_err("duplicate id must be rejected");

    assert_eq!(error.kind(), GatewayErrorKind::Validation);
    assert_eq!(source.open_connections(), 1);
    assert_eq!(mux.channel_count(), 1);
}

/// Source whose connect parks on a gate, so a subscribe can be held
/// mid-establishment while a rival races for the same channel id.
struct GatedTickSource {
    inner: Arc<ScriptedTickSource>,
    gate: Arc<Semaphore>,
}

impl TickSource for GatedTickSource {
    fn connect<'a>(
        &'a self,
        symbols: &'a [Symbol],
    ) -> Pin<Box<dyn Future<Output = Result<TickConnection, GatewayError>> + Send + 'a>> {
        Box::pin(async move {
            let permit = self
                .gate
                .acquire()
                .await
                .map_err(|_| GatewayError::transport("connect gate closed"))?;
            permit.forget();
            self.inner.connect(symbols).await
        })
    }
}

#[tokio::test]
async fn racing_subscribes_on_one_channel_id_admit_exactly_one() {
    // Given: a source slow enough that a second subscribe can arrive
    // while the first is still connecting
    let inner = Arc::new(ScriptedTickSource::new(vec![Vec::new(), Vec::new()]));
    let gate = Arc::new(Semaphore::new(0));
    let mux = Arc::new(StreamMultiplexer::new(
        Arc::new(GatedTickSource {
            inner: inner.clone(),
            gate: gate.clone(),
        }),
        Arc::new(EventBus::default()),
    ));

    // When: two callers race to subscribe with the same channel id
    let first = tokio::spawn({
        let mux = Arc::clone(&mux);
        async move { mux.subscribe(vec![parse_symbol("XYZ")], "dup").await }
    });
    let second = tokio::spawn({
        let mux = Arc::clone(&mux);
        async move { mux.subscribe(vec![parse_symbol("XYZ")], "dup").await }
    });

    // Let both reach the duplicate check before any connect finishes
    tokio::time::sleep(Duration::from_millis(10)).await;
    gate.add_permits(2);

    let mut winner = None;
    let mut loser = None;
    for outcome in [
        first.await.expect("task should not panic"),
        second.await.expect("task should not panic"),
    ] {
        match outcome {
            Ok(handle) => winner = Some(handle),
            Err(error) => loser = Some(error),
        }
    }

    // Then: exactly one caller owns the channel; the loser is turned
    // away with a validation error and no second connection exists
    let _winner = winner.expect("one subscribe must win");
    let error = loser.expect("one subscribe must lose");
    assert_eq!(error.kind(), GatewayErrorKind::Validation);

    assert_eq!(mux.channel_count(), 1);
    assert_eq!(inner.open_connections(), 1);
}

#[tokio::test]
async fn empty_subscriptions_are_rejected_before_connecting() {
    let source = Arc::new(ScriptedTickSource::new(Vec::new()));
    let mux = mux_with(source.clone());

    let error = mux
        .subscribe(Vec::new(), "alpha")
        .await
        .expect_err("empty symbol set");
    assert_eq!(error.kind(), GatewayErrorKind::Validation);

    let error = mux
        .subscribe(vec![parse_symbol("XYZ")], "  ")
        .await
        .expect_err("blank channel id");
    assert_eq!(error.kind(), GatewayErrorKind::Validation);

    assert_eq!(source.open_connections(), 0);
    assert_eq!(mux.channel_count(), 0);
}

#[tokio::test]
async fn connect_failures_surface_synchronously_from_subscribe() {
    // The scripted source has no connection to hand out
    let source = Arc::new(ScriptedTickSource::new(Vec::new()));
    let mux = mux_with(source);

    let error = mux
        .subscribe(vec![parse_symbol("XYZ")], "alpha")
        .await
        .expect_err("connect failure must surface");

    assert_eq!(error.kind(), GatewayErrorKind::Transport);
    assert_eq!(mux.channel_count(), 0);
}
