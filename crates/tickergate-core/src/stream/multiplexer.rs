//! Per-subscription streaming fan-out.
//!
//! Every subscribe call opens its own upstream connection and pumps
//! normalized ticks onto the event bus under the caller's channel id.
//! Channels never share connections, so tearing one down cannot
//! silence a sibling.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::normalize::{normalize_tick, RawTick};
use crate::stream::EventBus;
use crate::{GatewayError, Symbol, Tick, ValidationError};

/// Collaborator that opens one upstream streaming connection scoped
/// to a symbol set. Dropping the returned connection releases the
/// upstream resource.
pub trait TickSource: Send + Sync {
    fn connect<'a>(
        &'a self,
        symbols: &'a [Symbol],
    ) -> Pin<Box<dyn Future<Output = Result<TickConnection, GatewayError>> + Send + 'a>>;
}

/// Owned upstream streaming connection: a raw tick feed plus an
/// optional guard whose drop tears the transport down.
pub struct TickConnection {
    ticks: mpsc::Receiver<RawTick>,
    _guard: Option<Box<dyn Any + Send>>,
}

impl TickConnection {
    pub fn new(ticks: mpsc::Receiver<RawTick>) -> Self {
        Self {
            ticks,
            _guard: None,
        }
    }

    /// Attach a teardown guard owned for the connection's lifetime.
    pub fn with_guard(mut self, guard: impl Any + Send + 'static) -> Self {
        self._guard = Some(Box::new(guard));
        self
    }

    /// Await the next raw tick; `None` means the upstream closed.
    pub async fn next_tick(&mut self) -> Option<RawTick> {
        self.ticks.recv().await
    }
}

enum ChannelEntry {
    /// Id is reserved while the upstream connection is established;
    /// a racing subscribe with the same id fails the duplicate check
    /// instead of opening a second connection.
    Connecting,
    Live { pump: JoinHandle<()> },
}

struct MuxInner {
    source: Arc<dyn TickSource>,
    bus: Arc<EventBus>,
    channels: Mutex<HashMap<String, ChannelEntry>>,
}

impl MuxInner {
    fn release(&self, channel_id: &str) {
        let entry = self
            .channels
            .lock()
            .expect("channel map should not be poisoned")
            .remove(channel_id);

        if let Some(ChannelEntry::Live { pump }) = entry {
            // Aborting the pump drops the connection it owns, which
            // releases the upstream resource on every exit path.
            pump.abort();
            self.bus.remove_topic(channel_id);
            tracing::debug!(channel = channel_id, "stream channel closed");
        }
    }
}

/// Fan-out multiplexer over independent per-caller channels.
pub struct StreamMultiplexer {
    inner: Arc<MuxInner>,
}

impl StreamMultiplexer {
    pub fn new(source: Arc<dyn TickSource>, bus: Arc<EventBus>) -> Self {
        Self {
            inner: Arc::new(MuxInner {
                source,
                bus,
                channels: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Open a dedicated channel for the given symbols.
    ///
    /// Connection-establishment failures return synchronously from
    /// this call. The returned handle owns the channel: dropping it
    /// (or calling [`ChannelHandle::unsubscribe`]) tears down exactly
    /// this channel's connection and topic.
    pub async fn subscribe(
        &self,
        symbols: Vec<Symbol>,
        channel_id: &str,
    ) -> Result<ChannelHandle, GatewayError> {
        if channel_id.trim().is_empty() {
            return Err(ValidationError::EmptyChannelId.into());
        }
        if symbols.is_empty() {
            return Err(ValidationError::EmptySymbolSet.into());
        }
        {
            // Reserve the id before awaiting the connect, so a racing
            // subscribe with the same id is rejected rather than
            // doubling up on one map entry.
            let mut channels = self
                .inner
                .channels
                .lock()
                .expect("channel map should not be poisoned");
            if channels.contains_key(channel_id) {
                return Err(ValidationError::DuplicateChannelId {
                    channel_id: channel_id.to_owned(),
                }
                .into());
            }
            channels.insert(channel_id.to_owned(), ChannelEntry::Connecting);
        }

        let mut connection = match self.inner.source.connect(&symbols).await {
            Ok(connection) => connection,
            Err(error) => {
                self.inner
                    .channels
                    .lock()
                    .expect("channel map should not be poisoned")
                    .remove(channel_id);
                return Err(error);
            }
        };

        tracing::debug!(channel = channel_id, symbols = symbols.len(), "stream channel opened");

        let bus = Arc::clone(&self.inner.bus);
        let topic = channel_id.to_owned();
        let pump = tokio::spawn(async move {
            while let Some(raw) = connection.next_tick().await {
                bus.publish(&topic, normalize_tick(&raw));
            }
            tracing::debug!(channel = %topic, "upstream stream ended");
        });

        self.inner
            .channels
            .lock()
            .expect("channel map should not be poisoned")
            .insert(channel_id.to_owned(), ChannelEntry::Live { pump });

        Ok(ChannelHandle {
            channel_id: channel_id.to_owned(),
            inner: Arc::clone(&self.inner),
        })
    }

    /// Number of live channels (for introspection and tests).
    pub fn channel_count(&self) -> usize {
        self.inner
            .channels
            .lock()
            .expect("channel map should not be poisoned")
            .len()
    }
}

/// Owned handle to one streaming channel.
pub struct ChannelHandle {
    channel_id: String,
    inner: Arc<MuxInner>,
}

impl std::fmt::Debug for ChannelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelHandle")
            .field("channel_id", &self.channel_id)
            .finish_non_exhaustive()
    }
}

impl ChannelHandle {
    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Receiver for this channel's normalized ticks, in upstream
    /// arrival order.
    pub fn ticks(&self) -> broadcast::Receiver<Tick> {
        self.inner.bus.subscribe(&self.channel_id)
    }

    /// Tear down this channel. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {}
}

impl Drop for ChannelHandle {
    fn drop(&mut self) {
        self.inner.release(&self.channel_id);
    }
}
