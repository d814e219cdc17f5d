//! # tickergate-core
//!
//! Core of the tickergate market-data gateway: the authenticated
//! session lifecycle, the resilient request executor, the payload
//! normalizer, and the streaming fan-out multiplexer.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`domain`] | Canonical entities (records, series, ticks, symbols) |
//! | [`error`] | Error taxonomy and validation errors |
//! | [`executor`] | Invalidate-and-retry wrapper for authenticated calls |
//! | [`gateway`] | The operations exposed to the query-surface layer |
//! | [`http_client`] | Transport abstraction and reqwest implementation |
//! | [`normalize`] | Pure upstream-payload mapping |
//! | [`retry`] | Backoff policy between auth retries |
//! | [`session`] | Session store and acquirer contract |
//! | [`stream`] | Event bus, multiplexer, websocket tick source |
//!
//! ## Architecture
//!
//! ```text
//! caller ──► MarketGateway ──► SessionExecutor ──► HttpClient
//!                 │                   │
//!                 │                   └─► SessionStore ─► SessionAcquirer
//!                 └─► normalize ─► domain entities
//!
//! caller ──► StreamMultiplexer ──► TickSource (one connection per channel)
//!                 └─► EventBus topics (topic == channel id)
//! ```
//!
//! Only authentication failures are recovered internally (session
//! invalidation plus a capped retry); every other failure kind
//! surfaces to the caller unchanged.

pub mod domain;
pub mod error;
pub mod executor;
pub mod gateway;
pub mod http_client;
pub mod normalize;
pub mod retry;
pub mod session;
pub mod stream;

pub use domain::{
    instrument_id, lookup_id, parse_symbols, AssetCategory, Bar, HistoricalSeries,
    InstrumentRecord, Interval, LookupResult, LookupTotals, MarketDuration, MarketStatus, Session,
    Symbol, Tick, UtcDateTime, ID_NAMESPACE,
};
pub use error::{GatewayError, GatewayErrorKind, ValidationError};
pub use executor::SessionExecutor;
pub use gateway::{GatewayConfig, MarketGateway};
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use retry::{AuthRetryPolicy, Backoff};
pub use session::{CrumbSessionAcquirer, SessionAcquirer, SessionStore};
pub use stream::{
    ChannelHandle, EventBus, StreamMultiplexer, TickConnection, TickSource, WebSocketTickSource,
};
