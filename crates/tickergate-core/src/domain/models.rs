use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Interval, Symbol, UtcDateTime};

/// Fixed namespace for deterministic instrument identifiers.
///
/// Every id the gateway emits is a v5 UUID of this namespace and the
/// symbol (or lookup key), so the same input always yields the same
/// id across calls and process restarts.
pub const ID_NAMESPACE: Uuid = Uuid::from_bytes([
    0x8f, 0x2d, 0x1c, 0x5a, 0x63, 0x4b, 0x4e, 0x9d, 0xa1, 0x7e, 0x42, 0x98, 0x0c, 0x55, 0xb6,
    0x31,
]);

/// Deterministic id for an instrument symbol.
pub fn instrument_id(symbol: &str) -> Uuid {
    Uuid::new_v5(&ID_NAMESPACE, symbol.as_bytes())
}

/// Deterministic id for a lookup result, keyed on query and category.
pub fn lookup_id(query: &str, category: &str) -> Uuid {
    Uuid::new_v5(&ID_NAMESPACE, format!("{query}_{category}").as_bytes())
}

/// Normalized instrument snapshot.
///
/// Upstream payload shapes vary by instrument type, so everything
/// beyond `id` and `symbol` is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentRecord {
    pub id: Uuid,
    pub symbol: String,
    /// Uppercased instrument type (EQUITY, ETF, CRYPTOCURRENCY, ...).
    pub instrument_type: Option<String>,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub exchange: Option<String>,
    pub currency: Option<String>,
    pub market_state: Option<String>,
    pub market_price: Option<f64>,
    pub market_change: Option<f64>,
    pub market_change_percent: Option<f64>,
    pub market_time: Option<i64>,
    pub market_cap: Option<f64>,
    pub day_volume: Option<i64>,
}

/// One OHLCV bar. Value fields may be absent for some instrument
/// types or in-progress periods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Unix seconds, UTC.
    pub timestamp: i64,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<i64>,
    pub adj_close: Option<f64>,
}

/// Historical bar series, ascending by timestamp, with the trailing
/// (possibly partial) upstream bar already dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSeries {
    pub id: Uuid,
    pub symbol: String,
    pub instrument_type: Option<String>,
    pub exchange: Option<String>,
    pub price_hint: Option<i64>,
    pub granularity: String,
    pub interval: Interval,
    pub bars: Vec<Bar>,
}

/// Per-category match counts from the lookup totals probe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupTotals {
    #[serde(default)]
    pub all: u64,
    #[serde(default)]
    pub equity: u64,
    #[serde(default)]
    pub index: u64,
    #[serde(default)]
    pub future: u64,
    #[serde(default)]
    pub mutualfund: u64,
    #[serde(default)]
    pub etf: u64,
    #[serde(default)]
    pub currency: u64,
    #[serde(default)]
    pub cryptocurrency: u64,
}

impl LookupTotals {
    pub const fn for_category(&self, category: crate::AssetCategory) -> u64 {
        use crate::AssetCategory as C;
        match category {
            C::All => self.all,
            C::Equity => self.equity,
            C::Index => self.index,
            C::Future => self.future,
            C::MutualFund => self.mutualfund,
            C::Etf => self.etf,
            C::Currency => self.currency,
            C::CryptoCurrency => self.cryptocurrency,
        }
    }
}

/// Result of a lookup/search operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupResult {
    pub id: Uuid,
    pub totals: LookupTotals,
    /// Deduplicated by id.
    pub quotes: Vec<InstrumentRecord>,
}

/// Time remaining until the next market state change. Each field is
/// absent when the upstream provides no duration entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketDuration {
    pub days: Option<i64>,
    pub hrs: Option<i64>,
    pub mins: Option<i64>,
}

/// Current market open/close status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketStatus {
    pub market_id: Option<String>,
    pub status: Option<String>,
    pub message: Option<String>,
    pub open: Option<String>,
    pub close: Option<String>,
    pub time: Option<String>,
    pub duration: MarketDuration,
}

/// Normalized streaming price update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub id: Uuid,
    pub symbol: String,
    pub price: Option<f64>,
    /// Upstream event time, unix milliseconds.
    pub time: Option<i64>,
    pub day_volume: Option<i64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub market_hours: Option<String>,
    pub exchange: Option<String>,
}

/// Session credentials for authenticated upstream endpoints.
///
/// Replaced wholesale on invalidation, never patched in place; holders
/// only ever see an immutable snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The browser-minted token appended to authenticated requests.
    pub token: String,
    /// Opaque cookie header paired with the token.
    pub cookie_header: String,
    pub acquired_at: UtcDateTime,
}

impl Session {
    pub fn new(token: impl Into<String>, cookie_header: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            cookie_header: cookie_header.into(),
            acquired_at: UtcDateTime::now(),
        }
    }
}

/// Convenience parse for a list of raw symbol strings.
pub fn parse_symbols(raw: &[String]) -> Result<Vec<Symbol>, crate::ValidationError> {
    raw.iter().map(|value| Symbol::parse(value)).collect()
}
