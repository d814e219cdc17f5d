//! Canonical domain types shared across the gateway.

mod interval;
mod models;
mod symbol;
mod timestamp;

pub use interval::{AssetCategory, Interval};
pub use models::{
    instrument_id, lookup_id, parse_symbols, Bar, HistoricalSeries, InstrumentRecord,
    LookupResult, LookupTotals, MarketDuration, MarketStatus, Session, Tick, ID_NAMESPACE,
};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
