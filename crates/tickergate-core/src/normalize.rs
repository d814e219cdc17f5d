//! Pure mapping from heterogeneous upstream payload shapes into the
//! stable domain entities.
//!
//! One function per payload shape. Every mapping is idempotent and
//! tolerates absent fields; ids are rewritten through the fixed
//! namespace so normalizing the same raw payload twice yields
//! identical output.

use serde::Deserialize;

use crate::{
    instrument_id, Bar, GatewayError, HistoricalSeries, InstrumentRecord, Interval, LookupTotals,
    MarketDuration, MarketStatus, Tick,
};

/// Numeric field that arrives either as a plain number or wrapped in
/// the upstream's `{ "raw": ..., "fmt": ... }` envelope, depending on
/// the endpoint.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum RawNum {
    Plain(f64),
    Wrapped {
        #[serde(default)]
        raw: Option<f64>,
    },
}

impl RawNum {
    fn to_option(self) -> Option<f64> {
        match self {
            Self::Plain(value) => Some(value).filter(|v| v.is_finite()),
            Self::Wrapped { raw } => raw.filter(|v| v.is_finite()),
        }
    }
}

fn num(value: Option<RawNum>) -> Option<f64> {
    value.and_then(RawNum::to_option)
}

fn int(value: Option<RawNum>) -> Option<i64> {
    num(value).map(|v| v as i64)
}

// ---------------------------------------------------------------------------
// Quote snapshot / profile / lookup document
// ---------------------------------------------------------------------------

/// Instrument-shaped document as the upstream emits it across the
/// quote, quoteSummary price module, recommendation, and lookup
/// endpoints. Only `symbol` is guaranteed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawInstrument {
    pub symbol: String,
    pub quote_type: Option<String>,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub full_exchange_name: Option<String>,
    pub exchange: Option<String>,
    pub currency: Option<String>,
    pub market_state: Option<String>,
    pub regular_market_price: Option<RawNum>,
    pub regular_market_change: Option<RawNum>,
    pub regular_market_change_percent: Option<RawNum>,
    pub regular_market_time: Option<RawNum>,
    pub regular_market_volume: Option<RawNum>,
    pub market_cap: Option<RawNum>,
}

/// Map one upstream instrument document to the canonical record.
pub fn normalize_instrument(raw: &RawInstrument) -> InstrumentRecord {
    InstrumentRecord {
        id: instrument_id(&raw.symbol),
        symbol: raw.symbol.clone(),
        instrument_type: raw
            .quote_type
            .as_ref()
            .map(|value| value.to_ascii_uppercase()),
        short_name: raw.short_name.clone(),
        long_name: raw.long_name.clone(),
        exchange: raw
            .full_exchange_name
            .clone()
            .or_else(|| raw.exchange.clone()),
        currency: raw.currency.clone(),
        market_state: raw.market_state.clone(),
        market_price: num(raw.regular_market_price),
        market_change: num(raw.regular_market_change),
        market_change_percent: num(raw.regular_market_change_percent),
        market_time: int(raw.regular_market_time),
        market_cap: num(raw.market_cap),
        day_volume: int(raw.regular_market_volume),
    }
}

#[derive(Debug, Deserialize)]
pub struct QuoteEnvelope {
    #[serde(rename = "quoteResponse")]
    pub quote_response: QuoteResponseBody,
}

#[derive(Debug, Deserialize)]
pub struct QuoteResponseBody {
    #[serde(default)]
    pub result: Vec<RawInstrument>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

/// Map a quote snapshot response to instrument records.
pub fn normalize_quotes(envelope: &QuoteEnvelope) -> Vec<InstrumentRecord> {
    envelope
        .quote_response
        .result
        .iter()
        .map(normalize_instrument)
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct SummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    pub quote_summary: SummaryBody,
}

#[derive(Debug, Deserialize)]
pub struct SummaryBody {
    #[serde(default)]
    pub result: Vec<SummaryResult>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryResult {
    #[serde(default)]
    pub price: Option<RawInstrument>,
}

/// Map a quoteSummary response to the profile record. The price
/// module carries the instrument fields; its numerics arrive in the
/// wrapped form.
pub fn normalize_profile(envelope: &SummaryEnvelope) -> Result<InstrumentRecord, GatewayError> {
    let price = envelope
        .quote_summary
        .result
        .first()
        .and_then(|result| result.price.as_ref())
        .ok_or_else(|| GatewayError::transport("profile response carried no price module"))?;
    Ok(normalize_instrument(price))
}

// ---------------------------------------------------------------------------
// Historical series
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ChartEnvelope {
    pub chart: ChartBody,
}

#[derive(Debug, Deserialize)]
pub struct ChartBody {
    #[serde(default)]
    pub result: Vec<ChartResult>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Option<Vec<i64>>,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: String,
    #[serde(default)]
    pub instrument_type: Option<String>,
    #[serde(default)]
    pub exchange_name: Option<String>,
    #[serde(default)]
    pub price_hint: Option<i64>,
    #[serde(default)]
    pub data_granularity: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<ChartQuote>,
    #[serde(default)]
    pub adjclose: Option<Vec<ChartAdjClose>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChartQuote {
    pub open: Vec<Option<f64>>,
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
    pub close: Vec<Option<f64>>,
    pub volume: Vec<Option<i64>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChartAdjClose {
    pub adjclose: Vec<Option<f64>>,
}

/// Map a chart response to a historical series.
///
/// Bars keep the upstream's ascending timestamp order; the final raw
/// bar is always dropped because the current period may still be in
/// progress.
pub fn normalize_series(
    envelope: &ChartEnvelope,
    interval: Interval,
) -> Result<HistoricalSeries, GatewayError> {
    let result = envelope
        .chart
        .result
        .first()
        .ok_or_else(|| GatewayError::transport("chart response carried no result"))?;

    let timestamps = result.timestamp.as_deref().unwrap_or(&[]);
    let quote = result.indicators.quote.first();
    let adjclose = result
        .indicators
        .adjclose
        .as_ref()
        .and_then(|series| series.first());

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        bars.push(Bar {
            timestamp: ts,
            open: quote.and_then(|q| q.open.get(i).copied().flatten()),
            high: quote.and_then(|q| q.high.get(i).copied().flatten()),
            low: quote.and_then(|q| q.low.get(i).copied().flatten()),
            close: quote.and_then(|q| q.close.get(i).copied().flatten()),
            volume: quote.and_then(|q| q.volume.get(i).copied().flatten()),
            adj_close: adjclose.and_then(|a| a.adjclose.get(i).copied().flatten()),
        });
    }

    // The trailing bar covers the still-open period.
    bars.pop();

    let meta = &result.meta;
    Ok(HistoricalSeries {
        id: instrument_id(&meta.symbol),
        symbol: meta.symbol.clone(),
        instrument_type: meta.instrument_type.clone(),
        exchange: meta.exchange_name.clone(),
        price_hint: meta.price_hint,
        granularity: meta
            .data_granularity
            .clone()
            .unwrap_or_else(|| interval.granularity().to_owned()),
        interval,
        bars,
    })
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RecommendationsEnvelope {
    pub finance: RecommendationsBody,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationsBody {
    #[serde(default)]
    pub result: Vec<RecommendationsResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsResult {
    #[serde(default)]
    pub recommended_symbols: Vec<RawInstrument>,
}

/// Map a recommendations response to instrument records.
pub fn normalize_recommendations(envelope: &RecommendationsEnvelope) -> Vec<InstrumentRecord> {
    envelope
        .finance
        .result
        .first()
        .map(|result| {
            result
                .recommended_symbols
                .iter()
                .map(normalize_instrument)
                .collect()
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LookupTotalsEnvelope {
    pub finance: LookupTotalsBody,
}

#[derive(Debug, Deserialize)]
pub struct LookupTotalsBody {
    #[serde(default)]
    pub result: Vec<LookupTotalsResult>,
}

#[derive(Debug, Deserialize)]
pub struct LookupTotalsResult {
    #[serde(default)]
    pub totals: LookupTotals,
}

/// Extract the per-category totals from the lookup probe response.
pub fn normalize_lookup_totals(envelope: &LookupTotalsEnvelope) -> LookupTotals {
    envelope
        .finance
        .result
        .first()
        .map(|result| result.totals)
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
pub struct LookupDocumentsEnvelope {
    pub finance: LookupDocumentsBody,
}

#[derive(Debug, Deserialize)]
pub struct LookupDocumentsBody {
    #[serde(default)]
    pub result: Vec<LookupDocumentsResult>,
}

#[derive(Debug, Deserialize)]
pub struct LookupDocumentsResult {
    #[serde(default)]
    pub documents: Vec<RawInstrument>,
}

/// Map lookup documents to instrument records, deduplicated by id.
pub fn normalize_lookup_documents(envelope: &LookupDocumentsEnvelope) -> Vec<InstrumentRecord> {
    let documents = envelope
        .finance
        .result
        .first()
        .map(|result| result.documents.as_slice())
        .unwrap_or_default();

    let mut seen = std::collections::HashSet::new();
    documents
        .iter()
        .map(normalize_instrument)
        .filter(|record| seen.insert(record.id))
        .collect()
}

// ---------------------------------------------------------------------------
// Market status
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RawMarketStatus {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub open: Option<String>,
    #[serde(default)]
    pub close: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub duration: Option<Vec<RawMarketDuration>>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct RawMarketDuration {
    pub days: Option<i64>,
    pub hrs: Option<i64>,
    pub mins: Option<i64>,
}

/// Map the market-time response, defaulting every duration field to
/// absent when the upstream provides no duration entry.
pub fn normalize_market_status(raw: &RawMarketStatus) -> MarketStatus {
    let duration = raw
        .duration
        .as_ref()
        .and_then(|entries| entries.first())
        .map(|entry| MarketDuration {
            days: entry.days,
            hrs: entry.hrs,
            mins: entry.mins,
        })
        .unwrap_or_default();

    MarketStatus {
        market_id: raw.id.clone(),
        status: raw.status.clone(),
        message: raw.message.clone(),
        open: raw.open.clone(),
        close: raw.close.clone(),
        time: raw.time.clone(),
        duration,
    }
}

// ---------------------------------------------------------------------------
// Streaming ticks
// ---------------------------------------------------------------------------

/// Tick frame as the streaming upstream emits it: the symbol travels
/// in the `id` field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTick {
    pub id: String,
    pub price: Option<f64>,
    pub time: Option<i64>,
    pub day_volume: Option<i64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub market_hours: Option<String>,
    pub exchange: Option<String>,
}

/// Rewrite a raw tick into the canonical shape: `symbol` gets the
/// upstream id, `id` becomes the deterministic instrument id.
pub fn normalize_tick(raw: &RawTick) -> Tick {
    Tick {
        id: instrument_id(&raw.id),
        symbol: raw.id.clone(),
        price: raw.price,
        time: raw.time,
        day_volume: raw.day_volume,
        change: raw.change,
        change_percent: raw.change_percent,
        market_hours: raw.market_hours.clone(),
        exchange: raw.exchange.clone(),
    }
}
