//! Core gateway operations exposed to the query-surface layer.

use std::sync::Arc;

use crate::http_client::{HttpClient, HttpRequest, HttpResponse};
use crate::normalize::{
    normalize_lookup_documents, normalize_lookup_totals, normalize_market_status,
    normalize_profile, normalize_quotes, normalize_recommendations, normalize_series,
    ChartEnvelope, LookupDocumentsEnvelope, LookupTotalsEnvelope, QuoteEnvelope, RawMarketStatus,
    RecommendationsEnvelope, SummaryEnvelope,
};
use crate::retry::AuthRetryPolicy;
use crate::session::{SessionAcquirer, SessionStore};
use crate::{
    lookup_id, AssetCategory, GatewayError, HistoricalSeries, InstrumentRecord, Interval,
    LookupResult, MarketStatus, SessionExecutor, Symbol, ValidationError,
};

/// Upper bound on documents requested in the second lookup step.
const LOOKUP_FETCH_CAP: u64 = 500;

/// Modules requested from the profile endpoint.
const PROFILE_MODULES: &str = "assetProfile,price,summaryDetail,recommendationTrend";

/// Static endpoint and policy configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL for the query API family (v1/v6/v7/v8/v10 paths).
    pub query_base_url: String,
    /// Absolute URL of the market-time resource.
    pub market_time_url: String,
    pub retry: AuthRetryPolicy,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            query_base_url: String::from("https://query1.finance.yahoo.com"),
            market_time_url: String::from(
                "https://finance.yahoo.com/_finance_doubledown/api/resource/finance.market-time",
            ),
            retry: AuthRetryPolicy::default(),
        }
    }
}

/// Facade over the session store, executor, and normalizer.
///
/// Authenticated operations go through the [`SessionExecutor`];
/// unauthenticated ones call the transport directly.
pub struct MarketGateway {
    http: Arc<dyn HttpClient>,
    executor: SessionExecutor,
    config: GatewayConfig,
}

impl MarketGateway {
    pub fn new(
        http: Arc<dyn HttpClient>,
        acquirer: Arc<dyn SessionAcquirer>,
        config: GatewayConfig,
    ) -> Self {
        let store = Arc::new(SessionStore::new(acquirer));
        let executor =
            SessionExecutor::new(store, Arc::clone(&http)).with_policy(config.retry.clone());
        Self {
            http,
            executor,
            config,
        }
    }

    /// Snapshot quotes for a set of symbols. Authenticated.
    pub async fn get_quotes(
        &self,
        symbols: &[Symbol],
    ) -> Result<Vec<InstrumentRecord>, GatewayError> {
        if symbols.is_empty() {
            return Err(ValidationError::EmptySymbolSet.into());
        }

        let joined = symbols
            .iter()
            .map(Symbol::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let base = &self.config.query_base_url;

        let response = self
            .executor
            .execute(|session| {
                let url = format!(
                    "{base}/v7/finance/quote?symbols={}&crumb={}",
                    urlencoding::encode(&joined),
                    urlencoding::encode(&session.token)
                );
                HttpRequest::get(url).with_session(session)
            })
            .await?;

        let envelope: QuoteEnvelope = serde_json::from_str(&response.body)?;
        Ok(normalize_quotes(&envelope))
    }

    /// Extended profile record for one symbol. Authenticated.
    pub async fn get_profile(&self, symbol: &Symbol) -> Result<InstrumentRecord, GatewayError> {
        let base = &self.config.query_base_url;

        let response = self
            .executor
            .execute(|session| {
                let url = format!(
                    "{base}/v10/finance/quoteSummary/{}?modules={PROFILE_MODULES}&crumb={}",
                    urlencoding::encode(symbol.as_str()),
                    urlencoding::encode(&session.token)
                );
                HttpRequest::get(url).with_session(session)
            })
            .await?;

        let envelope: SummaryEnvelope = serde_json::from_str(&response.body)?;
        normalize_profile(&envelope)
    }

    /// Historical bar series at the requested interval.
    /// Unauthenticated.
    pub async fn get_historical_series(
        &self,
        symbol: &Symbol,
        interval: Interval,
    ) -> Result<HistoricalSeries, GatewayError> {
        let url = format!(
            "{}/v8/finance/chart/{}?interval={}&range={}",
            self.config.query_base_url,
            urlencoding::encode(symbol.as_str()),
            interval.granularity(),
            interval.range()
        );

        let response = self.get_unauthenticated(&url).await?;
        let envelope: ChartEnvelope = serde_json::from_str(&response.body)?;
        normalize_series(&envelope, interval)
    }

    /// Symbols related to the given one. Unauthenticated.
    pub async fn get_recommendations(
        &self,
        symbol: &Symbol,
    ) -> Result<Vec<InstrumentRecord>, GatewayError> {
        let url = format!(
            "{}/v6/finance/recommendationsbysymbol/{}",
            self.config.query_base_url,
            urlencoding::encode(symbol.as_str())
        );

        let response = self.get_unauthenticated(&url).await?;
        let envelope: RecommendationsEnvelope = serde_json::from_str(&response.body)?;
        Ok(normalize_recommendations(&envelope))
    }

    /// Two-step instrument search. Unauthenticated.
    ///
    /// An empty query short-circuits without touching the upstream.
    /// Otherwise the totals probe runs first; the bounded document
    /// fetch only happens when the requested category has matches.
    pub async fn lookup(
        &self,
        query: &str,
        category: AssetCategory,
    ) -> Result<LookupResult, GatewayError> {
        let query = query.trim();
        let id = lookup_id(query, category.as_str());

        if query.is_empty() {
            return Ok(LookupResult {
                id,
                totals: Default::default(),
                quotes: Vec::new(),
            });
        }

        let totals_url = format!(
            "{}/v1/finance/lookup/totals?query={}",
            self.config.query_base_url,
            urlencoding::encode(query)
        );
        let response = self.get_unauthenticated(&totals_url).await?;
        let totals_envelope: LookupTotalsEnvelope = serde_json::from_str(&response.body)?;
        let totals = normalize_lookup_totals(&totals_envelope);

        let total = totals.for_category(category);
        if total == 0 {
            return Ok(LookupResult {
                id,
                totals,
                quotes: Vec::new(),
            });
        }

        let documents_url = format!(
            "{}/v1/finance/lookup?query={}&type={}&count={}",
            self.config.query_base_url,
            urlencoding::encode(query),
            category.as_str(),
            total.min(LOOKUP_FETCH_CAP)
        );
        let response = self.get_unauthenticated(&documents_url).await?;
        let documents_envelope: LookupDocumentsEnvelope = serde_json::from_str(&response.body)?;

        Ok(LookupResult {
            id,
            totals,
            quotes: normalize_lookup_documents(&documents_envelope),
        })
    }

    /// Current market open/close status. Unauthenticated.
    pub async fn get_market_status(&self) -> Result<MarketStatus, GatewayError> {
        let response = self
            .get_unauthenticated(&self.config.market_time_url)
            .await?;
        let raw: RawMarketStatus = serde_json::from_str(&response.body)?;
        Ok(normalize_market_status(&raw))
    }

    async fn get_unauthenticated(&self, url: &str) -> Result<HttpResponse, GatewayError> {
        let response = self
            .http
            .execute(HttpRequest::get(url))
            .await
            .map_err(|e| GatewayError::transport(e.message().to_owned()))?;

        if !response.is_success() {
            return Err(GatewayError::transport(format!(
                "upstream returned status {}",
                response.status
            )));
        }

        Ok(response)
    }
}
