//! CLI argument definitions for tickergate.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `quote` | Snapshot quotes for one or more symbols |
//! | `profile` | Extended profile record for a symbol |
//! | `history` | Historical bar series at a named interval |
//! | `recommend` | Symbols related to the given one |
//! | `lookup` | Two-step instrument search |
//! | `status` | Current market open/close status |
//! | `watch` | Stream live ticks for a symbol set |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--timeout-ms` | `10000` | Per-request timeout in ms |
//!
//! # Examples
//!
//! ```bash
//! tickergate quote AAPL MSFT --pretty
//! tickergate history AAPL --interval ONE_DAY
//! tickergate lookup apple --category equity
//! tickergate watch AAPL --count 10
//! ```

use clap::{Args, Parser, Subcommand};

/// Market-data gateway CLI over a crumb-authenticated upstream.
#[derive(Debug, Parser)]
#[command(
    name = "tickergate",
    author,
    version,
    about = "Market-data gateway CLI",
    long_about = "tickergate fetches quotes, profiles, historical bars, recommendations, \
instrument lookups, market status, and live tick streams from a crumb-authenticated \
market-data upstream. Sessions are acquired lazily and refreshed automatically when \
the upstream rejects them."
)]
pub struct Cli {
    /// Pretty-print JSON output.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Per-request timeout in milliseconds.
    #[arg(long, global = true, default_value_t = 10_000)]
    pub timeout_ms: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Snapshot quotes for one or more symbols.
    Quote(QuoteArgs),
    /// Extended profile record for a symbol.
    Profile(ProfileArgs),
    /// Historical bar series at a named interval.
    History(HistoryArgs),
    /// Symbols related to the given one.
    Recommend(RecommendArgs),
    /// Two-step instrument search.
    Lookup(LookupArgs),
    /// Current market open/close status.
    Status,
    /// Stream live ticks for a symbol set.
    Watch(WatchArgs),
}

#[derive(Debug, Args)]
pub struct QuoteArgs {
    /// Symbols to quote, e.g. AAPL MSFT ^GSPC.
    #[arg(required = true)]
    pub symbols: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// Symbol to profile.
    pub symbol: String,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Symbol to chart.
    pub symbol: String,

    /// Named interval, e.g. ONE_MINUTE, ONE_DAY, ONE_WEEK.
    #[arg(long, default_value = "ONE_DAY")]
    pub interval: String,
}

#[derive(Debug, Args)]
pub struct RecommendArgs {
    /// Symbol to base recommendations on.
    pub symbol: String,
}

#[derive(Debug, Args)]
pub struct LookupArgs {
    /// Search query.
    pub query: String,

    /// Asset category filter, e.g. all, equity, etf, currency.
    #[arg(long, default_value = "all")]
    pub category: String,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Symbols to stream.
    #[arg(required = true)]
    pub symbols: Vec<String>,

    /// Channel id for this subscription.
    #[arg(long, default_value = "cli")]
    pub channel: String,

    /// Stop after this many ticks; 0 streams until interrupted.
    #[arg(long, default_value_t = 0)]
    pub count: u64,

    /// Websocket URL of the tick stream.
    #[arg(long, default_value = "wss://streamer.finance.yahoo.com")]
    pub url: String,
}
