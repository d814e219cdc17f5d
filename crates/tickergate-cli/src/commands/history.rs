use serde_json::Value;

use tickergate_core::{Interval, MarketGateway, Symbol};

use crate::cli::HistoryArgs;
use crate::error::CliError;

pub async fn run(args: &HistoryArgs, gateway: &MarketGateway) -> Result<Value, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let interval: Interval = args.interval.parse()?;
    let series = gateway.get_historical_series(&symbol, interval).await?;
    Ok(serde_json::to_value(series)?)
}
