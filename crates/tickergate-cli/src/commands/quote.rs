use serde_json::Value;

use tickergate_core::{parse_symbols, MarketGateway};

use crate::cli::QuoteArgs;
use crate::error::CliError;

pub async fn run(args: &QuoteArgs, gateway: &MarketGateway) -> Result<Value, CliError> {
    let symbols = parse_symbols(&args.symbols)?;
    let quotes = gateway.get_quotes(&symbols).await?;
    Ok(serde_json::to_value(quotes)?)
}
