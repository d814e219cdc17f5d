use serde_json::Value;

use tickergate_core::{MarketGateway, Symbol};

use crate::cli::RecommendArgs;
use crate::error::CliError;

pub async fn run(args: &RecommendArgs, gateway: &MarketGateway) -> Result<Value, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let related = gateway.get_recommendations(&symbol).await?;
    Ok(serde_json::to_value(related)?)
}
