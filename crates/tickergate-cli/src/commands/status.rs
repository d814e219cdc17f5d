use serde_json::Value;

use tickergate_core::MarketGateway;

use crate::error::CliError;

pub async fn run(gateway: &MarketGateway) -> Result<Value, CliError> {
    let status = gateway.get_market_status().await?;
    Ok(serde_json::to_value(status)?)
}
