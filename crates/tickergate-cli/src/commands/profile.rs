use serde_json::Value;

use tickergate_core::{MarketGateway, Symbol};

use crate::cli::ProfileArgs;
use crate::error::CliError;

pub async fn run(args: &ProfileArgs, gateway: &MarketGateway) -> Result<Value, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let record = gateway.get_profile(&symbol).await?;
    Ok(serde_json::to_value(record)?)
}
