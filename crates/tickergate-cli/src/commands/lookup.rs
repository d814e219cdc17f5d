use serde_json::Value;

use tickergate_core::{AssetCategory, MarketGateway};

use crate::cli::LookupArgs;
use crate::error::CliError;

pub async fn run(args: &LookupArgs, gateway: &MarketGateway) -> Result<Value, CliError> {
    let category: AssetCategory = args.category.parse()?;
    let result = gateway.lookup(&args.query, category).await?;
    Ok(serde_json::to_value(result)?)
}
