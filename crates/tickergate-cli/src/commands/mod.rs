mod history;
mod lookup;
mod profile;
mod quote;
mod recommend;
mod status;
mod watch;

use std::sync::Arc;

use serde_json::Value;
use tickergate_core::{
    CrumbSessionAcquirer, GatewayConfig, MarketGateway, ReqwestHttpClient,
};

use crate::cli::{Cli, Command};
use crate::error::CliError;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

pub async fn run(cli: &Cli) -> Result<Value, CliError> {
    let gateway = build_gateway(cli.timeout_ms)?;

    match &cli.command {
        Command::Quote(args) => quote::run(args, &gateway).await,
        Command::Profile(args) => profile::run(args, &gateway).await,
        Command::History(args) => history::run(args, &gateway).await,
        Command::Recommend(args) => recommend::run(args, &gateway).await,
        Command::Lookup(args) => lookup::run(args, &gateway).await,
        Command::Status => status::run(&gateway).await,
        Command::Watch(args) => watch::run(args).await,
    }
}

fn build_gateway(timeout_ms: u64) -> Result<MarketGateway, CliError> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .cookie_store(true)
        .timeout(std::time::Duration::from_millis(timeout_ms))
        .build()
        .map_err(|e| CliError::Command(format!("failed to build http client: {e}")))?;

    let http = Arc::new(ReqwestHttpClient::with_client(client));
    let acquirer = Arc::new(CrumbSessionAcquirer::new(http.clone()));
    Ok(MarketGateway::new(http, acquirer, GatewayConfig::default()))
}
