use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::broadcast::error::RecvError;

use tickergate_core::{parse_symbols, EventBus, StreamMultiplexer, WebSocketTickSource};

use crate::cli::WatchArgs;
use crate::error::CliError;

/// Streams ticks as NDJSON to stdout until `--count` is reached or
/// the process is interrupted, then returns a short summary.
pub async fn run(args: &WatchArgs) -> Result<Value, CliError> {
    let symbols = parse_symbols(&args.symbols)?;

    let source = Arc::new(WebSocketTickSource::new(&args.url));
    let bus = Arc::new(EventBus::default());
    let mux = StreamMultiplexer::new(source, bus);

    let handle = mux.subscribe(symbols, &args.channel).await?;
    let mut ticks = handle.ticks();
    let mut emitted: u64 = 0;

    loop {
        tokio::select! {
            received = ticks.recv() => match received {
                Ok(tick) => {
                    println!("{}", serde_json::to_string(&tick)?);
                    emitted += 1;
                    if args.count > 0 && emitted >= args.count {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "tick receiver lagged");
                }
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    handle.unsubscribe();

    Ok(json!({
        "channel": args.channel,
        "ticks_emitted": emitted,
    }))
}
