//! Production tick source over a websocket transport.

use std::future::Future;
use std::pin::Pin;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::normalize::RawTick;
use crate::stream::{TickConnection, TickSource};
use crate::{GatewayError, Symbol};

const TICK_CHANNEL_CAPACITY: usize = 256;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Tick source that opens one websocket per subscription, sends a
/// JSON subscribe frame for the symbol set, and forwards parsed tick
/// frames. The connection guard aborts the read loop and drops the
/// write half on teardown.
pub struct WebSocketTickSource {
    url: String,
}

impl WebSocketTickSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl TickSource for WebSocketTickSource {
    fn connect<'a>(
        &'a self,
        symbols: &'a [Symbol],
    ) -> Pin<Box<dyn Future<Output = Result<TickConnection, GatewayError>> + Send + 'a>> {
        Box::pin(async move {
            let (socket, _) = connect_async(&self.url)
                .await
                .map_err(|e| GatewayError::transport(format!("websocket connect failed: {e}")))?;
            let (mut write, mut read) = socket.split();

            let subscribe = serde_json::json!({
                "subscribe": symbols.iter().map(Symbol::as_str).collect::<Vec<_>>(),
            });
            write
                .send(Message::Text(subscribe.to_string().into()))
                .await
                .map_err(|e| {
                    GatewayError::transport(format!("websocket subscribe failed: {e}"))
                })?;

            let (tx, rx) = mpsc::channel(TICK_CHANNEL_CAPACITY);
            let reader = tokio::spawn(async move {
                while let Some(message) = read.next().await {
                    match message {
                        Ok(Message::Text(text)) => {
                            match serde_json::from_str::<RawTick>(text.as_str()) {
                                Ok(raw) => {
                                    if tx.send(raw).await.is_err() {
                                        break;
                                    }
                                }
                                Err(error) => {
                                    tracing::debug!(%error, "skipping unparseable tick frame");
                                }
                            }
                        }
                        Ok(Message::Close(_)) | Err(_) => break,
                        Ok(_) => {}
                    }
                }
            });

            Ok(TickConnection::new(rx).with_guard(WsGuard {
                reader,
                _write: write,
            }))
        })
    }
}

struct WsGuard {
    reader: JoinHandle<()>,
    _write: WsSink,
}

impl Drop for WsGuard {
    fn drop(&mut self) {
        self.reader.abort();
    }
}
