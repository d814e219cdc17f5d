//! Streaming fan-out: event bus, multiplexer, and tick sources.

mod bus;
mod multiplexer;
mod ws;

pub use bus::EventBus;
pub use multiplexer::{ChannelHandle, StreamMultiplexer, TickConnection, TickSource};
pub use ws::WebSocketTickSource;
