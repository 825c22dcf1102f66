//! WebSocket transport for the room session.

mod endpoint;
mod ws;

pub use endpoint::*;
pub use ws::*;
