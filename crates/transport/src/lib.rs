//! catalog-transport - message-based RPC over TCP
//!
//! Frames are `<byte length>#<json>`. Requests carry a `pattern`, a `data`
//! payload and an optional `id`; packets without an `id` are events and get
//! no reply.

mod client;
mod codec;
mod error;
mod handler;
mod packet;
mod server;

pub use client::*;
pub use codec::*;
pub use error::*;
pub use handler::*;
pub use packet::*;
pub use server::*;
