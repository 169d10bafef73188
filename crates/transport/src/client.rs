//! RPC client

use futures::{SinkExt, StreamExt};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio_util::codec::Framed;
use tracing::debug;
use uuid::Uuid;

use crate::codec::JsonSocketCodec;
use crate::error::{TransportError, TransportResult};
use crate::packet::{RequestPacket, ResponsePacket};

/// Request/response client for an [`RpcServer`](crate::RpcServer)
///
/// Requests are issued one at a time; replies with a foreign `id` are skipped.
pub struct RpcClient {
    framed: Framed<TcpStream, JsonSocketCodec>,
}

impl RpcClient {
    pub async fn connect(addr: impl ToSocketAddrs) -> TransportResult<Self> {
        Self::connect_with_codec(addr, JsonSocketCodec::default()).await
    }

    pub async fn connect_with_codec(
        addr: impl ToSocketAddrs,
        codec: JsonSocketCodec,
    ) -> TransportResult<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self {
            framed: Framed::new(stream, codec),
        })
    }

    /// Send a request and deserialise the reply
    ///
    /// A structured error from the remote side surfaces as
    /// [`TransportError::Remote`].
    pub async fn send<T, R>(&mut self, pattern: &str, data: &T) -> TransportResult<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let value = self.send_raw(pattern, serde_json::to_value(data)?).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Send a request with an untyped payload
    pub async fn send_raw(&mut self, pattern: &str, data: Value) -> TransportResult<Value> {
        let id = Uuid::new_v4().to_string();
        self.framed
            .send(RequestPacket::request(id.clone(), pattern, data))
            .await?;

        loop {
            let body = self
                .framed
                .next()
                .await
                .ok_or(TransportError::ConnectionClosed)??;
            let packet: ResponsePacket = serde_json::from_slice(&body)?;

            if packet.id != id {
                debug!(expected = %id, received = %packet.id, "Skipping unrelated response");
                continue;
            }

            return packet.into_result().map_err(TransportError::Remote);
        }
    }

    /// Fire an event; no reply is expected
    pub async fn emit<T>(&mut self, pattern: &str, data: &T) -> TransportResult<()>
    where
        T: Serialize + ?Sized,
    {
        let packet = RequestPacket::event(pattern, serde_json::to_value(data)?);
        self.framed.send(packet).await
    }
}
