//! RPC server

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use futures::{SinkExt, StreamExt};
use metrics::{counter, histogram};
use catalog_errors::RpcError;
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Semaphore, mpsc};
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::codec::{DEFAULT_MAX_FRAME_LENGTH, JsonSocketCodec};
use crate::error::TransportResult;
use crate::handler::MessageHandler;
use crate::packet::{RequestPacket, ResponsePacket};

/// Requests a single connection may have running at once
pub const DEFAULT_MAX_IN_FLIGHT: usize = 256;

/// Reply sent for a packet that carries an `id` but is not a valid request
pub const MALFORMED_PACKET: &str = "Malformed packet";

/// Accepts connections and routes every inbound packet to a [`MessageHandler`]
///
/// Each request runs in its own task, so a slow request does not hold up
/// later ones on the same connection. Once `max_in_flight` requests are
/// running the connection stops reading until one of them replies. On
/// cancellation the server stops accepting, stops reading, and waits for
/// in-flight requests to reply.
pub struct RpcServer {
    handler: Arc<dyn MessageHandler>,
    max_frame_length: usize,
    max_in_flight: usize,
}

impl RpcServer {
    pub fn new(handler: Arc<dyn MessageHandler>) -> Self {
        Self {
            handler,
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }

    pub fn with_max_frame_length(mut self, max_frame_length: usize) -> Self {
        self.max_frame_length = max_frame_length;
        self
    }

    /// Zero is treated as one
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    /// Bind `addr` and serve until `shutdown` is cancelled
    pub async fn serve(self, addr: SocketAddr, shutdown: CancellationToken) -> TransportResult<()> {
        let listener = TcpListener::bind(addr).await?;
        self.serve_with_listener(listener, shutdown).await
    }

    /// Serve on an already bound listener
    pub async fn serve_with_listener(
        self,
        listener: TcpListener,
        shutdown: CancellationToken,
    ) -> TransportResult<()> {
        let local_addr = listener.local_addr()?;
        info!(%local_addr, "RPC server listening");

        let connections = TaskTracker::new();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        debug!(%peer, "Connection accepted");
                        connections.spawn(handle_connection(
                            stream,
                            peer,
                            self.handler.clone(),
                            self.max_frame_length,
                            self.max_in_flight,
                            shutdown.clone(),
                        ));
                    }
                    Err(e) => warn!(error = %e, "Failed to accept connection"),
                },
            }
        }

        info!("RPC server draining connections");
        connections.close();
        connections.wait().await;
        info!("RPC server stopped");

        Ok(())
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    handler: Arc<dyn MessageHandler>,
    max_frame_length: usize,
    max_in_flight: usize,
    shutdown: CancellationToken,
) {
    let framed = Framed::new(stream, JsonSocketCodec::new(max_frame_length));
    let (mut sink, mut frames) = framed.split::<ResponsePacket>();
    let (tx, mut rx) = mpsc::channel::<ResponsePacket>(max_in_flight);

    let writer = tokio::spawn(async move {
        while let Some(packet) = rx.recv().await {
            if let Err(e) = sink.send(packet).await {
                warn!(%peer, error = %e, "Failed to write response");
                break;
            }
        }
    });

    let in_flight = Arc::new(Semaphore::new(max_in_flight));
    let requests = TaskTracker::new();

    loop {
        let frame = tokio::select! {
            _ = shutdown.cancelled() => break,
            frame = frames.next() => frame,
        };

        let body = match frame {
            None => break,
            Some(Ok(body)) => body,
            Some(Err(e)) => {
                warn!(%peer, error = %e, "Closing connection after protocol error");
                break;
            }
        };

        // Held by the request task until its reply is queued
        let permit = tokio::select! {
            _ = shutdown.cancelled() => break,
            permit = in_flight.clone().acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };

        let tx = tx.clone();
        match serde_json::from_slice::<RequestPacket>(&body) {
            Ok(packet) => {
                let handler = handler.clone();
                requests.spawn(async move {
                    if let Some(response) = dispatch(handler.as_ref(), packet).await {
                        // The writer only goes away when the peer is gone
                        let _ = tx.send(response).await;
                    }
                    drop(permit);
                });
            }
            Err(e) => {
                warn!(%peer, error = %e, "Discarding malformed packet");
                if let Some(reply) = malformed_reply(&body) {
                    requests.spawn(async move {
                        let _ = tx.send(reply).await;
                        drop(permit);
                    });
                }
            }
        }
    }

    requests.close();
    requests.wait().await;
    drop(tx);
    let _ = writer.await;

    debug!(%peer, "Connection closed");
}

/// Error reply for a JSON body that names an `id` but is not a request
///
/// Bodies that are not JSON at all, or carry no string `id`, get no reply.
fn malformed_reply(body: &[u8]) -> Option<ResponsePacket> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let id = value.get("id")?.as_str()?;
    Some(ResponsePacket::failure(id, &RpcError::new(MALFORMED_PACKET, 400)))
}

/// Run one packet through the handler and build the reply, if one is due
pub async fn dispatch(
    handler: &dyn MessageHandler,
    packet: RequestPacket,
) -> Option<ResponsePacket> {
    let pattern = packet.pattern_name();
    let start = Instant::now();

    let result = handler.handle(&pattern, packet.data).await;

    let status = match &result {
        Ok(_) => "ok".to_string(),
        Err(e) => e.status.to_string(),
    };
    record_rpc_request(&pattern, &status, start.elapsed().as_secs_f64() * 1000.0);

    match packet.id {
        Some(id) => Some(match result {
            Ok(response) => ResponsePacket::success(id, response),
            Err(err) => ResponsePacket::failure(id, &err),
        }),
        None => {
            if let Err(err) = result {
                warn!(
                    %pattern,
                    status = err.status,
                    message = %err.message,
                    "Event handler failed"
                );
            }
            None
        }
    }
}

/// Record an RPC request
pub fn record_rpc_request(pattern: &str, status: &str, duration_ms: f64) {
    let labels = [
        ("pattern", pattern.to_string()),
        ("status", status.to_string()),
    ];

    counter!("rpc_requests_total", &labels).increment(1);
    histogram!("rpc_request_duration_ms", &labels).record(duration_ms);
}
