//! Message dispatch seam between the transport and a service

use async_trait::async_trait;
use catalog_errors::RpcError;
use serde_json::Value;

/// Reported when no handler is registered for a pattern
pub const NO_MESSAGE_HANDLER: &str =
    "There is no matching message handler defined in the remote service.";

pub fn no_message_handler() -> RpcError {
    RpcError::new(NO_MESSAGE_HANDLER, 404)
}

/// A service that answers messages routed by pattern
#[async_trait]
pub trait MessageHandler: Send + Sync + 'static {
    /// Handle one message
    ///
    /// Implementations return [`no_message_handler`] for unknown patterns.
    async fn handle(&self, pattern: &str, data: Value) -> Result<Value, RpcError>;
}
