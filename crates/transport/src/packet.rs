//! Wire packets

use catalog_errors::RpcError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound request or event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestPacket {
    /// Usually a string; object patterns are matched by their canonical JSON
    pub pattern: Value,
    #[serde(default)]
    pub data: Value,
    /// Absent for events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl RequestPacket {
    pub fn request(id: impl Into<String>, pattern: impl Into<String>, data: Value) -> Self {
        Self {
            pattern: Value::String(pattern.into()),
            data,
            id: Some(id.into()),
        }
    }

    pub fn event(pattern: impl Into<String>, data: Value) -> Self {
        Self {
            pattern: Value::String(pattern.into()),
            data,
            id: None,
        }
    }

    /// Routing key used to look up a handler
    ///
    /// Object patterns serialise with sorted keys, so `{"b":1,"a":2}` and
    /// `{"a":2,"b":1}` route identically.
    pub fn pattern_name(&self) -> String {
        match &self.pattern {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_event(&self) -> bool {
        self.id.is_none()
    }
}

/// Outbound reply to a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePacket {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<Value>,
    #[serde(default)]
    pub is_disposed: bool,
}

impl ResponsePacket {
    pub fn success(id: impl Into<String>, response: Value) -> Self {
        Self {
            id: id.into(),
            response: Some(response),
            err: None,
            is_disposed: true,
        }
    }

    pub fn failure(id: impl Into<String>, err: &RpcError) -> Self {
        let err = serde_json::to_value(err)
            .unwrap_or_else(|_| Value::String(err.message.clone()));
        Self {
            id: id.into(),
            response: None,
            err: Some(err),
            is_disposed: true,
        }
    }

    /// Split into the payload or the structured remote error
    ///
    /// Non-conforming error payloads (bare strings, foreign shapes) are
    /// wrapped as a 500 carrying their JSON text.
    pub fn into_result(self) -> Result<Value, RpcError> {
        match self.err {
            Some(err) => Err(serde_json::from_value::<RpcError>(err.clone()).unwrap_or_else(
                |_| match err {
                    Value::String(message) => RpcError::new(message, 500),
                    other => RpcError::new(other.to_string(), 500),
                },
            )),
            None => Ok(self.response.unwrap_or(Value::Null)),
        }
    }
}
