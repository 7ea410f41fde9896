//! Outbound request frames
//!
//! Every request the client sends is a `tools/call` invocation carrying a
//! fresh correlation id. The sidecar echoes the id in its response, which is
//! the only thing that ties the reply back to the caller.

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Correlation id attached to a request and echoed in its response
///
/// A process-unique random token, generated per call and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a new random request id
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from a raw string (e.g. an id read off the wire)
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The `params` object of a tool call
#[derive(Debug, Clone, Serialize)]
struct ToolCallParams {
    name: String,
    arguments: Value,
}

/// Outbound `tools/call` request frame
///
/// Serializes as
/// `{"jsonrpc":"2.0","method":"tools/call","id":"<uuid>","params":{"name":...,"arguments":...}}`
/// with the field order fixed by declaration order.
#[derive(Debug, Clone, Serialize)]
pub struct ToolCallRequest {
    jsonrpc: &'static str,
    method: &'static str,
    id: RequestId,
    params: ToolCallParams,
}

impl ToolCallRequest {
    /// Build a request for the given tool, allocating a fresh id
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            method: "tools/call",
            id: RequestId::new(),
            params: ToolCallParams {
                name: name.into(),
                arguments,
            },
        }
    }

    /// The correlation id this request was issued under
    pub fn id(&self) -> &RequestId {
        &self.id
    }

    /// Serialize to the single-line wire form (no trailing newline)
    pub fn to_frame(&self) -> crate::error::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_id_unique() {
        let a = RequestId::new();
        let b = RequestId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_request_id_roundtrip() {
        let id = RequestId::from_string("a1");
        assert_eq!(id.as_str(), "a1");
        assert_eq!(id.to_string(), "a1");
    }

    #[test]
    fn test_frame_layout() {
        let request = ToolCallRequest::new("list_processes", json!({}));
        let frame = String::from_utf8(request.to_frame().unwrap()).unwrap();

        let expected = format!(
            r#"{{"jsonrpc":"2.0","method":"tools/call","id":"{}","params":{{"name":"list_processes","arguments":{{}}}}}}"#,
            request.id()
        );
        assert_eq!(frame, expected);
    }

    #[test]
    fn test_frame_carries_arguments() {
        let request = ToolCallRequest::new("read_dir", json!({"path": "/tmp"}));
        let value: serde_json::Value =
            serde_json::from_slice(&request.to_frame().unwrap()).unwrap();

        assert_eq!(value["params"]["name"], "read_dir");
        assert_eq!(value["params"]["arguments"]["path"], "/tmp");
        assert_eq!(value["id"], request.id().as_str());
    }

    #[test]
    fn test_frame_is_single_line() {
        let request = ToolCallRequest::new("terminal_write", json!({"data": "ls\n"}));
        let frame = request.to_frame().unwrap();
        assert!(!frame.contains(&b'\n'), "embedded newlines must be escaped");
    }
}
