//! Inbound message parsing and classification
//!
//! Two message shapes share the channel: responses (carry an `id`) and
//! notifications (carry a `method`, no `id`). Anything else is unroutable
//! noise the engine drops.

use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;

/// The `error` object of a failed response
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RemoteError {
    /// Human-readable failure description from the sidecar
    pub message: String,

    /// Optional numeric error code
    pub code: Option<i64>,

    /// Optional structured error payload
    pub data: Option<Value>,
}

/// A response to an earlier request, keyed by its correlation id
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseFrame {
    /// The echoed correlation id
    pub id: String,

    /// Success payload, if any
    pub result: Option<Value>,

    /// Failure payload, if any
    pub error: Option<RemoteError>,
}

impl ResponseFrame {
    /// Resolve the response into a single outcome
    ///
    /// An `error` wins over a `result`; a response with neither resolves to
    /// `Null`.
    pub fn outcome(self) -> std::result::Result<Value, RemoteError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// A server-initiated notification, delivered to subscribers of its method
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationFrame {
    /// Event name, e.g. `terminal/output`
    pub method: String,

    /// Event payload (`Null` when absent)
    pub params: Value,
}

/// One parsed line, classified by which fields it carries
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Carries a string `id`: a reply to some pending call
    Response(ResponseFrame),

    /// Carries a `method` and no `id`: fan out to subscribers
    Notification(NotificationFrame),

    /// Neither shape (or a non-string id); dropped by the dispatcher
    Unroutable(Value),
}

/// Raw wire shape with every field optional; classification happens after
/// parsing so field combinations the protocol does not know still parse.
#[derive(Debug, Deserialize)]
struct RawMessage {
    id: Option<Value>,
    result: Option<Value>,
    error: Option<RemoteError>,
    method: Option<String>,
    params: Option<Value>,
}

/// Parse a single framed line and classify it
///
/// Each line is parsed independently of its neighbors; a malformed line
/// yields an error for that line only.
pub fn parse_line(line: &[u8]) -> Result<InboundMessage> {
    let raw: RawMessage = serde_json::from_slice(line)?;

    let message = match (raw.id, raw.method) {
        (Some(Value::String(id)), _) => InboundMessage::Response(ResponseFrame {
            id,
            result: raw.result,
            error: raw.error,
        }),
        (None, Some(method)) => InboundMessage::Notification(NotificationFrame {
            method,
            params: raw.params.unwrap_or(Value::Null),
        }),
        (id, method) => {
            // Reconstruct enough of the payload for the dispatcher's log line.
            let mut object = serde_json::Map::new();
            if let Some(id) = id {
                object.insert("id".to_string(), id);
            }
            if let Some(method) = method {
                object.insert("method".to_string(), Value::String(method));
            }
            InboundMessage::Unroutable(Value::Object(object))
        }
    };

    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_response_with_result() {
        let msg = parse_line(br#"{"id":"a1","result":[{"pid":1}]}"#).unwrap();
        match msg {
            InboundMessage::Response(frame) => {
                assert_eq!(frame.id, "a1");
                assert_eq!(frame.outcome().unwrap(), json!([{"pid": 1}]));
            }
            other => panic!("expected response, got {:?}", other),
        }
    }

    #[test]
    fn test_response_with_error() {
        let msg = parse_line(br#"{"id":"a1","error":{"message":"no such tool"}}"#).unwrap();
        let InboundMessage::Response(frame) = msg else {
            panic!("expected response");
        };
        let err = frame.outcome().unwrap_err();
        assert_eq!(err.message, "no such tool");
        assert_eq!(err.code, None);
    }

    #[test]
    fn test_error_wins_over_result() {
        let msg =
            parse_line(br#"{"id":"a1","result":1,"error":{"message":"late failure"}}"#).unwrap();
        let InboundMessage::Response(frame) = msg else {
            panic!("expected response");
        };
        assert!(frame.outcome().is_err());
    }

    #[test]
    fn test_response_without_result_resolves_null() {
        let msg = parse_line(br#"{"id":"a1"}"#).unwrap();
        let InboundMessage::Response(frame) = msg else {
            panic!("expected response");
        };
        assert_eq!(frame.outcome().unwrap(), Value::Null);
    }

    #[test]
    fn test_notification() {
        let msg =
            parse_line(br#"{"method":"terminal/output","params":{"data":"hi"}}"#).unwrap();
        assert_eq!(
            msg,
            InboundMessage::Notification(NotificationFrame {
                method: "terminal/output".to_string(),
                params: json!({"data": "hi"}),
            })
        );
    }

    #[test]
    fn test_notification_without_params() {
        let msg = parse_line(br#"{"method":"network/changed"}"#).unwrap();
        let InboundMessage::Notification(frame) = msg else {
            panic!("expected notification");
        };
        assert_eq!(frame.params, Value::Null);
    }

    #[test]
    fn test_id_and_method_classifies_as_response() {
        // Server-initiated requests are not part of this protocol; an id
        // always means "response" and the dispatcher drops unknown ids.
        let msg = parse_line(br#"{"id":"a1","method":"approval/request"}"#).unwrap();
        assert!(matches!(msg, InboundMessage::Response(_)));
    }

    #[rstest]
    #[case::empty_object(br#"{}"#.as_slice())]
    #[case::numeric_id(br#"{"id":7,"result":1}"#.as_slice())]
    #[case::structural_id(br#"{"id":{"v":1},"method":"x"}"#.as_slice())]
    #[case::unrelated_fields(br#"{"status":"ok"}"#.as_slice())]
    fn test_unroutable(#[case] line: &[u8]) {
        let msg = parse_line(line).unwrap();
        assert!(matches!(msg, InboundMessage::Unroutable(_)), "{:?}", msg);
    }

    #[rstest]
    #[case::not_json(b"hello world".as_slice())]
    #[case::truncated(br#"{"id":"a1","#.as_slice())]
    #[case::json_array(br#"[1,2,3]"#.as_slice())]
    #[case::bare_string(br#""id""#.as_slice())]
    fn test_malformed(#[case] line: &[u8]) {
        assert!(parse_line(line).is_err());
    }
}
