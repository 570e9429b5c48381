//! WAMP v2 JSON framing for the subset of messages a WAAPI caller needs.
//!
//! Frames are JSON arrays whose first element is the message code, e.g.
//! `[48, 7, {}, "ak.wwise.core.getInfo"]` for a CALL.

use serde_json::{json, Map, Value};

/// Realm WAAPI serves.
pub const REALM: &str = "realm1";
/// WebSocket sub-protocol for JSON-serialised WAMP v2.
pub const SUBPROTOCOL: &str = "wamp.2.json";
/// Reason sent with a client-initiated GOODBYE.
pub const CLOSE_REALM: &str = "wamp.close.close_realm";

const HELLO: u64 = 1;
const WELCOME: u64 = 2;
const ABORT: u64 = 3;
const GOODBYE: u64 = 6;
const ERROR: u64 = 8;
const CALL: u64 = 48;
const RESULT: u64 = 50;

/// Errors decoding an inbound frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// The frame is not valid JSON.
    #[error("invalid JSON frame: {0}")]
    Json(String),

    /// The frame is valid JSON but not a WAMP message.
    #[error("malformed WAMP frame: {0}")]
    Malformed(&'static str),

    /// A well-formed message this client does not handle.
    #[error("unsupported WAMP message code {0}")]
    Unsupported(u64),
}

/// A WAMP message.
#[derive(Debug, Clone, PartialEq)]
pub enum WampMessage {
    Hello {
        realm: String,
        details: Map<String, Value>,
    },
    Welcome {
        session: u64,
        details: Map<String, Value>,
    },
    Abort {
        details: Map<String, Value>,
        reason: String,
    },
    Goodbye {
        details: Map<String, Value>,
        reason: String,
    },
    Error {
        request_type: u64,
        request: u64,
        details: Map<String, Value>,
        error: String,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    },
    Call {
        request: u64,
        options: Map<String, Value>,
        procedure: String,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    },
    Result {
        request: u64,
        details: Map<String, Value>,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    },
}

impl WampMessage {
    /// HELLO announcing the caller role only.
    pub fn hello(realm: &str) -> Self {
        let mut details = Map::new();
        details.insert("roles".into(), json!({ "caller": { "features": {} } }));
        Self::Hello {
            realm: realm.to_owned(),
            details,
        }
    }

    /// Client GOODBYE that ends the realm session.
    pub fn goodbye() -> Self {
        Self::Goodbye {
            details: Map::new(),
            reason: CLOSE_REALM.to_owned(),
        }
    }

    /// Serialise to a text frame.
    pub fn to_frame(&self) -> String {
        let items = match self {
            Self::Hello { realm, details } => {
                vec![json!(HELLO), json!(realm), Value::Object(details.clone())]
            }
            Self::Welcome { session, details } => {
                vec![json!(WELCOME), json!(session), Value::Object(details.clone())]
            }
            Self::Abort { details, reason } => {
                vec![json!(ABORT), Value::Object(details.clone()), json!(reason)]
            }
            Self::Goodbye { details, reason } => {
                vec![json!(GOODBYE), Value::Object(details.clone()), json!(reason)]
            }
            Self::Error {
                request_type,
                request,
                details,
                error,
                args,
                kwargs,
            } => {
                let mut items = vec![
                    json!(ERROR),
                    json!(request_type),
                    json!(request),
                    Value::Object(details.clone()),
                    json!(error),
                ];
                push_payload(&mut items, args, kwargs);
                items
            }
            Self::Call {
                request,
                options,
                procedure,
                args,
                kwargs,
            } => {
                let mut items = vec![
                    json!(CALL),
                    json!(request),
                    Value::Object(options.clone()),
                    json!(procedure),
                ];
                push_payload(&mut items, args, kwargs);
                items
            }
            Self::Result {
                request,
                details,
                args,
                kwargs,
            } => {
                let mut items = vec![json!(RESULT), json!(request), Value::Object(details.clone())];
                push_payload(&mut items, args, kwargs);
                items
            }
        };
        Value::Array(items).to_string()
    }

    /// Parse a text frame.
    pub fn from_frame(frame: &str) -> Result<Self, ProtocolError> {
        let value: Value =
            serde_json::from_str(frame).map_err(|e| ProtocolError::Json(e.to_string()))?;
        let Value::Array(items) = value else {
            return Err(ProtocolError::Malformed("frame is not an array"));
        };
        let code = items
            .first()
            .and_then(Value::as_u64)
            .ok_or(ProtocolError::Malformed("missing message code"))?;

        match code {
            HELLO => Ok(Self::Hello {
                realm: string_at(&items, 1, "HELLO realm")?,
                details: object_at(&items, 2),
            }),
            WELCOME => Ok(Self::Welcome {
                session: id_at(&items, 1, "WELCOME session")?,
                details: object_at(&items, 2),
            }),
            ABORT => Ok(Self::Abort {
                details: object_at(&items, 1),
                reason: string_at(&items, 2, "ABORT reason")?,
            }),
            GOODBYE => Ok(Self::Goodbye {
                details: object_at(&items, 1),
                reason: string_at(&items, 2, "GOODBYE reason")?,
            }),
            ERROR => Ok(Self::Error {
                request_type: id_at(&items, 1, "ERROR request type")?,
                request: id_at(&items, 2, "ERROR request id")?,
                details: object_at(&items, 3),
                error: string_at(&items, 4, "ERROR uri")?,
                args: array_at(&items, 5),
                kwargs: object_at(&items, 6),
            }),
            CALL => Ok(Self::Call {
                request: id_at(&items, 1, "CALL request id")?,
                options: object_at(&items, 2),
                procedure: string_at(&items, 3, "CALL procedure")?,
                args: array_at(&items, 4),
                kwargs: object_at(&items, 5),
            }),
            RESULT => Ok(Self::Result {
                request: id_at(&items, 1, "RESULT request id")?,
                details: object_at(&items, 2),
                args: array_at(&items, 3),
                kwargs: object_at(&items, 4),
            }),
            other => Err(ProtocolError::Unsupported(other)),
        }
    }

    /// Whether this is an ERROR answering a CALL.
    pub fn is_call_error(&self) -> bool {
        matches!(self, Self::Error { request_type, .. } if *request_type == CALL)
    }
}

/// Trailing `args` / `kwargs` are omitted when empty.
fn push_payload(items: &mut Vec<Value>, args: &[Value], kwargs: &Map<String, Value>) {
    if !kwargs.is_empty() {
        items.push(Value::Array(args.to_vec()));
        items.push(Value::Object(kwargs.clone()));
    } else if !args.is_empty() {
        items.push(Value::Array(args.to_vec()));
    }
}

fn id_at(items: &[Value], index: usize, what: &'static str) -> Result<u64, ProtocolError> {
    items
        .get(index)
        .and_then(Value::as_u64)
        .ok_or(ProtocolError::Malformed(what))
}

fn string_at(items: &[Value], index: usize, what: &'static str) -> Result<String, ProtocolError> {
    items
        .get(index)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(ProtocolError::Malformed(what))
}

fn object_at(items: &[Value], index: usize) -> Map<String, Value> {
    match items.get(index) {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    }
}

fn array_at(items: &[Value], index: usize) -> Vec<Value> {
    match items.get(index) {
        Some(Value::Array(values)) => values.clone(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_frame_announces_caller_role() {
        let frame = WampMessage::hello(REALM).to_frame();
        let value: Value = serde_json::from_str(&frame).expect("json");
        assert_eq!(value[0], json!(1));
        assert_eq!(value[1], json!("realm1"));
        assert!(value[2]["roles"]["caller"].is_object());
    }

    #[test]
    fn call_without_payload_has_four_elements() {
        let call = WampMessage::Call {
            request: 7,
            options: Map::new(),
            procedure: "ak.wwise.core.getInfo".into(),
            args: vec![],
            kwargs: Map::new(),
        };
        assert_eq!(call.to_frame(), r#"[48,7,{},"ak.wwise.core.getInfo"]"#);
    }

    #[test]
    fn call_with_kwargs_keeps_empty_args() {
        let mut kwargs = Map::new();
        kwargs.insert("waql".into(), json!("$ \"{AA}\""));
        let mut options = Map::new();
        options.insert("return".into(), json!(["id"]));
        let call = WampMessage::Call {
            request: 2,
            options,
            procedure: "ak.wwise.core.object.get".into(),
            args: vec![],
            kwargs,
        };
        let value: Value = serde_json::from_str(&call.to_frame()).expect("json");
        assert_eq!(value[4], json!([]));
        assert_eq!(value[5]["waql"], json!("$ \"{AA}\""));
        assert_eq!(value[2]["return"], json!(["id"]));
    }

    #[test]
    fn decode_welcome() {
        let msg = WampMessage::from_frame(r#"[2, 9129137332, {"roles":{"dealer":{}}}]"#)
            .expect("decode");
        match msg {
            WampMessage::Welcome { session, details } => {
                assert_eq!(session, 9_129_137_332);
                assert!(details.contains_key("roles"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn decode_result_with_kwargs() {
        let msg = WampMessage::from_frame(r#"[50, 3, {}, [], {"return": [{"id": "{AA}"}]}]"#)
            .expect("decode");
        match msg {
            WampMessage::Result {
                request, kwargs, ..
            } => {
                assert_eq!(request, 3);
                assert_eq!(kwargs["return"][0]["id"], json!("{AA}"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn decode_result_without_payload() {
        let msg = WampMessage::from_frame("[50, 4, {}]").expect("decode");
        assert!(matches!(msg, WampMessage::Result { request: 4, ref kwargs, .. } if kwargs.is_empty()));
    }

    #[test]
    fn decode_call_error() {
        let msg = WampMessage::from_frame(
            r#"[8, 48, 5, {}, "ak.wwise.query.invalid_waql", [], {"message": "bad query"}]"#,
        )
        .expect("decode");
        assert!(msg.is_call_error());
    }

    #[test]
    fn decode_abort_reason() {
        let msg = WampMessage::from_frame(r#"[3, {"message": "no such realm"}, "wamp.error.no_such_realm"]"#)
            .expect("decode");
        assert!(matches!(msg, WampMessage::Abort { ref reason, .. } if reason == "wamp.error.no_such_realm"));
    }

    #[test]
    fn unknown_code_is_unsupported() {
        let err = WampMessage::from_frame("[36, 1, 2, {}]").unwrap_err();
        assert_eq!(err, ProtocolError::Unsupported(36));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            WampMessage::from_frame("not json"),
            Err(ProtocolError::Json(_))
        ));
        assert!(matches!(
            WampMessage::from_frame(r#"{"a":1}"#),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            WampMessage::from_frame(r#"[2, "x", {}]"#),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn encoded_result_decodes_back() {
        let mut kwargs = Map::new();
        kwargs.insert("displayName".into(), json!("Wwise"));
        let msg = WampMessage::Result {
            request: 11,
            details: Map::new(),
            args: vec![],
            kwargs,
        };
        assert_eq!(WampMessage::from_frame(&msg.to_frame()).expect("decode"), msg);
    }
}
