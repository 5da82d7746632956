use serde_json::{json, Map, Value};

use crate::types::{InputState, Snapshot};

#[derive(Debug, PartialEq)]
pub enum ParsedClientMessage {
    Input(InputState),
    Ping { t: f64 },
}

/// Returns `None` for anything that is not a recognised message. Callers drop
/// those frames without answering.
pub fn parse_client_message(raw: &str) -> Option<ParsedClientMessage> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;
    let message_type = object.get("type")?.as_str()?;

    match message_type {
        "input" => Some(ParsedClientMessage::Input(coerce_input(object))),
        "ping" => {
            let t = object.get("t")?.as_f64()?;
            if !t.is_finite() {
                return None;
            }
            Some(ParsedClientMessage::Ping { t })
        }
        _ => None,
    }
}

/// Every flag is optional and coerced by truthiness, never rejected.
pub fn coerce_input(object: &Map<String, Value>) -> InputState {
    let flag = |name: &str| object.get(name).map(is_truthy).unwrap_or(false);
    InputState {
        up: flag("up"),
        down: flag("down"),
        left: flag("left"),
        right: flag("right"),
    }
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map(|n| n != 0.0 && !n.is_nan()).unwrap_or(true),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub fn state_message(snapshot: &Snapshot) -> Value {
    json!({
        "type": "state",
        "state": snapshot,
    })
}

pub fn full_message() -> Value {
    json!({ "type": "full" })
}

pub fn pong_message(t: f64) -> Value {
    json!({
        "type": "pong",
        "t": t,
    })
}
