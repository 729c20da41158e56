use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Success envelope used by every backend response: `{ "data": T }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        self.data
    }
}

/// Error body as produced by the backend. Every field is optional; `message`
/// may be a single string or a list of validation messages.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Human readable message of an error response, falling back to the raw
    /// body when it is not a recognised JSON error.
    pub fn message_from(body: &str) -> String {
        let parsed = serde_json::from_str::<ErrorBody>(body).ok();
        parsed
            .and_then(|err| err.message())
            .unwrap_or_else(|| body.trim().to_string())
    }

    fn message(&self) -> Option<String> {
        match &self.message {
            Some(Value::String(message)) if !message.is_empty() => Some(message.clone()),
            Some(Value::Array(items)) => {
                let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join("; "))
                }
            }
            _ => self.error.clone().filter(|error| !error.is_empty()),
        }
    }
}

/// Strip the `data` envelope off an arbitrary JSON body when present.
pub fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.len() == 1 && map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}
