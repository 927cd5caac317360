// Device42 response types
//
// Device42 answers writes with a small `{code, msg}` envelope and reads with
// whatever shape the resource has. Error bodies are sometimes plain text, so
// a response is either decoded JSON or the raw body -- never a parse error.

use serde::Deserialize;
use serde_json::Value;

// ── Response ─────────────────────────────────────────────────────────

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// Body parsed as JSON.
    Json(Value),
    /// Body that was not valid JSON, returned unparsed.
    Text(String),
}

impl ApiResponse {
    /// Decode a raw body, falling back to the text when it is not JSON.
    pub fn decode(body: String) -> Self {
        match serde_json::from_str(&body) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(body),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// The `{code, msg}` write envelope, if the body has that shape.
    pub fn envelope(&self) -> Option<Envelope> {
        self.as_json()
            .and_then(|value| Envelope::deserialize(value).ok())
    }

    /// `true` when the body is an envelope with `code == 0`.
    pub fn is_success(&self) -> bool {
        self.envelope().is_some_and(|env| env.is_success())
    }
}

// ── Envelope ─────────────────────────────────────────────────────────

/// Write-result envelope.
///
/// ```json
/// {"code": 0, "msg": ["rack added/updated.", 80, "TestRack1", true, true]}
/// {"code": 1, "msg": "Model PDU with pk '1' does not exist."}
/// ```
///
/// On success `msg[1]` is the identifier the server assigned.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope {
    pub code: i64,
    #[serde(default)]
    pub msg: Value,
}

impl Envelope {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// Identifier assigned by a successful write (`msg[1]`).
    pub fn assigned_id(&self) -> Option<&Value> {
        if !self.is_success() {
            return None;
        }
        self.msg
            .as_array()
            .and_then(|items| items.get(1))
            .filter(|id| id.is_number() || id.is_string())
    }

    /// Human-readable description: `msg[0]` for lists, `msg` for strings.
    pub fn description(&self) -> Option<&str> {
        match &self.msg {
            Value::String(text) => Some(text),
            Value::Array(items) => items.first().and_then(Value::as_str),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_json_body() {
        let resp = ApiResponse::decode(r#"{"code": 0, "msg": ["ok", 3]}"#.into());
        assert!(resp.as_json().is_some());
        assert!(resp.is_success());
    }

    #[test]
    fn decode_text_body() {
        let resp = ApiResponse::decode("Internal Server Error".into());
        assert_eq!(resp, ApiResponse::Text("Internal Server Error".into()));
        assert!(resp.envelope().is_none());
        assert!(!resp.is_success());
    }

    #[test]
    fn assigned_id_from_success() {
        let resp = ApiResponse::Json(json!({
            "code": 0,
            "msg": ["rack added/updated.", 80, "TestRack1", true, true]
        }));
        let env = resp.envelope().unwrap();
        assert_eq!(env.assigned_id(), Some(&json!(80)));
        assert_eq!(env.description(), Some("rack added/updated."));
    }

    #[test]
    fn no_id_on_failure() {
        let env = ApiResponse::Json(json!({
            "code": 1,
            "msg": "Model PDU with pk '1' does not exist."
        }))
        .envelope()
        .unwrap();
        assert!(!env.is_success());
        assert_eq!(env.assigned_id(), None);
        assert_eq!(env.description(), Some("Model PDU with pk '1' does not exist."));
    }

    #[test]
    fn no_id_when_msg_too_short() {
        let env = ApiResponse::Json(json!({"code": 0, "msg": ["done"]}))
            .envelope()
            .unwrap();
        assert_eq!(env.assigned_id(), None);
    }

    #[test]
    fn non_envelope_json() {
        let resp = ApiResponse::Json(json!({"racks": []}));
        assert!(resp.envelope().is_none());
    }
}
