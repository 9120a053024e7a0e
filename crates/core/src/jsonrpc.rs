//! Line-delimited JSON-RPC 2.0 envelopes.
//!
//! One complete JSON value per line, newline-terminated, no length prefix.
//! Request ids are kept as raw [`serde_json::Value`]s and echoed verbatim;
//! a request whose id cannot be recovered is answered with `id: null`.

use serde_json::{Value, json};

pub const VERSION: &str = "2.0";

/// Upper bound on `method` length; anything longer is an invalid request.
pub const MAX_METHOD_LEN: usize = 64;

/// Upper bound on a single input line. Oversized lines are rejected before
/// JSON parsing; note the line itself has already been buffered by the
/// reader at that point.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Protocol error codes. Negative codes follow the JSON-RPC convention:
/// the -327xx range for envelope problems, the -320xx server range for
/// gateway-defined conditions.
pub mod code {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
    pub const RATE_LIMITED: i64 = -32000;
    pub const UPSTREAM_ERROR: i64 = -32001;
}

/// Emitted when response serialization itself fails; never observed in
/// practice since responses are built from `serde_json::Value`s.
const INTERNAL_FALLBACK: &str =
    r#"{"error":{"code":-32603,"message":"internal error"},"id":null,"jsonrpc":"2.0"}"#;

/// A structurally valid incoming request envelope.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: String,
    pub params: Option<Value>,
    /// The request id, `Value::Null` when absent. Echoed verbatim.
    pub id: Value,
}

/// The `error` member of a response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    /// Optional structured detail (e.g. a parsed upstream error body).
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    #[must_use]
    pub fn parse_error() -> Self {
        Self::new(code::PARSE_ERROR, "parse error")
    }

    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(code::INVALID_REQUEST, message)
    }

    #[must_use]
    pub fn method_not_found() -> Self {
        Self::new(code::METHOD_NOT_FOUND, "method not found")
    }

    #[must_use]
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(code::INVALID_PARAMS, message)
    }

    #[must_use]
    pub fn rate_limited() -> Self {
        Self::new(code::RATE_LIMITED, "rate limit exceeded")
    }

    #[must_use]
    pub fn internal() -> Self {
        Self::new(code::INTERNAL_ERROR, "internal error")
    }

    #[must_use]
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(code::UPSTREAM_ERROR, message)
    }
}

/// Parse one input line into a [`Request`].
///
/// # Errors
///
/// Returns the best-effort request id (null when unrecoverable) together
/// with the protocol error to answer with. An unparseable line yields a
/// parse error; a parseable line with a broken envelope yields an invalid
/// request error.
pub fn parse_line(line: &str) -> Result<Request, (Value, RpcError)> {
    let Ok(value) = serde_json::from_str::<Value>(line) else {
        return Err((Value::Null, RpcError::parse_error()));
    };

    let Some(obj) = value.as_object() else {
        return Err((
            Value::Null,
            RpcError::invalid_request("request must be an object"),
        ));
    };

    // The id is extracted first so later shape errors can still echo it.
    let id = match obj.get("id") {
        None => Value::Null,
        Some(id @ (Value::Null | Value::String(_) | Value::Number(_))) => id.clone(),
        Some(_) => {
            return Err((
                Value::Null,
                RpcError::invalid_request("id must be a string or number"),
            ));
        }
    };

    if obj.get("jsonrpc").and_then(Value::as_str) != Some(VERSION) {
        return Err((
            id,
            RpcError::invalid_request("jsonrpc version tag must be \"2.0\""),
        ));
    }

    let method = match obj.get("method").and_then(Value::as_str) {
        Some(m) if !m.is_empty() && m.len() <= MAX_METHOD_LEN => m.to_string(),
        _ => {
            return Err((id, RpcError::invalid_request("invalid method")));
        }
    };

    let params = match obj.get("params") {
        None | Some(Value::Null) => None,
        Some(p @ Value::Object(_)) => Some(p.clone()),
        Some(_) => {
            return Err((id, RpcError::invalid_request("params must be an object")));
        }
    };

    Ok(Request { method, params, id })
}

/// Serialize a success response line (without the trailing newline).
#[must_use]
pub fn success(id: &Value, result: &Value) -> String {
    let envelope = json!({ "jsonrpc": VERSION, "id": id, "result": result });
    serde_json::to_string(&envelope).unwrap_or_else(|_| INTERNAL_FALLBACK.to_string())
}

/// Serialize an error response line (without the trailing newline).
#[must_use]
pub fn failure(id: &Value, error: &RpcError) -> String {
    let mut body = json!({ "code": error.code, "message": error.message });
    if let Some(data) = &error.data
        && let Some(obj) = body.as_object_mut()
    {
        obj.insert("data".to_string(), data.clone());
    }
    let envelope = json!({ "jsonrpc": VERSION, "id": id, "error": body });
    serde_json::to_string(&envelope).unwrap_or_else(|_| INTERNAL_FALLBACK.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_request() {
        let req = parse_line(r#"{"jsonrpc":"2.0","method":"tools/list","id":1}"#)
            .expect("valid request");
        assert_eq!(req.method, "tools/list");
        assert_eq!(req.id, json!(1));
        assert!(req.params.is_none());
    }

    #[test]
    fn parse_keeps_string_and_numeric_ids_verbatim() {
        let req =
            parse_line(r#"{"jsonrpc":"2.0","method":"m","id":"abc"}"#).expect("valid request");
        assert_eq!(req.id, json!("abc"));

        let req = parse_line(r#"{"jsonrpc":"2.0","method":"m","id":42}"#).expect("valid request");
        assert_eq!(req.id, json!(42));
    }

    #[test]
    fn parse_missing_id_becomes_null() {
        let req = parse_line(r#"{"jsonrpc":"2.0","method":"m"}"#).expect("valid request");
        assert_eq!(req.id, Value::Null);
    }

    #[test]
    fn unparseable_line_is_a_parse_error_with_null_id() {
        let (id, err) = parse_line("{not json").expect_err("parse failure");
        assert_eq!(id, Value::Null);
        assert_eq!(err.code, code::PARSE_ERROR);
    }

    #[test]
    fn non_object_json_is_an_invalid_request() {
        let (id, err) = parse_line("[1,2,3]").expect_err("shape failure");
        assert_eq!(id, Value::Null);
        assert_eq!(err.code, code::INVALID_REQUEST);
    }

    #[test]
    fn shape_errors_after_id_extraction_echo_the_id() {
        let (id, err) =
            parse_line(r#"{"jsonrpc":"2.0","method":"","id":7}"#).expect_err("empty method");
        assert_eq!(id, json!(7));
        assert_eq!(err.code, code::INVALID_REQUEST);
    }

    #[test]
    fn wrong_version_tag_is_rejected() {
        let (_, err) =
            parse_line(r#"{"jsonrpc":"1.0","method":"m","id":1}"#).expect_err("bad version");
        assert_eq!(err.code, code::INVALID_REQUEST);

        let (_, err) = parse_line(r#"{"method":"m","id":1}"#).expect_err("missing version");
        assert_eq!(err.code, code::INVALID_REQUEST);
    }

    #[test]
    fn overlong_method_is_rejected() {
        let method = "m".repeat(MAX_METHOD_LEN + 1);
        let line = format!(r#"{{"jsonrpc":"2.0","method":"{method}","id":1}}"#);
        let (_, err) = parse_line(&line).expect_err("overlong method");
        assert_eq!(err.code, code::INVALID_REQUEST);
    }

    #[test]
    fn boolean_id_is_rejected_with_null_id() {
        let (id, err) =
            parse_line(r#"{"jsonrpc":"2.0","method":"m","id":true}"#).expect_err("bad id");
        assert_eq!(id, Value::Null);
        assert_eq!(err.code, code::INVALID_REQUEST);
    }

    #[test]
    fn array_params_are_rejected() {
        let (_, err) =
            parse_line(r#"{"jsonrpc":"2.0","method":"m","params":[],"id":1}"#).expect_err("params");
        assert_eq!(err.code, code::INVALID_REQUEST);
    }

    #[test]
    fn success_line_carries_exactly_result() {
        let line = success(&json!(3), &json!({}));
        let parsed: Value = serde_json::from_str(&line).expect("valid json");
        assert_eq!(parsed["id"], json!(3));
        assert_eq!(parsed["result"], json!({}));
        assert!(parsed.get("error").is_none());
    }

    #[test]
    fn failure_line_carries_code_message_and_optional_data() {
        let err = RpcError::upstream("upstream status 400").with_data(json!({"status": 400}));
        let line = failure(&json!("x"), &err);
        let parsed: Value = serde_json::from_str(&line).expect("valid json");
        assert_eq!(parsed["error"]["code"], json!(code::UPSTREAM_ERROR));
        assert_eq!(parsed["error"]["data"]["status"], json!(400));
        assert!(parsed.get("result").is_none());
    }
}
