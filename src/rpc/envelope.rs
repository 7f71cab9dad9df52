//! JSON-RPC 2.0 envelopes and error codes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// Request id as sent by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcId {
    Number(serde_json::Number),
    String(String),
}

impl From<i64> for JsonRpcId {
    fn from(id: i64) -> Self {
        Self::Number(id.into())
    }
}

impl From<&str> for JsonRpcId {
    fn from(id: &str) -> Self {
        Self::String(id.to_string())
    }
}

/// A request envelope that passed structural validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcRequest {
    pub method: String,
    pub params: Value,
    pub id: JsonRpcId,
}

impl RpcRequest {
    /// Validate a decoded body.
    ///
    /// Requires `jsonrpc == "2.0"`, a non-empty string `method`, non-null
    /// `params` and a number or non-empty string `id`.
    pub fn from_value(body: &Value) -> Option<Self> {
        let object = body.as_object()?;

        if object.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
            return None;
        }

        let method = object
            .get("method")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())?;

        let params = object.get("params").filter(|p| !p.is_null())?;

        let id = match object.get("id")? {
            Value::Number(n) => JsonRpcId::Number(n.clone()),
            Value::String(s) if !s.is_empty() => JsonRpcId::String(s.clone()),
            _ => return None,
        };

        Some(Self {
            method: method.to_string(),
            params: params.clone(),
            id,
        })
    }
}

/// Error codes the gateway answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    Internal,
}

impl RpcErrorCode {
    pub fn code(self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::Internal => -32000,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::ParseError => "Parse error",
            Self::InvalidRequest => "Invalid Request",
            Self::MethodNotFound => "Method not found",
            Self::InvalidParams => "Invalid params",
            Self::Internal => "Internal error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i32,
    pub message: String,
}

/// Response envelope. Exactly one of `result` and `error` is set; `id` is
/// serialized as `null` when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorObject>,
    pub id: Option<JsonRpcId>,
}

impl RpcResponse {
    pub fn success(id: JsonRpcId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            result: Some(result),
            error: None,
            id: Some(id),
        }
    }

    pub fn failure(id: Option<JsonRpcId>, code: RpcErrorCode) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            result: None,
            error: Some(RpcErrorObject {
                code: code.code(),
                message: code.message().to_string(),
            }),
            id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_request() {
        let request = RpcRequest::from_value(&json!({
            "jsonrpc": "2.0",
            "method": "searchKB",
            "params": { "query": "reset password" },
            "id": "abc"
        }))
        .unwrap();
        assert_eq!(request.method, "searchKB");
        assert_eq!(request.id, JsonRpcId::from("abc"));
    }

    #[test]
    fn test_invalid_requests() {
        let cases = [
            json!({ "jsonrpc": "1.0", "method": "m", "params": {}, "id": 1 }),
            json!({ "jsonrpc": "2.0", "params": {}, "id": 1 }),
            json!({ "jsonrpc": "2.0", "method": "", "params": {}, "id": 1 }),
            json!({ "jsonrpc": "2.0", "method": "m", "id": 1 }),
            json!({ "jsonrpc": "2.0", "method": "m", "params": null, "id": 1 }),
            json!({ "jsonrpc": "2.0", "method": "m", "params": {} }),
            json!({ "jsonrpc": "2.0", "method": "m", "params": {}, "id": null }),
            json!({ "jsonrpc": "2.0", "method": "m", "params": {}, "id": "" }),
            json!([1, 2, 3]),
        ];
        for case in cases {
            assert!(RpcRequest::from_value(&case).is_none(), "accepted {}", case);
        }
    }

    #[test]
    fn test_response_shapes() {
        let ok = serde_json::to_value(RpcResponse::success(7.into(), Value::Null)).unwrap();
        assert_eq!(ok, json!({ "jsonrpc": "2.0", "result": null, "id": 7 }));

        let err = serde_json::to_value(RpcResponse::failure(None, RpcErrorCode::InvalidRequest)).unwrap();
        assert_eq!(
            err,
            json!({
                "jsonrpc": "2.0",
                "error": { "code": -32600, "message": "Invalid Request" },
                "id": null
            })
        );
    }
}
