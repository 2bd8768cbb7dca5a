use crate::error::MarksError;
use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

/// Maps a domain error onto the wire. `store_code` distinguishes reads from writes.
pub fn marks_err(id: &str, e: &MarksError, store_code: &str) -> serde_json::Value {
    match e {
        MarksError::Validation { field, message } => err(
            id,
            "bad_params",
            message.clone(),
            Some(json!({ "field": field })),
        ),
        MarksError::NotFound { roll_no } => err(
            id,
            "not_found",
            e.to_string(),
            Some(json!({ "rollNo": roll_no })),
        ),
        MarksError::Store(inner) => {
            tracing::warn!(code = store_code, error = %inner, "store operation failed");
            err(id, store_code, inner.to_string(), None)
        }
    }
}
