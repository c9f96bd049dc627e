use crate::ipc::error::{err, schedule_err};
use crate::ipc::types::{AppState, Request};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

pub fn required_str(req: &Request, key: &str) -> Result<String, Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

/// Absent, null and blank all read as `None`.
pub fn optional_str(req: &Request, key: &str) -> Result<Option<String>, Value> {
    match req.params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let t = s.trim();
            Ok((!t.is_empty()).then(|| t.to_string()))
        }
        Some(_) => Err(err(
            &req.id,
            "bad_params",
            format!("{} must be string or null", key),
            None,
        )),
    }
}

pub fn required_object<'a>(req: &'a Request, key: &str) -> Result<&'a Map<String, Value>, Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_object())
        .ok_or_else(|| err(&req.id, "bad_params", format!("{} must be an object", key), None))
}

/// Deserializes `params[key]` (or all of `params` when `key` is `None`).
pub fn parse_params<T: DeserializeOwned>(req: &Request, key: Option<&str>) -> Result<T, Value> {
    let raw = match key {
        Some(k) => req.params.get(k).cloned().unwrap_or(Value::Null),
        None => req.params.clone(),
    };
    serde_json::from_value(raw).map_err(|e| {
        let what = key.unwrap_or("params");
        err(&req.id, "bad_params", format!("invalid {}: {}", what, e), None)
    })
}

pub fn to_json<T: serde::Serialize>(req: &Request, value: &T) -> Result<Value, Value> {
    serde_json::to_value(value)
        .map_err(|e| err(&req.id, "internal", format!("serialize failed: {}", e), None))
}

pub fn conflicts_json(state: &AppState) -> Value {
    serde_json::to_value(state.store.conflicts()).unwrap_or_else(|_| json!([]))
}

pub fn check<T>(req: &Request, r: crate::error::Result<T>) -> Result<T, Value> {
    r.map_err(|e| schedule_err(&req.id, &e))
}
