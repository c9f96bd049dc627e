use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{required_object, to_json};
use crate::ipc::types::{AppState, Request};
use serde_json::{json, Value};
use tracing::info;

fn handle_setup_get(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    let settings = to_json(req, &state.settings)?;
    Ok(ok(&req.id, json!({ "settings": settings })))
}

fn handle_setup_update(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    let patch = required_object(req, "patch")?;
    if let Err(msg) = state.settings.merge_patch(patch) {
        return Err(err(&req.id, "bad_params", msg, None));
    }
    info!(fields = ?patch.keys().collect::<Vec<_>>(), "settings updated");
    let settings = to_json(req, &state.settings)?;
    Ok(ok(&req.id, json!({ "settings": settings })))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "setup.get" => handle_setup_get(state, req),
        "setup.update" => handle_setup_update(state, req),
        _ => return None,
    };
    Some(result.unwrap_or_else(|e| e))
}
