use crate::conflicts::detect_resource_conflicts;
use crate::error::ScheduleError;
use crate::ipc::error::ok;
use crate::ipc::helpers::{check, conflicts_json, required_str, to_json};
use crate::ipc::types::{AppState, Request};
use crate::suggest::suggest_slots;
use serde_json::{json, Value};
use tracing::debug;

fn handle_list(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    Ok(ok(
        &req.id,
        json!({
            "conflicts": conflicts_json(state),
            "count": state.store.conflicts().len()
        }),
    ))
}

fn handle_resources(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    let found = detect_resource_conflicts(state.store.entries());
    let count = found.len();
    Ok(ok(
        &req.id,
        json!({ "conflicts": to_json(req, &found)?, "count": count }),
    ))
}

fn handle_suggest(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    let entry_id = required_str(req, "entryId")?;
    let entry = check(
        req,
        state
            .store
            .entry(&entry_id)
            .ok_or_else(|| ScheduleError::not_found("entry", entry_id.as_str())),
    )?;
    let suggestions = suggest_slots(
        entry,
        state.store.entries(),
        &state.settings.slot_search(),
    );
    debug!(entry_id = %entry_id, found = suggestions.len(), "slot suggestions");
    Ok(ok(
        &req.id,
        json!({ "entryId": entry_id, "suggestions": to_json(req, &suggestions)? }),
    ))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "conflicts.list" => handle_list(state, req),
        "conflicts.resources" => handle_resources(state, req),
        "conflicts.suggest" => handle_suggest(state, req),
        _ => return None,
    };
    Some(result.unwrap_or_else(|e| e))
}
