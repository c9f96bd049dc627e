use crate::error::ScheduleError;
use crate::ipc::error::{err, ok, schedule_err};
use crate::ipc::helpers::{check, conflicts_json, parse_params, required_str, to_json};
use crate::ipc::types::{AppState, Request};
use crate::notifications::{NewNotification, NotificationType};
use crate::resolution::WorkflowState;
use crate::suggest::{suggest_slots, Suggestion};
use serde_json::{json, Value};
use tracing::info;

/// Workflow state plus the affected entries side by side and, once an entry
/// is picked, its slot suggestions.
fn snapshot(state: &AppState, req: &Request) -> Result<Value, Value> {
    let mut out = to_json(req, state.workflow.state())?;
    if let WorkflowState::Resolving {
        conflict,
        selected_entry,
        ..
    } = state.workflow.state()
    {
        let entries: Vec<_> = conflict
            .affected_entries
            .iter()
            .filter_map(|id| state.store.entry(id))
            .collect();
        out["entries"] = to_json(req, &entries)?;
        let suggestions = match selected_entry.as_deref().and_then(|id| state.store.entry(id)) {
            Some(entry) => suggest_slots(
                entry,
                state.store.entries(),
                &state.settings.slot_search(),
            ),
            None => Vec::new(),
        };
        out["suggestions"] = to_json(req, &suggestions)?;
    }
    Ok(ok(&req.id, out))
}

fn handle_state(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    snapshot(state, req)
}

fn handle_select_conflict(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    let pair: [String; 2] = parse_params(req, Some("affectedEntries"))?;
    let conflict = state
        .store
        .conflicts()
        .iter()
        .find(|c| c.matches_pair(&pair[0], &pair[1]))
        .cloned();
    let conflict = check(
        req,
        conflict.ok_or_else(|| ScheduleError::not_found("conflict", pair.join("/"))),
    )?;
    state.workflow.select_conflict(conflict);
    snapshot(state, req)
}

fn handle_select_entry(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    let entry_id = required_str(req, "entryId")?;
    check(req, state.workflow.select_entry(&entry_id))?;
    snapshot(state, req)
}

fn handle_set_draft(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    let Some(input) = req.params.as_object() else {
        return Err(err(&req.id, "bad_params", "params must be an object", None));
    };
    check(req, state.workflow.edit_draft(input))?;
    snapshot(state, req)
}

fn handle_apply_suggestion(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    let suggestion: Suggestion = parse_params(req, None)?;
    check(req, state.workflow.apply_suggestion(&suggestion))?;
    snapshot(state, req)
}

fn handle_resolve(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    let resolved = check(
        req,
        state
            .workflow
            .resolve(state.store.entries(), state.store.instructors()),
    )?;
    let Some((entry_id, patch)) = resolved else {
        return Ok(ok(
            &req.id,
            json!({ "applied": false, "reason": "no entry selected" }),
        ));
    };

    match state.store.resolve_entry(&entry_id, &patch) {
        Ok(()) => {}
        // The entry vanished since it was picked; nothing to patch.
        Err(e @ ScheduleError::NotFound { .. }) => {
            return Ok(ok(
                &req.id,
                json!({ "applied": false, "entryId": entry_id, "reason": e.to_string() }),
            ));
        }
        Err(e) => return Err(schedule_err(&req.id, &e)),
    }

    let (course, still_conflicting) = match state.store.entry(&entry_id) {
        Some(e) => (
            e.course_name.clone(),
            state.store.conflicts().iter().any(|c| c.involves(&entry_id)),
        ),
        None => (entry_id.clone(), false),
    };
    let note = if still_conflicting {
        NewNotification {
            kind: NotificationType::Warning,
            title: "Conflict still present".into(),
            message: format!("{} was updated but still overlaps another session", course),
            action_required: true,
            related_id: Some(entry_id.clone()),
        }
    } else {
        NewNotification {
            kind: NotificationType::Success,
            title: "Conflict resolved".into(),
            message: format!("{} has been rescheduled", course),
            action_required: false,
            related_id: Some(entry_id.clone()),
        }
    };
    state.store.notifications.push(note);
    info!(entry_id = %entry_id, still_conflicting, "resolution applied");

    let entry = to_json(req, &state.store.entry(&entry_id))?;
    Ok(ok(
        &req.id,
        json!({
            "applied": true,
            "entryId": entry_id,
            "patch": to_json(req, &patch)?,
            "entry": entry,
            "conflicts": conflicts_json(state)
        }),
    ))
}

fn handle_cancel(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    state.workflow.cancel();
    snapshot(state, req)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "resolution.state" => handle_state(state, req),
        "resolution.selectConflict" => handle_select_conflict(state, req),
        "resolution.selectEntry" => handle_select_entry(state, req),
        "resolution.setDraft" => handle_set_draft(state, req),
        "resolution.applySuggestion" => handle_apply_suggestion(state, req),
        "resolution.resolve" => handle_resolve(state, req),
        "resolution.cancel" => handle_cancel(state, req),
        _ => return None,
    };
    Some(result.unwrap_or_else(|e| e))
}
