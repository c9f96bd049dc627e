use crate::analytics::{
    compute_conflict_analysis, compute_day_distribution, compute_room_utilization,
    compute_time_slot_distribution, compute_workload, WorkloadThresholds,
};
use crate::ipc::error::ok;
use crate::ipc::helpers::to_json;
use crate::ipc::types::{AppState, Request};
use serde_json::{json, Value};

fn thresholds(state: &AppState) -> WorkloadThresholds {
    WorkloadThresholds {
        high_hours: state.settings.workload_high_hours,
        medium_hours: state.settings.workload_medium_hours,
    }
}

fn workload_json(state: &AppState, req: &Request) -> Result<Value, Value> {
    let rows = compute_workload(
        state.store.entries(),
        state.store.exams(),
        state.store.instructors(),
        thresholds(state),
    );
    to_json(req, &rows)
}

fn handle_workload(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    Ok(ok(&req.id, json!({ "rows": workload_json(state, req)? })))
}

fn handle_rooms(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    let rows = compute_room_utilization(state.store.entries());
    Ok(ok(&req.id, json!({ "rows": to_json(req, &rows)? })))
}

fn handle_time_slots(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    let rows = compute_time_slot_distribution(state.store.entries());
    Ok(ok(&req.id, json!({ "rows": to_json(req, &rows)? })))
}

fn handle_days(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    let rows = compute_day_distribution(state.store.entries(), state.store.exams());
    Ok(ok(&req.id, json!({ "rows": to_json(req, &rows)? })))
}

fn handle_conflicts(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    let analysis = compute_conflict_analysis(state.store.entries());
    Ok(ok(&req.id, to_json(req, &analysis)?))
}

fn handle_summary(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    let entries = state.store.entries();
    let slots = compute_time_slot_distribution(entries);
    let peak = slots.iter().max_by(|a, b| {
        a.count
            .cmp(&b.count)
            // Earlier slot wins a tie.
            .then_with(|| b.slot.cmp(&a.slot))
    });
    let total_hours: f64 = entries.iter().map(|e| e.duration_hours()).sum();
    Ok(ok(
        &req.id,
        json!({
            "totalEntries": entries.len(),
            "totalExams": state.store.exams().len(),
            "totalInstructors": state.store.instructors().len(),
            "totalHours": total_hours,
            "peakSlot": to_json(req, &peak)?,
            "workload": workload_json(state, req)?,
            "rooms": to_json(req, &compute_room_utilization(entries))?,
            "timeSlots": to_json(req, &slots)?,
            "days": to_json(req, &compute_day_distribution(entries, state.store.exams()))?,
            "conflicts": to_json(req, &compute_conflict_analysis(entries))?
        }),
    ))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "analytics.workload" => handle_workload(state, req),
        "analytics.rooms" => handle_rooms(state, req),
        "analytics.timeSlots" => handle_time_slots(state, req),
        "analytics.days" => handle_days(state, req),
        "analytics.conflicts" => handle_conflicts(state, req),
        "analytics.summary" => handle_summary(state, req),
        _ => return None,
    };
    Some(result.unwrap_or_else(|e| e))
}
