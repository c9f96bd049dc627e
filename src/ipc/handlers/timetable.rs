use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{
    check, conflicts_json, optional_str, parse_params, required_object, required_str, to_json,
};
use crate::ipc::types::{AppState, Request};
use crate::schedule::{EntryPatch, Instructor, NewEntry, NewExam, SchoolDay};
use crate::store::EntryFilter;
use serde_json::{json, Value};

fn handle_load(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    let entries: Vec<NewEntry> = parse_params(req, Some("entries"))?;
    let exams: Option<Vec<NewExam>> = parse_params(req, Some("exams"))?;
    let instructors: Option<Vec<Instructor>> = parse_params(req, Some("instructors"))?;
    check(
        req,
        state.store.replace_all(
            entries,
            exams.unwrap_or_default(),
            instructors.unwrap_or_default(),
        ),
    )?;
    // Old selection may point at entries that no longer exist.
    state.workflow.cancel();
    Ok(ok(
        &req.id,
        json!({
            "entryCount": state.store.entries().len(),
            "examCount": state.store.exams().len(),
            "instructorCount": state.store.instructors().len(),
            "conflicts": conflicts_json(state)
        }),
    ))
}

fn handle_list(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    let day = optional_str(req, "day")?
        .map(|d| check(req, SchoolDay::parse(&d)))
        .transpose()?;
    let filter = EntryFilter {
        day,
        semester: optional_str(req, "semester")?,
        level: optional_str(req, "level")?,
        instructor_id: optional_str(req, "instructorId")?,
    };
    let entries = to_json(req, &state.store.list_entries(&filter))?;
    Ok(ok(&req.id, json!({ "entries": entries })))
}

fn handle_week_grid(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    let mut days = Vec::new();
    for (day, entries) in state.store.week_grid() {
        days.push(json!({
            "day": day,
            "entries": to_json(req, &entries)?,
        }));
    }
    Ok(ok(&req.id, json!({ "days": days })))
}

fn handle_create(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    let input: NewEntry = parse_params(req, None)?;
    let entry_id = check(req, state.store.add_entry(input))?;
    Ok(ok(
        &req.id,
        json!({ "entryId": entry_id, "conflicts": conflicts_json(state) }),
    ))
}

fn handle_update(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    let entry_id = required_str(req, "entryId")?;
    let patch = check(req, EntryPatch::from_json(required_object(req, "patch")?))?;
    if patch.is_empty() {
        return Err(err(&req.id, "bad_params", "patch must not be empty", None));
    }
    let entry = check(req, state.store.update_entry(&entry_id, &patch))?;
    let entry = to_json(req, entry)?;
    Ok(ok(
        &req.id,
        json!({ "entry": entry, "conflicts": conflicts_json(state) }),
    ))
}

fn handle_delete(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    let entry_id = required_str(req, "entryId")?;
    check(req, state.store.remove_entry(&entry_id))?;
    Ok(ok(
        &req.id,
        json!({ "removed": entry_id, "conflicts": conflicts_json(state) }),
    ))
}

fn handle_instructors_list(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    let instructors = to_json(req, &state.store.instructors())?;
    Ok(ok(&req.id, json!({ "instructors": instructors })))
}

fn handle_instructors_upsert(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    let instructor: Instructor = parse_params(req, None)?;
    let id = instructor.id.clone();
    let created = check(req, state.store.upsert_instructor(instructor))?;
    Ok(ok(&req.id, json!({ "instructorId": id, "created": created })))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "timetable.load" => handle_load(state, req),
        "timetable.list" => handle_list(state, req),
        "timetable.weekGrid" => handle_week_grid(state, req),
        "timetable.create" => handle_create(state, req),
        "timetable.update" => handle_update(state, req),
        "timetable.delete" => handle_delete(state, req),
        "instructors.list" => handle_instructors_list(state, req),
        "instructors.upsert" => handle_instructors_upsert(state, req),
        _ => return None,
    };
    Some(result.unwrap_or_else(|e| e))
}
