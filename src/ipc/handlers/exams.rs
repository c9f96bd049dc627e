use crate::ipc::error::ok;
use crate::ipc::helpers::{check, parse_params, required_str, to_json};
use crate::ipc::types::{AppState, Request};
use crate::schedule::{ExamStatus, NewExam};
use serde_json::{json, Value};

fn handle_list(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    let mut exams: Vec<_> = state.store.exams().iter().collect();
    exams.sort_by_key(|x| (x.exam_date, x.start_time));
    let exams = to_json(req, &exams)?;
    Ok(ok(&req.id, json!({ "exams": exams })))
}

fn handle_create(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    let input: NewExam = parse_params(req, None)?;
    let exam_id = check(req, state.store.add_exam(input))?;
    Ok(ok(&req.id, json!({ "examId": exam_id })))
}

fn handle_update_status(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    let exam_id = required_str(req, "examId")?;
    let status = check(req, ExamStatus::parse(&required_str(req, "status")?))?;
    let exam = check(req, state.store.set_exam_status(&exam_id, status))?;
    let exam = to_json(req, exam)?;
    Ok(ok(&req.id, json!({ "exam": exam })))
}

fn handle_delete(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    let exam_id = required_str(req, "examId")?;
    check(req, state.store.remove_exam(&exam_id))?;
    Ok(ok(&req.id, json!({ "removed": exam_id })))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "exams.list" => handle_list(state, req),
        "exams.create" => handle_create(state, req),
        "exams.updateStatus" => handle_update_status(state, req),
        "exams.delete" => handle_delete(state, req),
        _ => return None,
    };
    Some(result.unwrap_or_else(|e| e))
}
