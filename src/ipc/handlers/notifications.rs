use crate::error::ScheduleError;
use crate::ipc::error::{err, ok, schedule_err};
use crate::ipc::helpers::{optional_str, parse_params, required_str, to_json};
use crate::ipc::types::{AppState, Request};
use crate::notifications::{FeedFilter, NewNotification};
use serde_json::{json, Value};
use tracing::debug;

fn handle_list(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    let filter = match optional_str(req, "filter")? {
        None => FeedFilter::All,
        Some(f) => FeedFilter::parse(&f).ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                "filter must be one of: all, unread, action",
                None,
            )
        })?,
    };
    let feed = &state.store.notifications;
    Ok(ok(
        &req.id,
        json!({
            "notifications": to_json(req, &feed.list(filter))?,
            "unreadCount": feed.unread_count()
        }),
    ))
}

fn handle_push(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    let n: NewNotification = parse_params(req, None)?;
    let id = state.store.notifications.push(n);
    debug!(notification_id = %id, "notification pushed");
    Ok(ok(&req.id, json!({ "notificationId": id })))
}

fn handle_mark_read(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    let id = required_str(req, "notificationId")?;
    if !state.store.notifications.mark_read(&id) {
        let e = ScheduleError::not_found("notification", id.as_str());
        return Err(schedule_err(&req.id, &e));
    }
    Ok(ok(&req.id, json!({ "ok": true })))
}

fn handle_mark_all_read(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    let changed = state.store.notifications.mark_all_read();
    Ok(ok(&req.id, json!({ "ok": true, "changed": changed })))
}

fn handle_dismiss(state: &mut AppState, req: &Request) -> Result<Value, Value> {
    let id = required_str(req, "notificationId")?;
    if !state.store.notifications.dismiss(&id) {
        let e = ScheduleError::not_found("notification", id.as_str());
        return Err(schedule_err(&req.id, &e));
    }
    Ok(ok(&req.id, json!({ "ok": true })))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "notifications.list" => handle_list(state, req),
        "notifications.push" => handle_push(state, req),
        "notifications.markRead" => handle_mark_read(state, req),
        "notifications.markAllRead" => handle_mark_all_read(state, req),
        "notifications.dismiss" => handle_dismiss(state, req),
        _ => return None,
    };
    Some(result.unwrap_or_else(|e| e))
}
