mod test_support;

use serde_json::json;
use test_support::{entry, request_err, request_ok, spawn_sidecar, spawn_sidecar_with_env};

fn temp_config(body: &serde_json::Value) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("timetabled-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join("settings.json");
    std::fs::write(&path, body.to_string()).expect("write settings");
    path
}

#[test]
fn defaults_are_reported() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let res = request_ok(&mut stdin, &mut reader, "1", "setup.get", json!({}));
    let s = &res["settings"];
    assert_eq!(s["suggestedDurationMinutes"].as_u64(), Some(90));
    assert_eq!(s["maxSuggestions"].as_u64(), Some(3));
    assert_eq!(s["timeSlots"][0].as_str(), Some("08:00"));
    assert_eq!(s["timeSlots"].as_array().map(|a| a.len()), Some(11));
    assert_eq!(s["days"].as_array().map(|a| a.len()), Some(6));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn update_is_atomic_and_validated() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let code = request_err(
        &mut stdin,
        &mut reader,
        "1",
        "setup.update",
        json!({ "patch": { "maxSuggestions": 5, "suggestedDurationMinutes": 5 } }),
    );
    assert_eq!(code, "bad_params");
    let res = request_ok(&mut stdin, &mut reader, "2", "setup.get", json!({}));
    assert_eq!(res["settings"]["maxSuggestions"].as_u64(), Some(3));

    let code = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "setup.update",
        json!({ "patch": { "colour": "blue" } }),
    );
    assert_eq!(code, "bad_params");

    let res = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "setup.update",
        json!({ "patch": { "maxSuggestions": 1, "timeSlots": ["13:00", "08:00", "13:00"] } }),
    );
    assert_eq!(res["settings"]["maxSuggestions"].as_u64(), Some(1));
    assert_eq!(res["settings"]["timeSlots"], json!(["08:00", "13:00"]));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn suggestions_follow_updated_settings() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "timetable.load",
        json!({ "entries": [
            entry("a", "Monday", "09:00", "10:30"),
            entry("b", "Monday", "09:30", "11:00")
        ]}),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "setup.update",
        json!({ "patch": { "timeSlots": ["14:00"], "suggestedDurationMinutes": 60, "maxSuggestions": 2 } }),
    );
    let res = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "conflicts.suggest",
        json!({ "entryId": "a" }),
    );
    let suggestions = res["suggestions"].as_array().expect("suggestions");
    assert_eq!(suggestions.len(), 2);
    assert_eq!(suggestions[0]["day"].as_str(), Some("Monday"));
    assert_eq!(suggestions[0]["startTime"].as_str(), Some("14:00"));
    assert_eq!(suggestions[0]["endTime"].as_str(), Some("15:00"));
    // Then the entry's own times on another day.
    assert_eq!(suggestions[1]["day"].as_str(), Some("Tuesday"));
    assert_eq!(suggestions[1]["startTime"].as_str(), Some("09:00"));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn settings_file_is_loaded_from_env() {
    let path = temp_config(&json!({ "maxSuggestions": 7, "days": ["Monday", "Friday"] }));
    let path_str = path.to_string_lossy().to_string();
    let (mut child, mut stdin, mut reader) =
        spawn_sidecar_with_env(&[("TIMETABLED_CONFIG", path_str.as_str())]);

    let res = request_ok(&mut stdin, &mut reader, "1", "setup.get", json!({}));
    assert_eq!(res["settings"]["maxSuggestions"].as_u64(), Some(7));
    assert_eq!(res["settings"]["days"], json!(["Monday", "Friday"]));
    // Unset fields keep their defaults.
    assert_eq!(res["settings"]["suggestedDurationMinutes"].as_u64(), Some(90));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(path.parent().expect("parent"));
}

#[test]
fn unreadable_settings_file_falls_back_to_defaults() {
    let (mut child, mut stdin, mut reader) =
        spawn_sidecar_with_env(&[("TIMETABLED_CONFIG", "/nonexistent/timetabled.json")]);

    let res = request_ok(&mut stdin, &mut reader, "1", "setup.get", json!({}));
    assert_eq!(res["settings"]["maxSuggestions"].as_u64(), Some(3));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn settings_file_grid_is_sorted_and_deduped() {
    let path = temp_config(&json!({
        "timeSlots": ["15:00", "14:00", "15:00"],
        "days": ["Saturday", "Monday"]
    }));
    let path_str = path.to_string_lossy().to_string();
    let (mut child, mut stdin, mut reader) =
        spawn_sidecar_with_env(&[("TIMETABLED_CONFIG", path_str.as_str())]);

    let res = request_ok(&mut stdin, &mut reader, "1", "setup.get", json!({}));
    assert_eq!(res["settings"]["timeSlots"], json!(["14:00", "15:00"]));
    assert_eq!(res["settings"]["days"], json!(["Monday", "Saturday"]));

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "timetable.load",
        json!({ "entries": [
            entry("a", "Monday", "09:00", "10:30"),
            entry("b", "Monday", "09:30", "11:00")
        ]}),
    );
    let res = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "conflicts.suggest",
        json!({ "entryId": "a" }),
    );
    let starts: Vec<&str> = res["suggestions"]
        .as_array()
        .expect("suggestions")
        .iter()
        .filter_map(|s| s["startTime"].as_str())
        .collect();
    assert_eq!(starts, vec!["14:00", "15:00", "09:00"]);

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(path.parent().expect("parent"));
}
