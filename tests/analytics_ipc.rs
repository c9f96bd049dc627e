mod test_support;

use serde_json::json;
use test_support::{entry, request_ok, spawn_sidecar};

fn exam(id: &str, date: &str, invigilator: &str) -> serde_json::Value {
    json!({
        "id": id,
        "courseId": "C-a",
        "courseName": "Course a",
        "examDate": date,
        "startTime": "09:00",
        "endTime": "11:00",
        "venue": "Hall 1",
        "invigilatorId": invigilator,
        "invigilatorName": "Someone"
    })
}

#[test]
fn reports_follow_the_loaded_snapshot() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let mut grace = entry("c", "Tuesday", "14:00", "16:00");
    grace["instructorId"] = json!("T9");
    grace["instructorName"] = json!("Grace Hopper");
    grace["classroom"] = json!("Lab 2");

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "timetable.load",
        json!({
            "entries": [
                entry("a", "Monday", "09:00", "10:30"),
                entry("b", "Monday", "09:30", "11:00"),
                grace
            ],
            "exams": [
                exam("x1", "2024-03-04", "T1"),
                exam("x2", "2024-03-10", "T1")
            ],
            "instructors": [
                { "id": "T1", "name": "Ada Lovelace" },
                { "id": "T5", "name": "Idle Person" }
            ]
        }),
    );

    let workload = request_ok(&mut stdin, &mut reader, "2", "analytics.workload", json!({}));
    let rows = workload["rows"].as_array().expect("rows");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["instructorId"].as_str(), Some("T1"));
    assert_eq!(rows[0]["classCount"].as_u64(), Some(2));
    assert_eq!(rows[0]["examCount"].as_u64(), Some(2));
    assert_eq!(rows[0]["totalHours"].as_f64(), Some(3.0));
    assert_eq!(rows[0]["band"].as_str(), Some("Low"));
    assert_eq!(rows[1]["instructorId"].as_str(), Some("T9"));
    assert_eq!(rows[1]["instructorName"].as_str(), Some("Grace Hopper"));
    assert_eq!(rows[2]["instructorId"].as_str(), Some("T5"));
    assert_eq!(rows[2]["totalHours"].as_f64(), Some(0.0));

    let rooms = request_ok(&mut stdin, &mut reader, "3", "analytics.rooms", json!({}));
    let rows = rooms["rows"].as_array().expect("rows");
    assert_eq!(rows[0]["room"].as_str(), Some("B-101"));
    assert_eq!(rows[0]["count"].as_u64(), Some(2));
    assert_eq!(rows[1]["room"].as_str(), Some("Lab 2"));

    let slots = request_ok(&mut stdin, &mut reader, "4", "analytics.timeSlots", json!({}));
    let labels: Vec<(&str, u64)> = slots["rows"]
        .as_array()
        .expect("rows")
        .iter()
        .map(|r| (r["slot"].as_str().unwrap_or(""), r["count"].as_u64().unwrap_or(0)))
        .collect();
    assert_eq!(labels, vec![("09:00", 2), ("14:00", 1)]);

    let days = request_ok(&mut stdin, &mut reader, "5", "analytics.days", json!({}));
    let rows = days["rows"].as_array().expect("rows");
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0]["day"].as_str(), Some("Monday"));
    assert_eq!(rows[0]["classCount"].as_u64(), Some(2));
    // The Sunday exam is left out.
    assert_eq!(rows[0]["examCount"].as_u64(), Some(1));
    assert_eq!(rows[0]["total"].as_u64(), Some(3));

    let conflicts = request_ok(&mut stdin, &mut reader, "6", "analytics.conflicts", json!({}));
    assert_eq!(conflicts["totalEntries"].as_u64(), Some(3));
    assert_eq!(conflicts["timeOverlaps"].as_u64(), Some(1));
    assert_eq!(conflicts["instructorConflicts"].as_u64(), Some(1));
    assert_eq!(conflicts["roomConflicts"].as_u64(), Some(1));

    let summary = request_ok(&mut stdin, &mut reader, "7", "analytics.summary", json!({}));
    assert_eq!(summary["totalEntries"].as_u64(), Some(3));
    assert_eq!(summary["totalExams"].as_u64(), Some(2));
    assert_eq!(summary["totalHours"].as_f64(), Some(5.0));
    assert_eq!(summary["peakSlot"]["slot"].as_str(), Some("09:00"));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn workload_bands_follow_settings() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "timetable.load",
        json!({ "entries": [entry("a", "Monday", "08:00", "12:00")] }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "setup.update",
        json!({ "patch": { "workloadMediumHours": 2, "workloadHighHours": 3 } }),
    );
    let workload = request_ok(&mut stdin, &mut reader, "3", "analytics.workload", json!({}));
    assert_eq!(workload["rows"][0]["band"].as_str(), Some("High"));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn room_spellings_are_grouped() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let mut other = entry("b", "Monday", "09:30", "11:00");
    other["instructorId"] = json!("T2");
    other["classroom"] = json!("b-101");
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "timetable.load",
        json!({ "entries": [entry("a", "Monday", "09:00", "10:30"), other] }),
    );

    let rooms = request_ok(&mut stdin, &mut reader, "2", "analytics.rooms", json!({}));
    assert_eq!(rooms["rows"], json!([{ "room": "B-101", "count": 2 }]));
    let conflicts = request_ok(&mut stdin, &mut reader, "3", "analytics.conflicts", json!({}));
    assert_eq!(conflicts["roomConflicts"].as_u64(), Some(1));

    drop(stdin);
    let _ = child.wait();
}
