mod test_support;

use serde_json::json;
use test_support::{request_err, request_ok, spawn_sidecar};

#[test]
fn feed_lifecycle() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let first = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "notifications.push",
        json!({ "type": "info", "title": "Term starts", "message": "Week 1 begins Monday" }),
    );
    let first_id = first["notificationId"].as_str().expect("id").to_string();
    let second = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "notifications.push",
        json!({
            "type": "error",
            "title": "Room unavailable",
            "message": "B-101 is closed for repairs",
            "actionRequired": true,
            "relatedId": "a"
        }),
    );
    let second_id = second["notificationId"].as_str().expect("id").to_string();
    assert_ne!(first_id, second_id);

    let all = request_ok(&mut stdin, &mut reader, "3", "notifications.list", json!({}));
    let items = all["notifications"].as_array().expect("items");
    assert_eq!(items.len(), 2);
    // Newest first.
    assert_eq!(items[0]["id"].as_str(), Some(second_id.as_str()));
    assert_eq!(all["unreadCount"].as_u64(), Some(2));

    let action = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "notifications.list",
        json!({ "filter": "action" }),
    );
    assert_eq!(action["notifications"].as_array().map(|a| a.len()), Some(1));

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "notifications.markRead",
        json!({ "notificationId": first_id }),
    );
    let unread = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "notifications.list",
        json!({ "filter": "unread" }),
    );
    assert_eq!(unread["unreadCount"].as_u64(), Some(1));
    assert_eq!(
        unread["notifications"][0]["id"].as_str(),
        Some(second_id.as_str())
    );

    let all_read = request_ok(&mut stdin, &mut reader, "7", "notifications.markAllRead", json!({}));
    assert_eq!(all_read["changed"].as_u64(), Some(1));

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "notifications.dismiss",
        json!({ "notificationId": second_id }),
    );
    let all = request_ok(&mut stdin, &mut reader, "9", "notifications.list", json!({}));
    assert_eq!(all["notifications"].as_array().map(|a| a.len()), Some(1));
    assert_eq!(all["unreadCount"].as_u64(), Some(0));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn bad_notification_requests() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let code = request_err(
        &mut stdin,
        &mut reader,
        "1",
        "notifications.markRead",
        json!({ "notificationId": "missing" }),
    );
    assert_eq!(code, "not_found");

    let code = request_err(
        &mut stdin,
        &mut reader,
        "2",
        "notifications.dismiss",
        json!({ "notificationId": "missing" }),
    );
    assert_eq!(code, "not_found");

    let code = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "notifications.list",
        json!({ "filter": "starred" }),
    );
    assert_eq!(code, "bad_params");

    let code = request_err(
        &mut stdin,
        &mut reader,
        "4",
        "notifications.push",
        json!({ "type": "urgent", "title": "x", "message": "y" }),
    );
    assert_eq!(code, "bad_params");

    drop(stdin);
    let _ = child.wait();
}
