mod test_utils;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use test_utils::TestApp;
use uuid::Uuid;

#[tokio::test]
async fn test_register_book_and_check_in() {
    let app = TestApp::new();
    let plan = app.plan().await;

    let response = app
        .server
        .post("/auth/register")
        .json(&json!({
            "first_name": "Tirunesh",
            "last_name": "Dibaba",
            "email": "  Tirunesh@Example.com ",
            "role": "member",
            "password": "correct horse",
            "plan_id": plan["id"]
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let registered = response.json::<Value>();
    assert_eq!(registered["user"]["email"], "tirunesh@example.com");
    assert!(registered["user"].get("password_hash").is_none());
    assert_eq!(registered["membership"]["status"], "active");
    assert_eq!(registered["membership"]["end_date"], "2024-02-01T00:00:00Z");

    let member = &registered["member"];
    let session = app.session(1).await;

    let booked = app
        .server
        .post("/bookings")
        .json(&json!({"member_id": member["id"], "session_id": session["id"]}))
        .await;
    booked.assert_status(StatusCode::CREATED);
    assert_eq!(booked.json::<Value>()["status"], "booked");

    let again = app
        .server
        .post("/bookings")
        .json(&json!({"member_id": member["id"], "session_id": session["id"]}))
        .await;
    again.assert_status(StatusCode::CONFLICT);
    assert_eq!(again.json::<Value>()["error"], "Class session is full");

    let checked_in = app
        .server
        .post("/attendance/checkin")
        .json(&json!({"member_id": member["id"], "session_id": session["id"], "method": "qr"}))
        .await;
    checked_in.assert_status(StatusCode::CREATED);

    let twice = app
        .server
        .post("/attendance/checkin")
        .json(&json!({"member_id": member["id"], "session_id": session["id"], "method": "staff"}))
        .await;
    twice.assert_status(StatusCode::CONFLICT);

    let bookings = app
        .server
        .get(&format!("/sessions/{}/bookings", session["id"].as_str().unwrap()))
        .await
        .json::<Value>();
    assert_eq!(bookings[0]["status"], "attended");

    let history = app
        .server
        .get(&format!("/attendance/member/{}", member["id"].as_str().unwrap()))
        .await
        .json::<Vec<Value>>();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["checkin_method"], "qr");
}

#[tokio::test]
async fn test_register_rejections() {
    let app = TestApp::new();
    app.member("taken@example.com").await;

    let duplicate = app
        .server
        .post("/auth/register")
        .json(&json!({
            "first_name": "Other",
            "last_name": "Person",
            "email": "TAKEN@example.com",
            "role": "trainer",
            "password": "pw"
        }))
        .await;
    duplicate.assert_status(StatusCode::CONFLICT);

    let unknown_plan = app
        .server
        .post("/auth/register")
        .json(&json!({
            "first_name": "New",
            "last_name": "Member",
            "email": "new@example.com",
            "role": "member",
            "password": "pw",
            "plan_id": Uuid::new_v4()
        }))
        .await;
    unknown_plan.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(unknown_plan.json::<Value>()["error"], "Referenced plan does not exist");
    assert_eq!(app.db.counts().await.users, 1);
}

#[tokio::test]
async fn test_login() {
    let app = TestApp::new();
    app.member("runner@example.com").await;

    let ok = app
        .server
        .post("/auth/login")
        .json(&json!({"email": "Runner@example.com", "password": "correct horse"}))
        .await;
    ok.assert_status_ok();
    assert_eq!(ok.json::<Value>()["role"], "member");

    for (email, password) in [
        ("runner@example.com", "wrong"),
        ("nobody@example.com", "correct horse"),
    ] {
        let denied = app
            .server
            .post("/auth/login")
            .json(&json!({"email": email, "password": password}))
            .await;
        denied.assert_status(StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_user_listings() {
    let app = TestApp::new();
    app.member("m@example.com").await;
    app.register("t@example.com", "trainer", None).await;

    let all = app.server.get("/auth/users").await.json::<Value>();
    assert_eq!(all["count"], 2);

    let trainers = app.server.get("/auth/trainers").await.json::<Value>();
    assert_eq!(trainers["count"], 1);
    assert_eq!(trainers["users"][0]["email"], "t@example.com");

    let members = app
        .server
        .get("/auth/users")
        .add_query_param("role", "member")
        .await
        .json::<Value>();
    assert_eq!(members["users"][0]["email"], "m@example.com");
}

#[tokio::test]
async fn test_session_time_must_be_canonical() {
    let app = TestApp::new();
    let session = app.session(5).await;
    let class_id = session["class_id"].clone();

    for (starts_at, ends_at) in [
        ("2024-01-02 06:00:00", "2024-01-02T07:00:00Z"),
        ("2024-01-02T07:00:00Z", "2024-01-02T06:00:00Z"),
    ] {
        let response = app
            .server
            .post("/sessions")
            .json(&json!({
                "class_id": class_id,
                "starts_at": starts_at,
                "ends_at": ends_at
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
    assert_eq!(app.db.counts().await.sessions, 1);

    let inherited = app
        .server
        .post("/sessions")
        .json(&json!({
            "class_id": class_id,
            "starts_at": "2024-01-03T06:00:00+03:00",
            "ends_at": "2024-01-03T07:00:00+03:00"
        }))
        .await;
    inherited.assert_status(StatusCode::CREATED);
    let inherited = inherited.json::<Value>();
    assert_eq!(inherited["capacity"], 20);
    assert_eq!(inherited["starts_at"], "2024-01-03T03:00:00Z");
}

#[tokio::test]
async fn test_cancelled_session_rejects_bookings() {
    let app = TestApp::new();
    let member = app.member("m@example.com").await;
    let session = app.session(5).await;
    let session_id = session["id"].as_str().unwrap();

    app.server
        .post(&format!("/sessions/{session_id}/cancel"))
        .await
        .assert_status_ok();

    let response = app
        .server
        .post("/bookings")
        .json(&json!({"member_id": member["id"], "session_id": session_id}))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    let unknown = app
        .server
        .post("/bookings")
        .json(&json!({"member_id": member["id"], "session_id": Uuid::new_v4()}))
        .await;
    unknown.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_membership_and_payment_endpoints() {
    let app = TestApp::new();
    let member = app.member("m@example.com").await;
    let member_id = member["id"].as_str().unwrap();

    let memberships = app
        .server
        .get(&format!("/memberships/member/{member_id}"))
        .await
        .json::<Vec<Value>>();
    assert_eq!(memberships.len(), 1);
    let membership_id = memberships[0]["id"].as_str().unwrap();

    app.server
        .post(&format!("/memberships/{membership_id}/cancel"))
        .await
        .assert_status_ok();
    app.server
        .post(&format!("/memberships/{membership_id}/cancel"))
        .await
        .assert_status(StatusCode::CONFLICT);

    let report = app.server.post("/memberships/lifecycle").await.json::<Value>();
    assert_eq!(report, json!({"expired": [], "renewed": []}));

    let payment = app
        .server
        .post("/payments")
        .json(&json!({"member_id": member_id, "amount_cents": 150000, "method": "cbe-birr"}))
        .await;
    payment.assert_status(StatusCode::CREATED);
    let payment = payment.json::<Value>();
    assert_eq!(payment["currency"], "ETB");
    assert_eq!(payment["status"], "pending");

    app.server
        .post("/payments")
        .json(&json!({"member_id": member_id, "amount_cents": 0, "method": "cash"}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let listed = app
        .server
        .get(&format!("/payments/member/{member_id}"))
        .await
        .json::<Vec<Value>>();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn test_member_delete() {
    let app = TestApp::new();
    let member = app.member("m@example.com").await;
    let path = format!("/members/{}", member["id"].as_str().unwrap());

    app.server.delete(&path).await.assert_status(StatusCode::NO_CONTENT);
    app.server.get(&path).await.assert_status(StatusCode::NOT_FOUND);
    app.server.delete(&path).await.assert_status(StatusCode::NOT_FOUND);
}
