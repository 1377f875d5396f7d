#![expect(clippy::unwrap_used, reason = "test code")]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use smartcrm_core::{AppConfig, AuthConfig, ReminderConfig};
use smartcrm_http::{AppState, create_router};
use smartcrm_storage::StorageBackend;
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    token: String,
    _dir: TempDir,
}

fn test_config(dir: &TempDir) -> AppConfig {
    AppConfig {
        database_url: None,
        db_path: dir.path().join("crm.db"),
        auth: AuthConfig { jwt_secret: "test-secret".to_owned(), token_ttl_hours: 1 },
        cors_origins: Vec::new(),
        smtp: None,
        reminders: ReminderConfig::default(),
    }
}

async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

impl TestApp {
    async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let storage = Arc::new(StorageBackend::new_sqlite(&config.db_path).unwrap());
        let state = AppState::new(storage, &config).unwrap();
        let router = create_router(Arc::new(state));

        let creds = json!({"email": "Agent@Example.com", "password": "hunter22"});
        let (status, body) = send(&router, json_request("POST", "/api/auth/signup", None, &creds)).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let token = body["token"].as_str().unwrap().to_owned();
        Self { router, token, _dir: dir }
    }

    async fn call(&self, method: &str, uri: &str, body: &Value) -> (StatusCode, Value) {
        send(&self.router, json_request(method, uri, Some(&self.token), body)).await
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        send(&self.router, get(uri, Some(&self.token))).await
    }

    async fn activity_count(&self) -> usize {
        let (status, body) = self.get("/api/activity-logs?limit=1000").await;
        assert_eq!(status, StatusCode::OK);
        body.as_array().unwrap().len()
    }

    async fn create_contact(&self, phone: &str, shop: &str) -> String {
        let (status, body) = self
            .call(
                "POST",
                "/api/contacts",
                &json!({"phone": phone, "customer_name": "Asha", "data": {"shop_name": shop}}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["id"].as_str().unwrap().to_owned()
    }
}

#[tokio::test]
async fn health_and_version_are_public() {
    let app = TestApp::new().await;
    let (status, body) = send(&app.router, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".to_owned()));

    let (status, body) = send(&app.router, get("/api/version", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["backend"], "sqlite");
}

#[tokio::test]
async fn auth_flow_and_credential_errors() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/auth/me").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "agent@example.com");

    let (status, body) = send(&app.router, get("/api/contacts", None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Not authenticated");

    let (status, body) = send(&app.router, get("/api/contacts", Some("garbage"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Invalid token");

    let creds = json!({"email": "agent@example.com", "password": "hunter22"});
    let (status, body) = send(&app.router, json_request("POST", "/api/auth/signup", None, &creds)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Email already registered");

    let (status, body) = send(&app.router, json_request("POST", "/api/auth/login", None, &creds)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");

    let wrong = json!({"email": "agent@example.com", "password": "nope-nope"});
    let (status, _) = send(&app.router, json_request("POST", "/api/auth/login", None, &wrong)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_phone_is_a_conflict() {
    let app = TestApp::new().await;
    app.create_contact("9000000001", "Asha Stores").await;
    let (status, body) = app
        .call("POST", "/api/contacts", &json!({"phone": " 9000000001 ", "data": {}}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"], "Contact with this phone number already exists");

    let (status, body) = app.get("/api/contacts/count").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);

    let (status, _) = app.get("/api/contacts?status=bogus").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.get("/api/contacts/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn every_mutation_appends_one_activity_entry() {
    let app = TestApp::new().await;
    let mut expected = 0;

    let contact_id = app.create_contact("9000000001", "Asha Stores").await;
    expected += 1;
    assert_eq!(app.activity_count().await, expected);

    let due = (Utc::now() + Duration::days(1)).to_rfc3339();
    let steps: Vec<(&str, String, Value)> = vec![
        ("PUT", format!("/api/contacts/{contact_id}"), json!({"status": "Interested"})),
        ("POST", format!("/api/contacts/{contact_id}/call"), json!({})),
        ("POST", "/api/notes".to_owned(), json!({"contact_id": contact_id, "content": "Call back"})),
        (
            "POST",
            "/api/followups".to_owned(),
            json!({"contact_id": contact_id, "follow_up_date": due}),
        ),
        (
            "POST",
            "/api/meetings".to_owned(),
            json!({"title": "Visit", "date": "2026-11-02", "time": "10:30",
                   "attendees": [{"contact_id": contact_id, "phone": "9000000001"}]}),
        ),
        ("POST", "/api/demos".to_owned(), json!({"contact_id": contact_id})),
    ];
    let mut ids = Vec::new();
    for (method, uri, body) in steps {
        let (status, resp) = app.call(method, &uri, &body).await;
        assert_eq!(status, StatusCode::OK, "{uri}: {resp}");
        ids.push(resp["id"].as_str().map(str::to_owned));
        expected += 1;
        assert_eq!(app.activity_count().await, expected, "{uri}");
    }

    let followup_id = ids[3].clone().unwrap();
    let meeting_id = ids[4].clone().unwrap();
    let demo_id = ids[5].clone().unwrap();
    let more: Vec<(&str, String, Value)> = vec![
        ("PUT", format!("/api/followups/{followup_id}/complete"), json!({})),
        ("PUT", format!("/api/meetings/{meeting_id}"), json!({"location": "Shop"})),
        ("PUT", format!("/api/meetings/{meeting_id}/status"), json!({"status": "completed"})),
        ("PUT", format!("/api/demos/{demo_id}/watched"), json!({})),
        ("DELETE", format!("/api/meetings/{meeting_id}"), json!({})),
        ("DELETE", format!("/api/contacts/{contact_id}"), json!({})),
    ];
    for (method, uri, body) in more {
        let (status, resp) = app.call(method, &uri, &body).await;
        assert_eq!(status, StatusCode::OK, "{uri}: {resp}");
        expected += 1;
        assert_eq!(app.activity_count().await, expected, "{uri}");
    }

    let (_, log) = app.get("/api/activity-logs?limit=1").await;
    assert_eq!(log[0]["action"], "Deleted contact");
    assert_eq!(log[0]["target"], "9000000001");
}

#[tokio::test]
async fn overdue_followups_leave_the_list_once_completed() {
    let app = TestApp::new().await;
    let contact_id = app.create_contact("9000000001", "Asha Stores").await;
    let past = (Utc::now() - Duration::days(2)).to_rfc3339();
    let (_, followup) = app
        .call("POST", "/api/followups", &json!({"contact_id": contact_id, "follow_up_date": past}))
        .await;
    let id = followup["id"].as_str().unwrap().to_owned();

    let (status, body) = app.get("/api/followups/upcoming").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overdue"].as_array().unwrap().len(), 1);
    assert_eq!(body["overdue"][0]["state"], "overdue");
    assert_eq!(body["overdue"][0]["contact"]["phone"], "9000000001");

    let (_, overdue) = app.get("/api/followups?status=overdue").await;
    assert_eq!(overdue.as_array().unwrap().len(), 1);

    let next = (Utc::now() + Duration::days(3)).to_rfc3339();
    let (status, body) = app
        .call("PUT", &format!("/api/followups/{id}/complete"), &json!({"next_follow_up_date": next}))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["completed"]["status"], "completed");
    assert_eq!(body["next"]["previous_id"], id.as_str());

    let (_, body) = app.get("/api/followups/upcoming").await;
    assert!(body["overdue"].as_array().unwrap().is_empty());
    assert_eq!(body["upcoming"].as_array().unwrap().len(), 1);

    let (_, body) = app.get("/api/followups/by-date?date_filter=this_week").await;
    assert_eq!(body["filter"], "this_week");
    assert_eq!(body["count"], 1);

    let (status, _) = app.get("/api/followups/by-date?date_filter=someday").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.call("PUT", "/api/followups/missing/complete", &json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn second_active_demo_is_rejected() {
    let app = TestApp::new().await;
    let contact_id = app.create_contact("9000000001", "Asha Stores").await;
    let (status, _) = app.call("POST", "/api/demos", &json!({"contact_id": contact_id})).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.call("POST", "/api/demos", &json!({"contact_id": contact_id})).await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    let today = Utc::now().date_naive();
    let tomorrow = today.succ_opt().unwrap();
    let (status, body) = app.get(&format!("/api/demos/summary?start={today}&end={tomorrow}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["given"], 1);
    assert_eq!(body["watched"], 0);

    let (status, _) = app.get("/api/demos/summary?start=yesterday&end=today").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

fn multipart_body(boundary: &str, file: &[u8], mapping: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"file\"; filename=\"leads.xlsx\"\r\n\
          Content-Type: application/octet-stream\r\n\r\n",
    );
    body.extend_from_slice(file);
    body.extend_from_slice(b"\r\n");
    if let Some(mapping) = mapping {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(b"Content-Disposition: form-data; name=\"column_mapping\"\r\n\r\n");
        body.extend_from_slice(mapping.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

fn leads_workbook() -> Vec<u8> {
    let mut book = rust_xlsxwriter::Workbook::new();
    let sheet = book.add_worksheet();
    for (col, title) in (0u16..).zip(["Phone", "Shop Name", "City"]) {
        sheet.write_string(0, col, title).unwrap();
    }
    let rows = [("9000000001", "Asha Stores"), ("9000000001", "Asha Stores"), ("9000000002", "Ravi Kirana")];
    for (row, (phone, shop)) in (1u32..).zip(rows) {
        sheet.write_string(row, 0, phone).unwrap();
        sheet.write_string(row, 1, shop).unwrap();
        sheet.write_string(row, 2, "Pune").unwrap();
    }
    book.save_to_buffer().unwrap()
}

#[tokio::test]
async fn import_reports_file_and_database_duplicates() {
    let app = TestApp::new().await;
    app.create_contact("9000000002", "Ravi Kirana").await;
    let before = app.activity_count().await;

    let boundary = "smartcrm-boundary";
    let mapping = r#"{"phone": "Phone", "shop_name": "Shop Name", "city": "City"}"#;
    let request = |body: Vec<u8>, uri: &str| {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", app.token))
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
            .body(Body::from(body))
            .unwrap()
    };

    let preview_body = multipart_body(boundary, &leads_workbook(), None);
    let (status, preview) = send(&app.router, request(preview_body, "/api/contacts/preview")).await;
    assert_eq!(status, StatusCode::OK, "{preview}");
    assert_eq!(preview["suggested_mapping"]["Phone"], "phone");
    assert_eq!(preview["sample_data"].as_array().unwrap().len(), 3);

    let body = multipart_body(boundary, &leads_workbook(), Some(mapping));
    let (status, report) = send(&app.router, request(body, "/api/contacts/import")).await;
    assert_eq!(status, StatusCode::OK, "{report}");
    assert_eq!(report["imported"], 1);
    assert_eq!(report["file_duplicates_removed"], 1);
    assert_eq!(report["db_duplicates"], 1);
    assert_eq!(report["original_excel_rows"], 3);
    assert_eq!(app.activity_count().await, before + 1);

    let body = multipart_body(boundary, &leads_workbook(), None);
    let (status, body) = send(&app.router, request(body, "/api/contacts/import")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "column_mapping is required");
}
