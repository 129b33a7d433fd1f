use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use fleet_core::{InsightReply, InsightRequest, InsightService, PortResult};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Notify;
use tower::ServiceExt;

use fleet_api::adapters::{DisabledInsightAdapter, JsonFileStorage};
use fleet_api::config::Config;
use fleet_api::web::{build_router, state::AppState};

/// Fresh state over an empty data directory, so every collection starts seeded.
async fn load_state(dir: &TempDir) -> Arc<AppState> {
    let config = Arc::new(Config::with_data_dir(dir.path().to_path_buf()));
    let storage = Arc::new(JsonFileStorage::new(dir.path()));
    AppState::load(config, storage, Arc::new(DisabledInsightAdapter))
        .await
        .unwrap()
}

async fn send(
    state: &Arc<AppState>,
    method: &str,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let app = build_router(state.clone());
    let builder = Request::builder().method(method).uri(path);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

async fn login(state: &Arc<AppState>, username: &str, password: &str) -> (StatusCode, Value) {
    send(
        state,
        "POST",
        "/auth/login",
        Some(json!({ "usernameOrEmail": username, "password": password })),
    )
    .await
}

async fn register_customer(state: &Arc<AppState>, username: &str) {
    let (status, _) = send(
        state,
        "POST",
        "/auth/register",
        Some(json!({
            "username": username,
            "fullName": "Ravi Kumar",
            "email": format!("{}@example.com", username),
            "password": "pw",
            "confirmPassword": "pw",
            "role": "CUSTOMER",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_login_lands_by_role() {
    let dir = TempDir::new().unwrap();
    let state = load_state(&dir).await;

    let (status, json) = login(&state, "admin@kvrinfra.com", "admin123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["role"], "ADMIN");
    assert_eq!(json["landing"], "SITES");
    assert!(json.get("password").is_none());

    let (status, json) = send(&state, "GET", "/auth/me", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["username"], "admin");
}

#[tokio::test]
async fn test_bad_password_is_rejected() {
    let dir = TempDir::new().unwrap();
    let state = load_state(&dir).await;

    let (status, json) = login(&state, "admin", "wrong").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Invalid username or password");
}

#[tokio::test]
async fn test_protected_routes_need_login() {
    let dir = TempDir::new().unwrap();
    let state = load_state(&dir).await;

    let (status, _) = send(&state, "GET", "/sites", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    login(&state, "admin", "admin123").await;
    let (status, _) = send(&state, "POST", "/auth/logout", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&state, "GET", "/trucks", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_operator_sees_only_assigned_site() {
    let dir = TempDir::new().unwrap();
    let state = load_state(&dir).await;
    login(&state, "op1", "op123").await;

    let (status, json) = send(&state, "GET", "/sites", None).await;
    assert_eq!(status, StatusCode::OK);
    let sites = json.as_array().unwrap();
    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0]["id"], "site-1");

    let (status, _) = send(
        &state,
        "POST",
        "/sites",
        Some(json!({ "name": "Kakinada Port", "location": "Kakinada" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_register_rejects_mismatched_passwords_and_duplicates() {
    let dir = TempDir::new().unwrap();
    let state = load_state(&dir).await;

    let mut body = json!({
        "username": "admin",
        "fullName": "Someone",
        "email": "someone@example.com",
        "password": "a",
        "confirmPassword": "b",
        "role": "CUSTOMER",
    });
    let (status, _) = send(&state, "POST", "/auth/register", Some(body.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    body["confirmPassword"] = json!("a");
    let (status, _) = send(&state, "POST", "/auth/register", Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_site_delete_cascades_to_trucks_and_records() {
    let dir = TempDir::new().unwrap();
    let state = load_state(&dir).await;
    login(&state, "admin", "admin123").await;

    let (status, _) = send(&state, "DELETE", "/sites/site-1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, trucks) = send(&state, "GET", "/trucks", None).await;
    let ids: Vec<&str> = trucks
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["t3"]);

    let (status, _) = send(&state, "GET", "/trucks/t1/records", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&state, "DELETE", "/sites/site-1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_record_is_prepended_and_persisted() {
    let dir = TempDir::new().unwrap();
    let state = load_state(&dir).await;
    login(&state, "op1", "op123").await;

    let (status, record) = send(
        &state,
        "POST",
        "/trucks/t1/records",
        Some(json!({ "material": "Sand", "quantity": "8 Tons", "type": "UNLOADING" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["truckId"], "t1");

    let (_, records) = send(&state, "GET", "/trucks/t1/records", None).await;
    assert_eq!(records[0]["id"], record["id"]);

    let stored = std::fs::read_to_string(dir.path().join("kvr_records.json")).unwrap();
    assert!(stored.contains("Sand"));
    assert!(!dir.path().join("kvr_sites.json").exists());
}

#[tokio::test]
async fn test_booking_dispatch_flow() {
    let dir = TempDir::new().unwrap();
    let state = load_state(&dir).await;

    register_customer(&state, "ravi").await;
    let (_, me) = login(&state, "ravi", "pw").await;
    assert_eq!(me["landing"], "CUSTOMER_HOME");

    let (status, booking) = send(
        &state,
        "POST",
        "/bookings",
        Some(json!({ "vehicleTypeId": "v2", "pickup": "Gajuwaka", "drop": "Site 1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["status"], "SEARCHING");
    assert_eq!(booking["price"], 450.0);
    let booking_id = booking["id"].as_str().unwrap().to_string();

    let (status, _) = send(&state, "GET", "/dispatch", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    login(&state, "admin", "admin123").await;
    let (_, candidates) = send(
        &state,
        "GET",
        &format!("/dispatch/{}/candidates", booking_id),
        None,
    )
    .await;
    let ids: Vec<&str> = candidates
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["t1", "t2"]);

    let (status, _) = send(
        &state,
        "POST",
        &format!("/dispatch/{}/assign", booking_id),
        Some(json!({ "truckId": "t3" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, assigned) = send(
        &state,
        "POST",
        &format!("/dispatch/{}/assign", booking_id),
        Some(json!({ "truckId": "t1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(assigned["status"], "ASSIGNED");
    assert_eq!(assigned["truckId"], "t1");

    let (status, _) = send(
        &state,
        "POST",
        &format!("/dispatch/{}/assign", booking_id),
        Some(json!({ "truckId": "t2" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, board) = send(&state, "GET", "/dispatch", None).await;
    assert!(board["pending"].as_array().unwrap().is_empty());
    assert_eq!(board["active"].as_array().unwrap().len(), 1);

    let (_, sites) = send(&state, "GET", "/sites", None).await;
    assert_eq!(sites[0]["queue"], json!(["t1"]));
}

#[tokio::test]
async fn test_service_tasks_drive_status() {
    let dir = TempDir::new().unwrap();
    let state = load_state(&dir).await;
    login(&state, "admin", "admin123").await;

    let (status, request) = send(
        &state,
        "POST",
        "/service-requests",
        Some(json!({
            "truckId": "t2",
            "type": "Brake Service",
            "priority": "HIGH",
            "tasks": ["Replace pads", "Bleed lines"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(request["status"], "PENDING");
    assert_eq!(request["completionPercent"], 0);

    let request_id = request["id"].as_str().unwrap();
    let mut last = Value::Null;
    for task in request["tasks"].as_array().unwrap() {
        let path = format!(
            "/service-requests/{}/tasks/{}/toggle",
            request_id,
            task["id"].as_str().unwrap()
        );
        let (status, json) = send(&state, "POST", &path, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], if last.is_null() { "IN_PROGRESS" } else { "COMPLETED" });
        last = json;
    }
    assert_eq!(last["completionPercent"], 100);

    let (status, _) = send(
        &state,
        "POST",
        &format!("/service-requests/{}/tasks/task-missing/toggle", request_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dashboard_summarises_fleet() {
    let dir = TempDir::new().unwrap();
    let state = load_state(&dir).await;
    login(&state, "admin", "admin123").await;

    let (status, json) = send(&state, "GET", "/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["siteCount"], 3);
    assert_eq!(json["truckCount"], 3);
    assert_eq!(json["averageHealthIndex"], 85);
    assert_eq!(json["fleet"][0]["siteName"], "Vizag Smart City Project");
}

#[tokio::test]
async fn test_insight_falls_back_without_provider() {
    let dir = TempDir::new().unwrap();
    let state = load_state(&dir).await;
    login(&state, "admin", "admin123").await;

    let (status, json) = send(
        &state,
        "POST",
        "/insights",
        Some(json!({ "prompt": "Which site is slowest?", "mode": "search" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reply"]["text"], "Neural bridge disrupted.");
    assert_eq!(json["messages"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_collections_survive_restart() {
    let dir = TempDir::new().unwrap();
    {
        let state = load_state(&dir).await;
        login(&state, "admin", "admin123").await;
        let (status, _) = send(
            &state,
            "POST",
            "/sites",
            Some(json!({ "name": "Kakinada Port", "location": "Kakinada" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let state = load_state(&dir).await;
    let (status, json) = send(&state, "GET", "/sites", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 4);
}

/// Books a v2 truck as a fresh customer and returns the booking id.
async fn book_v2(state: &Arc<AppState>) -> String {
    let (status, booking) = send(
        state,
        "POST",
        "/bookings",
        Some(json!({ "vehicleTypeId": "v2", "pickup": "Gajuwaka", "drop": "Site 1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    booking["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_updates_cannot_double_book_a_truck() {
    let dir = TempDir::new().unwrap();
    let state = load_state(&dir).await;
    register_customer(&state, "ravi").await;
    login(&state, "ravi", "pw").await;
    let first = book_v2(&state).await;
    let second = book_v2(&state).await;

    login(&state, "admin", "admin123").await;
    let (status, _) = send(
        &state,
        "POST",
        &format!("/dispatch/{}/assign", first),
        Some(json!({ "truckId": "t1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, bookings) = send(&state, "GET", "/bookings", None).await;
    let mut forged = bookings
        .as_array()
        .unwrap()
        .iter()
        .find(|b| b["id"] == second.as_str())
        .unwrap()
        .clone();
    forged["truckId"] = json!("t1");
    forged["status"] = json!("ASSIGNED");
    let (status, _) = send(&state, "PUT", &format!("/bookings/{}", second), Some(forged)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, trucks) = send(&state, "GET", "/trucks", None).await;
    let mut t1 = trucks[0].clone();
    assert_eq!(t1["id"], "t1");
    t1["status"] = json!("IDLE");
    let (status, _) = send(&state, "PUT", "/trucks/t1", Some(t1.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let mut t2 = trucks[1].clone();
    t2["fuelLevel"] = json!(150);
    let (status, _) = send(&state, "PUT", "/trucks/t2", Some(t2)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&state, "DELETE", "/trucks/t1", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, sites) = send(&state, "GET", "/sites", None).await;
    assert_eq!(sites[0]["queue"], json!(["t1"]));
    let (_, board) = send(&state, "GET", "/dispatch", None).await;
    assert_eq!(board["pending"][0]["id"], second.as_str());
}

#[tokio::test]
async fn test_inactive_class_cannot_be_booked() {
    let dir = TempDir::new().unwrap();
    let state = load_state(&dir).await;
    login(&state, "admin", "admin123").await;
    let (status, json) = send(&state, "POST", "/vehicle-types/v2/toggle", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["isActive"], false);

    let (status, _) = send(
        &state,
        "POST",
        "/bookings",
        Some(json!({ "vehicleTypeId": "v2", "pickup": "Gajuwaka", "drop": "Site 1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Answers only after a long pause, announcing when the call has started.
struct SlowInsight {
    started: Arc<Notify>,
}

#[async_trait]
impl InsightService for SlowInsight {
    async fn ask(&self, _request: InsightRequest) -> PortResult<InsightReply> {
        self.started.notify_one();
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(InsightReply {
            text: "Too late.".to_string(),
            sources: Vec::new(),
        })
    }
}

#[tokio::test]
async fn test_login_is_not_blocked_by_a_pending_insight() {
    let dir = TempDir::new().unwrap();
    let started = Arc::new(Notify::new());
    let config = Arc::new(Config::with_data_dir(dir.path().to_path_buf()));
    let storage = Arc::new(JsonFileStorage::new(dir.path()));
    let insight = Arc::new(SlowInsight {
        started: started.clone(),
    });
    let state = AppState::load(config, storage, insight).await.unwrap();
    login(&state, "admin", "admin123").await;

    let asking = {
        let state = state.clone();
        tokio::spawn(async move {
            send(
                &state,
                "POST",
                "/insights",
                Some(json!({ "prompt": "Which site is slowest?" })),
            )
            .await
        })
    };
    started.notified().await;

    let (status, _) = tokio::time::timeout(
        Duration::from_secs(3),
        login(&state, "op1", "op123"),
    )
    .await
    .expect("login waited on the insight call");
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&state, "GET", "/insights", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["messages"].as_array().unwrap().len(), 1);
    asking.abort();
}
