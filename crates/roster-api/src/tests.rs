//! Router tests driven with `tower::ServiceExt::oneshot` against an
//! in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Method, Request, StatusCode, header},
};
use roster_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::api_router;

async fn app() -> Router {
  let store = SqliteStore::open_in_memory().await.expect("in-memory store");
  api_router(Arc::new(store))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let builder = Request::builder().method(method).uri(uri);
  let req = match body {
    Some(b) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(b.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };
  let resp = app.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

async fn create_person(app: &Router, national_id: &str, last: &str) -> String {
  let (status, body) = send(
    app,
    Method::POST,
    "/persons",
    Some(json!({ "national_id": national_id, "last_name": last, "first_name": "Ivan" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  body["person_id"].as_str().unwrap().to_owned()
}

async fn create_kind(app: &Router, code: &str) -> String {
  let (status, body) = send(
    app,
    Method::POST,
    "/status-kinds",
    Some(json!({ "code": code, "name": format!("status {code}") })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  body["status_kind_id"].as_str().unwrap().to_owned()
}

// ─── Error mapping ───────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_fetch_person() {
  let app = app().await;
  let id = create_person(&app, "1234567890", "Petrenko").await;

  let (status, body) = send(&app, Method::GET, &format!("/persons/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["last_name"], "Petrenko");
}

#[tokio::test]
async fn validation_failure_is_422_with_fields() {
  let app = app().await;
  let (status, body) = send(
    &app,
    Method::POST,
    "/persons",
    Some(json!({ "national_id": "1", "last_name": " ", "first_name": "" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  let fields: Vec<_> = body["fields"]
    .as_array()
    .unwrap()
    .iter()
    .map(|f| f["field"].as_str().unwrap())
    .collect();
  assert_eq!(fields, vec!["last_name", "first_name"]);
}

#[tokio::test]
async fn duplicate_is_409() {
  let app = app().await;
  create_person(&app, "1234567890", "Petrenko").await;
  let (status, body) = send(
    &app,
    Method::POST,
    "/persons",
    Some(json!({ "national_id": "1234567890", "last_name": "Other", "first_name": "X" })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body["error"].as_str().unwrap().contains("conflict"));
}

#[tokio::test]
async fn missing_records_are_404() {
  let app = app().await;
  let id = uuid::Uuid::new_v4();

  let (status, _) = send(&app, Method::GET, &format!("/persons/{id}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) = send(&app, Method::GET, &format!("/persons/{id}/status-on"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) = send(
    &app,
    Method::POST,
    &format!("/plan-actions/{id}/approve"),
    Some(json!({ "order_ref": "1" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ─── Status on date ──────────────────────────────────────────────────────────

#[tokio::test]
async fn status_on_date_by_day() {
  let app = app().await;
  let person = create_person(&app, "1234567890", "Petrenko").await;
  let present = create_kind(&app, "100").await;
  let leave = create_kind(&app, "В").await;

  for (kind, at) in [(&present, "2025-01-01T00:00:00Z"), (&leave, "2025-03-01T00:00:00Z")] {
    let (status, body) = send(
      &app,
      Method::POST,
      &format!("/persons/{person}/status"),
      Some(json!({ "status_kind_id": kind, "effective_at": at })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
  }

  let uri = |date: &str| format!("/persons/{person}/status-on?date={date}");

  let (_, body) = send(&app, Method::GET, &uri("2025-02-01"), None).await;
  assert_eq!(body["presence"], "present");
  assert_eq!(body["code"], "100");

  let (_, body) = send(&app, Method::GET, &uri("2025-04-01"), None).await;
  assert_eq!(body["code"], "В");

  let (_, body) = send(&app, Method::GET, &uri("2024-12-01"), None).await;
  assert_eq!(body["presence"], "not_present");

  let (status, body) = send(&app, Method::GET, "/roster?date=2025-02-01", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body[0]["status"]["code"], "100");
}

#[tokio::test]
async fn at_and_date_together_is_400() {
  let app = app().await;
  let (status, _) = send(
    &app,
    Method::GET,
    "/roster?date=2025-02-01&at=2025-02-01T00:00:00Z",
    None,
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reorder_status_kinds() {
  let app = app().await;
  let first = create_kind(&app, "A").await;
  create_kind(&app, "B").await;

  let (status, body) = send(
    &app,
    Method::POST,
    &format!("/status-kinds/{first}/reorder"),
    Some(json!({ "position": 2 })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body[0]["code"], "B");
  assert_eq!(body[1]["code"], "A");
  assert_eq!(body[1]["order"], 2);
}

// ─── Assignments ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn occupied_position_is_409() {
  let app = app().await;
  let a = create_person(&app, "1", "Antonenko").await;
  let b = create_person(&app, "2", "Bondarenko").await;
  let (_, position) = send(
    &app,
    Method::POST,
    "/positions",
    Some(json!({ "code": "P-1", "short_name": "rifleman", "org_path": "1 bn" })),
  )
  .await;
  let position_id = position["position_id"].as_str().unwrap();

  let assign = json!({ "position_id": position_id, "opened_at": "2025-01-01T00:00:00Z" });
  let (status, body) =
    send(&app, Method::POST, &format!("/persons/{a}/assignments"), Some(assign.clone())).await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  assert!(body["closed"].is_null());

  let (status, _) =
    send(&app, Method::POST, &format!("/persons/{b}/assignments"), Some(assign)).await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (status, body) =
    send(&app, Method::GET, &format!("/persons/{a}/assignments/open"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["position_id"], position_id);
}

#[tokio::test]
async fn unassign_accepts_missing_body() {
  let app = app().await;
  let person = create_person(&app, "1", "Antonenko").await;
  let (_, position) = send(
    &app,
    Method::POST,
    "/positions",
    Some(json!({ "code": "P-1", "short_name": "rifleman", "org_path": "1 bn" })),
  )
  .await;
  let position_id = position["position_id"].as_str().unwrap();

  let assign = json!({ "position_id": position_id, "opened_at": "2025-01-01T00:00:00Z" });
  let (status, _) =
    send(&app, Method::POST, &format!("/persons/{person}/assignments"), Some(assign)).await;
  assert_eq!(status, StatusCode::CREATED);

  let (status, body) =
    send(&app, Method::POST, &format!("/persons/{person}/unassign"), None).await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert!(body["closed_at"].is_string());

  let (status, _) =
    send(&app, Method::GET, &format!("/persons/{person}/assignments/open"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ─── Plan actions ────────────────────────────────────────────────────────────

#[tokio::test]
async fn approve_plan_action_once() {
  let app = app().await;
  let person = create_person(&app, "1", "Petrenko").await;

  let (status, action) = send(
    &app,
    Method::POST,
    "/plan-actions",
    Some(json!({
      "person_id": person,
      "kind": "dispatch",
      "effective_at": "2025-02-01T00:00:00Z",
      "destination": "training centre"
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{action}");
  let id = action["plan_action_id"].as_str().unwrap();

  let approve = json!({ "order_ref": "45/ОС" });
  let (status, body) =
    send(&app, Method::POST, &format!("/plan-actions/{id}/approve"), Some(approve.clone())).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["state"]["state"], "approved");

  let (status, _) =
    send(&app, Method::POST, &format!("/plan-actions/{id}/approve"), Some(approve)).await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (_, due) = send(&app, Method::GET, "/plan-actions/due?date=2025-02-01", None).await;
  assert_eq!(due.as_array().unwrap().len(), 1);

  let (status, approved) = send(&app, Method::GET, "/plan-actions?state=approved", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(approved.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_plan_state_filter_is_400() {
  let app = app().await;
  let (status, _) = send(&app, Method::GET, "/plan-actions?state=foo", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, body) = send(&app, Method::GET, "/plan-actions?state=planned", None).await;
  assert_eq!(status, StatusCode::OK);
  assert!(body.as_array().unwrap().is_empty());
}
