//! Route-level tests driving the axum router in-process.

#![cfg(feature = "http-server")]

mod support;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use barbershop::config::AppConfig;
use barbershop::http::{create_router, AppState};

async fn app() -> (Router, support::SeededStore) {
    let seeded = support::seeded_store().await;
    let router = create_router(AppState::new(seeded.store.clone(), AppConfig::default()));
    (router, seeded)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn appointment_body(service_id: &str, barber_id: &str, time: &str) -> Value {
    json!({
        "customer_name": "Jordan Lee",
        "customer_phone": "+1 555 0134",
        "customer_email": "jordan@example.com",
        "service_id": service_id,
        "barber_id": barber_id,
        "date": "2024-06-01",
        "time": time,
    })
}

#[tokio::test]
async fn test_liveness_messages() {
    let (router, _) = app().await;

    let (status, body) = send(&router, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Barber Shop API is running");

    let (status, body) = send(&router, get("/api/hello")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Hello from the backend API!");
}

#[tokio::test]
async fn test_health_and_diagnostics() {
    let (router, seeded) = app().await;

    let (status, body) = send(&router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "connected");

    let (status, body) = send(&router, get("/test")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["backend"], "✅ Running");
    assert_eq!(body["collections"], json!(["barber", "service"]));

    seeded.local.set_healthy(false);
    let (status, body) = send(&router, get("/test")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["connection_status"], "Not Connected");
}

#[tokio::test]
async fn test_list_catalog() {
    let (router, _) = app().await;

    let (status, body) = send(&router, get("/api/services")).await;
    assert_eq!(status, StatusCode::OK);
    let services = body.as_array().unwrap();
    assert_eq!(services.len(), 4);
    assert_eq!(services[0]["name"], "Haircut");
    assert_eq!(services[0]["duration_minutes"], 30);
    assert_eq!(services[0]["price"], 25.0);
    assert!(services[0]["id"].as_str().is_some());

    let (status, body) = send(&router, get("/api/barbers")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
    assert_eq!(body[2]["bio"], "Fast and friendly.");
}

#[tokio::test]
async fn test_booking_flow() {
    let (router, seeded) = app().await;
    let service_id = seeded.services[0].id.clone();
    let barber_id = seeded.barbers[0].id.clone();

    let (status, created) = send(
        &router,
        post_json(
            "/api/appointments",
            &appointment_body(&service_id, &barber_id, "14:00"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["barber_id"], barber_id.as_str());
    let created_id = created["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &router,
        post_json(
            "/api/appointments",
            &appointment_body(&service_id, &barber_id, "14:00"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "SLOT_CONFLICT");
    assert_eq!(body["detail"], "Time slot already booked for this barber");

    let (status, _) = send(
        &router,
        post_json(
            "/api/appointments",
            &appointment_body(&service_id, &barber_id, "14:30"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/api/appointments?date=2024-06-01&barber_id={}", barber_id);
    let (status, body) = send(&router, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().any(|a| a["id"] == created_id.as_str()));

    let (_, body) = send(&router, get("/api/appointments?date=&barber_id=")).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_invalid_references() {
    let (router, seeded) = app().await;

    let (status, body) = send(
        &router,
        post_json(
            "/api/appointments",
            &appointment_body("000000000000000000000000", &seeded.barbers[0].id, "14:00"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_REFERENCE");
    assert_eq!(body["detail"], "Invalid service_id");

    let (status, body) = send(
        &router,
        post_json(
            "/api/appointments",
            &appointment_body(&seeded.services[0].id, "not-a-barber", "14:00"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid barber_id");
}

#[tokio::test]
async fn test_malformed_input() {
    let (router, seeded) = app().await;

    let mut bad = appointment_body(&seeded.services[0].id, &seeded.barbers[0].id, "25:00");
    bad["date"] = json!("06/01/2024");
    let (status, body) = send(&router, post_json("/api/appointments", &bad)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MALFORMED_INPUT");
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert!(fields.contains(&"date"));
    assert!(fields.contains(&"time"));

    let (status, body) = send(
        &router,
        post_json("/api/appointments", &json!({ "customer_name": "Jordan" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MALFORMED_INPUT");

    let no_content_type = Request::builder()
        .method(Method::POST)
        .uri("/api/appointments")
        .body(Body::from("not json"))
        .unwrap();
    let (status, body) = send(&router, no_content_type).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MALFORMED_INPUT");

    assert_eq!(seeded.local.document_count("appointment"), 0);
}

#[tokio::test]
async fn test_space_padded_time_cannot_alias_a_booked_slot() {
    let (router, seeded) = app().await;
    let service_id = seeded.services[0].id.clone();
    let barber_id = seeded.barbers[0].id.clone();

    let (status, _) = send(
        &router,
        post_json(
            "/api/appointments",
            &appointment_body(&service_id, &barber_id, "09:30"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &router,
        post_json(
            "/api/appointments",
            &appointment_body(&service_id, &barber_id, " 9:30"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MALFORMED_INPUT");
    assert_eq!(body["errors"][0]["field"], "time");
    assert_eq!(seeded.local.document_count("appointment"), 1);
}

#[tokio::test]
async fn test_bad_query_string_uses_error_body() {
    let (router, _) = app().await;
    let (status, body) = send(&router, get("/api/appointments?date=a&date=b")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MALFORMED_INPUT");
    assert!(body["detail"].as_str().is_some_and(|d| d.contains("date")));
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let (router, seeded) = app().await;
    let mut body = appointment_body(&seeded.services[0].id, &seeded.barbers[0].id, "09:00");
    body["customer_name"] = json!("x".repeat(barbershop::http::router::MAX_BODY_BYTES + 1));

    let (status, body) = send(&router, post_json("/api/appointments", &body)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    assert_eq!(seeded.local.document_count("appointment"), 0);
}

#[tokio::test]
async fn test_store_outage_is_reported() {
    let (router, seeded) = app().await;
    seeded.local.set_healthy(false);

    let (status, body) = send(&router, get("/api/services")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "STORE_UNAVAILABLE");
    assert_eq!(body["detail"], "Database not available");

    let (status, body) = send(
        &router,
        post_json(
            "/api/appointments",
            &appointment_body(&seeded.services[0].id, &seeded.barbers[0].id, "09:00"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "STORE_UNAVAILABLE");
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let (router, _) = app().await;
    let request = Request::builder()
        .uri("/api/services")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
