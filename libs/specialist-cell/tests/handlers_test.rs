use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use specialist_cell::router::specialist_routes;
use specialist_cell::{InMemorySpecialistRepository, SpecialistService};
use shared_utils::test_utils::SpecialistPayloads;

fn create_test_app() -> Router {
    let service = SpecialistService::new(Arc::new(InMemorySpecialistRepository::new()));
    specialist_routes(Arc::new(service))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

async fn create(app: &Router, registration_number: &str) -> Value {
    let (status, body) = send(app, "POST", "/", Some(SpecialistPayloads::create(registration_number))).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

#[tokio::test]
async fn test_create_specialist() {
    let app = create_test_app();

    let created = create(&app, "RP-100").await;

    assert_eq!(created["id"], 1);
    assert_eq!(created["nombre_completo"], "Dra. Ana Torres");
    assert_eq!(created["registro_profesional"], "RP-100");
    assert_eq!(created["is_active"], true);
    assert_eq!(created["dias_y_horas_atencion"][0]["dia"], "Lunes");
    assert_eq!(created["dias_y_horas_atencion"][0]["rangos"][1]["inicio"], "14:00");
}

#[tokio::test]
async fn test_create_rejects_inverted_range() {
    let app = create_test_app();
    let payload = SpecialistPayloads::create_with_schedule(
        "RP-100",
        json!([{ "dia": "Lunes", "rangos": [{ "inicio": "09:00", "fin": "08:00" }] }]),
    );

    let (status, body) = send(&app, "POST", "/", Some(payload)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["code"], "E_INVALID_RANGE_ORDER");
    assert_eq!(body["errors"][0]["field"], "dias_y_horas_atencion.0.rangos.0");
}

#[tokio::test]
async fn test_create_rejects_overlapping_ranges() {
    let app = create_test_app();
    let payload = SpecialistPayloads::create_with_schedule(
        "RP-100",
        json!([{ "dia": "Lunes", "rangos": [
            { "inicio": "09:00", "fin": "10:00" },
            { "inicio": "09:30", "fin": "11:00" }
        ] }]),
    );

    let (status, body) = send(&app, "POST", "/", Some(payload)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["code"], "E_OVERLAPPING_SCHEDULES");
    assert!(errors[0]["message"].as_str().unwrap().contains("Lunes"));

    // Nothing was written.
    let (_, listed) = send(&app, "GET", "/", None).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn test_create_reports_every_structural_error() {
    let app = create_test_app();
    let payload = json!({
        "nombre_completo": "Al",
        "dias_y_horas_atencion": [{ "dia": "Lunes", "rangos": [{ "inicio": "9:00", "fin": "10:00" }] }]
    });

    let (status, body) = send(&app, "POST", "/", Some(payload)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|error| error["field"].as_str().unwrap())
        .collect();
    assert_eq!(
        fields,
        vec![
            "nombre_completo",
            "especialidad",
            "registro_profesional",
            "dias_y_horas_atencion.0.rangos.0.inicio",
        ]
    );
}

#[tokio::test]
async fn test_create_rejects_malformed_json() {
    let app = create_test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from("{\"nombre_completo\": "))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["errors"][0]["code"], "E_INVALID_PAYLOAD");
}

#[tokio::test]
async fn test_duplicate_registration_number() {
    let app = create_test_app();
    create(&app, "RP-100").await;

    let (status, body) = send(&app, "POST", "/", Some(SpecialistPayloads::create("RP-100"))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["code"], "E_UNIQUE");
    assert_eq!(body["errors"][0]["field"], "registro_profesional");
}

#[tokio::test]
async fn test_get_and_list_specialists() {
    let app = create_test_app();
    create(&app, "RP-100").await;
    create(&app, "RP-200").await;

    let (status, body) = send(&app, "GET", "/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["registro_profesional"], "RP-200");

    let (status, body) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["id"], 1);
}

#[tokio::test]
async fn test_get_unknown_specialist() {
    let app = create_test_app();

    let (status, body) = send(&app, "GET", "/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errors"][0]["code"], "E_NOT_FOUND");

    let (status, _) = send(&app, "GET", "/not-a-number", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_specialist() {
    let app = create_test_app();
    create(&app, "RP-100").await;

    let (status, body) = send(
        &app,
        "PATCH",
        "/1",
        Some(json!({ "especialidad": "Neurología", "dias_y_horas_atencion": null })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["especialidad"], "Neurología");
    assert_eq!(body["nombre_completo"], "Dra. Ana Torres");
    assert!(body["dias_y_horas_atencion"].is_null());

    let (status, body) = send(&app, "PUT", "/1", Some(json!({ "registro_profesional": "RP-100" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["registro_profesional"], "RP-100");
}

#[tokio::test]
async fn test_update_validation_errors() {
    let app = create_test_app();
    create(&app, "RP-100").await;
    create(&app, "RP-200").await;

    let (status, body) = send(&app, "PUT", "/2", Some(json!({ "registro_profesional": "RP-100" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["code"], "E_UNIQUE");

    let (status, body) = send(
        &app,
        "PUT",
        "/2",
        Some(json!({ "dias_y_horas_atencion": [{ "dia": "Viernes", "rangos": [
            { "inicio": "08:00", "fin": "10:00" },
            { "inicio": "09:59", "fin": "12:00" }
        ] }] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["code"], "E_OVERLAPPING_SCHEDULES");

    let (_, unchanged) = send(&app, "GET", "/2", None).await;
    assert_eq!(unchanged["dias_y_horas_atencion"][0]["dia"], "Lunes");
}

#[tokio::test]
async fn test_update_unknown_specialist() {
    let app = create_test_app();

    let (status, _) = send(&app, "PUT", "/7", Some(json!({ "nombre_completo": "" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_soft_delete_restore_and_hard_delete() {
    let app = create_test_app();
    create(&app, "RP-100").await;
    create(&app, "RP-200").await;

    let (status, body) = send(&app, "DELETE", "/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);

    let (_, active) = send(&app, "GET", "/?is_active=true", None).await;
    assert_eq!(active.as_array().unwrap().len(), 1);
    let (_, inactive) = send(&app, "GET", "/?is_active=false", None).await;
    assert_eq!(inactive[0]["id"], 1);

    let (status, _) = send(&app, "PUT", "/1/restore", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, restored) = send(&app, "GET", "/1", None).await;
    assert_eq!(restored["is_active"], true);

    let (status, body) = send(&app, "DELETE", "/1/hard-delete", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);

    let (status, _) = send(&app, "GET", "/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_lifecycle_endpoints_with_unknown_id() {
    let app = create_test_app();

    for (method, uri) in [("DELETE", "/5"), ("PUT", "/5/restore"), ("DELETE", "/5/hard-delete"), ("DELETE", "/abc")] {
        let (status, body) = send(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{} {}", method, uri);
        assert_eq!(body["errors"][0]["code"], "E_NOT_FOUND");
    }
}

#[tokio::test]
async fn test_invalid_list_filter() {
    let app = create_test_app();

    let (status, body) = send(&app, "GET", "/?is_active=maybe", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["code"], "E_INVALID_PAYLOAD");
}
