use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use shared_models::error::{AppError, ErrorDetail};

use crate::models::{
    error_codes, CreateSpecialistRequest, Specialist, SpecialistFilter,
    UpdateSpecialistRequest,
};
use crate::services::SpecialistService;

fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::NotFound(format!("Specialist {} not found", raw)))
}

fn payload<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value).map_err(|rejection| {
        AppError::validation(ErrorDetail::new(error_codes::INVALID_PAYLOAD, rejection.body_text()))
    })
}

fn lifecycle_response(message: &str, id: i64) -> Json<Value> {
    Json(json!({
        "message": message,
        "id": id
    }))
}

#[axum::debug_handler]
pub async fn list_specialists(
    State(service): State<Arc<SpecialistService>>,
    query: Result<Query<SpecialistFilter>, QueryRejection>,
) -> Result<Json<Vec<Specialist>>, AppError> {
    let Query(filter) = query.map_err(|rejection| {
        AppError::validation(ErrorDetail::new(error_codes::INVALID_PAYLOAD, rejection.body_text()))
    })?;
    let specialists = service.list(filter).await?;
    Ok(Json(specialists))
}

#[axum::debug_handler]
pub async fn create_specialist(
    State(service): State<Arc<SpecialistService>>,
    body: Result<Json<CreateSpecialistRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Specialist>), AppError> {
    let request = payload(body)?;
    let specialist = service.create(request).await?;

    Ok((StatusCode::CREATED, Json(specialist)))
}

#[axum::debug_handler]
pub async fn get_specialist(
    State(service): State<Arc<SpecialistService>>,
    Path(id): Path<String>,
) -> Result<Json<Specialist>, AppError> {
    let id = parse_id(&id)?;
    let specialist = service.get(id).await?;
    Ok(Json(specialist))
}

#[axum::debug_handler]
pub async fn update_specialist(
    State(service): State<Arc<SpecialistService>>,
    Path(id): Path<String>,
    body: Result<Json<UpdateSpecialistRequest>, JsonRejection>,
) -> Result<Json<Specialist>, AppError> {
    let id = parse_id(&id)?;

    // A missing record wins over a malformed body.
    let request = match payload(body) {
        Ok(request) => request,
        Err(err) => {
            service.get(id).await?;
            return Err(err);
        }
    };

    let specialist = service.update(id, request).await?;
    Ok(Json(specialist))
}

#[axum::debug_handler]
pub async fn soft_delete_specialist(
    State(service): State<Arc<SpecialistService>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id)?;
    service.soft_delete(id).await?;
    Ok(lifecycle_response("Specialist marked as inactive", id))
}

#[axum::debug_handler]
pub async fn restore_specialist(
    State(service): State<Arc<SpecialistService>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id)?;
    service.restore(id).await?;
    Ok(lifecycle_response("Specialist restored", id))
}

#[axum::debug_handler]
pub async fn hard_delete_specialist(
    State(service): State<Arc<SpecialistService>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id)?;
    service.hard_delete(id).await?;
    Ok(lifecycle_response("Specialist permanently deleted", id))
}
