//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};

use super::dto::{
    Appointment, AppointmentDraft, AppointmentQuery, Barber, DiagnosticsReport, HealthResponse,
    MessageResponse, Service,
};
use super::error::AppError;
use super::state::AppState;
use crate::services;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Liveness and diagnostics
// =============================================================================

/// GET /
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("Barber Shop API is running"))
}

/// GET /api/hello
pub async fn hello() -> Json<MessageResponse> {
    Json(MessageResponse::new("Hello from the backend API!"))
}

/// GET /test
///
/// Store connectivity snapshot. Always 200; failures are described in the body.
pub async fn test_database(State(state): State<AppState>) -> Json<DiagnosticsReport> {
    Json(services::snapshot(state.store.as_ref(), &state.config).await)
}

/// GET /health
///
/// Health check endpoint to verify the service is running and the store is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.store.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Catalog
// =============================================================================

/// GET /api/services
pub async fn list_services(State(state): State<AppState>) -> HandlerResult<Vec<Service>> {
    Ok(Json(services::list_services(state.store.as_ref()).await?))
}

/// GET /api/barbers
pub async fn list_barbers(State(state): State<AppState>) -> HandlerResult<Vec<Barber>> {
    Ok(Json(services::list_barbers(state.store.as_ref()).await?))
}

// =============================================================================
// Appointments
// =============================================================================

/// GET /api/appointments?date=&barber_id=
pub async fn list_appointments(
    State(state): State<AppState>,
    query: Result<Query<AppointmentQuery>, QueryRejection>,
) -> HandlerResult<Vec<Appointment>> {
    let Query(query) = query?;
    Ok(Json(
        services::list_appointments(state.store.as_ref(), &query).await?,
    ))
}

/// POST /api/appointments
///
/// Book an appointment. Returns 201 with the stored record.
pub async fn create_appointment(
    State(state): State<AppState>,
    payload: Result<Json<AppointmentDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let Json(draft) = payload?;
    draft.validate()?;

    let appointment = services::validate_and_book(state.store.as_ref(), &draft).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}
