use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Extension, Multipart, Path, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use shared_database::{AppState, UploadKind};
use shared_models::auth::{Identity, Role};
use shared_models::error::AppError;
use shared_utils::extractor::AppJson;
use shared_utils::upload::read_file_field;
use shared_utils::validation::email_key;

use crate::models::{
    AppointmentError, DoctorAppointmentView, DoctorHistoryEntry, PatientAppointmentView, PrescriptionResponse,
    Records, ScheduleAppointmentRequest, ScheduleResponse,
};
use crate::services::{BookingService, LifecycleService, ListingService};

// ==============================================================================
// SCHEDULING
// ==============================================================================

/// The caller must be one of the two parties being booked.
pub async fn schedule_appointment(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    AppJson(request): AppJson<ScheduleAppointmentRequest>,
) -> Result<(StatusCode, Json<ScheduleResponse>), AppError> {
    let appointment = request.validate()?;
    identity.ensure_participant(&appointment.doctor_email, &appointment.patient_email)?;

    let appointment_id = BookingService::new(&state).schedule(&appointment).await?;

    Ok((
        StatusCode::CREATED,
        Json(ScheduleResponse {
            message: "Appointment scheduled successfully".to_string(),
            appointment_id,
        }),
    ))
}

// ==============================================================================
// LISTINGS
// ==============================================================================

pub async fn get_patient_appointments(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(email): Path<String>,
) -> Result<Json<Vec<PatientAppointmentView>>, AppError> {
    let email = email_key(&email);
    identity.ensure_owner(&email, Role::Patient)?;

    let appointments = ListingService::new(&state).patient_appointments(&email).await?;
    Ok(Json(appointments))
}

pub async fn get_doctor_appointments(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(email): Path<String>,
) -> Result<Json<Vec<DoctorAppointmentView>>, AppError> {
    let email = email_key(&email);
    identity.ensure_owner(&email, Role::Doctor)?;

    let appointments = ListingService::new(&state).doctor_appointments(&email).await?;
    Ok(Json(appointments))
}

pub async fn get_doctor_appointment(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Records>, AppError> {
    let records = ListingService::new(&state)
        .doctor_appointment(&identity, &appointment_id)
        .await?;
    Ok(Json(records))
}

pub async fn get_patient_history(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(email): Path<String>,
) -> Result<Json<Records>, AppError> {
    let email = email_key(&email);
    identity.ensure_owner(&email, Role::Patient)?;

    let history = ListingService::new(&state).patient_history(&email).await?;
    Ok(Json(history))
}

pub async fn get_doctor_history(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(email): Path<String>,
) -> Result<Json<Vec<DoctorHistoryEntry>>, AppError> {
    let email = email_key(&email);
    identity.ensure_owner(&email, Role::Doctor)?;

    let history = ListingService::new(&state).doctor_history(&email).await?;
    Ok(Json(history))
}

pub async fn get_doctor_history_records(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(email): Path<String>,
) -> Result<Json<Records>, AppError> {
    let email = email_key(&email);
    identity.ensure_owner(&email, Role::Doctor)?;

    let history = ListingService::new(&state).doctor_history_records(&email).await?;
    Ok(Json(history))
}

// ==============================================================================
// LIFECYCLE
// ==============================================================================

pub async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    LifecycleService::new(&state).cancel(&identity, &appointment_id).await?;
    Ok(Json(json!({ "message": "Appointment cancelled successfully" })))
}

pub async fn upload_prescription(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(appointment_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<PrescriptionResponse>, AppError> {
    let file = read_file_field(multipart, "prescription")
        .await?
        .ok_or(AppointmentError::NoPrescriptionFile)?;

    let prescription_url = LifecycleService::new(&state)
        .attach_prescription(&identity, &appointment_id, file)
        .await?;

    Ok(Json(PrescriptionResponse {
        message: "Prescription uploaded successfully.".to_string(),
        prescription_url,
    }))
}

/// GET on a stored prescription. The upload route shares this path, so the
/// file is served here rather than by the static upload service.
pub async fn serve_prescription(
    State(state): State<Arc<AppState>>,
    Path(file_name): Path<String>,
    request: Request,
) -> Result<Response, AppError> {
    let disk_path = state
        .uploads
        .locate(UploadKind::Prescription, &file_name)
        .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

    let response = match ServeFile::new(disk_path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };

    Ok(response.map(Body::new).into_response())
}
