use std::sync::Arc;

use axum::{
    extract::{Extension, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use shared_database::AppState;
use shared_models::auth::{Identity, Role};
use shared_models::error::AppError;
use shared_utils::extractor::AppJson;
use shared_utils::upload::read_file_field;
use shared_utils::validation::{email_key, normalize_email, require_text};

use crate::models::{
    AvailabilityResponse, DegreesResponse, DescriptionResponse, Doctor, DoctorError, DoctorSignupRequest,
};
use crate::services::{AvailabilityService, DegreeService, DoctorService};

// ==============================================================================
// PUBLIC HANDLERS
// ==============================================================================

pub async fn get_doctor(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Json<Doctor>, AppError> {
    let doctor = DoctorService::new(&state).get(&email_key(&email)).await?;
    Ok(Json(doctor))
}

pub async fn list_doctors(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Doctor>>, AppError> {
    let doctors = DoctorService::new(&state).list().await?;
    Ok(Json(doctors))
}

// ==============================================================================
// PROTECTED HANDLERS
// ==============================================================================

pub async fn register_doctor(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    AppJson(request): AppJson<DoctorSignupRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let email = request
        .email
        .as_deref()
        .ok_or_else(|| DoctorError::Validation("email is required".to_string()))
        .and_then(|raw| normalize_email(raw).map_err(DoctorError::Validation))?;
    let name = require_text("name", request.name.as_deref()).map_err(DoctorError::Validation)?;

    identity.ensure_owner(&email, Role::Doctor)?;

    DoctorService::new(&state).register(&email, &name).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Doctor registered successfully" })),
    ))
}

pub async fn update_profile_pic(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(email): Path<String>,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let email = email_key(&email);
    identity.ensure_owner(&email, Role::Doctor)?;

    let file = read_file_field(multipart, "profilePic")
        .await?
        .ok_or(DoctorError::NoFile)?;

    let profile_pic = DoctorService::new(&state).update_profile_pic(&email, file).await?;

    Ok(Json(json!({
        "message": "Profile picture updated successfully",
        "profilePic": profile_pic
    })))
}

pub async fn update_description(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(email): Path<String>,
    AppJson(body): AppJson<Value>,
) -> Result<Json<DescriptionResponse>, AppError> {
    let email = email_key(&email);
    identity.ensure_owner(&email, Role::Doctor)?;

    let description = body
        .get("description")
        .and_then(Value::as_str)
        .ok_or_else(|| DoctorError::Validation("description must be a string".to_string()))?;

    let doctor = DoctorService::new(&state).update_description(&email, description).await?;

    Ok(Json(DescriptionResponse {
        message: "Description updated successfully".to_string(),
        description: doctor.description,
    }))
}

pub async fn add_degree(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(email): Path<String>,
    AppJson(body): AppJson<Value>,
) -> Result<Json<DegreesResponse>, AppError> {
    let email = email_key(&email);
    identity.ensure_owner(&email, Role::Doctor)?;

    let degrees = DegreeService::new(&state)
        .add(&email, body.get("degree").and_then(Value::as_str))
        .await?;

    Ok(Json(DegreesResponse {
        message: "Degree added successfully".to_string(),
        degrees,
    }))
}

pub async fn remove_degree(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(email): Path<String>,
    AppJson(body): AppJson<Value>,
) -> Result<Json<DegreesResponse>, AppError> {
    let email = email_key(&email);
    identity.ensure_owner(&email, Role::Doctor)?;

    let degrees = DegreeService::new(&state)
        .remove(&email, body.get("degree").and_then(Value::as_str))
        .await?;

    Ok(Json(DegreesResponse {
        message: "Degree removed successfully".to_string(),
        degrees,
    }))
}

pub async fn update_availability(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(email): Path<String>,
    AppJson(body): AppJson<Value>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let email = email_key(&email);
    identity.ensure_owner(&email, Role::Doctor)?;

    let is_available = AvailabilityService::new(&state)
        .set(&email, body.get("isAvailable"))
        .await?;

    Ok(Json(AvailabilityResponse {
        message: "Doctor availability updated successfully".to_string(),
        is_available,
    }))
}
