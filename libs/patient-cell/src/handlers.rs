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

use crate::models::{Patient, PatientError, PatientSignupRequest, ProfilePicResponse};
use crate::services::PatientService;

/// The signup body must describe the caller's own account.
pub async fn register_patient(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    AppJson(request): AppJson<PatientSignupRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let email = request
        .email
        .as_deref()
        .ok_or_else(|| PatientError::Validation("email is required".to_string()))
        .and_then(|raw| normalize_email(raw).map_err(PatientError::Validation))?;
    let name = require_text("name", request.name.as_deref()).map_err(PatientError::Validation)?;

    identity.ensure_owner(&email, Role::Patient)?;

    PatientService::new(&state).register(&email, &name).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Patient registered successfully" })),
    ))
}

pub async fn get_patient(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Json<Patient>, AppError> {
    let patient = PatientService::new(&state).get(&email_key(&email)).await?;
    Ok(Json(patient))
}

pub async fn get_patient_picture(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Json<Value>, AppError> {
    let profile_pic = PatientService::new(&state).picture(&email_key(&email)).await?;
    Ok(Json(json!({ "profilePic": profile_pic })))
}

pub async fn update_profile_pic(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(email): Path<String>,
    multipart: Multipart,
) -> Result<Json<ProfilePicResponse>, AppError> {
    let email = email_key(&email);
    identity.ensure_owner(&email, Role::Patient)?;

    let file = read_file_field(multipart, "profilePic")
        .await?
        .ok_or(PatientError::NoFile)?;

    let profile_pic = PatientService::new(&state).update_profile_pic(&email, file).await?;

    Ok(Json(ProfilePicResponse {
        message: "Profile picture updated successfully".to_string(),
        profile_pic,
    }))
}
