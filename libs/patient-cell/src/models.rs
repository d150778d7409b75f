use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_database::StoreError;
use shared_models::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub profile_pic: String,
}

/// Both fields are optional here so a missing one is reported as a 400
/// rather than a body rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct PatientSignupRequest {
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePicResponse {
    pub message: String,
    pub profile_pic: String,
}

#[derive(Debug, Error)]
pub enum PatientError {
    #[error("Patient not found")]
    NotFound,

    #[error("Email already in use")]
    EmailInUse,

    #[error("No file uploaded")]
    NoFile,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound => AppError::NotFound(err.to_string()),
            PatientError::EmailInUse | PatientError::NoFile => AppError::BadRequest(err.to_string()),
            PatientError::Validation(msg) => AppError::ValidationError(msg),
            PatientError::Store(e) => AppError::Database(e.to_string()),
        }
    }
}
