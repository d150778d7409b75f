use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_database::StoreError;
use shared_models::error::AppError;

pub const MAX_DESCRIPTION_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub doctor_email: String,
    pub doctor_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub profile_pic: String,
    /// 0.0 to 5.0 in steps of 0.1.
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default)]
    pub doctor_degrees: Vec<String>,
}

impl Doctor {
    pub fn new(doctor_email: String, doctor_name: String) -> Self {
        Self {
            id: None,
            doctor_email,
            doctor_name,
            description: String::new(),
            profile_pic: String::new(),
            rating: 0.0,
            is_available: false,
            doctor_degrees: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DoctorSignupRequest {
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionResponse {
    pub message: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DegreesResponse {
    pub message: String,
    pub degrees: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub message: String,
    pub is_available: bool,
}

#[derive(Debug, Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Email already in use")]
    EmailInUse,

    #[error("No file uploaded")]
    NoFile,

    #[error("Invalid degree provided")]
    InvalidDegree,

    #[error("Invalid availability status")]
    InvalidAvailability,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => AppError::NotFound(err.to_string()),
            DoctorError::EmailInUse
            | DoctorError::NoFile
            | DoctorError::InvalidDegree
            | DoctorError::InvalidAvailability => AppError::BadRequest(err.to_string()),
            DoctorError::Validation(msg) => AppError::ValidationError(msg),
            DoctorError::Store(e) => AppError::Database(e.to_string()),
        }
    }
}
