use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use shared_database::StoreError;
use shared_models::error::AppError;

// ==============================================================================
// STORED RECORDS
// ==============================================================================

/// Doctor-side projection of a booking, stored in both the active and the
/// history collections. `prescription` is only present in history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorAppointment {
    pub doctor_email: String,
    pub patient_email: String,
    pub patient_name: String,
    pub appointment_date: String,
    pub appointment_time: String,
    pub appointment_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prescription: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Patient-side projection, mirroring [`DoctorAppointment`] with the doctor's
/// name in place of the patient's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientAppointment {
    pub doctor_email: String,
    pub patient_email: String,
    pub doctor_name: String,
    pub appointment_date: String,
    pub appointment_time: String,
    pub appointment_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prescription: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

// ==============================================================================
// REQUESTS
// ==============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleAppointmentRequest {
    pub doctor_email: Option<String>,
    pub patient_email: Option<String>,
    pub doctor_name: Option<String>,
    pub patient_name: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

/// A booking whose fields passed validation: emails normalized, names
/// trimmed, time in `HH:MM`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub doctor_email: String,
    pub patient_email: String,
    pub doctor_name: String,
    pub patient_name: String,
    pub date: NaiveDate,
    pub time: String,
}

// ==============================================================================
// RESPONSES
// ==============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    pub message: String,
    pub appointment_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientAppointmentView {
    pub appointment_id: String,
    pub patient_email: String,
    pub doctor_name: String,
    pub appointment_time: String,
    pub appointment_date: String,
}

impl From<PatientAppointment> for PatientAppointmentView {
    fn from(record: PatientAppointment) -> Self {
        Self {
            appointment_id: record.appointment_id,
            patient_email: record.patient_email,
            doctor_name: record.doctor_name,
            appointment_time: record.appointment_time,
            appointment_date: record.appointment_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorAppointmentView {
    pub appointment_id: String,
    pub patient_name: String,
    pub patient_email: String,
    pub appointment_time: String,
    pub appointment_date: String,
}

impl From<DoctorAppointment> for DoctorAppointmentView {
    fn from(record: DoctorAppointment) -> Self {
        Self {
            appointment_id: record.appointment_id,
            patient_name: record.patient_name,
            patient_email: record.patient_email,
            appointment_time: record.appointment_time,
            appointment_date: record.appointment_date,
        }
    }
}

/// Doctor history row as shown to the doctor, date as `DD/MM/YYYY`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorHistoryEntry {
    pub patient_name: String,
    pub date: String,
    pub time: String,
    pub prescription: String,
    pub appointment_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionResponse {
    pub message: String,
    pub prescription_url: String,
}

/// Raw store documents, returned as stored.
pub type Records = Vec<Value>;

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("No history found")]
    NoHistory,

    #[error("No prescription file uploaded.")]
    NoPrescriptionFile,

    #[error("Not a participant of this appointment")]
    NotParticipant,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound | AppointmentError::NoHistory => AppError::NotFound(err.to_string()),
            AppointmentError::NoPrescriptionFile => AppError::BadRequest(err.to_string()),
            AppointmentError::NotParticipant => AppError::Forbidden(err.to_string()),
            AppointmentError::Validation(msg) => AppError::ValidationError(msg),
            AppointmentError::Store(e) => AppError::Database(e.to_string()),
        }
    }
}
