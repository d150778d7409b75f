use serde_json::Value;
use tracing::info;

use shared_database::{AppState, Update};

use crate::models::DoctorError;
use crate::services::DoctorService;

/// Degrees behave as a set: adding an existing one and removing a missing
/// one both leave the list unchanged.
pub struct DegreeService {
    doctors: DoctorService,
}

impl DegreeService {
    pub fn new(state: &AppState) -> Self {
        Self {
            doctors: DoctorService::new(state),
        }
    }

    fn clean(degree: Option<&str>) -> Result<String, DoctorError> {
        match degree.map(str::trim) {
            Some(degree) if !degree.is_empty() => Ok(degree.to_string()),
            _ => Err(DoctorError::InvalidDegree),
        }
    }

    pub async fn add(&self, email: &str, degree: Option<&str>) -> Result<Vec<String>, DoctorError> {
        let degree = Self::clean(degree)?;
        let doctor = self
            .doctors
            .update(
                email,
                Update::AddToSet {
                    field: "doctorDegrees".to_string(),
                    value: Value::String(degree.clone()),
                },
            )
            .await?;

        info!("Degree '{}' added for doctor: {}", degree, email);
        Ok(doctor.doctor_degrees)
    }

    pub async fn remove(&self, email: &str, degree: Option<&str>) -> Result<Vec<String>, DoctorError> {
        let degree = Self::clean(degree)?;
        let doctor = self
            .doctors
            .update(
                email,
                Update::Pull {
                    field: "doctorDegrees".to_string(),
                    value: Value::String(degree.clone()),
                },
            )
            .await?;

        info!("Degree '{}' removed for doctor: {}", degree, email);
        Ok(doctor.doctor_degrees)
    }
}
