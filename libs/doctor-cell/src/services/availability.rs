use serde_json::Value;
use tracing::info;

use shared_database::{AppState, Update};

use crate::models::DoctorError;
use crate::services::DoctorService;

pub struct AvailabilityService {
    doctors: DoctorService,
}

impl AvailabilityService {
    pub fn new(state: &AppState) -> Self {
        Self {
            doctors: DoctorService::new(state),
        }
    }

    /// Only a JSON boolean is accepted; `"true"` or `1` are rejected.
    pub async fn set(&self, email: &str, is_available: Option<&Value>) -> Result<bool, DoctorError> {
        let Some(Value::Bool(flag)) = is_available else {
            return Err(DoctorError::InvalidAvailability);
        };

        let doctor = self.doctors.update(email, Update::set("isAvailable", *flag)).await?;
        info!("Availability for doctor {} set to {}", email, doctor.is_available);
        Ok(doctor.is_available)
    }
}
