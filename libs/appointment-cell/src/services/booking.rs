use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use shared_database::{store::to_document, AppState, Collection, DocumentStore, Filter};
use shared_utils::validation::{normalize_email, parse_date, require_text, validate_time};

use crate::models::{
    AppointmentError, DoctorAppointment, NewAppointment, PatientAppointment, ScheduleAppointmentRequest,
};

impl ScheduleAppointmentRequest {
    pub fn validate(self) -> Result<NewAppointment, AppointmentError> {
        let text = |field: &str, value: Option<&str>| {
            require_text(field, value).map_err(AppointmentError::Validation)
        };

        let doctor_email = normalize_email(&text("doctorEmail", self.doctor_email.as_deref())?)
            .map_err(AppointmentError::Validation)?;
        let patient_email = normalize_email(&text("patientEmail", self.patient_email.as_deref())?)
            .map_err(AppointmentError::Validation)?;
        let doctor_name = text("doctorName", self.doctor_name.as_deref())?;
        let patient_name = text("patientName", self.patient_name.as_deref())?;
        let date = parse_date(&text("date", self.date.as_deref())?).map_err(AppointmentError::Validation)?;
        let time = validate_time(&text("time", self.time.as_deref())?).map_err(AppointmentError::Validation)?;

        Ok(NewAppointment {
            doctor_email,
            patient_email,
            doctor_name,
            patient_name,
            date,
            time,
        })
    }
}

/// Creates the four records of a booking. There is no multi-document
/// transaction underneath, so a failed write deletes the ones before it.
pub struct BookingService {
    store: Arc<dyn DocumentStore>,
}

impl BookingService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }

    fn documents(appointment: &NewAppointment, appointment_id: &str) -> Result<[(Collection, Value); 4], AppointmentError> {
        let date = appointment.date.format("%Y-%m-%d").to_string();

        let doctor_side = |prescription: Option<String>| DoctorAppointment {
            doctor_email: appointment.doctor_email.clone(),
            patient_email: appointment.patient_email.clone(),
            patient_name: appointment.patient_name.clone(),
            appointment_date: date.clone(),
            appointment_time: appointment.time.clone(),
            appointment_id: appointment_id.to_string(),
            prescription,
            created_at: None,
        };
        let patient_side = |prescription: Option<String>| PatientAppointment {
            doctor_email: appointment.doctor_email.clone(),
            patient_email: appointment.patient_email.clone(),
            doctor_name: appointment.doctor_name.clone(),
            appointment_date: date.clone(),
            appointment_time: appointment.time.clone(),
            appointment_id: appointment_id.to_string(),
            prescription,
            created_at: None,
        };

        Ok([
            (Collection::DoctorAppointments, to_document(&doctor_side(None))?),
            (Collection::PatientAppointments, to_document(&patient_side(None))?),
            (Collection::DoctorHistory, to_document(&doctor_side(Some(String::new())))?),
            (Collection::PatientHistory, to_document(&patient_side(Some(String::new())))?),
        ])
    }

    /// Returns the generated appointment identifier.
    pub async fn schedule(&self, appointment: &NewAppointment) -> Result<String, AppointmentError> {
        let appointment_id = Uuid::new_v4().to_string();
        debug!(
            "Scheduling appointment {} between doctor {} and patient {}",
            appointment_id, appointment.doctor_email, appointment.patient_email
        );

        let mut committed = Vec::with_capacity(4);
        for (collection, document) in Self::documents(appointment, &appointment_id)? {
            if let Err(e) = self.store.insert(collection, document).await {
                error!("Failed to write {} for appointment {}: {}", collection, appointment_id, e);
                self.compensate(&appointment_id, &committed).await;
                return Err(e.into());
            }
            committed.push(collection);
        }

        info!("Appointment {} scheduled", appointment_id);
        Ok(appointment_id)
    }

    /// Best effort: a record that cannot be removed is logged and left behind.
    async fn compensate(&self, appointment_id: &str, committed: &[Collection]) {
        let filter = Filter::eq("appointmentId", appointment_id);
        for collection in committed.iter().rev() {
            match self.store.delete_one(*collection, &filter).await {
                Ok(_) => debug!("Rolled back {} for appointment {}", collection, appointment_id),
                Err(e) => warn!(
                    "Could not roll back {} for appointment {}: {}",
                    collection, appointment_id, e
                ),
            }
        }
    }
}
