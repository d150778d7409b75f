use std::cmp::Reverse;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use shared_database::{store::from_document, AppState, Collection, DocumentStore, Filter};
use shared_models::auth::Identity;
use shared_utils::validation::{format_display_date, parse_date};

use crate::models::{
    AppointmentError, DoctorAppointment, DoctorAppointmentView, DoctorHistoryEntry, PatientAppointment,
    PatientAppointmentView, Records,
};

pub struct ListingService {
    store: Arc<dyn DocumentStore>,
}

impl ListingService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }

    pub async fn patient_appointments(&self, email: &str) -> Result<Vec<PatientAppointmentView>, AppointmentError> {
        debug!("Listing active appointments for patient: {}", email);

        self.store
            .find(Collection::PatientAppointments, &Filter::eq("patientEmail", email))
            .await?
            .into_iter()
            .map(|document| {
                from_document::<PatientAppointment>(document)
                    .map(PatientAppointmentView::from)
                    .map_err(AppointmentError::from)
            })
            .collect()
    }

    pub async fn doctor_appointments(&self, email: &str) -> Result<Vec<DoctorAppointmentView>, AppointmentError> {
        debug!("Listing active appointments for doctor: {}", email);

        self.store
            .find(Collection::DoctorAppointments, &Filter::eq("doctorEmail", email))
            .await?
            .into_iter()
            .map(|document| {
                from_document::<DoctorAppointment>(document)
                    .map(DoctorAppointmentView::from)
                    .map_err(AppointmentError::from)
            })
            .collect()
    }

    /// Doctor-side active records for one appointment. Only its doctor or
    /// patient may read them.
    pub async fn doctor_appointment(&self, identity: &Identity, appointment_id: &str) -> Result<Records, AppointmentError> {
        let records = self
            .store
            .find(Collection::DoctorAppointments, &Filter::eq("appointmentId", appointment_id))
            .await?;

        let first = records.first().ok_or(AppointmentError::NotFound)?;
        ensure_participant(identity, first)?;
        Ok(records)
    }

    /// Store order, as stored.
    pub async fn patient_history(&self, email: &str) -> Result<Records, AppointmentError> {
        debug!("Fetching history for patient: {}", email);

        let records = self
            .store
            .find(Collection::PatientHistory, &Filter::eq("patientEmail", email))
            .await?;

        if records.is_empty() {
            return Err(AppointmentError::NoHistory);
        }
        Ok(records)
    }

    /// Doctor history documents as stored, newest first.
    pub async fn doctor_history_records(&self, email: &str) -> Result<Records, AppointmentError> {
        debug!("Fetching history for doctor: {}", email);

        let mut records = self
            .store
            .find(Collection::DoctorHistory, &Filter::eq("doctorEmail", email))
            .await?;

        if records.is_empty() {
            return Err(AppointmentError::NoHistory);
        }

        newest_first(&mut records);
        Ok(records)
    }

    pub async fn doctor_history(&self, email: &str) -> Result<Vec<DoctorHistoryEntry>, AppointmentError> {
        self.doctor_history_records(email)
            .await?
            .into_iter()
            .map(|document| -> Result<DoctorHistoryEntry, AppointmentError> {
                let record: DoctorAppointment = from_document(document)?;
                Ok(DoctorHistoryEntry {
                    date: display_date(&record.appointment_date),
                    patient_name: record.patient_name,
                    time: record.appointment_time,
                    prescription: record.prescription.unwrap_or_default(),
                    appointment_id: record.appointment_id,
                })
            })
            .collect()
    }
}

/// RFC 3339 timestamps in one offset sort lexically. Among equal timestamps
/// the later insert comes first.
fn newest_first(records: &mut [Value]) {
    records.reverse();
    records.sort_by_key(|record| {
        Reverse(
            record
                .get("createdAt")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        )
    });
}

fn display_date(stored: &str) -> String {
    parse_date(stored)
        .map(format_display_date)
        .unwrap_or_else(|_| stored.to_string())
}

pub(crate) fn ensure_participant(identity: &Identity, record: &Value) -> Result<(), AppointmentError> {
    let field = |name: &str| record.get(name).and_then(Value::as_str).unwrap_or_default();
    identity
        .ensure_participant(field("doctorEmail"), field("patientEmail"))
        .map_err(|_| AppointmentError::NotParticipant)
}
