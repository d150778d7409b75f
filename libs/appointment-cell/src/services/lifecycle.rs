use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use shared_database::{AppState, Collection, DocumentStore, Filter, StoredFile, UploadKind, UploadStore, Update};
use shared_models::auth::{Identity, Role};
use shared_utils::upload::UploadedFile;

use crate::models::AppointmentError;
use crate::services::listing::ensure_participant;

/// Cancellation and prescription attachment. Both touch two collections
/// without a transaction; cancellation converges when retried and a failed
/// attachment puts back what it already changed.
pub struct LifecycleService {
    store: Arc<dyn DocumentStore>,
    uploads: UploadStore,
}

impl LifecycleService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            uploads: state.uploads.clone(),
        }
    }

    /// Deletes both active projections. History is kept. A booking with only
    /// one projection left (an earlier cancel that stopped halfway) is
    /// finished off rather than reported missing.
    pub async fn cancel(&self, identity: &Identity, appointment_id: &str) -> Result<(), AppointmentError> {
        debug!("Cancelling appointment: {}", appointment_id);
        let filter = Filter::eq("appointmentId", appointment_id);

        let patient_side = self.store.find_one(Collection::PatientAppointments, &filter).await?;
        let doctor_side = self.store.find_one(Collection::DoctorAppointments, &filter).await?;

        let reference = patient_side
            .as_ref()
            .or(doctor_side.as_ref())
            .ok_or(AppointmentError::NotFound)?;
        ensure_participant(identity, reference)?;

        if patient_side.is_none() || doctor_side.is_none() {
            warn!("Appointment {} has only one active projection, completing cancel", appointment_id);
        }

        let removed_patient = self.store.delete_one(Collection::PatientAppointments, &filter).await?;
        let removed_doctor = self.store.delete_one(Collection::DoctorAppointments, &filter).await?;

        if removed_patient.is_none() && removed_doctor.is_none() {
            // Another cancel got there between the lookup and the deletes.
            return Err(AppointmentError::NotFound);
        }

        info!("Appointment {} cancelled", appointment_id);
        Ok(())
    }

    /// Stores the file and points both history projections at it. Only the
    /// appointment's doctor may attach.
    pub async fn attach_prescription(
        &self,
        identity: &Identity,
        appointment_id: &str,
        file: UploadedFile,
    ) -> Result<String, AppointmentError> {
        debug!("Attaching prescription to appointment: {}", appointment_id);
        if identity.role != Role::Doctor {
            return Err(AppointmentError::NotParticipant);
        }

        let filter = Filter::eq("appointmentId", appointment_id);
        let doctor_record = self
            .store
            .find_one(Collection::DoctorHistory, &filter)
            .await?
            .ok_or(AppointmentError::NotFound)?;
        if self.store.find_one(Collection::PatientHistory, &filter).await?.is_none() {
            return Err(AppointmentError::NotFound);
        }
        ensure_participant(identity, &doctor_record)?;

        let stored = self
            .uploads
            .save(UploadKind::Prescription, &file.file_name, &file.bytes)
            .await?;
        let path = Value::String(stored.public_path.clone());

        match self
            .store
            .update_one(Collection::DoctorHistory, &filter, Update::set("prescription", path.clone()))
            .await
        {
            Ok(Some(_)) => {}
            Ok(None) => return Err(self.discard(&stored, AppointmentError::NotFound).await),
            Err(e) => return Err(self.discard(&stored, e.into()).await),
        }

        let patient_update = self
            .store
            .update_one(Collection::PatientHistory, &filter, Update::set("prescription", path))
            .await;

        let failure = match patient_update {
            Ok(Some(_)) => {
                info!("Prescription {} attached to appointment {}", stored.public_path, appointment_id);
                return Ok(stored.public_path);
            }
            Ok(None) => AppointmentError::NotFound,
            Err(e) => e.into(),
        };

        let previous = doctor_record.get("prescription").cloned().unwrap_or(Value::String(String::new()));
        if let Err(e) = self
            .store
            .update_one(Collection::DoctorHistory, &filter, Update::set("prescription", previous))
            .await
        {
            error!(
                "Could not restore doctor history prescription for appointment {}: {}",
                appointment_id, e
            );
        }

        Err(self.discard(&stored, failure).await)
    }

    async fn discard(&self, stored: &StoredFile, err: AppointmentError) -> AppointmentError {
        warn!("Discarding prescription upload {}: {}", stored.public_path, err);
        self.uploads.remove(stored).await;
        err
    }
}
