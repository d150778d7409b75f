use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use shared_database::{
    store::{from_document, to_document},
    AppState, Collection, DocumentStore, Filter, StoreError, UploadKind, UploadStore, Update,
};
use shared_utils::upload::UploadedFile;

use crate::models::{Patient, PatientError};

pub struct PatientService {
    store: Arc<dyn DocumentStore>,
    uploads: UploadStore,
}

impl PatientService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            uploads: state.uploads.clone(),
        }
    }

    fn by_email(email: &str) -> Filter {
        Filter::eq("email", email)
    }

    /// `email` and `name` arrive validated and normalized.
    pub async fn register(&self, email: &str, name: &str) -> Result<Patient, PatientError> {
        debug!("Registering patient: {}", email);

        if self.store.find_one(Collection::Patients, &Self::by_email(email)).await?.is_some() {
            return Err(PatientError::EmailInUse);
        }

        let patient = Patient {
            id: None,
            email: email.to_string(),
            name: name.to_string(),
            profile_pic: String::new(),
        };

        // The store's unique key catches a concurrent signup that slipped past the check.
        let stored = match self.store.insert(Collection::Patients, to_document(&patient)?).await {
            Err(StoreError::Duplicate { .. }) => return Err(PatientError::EmailInUse),
            other => other?,
        };

        info!("Patient registered: {}", email);
        Ok(from_document(stored)?)
    }

    pub async fn get(&self, email: &str) -> Result<Patient, PatientError> {
        debug!("Fetching patient: {}", email);

        let document = self
            .store
            .find_one(Collection::Patients, &Self::by_email(email))
            .await?
            .ok_or(PatientError::NotFound)?;

        Ok(from_document(document)?)
    }

    pub async fn picture(&self, email: &str) -> Result<String, PatientError> {
        Ok(self.get(email).await?.profile_pic)
    }

    /// Stores the file, then points the patient at it. The file is removed
    /// again when no patient matches.
    pub async fn update_profile_pic(&self, email: &str, file: UploadedFile) -> Result<String, PatientError> {
        debug!("Updating profile picture for patient: {}", email);

        let stored = self
            .uploads
            .save(UploadKind::ProfilePicture, &file.file_name, &file.bytes)
            .await?;

        let updated = self
            .store
            .update_one(
                Collection::Patients,
                &Self::by_email(email),
                Update::set("profilePic", Value::String(stored.public_path.clone())),
            )
            .await;

        match updated {
            Ok(Some(_)) => {
                info!("Profile picture updated for patient: {}", email);
                Ok(stored.public_path)
            }
            Ok(None) => {
                self.uploads.remove(&stored).await;
                Err(PatientError::NotFound)
            }
            Err(e) => {
                self.uploads.remove(&stored).await;
                Err(e.into())
            }
        }
    }
}
