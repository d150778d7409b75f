use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use shared_database::{
    store::{from_document, to_document},
    AppState, Collection, DocumentStore, Filter, StoreError, UploadKind, UploadStore, Update,
};
use shared_utils::upload::UploadedFile;

use crate::models::{Doctor, DoctorError, MAX_DESCRIPTION_CHARS};

pub struct DoctorService {
    store: Arc<dyn DocumentStore>,
    uploads: UploadStore,
}

impl DoctorService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            uploads: state.uploads.clone(),
        }
    }

    fn by_email(email: &str) -> Filter {
        Filter::eq("doctorEmail", email)
    }

    pub async fn register(&self, email: &str, name: &str) -> Result<Doctor, DoctorError> {
        debug!("Registering doctor: {}", email);

        if self.store.find_one(Collection::Doctors, &Self::by_email(email)).await?.is_some() {
            return Err(DoctorError::EmailInUse);
        }

        let doctor = Doctor::new(email.to_string(), name.to_string());
        let stored = match self.store.insert(Collection::Doctors, to_document(&doctor)?).await {
            Err(StoreError::Duplicate { .. }) => return Err(DoctorError::EmailInUse),
            other => other?,
        };

        info!("Doctor registered: {}", email);
        Ok(from_document(stored)?)
    }

    pub async fn get(&self, email: &str) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor: {}", email);

        let document = self
            .store
            .find_one(Collection::Doctors, &Self::by_email(email))
            .await?
            .ok_or(DoctorError::NotFound)?;

        Ok(from_document(document)?)
    }

    pub async fn list(&self) -> Result<Vec<Doctor>, DoctorError> {
        debug!("Listing all doctors");

        self.store
            .find(Collection::Doctors, &Filter::all())
            .await?
            .into_iter()
            .map(|document| from_document(document).map_err(DoctorError::from))
            .collect()
    }

    /// Apply `update` to the doctor with `email` and return the result.
    pub async fn update(&self, email: &str, update: Update) -> Result<Doctor, DoctorError> {
        let document = self
            .store
            .update_one(Collection::Doctors, &Self::by_email(email), update)
            .await?
            .ok_or(DoctorError::NotFound)?;

        Ok(from_document(document)?)
    }

    pub async fn update_description(&self, email: &str, description: &str) -> Result<Doctor, DoctorError> {
        let description = description.trim();
        if description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(DoctorError::Validation(format!(
                "Description must be at most {} characters",
                MAX_DESCRIPTION_CHARS
            )));
        }

        let doctor = self.update(email, Update::set("description", description)).await?;
        info!("Description updated for doctor: {}", email);
        Ok(doctor)
    }

    pub async fn update_profile_pic(&self, email: &str, file: UploadedFile) -> Result<String, DoctorError> {
        debug!("Updating profile picture for doctor: {}", email);

        let stored = self
            .uploads
            .save(UploadKind::ProfilePicture, &file.file_name, &file.bytes)
            .await?;

        match self
            .update(email, Update::set("profilePic", Value::String(stored.public_path.clone())))
            .await
        {
            Ok(_) => {
                info!("Profile picture updated for doctor: {}", email);
                Ok(stored.public_path)
            }
            Err(e) => {
                self.uploads.remove(&stored).await;
                Err(e)
            }
        }
    }
}
