#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use appointment_cell::appointment_routes;
use shared_database::{AppState, Collection, DocumentStore, Filter, MemoryStore, StoreError, Update};
use shared_utils::test_utils::{multipart_body, JwtTestUtils, TestConfig, TestUser};

pub const DOCTOR: &str = "d@x.com";
pub const PATIENT: &str = "p@x.com";

/// Memory store that fails writes to chosen collections.
#[derive(Clone, Default)]
pub struct FaultyStore {
    pub inner: MemoryStore,
    pub fail_insert_into: Option<Collection>,
    pub fail_update_on: Option<Collection>,
}

#[async_trait]
impl DocumentStore for FaultyStore {
    async fn insert(&self, collection: Collection, document: Value) -> Result<Value, StoreError> {
        if self.fail_insert_into == Some(collection) {
            return Err(StoreError::Unavailable(format!("injected insert failure on {}", collection)));
        }
        self.inner.insert(collection, document).await
    }

    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>, StoreError> {
        self.inner.find(collection, filter).await
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        update: Update,
    ) -> Result<Option<Value>, StoreError> {
        if self.fail_update_on == Some(collection) {
            return Err(StoreError::Unavailable(format!("injected update failure on {}", collection)));
        }
        self.inner.update_one(collection, filter, update).await
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Value>, StoreError> {
        self.inner.delete_one(collection, filter).await
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub store: MemoryStore,
    pub secret: String,
    pub uploads: tempfile::TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_store(FaultyStore::default())
    }

    pub fn with_store(store: FaultyStore) -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let config = TestConfig::with_upload_dir(uploads.path());
        let memory = store.inner.clone();
        let state = config.to_state_with_store(Arc::new(store));
        Self {
            router: appointment_routes(state.clone()),
            state,
            store: memory,
            secret: config.jwt_secret,
            uploads,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, bytes) = self.send_raw(request).await;
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    pub async fn call(&self, method: &str, uri: &str, user: &TestUser, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Authorization", JwtTestUtils::bearer(user, &self.secret));
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn schedule(&self, user: &TestUser) -> (StatusCode, Value) {
        self.call("POST", "/api/schedule-appointment", user, Some(booking())).await
    }

    /// Books the default appointment as the patient and returns its id.
    pub async fn book(&self) -> String {
        let (status, body) = self.schedule(&TestUser::patient(PATIENT)).await;
        assert_eq!(status, StatusCode::CREATED);
        body["appointmentId"].as_str().unwrap().to_string()
    }

    pub async fn upload_prescription(
        &self,
        user: &TestUser,
        appointment_id: &str,
        field: &str,
        bytes: &[u8],
    ) -> (StatusCode, Value) {
        let (content_type, body) = multipart_body(field, "rx.pdf", bytes);
        self.send(
            Request::builder()
                .method("PUT")
                .uri(format!("/uploads/prescriptions/{}", appointment_id))
                .header("Authorization", JwtTestUtils::bearer(user, &self.secret))
                .header("Content-Type", content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    pub async fn total_records(&self) -> usize {
        let mut total = 0;
        for collection in [
            Collection::DoctorAppointments,
            Collection::PatientAppointments,
            Collection::DoctorHistory,
            Collection::PatientHistory,
        ] {
            total += self.store.len(collection).await;
        }
        total
    }

    pub fn stored_prescriptions(&self) -> usize {
        std::fs::read_dir(self.uploads.path().join("prescriptions"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

pub fn booking() -> Value {
    json!({
        "doctorEmail": " D@x.com ",
        "patientEmail": "p@x.com",
        "doctorName": "Dr. X",
        "patientName": "P",
        "date": "2024-01-01",
        "time": "09:00"
    })
}
