use std::fmt;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Record collections. Each appointment booking spans the last four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Patients,
    Doctors,
    DoctorAppointments,
    PatientAppointments,
    DoctorHistory,
    PatientHistory,
}

impl Collection {
    pub fn table(&self) -> &'static str {
        match self {
            Collection::Patients => "patients",
            Collection::Doctors => "doctors",
            Collection::DoctorAppointments => "doctor_appointments",
            Collection::PatientAppointments => "patient_appointments",
            Collection::DoctorHistory => "doctor_history",
            Collection::PatientHistory => "patient_history",
        }
    }

    /// Field the store keeps unique, if any.
    pub fn unique_key(&self) -> Option<&'static str> {
        match self {
            Collection::Patients => Some("email"),
            Collection::Doctors => Some("doctorEmail"),
            _ => None,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Duplicate {key} in {collection}")]
    Duplicate { collection: Collection, key: String },

    #[error("Malformed document: {0}")]
    Malformed(String),

    #[error("Store request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Store responded with {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("File storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Conjunction of string equality conditions. An empty filter matches every
/// document in the collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    conditions: Vec<(String, String)>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(field: &str, value: impl Into<String>) -> Self {
        Self::all().and(field, value)
    }

    pub fn and(mut self, field: &str, value: impl Into<String>) -> Self {
        self.conditions.push((field.to_string(), value.into()));
        self
    }

    pub fn conditions(&self) -> &[(String, String)] {
        &self.conditions
    }

    pub fn matches(&self, document: &Value) -> bool {
        self.conditions.iter().all(|(field, expected)| {
            document
                .get(field)
                .and_then(Value::as_str)
                .map(|actual| actual == expected)
                .unwrap_or(false)
        })
    }
}

/// Single-document modifications.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Overwrite the given fields.
    Set(Map<String, Value>),
    /// Append `value` to the array `field` unless already present.
    AddToSet { field: String, value: Value },
    /// Remove every occurrence of `value` from the array `field`.
    Pull { field: String, value: Value },
}

impl Update {
    pub fn set(field: &str, value: impl Into<Value>) -> Self {
        let mut fields = Map::new();
        fields.insert(field.to_string(), value.into());
        Update::Set(fields)
    }

    /// Apply to an in-memory document. Array operations on a missing field
    /// start from an empty array.
    pub fn apply(&self, document: &mut Map<String, Value>) -> Result<(), StoreError> {
        match self {
            Update::Set(fields) => {
                for (key, value) in fields {
                    document.insert(key.clone(), value.clone());
                }
            }
            Update::AddToSet { field, value } => {
                let items = array_field(document, field)?;
                if !items.contains(value) {
                    items.push(value.clone());
                }
            }
            Update::Pull { field, value } => {
                let items = array_field(document, field)?;
                items.retain(|item| item != value);
            }
        }
        Ok(())
    }
}

fn array_field<'a>(
    document: &'a mut Map<String, Value>,
    field: &str,
) -> Result<&'a mut Vec<Value>, StoreError> {
    document
        .entry(field.to_string())
        .or_insert_with(|| Value::Array(Vec::new()))
        .as_array_mut()
        .ok_or_else(|| StoreError::Malformed(format!("field '{}' is not an array", field)))
}

/// Schemaless document store. Every call touches at most one document except
/// `find`; there are no multi-document transactions.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a JSON object; the store stamps `_id`, `createdAt` and `updatedAt`.
    async fn insert(&self, collection: Collection, document: Value) -> Result<Value, StoreError>;

    /// Matching documents in store order.
    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>, StoreError>;

    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Value>, StoreError> {
        Ok(self.find(collection, filter).await?.into_iter().next())
    }

    /// Update the first match and return it as modified.
    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        update: Update,
    ) -> Result<Option<Value>, StoreError>;

    /// Delete the first match and return it.
    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Value>, StoreError>;
}

pub fn to_document<T: Serialize>(record: &T) -> Result<Value, StoreError> {
    let value = serde_json::to_value(record)?;
    if !value.is_object() {
        return Err(StoreError::Malformed("documents must be JSON objects".to_string()));
    }
    Ok(value)
}

pub fn from_document<T: DeserializeOwned>(document: Value) -> Result<T, StoreError> {
    Ok(serde_json::from_value(document)?)
}
