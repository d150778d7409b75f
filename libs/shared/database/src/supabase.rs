use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde_json::{json, Map, Value};
use tracing::{debug, error};
use uuid::Uuid;

use shared_config::AppConfig;

use crate::memory::timestamp;
use crate::store::{Collection, DocumentStore, Filter, StoreError, Update};

/// PostgREST-backed store. Each trait call is one or two HTTP requests; the
/// service key bypasses row-level security because callers are authorised by
/// the API before any store access.
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    service_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            service_key: config.supabase_service_key.clone(),
        }
    }

    fn get_headers(&self) -> Result<HeaderMap, StoreError> {
        let mut headers = HeaderMap::new();

        let key = HeaderValue::from_str(&self.service_key)
            .map_err(|_| StoreError::Unavailable("service key is not a valid header value".to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.service_key))
            .map_err(|_| StoreError::Unavailable("service key is not a valid header value".to_string()))?;

        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        Ok(headers)
    }

    fn table_path(collection: Collection, filter: &Filter) -> String {
        let query: Vec<String> = filter
            .conditions()
            .iter()
            .map(|(field, value)| format!("{}=eq.{}", field, urlencoding::encode(value)))
            .collect();

        if query.is_empty() {
            format!("/rest/v1/{}", collection.table())
        } else {
            format!("/rest/v1/{}?{}", collection.table(), query.join("&"))
        }
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        collection: Collection,
    ) -> Result<Vec<Value>, StoreError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut req = self.client.request(method, &url).headers(self.get_headers()?);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Store error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                409 => StoreError::Duplicate {
                    collection,
                    key: collection.unique_key().unwrap_or("key").to_string(),
                },
                code => StoreError::Backend { status: code, body: error_text },
            });
        }

        let rows = response.json::<Vec<Value>>().await?;
        Ok(rows)
    }

    /// Array updates need the current row; PostgREST has no array operators
    /// in PATCH bodies, so the new array is computed here and written back.
    async fn resolve_update(
        &self,
        collection: Collection,
        filter: &Filter,
        update: Update,
    ) -> Result<Option<Value>, StoreError> {
        match &update {
            Update::Set(fields) => {
                let mut fields = fields.clone();
                fields.insert("updatedAt".to_string(), json!(timestamp()));
                Ok(Some(Value::Object(fields)))
            }
            Update::AddToSet { field, .. } | Update::Pull { field, .. } => {
                let Some(Value::Object(mut current)) = self.find_one(collection, filter).await? else {
                    return Ok(None);
                };
                update.apply(&mut current)?;

                let mut patch = Map::new();
                patch.insert(field.clone(), current.remove(field).unwrap_or(Value::Null));
                patch.insert("updatedAt".to_string(), json!(timestamp()));
                Ok(Some(Value::Object(patch)))
            }
        }
    }
}

#[async_trait]
impl DocumentStore for SupabaseClient {
    async fn insert(&self, collection: Collection, document: Value) -> Result<Value, StoreError> {
        let Value::Object(mut fields) = document else {
            return Err(StoreError::Malformed("documents must be JSON objects".to_string()));
        };

        let now = timestamp();
        fields.insert("_id".to_string(), json!(Uuid::new_v4().to_string()));
        fields.insert("createdAt".to_string(), json!(now));
        fields.insert("updatedAt".to_string(), json!(now));

        let path = Self::table_path(collection, &Filter::all());
        let rows = self.request(Method::POST, &path, Some(Value::Object(fields)), collection).await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Malformed(format!("insert into {} returned no rows", collection)))
    }

    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>, StoreError> {
        let path = format!(
            "{}{}order=createdAt.asc",
            Self::table_path(collection, filter),
            if filter.conditions().is_empty() { "?" } else { "&" }
        );
        self.request(Method::GET, &path, None, collection).await
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        update: Update,
    ) -> Result<Option<Value>, StoreError> {
        let Some(patch) = self.resolve_update(collection, filter, update).await? else {
            return Ok(None);
        };

        let path = Self::table_path(collection, filter);
        let rows = self.request(Method::PATCH, &path, Some(patch), collection).await?;
        Ok(rows.into_iter().next())
    }

    // PostgREST applies PATCH/DELETE to every matching row; callers filter on
    // identity keys, which match at most one row per table.
    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Value>, StoreError> {
        let path = Self::table_path(collection, filter);
        let rows = self.request(Method::DELETE, &path, None, collection).await?;
        Ok(rows.into_iter().next())
    }
}
