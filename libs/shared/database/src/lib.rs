pub mod memory;
pub mod store;
pub mod supabase;
pub mod uploads;

use std::sync::Arc;

use shared_config::{AppConfig, StoreBackend};
use tracing::info;

pub use memory::MemoryStore;
pub use store::{Collection, DocumentStore, Filter, StoreError, Update};
pub use supabase::SupabaseClient;
pub use uploads::{StoredFile, UploadKind, UploadStore};

/// Handles shared by every cell router.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
    pub uploads: UploadStore,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>) -> Self {
        let uploads = UploadStore::new(config.upload_dir.clone());
        Self {
            config: Arc::new(config),
            store,
            uploads,
        }
    }

    /// Builds the store selected by `config.store_backend`.
    pub fn from_config(config: AppConfig) -> Self {
        let store: Arc<dyn DocumentStore> = match config.store_backend {
            StoreBackend::Supabase => {
                info!("Using Supabase document store at {}", config.supabase_url);
                Arc::new(SupabaseClient::new(&config))
            }
            StoreBackend::Memory => {
                info!("Using in-memory document store");
                Arc::new(MemoryStore::new())
            }
        };

        Self::new(config, store)
    }
}
