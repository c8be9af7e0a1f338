use crate::config::ServerConfig;
use crate::model::SpreadsheetMetadata;
use crate::service::SpreadsheetService;
use anyhow::Result;
use lru::LruCache;
use parking_lot::RwLock;
use std::num::NonZeroUsize;
use std::sync::Arc;

pub struct AppState {
    config: Arc<ServerConfig>,
    service: Arc<dyn SpreadsheetService>,
    // Metadata is re-fetched by almost every tool; cache per
    // spreadsheet id and invalidate after structural mutations.
    metadata_cache: RwLock<LruCache<String, Arc<SpreadsheetMetadata>>>,
}

impl AppState {
    pub fn new(config: Arc<ServerConfig>, service: Arc<dyn SpreadsheetService>) -> Self {
        let capacity = NonZeroUsize::new(config.cache_capacity.max(1)).unwrap();
        Self {
            config,
            service,
            metadata_cache: RwLock::new(LruCache::new(capacity)),
        }
    }

    pub fn config(&self) -> Arc<ServerConfig> {
        self.config.clone()
    }

    pub fn service(&self) -> Arc<dyn SpreadsheetService> {
        self.service.clone()
    }

    pub async fn metadata(
        &self,
        user_email: &str,
        spreadsheet_id: &str,
    ) -> Result<Arc<SpreadsheetMetadata>> {
        {
            let mut cache = self.metadata_cache.write();
            if let Some(entry) = cache.get(spreadsheet_id) {
                return Ok(entry.clone());
            }
        }

        let metadata = Arc::new(self.service.get_metadata(user_email, spreadsheet_id).await?);

        let mut cache = self.metadata_cache.write();
        cache.put(spreadsheet_id.to_string(), metadata.clone());
        Ok(metadata)
    }

    /// Drop cached metadata after a mutation that can change sheet
    /// structure, merges, named ranges, or rule counts.
    pub fn invalidate_metadata(&self, spreadsheet_id: &str) {
        let mut cache = self.metadata_cache.write();
        cache.pop(spreadsheet_id);
    }
}
