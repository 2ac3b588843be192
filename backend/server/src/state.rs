use std::sync::Arc;

use tracing::{info, warn};

use super::{
    config::{Config, KvBackend},
    database::RedisStore,
    store::{KvStore, MemoryStore, StoreError},
};

pub struct State {
    pub config: Config,
    pub store: Arc<dyn KvStore>,
}

impl State {
    pub async fn new(config: Config) -> Result<Arc<Self>, StoreError> {
        let store: Arc<dyn KvStore> = match config.kv_backend {
            KvBackend::Redis => {
                info!("Connecting to Redis at {}", config.redis_url);
                Arc::new(RedisStore::connect(&config.redis_url).await?)
            }
            KvBackend::Memory => {
                warn!("Using in-memory store, data is lost on restart");
                Arc::new(MemoryStore::new())
            }
        };

        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: Config, store: Arc<dyn KvStore>) -> Arc<Self> {
        if config.admin_token.is_none() {
            warn!("No ADMIN_TOKEN configured, admin routes are open to anyone");
        }

        Arc::new(Self { config, store })
    }
}
