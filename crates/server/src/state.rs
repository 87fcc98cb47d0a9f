use std::sync::Arc;

use nuzdex_core::{Config, SpeciesCache, SpeciesSource, SpeciesStore, SyncOptions};

use crate::jobs::SyncJobRegistry;

/// Shared application state
pub struct AppState {
    config: Config,
    cache: Arc<SpeciesCache>,
    jobs: SyncJobRegistry,
}

impl AppState {
    pub fn new(
        config: Config,
        source: Arc<dyn SpeciesSource>,
        store: Arc<dyn SpeciesStore>,
    ) -> Self {
        let cache = Arc::new(SpeciesCache::new(
            source,
            store,
            config.pokeapi.language.clone(),
        ));
        let jobs = SyncJobRegistry::new(Arc::clone(&cache), SyncOptions::from(&config.sync));

        Self {
            config,
            cache,
            jobs,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &SpeciesCache {
        &self.cache
    }

    pub fn store(&self) -> &dyn SpeciesStore {
        self.cache.store().as_ref()
    }

    pub fn jobs(&self) -> &SyncJobRegistry {
        &self.jobs
    }
}
