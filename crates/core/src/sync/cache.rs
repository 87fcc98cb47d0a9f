//! Fetch-and-cache of single species.

use std::sync::Arc;

use chrono::{SubsecRound, Utc};
use thiserror::Error;
use tracing::{debug, info};

use super::normalize::normalize_species;
use crate::metrics::CACHE_LOOKUPS;
use crate::pokeapi::{FetchError, FetchErrorKind, SpeciesSource};
use crate::species::{CachedSpecies, SpeciesStore, StoreError};

/// Errors from cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Pokédex IDs start at 1.
    #[error("Invalid Pokédex ID: {0}")]
    InvalidId(u32),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CacheError {
    /// Boundary kind: only an upstream 404 counts as not-found.
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            CacheError::Fetch(e) => e.kind(),
            _ => FetchErrorKind::Transient,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == FetchErrorKind::NotFound
    }
}

/// Read-through cache in front of the upstream source.
pub struct SpeciesCache {
    source: Arc<dyn SpeciesSource>,
    store: Arc<dyn SpeciesStore>,
    language: String,
}

impl SpeciesCache {
    /// `language` selects the localized display name (e.g. "de").
    pub fn new(
        source: Arc<dyn SpeciesSource>,
        store: Arc<dyn SpeciesStore>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            source,
            store,
            language: language.into(),
        }
    }

    pub fn store(&self) -> &Arc<dyn SpeciesStore> {
        &self.store
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Local lookup only; never touches the network.
    pub fn get_cached(&self, pokedex_id: u32) -> Result<Option<CachedSpecies>, CacheError> {
        Ok(self.store.get(pokedex_id)?)
    }

    /// Return the cached entry, fetching and storing it on a miss.
    ///
    /// A hit performs no upstream calls; a miss performs two and one write.
    pub async fn ensure_cached(&self, pokedex_id: u32) -> Result<CachedSpecies, CacheError> {
        if pokedex_id == 0 {
            return Err(CacheError::InvalidId(pokedex_id));
        }

        if let Some(cached) = self.store.get(pokedex_id)? {
            CACHE_LOOKUPS.with_label_values(&["hit"]).inc();
            debug!("Species {} served from cache", pokedex_id);
            return Ok(cached);
        }

        CACHE_LOOKUPS.with_label_values(&["miss"]).inc();
        self.fetch_and_store(pokedex_id).await
    }

    /// Re-fetch from upstream and overwrite the cached entry.
    pub async fn refresh(&self, pokedex_id: u32) -> Result<CachedSpecies, CacheError> {
        if pokedex_id == 0 {
            return Err(CacheError::InvalidId(pokedex_id));
        }
        self.fetch_and_store(pokedex_id).await
    }

    async fn fetch_and_store(&self, pokedex_id: u32) -> Result<CachedSpecies, CacheError> {
        let pokemon = self.source.fetch_pokemon(pokedex_id).await?;
        let species = self.source.fetch_species(pokedex_id).await?;

        // The store keeps microsecond precision
        let now = Utc::now().trunc_subsecs(6);
        let cached = normalize_species(pokedex_id, pokemon, &species, &self.language, now)?;
        self.store.upsert(&cached)?;

        info!(
            "Cached species {} ({}) types={:?}",
            cached.pokedex_id,
            cached.display_name(),
            cached.types
        );
        Ok(cached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::SqliteSpeciesStore;
    use crate::testing::{fixtures, MockSpeciesSource, RecordedFetch};

    fn cache_with(source: Arc<MockSpeciesSource>) -> SpeciesCache {
        let store = Arc::new(SqliteSpeciesStore::in_memory().unwrap());
        SpeciesCache::new(source, store, "de")
    }

    #[tokio::test]
    async fn test_ensure_cached_pikachu() {
        let source = Arc::new(MockSpeciesSource::new());
        source.add(fixtures::pikachu()).await;
        let cache = cache_with(Arc::clone(&source));

        let cached = cache.ensure_cached(25).await.unwrap();
        assert_eq!(cached.pokedex_id, 25);
        assert_eq!(cached.localized_name.as_deref(), Some("Pikachu"));
        assert_eq!(cached.types, vec!["electric"]);
        assert_eq!(cached.base_stats.hp, 35);
        assert_eq!(cached.base_stats.attack, 55);
        assert_eq!(cached.base_stats.defense, 40);
        assert_eq!(cached.base_stats.special_attack, 50);
        assert_eq!(cached.base_stats.special_defense, 50);
        assert_eq!(cached.base_stats.speed, 90);
    }

    #[tokio::test]
    async fn test_second_call_is_cache_hit() {
        let source = Arc::new(MockSpeciesSource::new());
        source.add(fixtures::pikachu()).await;
        let cache = cache_with(Arc::clone(&source));

        let first = cache.ensure_cached(25).await.unwrap();
        let second = cache.ensure_cached(25).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(
            source.recorded_fetches().await,
            vec![RecordedFetch::Pokemon(25), RecordedFetch::Species(25)]
        );
    }

    #[tokio::test]
    async fn test_not_found_is_not_cached() {
        let source = Arc::new(MockSpeciesSource::new());
        let cache = cache_with(Arc::clone(&source));

        let err = cache.ensure_cached(9999).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(cache.get_cached(9999).unwrap().is_none());
        // The species endpoint is skipped once the core record is missing
        assert_eq!(source.fetch_count().await, 1);
    }

    #[tokio::test]
    async fn test_transient_error_propagates() {
        let source = Arc::new(MockSpeciesSource::new());
        source.add(fixtures::pikachu()).await;
        source
            .fail_once(
                25,
                FetchError::ApiError {
                    status: 503,
                    message: "maintenance".to_string(),
                },
            )
            .await;
        let cache = cache_with(Arc::clone(&source));

        let err = cache.ensure_cached(25).await.unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::Transient);
        assert!(cache.get_cached(25).unwrap().is_none());

        // Next attempt succeeds
        assert!(cache.ensure_cached(25).await.is_ok());
    }

    #[tokio::test]
    async fn test_zero_id_rejected() {
        let source = Arc::new(MockSpeciesSource::new());
        let cache = cache_with(Arc::clone(&source));

        let err = cache.ensure_cached(0).await.unwrap_err();
        assert!(matches!(err, CacheError::InvalidId(0)));
        assert!(!err.is_not_found());
        assert_eq!(source.fetch_count().await, 0);
    }

    #[tokio::test]
    async fn test_refresh_overwrites_entry() {
        let source = Arc::new(MockSpeciesSource::new());
        source.add(fixtures::pikachu()).await;
        let cache = cache_with(Arc::clone(&source));

        let first = cache.ensure_cached(25).await.unwrap();

        let mut updated = fixtures::pikachu();
        updated.pokemon.stats = fixtures::stats([35, 55, 40, 50, 50, 100]);
        source.add(updated).await;

        // Still a cache hit until refreshed
        assert_eq!(cache.ensure_cached(25).await.unwrap().base_stats.speed, 90);

        let refreshed = cache.refresh(25).await.unwrap();
        assert_eq!(refreshed.base_stats.speed, 100);
        assert!(refreshed.last_updated >= first.last_updated);
        assert_eq!(cache.store().count().unwrap(), 1);
    }
}
