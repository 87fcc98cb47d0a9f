//! Mock upstream species source for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::pokeapi::{FetchError, PokemonRecord, SpeciesRecord, SpeciesSource};

/// Upstream data for one Pokédex ID.
#[derive(Debug, Clone)]
pub struct MockSpecies {
    pub pokemon: PokemonRecord,
    pub species: SpeciesRecord,
}

/// A recorded upstream call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedFetch {
    Pokemon(u32),
    Species(u32),
}

/// Mock implementation of the SpeciesSource trait.
///
/// Provides controllable behavior for testing:
/// - Serve configured species, 404 for everything else
/// - Track fetches for assertions
/// - Inject one-shot or persistent failures per ID
/// - Simulate a full upstream outage
///
/// # Example
///
/// ```rust,ignore
/// use nuzdex_core::testing::{fixtures, MockSpeciesSource};
///
/// let source = MockSpeciesSource::new();
/// source.add(fixtures::pikachu()).await;
///
/// let record = source.fetch_pokemon(25).await?;
/// assert_eq!(record.name, "pikachu");
/// ```
#[derive(Debug, Default)]
pub struct MockSpeciesSource {
    /// Upstream data by Pokédex ID.
    species: Arc<RwLock<HashMap<u32, MockSpecies>>>,
    /// Recorded fetches.
    fetches: Arc<RwLock<Vec<RecordedFetch>>>,
    /// One-shot errors consumed by the next `fetch_pokemon` for an ID.
    queued_errors: Arc<RwLock<HashMap<u32, VecDeque<FetchError>>>>,
    /// IDs that always answer with a 503.
    unavailable: Arc<RwLock<HashSet<u32>>>,
    /// When set, every call fails with a 503.
    offline: Arc<RwLock<bool>>,
}

impl MockSpeciesSource {
    /// Create a new empty mock source.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Data Configuration
    // =========================================================================

    /// Add (or replace) a species.
    pub async fn add(&self, entry: MockSpecies) {
        self.species.write().await.insert(entry.pokemon.id, entry);
    }

    /// Add several species at once.
    pub async fn add_all(&self, entries: impl IntoIterator<Item = MockSpecies>) {
        let mut map = self.species.write().await;
        for entry in entries {
            map.insert(entry.pokemon.id, entry);
        }
    }

    /// Remove a species so it answers 404.
    pub async fn remove(&self, pokedex_id: u32) {
        self.species.write().await.remove(&pokedex_id);
    }

    // =========================================================================
    // Fetch Recording
    // =========================================================================

    /// Get all recorded fetches.
    pub async fn recorded_fetches(&self) -> Vec<RecordedFetch> {
        self.fetches.read().await.clone()
    }

    /// Get the number of upstream calls performed.
    pub async fn fetch_count(&self) -> usize {
        self.fetches.read().await.len()
    }

    /// Clear recorded fetches.
    pub async fn clear_recorded(&self) {
        self.fetches.write().await.clear();
    }

    // =========================================================================
    // Error Injection
    // =========================================================================

    /// Fail the next core-record fetch for `pokedex_id` with `error`.
    pub async fn fail_once(&self, pokedex_id: u32, error: FetchError) {
        self.queued_errors
            .write()
            .await
            .entry(pokedex_id)
            .or_default()
            .push_back(error);
    }

    /// Make `pokedex_id` answer 503 until cleared.
    pub async fn set_unavailable(&self, pokedex_id: u32, unavailable: bool) {
        let mut set = self.unavailable.write().await;
        if unavailable {
            set.insert(pokedex_id);
        } else {
            set.remove(&pokedex_id);
        }
    }

    /// Make every call answer 503 until cleared.
    pub async fn set_offline(&self, offline: bool) {
        *self.offline.write().await = offline;
    }

    async fn injected_error(&self, pokedex_id: u32) -> Option<FetchError> {
        if let Some(error) = self
            .queued_errors
            .write()
            .await
            .get_mut(&pokedex_id)
            .and_then(|queue| queue.pop_front())
        {
            return Some(error);
        }

        if *self.offline.read().await || self.unavailable.read().await.contains(&pokedex_id) {
            return Some(FetchError::ApiError {
                status: 503,
                message: "Service Unavailable".to_string(),
            });
        }

        None
    }
}

#[async_trait]
impl SpeciesSource for MockSpeciesSource {
    async fn fetch_pokemon(&self, pokedex_id: u32) -> Result<PokemonRecord, FetchError> {
        self.fetches
            .write()
            .await
            .push(RecordedFetch::Pokemon(pokedex_id));

        if let Some(error) = self.injected_error(pokedex_id).await {
            return Err(error);
        }

        self.species
            .read()
            .await
            .get(&pokedex_id)
            .map(|entry| entry.pokemon.clone())
            .ok_or(FetchError::NotFound(pokedex_id))
    }

    async fn fetch_species(&self, pokedex_id: u32) -> Result<SpeciesRecord, FetchError> {
        self.fetches
            .write()
            .await
            .push(RecordedFetch::Species(pokedex_id));

        if *self.offline.read().await {
            return Err(FetchError::ApiError {
                status: 503,
                message: "Service Unavailable".to_string(),
            });
        }

        self.species
            .read()
            .await
            .get(&pokedex_id)
            .map(|entry| entry.species.clone())
            .ok_or(FetchError::NotFound(pokedex_id))
    }
}
