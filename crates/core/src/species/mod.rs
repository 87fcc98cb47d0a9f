//! Species cache - the local store of upstream species metadata.
//!
//! Everything else in the application reads species data from here so it
//! never has to hit PokeAPI on a request path.

mod sqlite;
mod types;

pub use sqlite::SqliteSpeciesStore;
pub use types::*;

/// Trait for species cache storage.
pub trait SpeciesStore: Send + Sync {
    /// Insert or overwrite the record keyed by its Pokédex ID.
    ///
    /// The whole record is written atomically; records failing
    /// [`CachedSpecies::validate`] are rejected.
    fn upsert(&self, species: &CachedSpecies) -> Result<(), StoreError>;

    /// Point lookup by Pokédex ID.
    fn get(&self, pokedex_id: u32) -> Result<Option<CachedSpecies>, StoreError>;

    /// List cached species ordered by Pokédex ID.
    fn list(&self, query: &SpeciesQuery) -> Result<Vec<CachedSpecies>, StoreError>;

    /// Number of cached species.
    fn count(&self) -> Result<u64, StoreError>;

    /// Check if a species is cached.
    fn exists(&self, pokedex_id: u32) -> Result<bool, StoreError>;

    /// Remove a species from the cache.
    fn remove(&self, pokedex_id: u32) -> Result<(), StoreError>;

    /// Clear all cached data.
    fn clear(&self) -> Result<(), StoreError>;

    /// Get cache statistics.
    fn stats(&self) -> Result<CacheStats, StoreError>;
}
