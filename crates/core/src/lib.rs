pub mod config;
pub mod metrics;
pub mod pokeapi;
pub mod species;
pub mod sync;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    PokeApiConfig, ServerConfig, SyncConfig,
};
pub use pokeapi::{FetchError, FetchErrorKind, PokeApiClient, SpeciesSource};
pub use species::{
    BaseStats, CacheStats, CachedSpecies, SpeciesQuery, SpeciesStore, SqliteSpeciesStore,
    StoreError,
};
pub use sync::{
    validate_range, CacheError, ProgressListener, ProgressSnapshot, SpeciesCache, StopReason,
    SyncError, SyncFailure, SyncOptions, SyncPreset, SyncProgress, SyncReport,
};
