//! Species cache population.
//!
//! [`SpeciesCache`] sits between the upstream [`SpeciesSource`] and the local
//! [`SpeciesStore`]: single IDs are fetched on demand, ranges are walked by
//! [`SpeciesCache::sync_range`] with progress reported through a
//! caller-owned [`SyncProgress`].
//!
//! [`SpeciesSource`]: crate::pokeapi::SpeciesSource
//! [`SpeciesStore`]: crate::species::SpeciesStore

mod cache;
mod normalize;
mod progress;
mod range;

pub use cache::{CacheError, SpeciesCache};
pub use normalize::{extract_stats, normalize_species, select_sprite};
pub use progress::{ProgressListener, ProgressSnapshot, SyncProgress};
pub use range::{
    validate_range, StopReason, SyncError, SyncFailure, SyncOptions, SyncPreset, SyncReport,
};
