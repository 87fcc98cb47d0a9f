//! Types for the local species cache.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of types a species can have.
pub const MAX_TYPES: usize = 2;

/// One cached species, keyed by Pokédex ID.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedSpecies {
    /// Pokédex ID (primary key, never changes once stored).
    pub pokedex_id: u32,
    /// Canonical upstream name (e.g., "pikachu").
    pub canonical_name: String,
    /// Display name in the configured language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localized_name: Option<String>,
    /// Type tags in slot order (1 or 2 entries).
    pub types: Vec<String>,
    /// Base stats.
    pub base_stats: BaseStats,
    /// Preferred sprite URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite_url: Option<String>,
    /// When this entry was last written.
    pub last_updated: DateTime<Utc>,
}

impl CachedSpecies {
    /// Name to show in the UI: localized if known, canonical otherwise.
    pub fn display_name(&self) -> &str {
        self.localized_name
            .as_deref()
            .unwrap_or(&self.canonical_name)
    }

    /// Check the record invariants that the type system does not enforce.
    pub fn validate(&self) -> Result<(), String> {
        if self.pokedex_id == 0 {
            return Err("pokedex_id must be positive".to_string());
        }
        if self.types.is_empty() || self.types.len() > MAX_TYPES {
            return Err(format!(
                "species {} has {} types, expected 1 or 2",
                self.pokedex_id,
                self.types.len()
            ));
        }
        Ok(())
    }
}

/// The six base stats.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BaseStats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub special_attack: u32,
    pub special_defense: u32,
    pub speed: u32,
}

impl BaseStats {
    /// Base stat total.
    pub fn total(&self) -> u32 {
        self.hp
            + self.attack
            + self.defense
            + self.special_attack
            + self.special_defense
            + self.speed
    }
}

/// Query for listing cached species.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeciesQuery {
    /// Number of entries to skip (ordered by Pokédex ID).
    #[serde(default)]
    pub offset: u32,
    /// Maximum entries to return; all when unset.
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Cache statistics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheStats {
    /// Number of cached species.
    pub total_species: u64,
    /// Lowest cached Pokédex ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lowest_id: Option<u32>,
    /// Highest cached Pokédex ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_id: Option<u32>,
    /// Oldest `last_updated`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_update: Option<DateTime<Utc>>,
    /// Newest `last_updated`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_update: Option<DateTime<Utc>>,
}

/// Errors for species store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Species not cached: {0}")]
    NotFound(u32),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn species(types: &[&str]) -> CachedSpecies {
        CachedSpecies {
            pokedex_id: 6,
            canonical_name: "charizard".to_string(),
            localized_name: None,
            types: types.iter().map(|t| t.to_string()).collect(),
            base_stats: BaseStats {
                hp: 78,
                attack: 84,
                defense: 78,
                special_attack: 109,
                special_defense: 85,
                speed: 100,
            },
            sprite_url: None,
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn test_base_stat_total() {
        assert_eq!(species(&["fire"]).base_stats.total(), 534);
        assert_eq!(BaseStats::default().total(), 0);
    }

    #[test]
    fn test_display_name_falls_back_to_canonical() {
        let mut s = species(&["fire", "flying"]);
        assert_eq!(s.display_name(), "charizard");
        s.localized_name = Some("Glurak".to_string());
        assert_eq!(s.display_name(), "Glurak");
    }

    #[test]
    fn test_validate_type_count() {
        assert!(species(&["fire"]).validate().is_ok());
        assert!(species(&["fire", "flying"]).validate().is_ok());
        assert!(species(&[]).validate().is_err());
        assert!(species(&["fire", "flying", "dragon"]).validate().is_err());
    }

    #[test]
    fn test_validate_zero_id() {
        let mut s = species(&["fire"]);
        s.pokedex_id = 0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_cached_species_serialization() {
        let s = species(&["fire", "flying"]);
        let json = serde_json::to_string(&s).unwrap();
        assert!(!json.contains("localized_name")); // None is skipped
        assert!(json.contains("\"special_attack\":109"));

        let parsed: CachedSpecies = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, s);
    }

    #[test]
    fn test_species_query_defaults() {
        let query: SpeciesQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.offset, 0);
        assert!(query.limit.is_none());
    }
}
