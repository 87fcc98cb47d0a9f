//! PokeAPI response types.
//!
//! Only the fields the cache needs are modeled; everything else in the
//! upstream payloads is ignored during deserialization.

use serde::{Deserialize, Serialize};

// ============================================================================
// /pokemon/{id}
// ============================================================================

/// Core species record from `/pokemon/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PokemonRecord {
    /// Pokédex ID.
    pub id: u32,
    /// Canonical (English, lowercase) name.
    pub name: String,
    /// Type slots (1 or 2 entries for valid records).
    #[serde(default)]
    pub types: Vec<PokemonTypeSlot>,
    /// Base stat entries.
    #[serde(default)]
    pub stats: Vec<PokemonStatEntry>,
    /// Sprite URLs.
    #[serde(default)]
    pub sprites: PokemonSprites,
}

/// A `{name, url}` reference to another PokeAPI resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamedResource {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl NamedResource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
        }
    }
}

/// One entry of the `types` array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PokemonTypeSlot {
    /// 1 for the primary type, 2 for the secondary.
    #[serde(default)]
    pub slot: u8,
    #[serde(rename = "type")]
    pub type_: NamedResource,
}

/// One entry of the `stats` array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PokemonStatEntry {
    pub base_stat: u32,
    #[serde(default)]
    pub effort: u32,
    pub stat: NamedResource,
}

/// Sprite block; only the default front sprite and the official artwork are read.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PokemonSprites {
    #[serde(default)]
    pub front_default: Option<String>,
    #[serde(default)]
    pub other: Option<OtherSprites>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OtherSprites {
    #[serde(rename = "official-artwork", default)]
    pub official_artwork: Option<ArtworkSprites>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ArtworkSprites {
    #[serde(default)]
    pub front_default: Option<String>,
}

// ============================================================================
// /pokemon-species/{id}
// ============================================================================

/// Localization record from `/pokemon-species/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SpeciesRecord {
    #[serde(default)]
    pub names: Vec<LocalizedName>,
}

/// A display name in one language.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocalizedName {
    pub language: NamedResource,
    pub name: String,
}

impl SpeciesRecord {
    /// Display name for the given language code, if the upstream has one.
    pub fn name_for(&self, language: &str) -> Option<&str> {
        self.names
            .iter()
            .find(|n| n.language.name == language)
            .map(|n| n.name.as_str())
    }
}
