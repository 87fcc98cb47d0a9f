//! Testing utilities and mock implementations.
//!
//! This module provides a mock upstream source so the cache, the range sync
//! and the HTTP API can be exercised without reaching PokeAPI.
//!
//! # Example
//!
//! ```rust,ignore
//! use nuzdex_core::testing::{fixtures, MockSpeciesSource};
//!
//! let source = MockSpeciesSource::new();
//! source.add_all(fixtures::species_range(1, 10)).await;
//!
//! // Use in SpeciesCache / AppState...
//! ```

mod mock_species_source;

pub use mock_species_source::{MockSpecies, MockSpeciesSource, RecordedFetch};

/// Test fixtures and helper functions.
pub mod fixtures {
    use super::MockSpecies;
    use crate::pokeapi::{
        ArtworkSprites, LocalizedName, NamedResource, OtherSprites, PokemonRecord,
        PokemonSprites, PokemonStatEntry, PokemonTypeSlot, SpeciesRecord,
    };

    const STAT_TAGS: [&str; 6] = [
        "hp",
        "attack",
        "defense",
        "special-attack",
        "special-defense",
        "speed",
    ];

    /// Stat entries in upstream order: hp, attack, defense, sp. atk, sp. def, speed.
    pub fn stats(values: [u32; 6]) -> Vec<PokemonStatEntry> {
        STAT_TAGS
            .iter()
            .zip(values)
            .map(|(tag, value)| PokemonStatEntry {
                base_stat: value,
                effort: 0,
                stat: NamedResource::new(*tag),
            })
            .collect()
    }

    /// Build upstream data for one species.
    pub fn species(
        pokedex_id: u32,
        name: &str,
        types: &[&str],
        base_stats: [u32; 6],
        german_name: Option<&str>,
    ) -> MockSpecies {
        let names = german_name
            .map(|n| {
                vec![
                    LocalizedName {
                        language: NamedResource::new("en"),
                        name: name.to_string(),
                    },
                    LocalizedName {
                        language: NamedResource::new("de"),
                        name: n.to_string(),
                    },
                ]
            })
            .unwrap_or_default();

        MockSpecies {
            pokemon: PokemonRecord {
                id: pokedex_id,
                name: name.to_string(),
                types: types
                    .iter()
                    .enumerate()
                    .map(|(i, t)| PokemonTypeSlot {
                        slot: (i + 1) as u8,
                        type_: NamedResource::new(*t),
                    })
                    .collect(),
                stats: stats(base_stats),
                sprites: PokemonSprites {
                    front_default: Some(format!(
                        "https://sprites.example.test/pokemon/{}.png",
                        pokedex_id
                    )),
                    other: Some(OtherSprites {
                        official_artwork: Some(ArtworkSprites {
                            front_default: Some(format!(
                                "https://sprites.example.test/official-artwork/{}.png",
                                pokedex_id
                            )),
                        }),
                    }),
                },
            },
            species: SpeciesRecord { names },
        }
    }

    /// Pikachu (#25) with its German name.
    pub fn pikachu() -> MockSpecies {
        species(
            25,
            "pikachu",
            &["electric"],
            [35, 55, 40, 50, 50, 90],
            Some("Pikachu"),
        )
    }

    /// Charizard (#6), dual-typed.
    pub fn charizard() -> MockSpecies {
        species(
            6,
            "charizard",
            &["fire", "flying"],
            [78, 84, 78, 109, 85, 100],
            Some("Glurak"),
        )
    }

    /// Generic single-type species for every ID in `start..=end`.
    pub fn species_range(start: u32, end: u32) -> Vec<MockSpecies> {
        (start..=end)
            .map(|id| {
                species(
                    id,
                    &format!("species-{}", id),
                    &["normal"],
                    [50, 50, 50, 50, 50, 50],
                    None,
                )
            })
            .collect()
    }
}
