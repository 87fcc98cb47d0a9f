//! Conversion of upstream PokeAPI records into cache entries.

use chrono::{DateTime, Utc};

use crate::pokeapi::{FetchError, PokemonRecord, PokemonSprites, PokemonStatEntry, SpeciesRecord};
use crate::species::{BaseStats, CachedSpecies, MAX_TYPES};

/// Build a cache entry from the two upstream records for `pokedex_id`.
///
/// Stats are matched by tag and default to 0 when absent. Types keep their
/// slot order. The localized name falls back to the canonical name when the
/// upstream has no entry for `language`.
pub fn normalize_species(
    pokedex_id: u32,
    pokemon: PokemonRecord,
    species: &SpeciesRecord,
    language: &str,
    now: DateTime<Utc>,
) -> Result<CachedSpecies, FetchError> {
    if pokemon.id != pokedex_id {
        return Err(FetchError::ParseError(format!(
            "requested Pokédex ID {} but upstream returned {}",
            pokedex_id, pokemon.id
        )));
    }

    let types = extract_types(&pokemon)?;
    let localized_name = species
        .name_for(language)
        .map(str::to_string)
        .unwrap_or_else(|| pokemon.name.clone());

    Ok(CachedSpecies {
        pokedex_id,
        base_stats: extract_stats(&pokemon.stats),
        sprite_url: select_sprite(&pokemon.sprites),
        canonical_name: pokemon.name,
        localized_name: Some(localized_name),
        types,
        last_updated: now,
    })
}

/// Map stat entries onto the six named stats. Unknown tags are ignored.
pub fn extract_stats(stats: &[PokemonStatEntry]) -> BaseStats {
    let mut base = BaseStats::default();

    for entry in stats {
        match entry.stat.name.as_str() {
            "hp" => base.hp = entry.base_stat,
            "attack" => base.attack = entry.base_stat,
            "defense" => base.defense = entry.base_stat,
            "special-attack" => base.special_attack = entry.base_stat,
            "special-defense" => base.special_defense = entry.base_stat,
            "speed" => base.speed = entry.base_stat,
            _ => {}
        }
    }

    base
}

fn extract_types(pokemon: &PokemonRecord) -> Result<Vec<String>, FetchError> {
    let mut slots: Vec<_> = pokemon.types.iter().collect();
    slots.sort_by_key(|t| t.slot);

    let types: Vec<String> = slots.into_iter().map(|t| t.type_.name.clone()).collect();
    if types.is_empty() || types.len() > MAX_TYPES {
        return Err(FetchError::ParseError(format!(
            "{} has {} types, expected 1 or 2",
            pokemon.name,
            types.len()
        )));
    }
    Ok(types)
}

/// Official artwork, then the default front sprite, then nothing.
pub fn select_sprite(sprites: &PokemonSprites) -> Option<String> {
    sprites
        .other
        .as_ref()
        .and_then(|o| o.official_artwork.as_ref())
        .and_then(|a| a.front_default.clone())
        .or_else(|| sprites.front_default.clone())
}
