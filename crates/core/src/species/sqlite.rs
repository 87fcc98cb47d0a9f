//! SQLite-backed species cache implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

use super::{BaseStats, CacheStats, CachedSpecies, SpeciesQuery, SpeciesStore, StoreError};

const SELECT_COLUMNS: &str = "pokedex_id, canonical_name, localized_name, types,
    hp, attack, defense, special_attack, special_defense, speed,
    sprite_url, last_updated";

/// SQLite-backed species cache.
pub struct SqliteSpeciesStore {
    conn: Mutex<Connection>,
}

impl SqliteSpeciesStore {
    /// Open (or create) the database file and ensure the schema exists.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            -- One row per Pokédex ID; types is a JSON array of 1-2 type tags
            CREATE TABLE IF NOT EXISTS species_cache (
                pokedex_id INTEGER PRIMARY KEY CHECK (pokedex_id > 0),
                canonical_name TEXT NOT NULL,
                localized_name TEXT,
                types TEXT NOT NULL,
                hp INTEGER NOT NULL DEFAULT 0,
                attack INTEGER NOT NULL DEFAULT 0,
                defense INTEGER NOT NULL DEFAULT 0,
                special_attack INTEGER NOT NULL DEFAULT 0,
                special_defense INTEGER NOT NULL DEFAULT 0,
                speed INTEGER NOT NULL DEFAULT 0,
                sprite_url TEXT,
                last_updated TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_species_cache_name ON species_cache(canonical_name);
            "#,
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Database("connection lock poisoned".to_string()))
    }

    /// Convert a row (in `SELECT_COLUMNS` order) to a CachedSpecies.
    fn row_to_species(row: &rusqlite::Row) -> rusqlite::Result<CachedSpecies> {
        let types_json: String = row.get(3)?;
        let types: Vec<String> = serde_json::from_str(&types_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

        let last_updated_str: String = row.get(11)?;
        let last_updated = parse_timestamp(11, &last_updated_str)?;

        Ok(CachedSpecies {
            pokedex_id: row.get(0)?,
            canonical_name: row.get(1)?,
            localized_name: row.get(2)?,
            types,
            base_stats: BaseStats {
                hp: row.get(4)?,
                attack: row.get(5)?,
                defense: row.get(6)?,
                special_attack: row.get(7)?,
                special_defense: row.get(8)?,
                speed: row.get(9)?,
            },
            sprite_url: row.get(10)?,
            last_updated,
        })
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    // Fixed-width so MIN/MAX over the text column order chronologically.
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

impl SpeciesStore for SqliteSpeciesStore {
    fn upsert(&self, species: &CachedSpecies) -> Result<(), StoreError> {
        species.validate().map_err(StoreError::InvalidRecord)?;

        let types_json = serde_json::to_string(&species.types)
            .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;
        let stats = &species.base_stats;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO species_cache (pokedex_id, canonical_name, localized_name, types,
                hp, attack, defense, special_attack, special_defense, speed,
                sprite_url, last_updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(pokedex_id) DO UPDATE SET
                canonical_name = excluded.canonical_name,
                localized_name = excluded.localized_name,
                types = excluded.types,
                hp = excluded.hp,
                attack = excluded.attack,
                defense = excluded.defense,
                special_attack = excluded.special_attack,
                special_defense = excluded.special_defense,
                speed = excluded.speed,
                sprite_url = excluded.sprite_url,
                last_updated = excluded.last_updated",
            params![
                species.pokedex_id,
                &species.canonical_name,
                &species.localized_name,
                &types_json,
                stats.hp,
                stats.attack,
                stats.defense,
                stats.special_attack,
                stats.special_defense,
                stats.speed,
                &species.sprite_url,
                format_timestamp(&species.last_updated),
            ],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get(&self, pokedex_id: u32) -> Result<Option<CachedSpecies>, StoreError> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM species_cache WHERE pokedex_id = ?",
                SELECT_COLUMNS
            ),
            params![pokedex_id],
            Self::row_to_species,
        )
        .optional()
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn list(&self, query: &SpeciesQuery) -> Result<Vec<CachedSpecies>, StoreError> {
        let conn = self.conn()?;
        // A negative LIMIT means "no limit" in SQLite
        let limit: i64 = query.limit.map(i64::from).unwrap_or(-1);

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM species_cache ORDER BY pokedex_id ASC LIMIT ?1 OFFSET ?2",
                SELECT_COLUMNS
            ))
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![limit, query.offset], Self::row_to_species)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| StoreError::Database(e.to_string()))?);
        }
        Ok(results)
    }

    fn count(&self) -> Result<u64, StoreError> {
        let conn = self.conn()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM species_cache", [], |row| row.get(0))
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(count as u64)
    }

    fn exists(&self, pokedex_id: u32) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM species_cache WHERE pokedex_id = ?)",
                params![pokedex_id],
                |row| row.get(0),
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(exists)
    }

    fn remove(&self, pokedex_id: u32) -> Result<(), StoreError> {
        let conn = self.conn()?;
        let deleted = conn
            .execute(
                "DELETE FROM species_cache WHERE pokedex_id = ?",
                params![pokedex_id],
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        if deleted == 0 {
            return Err(StoreError::NotFound(pokedex_id));
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM species_cache", [])
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }

    fn stats(&self) -> Result<CacheStats, StoreError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT COUNT(*), MIN(pokedex_id), MAX(pokedex_id), MIN(last_updated), MAX(last_updated)
             FROM species_cache",
            [],
            |row| {
                let total: i64 = row.get(0)?;
                let oldest: Option<String> = row.get(3)?;
                let newest: Option<String> = row.get(4)?;
                Ok(CacheStats {
                    total_species: total as u64,
                    lowest_id: row.get(1)?,
                    highest_id: row.get(2)?,
                    oldest_update: oldest.map(|s| parse_timestamp(3, &s)).transpose()?,
                    newest_update: newest.map(|s| parse_timestamp(4, &s)).transpose()?,
                })
            },
        )
        .map_err(|e| StoreError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn species(id: u32, name: &str, types: &[&str]) -> CachedSpecies {
        CachedSpecies {
            pokedex_id: id,
            canonical_name: name.to_string(),
            localized_name: None,
            types: types.iter().map(|t| t.to_string()).collect(),
            base_stats: BaseStats {
                hp: 45,
                attack: 49,
                defense: 49,
                special_attack: 65,
                special_defense: 65,
                speed: 45,
            },
            sprite_url: Some(format!("https://example.test/{}.png", id)),
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn test_upsert_and_get() {
        let store = SqliteSpeciesStore::in_memory().unwrap();
        let mut bulbasaur = species(1, "bulbasaur", &["grass", "poison"]);
        bulbasaur.localized_name = Some("Bisasam".to_string());

        store.upsert(&bulbasaur).unwrap();

        let loaded = store.get(1).unwrap().unwrap();
        assert_eq!(loaded.canonical_name, "bulbasaur");
        assert_eq!(loaded.localized_name.as_deref(), Some("Bisasam"));
        assert_eq!(loaded.types, vec!["grass", "poison"]);
        assert_eq!(loaded.base_stats, bulbasaur.base_stats);
        assert_eq!(loaded.sprite_url, bulbasaur.sprite_url);
    }

    #[test]
    fn test_get_missing_returns_none() {
        let store = SqliteSpeciesStore::in_memory().unwrap();
        assert!(store.get(151).unwrap().is_none());
        assert!(!store.exists(151).unwrap());
    }

    #[test]
    fn test_upsert_overwrites_existing() {
        let store = SqliteSpeciesStore::in_memory().unwrap();
        let first = species(25, "pikachu", &["electric"]);
        store.upsert(&first).unwrap();

        let mut second = species(25, "pikachu", &["electric"]);
        second.localized_name = Some("Pikachu".to_string());
        second.base_stats.speed = 90;
        second.sprite_url = None;
        second.last_updated = first.last_updated + Duration::seconds(60);
        store.upsert(&second).unwrap();

        assert_eq!(store.count().unwrap(), 1);
        let loaded = store.get(25).unwrap().unwrap();
        assert_eq!(loaded.base_stats.speed, 90);
        assert_eq!(loaded.localized_name.as_deref(), Some("Pikachu"));
        assert!(loaded.sprite_url.is_none());
        assert!(loaded.last_updated > first.last_updated);
    }

    #[test]
    fn test_upsert_rejects_invalid_type_list() {
        let store = SqliteSpeciesStore::in_memory().unwrap();
        let invalid = species(3, "venusaur", &[]);
        let result = store.upsert(&invalid);
        assert!(matches!(result, Err(StoreError::InvalidRecord(_))));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_list_is_ordered_by_id() {
        let store = SqliteSpeciesStore::in_memory().unwrap();
        store.upsert(&species(7, "squirtle", &["water"])).unwrap();
        store.upsert(&species(1, "bulbasaur", &["grass", "poison"])).unwrap();
        store.upsert(&species(4, "charmander", &["fire"])).unwrap();

        let all = store.list(&SpeciesQuery::default()).unwrap();
        let ids: Vec<u32> = all.iter().map(|s| s.pokedex_id).collect();
        assert_eq!(ids, vec![1, 4, 7]);
    }

    #[test]
    fn test_list_with_offset_and_limit() {
        let store = SqliteSpeciesStore::in_memory().unwrap();
        for id in 1..=10 {
            store.upsert(&species(id, "mon", &["normal"])).unwrap();
        }

        let page = store
            .list(&SpeciesQuery {
                offset: 3,
                limit: Some(4),
            })
            .unwrap();
        let ids: Vec<u32> = page.iter().map(|s| s.pokedex_id).collect();
        assert_eq!(ids, vec![4, 5, 6, 7]);
    }

    #[test]
    fn test_remove() {
        let store = SqliteSpeciesStore::in_memory().unwrap();
        store.upsert(&species(1, "bulbasaur", &["grass"])).unwrap();

        store.remove(1).unwrap();
        assert!(store.get(1).unwrap().is_none());

        let result = store.remove(1);
        assert!(matches!(result, Err(StoreError::NotFound(1))));
    }

    #[test]
    fn test_clear() {
        let store = SqliteSpeciesStore::in_memory().unwrap();
        store.upsert(&species(1, "bulbasaur", &["grass"])).unwrap();
        store.upsert(&species(2, "ivysaur", &["grass"])).unwrap();

        store.clear().unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_stats() {
        let store = SqliteSpeciesStore::in_memory().unwrap();

        let empty = store.stats().unwrap();
        assert_eq!(empty.total_species, 0);
        assert!(empty.lowest_id.is_none());
        assert!(empty.newest_update.is_none());

        let mut early = species(10, "caterpie", &["bug"]);
        early.last_updated = Utc::now() - Duration::hours(2);
        let late = species(3, "venusaur", &["grass", "poison"]);
        store.upsert(&early).unwrap();
        store.upsert(&late).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_species, 2);
        assert_eq!(stats.lowest_id, Some(3));
        assert_eq!(stats.highest_id, Some(10));
        assert!(stats.oldest_update.unwrap() < stats.newest_update.unwrap());
    }

    #[test]
    fn test_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("species.db");

        {
            let store = SqliteSpeciesStore::new(&db_path).unwrap();
            store.upsert(&species(133, "eevee", &["normal"])).unwrap();
        }

        let store = SqliteSpeciesStore::new(&db_path).unwrap();
        let eevee = store.get(133).unwrap().unwrap();
        assert_eq!(eevee.canonical_name, "eevee");
    }
}
