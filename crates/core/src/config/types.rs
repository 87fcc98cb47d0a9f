use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub pokeapi: PokeApiConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("nuzdex.db")
}

/// Upstream PokeAPI client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PokeApiConfig {
    /// Base URL without trailing slash (e.g., "https://pokeapi.co/api/v2")
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// User-Agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Language code used for the localized display name (default: "de")
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for PokeApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
            language: default_language(),
        }
    }
}

fn default_base_url() -> String {
    "https://pokeapi.co/api/v2".to_string()
}

fn default_user_agent() -> String {
    format!("nuzdex/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout() -> u32 {
    30
}

fn default_language() -> String {
    "de".to_string()
}

/// Bulk range sync configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Delay between consecutive upstream attempts in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Consecutive not-found results after which a range scan stops.
    /// Heuristic for having run past the last valid Pokédex ID.
    #[serde(default = "default_not_found_threshold")]
    pub not_found_threshold: u32,
    /// Consecutive transient failures after which a range scan stops.
    /// Disabled when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_consecutive_failures: Option<u32>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            not_found_threshold: default_not_found_threshold(),
            max_consecutive_failures: None,
        }
    }
}

fn default_delay_ms() -> u64 {
    100
}

fn default_not_found_threshold() -> u32 {
    20
}
