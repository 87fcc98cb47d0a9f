//! Upstream species source (PokeAPI).
//!
//! The cache talks to the upstream exclusively through [`SpeciesSource`],
//! so tests can swap the HTTP client for a mock.

mod client;
mod types;

pub use client::PokeApiClient;
pub use types::*;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when fetching from the upstream source.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The upstream has no record for this Pokédex ID (HTTP 404).
    #[error("No upstream record for Pokédex ID {0}")]
    NotFound(u32),

    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Upstream asked us to slow down (HTTP 429).
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimitExceeded,

    /// API returned an unexpected status.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Response could not be parsed or is malformed.
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// The two error kinds the rest of the system distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    /// No such ID upstream; expected, drives the range-scan stop heuristic.
    NotFound,
    /// Everything else.
    Transient,
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::NotFound(_) => FetchErrorKind::NotFound,
            _ => FetchErrorKind::Transient,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == FetchErrorKind::NotFound
    }
}

/// Read-only access to upstream species data keyed by Pokédex ID.
#[async_trait]
pub trait SpeciesSource: Send + Sync {
    /// Fetch the core record (name, types, base stats, sprites).
    async fn fetch_pokemon(&self, pokedex_id: u32) -> Result<PokemonRecord, FetchError>;

    /// Fetch localization metadata (display names per language).
    async fn fetch_species(&self, pokedex_id: u32) -> Result<SpeciesRecord, FetchError>;
}
