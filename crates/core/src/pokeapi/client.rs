//! PokeAPI HTTP client.
//!
//! PokeAPI is free and unauthenticated but asks consumers to cache locally
//! and keep request rates low. Pacing between requests is the caller's job
//! (see the range sync); this client issues exactly one request per call.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::types::{PokemonRecord, SpeciesRecord};
use super::{FetchError, SpeciesSource};
use crate::config::PokeApiConfig;
use crate::metrics::{UPSTREAM_REQUESTS, UPSTREAM_REQUEST_DURATION};

/// PokeAPI client.
pub struct PokeApiClient {
    client: Client,
    base_url: String,
}

impl PokeApiClient {
    /// Create a new PokeAPI client.
    pub fn new(config: &PokeApiConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `{base_url}/{endpoint}/{id}` and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        pokedex_id: u32,
    ) -> Result<T, FetchError> {
        let url = format!("{}/{}/{}", self.base_url, endpoint, pokedex_id);
        debug!("PokeAPI request: {}", url);

        let started = Instant::now();
        let result = self.send(&url, pokedex_id).await;

        UPSTREAM_REQUEST_DURATION
            .with_label_values(&[endpoint])
            .observe(started.elapsed().as_secs_f64());
        let status_label = match &result {
            Ok(_) => "success",
            Err(FetchError::NotFound(_)) => "not_found",
            Err(_) => "error",
        };
        UPSTREAM_REQUESTS
            .with_label_values(&[endpoint, status_label])
            .inc();

        let response = result?;
        response.json::<T>().await.map_err(|e| {
            FetchError::ParseError(format!(
                "Failed to parse {} response for {}: {}",
                endpoint, pokedex_id, e
            ))
        })
    }

    async fn send(&self, url: &str, pokedex_id: u32) -> Result<reqwest::Response, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(pokedex_id));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("PokeAPI rate limit exceeded");
            return Err(FetchError::RateLimitExceeded);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl SpeciesSource for PokeApiClient {
    async fn fetch_pokemon(&self, pokedex_id: u32) -> Result<PokemonRecord, FetchError> {
        self.get_json("pokemon", pokedex_id).await
    }

    async fn fetch_species(&self, pokedex_id: u32) -> Result<SpeciesRecord, FetchError> {
        self.get_json("pokemon-species", pokedex_id).await
    }
}
