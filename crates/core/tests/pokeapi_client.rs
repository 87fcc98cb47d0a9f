//! PokeAPI client integration tests.
//!
//! Runs the real HTTP client against an in-process stub of the two
//! upstream endpoints, then pushes the result through the cache.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{extract::Path, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use tokio::net::TcpListener;

use nuzdex_core::{
    FetchError, PokeApiClient, PokeApiConfig, SpeciesCache, SpeciesSource, SqliteSpeciesStore,
};

async fn pokemon_handler(Path(id): Path<u32>) -> impl IntoResponse {
    match id {
        25 => Json(json!({
            "id": 25,
            "name": "pikachu",
            "height": 4,
            "types": [{ "slot": 1, "type": { "name": "electric", "url": "https://pokeapi.co/api/v2/type/13/" } }],
            "stats": [
                { "base_stat": 35, "effort": 0, "stat": { "name": "hp" } },
                { "base_stat": 55, "effort": 0, "stat": { "name": "attack" } },
                { "base_stat": 40, "effort": 0, "stat": { "name": "defense" } },
                { "base_stat": 50, "effort": 0, "stat": { "name": "special-attack" } },
                { "base_stat": 50, "effort": 0, "stat": { "name": "special-defense" } },
                { "base_stat": 90, "effort": 2, "stat": { "name": "speed" } }
            ],
            "sprites": {
                "front_default": "https://img.example.test/25.png",
                "other": { "official-artwork": { "front_default": "https://img.example.test/art/25.png" } }
            }
        }))
        .into_response(),
        429 => StatusCode::TOO_MANY_REQUESTS.into_response(),
        500 => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        777 => "not json at all".into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn species_handler(Path(id): Path<u32>) -> impl IntoResponse {
    match id {
        25 => Json(json!({
            "id": 25,
            "names": [
                { "language": { "name": "ja" }, "name": "ピカチュウ" },
                { "language": { "name": "de" }, "name": "Pikachu" }
            ]
        }))
        .into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Start the stub and return a client pointed at it.
async fn start_stub() -> PokeApiClient {
    let app = Router::new()
        .route("/api/v2/pokemon/{id}", get(pokemon_handler))
        .route("/api/v2/pokemon-species/{id}", get(species_handler));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub listener");
    let addr: SocketAddr = listener.local_addr().expect("No local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    let config = PokeApiConfig {
        base_url: format!("http://{}/api/v2/", addr),
        timeout_secs: 5,
        ..Default::default()
    };
    PokeApiClient::new(&config).expect("Failed to build client")
}

#[tokio::test]
async fn test_fetch_pokemon_parses_record() {
    let client = start_stub().await;

    let record = client.fetch_pokemon(25).await.unwrap();
    assert_eq!(record.id, 25);
    assert_eq!(record.name, "pikachu");
    assert_eq!(record.types.len(), 1);
    assert_eq!(record.types[0].type_.name, "electric");
    assert_eq!(record.stats.len(), 6);
}

#[tokio::test]
async fn test_fetch_species_parses_names() {
    let client = start_stub().await;

    let species = client.fetch_species(25).await.unwrap();
    assert_eq!(species.name_for("de"), Some("Pikachu"));
    assert_eq!(species.name_for("fr"), None);
}

#[tokio::test]
async fn test_status_mapping() {
    let client = start_stub().await;

    assert!(matches!(
        client.fetch_pokemon(9999).await,
        Err(FetchError::NotFound(9999))
    ));
    assert!(matches!(
        client.fetch_pokemon(429).await,
        Err(FetchError::RateLimitExceeded)
    ));
    match client.fetch_pokemon(500).await {
        Err(FetchError::ApiError { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let client = start_stub().await;

    let err = client.fetch_pokemon(777).await.unwrap_err();
    assert!(matches!(err, FetchError::ParseError(_)));
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn test_cache_through_real_client() {
    let client = Arc::new(start_stub().await);
    let store = Arc::new(SqliteSpeciesStore::in_memory().unwrap());
    let cache = SpeciesCache::new(client, store, "de");

    let species = cache.ensure_cached(25).await.unwrap();
    assert_eq!(species.canonical_name, "pikachu");
    assert_eq!(species.localized_name.as_deref(), Some("Pikachu"));
    assert_eq!(species.types, vec!["electric"]);
    assert_eq!(species.base_stats.speed, 90);
    assert_eq!(
        species.sprite_url.as_deref(),
        Some("https://img.example.test/art/25.png")
    );

    let err = cache.ensure_cached(9999).await.unwrap_err();
    assert!(err.is_not_found());
}
