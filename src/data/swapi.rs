//! Star Wars API (swapi.tech) client
//!
//! Fetches characters by id and planets by URL, unwrapping the registry's
//! `result.properties` envelope into flat `Character` and `Planet` records.

use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

use super::{fetch_json, Character, OriginError, Planet};

/// Base URL for the registry API
const SWAPI_BASE_URL: &str = "https://www.swapi.tech/api";

/// Client for fetching characters and planets from the registry
#[derive(Debug, Clone)]
pub struct SwapiClient {
    client: Client,
    base_url: String,
}

impl Default for SwapiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SwapiClient {
    /// Create a new SwapiClient with default settings
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Create a new SwapiClient with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            base_url: SWAPI_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different registry
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Fetch a character by id
    ///
    /// # Returns
    /// * `Ok(Character)` - The normalized character
    /// * `Err(OriginError)` - Non-2xx status, transport failure or malformed body
    pub async fn fetch_character(&self, id: &str) -> Result<Character, OriginError> {
        let url = format!("{}/people/{}", self.base_url, id);
        info!(%url, "fetching character from origin");

        let envelope: Envelope<CharacterProperties> = fetch_json(self.client.get(&url)).await?;
        Ok(envelope.result.into_character(id))
    }

    /// Fetch a planet from its absolute registry URL
    ///
    /// # Returns
    /// * `Ok(Planet)` - The normalized planet, identified by `url`
    /// * `Err(OriginError)` - Non-2xx status, transport failure or malformed body
    pub async fn fetch_planet(&self, url: &str) -> Result<Planet, OriginError> {
        info!(%url, "fetching planet from origin");

        let envelope: Envelope<PlanetProperties> = fetch_json(self.client.get(url)).await?;
        Ok(envelope.result.into_planet(url))
    }
}

/// Registry response wrapper
#[derive(Debug, Deserialize)]
struct Envelope<P> {
    result: ApiResult<P>,
}

/// The `result` object of a registry response
#[derive(Debug, Deserialize)]
struct ApiResult<P> {
    uid: Option<String>,
    #[serde(default)]
    description: String,
    properties: P,
}

/// Character properties as the registry sends them
#[derive(Debug, Deserialize)]
struct CharacterProperties {
    name: String,
    #[serde(default)]
    homeworld: String,
    #[serde(default)]
    url: String,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

/// Planet properties as the registry sends them
#[derive(Debug, Deserialize)]
struct PlanetProperties {
    name: String,
    #[serde(default)]
    climate: String,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl ApiResult<CharacterProperties> {
    fn into_character(self, requested_id: &str) -> Character {
        let props = self.properties;
        Character {
            id: self.uid.unwrap_or_else(|| requested_id.to_string()),
            name: props.name,
            homeworld: props.homeworld,
            url: props.url,
            description: self.description,
            attributes: props.rest,
        }
    }
}

impl ApiResult<PlanetProperties> {
    fn into_planet(self, url: &str) -> Planet {
        let mut attributes = self.properties.rest;
        // The fetch URL is the identity; the registry's copy would only duplicate it
        attributes.remove("url");

        Planet {
            url: url.to_string(),
            name: self.properties.name,
            climate: self.properties.climate,
            description: self.description,
            attributes,
        }
    }
}
