//! Character → homeworld → weather aggregation
//!
//! Each step goes through `CacheAside` with its own key. The character and
//! planet steps are structural: if either cannot be found or fetched the
//! aggregation fails as not found. The weather step is cosmetic: any failure
//! leaves the weather absent.

use std::fmt;

use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::cache::{keys, CacheAside, StoreError};
use crate::data::{
    Character, Composite, OriginError, Planet, PlanetWithWeather, SwapiClient, WeatherClient,
    WeatherReport,
};
use crate::history::HistoryLog;

/// The structural resources an aggregation depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Character,
    Planet,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Character => f.write_str("character"),
            Resource::Planet => f.write_str("planet"),
        }
    }
}

/// Errors that abort an aggregation
#[derive(Debug, Error)]
pub enum AggregateError {
    /// The resource could not be found or fetched
    #[error("{resource} not found")]
    NotFound {
        resource: Resource,
        /// The origin failure behind it, if a request was made
        #[source]
        source: Option<OriginError>,
    },

    /// The fusion resolved but could not be recorded
    #[error("could not record fusion history")]
    History(#[source] StoreError),
}

impl AggregateError {
    /// A structural failure that never reached the origin
    pub fn not_found(resource: Resource) -> Self {
        AggregateError::NotFound {
            resource,
            source: None,
        }
    }

    fn from_origin(resource: Resource, error: OriginError) -> Self {
        if error.is_not_found() {
            debug!(%resource, error = %error, "origin reported resource missing");
        } else {
            warn!(%resource, error = %error, "origin failed, reporting resource as not found");
        }
        AggregateError::NotFound {
            resource,
            source: Some(error),
        }
    }

    /// The structural resource whose step failed, if any
    pub fn resource(&self) -> Option<Resource> {
        match self {
            AggregateError::NotFound { resource, .. } => Some(*resource),
            AggregateError::History(_) => None,
        }
    }

    /// HTTP status a caller should report: 404 for structural failures, 500 for backend ones
    pub fn status_code(&self) -> u16 {
        match self {
            AggregateError::NotFound { .. } => 404,
            AggregateError::History(_) => 500,
        }
    }
}

/// Builds composites from cached or freshly fetched origin data
#[derive(Clone)]
pub struct Aggregator {
    cache: CacheAside,
    swapi: SwapiClient,
    weather: WeatherClient,
    history: Option<HistoryLog>,
}

impl Aggregator {
    pub fn new(cache: CacheAside, swapi: SwapiClient, weather: WeatherClient) -> Self {
        Self {
            cache,
            swapi,
            weather,
            history: None,
        }
    }

    /// Records every fusion in `history`
    pub fn with_history(mut self, history: HistoryLog) -> Self {
        self.history = Some(history);
        self
    }

    pub fn cache(&self) -> &CacheAside {
        &self.cache
    }

    /// Resolve a character, its homeworld and the homeworld's weather
    ///
    /// # Returns
    /// * `Ok(Composite)` - Weather is `None` when unavailable or failed
    /// * `Err(AggregateError)` - The character or planet could not be resolved
    #[instrument(skip(self))]
    pub async fn aggregate(&self, character_id: &str) -> Result<Composite, AggregateError> {
        let character = self.resolve_character(character_id).await?;
        debug!(name = %character.name, "character resolved");

        let planet = self.resolve_planet(&character.homeworld).await?;
        debug!(planet = %planet.name, "planet resolved");

        let weather = self.resolve_weather(&planet.name).await;

        Ok(Composite {
            character,
            planet: PlanetWithWeather {
                data: planet,
                weather,
            },
        })
    }

    /// Aggregate and record the result in the history, when one is attached
    ///
    /// A composite that cannot be recorded is not returned.
    pub async fn fuse(&self, character_id: &str) -> Result<Composite, AggregateError> {
        let composite = self.aggregate(character_id).await?;

        if let Some(ref history) = self.history {
            history
                .record(&composite)
                .await
                .map_err(AggregateError::History)?;
        }
        Ok(composite)
    }

    async fn resolve_character(&self, id: &str) -> Result<Character, AggregateError> {
        // Such ids would address another registry path, not a character
        if id.trim().is_empty() || id.contains('/') {
            return Err(AggregateError::not_found(Resource::Character));
        }

        self.cache
            .get_or_fetch(&keys::character(id), || self.swapi.fetch_character(id))
            .await
            .map_err(|e| AggregateError::from_origin(Resource::Character, e))
    }

    async fn resolve_planet(&self, url: &str) -> Result<Planet, AggregateError> {
        if url.trim().is_empty() {
            return Err(AggregateError::not_found(Resource::Planet));
        }

        self.cache
            .get_or_fetch(&keys::planet(url), || self.swapi.fetch_planet(url))
            .await
            .map_err(|e| AggregateError::from_origin(Resource::Planet, e))
    }

    async fn resolve_weather(&self, planet_name: &str) -> Option<WeatherReport> {
        let result = self
            .cache
            .get_or_fetch_optional(&keys::weather(planet_name), || {
                self.weather.fetch_weather(planet_name)
            })
            .await;

        match result {
            Ok(Some(report)) => Some(report),
            Ok(None) => {
                debug!(planet = planet_name, "weather unavailable");
                None
            }
            Err(e) => {
                warn!(planet = planet_name, error = %e, "weather fetch failed, continuing without it");
                None
            }
        }
    }
}
