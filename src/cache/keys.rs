//! Cache key derivation
//!
//! Each key names one logical origin fetch. The formats are shared with other
//! consumers of the same cache table and must not change.

/// Key for a registry character, e.g. `swapi-people-1`
pub fn character(id: &str) -> String {
    format!("swapi-people-{}", id)
}

/// Key for a planet, using the full URL it is fetched from
pub fn planet(url: &str) -> String {
    format!("swapi-planet-{}", url)
}

/// Key for the forecast of a named planet, e.g. `weather-Tatooine`
pub fn weather(planet_name: &str) -> String {
    format!("weather-{}", planet_name)
}
