//! Static coordinates for planets that have weather
//!
//! Open-Meteo only knows Earth, so each supported planet is pinned to a fixed
//! terrestrial location. Planets missing from this table have no forecast.

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A planet name and the location its forecast is taken from
#[derive(Debug, Clone, Copy)]
pub struct PlanetLocation {
    /// Planet name exactly as the registry spells it
    pub name: &'static str,
    pub coordinates: Coordinates,
}

/// Static array of every planet with a forecast location
pub static PLANET_LOCATIONS: [PlanetLocation; 5] = [
    PlanetLocation {
        name: "Tatooine",
        coordinates: Coordinates {
            latitude: 30.0,
            longitude: 10.0,
        },
    },
    PlanetLocation {
        name: "Alderaan",
        coordinates: Coordinates {
            latitude: 45.0,
            longitude: -120.0,
        },
    },
    PlanetLocation {
        name: "Hoth",
        coordinates: Coordinates {
            latitude: 75.0,
            longitude: -100.0,
        },
    },
    PlanetLocation {
        name: "Naboo",
        coordinates: Coordinates {
            latitude: -10.0,
            longitude: 120.0,
        },
    },
    PlanetLocation {
        name: "Endor",
        coordinates: Coordinates {
            latitude: 50.0,
            longitude: -80.0,
        },
    },
];

/// Get the forecast location for a planet
///
/// Matching is exact and case-sensitive, like the cache keys built from the name.
///
/// # Returns
///
/// Returns `Some(Coordinates)` if the planet has a location, `None` otherwise
pub fn coordinates_for(planet_name: &str) -> Option<Coordinates> {
    PLANET_LOCATIONS
        .iter()
        .find(|location| location.name == planet_name)
        .map(|location| location.coordinates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_planets_have_coordinates() {
        assert_eq!(
            coordinates_for("Tatooine"),
            Some(Coordinates {
                latitude: 30.0,
                longitude: 10.0
            })
        );
        assert_eq!(
            coordinates_for("Naboo"),
            Some(Coordinates {
                latitude: -10.0,
                longitude: 120.0
            })
        );
        for name in ["Alderaan", "Hoth", "Endor"] {
            assert!(coordinates_for(name).is_some(), "{} should have coordinates", name);
        }
    }

    #[test]
    fn test_unknown_planet_has_no_coordinates() {
        assert!(coordinates_for("Coruscant").is_none());
        assert!(coordinates_for("").is_none());
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert!(coordinates_for("tatooine").is_none());
    }

    #[test]
    fn test_planet_names_are_unique() {
        for (i, a) in PLANET_LOCATIONS.iter().enumerate() {
            for b in PLANET_LOCATIONS.iter().skip(i + 1) {
                assert_ne!(a.name, b.name);
            }
        }
    }
}
