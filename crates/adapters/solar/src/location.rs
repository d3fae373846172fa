//! Location configuration.

use serde::Deserialize;

use crate::places;

/// Where the installation is.
///
/// Explicit coordinates win over the place name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Location {
    /// Place name looked up in the built-in table, e.g. `"Toronto"`.
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            name: "Toronto".to_string(),
            latitude: None,
            longitude: None,
        }
    }
}

impl Location {
    /// Latitude and longitude in degrees, if known.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => places::lookup(&self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_resolve_known_place_name() {
        let location = Location {
            name: "london".to_string(),
            ..Location::default()
        };
        let (lat, lon) = location.coordinates().unwrap();
        assert!((lat - 51.507).abs() < 0.01);
        assert!((lon + 0.128).abs() < 0.01);
    }

    #[test]
    fn should_prefer_explicit_coordinates() {
        let location: Location = toml::from_str(
            r#"
            name = "Nowhere"
            latitude = 45.5
            longitude = -73.6
        "#,
        )
        .unwrap();
        assert_eq!(location.coordinates(), Some((45.5, -73.6)));
    }

    #[test]
    fn should_not_resolve_unknown_place() {
        let location = Location {
            name: "Atlantis".to_string(),
            ..Location::default()
        };
        assert_eq!(location.coordinates(), None);
    }
}
