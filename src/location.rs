use std::sync::{Arc, RwLock};

use serde::Serialize;

/// Observer position used for every tracking and prediction request.
/// Replaced wholesale on city selection, never partially mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObserverLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub country: String,
}

impl ObserverLocation {
    fn from_city(city: &City) -> Self {
        ObserverLocation {
            latitude: city.latitude,
            longitude: city.longitude,
            city: city.name.to_string(),
            country: COUNTRY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct City {
    pub id: &'static str,
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

const COUNTRY: &str = "Iraq";

const CITIES: &[City] = &[
    City {
        id: "baghdad",
        name: "Baghdad",
        latitude: 33.3128,
        longitude: 44.3615,
    },
    City {
        id: "basra",
        name: "Basra",
        latitude: 30.5,
        longitude: 47.8,
    },
    City {
        id: "mosul",
        name: "Mosul",
        latitude: 36.34,
        longitude: 43.13,
    },
    City {
        id: "erbil",
        name: "Erbil",
        latitude: 36.19,
        longitude: 44.01,
    },
    City {
        id: "karbala",
        name: "Karbala",
        latitude: 32.6,
        longitude: 44.02,
    },
    City {
        id: "nasiriyah",
        name: "Nasiriyah",
        latitude: 31.05,
        longitude: 46.25,
    },
];

const DEFAULT_CITY_ID: &str = "baghdad";

/// Shared handle to the single observer location. Cloned into each view's
/// scheduler at construction; views only read, the root's city-selection
/// handler is the sole writer.
#[derive(Clone)]
pub struct LocationStore {
    inner: Arc<RwLock<ObserverLocation>>,
}

impl Default for LocationStore {
    fn default() -> Self {
        let default = CITIES
            .iter()
            .find(|c| c.id == DEFAULT_CITY_ID)
            .unwrap_or(&CITIES[0]);
        LocationStore {
            inner: Arc::new(RwLock::new(ObserverLocation::from_city(default))),
        }
    }
}

impl LocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> ObserverLocation {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Replaces the whole location with the registry entry for `city_id`.
    /// Unknown ids are ignored; returns whether the location changed.
    pub fn set_city(&self, city_id: &str) -> bool {
        match CITIES.iter().find(|c| c.id == city_id) {
            Some(city) => {
                let mut locked = self.inner.write().unwrap_or_else(|e| e.into_inner());
                *locked = ObserverLocation::from_city(city);
                true
            }
            None => {
                log::debug!("Unknown city id ignored: {}", city_id);
                false
            }
        }
    }

    pub fn cities(&self) -> &'static [City] {
        CITIES
    }
}
