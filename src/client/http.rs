use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::{ClientError, ClientResult};
use super::types::{
    AntennaGuidance, CatalogQuery, DeveloperInfo, PassPrediction, RegionInfo, RemoteCity,
    SatelliteSummary, SkyPosition, StationEntry, TrackingResult,
};
use super::{BoxFuture, TrackingService};
use crate::location::ObserverLocation;

/// reqwest-backed implementation of [`TrackingService`]. Every endpoint
/// carries a `success` discriminator; anything but `success: true` is treated
/// as a failed call.
pub struct HttpService {
    http: reqwest::Client,
    base_url: String,
}

impl HttpService {
    pub fn new(base_url: &str, request_timeout: Duration) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(HttpService {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[derive(Serialize)]
struct TrackRequest<'a> {
    satellite_name: &'a str,
    latitude: f64,
    longitude: f64,
    city: &'a str,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    latitude: f64,
    longitude: f64,
    satellites: &'a [String],
    days: u32,
}

#[derive(Deserialize)]
struct SatellitesEnvelope {
    success: bool,
    #[serde(default)]
    satellites: Vec<SatelliteSummary>,
}

/// The track response nests the satellite's catalog entry alongside the
/// position; only the name matters here.
#[derive(Deserialize)]
struct TrackSatellite {
    name: String,
}

#[derive(Deserialize)]
struct TrackEnvelope {
    success: bool,
    satellite: Option<TrackSatellite>,
    position: Option<SkyPosition>,
    antenna: Option<AntennaGuidance>,
}

#[derive(Deserialize)]
struct PredictEnvelope {
    success: bool,
    #[serde(default)]
    predictions: Vec<PassPrediction>,
}

#[derive(Deserialize)]
struct RegionEnvelope {
    success: bool,
    #[serde(flatten)]
    info: RegionInfo,
}

#[derive(Deserialize)]
struct CitiesEnvelope {
    success: bool,
    #[serde(default)]
    available_cities: BTreeMap<String, RemoteCity>,
}

#[derive(Deserialize)]
struct StationsEnvelope {
    success: bool,
    #[serde(default)]
    stations: Vec<StationEntry>,
}

#[derive(Deserialize)]
struct DeveloperEnvelope {
    success: bool,
    developer: Option<DeveloperInfo>,
}

impl TrackingService for HttpService {
    fn list_satellites(
        &self,
        query: &CatalogQuery,
    ) -> BoxFuture<ClientResult<Vec<SatelliteSummary>>> {
        let mut req = self.http.get(self.url("/api/satellites"));
        if query.local_only {
            req = req.query(&[("iraq", "true")]);
        }
        if let Some(group) = &query.group {
            req = req.query(&[("type", group.as_str())]);
        }
        Box::pin(async move {
            let envelope: SatellitesEnvelope = req.send().await?.json().await?;
            if !envelope.success {
                return Err(ClientError::Service("/api/satellites"));
            }
            Ok(envelope.satellites)
        })
    }

    fn track(
        &self,
        satellite: &str,
        location: &ObserverLocation,
    ) -> BoxFuture<ClientResult<TrackingResult>> {
        let req = self.http.post(self.url("/api/track")).json(&TrackRequest {
            satellite_name: satellite,
            latitude: location.latitude,
            longitude: location.longitude,
            city: &location.city,
        });
        let requested = satellite.to_string();
        Box::pin(async move {
            let envelope: TrackEnvelope = req.send().await?.json().await?;
            if !envelope.success {
                return Err(ClientError::Service("/api/track"));
            }
            let position = envelope.position.ok_or_else(|| ClientError::Decode {
                endpoint: "/api/track",
                message: "missing position".into(),
            })?;
            let antenna = envelope.antenna.ok_or_else(|| ClientError::Decode {
                endpoint: "/api/track",
                message: "missing antenna guidance".into(),
            })?;
            Ok(TrackingResult {
                satellite_name: envelope.satellite.map(|s| s.name).unwrap_or(requested),
                position,
                antenna,
            })
        })
    }

    fn predict(
        &self,
        location: &ObserverLocation,
        satellites: &[String],
        days: u32,
    ) -> BoxFuture<ClientResult<Vec<PassPrediction>>> {
        let req = self
            .http
            .post(self.url("/api/predict"))
            .json(&PredictRequest {
                latitude: location.latitude,
                longitude: location.longitude,
                satellites,
                days,
            });
        Box::pin(async move {
            let envelope: PredictEnvelope = req.send().await?.json().await?;
            if !envelope.success {
                return Err(ClientError::Service("/api/predict"));
            }
            Ok(envelope.predictions)
        })
    }

    fn region_info(&self) -> BoxFuture<ClientResult<RegionInfo>> {
        let req = self.http.get(self.url("/api/iraq/info"));
        Box::pin(async move {
            let envelope: RegionEnvelope = req.send().await?.json().await?;
            if !envelope.success {
                return Err(ClientError::Service("/api/iraq/info"));
            }
            Ok(envelope.info)
        })
    }

    fn city_directory(&self) -> BoxFuture<ClientResult<BTreeMap<String, RemoteCity>>> {
        // The endpoint returns a single `location` for a known city id and
        // only lists `available_cities` when asked for one it does not know.
        let req = self
            .http
            .get(self.url("/api/location/iraq"))
            .query(&[("city", "all")]);
        Box::pin(async move {
            let envelope: CitiesEnvelope = req.send().await?.json().await?;
            if !envelope.success {
                return Err(ClientError::Service("/api/location/iraq"));
            }
            Ok(envelope.available_cities)
        })
    }

    fn station_directory(&self) -> BoxFuture<ClientResult<Vec<StationEntry>>> {
        let req = self.http.get(self.url("/api/database/stations"));
        Box::pin(async move {
            let envelope: StationsEnvelope = req.send().await?.json().await?;
            if !envelope.success {
                return Err(ClientError::Service("/api/database/stations"));
            }
            Ok(envelope.stations)
        })
    }

    fn developer_info(&self) -> BoxFuture<ClientResult<DeveloperInfo>> {
        let req = self.http.get(self.url("/api/developer"));
        Box::pin(async move {
            let envelope: DeveloperEnvelope = req.send().await?.json().await?;
            envelope
                .developer
                .filter(|_| envelope.success)
                .ok_or(ClientError::Service("/api/developer"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_envelope_decodes_the_nested_satellite_entry() {
        // Shape the service actually returns: satellite is an object, and
        // extra envelope fields (developer credit, tracking_location) are
        // ignored.
        let json = r#"{
            "success": true,
            "developer": "someone",
            "tracking_location": {"city": "Baghdad", "latitude": 33.3, "longitude": 44.3},
            "position": {"azimuth": 90.0, "altitude": 45.0},
            "antenna": {
                "direction_text": "E",
                "elevation_degrees": 45.0,
                "antenna_type": "Yagi",
                "polarization": "horizontal",
                "difficulty": "Easy"
            },
            "satellite": {"name": "NOAA 19", "frequency": "137.100 MHz", "importance": "very-high"}
        }"#;
        let envelope: TrackEnvelope = serde_json::from_str(json).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.satellite.unwrap().name, "NOAA 19");
        assert_eq!(envelope.position.unwrap().azimuth_deg, 90.0);
        assert_eq!(envelope.antenna.unwrap().direction_text, "E");
    }

    #[test]
    fn cities_envelope_decodes_the_full_list() {
        let json = r#"{
            "success": true,
            "available_cities": {
                "baghdad": {"lat": 33.3128, "lon": 44.3615, "city": "Baghdad"},
                "mosul": {"lat": 36.34, "lon": 43.13, "city": "Mosul"}
            },
            "default": {"lat": 33.3128, "lon": 44.3615, "city": "Baghdad"},
            "developer": "someone"
        }"#;
        let envelope: CitiesEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.available_cities.len(), 2);
        let baghdad = &envelope.available_cities["baghdad"];
        assert_eq!(baghdad.name, "Baghdad");
        assert!((baghdad.latitude - 33.3128).abs() < 1e-9);
    }

    #[test]
    fn failure_envelope_still_decodes() {
        let envelope: TrackEnvelope =
            serde_json::from_str(r#"{"success": false, "error": "no TLE"}"#).unwrap();
        assert!(!envelope.success);
        assert!(envelope.position.is_none());
    }
}
