use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Satellite category as reported by the catalog endpoint. Unknown wire
/// values degrade to `Other` rather than failing the whole response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SatelliteType {
    Weather,
    Communications,
    Research,
    #[serde(other)]
    Other,
}

impl SatelliteType {
    pub fn label(&self) -> &'static str {
        match self {
            SatelliteType::Weather => "weather",
            SatelliteType::Communications => "communications",
            SatelliteType::Research => "research",
            SatelliteType::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Importance {
    High,
    VeryHigh,
    #[serde(other)]
    Low,
}

impl Importance {
    pub fn label(&self) -> &'static str {
        match self {
            Importance::High => "high",
            Importance::VeryHigh => "very high",
            Importance::Low => "low",
        }
    }
}

/// Immutable catalog snapshot for one satellite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SatelliteSummary {
    pub name: String,
    #[serde(rename = "frequency")]
    pub frequency_text: String,
    #[serde(rename = "type")]
    pub sat_type: SatelliteType,
    #[serde(deserialize_with = "deserialize_norad_id")]
    pub norad_id: u32,
    pub importance: Importance,
    #[serde(rename = "iraq_relevant", default)]
    pub locally_relevant: bool,
}

/// Where the satellite currently sits in the observer's sky.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyPosition {
    #[serde(rename = "azimuth")]
    pub azimuth_deg: f64,
    #[serde(rename = "altitude")]
    pub elevation_deg: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AntennaGuidance {
    pub direction_text: String,
    pub elevation_degrees: f64,
    pub antenna_type: String,
    pub polarization: String,
    #[serde(rename = "difficulty")]
    pub difficulty_level: String,
}

/// Result of one tracking request. Fully replaces any prior result for the
/// same target; there are no merge semantics.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingResult {
    pub satellite_name: String,
    pub position: SkyPosition,
    pub antenna: AntennaGuidance,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PassEventWire")]
pub struct PassEvent {
    pub time: DateTime<Utc>,
}

/// Raw pass entry as the service emits it: `time` is Baghdad local time in
/// plain `YYYY-MM-DD HH:MM:SS` form, `utc_time` is the same instant as ISO
/// UTC. The UTC field is authoritative; the local one is the fallback.
#[derive(Deserialize)]
struct PassEventWire {
    #[serde(default)]
    utc_time: Option<String>,
    #[serde(default)]
    time: Option<String>,
}

const BAGHDAD_UTC_OFFSET_SECS: i32 = 3 * 3600;

impl TryFrom<PassEventWire> for PassEvent {
    type Error = String;

    fn try_from(wire: PassEventWire) -> Result<Self, Self::Error> {
        if let Some(utc) = &wire.utc_time {
            if let Ok(dt) = DateTime::parse_from_rfc3339(utc) {
                return Ok(PassEvent {
                    time: dt.with_timezone(&Utc),
                });
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(utc, "%Y-%m-%dT%H:%M:%S%.f") {
                return Ok(PassEvent {
                    time: naive.and_utc(),
                });
            }
        }
        let local = wire.time.as_deref().ok_or("pass entry carries no time")?;
        let naive = NaiveDateTime::parse_from_str(local, "%Y-%m-%d %H:%M:%S")
            .map_err(|e| format!("bad pass time '{}': {}", local, e))?;
        let offset = FixedOffset::east_opt(BAGHDAD_UTC_OFFSET_SECS)
            .ok_or("invalid Baghdad offset")?;
        let time = offset
            .from_local_datetime(&naive)
            .single()
            .ok_or_else(|| format!("ambiguous pass time '{}'", local))?
            .with_timezone(&Utc);
        Ok(PassEvent { time })
    }
}

/// Upcoming passes for one satellite, soonest first. A fresh fetch replaces
/// the whole sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassPrediction {
    #[serde(rename = "satellite")]
    pub satellite_name: String,
    #[serde(rename = "frequency")]
    pub frequency_text: String,
    pub passes: Vec<PassEvent>,
}

/// Catalog query narrowing, mapped onto the `iraq` and `type` query params.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub local_only: bool,
    pub group: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionInfo {
    pub system_name: String,
    pub country: String,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationEntry {
    pub name: String,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub equipment: Option<String>,
    #[serde(default)]
    pub operator: Option<String>,
}

/// One selectable observer city as the location endpoint reports it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteCity {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
    #[serde(rename = "city")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeveloperInfo {
    pub name: String,
    pub year: String,
    #[serde(default)]
    pub university: Option<String>,
}

/// The catalog's `norad_id` is sliced out of the TLE as text; accept both
/// that and a plain number.
fn deserialize_norad_id<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NoradId {
        Number(u32),
        Text(String),
    }
    match NoradId::deserialize(deserializer)? {
        NoradId::Number(n) => Ok(n),
        NoradId::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
