mod error;
mod http;
mod types;

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

pub use error::{ClientError, ClientResult};
pub use http::HttpService;
pub use types::{
    AntennaGuidance, CatalogQuery, DeveloperInfo, Importance, PassEvent, PassPrediction,
    RegionInfo, RemoteCity, SatelliteSummary, SatelliteType, SkyPosition, StationEntry,
    TrackingResult,
};

use crate::location::ObserverLocation;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Seam to the remote position/prediction service. Everything a view fetches
/// goes through this trait, so tests can substitute a scripted stub for the
/// HTTP implementation.
pub trait TrackingService: Send + Sync {
    fn list_satellites(&self, query: &CatalogQuery) -> BoxFuture<ClientResult<Vec<SatelliteSummary>>>;

    fn track(
        &self,
        satellite: &str,
        location: &ObserverLocation,
    ) -> BoxFuture<ClientResult<TrackingResult>>;

    fn predict(
        &self,
        location: &ObserverLocation,
        satellites: &[String],
        days: u32,
    ) -> BoxFuture<ClientResult<Vec<PassPrediction>>>;

    fn region_info(&self) -> BoxFuture<ClientResult<RegionInfo>>;

    fn city_directory(&self) -> BoxFuture<ClientResult<BTreeMap<String, RemoteCity>>>;

    fn station_directory(&self) -> BoxFuture<ClientResult<Vec<StationEntry>>>;

    fn developer_info(&self) -> BoxFuture<ClientResult<DeveloperInfo>>;
}
