use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::client::{
    CatalogQuery, ClientResult, DeveloperInfo, RegionInfo, RemoteCity, SatelliteSummary,
    StationEntry, TrackingResult, TrackingService,
};
use crate::location::LocationStore;
use crate::scheduler::{LoadingGuard, ViewData};

/// The dashboard shows at most this many locally-relevant satellites.
pub const RELEVANT_DISPLAY_LIMIT: usize = 8;

/// Fetch-on-demand binding between the satellite the user picked and the
/// detail panel. Selections carry a sequence number; a response is applied
/// only if no newer selection has been issued since, so rapid re-selection
/// cannot leave an older satellite's data on screen.
#[derive(Clone)]
pub struct SelectionController {
    service: Arc<dyn TrackingService>,
    location: LocationStore,
    shared: Arc<Mutex<ViewData<TrackingResult>>>,
    seq: Arc<AtomicU64>,
}

impl SelectionController {
    pub fn new(service: Arc<dyn TrackingService>, location: LocationStore) -> Self {
        SelectionController {
            service,
            location,
            shared: Arc::new(Mutex::new(ViewData::default())),
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    pub async fn select(&self, satellite_name: &str) {
        let my_seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = LoadingGuard::engage(&self.shared);

        let location = self.location.current();
        let result = self.service.track(satellite_name, &location).await;

        let mut locked = self.shared.lock().unwrap_or_else(|e| e.into_inner());
        if self.seq.load(Ordering::SeqCst) != my_seq {
            // A newer selection is in flight or already applied; discard.
            return;
        }
        match result {
            Ok(detail) => locked.apply_success(detail),
            Err(e) => {
                log::warn!("tracking {} failed: {}", satellite_name, e);
                locked.apply_failure();
            }
        }
    }

    /// Current detail-panel state; replaced wholesale by each applied
    /// selection.
    pub fn detail(&self) -> ViewData<TrackingResult> {
        self.shared
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// Root dashboard: static panels fetched once per location change plus the
/// selection-driven detail panel.
pub struct Dashboard {
    service: Arc<dyn TrackingService>,
    pub selection: SelectionController,
}

impl Dashboard {
    pub fn new(service: Arc<dyn TrackingService>, location: LocationStore) -> Self {
        let selection = SelectionController::new(service.clone(), location);
        Dashboard { service, selection }
    }

    /// Locally-relevant satellites, truncated for display.
    pub async fn relevant_satellites(&self) -> ClientResult<Vec<SatelliteSummary>> {
        let query = CatalogQuery {
            local_only: true,
            group: Some("stations".to_string()),
        };
        let mut satellites = self.service.list_satellites(&query).await?;
        satellites.truncate(RELEVANT_DISPLAY_LIMIT);
        Ok(satellites)
    }

    pub async fn region_overview(&self) -> ClientResult<RegionInfo> {
        self.service.region_info().await
    }

    /// Observer cities the service knows, keyed by city id.
    pub async fn city_directory(&self) -> ClientResult<BTreeMap<String, RemoteCity>> {
        self.service.city_directory().await
    }

    pub async fn station_directory(&self) -> ClientResult<Vec<StationEntry>> {
        self.service.station_directory().await
    }

    pub async fn developer_credit(&self) -> ClientResult<DeveloperInfo> {
        self.service.developer_info().await
    }
}
