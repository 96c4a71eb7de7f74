use std::sync::Arc;
use std::time::Duration;

use crate::client::{TrackingResult, TrackingService};
use crate::location::LocationStore;
use crate::projection::{
    antenna_advice, compass_sector, elevation_band, polarization_for, pole_transform, sky_position,
    AntennaAdvice, CompassSector, ElevationBand, Polarization, PoleTransform, ScreenPoint,
};
use crate::scheduler::{FetchFn, Scheduler, ViewData};

/// Fixed quick-pick targets offered by the antenna view.
pub const QUICK_PICKS: &[(&str, &str)] = &[
    ("NOAA 19", "137.100 MHz"),
    ("ISS (ZARYA)", "145.800 MHz"),
    ("NOAA 18", "137.9125 MHz"),
    ("METEOR M2", "137.100 MHz"),
    ("SAUDISAT 1C", "145.850 MHz"),
];

pub const DEFAULT_TARGET: &str = "NOAA 19";

/// Everything the antenna panel renders, derived synchronously from one
/// tracking result.
#[derive(Debug, Clone)]
pub struct AntennaReadout {
    pub satellite_name: String,
    pub sector: CompassSector,
    pub band: ElevationBand,
    pub pole: PoleTransform,
    pub polarization: Polarization,
    pub advice: AntennaAdvice,
    pub sky_point: ScreenPoint,
    pub direction_text: String,
    pub antenna_type: String,
    pub difficulty: String,
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
}

impl AntennaReadout {
    pub fn from_result(result: &TrackingResult) -> Self {
        let az = result.position.azimuth_deg;
        let el = result.position.elevation_deg;
        AntennaReadout {
            satellite_name: result.satellite_name.clone(),
            sector: compass_sector(az),
            band: elevation_band(el),
            pole: pole_transform(az, el),
            polarization: polarization_for(az),
            advice: antenna_advice(el),
            sky_point: sky_position(az, el),
            direction_text: result.antenna.direction_text.clone(),
            antenna_type: result.antenna.antenna_type.clone(),
            difficulty: result.antenna.difficulty_level.clone(),
            azimuth_deg: az,
            elevation_deg: el,
        }
    }
}

/// Single-satellite tracking view: one scheduler keyed by the current
/// (location, target) pair, restarted whenever either changes.
pub struct AntennaView {
    service: Arc<dyn TrackingService>,
    location: LocationStore,
    scheduler: Scheduler<TrackingResult>,
    target: String,
}

impl AntennaView {
    pub fn new(service: Arc<dyn TrackingService>, location: LocationStore, period: Duration) -> Self {
        AntennaView {
            service,
            location,
            scheduler: Scheduler::new("antenna", period),
            target: DEFAULT_TARGET.to_string(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    fn fetch_fn(&self) -> FetchFn<TrackingResult> {
        let service = self.service.clone();
        let location = self.location.current();
        let target = self.target.clone();
        Arc::new(move || service.track(&target, &location))
    }

    /// Starts (or restarts) the 30-second refresh cycle against the current
    /// location and target.
    pub async fn activate(&mut self) {
        let fetch = self.fetch_fn();
        self.scheduler.start(fetch).await;
    }

    /// Changes the tracked satellite. Restarts the refresh cycle only when
    /// one is already running.
    pub async fn set_target(&mut self, name: &str) {
        if name == self.target {
            return;
        }
        self.target = name.to_string();
        if self.scheduler.is_active() {
            self.activate().await;
        }
    }

    /// Called when the shared observer location was replaced.
    pub async fn location_changed(&mut self) {
        self.activate().await;
    }

    pub fn refresh(&self) {
        self.scheduler.refresh_now();
    }

    pub async fn deactivate(&mut self) {
        self.scheduler.stop().await;
    }

    pub fn snapshot(&self) -> ViewData<TrackingResult> {
        self.scheduler.snapshot()
    }

    pub fn readout(&self) -> Option<AntennaReadout> {
        self.snapshot()
            .value
            .as_ref()
            .map(AntennaReadout::from_result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::Freshness;
    use crate::views::testutil::{tracking_result, wait_until, StubService};

    #[test]
    fn readout_derives_all_projections() {
        let result = tracking_result("NOAA 19", 90.0, 45.0);
        let readout = AntennaReadout::from_result(&result);
        assert_eq!(readout.sector, CompassSector::East);
        assert_eq!(readout.band, ElevationBand::Medium);
        assert_eq!(readout.pole.pole_deg, -90.0);
        assert_eq!(readout.pole.indicator_deg, 45.0);
        assert_eq!(readout.polarization, Polarization::Horizontal);
    }

    #[tokio::test(start_paused = true)]
    async fn tracks_noaa_19_end_to_end() {
        let service = Arc::new(StubService::tracking(|name, _loc| {
            Ok(tracking_result(name, 90.0, 45.0))
        }));
        let location = LocationStore::new();
        assert!((location.current().latitude - 33.3128).abs() < 1e-9);
        assert!((location.current().longitude - 44.3615).abs() < 1e-9);

        let mut view = AntennaView::new(service, location, Duration::from_secs(30));
        view.activate().await;

        wait_until(|| view.snapshot().freshness == Freshness::Fresh).await;
        let readout = view.readout().unwrap();
        assert_eq!(readout.satellite_name, "NOAA 19");
        assert_eq!(readout.sector.abbreviation(), "E");
        assert_eq!(readout.band.label(), "medium");
        assert_eq!(readout.pole.pole_deg, -90.0);
        view.deactivate().await;
    }

    #[tokio::test(start_paused = true)]
    async fn changing_target_restarts_the_cycle() {
        let service = Arc::new(StubService::tracking(|name, _loc| {
            Ok(tracking_result(name, 10.0, 5.0))
        }));
        let mut view = AntennaView::new(service, LocationStore::new(), Duration::from_secs(30));
        view.activate().await;
        wait_until(|| view.snapshot().value.is_some()).await;

        view.set_target("METEOR M2").await;
        wait_until(|| {
            view.snapshot()
                .value
                .map(|r| r.satellite_name == "METEOR M2")
                .unwrap_or(false)
        })
        .await;
        view.deactivate().await;
    }
}
