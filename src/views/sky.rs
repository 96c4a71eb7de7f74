use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::client::{PassPrediction, TrackingService};
use crate::location::LocationStore;
use crate::projection::{layout_position, ScreenPoint};
use crate::scheduler::{FetchFn, Scheduler, ViewData};

/// The fixed satellite set the sky view asks predictions for.
pub const DEFAULT_TRACKED: &[&str] = &["NOAA 19", "ISS (ZARYA)", "NOAA 18", "METEOR M2"];

pub const PREDICTION_DAYS: u32 = 1;

/// One satellite placed on the dome display. Predictions carry no angles, so
/// placement uses the index layout rather than a true projection.
#[derive(Debug, Clone)]
pub struct DomePlacement {
    pub satellite_name: String,
    pub frequency_text: String,
    pub point: ScreenPoint,
    pub next_pass: Option<DateTime<Utc>>,
}

/// Multi-satellite pass-prediction view refreshed once a minute.
pub struct SkyView {
    service: Arc<dyn TrackingService>,
    location: LocationStore,
    scheduler: Scheduler<Vec<PassPrediction>>,
    tracked: Vec<String>,
}

impl SkyView {
    pub fn new(service: Arc<dyn TrackingService>, location: LocationStore, period: Duration) -> Self {
        SkyView {
            service,
            location,
            scheduler: Scheduler::new("sky", period),
            tracked: DEFAULT_TRACKED.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn tracked(&self) -> &[String] {
        &self.tracked
    }

    fn fetch_fn(&self) -> FetchFn<Vec<PassPrediction>> {
        let service = self.service.clone();
        let location = self.location.current();
        let tracked = self.tracked.clone();
        Arc::new(move || service.predict(&location, &tracked, PREDICTION_DAYS))
    }

    pub async fn activate(&mut self) {
        let fetch = self.fetch_fn();
        self.scheduler.start(fetch).await;
    }

    pub async fn set_tracked(&mut self, names: Vec<String>) {
        if names == self.tracked {
            return;
        }
        self.tracked = names;
        self.activate().await;
    }

    pub async fn location_changed(&mut self) {
        self.activate().await;
    }

    pub fn refresh(&self) {
        self.scheduler.refresh_now();
    }

    pub async fn deactivate(&mut self) {
        self.scheduler.stop().await;
    }

    pub fn snapshot(&self) -> ViewData<Vec<PassPrediction>> {
        self.scheduler.snapshot()
    }

    /// Dome placements for the currently held predictions, in fetch order.
    pub fn placements(&self) -> Vec<DomePlacement> {
        let snapshot = self.snapshot();
        let predictions = snapshot.value.unwrap_or_default();
        predictions
            .iter()
            .enumerate()
            .map(|(index, prediction)| DomePlacement {
                satellite_name: prediction.satellite_name.clone(),
                frequency_text: prediction.frequency_text.clone(),
                point: layout_position(index),
                next_pass: prediction.passes.first().map(|p| p.time),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::PassEvent;
    use crate::scheduler::Freshness;
    use crate::views::testutil::{wait_until, StubService};

    fn prediction(name: &str, first_pass_epoch: i64) -> PassPrediction {
        PassPrediction {
            satellite_name: name.to_string(),
            frequency_text: "137.100 MHz".to_string(),
            passes: vec![PassEvent {
                time: DateTime::from_timestamp(first_pass_epoch, 0).unwrap(),
            }],
        }
    }

    #[tokio::test(start_paused = true)]
    async fn placements_follow_fetch_order() {
        let service = Arc::new(StubService::predicting(|| {
            Ok(vec![prediction("NOAA 19", 1000), prediction("NOAA 18", 2000)])
        }));
        let mut view = SkyView::new(service, LocationStore::new(), Duration::from_secs(60));
        view.activate().await;
        wait_until(|| view.snapshot().freshness == Freshness::Fresh).await;

        let placements = view.placements();
        assert_eq!(placements.len(), 2);
        assert_eq!(placements[0].satellite_name, "NOAA 19");
        // index 0: angle 0, radius 30.
        assert!((placements[0].point.x_pct - 80.0).abs() < 1e-9);
        // index 1: angle 90, radius 40.
        assert!((placements[1].point.y_pct - 10.0).abs() < 1e-9);
        assert_eq!(
            placements[1].next_pass,
            Some(DateTime::from_timestamp(2000, 0).unwrap())
        );
        view.deactivate().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failed_prediction_keeps_last_passes_as_stale() {
        use std::sync::atomic::{AtomicU32, Ordering};
        let calls = Arc::new(AtomicU32::new(0));
        let calls_in_stub = calls.clone();
        let service = Arc::new(StubService::predicting(move || {
            if calls_in_stub.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(vec![prediction("NOAA 19", 1000)])
            } else {
                Err(crate::client::ClientError::Service("/api/predict"))
            }
        }));
        let mut view = SkyView::new(service, LocationStore::new(), Duration::from_secs(60));
        view.activate().await;
        wait_until(|| view.snapshot().freshness == Freshness::Fresh).await;
        wait_until(|| view.snapshot().freshness == Freshness::Stale).await;
        assert_eq!(view.placements().len(), 1);
        view.deactivate().await;
    }
}
