use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// How much the currently held value can be trusted. A failed refresh never
/// erases the last good value, it demotes it to `Stale`; a view that has
/// never fetched successfully is `Unavailable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    Fresh,
    Stale,
    Unavailable,
}

impl Freshness {
    pub fn label(&self) -> &'static str {
        match self {
            Freshness::Fresh => "live",
            Freshness::Stale => "stale",
            Freshness::Unavailable => "unavailable",
        }
    }
}

/// Snapshot of one view's fetched state.
#[derive(Debug, Clone)]
pub struct ViewData<T> {
    pub value: Option<T>,
    pub freshness: Freshness,
    pub loading: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

impl<T> Default for ViewData<T> {
    fn default() -> Self {
        ViewData {
            value: None,
            freshness: Freshness::Unavailable,
            loading: false,
            last_updated: None,
        }
    }
}

impl<T> ViewData<T> {
    pub fn apply_success(&mut self, value: T) {
        self.value = Some(value);
        self.freshness = Freshness::Fresh;
        self.last_updated = Some(Utc::now());
    }

    pub fn apply_failure(&mut self) {
        self.freshness = if self.value.is_some() {
            Freshness::Stale
        } else {
            Freshness::Unavailable
        };
    }
}

/// Sets the loading flag for the duration of one request and clears it on
/// every exit path, including cancellation of the in-flight future.
pub(crate) struct LoadingGuard<T> {
    shared: Arc<Mutex<ViewData<T>>>,
}

impl<T> LoadingGuard<T> {
    pub(crate) fn engage(shared: &Arc<Mutex<ViewData<T>>>) -> Self {
        shared.lock().unwrap_or_else(|e| e.into_inner()).loading = true;
        LoadingGuard {
            shared: shared.clone(),
        }
    }
}

impl<T> Drop for LoadingGuard<T> {
    fn drop(&mut self) {
        self.shared
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .loading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_demotes_but_keeps_value() {
        let mut data: ViewData<u32> = ViewData::default();
        data.apply_failure();
        assert_eq!(data.freshness, Freshness::Unavailable);
        assert!(data.value.is_none());

        data.apply_success(7);
        assert_eq!(data.freshness, Freshness::Fresh);

        data.apply_failure();
        assert_eq!(data.freshness, Freshness::Stale);
        assert_eq!(data.value, Some(7));
    }
}
