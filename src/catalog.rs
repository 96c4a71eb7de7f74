//! Pure catalog filtering for the satellite list view: narrow by type facet
//! first, then by free-text search, and truncate for display while keeping
//! the true match count.

use serde::{Deserialize, Serialize};

use crate::client::{SatelliteSummary, SatelliteType};

pub const DISPLAY_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeFacet {
    All,
    Only(SatelliteType),
}

impl Default for TypeFacet {
    fn default() -> Self {
        TypeFacet::All
    }
}

impl std::str::FromStr for TypeFacet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(TypeFacet::All),
            "weather" => Ok(TypeFacet::Only(SatelliteType::Weather)),
            "communications" => Ok(TypeFacet::Only(SatelliteType::Communications)),
            "research" => Ok(TypeFacet::Only(SatelliteType::Research)),
            "other" => Ok(TypeFacet::Only(SatelliteType::Other)),
            _ => Err(format!("unknown satellite type: {}", s)),
        }
    }
}

/// Transient filter inputs owned by the list view.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    pub facet: TypeFacet,
    pub search: String,
}

/// Bounded view over a filtered catalog. `shown` holds at most
/// [`DISPLAY_LIMIT`] entries; `total_matched` is the true filtered count and
/// is always rendered alongside the display count.
#[derive(Debug, Clone)]
pub struct FilteredCatalog<'a> {
    pub shown: Vec<&'a SatelliteSummary>,
    pub total_matched: usize,
}

impl FilteredCatalog<'_> {
    pub fn summary_line(&self) -> String {
        format!("showing {} of {}", self.shown.len(), self.total_matched)
    }
}

/// Recomputed on every change to the catalog, facet, or search text.
pub fn filter<'a>(catalog: &'a [SatelliteSummary], state: &FilterState) -> FilteredCatalog<'a> {
    let query = state.search.trim().to_lowercase();
    let matched: Vec<&SatelliteSummary> = catalog
        .iter()
        .filter(|sat| match state.facet {
            TypeFacet::All => true,
            TypeFacet::Only(t) => sat.sat_type == t,
        })
        .filter(|sat| {
            if query.is_empty() {
                return true;
            }
            sat.name.to_lowercase().contains(&query)
                || sat.frequency_text.contains(state.search.trim())
        })
        .collect();

    let total_matched = matched.len();
    let shown = matched.into_iter().take(DISPLAY_LIMIT).collect();
    FilteredCatalog {
        shown,
        total_matched,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Importance;

    fn sat(name: &str, frequency: &str, sat_type: SatelliteType) -> SatelliteSummary {
        SatelliteSummary {
            name: name.to_string(),
            frequency_text: frequency.to_string(),
            sat_type,
            norad_id: 0,
            importance: Importance::Low,
            locally_relevant: false,
        }
    }

    fn fixture() -> Vec<SatelliteSummary> {
        vec![
            sat("NOAA 19", "137.100 MHz", SatelliteType::Weather),
            sat("NOAA 18", "137.9125 MHz", SatelliteType::Weather),
            sat("ISS (ZARYA)", "145.800 MHz", SatelliteType::Research),
            sat("SAUDISAT 1C", "145.850 MHz", SatelliteType::Communications),
            sat("METEOR M2", "137.100 MHz", SatelliteType::Weather),
        ]
    }

    #[test]
    fn clearing_the_facet_returns_a_superset() {
        let catalog = fixture();
        let weather = filter(
            &catalog,
            &FilterState {
                facet: TypeFacet::Only(SatelliteType::Weather),
                search: String::new(),
            },
        );
        let all = filter(&catalog, &FilterState::default());
        assert_eq!(weather.total_matched, 3);
        assert_eq!(all.total_matched, 5);
        for sat in &weather.shown {
            assert!(all.shown.iter().any(|s| s.name == sat.name));
        }
    }

    #[test]
    fn search_is_case_insensitive_on_names() {
        let catalog = fixture();
        let result = filter(
            &catalog,
            &FilterState {
                facet: TypeFacet::All,
                search: "noaa".to_string(),
            },
        );
        assert_eq!(result.total_matched, 2);
    }

    #[test]
    fn search_matches_frequency_text_literally() {
        let catalog = fixture();
        let result = filter(
            &catalog,
            &FilterState {
                facet: TypeFacet::All,
                search: "137.100".to_string(),
            },
        );
        assert_eq!(result.total_matched, 2);
    }

    #[test]
    fn no_match_yields_zero_of_zero() {
        let catalog = fixture();
        let result = filter(
            &catalog,
            &FilterState {
                facet: TypeFacet::All,
                search: "GALILEO".to_string(),
            },
        );
        assert!(result.shown.is_empty());
        assert_eq!(result.total_matched, 0);
        // The second number is the true filtered count, not the raw
        // catalog size.
        assert_eq!(result.summary_line(), "showing 0 of 0");
    }

    #[test]
    fn display_is_truncated_but_count_is_true() {
        let catalog: Vec<_> = (0..30)
            .map(|i| {
                sat(
                    &format!("SAT {}", i),
                    "100 MHz",
                    SatelliteType::Communications,
                )
            })
            .collect();
        let result = filter(&catalog, &FilterState::default());
        assert_eq!(result.shown.len(), DISPLAY_LIMIT);
        assert_eq!(result.total_matched, 30);
        assert_eq!(result.summary_line(), "showing 20 of 30");
    }

    #[test]
    fn facet_and_search_compose() {
        let catalog = fixture();
        let result = filter(
            &catalog,
            &FilterState {
                facet: TypeFacet::Only(SatelliteType::Weather),
                search: "meteor".to_string(),
            },
        );
        assert_eq!(result.total_matched, 1);
        assert_eq!(result.shown[0].name, "METEOR M2");
    }
}
