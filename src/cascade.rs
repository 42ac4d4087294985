use std::sync::Arc;

use tracing::debug;

use crate::model::Catalog;
use crate::search::{build_country_index, build_port_index, normalize, resolve_exact};
use crate::viewport::{plan_for_country, plan_for_port, PlannerSettings, ViewportInstruction};

/// Raw contents of the two search inputs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchState {
    pub country_text: String,
    pub port_text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CascadePhase {
    Unconstrained,
    PortSelected,
    CountrySelected,
    CountryAndPortSelected,
}

impl CascadePhase {
    pub fn label(self) -> &'static str {
        match self {
            CascadePhase::Unconstrained => "ANY",
            CascadePhase::PortSelected => "PORT",
            CascadePhase::CountrySelected => "COUNTRY",
            CascadePhase::CountryAndPortSelected => "COUNTRY+PORT",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SearchEvent {
    CountryText(String),
    PortText(String),
    Reset,
}

/// Outcome of one transition.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transition {
    pub instruction: Option<ViewportInstruction>,
    pub port_cleared: bool,
}

/// Keeps the port input consistent with the country input.
pub struct Cascade {
    catalog: Arc<Catalog>,
    settings: PlannerSettings,
    state: SearchState,
    countries: Vec<String>,
    ports: Vec<String>,
    ports_key: Option<String>,
}

impl Cascade {
    pub fn new(catalog: Arc<Catalog>, settings: PlannerSettings) -> Self {
        let countries = build_country_index(&catalog);
        let ports = build_port_index(&catalog, None);
        debug!(
            "search index countries={} ports={}",
            countries.len(),
            ports.len()
        );
        Self {
            catalog,
            settings,
            state: SearchState::default(),
            countries,
            ports,
            ports_key: None,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn country_options(&self) -> &[String] {
        &self.countries
    }

    /// Port names allowed by the current country selection.
    pub fn port_options(&self) -> &[String] {
        &self.ports
    }

    pub fn selected_country(&self) -> Option<&str> {
        resolve_exact(&self.countries, &self.state.country_text)
    }

    pub fn selected_port(&self) -> Option<&str> {
        resolve_exact(&self.ports, &self.state.port_text)
    }

    pub fn phase(&self) -> CascadePhase {
        match (self.selected_country(), self.selected_port()) {
            (None, None) => CascadePhase::Unconstrained,
            (None, Some(_)) => CascadePhase::PortSelected,
            (Some(_), None) => CascadePhase::CountrySelected,
            (Some(_), Some(_)) => CascadePhase::CountryAndPortSelected,
        }
    }

    pub fn set_country_text(&mut self, text: impl Into<String>) -> Transition {
        self.transition(SearchEvent::CountryText(text.into()), 0.0)
    }

    pub fn set_port_text(&mut self, text: impl Into<String>, current_zoom: f64) -> Transition {
        self.transition(SearchEvent::PortText(text.into()), current_zoom)
    }

    pub fn reset(&mut self) -> Transition {
        self.transition(SearchEvent::Reset, 0.0)
    }

    /// Applies one input event and restores the cascade invariant before
    /// returning.
    ///
    /// Country edits rebuild the port list and clear a port that no longer
    /// resolves in it, but only once the country text names a known country.
    /// Port edits never touch the country and are kept as typed.
    pub fn transition(&mut self, event: SearchEvent, current_zoom: f64) -> Transition {
        match event {
            SearchEvent::CountryText(text) => {
                self.state.country_text = text;
                self.refresh_ports();
                let port_cleared = self.reconcile();
                let instruction = self
                    .selected_country()
                    .and_then(|country| plan_for_country(&self.catalog, country, self.settings));
                Transition {
                    instruction,
                    port_cleared,
                }
            }
            SearchEvent::PortText(text) => {
                self.state.port_text = text;
                let instruction = self.selected_port().and_then(|port| {
                    plan_for_port(
                        &self.catalog,
                        port,
                        self.selected_country(),
                        current_zoom,
                        self.settings,
                    )
                });
                Transition {
                    instruction,
                    port_cleared: false,
                }
            }
            SearchEvent::Reset => {
                self.state = SearchState::default();
                self.refresh_ports();
                debug!("search reset");
                Transition::default()
            }
        }
    }

    fn refresh_ports(&mut self) {
        let key = self.selected_country().map(normalize);
        if key == self.ports_key {
            return;
        }
        self.ports = build_port_index(&self.catalog, key.as_deref());
        debug!(
            "port index rebuilt filter={:?} ports={}",
            key,
            self.ports.len()
        );
        self.ports_key = key;
    }

    fn reconcile(&mut self) -> bool {
        if self.selected_country().is_none()
            || self.state.port_text.is_empty()
            || self.selected_port().is_some()
        {
            return false;
        }
        debug!(
            "clearing port {:?} outside {:?}",
            self.state.port_text, self.state.country_text
        );
        self.state.port_text.clear();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PortRecord;
    use crate::viewport::LatLng;

    fn port(name: &str, country: &str, lat: f64, lng: f64) -> PortRecord {
        PortRecord {
            id: name.to_ascii_lowercase(),
            name: Some(name.to_string()),
            country: Some(country.to_string()),
            lat: Some(lat),
            lng: Some(lng),
        }
    }

    fn cascade() -> Cascade {
        let catalog = Catalog::new(vec![
            port("Rotterdam", "Netherlands", 51.95, 4.14),
            port("Amsterdam", "Netherlands", 52.37, 4.90),
            port("Tokyo", "Japan", 35.68, 139.76),
        ]);
        Cascade::new(Arc::new(catalog), PlannerSettings::default())
    }

    #[test]
    fn starts_unconstrained_with_full_lists() {
        let c = cascade();
        assert_eq!(c.phase(), CascadePhase::Unconstrained);
        assert_eq!(c.country_options(), ["Japan", "Netherlands"]);
        assert_eq!(c.port_options(), ["Amsterdam", "Rotterdam", "Tokyo"]);
    }

    #[test]
    fn country_selection_filters_ports_and_fits_bounds() {
        let mut c = cascade();
        let t = c.set_country_text("nEtHeRlAnDs");
        assert_eq!(c.port_options(), ["Amsterdam", "Rotterdam"]);
        assert_eq!(c.phase(), CascadePhase::CountrySelected);
        let Some(ViewportInstruction::Bounds { bounds, padding_px }) = t.instruction else {
            panic!("expected bounds, got {:?}", t.instruction);
        };
        assert_eq!(padding_px, 40.0);
        assert_eq!(bounds.south_west, LatLng::new(51.95, 4.14));
        assert_eq!(bounds.north_east, LatLng::new(52.37, 4.90));
    }

    #[test]
    fn port_outside_filtered_list_is_left_as_typed() {
        let mut c = cascade();
        c.set_country_text("netherlands");
        let t = c.set_port_text("Tokyo", 5.0);
        assert_eq!(t.instruction, None);
        assert!(!t.port_cleared);
        assert_eq!(c.state().port_text, "Tokyo");
        assert_eq!(c.selected_port(), None);
    }

    #[test]
    fn port_inside_filtered_list_zooms_to_point() {
        let mut c = cascade();
        c.set_country_text("Netherlands");
        let t = c.set_port_text("rotterdam", 5.0);
        assert_eq!(
            t.instruction,
            Some(ViewportInstruction::Point {
                center: LatLng::new(51.95, 4.14),
                min_zoom: 8.0,
            })
        );
        assert_eq!(c.phase(), CascadePhase::CountryAndPortSelected);
    }

    #[test]
    fn resolving_country_clears_foreign_port() {
        let mut c = cascade();
        c.set_port_text("Tokyo", 2.0);
        assert_eq!(c.phase(), CascadePhase::PortSelected);
        let t = c.set_country_text("Netherlands");
        assert!(t.port_cleared);
        assert_eq!(c.state().port_text, "");
    }

    #[test]
    fn partial_country_does_not_clear_port() {
        let mut c = cascade();
        c.set_port_text("Tokyo", 2.0);
        let t = c.set_country_text("Nether");
        assert!(!t.port_cleared);
        assert_eq!(t.instruction, None);
        assert_eq!(c.state().port_text, "Tokyo");
        assert_eq!(c.port_options().len(), 3);
    }

    #[test]
    fn compatible_port_survives_country_change() {
        let mut c = cascade();
        c.set_port_text("Amsterdam", 2.0);
        let t = c.set_country_text("Netherlands");
        assert!(!t.port_cleared);
        assert_eq!(c.selected_port(), Some("Amsterdam"));
    }

    #[test]
    fn reset_clears_everything() {
        let mut c = cascade();
        c.set_country_text("Japan");
        c.set_port_text("Tokyo", 2.0);
        let t = c.reset();
        assert_eq!(t, Transition::default());
        assert_eq!(c.state(), &SearchState::default());
        assert_eq!(c.phase(), CascadePhase::Unconstrained);
        assert_eq!(c.port_options().len(), 3);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::model::PortRecord;
    use proptest::prelude::*;

    const COUNTRIES: [&str; 3] = ["Chile", "Peru", "Japan"];

    fn catalog_strategy() -> impl Strategy<Value = Catalog> {
        prop::collection::vec(("[A-Da-d]{1,3}", 0usize..3), 1..30).prop_map(|rows| {
            let records = rows
                .into_iter()
                .enumerate()
                .map(|(i, (name, country))| PortRecord {
                    id: i.to_string(),
                    name: Some(name),
                    country: Some(COUNTRIES[country].to_string()),
                    lat: Some(i as f64),
                    lng: Some(-(i as f64)),
                })
                .collect();
            Catalog::new(records)
        })
    }

    proptest! {
        #[test]
        fn port_never_belongs_to_another_country(
            catalog in catalog_strategy(),
            port_text in "[A-Da-d]{1,3}",
            country in 0usize..3,
            upper in any::<bool>(),
        ) {
            let mut c = Cascade::new(Arc::new(catalog), PlannerSettings::default());
            c.set_port_text(port_text, 2.0);
            let country_text = if upper {
                COUNTRIES[country].to_uppercase()
            } else {
                COUNTRIES[country].to_string()
            };
            c.set_country_text(country_text);
            if c.selected_country().is_some() {
                let port = c.state().port_text.clone();
                prop_assert!(port.is_empty() || c.selected_port().is_some());
                let allowed = build_port_index(c.catalog.as_ref(), Some(COUNTRIES[country]));
                prop_assert!(port.is_empty() || resolve_exact(&allowed, &port).is_some());
            }
        }
    }
}
