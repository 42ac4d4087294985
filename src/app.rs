use std::sync::Arc;
use std::time::{Duration, SystemTime};

use ratatui::layout::Rect;
use tracing::debug;

use crate::cascade::{Cascade, CascadePhase, Transition};
use crate::coords::{format_dms, DmsCoords};
use crate::layers::{layer_items, LayerItem, LayerState};
use crate::model::{Catalog, PortRecord};
use crate::search::{labels_equal, normalize, suggestions};
use crate::viewport::{Camera, LatLng, PlannerSettings, ViewSize};

pub const MAX_SUGGESTIONS: usize = 8;
const NOTICE_TTL: Duration = Duration::from_secs(4);
const PAN_STEP: f64 = 0.25;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Country,
    Port,
    Layers,
    Help,
}

impl InputMode {
    pub fn is_editing(self) -> bool {
        matches!(self, InputMode::Country | InputMode::Port)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThemeMode {
    Default,
    ColorBlind,
    Amber,
    Ocean,
    Matrix,
    Monochrome,
}

impl ThemeMode {
    pub fn toggle(self) -> Self {
        match self {
            ThemeMode::Default => ThemeMode::ColorBlind,
            ThemeMode::ColorBlind => ThemeMode::Amber,
            ThemeMode::Amber => ThemeMode::Ocean,
            ThemeMode::Ocean => ThemeMode::Matrix,
            ThemeMode::Matrix => ThemeMode::Monochrome,
            ThemeMode::Monochrome => ThemeMode::Default,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ThemeMode::Default => "DEFAULT",
            ThemeMode::ColorBlind => "COLOR",
            ThemeMode::Amber => "AMBER",
            ThemeMode::Ocean => "OCEAN",
            ThemeMode::Matrix => "MATRIX",
            ThemeMode::Monochrome => "MONO",
        }
    }

    pub fn from_str(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "color" | "colorblind" | "cb" => ThemeMode::ColorBlind,
            "amber" | "gold" => ThemeMode::Amber,
            "ocean" | "blue" => ThemeMode::Ocean,
            "matrix" | "green" => ThemeMode::Matrix,
            "mono" | "monochrome" | "bw" | "grayscale" => ThemeMode::Monochrome,
            _ => ThemeMode::Default,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Notification {
    pub message: String,
    pub at: SystemTime,
}

pub struct App {
    pub(crate) catalog: Arc<Catalog>,
    pub(crate) catalog_label: String,
    pub(crate) cascade: Cascade,
    pub(crate) camera: Camera,
    pub(crate) layers: LayerState,
    pub(crate) input_mode: InputMode,
    pub(crate) theme_mode: ThemeMode,
    pub(crate) suggestion_cursor: Option<usize>,
    pub(crate) layer_cursor: usize,
    pub(crate) pointer: Option<DmsCoords>,
    pub(crate) map_area: Option<Rect>,
    pub(crate) notice: Option<Notification>,
}

impl App {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        catalog: Arc<Catalog>,
        catalog_label: String,
        planner: PlannerSettings,
        layers: LayerState,
        theme_mode: ThemeMode,
        home: LatLng,
        home_zoom: f64,
        min_zoom: f64,
    ) -> Self {
        let cascade = Cascade::new(Arc::clone(&catalog), planner);
        let camera = Camera::new(home, home_zoom, min_zoom, layers.base_map.max_zoom());
        Self {
            catalog,
            catalog_label,
            cascade,
            camera,
            layers,
            input_mode: InputMode::Normal,
            theme_mode,
            suggestion_cursor: None,
            layer_cursor: 0,
            pointer: None,
            map_area: None,
            notice: None,
        }
    }

    pub fn toggle_theme(&mut self) {
        self.theme_mode = self.theme_mode.toggle();
        debug!("theme -> {}", self.theme_mode.label());
    }

    pub fn open_help(&mut self) {
        self.input_mode = InputMode::Help;
        debug!("open help");
    }

    pub fn close_help(&mut self) {
        self.input_mode = InputMode::Normal;
        debug!("close help");
    }

    pub fn open_layers(&mut self) {
        self.layer_cursor = 0;
        self.input_mode = InputMode::Layers;
        debug!("open layers");
    }

    pub fn close_layers(&mut self) {
        self.input_mode = InputMode::Normal;
        debug!("close layers");
    }

    pub fn start_country_edit(&mut self) {
        self.input_mode = InputMode::Country;
        self.suggestion_cursor = None;
        debug!("edit country");
    }

    pub fn start_port_edit(&mut self) {
        self.input_mode = InputMode::Port;
        self.suggestion_cursor = None;
        debug!("edit port");
    }

    pub fn stop_edit(&mut self) {
        self.input_mode = InputMode::Normal;
        self.suggestion_cursor = None;
    }

    pub fn phase(&self) -> CascadePhase {
        self.cascade.phase()
    }

    /// Text of the field being edited, or empty outside edit modes.
    pub fn active_text(&self) -> &str {
        match self.input_mode {
            InputMode::Country => &self.cascade.state().country_text,
            InputMode::Port => &self.cascade.state().port_text,
            _ => "",
        }
    }

    pub fn set_active_text(&mut self, text: String) {
        let transition = match self.input_mode {
            InputMode::Country => self.cascade.set_country_text(text),
            InputMode::Port => self.cascade.set_port_text(text, self.camera.zoom()),
            _ => return,
        };
        self.suggestion_cursor = None;
        self.apply_transition(transition);
    }

    pub fn push_char(&mut self, ch: char) {
        let mut text = self.active_text().to_string();
        text.push(ch);
        self.set_active_text(text);
    }

    pub fn backspace(&mut self) {
        let mut text = self.active_text().to_string();
        if text.pop().is_some() {
            self.set_active_text(text);
        }
    }

    pub fn clear_field(&mut self) {
        if !self.active_text().is_empty() {
            self.set_active_text(String::new());
        }
    }

    /// Autocomplete hints for the field being edited.
    pub fn suggestions(&self) -> Vec<&str> {
        let options = match self.input_mode {
            InputMode::Country => self.cascade.country_options(),
            InputMode::Port => self.cascade.port_options(),
            _ => return Vec::new(),
        };
        let mut hints = suggestions(options, self.active_text());
        hints.truncate(MAX_SUGGESTIONS);
        hints
    }

    pub fn next_suggestion(&mut self) {
        let len = self.suggestions().len();
        if len == 0 {
            self.suggestion_cursor = None;
            return;
        }
        self.suggestion_cursor = Some(match self.suggestion_cursor {
            Some(idx) if idx + 1 < len => idx + 1,
            Some(_) => 0,
            None => 0,
        });
    }

    pub fn previous_suggestion(&mut self) {
        let len = self.suggestions().len();
        if len == 0 {
            self.suggestion_cursor = None;
            return;
        }
        self.suggestion_cursor = Some(match self.suggestion_cursor {
            Some(0) | None => len - 1,
            Some(idx) => idx - 1,
        });
    }

    /// Replaces the field with the highlighted hint, or the first one when
    /// nothing is highlighted and the typed text does not resolve yet.
    pub fn accept_suggestion(&mut self) -> bool {
        if self.suggestion_cursor.is_none()
            && (self.active_text().trim().is_empty() || self.active_resolved())
        {
            return false;
        }
        let hints = self.suggestions();
        let idx = self.suggestion_cursor.unwrap_or(0);
        let Some(choice) = hints.get(idx).map(|s| s.to_string()) else {
            return false;
        };
        debug!("accept suggestion {choice:?}");
        self.set_active_text(choice);
        true
    }

    fn active_resolved(&self) -> bool {
        match self.input_mode {
            InputMode::Country => self.cascade.selected_country().is_some(),
            InputMode::Port => self.cascade.selected_port().is_some(),
            _ => false,
        }
    }

    pub fn reset(&mut self) {
        let transition = self.cascade.reset();
        self.apply_transition(transition);
        self.camera.reset();
        self.suggestion_cursor = None;
        self.notify("RESET view and search");
    }

    pub fn zoom_in(&mut self) {
        self.camera.zoom_by(1.0);
    }

    pub fn zoom_out(&mut self) {
        self.camera.zoom_by(-1.0);
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        let size = self.view_size();
        self.camera.pan(dx * PAN_STEP, dy * PAN_STEP, size);
    }

    pub fn set_map_area(&mut self, area: Rect) {
        self.map_area = Some(area);
    }

    /// Inner drawing area of the map block, inside its border.
    pub fn map_inner(&self) -> Option<Rect> {
        let area = self.map_area?;
        if area.width < 3 || area.height < 3 {
            return None;
        }
        Some(Rect::new(area.x + 1, area.y + 1, area.width - 2, area.height - 2))
    }

    pub fn view_size(&self) -> ViewSize {
        match self.map_inner() {
            Some(inner) => ViewSize::from_cells(inner.width, inner.height),
            None => ViewSize::from_cells(80, 24),
        }
    }

    pub fn map_contains(&self, column: u16, row: u16) -> bool {
        self.map_inner().is_some_and(|inner| {
            column >= inner.x
                && column < inner.x + inner.width
                && row >= inner.y
                && row < inner.y + inner.height
        })
    }

    /// Updates the coordinate readout; positions off the map keep the last value.
    pub fn hover(&mut self, column: u16, row: u16) {
        let Some(inner) = self.map_inner() else {
            return;
        };
        if !self.map_contains(column, row) {
            return;
        }
        let fx = (f64::from(column - inner.x) + 0.5) / f64::from(inner.width);
        let fy = (f64::from(row - inner.y) + 0.5) / f64::from(inner.height);
        let point = self.camera.point_at(fx, fy, self.view_size());
        // Rows past the poles have no position.
        if point.lat.abs() > 90.0 {
            return;
        }
        self.pointer = Some(format_dms(point.lat, point.lng));
    }

    pub fn layer_len(&self) -> usize {
        layer_items().len()
    }

    pub fn next_layer(&mut self) {
        let len = self.layer_len();
        self.layer_cursor = (self.layer_cursor + 1) % len;
    }

    pub fn previous_layer(&mut self) {
        let len = self.layer_len();
        self.layer_cursor = (self.layer_cursor + len - 1) % len;
    }

    pub fn activate_layer(&mut self) {
        let Some(item) = layer_items().get(self.layer_cursor).copied() else {
            return;
        };
        match item {
            LayerItem::Base(map) => {
                self.layers.base_map = map;
                self.camera.set_max_zoom(map.max_zoom());
                debug!("base map -> {}", map.key());
            }
            LayerItem::Overlay(overlay) => {
                self.layers.toggle(overlay);
                debug!(
                    "overlay {} -> {}",
                    overlay.short_label(),
                    self.layers.toggled(overlay)
                );
            }
        }
    }

    /// Catalog record behind the selected port, honoring the country scope.
    pub fn selected_port_record(&self) -> Option<&PortRecord> {
        let port = normalize(self.cascade.selected_port()?);
        let country = self.cascade.selected_country().map(normalize);
        self.catalog.iter().find(|r| {
            normalize(r.name_text()) == port
                && country
                    .as_deref()
                    .map_or(true, |c| normalize(r.country_text()) == c)
        })
    }

    pub fn in_selected_country(&self, record: &PortRecord) -> bool {
        self.cascade
            .selected_country()
            .is_some_and(|c| labels_equal(c, record.country_text()))
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        self.notice = Some(Notification {
            message: message.into(),
            at: SystemTime::now(),
        });
    }

    pub fn current_notice(&self, now: SystemTime) -> Option<&str> {
        let notice = self.notice.as_ref()?;
        let age = now.duration_since(notice.at).unwrap_or_default();
        (age <= NOTICE_TTL).then_some(notice.message.as_str())
    }

    fn apply_transition(&mut self, transition: Transition) {
        if transition.port_cleared {
            self.notify("PORT cleared: not in selected country");
        }
        if let Some(instruction) = transition.instruction {
            let size = self.view_size();
            self.camera.apply(&instruction, size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::{BaseMap, Overlay};

    fn port(name: &str, country: &str, lat: f64, lng: f64) -> PortRecord {
        PortRecord {
            id: name.to_ascii_lowercase(),
            name: Some(name.to_string()),
            country: Some(country.to_string()),
            lat: Some(lat),
            lng: Some(lng),
        }
    }

    fn app() -> App {
        app_with(vec![
            port("Rotterdam", "Netherlands", 51.95, 4.14),
            port("Amsterdam", "Netherlands", 52.37, 4.90),
            port("Tokyo", "Japan", 35.68, 139.76),
            port("Victoria", "Canada", 48.42, -123.37),
            port("Victoria", "Seychelles", -4.62, 55.45),
        ])
    }

    fn app_with(records: Vec<PortRecord>) -> App {
        let mut app = App::new(
            Arc::new(Catalog::new(records)),
            "test".to_string(),
            PlannerSettings::default(),
            LayerState::default(),
            ThemeMode::Default,
            LatLng::new(20.0, 0.0),
            2.0,
            1.0,
        );
        app.set_map_area(Rect::new(0, 3, 102, 42));
        app
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.push_char(ch);
        }
    }

    #[test]
    fn typing_country_moves_camera_once_resolved() {
        let mut app = app();
        app.start_country_edit();
        type_text(&mut app, "nether");
        assert_eq!(app.camera.zoom(), 2.0);
        type_text(&mut app, "lands");
        assert_eq!(app.phase(), CascadePhase::CountrySelected);
        assert_eq!(app.camera.zoom(), 10.0);
        let center = app.camera.center();
        assert!((center.lat - 52.16).abs() < 1e-9);
        assert!((center.lng - 4.52).abs() < 1e-9);
    }

    #[test]
    fn port_pick_zooms_to_at_least_eight() {
        let mut app = app();
        app.start_port_edit();
        type_text(&mut app, "Tokyo");
        assert_eq!(app.camera.zoom(), 8.0);
        assert_eq!(app.camera.center(), LatLng::new(35.68, 139.76));
        let record = app.selected_port_record().unwrap();
        assert_eq!(record.id, "tokyo");
    }

    #[test]
    fn country_change_clears_foreign_port_with_notice() {
        let mut app = app();
        app.start_port_edit();
        type_text(&mut app, "Tokyo");
        app.start_country_edit();
        type_text(&mut app, "Netherlands");
        assert_eq!(app.cascade.state().port_text, "");
        let now = SystemTime::now();
        assert!(app.current_notice(now).unwrap().starts_with("PORT cleared"));
        assert!(app
            .current_notice(now + Duration::from_secs(10))
            .is_none());
    }

    #[test]
    fn scoped_port_record_uses_selected_country() {
        let mut app = app();
        app.start_country_edit();
        type_text(&mut app, "Seychelles");
        app.start_port_edit();
        type_text(&mut app, "victoria");
        let record = app.selected_port_record().unwrap();
        assert_eq!(record.country_text(), "Seychelles");
        assert_eq!(app.camera.center(), LatLng::new(-4.62, 55.45));
    }

    #[test]
    fn suggestions_follow_typed_text_and_cursor() {
        let mut app = app();
        app.start_port_edit();
        type_text(&mut app, "ter");
        assert_eq!(app.suggestions(), vec!["Amsterdam", "Rotterdam"]);
        app.next_suggestion();
        app.next_suggestion();
        assert_eq!(app.suggestion_cursor, Some(1));
        assert!(app.accept_suggestion());
        assert_eq!(app.cascade.state().port_text, "Rotterdam");
        assert_eq!(app.cascade.selected_port(), Some("Rotterdam"));
        app.previous_suggestion();
        assert_eq!(app.suggestion_cursor, Some(0));
    }

    #[test]
    fn backspace_and_clear_edit_active_field() {
        let mut app = app();
        app.start_country_edit();
        type_text(&mut app, "Japan");
        app.backspace();
        assert_eq!(app.cascade.state().country_text, "Japa");
        assert_eq!(app.cascade.selected_country(), None);
        app.clear_field();
        assert_eq!(app.active_text(), "");
        app.stop_edit();
        app.push_char('x');
        assert_eq!(app.cascade.state().country_text, "");
    }

    #[test]
    fn reset_restores_home_view() {
        let mut app = app();
        app.start_country_edit();
        type_text(&mut app, "Japan");
        app.reset();
        assert_eq!(app.phase(), CascadePhase::Unconstrained);
        assert_eq!(app.camera.center(), LatLng::new(20.0, 0.0));
        assert_eq!(app.camera.zoom(), 2.0);
    }

    #[test]
    fn hover_inside_map_formats_coordinates() {
        let mut app = app();
        assert!(app.map_contains(1, 4));
        assert!(!app.map_contains(0, 4));
        app.hover(0, 0);
        assert!(app.pointer.is_none());
        app.hover(51, 24);
        let coords = app.pointer.clone().unwrap();
        assert!(coords.lat.ends_with('N'));
        assert!(coords.raw.starts_with('('));
        app.hover(0, 0);
        assert_eq!(app.pointer, Some(coords));
    }

    #[test]
    fn hover_above_the_pole_keeps_last_readout() {
        let mut app = app();
        app.hover(51, 4);
        assert!(app.pointer.is_none());
        app.hover(51, 24);
        let coords = app.pointer.clone().unwrap();
        app.hover(51, 4);
        assert_eq!(app.pointer, Some(coords));
    }

    #[test]
    fn hover_reports_unwrapped_longitude() {
        let mut app = app();
        app.camera.set_view(LatLng::new(0.0, 200.0), 2.0);
        app.hover(51, 24);
        let coords = app.pointer.clone().unwrap();
        assert_eq!(coords.raw, "(-2.812500, 201.406250)");
        assert!(coords.lng.starts_with("201°"));
        assert!(coords.lng.ends_with('E'));
    }

    #[test]
    fn accept_keeps_resolved_text_over_longer_hint() {
        let mut app = app_with(vec![
            port("Port Victoria", "Seychelles", -4.62, 55.45),
            port("Victoria", "Canada", 48.42, -123.37),
        ]);
        app.start_port_edit();
        type_text(&mut app, "Victoria");
        assert_eq!(app.suggestions(), vec!["Port Victoria", "Victoria"]);
        assert!(!app.accept_suggestion());
        assert_eq!(app.cascade.state().port_text, "Victoria");
        assert_eq!(app.cascade.selected_port(), Some("Victoria"));
        let center = app.camera.center();
        assert!((center.lat - 48.42).abs() < 1e-9);
        assert!((center.lng + 123.37).abs() < 1e-9);

        app.next_suggestion();
        assert!(app.accept_suggestion());
        assert_eq!(app.cascade.state().port_text, "Port Victoria");
    }

    #[test]
    fn accept_on_blank_field_selects_nothing() {
        let mut app = app();
        app.start_port_edit();
        assert!(!app.accept_suggestion());
        assert_eq!(app.cascade.state().port_text, "");
        assert_eq!(app.phase(), CascadePhase::Unconstrained);
        assert_eq!(app.camera.zoom(), 2.0);
    }

    #[test]
    fn base_map_selection_caps_zoom() {
        let mut app = app();
        app.start_port_edit();
        type_text(&mut app, "Tokyo");
        app.camera.zoom_by(6.0);
        assert_eq!(app.camera.zoom(), 14.0);
        app.open_layers();
        let nasa = layer_items()
            .iter()
            .position(|i| *i == LayerItem::Base(BaseMap::NasaBlueMarble))
            .unwrap();
        for _ in 0..nasa {
            app.next_layer();
        }
        app.activate_layer();
        assert_eq!(app.layers.base_map, BaseMap::NasaBlueMarble);
        assert_eq!(app.camera.zoom(), 9.0);
    }

    #[test]
    fn layer_cursor_wraps_and_toggles_overlay() {
        let mut app = app();
        app.open_layers();
        app.previous_layer();
        assert_eq!(app.layer_cursor, app.layer_len() - 1);
        app.activate_layer();
        assert!(app.layers.toggled(Overlay::Railways));
        app.next_layer();
        assert_eq!(app.layer_cursor, 0);
    }

    #[test]
    fn theme_cycles_back_to_default() {
        let mut mode = ThemeMode::from_str("ocean");
        for _ in 0..6 {
            mode = mode.toggle();
        }
        assert_eq!(mode, ThemeMode::Ocean);
        assert_eq!(ThemeMode::from_str("unknown"), ThemeMode::Default);
    }
}
