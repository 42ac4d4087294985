use tracing::debug;

use crate::model::PortRecord;
use crate::search::normalize;

pub const FIT_PADDING_PX: f64 = 40.0;
pub const PORT_MIN_ZOOM: f64 = 8.0;
pub const DEFAULT_MAX_ZOOM: f64 = 18.0;
pub const TILE_SIZE_PX: f64 = 256.0;
pub const CELL_WIDTH_PX: f64 = 8.0;
pub const CELL_HEIGHT_PX: f64 = 16.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    /// Smallest rectangle enclosing every point; `None` for an empty input.
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = LatLng>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = LatLngBounds {
            south_west: first,
            north_east: first,
        };
        for p in iter {
            bounds.south_west.lat = bounds.south_west.lat.min(p.lat);
            bounds.south_west.lng = bounds.south_west.lng.min(p.lng);
            bounds.north_east.lat = bounds.north_east.lat.max(p.lat);
            bounds.north_east.lng = bounds.north_east.lng.max(p.lng);
        }
        Some(bounds)
    }

    pub fn center(&self) -> LatLng {
        LatLng {
            lat: (self.south_west.lat + self.north_east.lat) / 2.0,
            lng: (self.south_west.lng + self.north_east.lng) / 2.0,
        }
    }

    pub fn lat_span(&self) -> f64 {
        self.north_east.lat - self.south_west.lat
    }

    pub fn lng_span(&self) -> f64 {
        self.north_east.lng - self.south_west.lng
    }

    pub fn contains(&self, p: LatLng) -> bool {
        p.lat >= self.south_west.lat
            && p.lat <= self.north_east.lat
            && p.lng >= self.south_west.lng
            && p.lng <= self.north_east.lng
    }
}

/// Camera command handed to the map surface and dropped right after.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewportInstruction {
    /// Go to `center`, zooming in to at least `min_zoom`.
    Point { center: LatLng, min_zoom: f64 },
    /// Fit the rectangle with `padding_px` of margin on every side.
    Bounds {
        bounds: LatLngBounds,
        padding_px: f64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlannerSettings {
    pub port_min_zoom: f64,
    pub fit_padding_px: f64,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            port_min_zoom: PORT_MIN_ZOOM,
            fit_padding_px: FIT_PADDING_PX,
        }
    }
}

pub fn plan_for_country(
    records: &[PortRecord],
    country: &str,
    settings: PlannerSettings,
) -> Option<ViewportInstruction> {
    let wanted = normalize(country);
    if wanted.is_empty() {
        return None;
    }
    let points = records
        .iter()
        .filter(|r| normalize(r.country_text()) == wanted)
        .filter_map(PortRecord::position)
        .map(|(lat, lng)| LatLng::new(lat, lng));
    let bounds = LatLngBounds::enclosing(points)?;
    debug!(
        "plan country={country} sw=({:.4},{:.4}) ne=({:.4},{:.4})",
        bounds.south_west.lat, bounds.south_west.lng, bounds.north_east.lat, bounds.north_east.lng
    );
    Some(ViewportInstruction::Bounds {
        bounds,
        padding_px: settings.fit_padding_px,
    })
}

/// Point instruction for the first record named `port`, optionally limited
/// to records of `country`. The zoom never drops below `current_zoom`.
pub fn plan_for_port(
    records: &[PortRecord],
    port: &str,
    country: Option<&str>,
    current_zoom: f64,
    settings: PlannerSettings,
) -> Option<ViewportInstruction> {
    let wanted = normalize(port);
    if wanted.is_empty() {
        return None;
    }
    let country = country.map(normalize).filter(|c| !c.is_empty());
    let record = records.iter().find(|r| {
        normalize(r.name_text()) == wanted
            && country
                .as_deref()
                .map_or(true, |c| normalize(r.country_text()) == c)
    })?;
    let (lat, lng) = record.position()?;
    let min_zoom = current_zoom.max(settings.port_min_zoom);
    debug!("plan port={port} id={} zoom>={min_zoom}", record.id);
    Some(ViewportInstruction::Point {
        center: LatLng::new(lat, lng),
        min_zoom,
    })
}

/// Map area measured in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewSize {
    pub width_px: f64,
    pub height_px: f64,
}

impl ViewSize {
    pub fn from_cells(cols: u16, rows: u16) -> Self {
        Self {
            width_px: f64::from(cols.max(1)) * CELL_WIDTH_PX,
            height_px: f64::from(rows.max(1)) * CELL_HEIGHT_PX,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    center: LatLng,
    zoom: f64,
    min_zoom: f64,
    max_zoom: f64,
    home_center: LatLng,
    home_zoom: f64,
}

impl Camera {
    pub fn new(home_center: LatLng, home_zoom: f64, min_zoom: f64, max_zoom: f64) -> Self {
        let max_zoom = max_zoom.max(min_zoom);
        let home_zoom = home_zoom.clamp(min_zoom, max_zoom).round();
        Self {
            center: home_center,
            zoom: home_zoom,
            min_zoom,
            max_zoom,
            home_center,
            home_zoom,
        }
    }

    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn max_zoom(&self) -> f64 {
        self.max_zoom
    }

    pub fn set_max_zoom(&mut self, max_zoom: f64) {
        self.max_zoom = max_zoom.max(self.min_zoom);
        self.zoom = self.clamp_zoom(self.zoom);
    }

    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.center = LatLng::new(center.lat.clamp(-90.0, 90.0), center.lng);
        self.zoom = self.clamp_zoom(zoom);
        debug!(
            "camera center=({:.4},{:.4}) zoom={}",
            self.center.lat, self.center.lng, self.zoom
        );
    }

    pub fn reset(&mut self) {
        self.set_view(self.home_center, self.home_zoom);
    }

    pub fn apply(&mut self, instruction: &ViewportInstruction, size: ViewSize) {
        match *instruction {
            ViewportInstruction::Point { center, min_zoom } => self.set_view(center, min_zoom),
            ViewportInstruction::Bounds { bounds, padding_px } => {
                let zoom = self.fit_zoom(&bounds, padding_px, size);
                self.set_view(bounds.center(), zoom);
            }
        }
    }

    /// Largest whole zoom at which `bounds` fits inside the padded view.
    pub fn fit_zoom(&self, bounds: &LatLngBounds, padding_px: f64, size: ViewSize) -> f64 {
        let avail_w = (size.width_px - 2.0 * padding_px).max(1.0);
        let avail_h = (size.height_px - 2.0 * padding_px).max(1.0);
        let zoom_for = |avail: f64, span: f64| {
            if span > 0.0 {
                (avail * 360.0 / (TILE_SIZE_PX * span)).log2()
            } else {
                f64::INFINITY
            }
        };
        let zoom = zoom_for(avail_w, bounds.lng_span()).min(zoom_for(avail_h, bounds.lat_span()));
        if zoom.is_finite() {
            self.clamp_zoom(zoom.floor())
        } else {
            self.max_zoom
        }
    }

    pub fn zoom_by(&mut self, delta: f64) {
        self.set_view(self.center, self.zoom + delta);
    }

    /// Shift the view by fractions of its width and height.
    pub fn pan(&mut self, dx: f64, dy: f64, size: ViewSize) {
        let deg = self.degrees_per_px();
        let center = LatLng::new(
            self.center.lat + dy * size.height_px * deg,
            self.center.lng + dx * size.width_px * deg,
        );
        self.set_view(center, self.zoom);
    }

    pub fn degrees_per_px(&self) -> f64 {
        360.0 / (TILE_SIZE_PX * 2f64.powf(self.zoom))
    }

    pub fn visible_bounds(&self, size: ViewSize) -> LatLngBounds {
        let deg = self.degrees_per_px();
        let half_w = size.width_px * deg / 2.0;
        let half_h = size.height_px * deg / 2.0;
        LatLngBounds {
            south_west: LatLng::new(self.center.lat - half_h, self.center.lng - half_w),
            north_east: LatLng::new(self.center.lat + half_h, self.center.lng + half_w),
        }
    }

    /// Geographic position under a point given as fractions (0..1) of the
    /// view, measured from the top-left corner.
    pub fn point_at(&self, fx: f64, fy: f64, size: ViewSize) -> LatLng {
        let view = self.visible_bounds(size);
        LatLng::new(
            view.north_east.lat - fy * view.lat_span(),
            view.south_west.lng + fx * view.lng_span(),
        )
    }

    fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(name: &str, country: &str, lat: Option<f64>, lng: Option<f64>) -> PortRecord {
        PortRecord {
            id: name.to_ascii_lowercase(),
            name: Some(name.to_string()),
            country: Some(country.to_string()),
            lat,
            lng,
        }
    }

    fn sample() -> Vec<PortRecord> {
        vec![
            port("Rotterdam", "Netherlands", Some(51.95), Some(4.14)),
            port("Amsterdam", "Netherlands", Some(52.37), Some(4.90)),
            port("Tokyo", "Japan", Some(35.68), Some(139.76)),
            port("Ghost", "Netherlands", None, Some(9.0)),
            port("Lone", "Malta", Some(35.9), Some(14.5)),
            port("Inland", "Nowhere", None, None),
            port("Victoria", "Canada", Some(48.42), Some(-123.37)),
            port("Victoria", "Seychelles", Some(-4.62), Some(55.45)),
        ]
    }

    fn world_camera() -> Camera {
        Camera::new(LatLng::new(20.0, 0.0), 2.0, 1.0, DEFAULT_MAX_ZOOM)
    }

    #[test]
    fn country_plan_encloses_positioned_ports() {
        let plan = plan_for_country(&sample(), " NETHERLANDS", PlannerSettings::default());
        let Some(ViewportInstruction::Bounds { bounds, padding_px }) = plan else {
            panic!("expected bounds, got {plan:?}");
        };
        assert_eq!(padding_px, 40.0);
        assert_eq!(bounds.south_west, LatLng::new(51.95, 4.14));
        assert_eq!(bounds.north_east, LatLng::new(52.37, 4.90));
    }

    #[test]
    fn single_port_country_gives_zero_area_bounds() {
        let plan = plan_for_country(&sample(), "malta", PlannerSettings::default());
        let Some(ViewportInstruction::Bounds { bounds, .. }) = plan else {
            panic!("expected bounds");
        };
        assert_eq!(bounds.lat_span(), 0.0);
        assert_eq!(bounds.lng_span(), 0.0);
        assert_eq!(bounds.center(), LatLng::new(35.9, 14.5));
    }

    #[test]
    fn country_without_coordinates_is_a_no_op() {
        assert_eq!(plan_for_country(&sample(), "Nowhere", PlannerSettings::default()), None);
        assert_eq!(plan_for_country(&sample(), "Atlantis", PlannerSettings::default()), None);
        assert_eq!(plan_for_country(&sample(), "  ", PlannerSettings::default()), None);
    }

    #[test]
    fn port_plan_zooms_in_but_never_out() {
        let settings = PlannerSettings::default();
        let plan = plan_for_port(&sample(), "tokyo", None, 3.0, settings);
        assert_eq!(
            plan,
            Some(ViewportInstruction::Point {
                center: LatLng::new(35.68, 139.76),
                min_zoom: 8.0,
            })
        );
        let plan = plan_for_port(&sample(), "Tokyo", None, 12.0, settings);
        assert!(matches!(
            plan,
            Some(ViewportInstruction::Point { min_zoom, .. }) if min_zoom == 12.0
        ));
    }

    #[test]
    fn port_plan_skips_missing_or_unpositioned() {
        let settings = PlannerSettings::default();
        assert_eq!(plan_for_port(&sample(), "Ghost", None, 2.0, settings), None);
        assert_eq!(plan_for_port(&sample(), "Atlantis", None, 2.0, settings), None);
        assert_eq!(plan_for_port(&sample(), "", None, 2.0, settings), None);
    }

    #[test]
    fn port_plan_respects_country_scope() {
        let settings = PlannerSettings::default();
        let first = plan_for_port(&sample(), "Victoria", None, 2.0, settings);
        assert!(matches!(
            first,
            Some(ViewportInstruction::Point { center, .. }) if center.lat == 48.42
        ));
        let scoped = plan_for_port(&sample(), "Victoria", Some("seychelles"), 2.0, settings);
        assert!(matches!(
            scoped,
            Some(ViewportInstruction::Point { center, .. }) if center.lat == -4.62
        ));
    }

    #[test]
    fn camera_fits_bounds_with_padding() {
        let mut camera = world_camera();
        let size = ViewSize::from_cells(100, 40);
        let bounds = LatLngBounds {
            south_west: LatLng::new(51.95, 4.14),
            north_east: LatLng::new(52.37, 4.90),
        };
        camera.apply(
            &ViewportInstruction::Bounds {
                bounds,
                padding_px: 40.0,
            },
            size,
        );
        assert_eq!(camera.center(), bounds.center());
        let view = camera.visible_bounds(size);
        assert!(view.contains(bounds.south_west));
        assert!(view.contains(bounds.north_east));
        assert_eq!(camera.zoom(), 10.0);
        // One level closer would no longer fit inside the padding.
        let mut closer = camera.clone();
        closer.zoom_by(1.0);
        let deg = closer.degrees_per_px();
        assert!(bounds.lng_span() / deg > size.width_px - 80.0);
    }

    #[test]
    fn camera_fits_zero_area_at_max_zoom() {
        let mut camera = world_camera();
        let point = LatLng::new(35.9, 14.5);
        camera.apply(
            &ViewportInstruction::Bounds {
                bounds: LatLngBounds {
                    south_west: point,
                    north_east: point,
                },
                padding_px: 40.0,
            },
            ViewSize::from_cells(80, 24),
        );
        assert_eq!(camera.center(), point);
        assert_eq!(camera.zoom(), DEFAULT_MAX_ZOOM);
    }

    #[test]
    fn camera_point_and_reset() {
        let mut camera = world_camera();
        let size = ViewSize::from_cells(80, 24);
        camera.apply(
            &ViewportInstruction::Point {
                center: LatLng::new(35.68, 139.76),
                min_zoom: 30.0,
            },
            size,
        );
        assert_eq!(camera.zoom(), DEFAULT_MAX_ZOOM);
        camera.set_max_zoom(9.0);
        assert_eq!(camera.zoom(), 9.0);
        camera.reset();
        assert_eq!(camera.center(), LatLng::new(20.0, 0.0));
        assert_eq!(camera.zoom(), 2.0);
    }

    #[test]
    fn point_at_inverts_view() {
        let camera = world_camera();
        let size = ViewSize::from_cells(80, 24);
        let center = camera.point_at(0.5, 0.5, size);
        assert!((center.lat - 20.0).abs() < 1e-9);
        assert!(center.lng.abs() < 1e-9);
        let view = camera.visible_bounds(size);
        let corner = camera.point_at(0.0, 0.0, size);
        assert!((corner.lat - view.north_east.lat).abs() < 1e-9);
        assert!((corner.lng - view.south_west.lng).abs() < 1e-9);
    }

    #[test]
    fn pan_moves_center_by_view_fraction() {
        let mut camera = world_camera();
        let size = ViewSize::from_cells(80, 24);
        let span = camera.visible_bounds(size).lng_span();
        camera.pan(0.25, 0.0, size);
        assert!((camera.center().lng - span * 0.25).abs() < 1e-9);
    }
}
