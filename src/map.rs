use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::canvas::{Canvas, Circle, Line as CanvasLine, Map, MapResolution, Points};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::App;
use crate::layers::Overlay;
use crate::viewport::{LatLng, LatLngBounds, ViewSize};

const HIGH_RES_ZOOM: f64 = 4.0;
const SELECTION_RADIUS_PX: f64 = 12.0;

#[derive(Clone, Copy)]
pub struct MapTheme {
    pub accent: Color,
    pub dim: Color,
    pub highlight: Color,
    pub border: Color,
}

/// Port markers split by how they relate to the current selection.
#[derive(Debug, Default, PartialEq)]
struct MarkerSet {
    others: Vec<(f64, f64)>,
    in_country: Vec<(f64, f64)>,
    selected: Option<(f64, f64, String)>,
}

pub fn render(f: &mut Frame, area: Rect, app: &App, theme: MapTheme) {
    let title = format!(
        "MAP | {} | Z{:.0}",
        app.layers.base_map.label().to_uppercase(),
        app.camera.zoom()
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border))
        .title(title);

    if area.width < 8 || area.height < 5 {
        let paragraph = Paragraph::new(vec![TextLine::from(Span::styled(
            "Map too small",
            Style::default().fg(theme.dim),
        ))])
        .block(block)
        .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
        return;
    }

    let size = ViewSize::from_cells(area.width.saturating_sub(2), area.height.saturating_sub(2));
    let view = app.camera.visible_bounds(size);
    let palette = app.layers.base_map.palette();
    let markers = if app.layers.is_active(Overlay::Ports) {
        collect_markers(app, &view)
    } else {
        MarkerSet::default()
    };
    let resolution = if app.camera.zoom() >= HIGH_RES_ZOOM {
        MapResolution::High
    } else {
        MapResolution::Low
    };
    let step = graticule_step(view.lng_span());
    let radius = SELECTION_RADIUS_PX * app.camera.degrees_per_px();

    let canvas = Canvas::default()
        .block(block)
        .x_bounds([view.south_west.lng, view.north_east.lng])
        .y_bounds([view.south_west.lat, view.north_east.lat])
        .background_color(palette.water)
        .marker(Marker::Braille)
        .paint(|ctx| {
            for lng in graticule(view.south_west.lng, view.north_east.lng, step) {
                ctx.draw(&CanvasLine {
                    x1: lng,
                    y1: view.south_west.lat.max(-90.0),
                    x2: lng,
                    y2: view.north_east.lat.min(90.0),
                    color: theme.dim,
                });
            }
            for lat in graticule(view.south_west.lat.max(-90.0), view.north_east.lat.min(90.0), step)
            {
                ctx.draw(&CanvasLine {
                    x1: view.south_west.lng,
                    y1: lat,
                    x2: view.north_east.lng,
                    y2: lat,
                    color: theme.dim,
                });
            }
            ctx.draw(&Map {
                color: palette.land,
                resolution,
            });
            ctx.layer();
            if !markers.others.is_empty() {
                ctx.draw(&Points {
                    coords: &markers.others,
                    color: palette.marker,
                });
            }
            if !markers.in_country.is_empty() {
                ctx.draw(&Points {
                    coords: &markers.in_country,
                    color: theme.accent,
                });
            }
            if let Some((lng, lat, label)) = &markers.selected {
                ctx.draw(&Circle {
                    x: *lng,
                    y: *lat,
                    radius,
                    color: theme.highlight,
                });
                ctx.layer();
                ctx.print(
                    *lng + radius,
                    *lat,
                    Span::styled(
                        label.clone(),
                        Style::default()
                            .fg(theme.highlight)
                            .add_modifier(Modifier::BOLD),
                    ),
                );
            }
        });
    f.render_widget(canvas, area);
}

fn collect_markers(app: &App, view: &LatLngBounds) -> MarkerSet {
    let mut markers = MarkerSet::default();
    for (record, (lat, lng)) in app.catalog.positioned() {
        if !view.contains(LatLng::new(lat, lng)) {
            continue;
        }
        if app.in_selected_country(record) {
            markers.in_country.push((lng, lat));
        } else {
            markers.others.push((lng, lat));
        }
    }
    markers.selected = app.selected_port_record().and_then(|record| {
        let (lat, lng) = record.position()?;
        Some((lng, lat, record.name_text().to_string()))
    });
    markers
}

/// Grid spacing in degrees giving a handful of lines across the view.
fn graticule_step(span: f64) -> f64 {
    const STEPS: [f64; 9] = [0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 15.0, 30.0];
    STEPS
        .into_iter()
        .find(|step| span / step <= 8.0)
        .unwrap_or(30.0)
}

fn graticule(from: f64, to: f64, step: f64) -> impl Iterator<Item = f64> {
    let first = (from / step).ceil() as i64;
    let last = (to / step).floor() as i64;
    (first..=last).map(move |i| i as f64 * step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ThemeMode;
    use crate::layers::LayerState;
    use crate::model::{Catalog, PortRecord};
    use crate::viewport::PlannerSettings;
    use std::sync::Arc;

    fn port(name: &str, country: &str, lat: Option<f64>, lng: Option<f64>) -> PortRecord {
        PortRecord {
            id: name.to_ascii_lowercase(),
            name: Some(name.to_string()),
            country: Some(country.to_string()),
            lat,
            lng,
        }
    }

    fn app() -> App {
        let catalog = Catalog::new(vec![
            port("Rotterdam", "Netherlands", Some(51.95), Some(4.14)),
            port("Tokyo", "Japan", Some(35.68), Some(139.76)),
            port("Nowhere", "Japan", None, Some(1.0)),
        ]);
        App::new(
            Arc::new(catalog),
            "test".to_string(),
            PlannerSettings::default(),
            LayerState::default(),
            ThemeMode::Default,
            LatLng::new(20.0, 0.0),
            2.0,
            1.0,
        )
    }

    fn world() -> LatLngBounds {
        LatLngBounds {
            south_west: LatLng::new(-90.0, -180.0),
            north_east: LatLng::new(90.0, 180.0),
        }
    }

    #[test]
    fn markers_split_by_country_selection() {
        let mut app = app();
        let markers = collect_markers(&app, &world());
        assert_eq!(markers.others, vec![(4.14, 51.95), (139.76, 35.68)]);
        assert!(markers.in_country.is_empty());
        assert!(markers.selected.is_none());

        app.start_country_edit();
        app.set_active_text("Japan".to_string());
        app.start_port_edit();
        app.set_active_text("Tokyo".to_string());
        let markers = collect_markers(&app, &world());
        assert_eq!(markers.others, vec![(4.14, 51.95)]);
        assert_eq!(markers.in_country, vec![(139.76, 35.68)]);
        assert_eq!(markers.selected, Some((139.76, 35.68, "Tokyo".to_string())));
    }

    #[test]
    fn markers_outside_view_are_skipped() {
        let app = app();
        let view = LatLngBounds {
            south_west: LatLng::new(50.0, 0.0),
            north_east: LatLng::new(55.0, 10.0),
        };
        let markers = collect_markers(&app, &view);
        assert_eq!(markers.others, vec![(4.14, 51.95)]);
    }

    #[test]
    fn graticule_step_scales_with_span() {
        assert_eq!(graticule_step(360.0), 30.0);
        assert_eq!(graticule_step(60.0), 10.0);
        assert_eq!(graticule_step(0.3), 0.05);
        let lines: Vec<f64> = graticule(-25.0, 25.0, 10.0).collect();
        assert_eq!(lines, vec![-20.0, -10.0, 0.0, 10.0, 20.0]);
    }
}
