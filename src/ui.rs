use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use std::time::SystemTime;

use crate::app::{App, InputMode, ThemeMode};
use crate::cascade::CascadePhase;
use crate::coords::format_dms;
use crate::layers::{layer_items, LayerItem, LayerState};
use crate::map::{self, MapTheme};

struct Theme {
    accent: Color,
    warn: Color,
    dim: Color,
    text: Color,
    highlight_fg: Color,
    highlight_bg: Color,
    selected: Color,
    border: Color,
    panel_bg: Color,
}

pub fn ui(f: &mut Frame, app: &mut App) {
    let size = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(size);

    let search = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(38),
            Constraint::Percentage(38),
            Constraint::Percentage(24),
        ])
        .split(chunks[0]);

    render_field(f, search[0], app, InputMode::Country);
    render_field(f, search[1], app, InputMode::Port);
    render_phase(f, search[2], app);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(34)])
        .split(chunks[1]);

    app.set_map_area(body[0]);
    let theme = theme(app.theme_mode);
    map::render(
        f,
        body[0],
        app,
        MapTheme {
            accent: theme.accent,
            dim: theme.dim,
            highlight: theme.selected,
            border: theme.border,
        },
    );

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(7),
            Constraint::Length(8),
        ])
        .split(body[1]);

    render_zoom(f, side[0], app);
    render_coordinates(f, side[1], app);
    render_details(f, side[2], app);
    render_layer_status(f, side[3], app);

    render_footer(f, chunks[2], app);

    match app.input_mode {
        InputMode::Country => {
            render_suggestions(f, search[0], chunks[1], app);
            set_field_cursor(f, search[0], app);
        }
        InputMode::Port => {
            render_suggestions(f, search[1], chunks[1], app);
            set_field_cursor(f, search[1], app);
        }
        InputMode::Layers => render_layers_menu(f, size, app),
        InputMode::Help => render_help_menu(f, size, app),
        InputMode::Normal => {}
    }
}

fn render_field(f: &mut Frame, area: Rect, app: &App, field: InputMode) {
    let theme = theme(app.theme_mode);
    let state = app.cascade.state();
    let (title, text, resolved) = match field {
        InputMode::Country => (
            "COUNTRY [/]",
            state.country_text.as_str(),
            app.cascade.selected_country().is_some(),
        ),
        _ => (
            "PORT [p]",
            state.port_text.as_str(),
            app.cascade.selected_port().is_some(),
        ),
    };
    let focused = app.input_mode == field;
    let border = if focused { theme.accent } else { theme.border };
    let value = if text.is_empty() {
        Span::styled(field_placeholder(field), Style::default().fg(theme.dim))
    } else if resolved {
        Span::styled(
            text.to_string(),
            Style::default()
                .fg(theme.selected)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(text.to_string(), Style::default().fg(theme.text))
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .title(title);
    let paragraph = Paragraph::new(Line::from(value))
        .block(block)
        .style(Style::default().bg(theme.panel_bg));
    f.render_widget(paragraph, area);
}

fn field_placeholder(field: InputMode) -> &'static str {
    match field {
        InputMode::Country => "Type a country...",
        _ => "Type a port...",
    }
}

fn render_phase(f: &mut Frame, area: Rect, app: &App) {
    let theme = theme(app.theme_mode);
    let phase = app.phase();
    let color = match phase {
        CascadePhase::Unconstrained => theme.dim,
        CascadePhase::PortSelected | CascadePhase::CountrySelected => theme.accent,
        CascadePhase::CountryAndPortSelected => theme.selected,
    };
    let ports = app.cascade.port_options().len();
    let line = Line::from(vec![
        Span::styled(
            phase.label(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {ports} ports"), Style::default().fg(theme.dim)),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border))
        .title("SEARCH");
    let paragraph = Paragraph::new(line)
        .block(block)
        .style(Style::default().bg(theme.panel_bg));
    f.render_widget(paragraph, area);
}

fn set_field_cursor(f: &mut Frame, area: Rect, app: &App) {
    let inner_width = area.width.saturating_sub(2);
    if inner_width == 0 {
        return;
    }
    let offset = (text_len(app.active_text()) as u16).min(inner_width - 1);
    f.set_cursor_position((area.x + 1 + offset, area.y + 1));
}

fn render_suggestions(f: &mut Frame, field: Rect, body: Rect, app: &App) {
    let hints = app.suggestions();
    let Some(popup) = suggestion_area(field, body, hints.len()) else {
        return;
    };
    let theme = theme(app.theme_mode);
    f.render_widget(Clear, popup);

    let width = popup.width.saturating_sub(4) as usize;
    let lines: Vec<Line> = if hints.is_empty() {
        vec![Line::from(Span::styled(
            "No matches",
            Style::default().fg(theme.dim),
        ))]
    } else {
        hints
            .iter()
            .enumerate()
            .map(|(i, hint)| {
                let text = format!(" {}", truncate(hint, width));
                if Some(i) == app.suggestion_cursor {
                    Line::from(Span::styled(
                        text,
                        Style::default()
                            .fg(theme.highlight_fg)
                            .bg(theme.highlight_bg)
                            .add_modifier(Modifier::BOLD),
                    ))
                } else {
                    Line::from(Span::styled(text, Style::default().fg(theme.text)))
                }
            })
            .collect()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.accent))
        .title("SUGGESTIONS");
    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(theme.panel_bg));
    f.render_widget(paragraph, popup);
}

/// Dropdown rectangle under a search field, kept inside the body area.
fn suggestion_area(field: Rect, body: Rect, count: usize) -> Option<Rect> {
    let rows = count.max(1) as u16 + 2;
    let height = rows.min(body.height);
    if height < 3 || field.width < 6 {
        return None;
    }
    Some(Rect::new(field.x, body.y, field.width, height))
}

fn render_zoom(f: &mut Frame, area: Rect, app: &App) {
    let theme = theme(app.theme_mode);
    let line = Line::from(vec![
        Span::styled(
            format!("Z {:.0}", app.camera.zoom()),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  max {:.0}", app.camera.max_zoom()),
            Style::default().fg(theme.dim),
        ),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border))
        .title("ZOOM");
    let paragraph = Paragraph::new(line)
        .block(block)
        .style(Style::default().bg(theme.panel_bg));
    f.render_widget(paragraph, area);
}

fn render_coordinates(f: &mut Frame, area: Rect, app: &App) {
    let theme = theme(app.theme_mode);
    let lines = match &app.pointer {
        Some(coords) => vec![
            Line::from(Span::styled(coords.lat.clone(), Style::default().fg(theme.text))),
            Line::from(Span::styled(coords.lng.clone(), Style::default().fg(theme.text))),
            Line::from(Span::styled(coords.raw.clone(), Style::default().fg(theme.dim))),
        ],
        None => vec![Line::from(Span::styled(
            "Move the mouse over the map",
            Style::default().fg(theme.dim),
        ))],
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border))
        .title("COORDINATES");
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true })
        .style(Style::default().bg(theme.panel_bg));
    f.render_widget(paragraph, area);
}

fn render_details(f: &mut Frame, area: Rect, app: &App) {
    let theme = theme(app.theme_mode);
    let label = |key: &str| Span::styled(format!("{key:<8}"), Style::default().fg(theme.dim));
    let lines = match app.selected_port_record() {
        Some(record) => {
            let mut lines = vec![
                Line::from(vec![
                    label("NAME"),
                    Span::styled(
                        fmt_text(record.name.as_deref()),
                        Style::default()
                            .fg(theme.selected)
                            .add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(vec![
                    label("COUNTRY"),
                    Span::raw(fmt_text(record.country.as_deref())),
                ]),
                Line::from(vec![label("ID"), Span::raw(fmt_text(Some(record.id.as_str())))]),
            ];
            match record.position() {
                Some((lat, lng)) => {
                    let coords = format_dms(lat, lng);
                    lines.push(Line::from(vec![label("LAT"), Span::raw(coords.lat)]));
                    lines.push(Line::from(vec![label("LNG"), Span::raw(coords.lng)]));
                }
                None => lines.push(Line::from(vec![label("POS"), Span::raw("--")])),
            }
            lines
        }
        None => vec![Line::from(Span::styled(
            "No port selected",
            Style::default().fg(theme.dim),
        ))],
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border))
        .title("PORT");
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true })
        .style(Style::default().bg(theme.panel_bg));
    f.render_widget(paragraph, area);
}

fn render_layer_status(f: &mut Frame, area: Rect, app: &App) {
    let theme = theme(app.theme_mode);
    let width = area.width.saturating_sub(4) as usize;
    let mut lines = vec![Line::from(Span::styled(
        truncate(app.layers.base_map.label(), width),
        Style::default().fg(theme.accent),
    ))];
    for overlay in app.layers.active_overlays() {
        let source = overlay
            .source()
            .map(short_source)
            .unwrap_or_else(|| app.catalog_label.clone());
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<9}", overlay.short_label()),
                Style::default().fg(theme.text),
            ),
            Span::styled(
                truncate(&source, width.saturating_sub(9)),
                Style::default().fg(theme.dim),
            ),
        ]));
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border))
        .title("LAYERS [L]");
    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(theme.panel_bg));
    f.render_widget(paragraph, area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let theme = theme(app.theme_mode);
    let help = if app.input_mode.is_editing() {
        "type to search  Up/Down pick  Tab/Enter accept  Ctrl+U clear  Esc done"
    } else {
        "q quit  / country  p port  r reset  +/- zoom  arrows pan  L layers  t theme  ? help"
    };
    let mut spans = vec![Span::styled(help, Style::default().fg(theme.dim))];
    spans.push(Span::styled(
        format!(
            "  SRC {}  {}  THEME {}",
            short_source(app.layers.base_map.tile_url()),
            overlay_summary(&app.layers),
            app.theme_mode.label()
        ),
        Style::default().fg(theme.dim),
    ));
    if let Some(message) = app.current_notice(SystemTime::now()) {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            message.to_string(),
            Style::default().fg(theme.warn).add_modifier(Modifier::BOLD),
        ));
    }
    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(theme.panel_bg));
    f.render_widget(paragraph, area);
}

fn overlay_summary(layers: &LayerState) -> String {
    let active: Vec<&str> = layers
        .active_overlays()
        .into_iter()
        .map(|o| o.short_label())
        .collect();
    if active.is_empty() {
        "OVL --".to_string()
    } else {
        format!("OVL {}", active.join(","))
    }
}

fn render_layers_menu(f: &mut Frame, area: Rect, app: &App) {
    let theme = theme(app.theme_mode);
    let items = layer_items();
    let popup = centered_rect(50, items.len() as u16 + 6, area);

    f.render_widget(Clear, popup);

    let mut lines = vec![Line::from(Span::styled(
        "Base maps",
        Style::default().fg(theme.dim).add_modifier(Modifier::BOLD),
    ))];
    for (i, item) in items.iter().enumerate() {
        if i > 0 && matches!(item, LayerItem::Overlay(_)) && matches!(items[i - 1], LayerItem::Base(_))
        {
            lines.push(Line::from(Span::styled(
                "Overlays",
                Style::default().fg(theme.dim).add_modifier(Modifier::BOLD),
            )));
        }
        let text = layer_item_text(item, &app.layers);
        let line = if i == app.layer_cursor {
            Line::from(Span::styled(
                text,
                Style::default()
                    .fg(theme.highlight_fg)
                    .bg(theme.highlight_bg)
                    .add_modifier(Modifier::BOLD),
            ))
        } else {
            Line::from(Span::styled(text, Style::default().fg(theme.text)))
        };
        lines.push(line);
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Up/Down move • Space/Enter select • Esc close",
        Style::default().fg(theme.dim),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title("LAYERS");
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true })
        .style(Style::default().bg(theme.panel_bg));
    f.render_widget(paragraph, popup);
}

fn layer_item_text(item: &LayerItem, layers: &LayerState) -> String {
    match item {
        LayerItem::Base(map) => {
            let marker = if layers.base_map == *map { "(•)" } else { "( )" };
            format!(" {marker} {}", map.label())
        }
        LayerItem::Overlay(overlay) => {
            let marker = if layers.is_active(*overlay) { "[x]" } else { "[ ]" };
            format!(" {marker} {}", overlay.label())
        }
    }
}

fn render_help_menu(f: &mut Frame, area: Rect, app: &App) {
    let theme = theme(app.theme_mode);
    let popup = centered_rect(70, 26, area);

    f.render_widget(Clear, popup);

    let heading = |text: &'static str| {
        Line::from(Span::styled(
            text,
            Style::default().fg(theme.dim).add_modifier(Modifier::BOLD),
        ))
    };
    let lines = vec![
        Line::from(Span::styled(
            "HELP",
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        )),
        heading("Search"),
        Line::from("  / or c     Edit country (filters the port list)"),
        Line::from("  p          Edit port"),
        Line::from("  Up/Down    Move through suggestions"),
        Line::from("  Tab/Enter  Accept suggestion (Enter also leaves the field)"),
        Line::from("  Ctrl+U     Clear field • Esc leave field"),
        Line::from("  r          Reset search and view"),
        Line::from(""),
        heading("Map"),
        Line::from("  + / -      Zoom in / out"),
        Line::from("  Arrows     Pan"),
        Line::from("  Mouse      Move for coordinates • Wheel to zoom"),
        Line::from(""),
        heading("Display"),
        Line::from("  L          Layers menu (base maps and overlays)"),
        Line::from("  t          Toggle theme"),
        Line::from(""),
        heading("Quit"),
        Line::from("  q          Quit"),
        Line::from("  ? / h      Toggle help"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Esc to close",
            Style::default().fg(theme.dim),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title("HELP");
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true })
        .style(Style::default().bg(theme.panel_bg));
    f.render_widget(paragraph, popup);
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let height = height.min(area.height.saturating_sub(2)).max(3);
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(height),
            Constraint::Min(1),
        ])
        .split(area);
    let vertical = popup_layout[1];
    let width = (vertical.width * percent_x / 100).max(20);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(width),
            Constraint::Min(1),
        ])
        .split(vertical);
    horizontal[1]
}

fn fmt_text(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => "--".to_string(),
    }
}

fn text_len(value: &str) -> usize {
    value.chars().count()
}

fn truncate(value: &str, max: usize) -> String {
    if text_len(value) <= max {
        value.to_string()
    } else if max <= 3 {
        value.chars().take(max).collect()
    } else {
        let head: String = value.chars().take(max - 3).collect();
        format!("{head}...")
    }
}

fn short_source(url: &str) -> String {
    let mut text = url.trim().to_string();
    if let Some(pos) = text.find("://") {
        text = text[(pos + 3)..].to_string();
    }
    if let Some(stripped) = text.strip_prefix("{s}.") {
        text = stripped.to_string();
    }
    if let Some(pos) = text.find('/') {
        text.truncate(pos);
    }
    if text.len() > 24 {
        text = truncate(&text, 24);
    }
    if text.is_empty() {
        "--".to_string()
    } else {
        text
    }
}

fn theme(mode: ThemeMode) -> Theme {
    match mode {
        ThemeMode::Default => Theme {
            accent: Color::Yellow,
            warn: Color::Yellow,
            dim: Color::DarkGray,
            text: Color::Gray,
            highlight_fg: Color::Black,
            highlight_bg: Color::Rgb(200, 200, 200),
            selected: Color::LightGreen,
            border: Color::Rgb(70, 70, 80),
            panel_bg: Color::Rgb(18, 18, 22),
        },
        ThemeMode::ColorBlind => Theme {
            accent: Color::Cyan,
            warn: Color::LightCyan,
            dim: Color::DarkGray,
            text: Color::Gray,
            highlight_fg: Color::Black,
            highlight_bg: Color::LightCyan,
            selected: Color::Yellow,
            border: Color::Rgb(60, 80, 90),
            panel_bg: Color::Rgb(14, 20, 24),
        },
        ThemeMode::Amber => Theme {
            accent: Color::Rgb(255, 191, 0),
            warn: Color::Rgb(255, 220, 120),
            dim: Color::Rgb(140, 110, 40),
            text: Color::Rgb(230, 200, 140),
            highlight_fg: Color::Black,
            highlight_bg: Color::Rgb(255, 220, 120),
            selected: Color::Rgb(255, 240, 180),
            border: Color::Rgb(100, 80, 30),
            panel_bg: Color::Rgb(24, 18, 10),
        },
        ThemeMode::Ocean => Theme {
            accent: Color::Rgb(0, 200, 220),
            warn: Color::LightBlue,
            dim: Color::Rgb(80, 120, 130),
            text: Color::Rgb(180, 220, 230),
            highlight_fg: Color::Black,
            highlight_bg: Color::Rgb(0, 200, 220),
            selected: Color::LightYellow,
            border: Color::Rgb(30, 70, 90),
            panel_bg: Color::Rgb(10, 18, 24),
        },
        ThemeMode::Matrix => Theme {
            accent: Color::Green,
            warn: Color::LightGreen,
            dim: Color::Rgb(0, 120, 0),
            text: Color::Rgb(120, 220, 120),
            highlight_fg: Color::Black,
            highlight_bg: Color::Green,
            selected: Color::LightGreen,
            border: Color::Rgb(0, 80, 0),
            panel_bg: Color::Rgb(0, 16, 0),
        },
        ThemeMode::Monochrome => Theme {
            accent: Color::White,
            warn: Color::White,
            dim: Color::DarkGray,
            text: Color::Gray,
            highlight_fg: Color::Black,
            highlight_bg: Color::White,
            selected: Color::White,
            border: Color::DarkGray,
            panel_bg: Color::Black,
        },
    }
}
