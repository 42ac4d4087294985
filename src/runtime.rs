use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::time::Duration;

use crate::app::{App, InputMode};
use crate::ui;

pub fn init_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

pub fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

pub fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, mut app: App) -> Result<()> {
    let tick_rate = Duration::from_millis(50);
    loop {
        terminal.draw(|f| ui::ui(f, &mut app))?;

        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    if handle_key(&mut app, key) == Flow::Quit {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                _ => {}
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

fn handle_key(app: &mut App, key: KeyEvent) -> Flow {
    match app.input_mode {
        InputMode::Normal => match key.code {
            KeyCode::Char('q') => return Flow::Quit,
            KeyCode::Char('/') | KeyCode::Char('c') => app.start_country_edit(),
            KeyCode::Char('p') => app.start_port_edit(),
            KeyCode::Char('r') => app.reset(),
            KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
            KeyCode::Char('-') => app.zoom_out(),
            KeyCode::Left => app.pan(-1.0, 0.0),
            KeyCode::Right => app.pan(1.0, 0.0),
            KeyCode::Up => app.pan(0.0, 1.0),
            KeyCode::Down => app.pan(0.0, -1.0),
            KeyCode::Char('L') => app.open_layers(),
            KeyCode::Char('t') => app.toggle_theme(),
            KeyCode::Char('?') | KeyCode::Char('h') => app.open_help(),
            _ => {}
        },
        InputMode::Country | InputMode::Port => match key.code {
            KeyCode::Esc => app.stop_edit(),
            KeyCode::Enter => {
                app.accept_suggestion();
                app.stop_edit();
            }
            KeyCode::Tab => {
                app.accept_suggestion();
            }
            KeyCode::Up => app.previous_suggestion(),
            KeyCode::Down => app.next_suggestion(),
            KeyCode::Backspace => app.backspace(),
            KeyCode::Char(ch) if key.modifiers.contains(KeyModifiers::CONTROL) => {
                if ch == 'u' {
                    app.clear_field();
                }
            }
            KeyCode::Char(ch) => app.push_char(ch),
            _ => {}
        },
        InputMode::Layers => match key.code {
            KeyCode::Esc | KeyCode::Char('L') => app.close_layers(),
            KeyCode::Up => app.previous_layer(),
            KeyCode::Down => app.next_layer(),
            KeyCode::Enter | KeyCode::Char(' ') => app.activate_layer(),
            _ => {}
        },
        InputMode::Help => match key.code {
            KeyCode::Esc => app.close_help(),
            KeyCode::Char('?') | KeyCode::Char('h') => app.close_help(),
            _ => {}
        },
    }
    Flow::Continue
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(_) => app.hover(mouse.column, mouse.row),
        MouseEventKind::ScrollUp if app.map_contains(mouse.column, mouse.row) => app.zoom_in(),
        MouseEventKind::ScrollDown if app.map_contains(mouse.column, mouse.row) => app.zoom_out(),
        _ => {}
    }
}
