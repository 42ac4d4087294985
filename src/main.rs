mod app;
mod cascade;
mod config;
mod coords;
mod layers;
mod logging;
mod map;
mod model;
mod runtime;
mod search;
mod storage;
mod ui;
mod viewport;

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use app::{App, ThemeMode};
use config::parse_args;
use layers::{BaseMap, LayerState};
use logging::init as init_logging;
use runtime::{init_terminal, restore_terminal, run_app};
use storage::load_catalog;
use viewport::{LatLng, PlannerSettings};

fn main() -> Result<()> {
    let config = parse_args()?;
    let _log_guard = init_logging(&config);
    info!("port-atlas starting");
    debug!("config path: {}", config.config_path.display());

    let catalog = Arc::new(load_catalog(Path::new(&config.catalog_file))?);

    let layers = LayerState {
        base_map: BaseMap::from_str(&config.base_map),
        show_ports: config.show_ports,
        show_seamarks: config.show_seamarks,
        show_eez: config.show_eez,
        show_bathymetry: config.show_bathymetry,
        show_railways: config.show_railways,
    };
    let planner = PlannerSettings {
        port_min_zoom: config.port_min_zoom,
        fit_padding_px: config.fit_padding_px,
    };
    let app = App::new(
        catalog,
        config.catalog_file.clone(),
        planner,
        layers,
        ThemeMode::from_str(&config.theme),
        LatLng::new(config.home_lat, config.home_lng),
        config.home_zoom,
        config.min_zoom,
    );

    let mut terminal = init_terminal()?;
    let res = run_app(&mut terminal, app);
    restore_terminal(&mut terminal)?;

    if let Err(err) = res {
        warn!("runtime error: {err}");
        eprintln!("{err}");
    }

    info!("port-atlas exited");
    Ok(())
}
