use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "port-atlas.toml";
pub const DEFAULT_CATALOG_FILE: &str = "data/ports.json";
pub const DEFAULT_LOG_FILE: &str = "port-atlas.log";
pub const DEFAULT_THEME: &str = "default";
pub const DEFAULT_BASE_MAP: &str = "osm";
pub const DEFAULT_SHOW_PORTS: bool = true;
pub const DEFAULT_SHOW_SEAMARKS: bool = true;
pub const DEFAULT_SHOW_EEZ: bool = true;
pub const DEFAULT_SHOW_BATHYMETRY: bool = true;
pub const DEFAULT_SHOW_RAILWAYS: bool = false;
pub const DEFAULT_HOME_LAT: f64 = 20.0;
pub const DEFAULT_HOME_LNG: f64 = 0.0;
pub const DEFAULT_HOME_ZOOM: f64 = 2.0;
pub const DEFAULT_MIN_ZOOM: f64 = 1.0;
pub const DEFAULT_PORT_MIN_ZOOM: f64 = 8.0;
pub const DEFAULT_FIT_PADDING_PX: f64 = 40.0;

const ENV_PREFIX: &str = "PORT_ATLAS_";

#[derive(Debug, Clone)]
pub struct Config {
    pub config_path: PathBuf,
    pub catalog_file: String,
    pub log_enabled: bool,
    pub log_level: String,
    pub log_file: String,
    pub theme: String,
    pub base_map: String,
    pub show_ports: bool,
    pub show_seamarks: bool,
    pub show_eez: bool,
    pub show_bathymetry: bool,
    pub show_railways: bool,
    pub home_lat: f64,
    pub home_lng: f64,
    pub home_zoom: f64,
    pub min_zoom: f64,
    pub port_min_zoom: f64,
    pub fit_padding_px: f64,
}

impl Config {
    fn defaults(config_path: PathBuf) -> Self {
        Self {
            config_path,
            catalog_file: DEFAULT_CATALOG_FILE.to_string(),
            log_enabled: false,
            log_level: "info".to_string(),
            log_file: DEFAULT_LOG_FILE.to_string(),
            theme: DEFAULT_THEME.to_string(),
            base_map: DEFAULT_BASE_MAP.to_string(),
            show_ports: DEFAULT_SHOW_PORTS,
            show_seamarks: DEFAULT_SHOW_SEAMARKS,
            show_eez: DEFAULT_SHOW_EEZ,
            show_bathymetry: DEFAULT_SHOW_BATHYMETRY,
            show_railways: DEFAULT_SHOW_RAILWAYS,
            home_lat: DEFAULT_HOME_LAT,
            home_lng: DEFAULT_HOME_LNG,
            home_zoom: DEFAULT_HOME_ZOOM,
            min_zoom: DEFAULT_MIN_ZOOM,
            port_min_zoom: DEFAULT_PORT_MIN_ZOOM,
            fit_padding_px: DEFAULT_FIT_PADDING_PX,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    catalog_file: Option<String>,
    log_enabled: Option<bool>,
    log_level: Option<String>,
    log_file: Option<String>,
    theme: Option<String>,
    base_map: Option<String>,
    show_ports: Option<bool>,
    show_seamarks: Option<bool>,
    show_eez: Option<bool>,
    show_bathymetry: Option<bool>,
    show_railways: Option<bool>,
    home_lat: Option<f64>,
    home_lng: Option<f64>,
    home_zoom: Option<f64>,
    min_zoom: Option<f64>,
    port_min_zoom: Option<f64>,
    fit_padding_px: Option<f64>,
}

pub fn parse_args() -> Result<Config> {
    let args: Vec<String> = env::args().skip(1).collect();
    let env_config = env::var(format!("{ENV_PREFIX}CONFIG")).ok();
    let mut config = resolve_file_layer(&args, env_config)?;
    apply_env(&mut config, |key| env::var(format!("{ENV_PREFIX}{key}")).ok());
    apply_cli(&mut config, &args)?;
    clamp(&mut config);
    Ok(config)
}

fn resolve_file_layer(args: &[String], env_config: Option<String>) -> Result<Config> {
    let mut explicit_config: Option<PathBuf> = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            let value = iter
                .next()
                .ok_or_else(|| anyhow!("--config needs a value"))?;
            explicit_config = Some(PathBuf::from(value));
        }
    }

    let config_path = explicit_config
        .clone()
        .or(env_config.map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let mut config = Config::defaults(config_path.clone());
    if config_path.exists() {
        if let Some(file_config) = load_file_config(&config_path)? {
            apply_file_config(&mut config, file_config);
        }
    } else if explicit_config.is_some() {
        return Err(anyhow!("Config file not found: {}", config_path.display()));
    }
    Ok(config)
}

fn load_file_config(path: &Path) -> Result<Option<FileConfig>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let cfg: FileConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;
    Ok(Some(cfg))
}

fn apply_file_config(target: &mut Config, file: FileConfig) {
    if let Some(catalog_file) = file.catalog_file {
        target.catalog_file = catalog_file;
    }
    if let Some(log_enabled) = file.log_enabled {
        target.log_enabled = log_enabled;
    }
    if let Some(log_level) = file.log_level {
        target.log_level = log_level;
    }
    if let Some(log_file) = file.log_file {
        target.log_file = log_file;
    }
    if let Some(theme) = file.theme {
        target.theme = theme;
    }
    if let Some(base_map) = file.base_map {
        target.base_map = base_map;
    }
    if let Some(show_ports) = file.show_ports {
        target.show_ports = show_ports;
    }
    if let Some(show_seamarks) = file.show_seamarks {
        target.show_seamarks = show_seamarks;
    }
    if let Some(show_eez) = file.show_eez {
        target.show_eez = show_eez;
    }
    if let Some(show_bathymetry) = file.show_bathymetry {
        target.show_bathymetry = show_bathymetry;
    }
    if let Some(show_railways) = file.show_railways {
        target.show_railways = show_railways;
    }
    if let Some(home_lat) = file.home_lat {
        target.home_lat = home_lat;
    }
    if let Some(home_lng) = file.home_lng {
        target.home_lng = home_lng;
    }
    if let Some(home_zoom) = file.home_zoom {
        target.home_zoom = home_zoom;
    }
    if let Some(min_zoom) = file.min_zoom {
        target.min_zoom = min_zoom;
    }
    if let Some(port_min_zoom) = file.port_min_zoom {
        target.port_min_zoom = port_min_zoom;
    }
    if let Some(fit_padding_px) = file.fit_padding_px {
        target.fit_padding_px = fit_padding_px;
    }
    clamp(target);
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn apply_env<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup("CATALOG") {
        config.catalog_file = value;
    }
    if let Some(value) = lookup("LOG_ENABLED") {
        config.log_enabled = parse_flag(&value);
    }
    if let Some(value) = lookup("LOG_LEVEL") {
        config.log_level = value;
    }
    if let Some(value) = lookup("LOG_FILE") {
        config.log_file = value;
    }
    if let Some(value) = lookup("THEME") {
        config.theme = value;
    }
    if let Some(value) = lookup("BASE_MAP") {
        config.base_map = value;
    }
    if let Some(value) = lookup("SHOW_PORTS") {
        config.show_ports = parse_flag(&value);
    }
    if let Some(value) = lookup("SHOW_SEAMARKS") {
        config.show_seamarks = parse_flag(&value);
    }
    if let Some(value) = lookup("SHOW_EEZ") {
        config.show_eez = parse_flag(&value);
    }
    if let Some(value) = lookup("SHOW_BATHYMETRY") {
        config.show_bathymetry = parse_flag(&value);
    }
    if let Some(value) = lookup("SHOW_RAILWAYS") {
        config.show_railways = parse_flag(&value);
    }
    if let Some(value) = lookup("HOME_LAT") {
        if let Ok(val) = value.parse::<f64>() {
            config.home_lat = val;
        }
    }
    if let Some(value) = lookup("HOME_LNG") {
        if let Ok(val) = value.parse::<f64>() {
            config.home_lng = val;
        }
    }
    if let Some(value) = lookup("HOME_ZOOM") {
        if let Ok(val) = value.parse::<f64>() {
            config.home_zoom = val;
        }
    }
    if let Some(value) = lookup("MIN_ZOOM") {
        if let Ok(val) = value.parse::<f64>() {
            config.min_zoom = val;
        }
    }
    if let Some(value) = lookup("PORT_MIN_ZOOM") {
        if let Ok(val) = value.parse::<f64>() {
            config.port_min_zoom = val;
        }
    }
    if let Some(value) = lookup("FIT_PADDING_PX") {
        if let Ok(val) = value.parse::<f64>() {
            config.fit_padding_px = val;
        }
    }
}

fn apply_cli(config: &mut Config, args: &[String]) -> Result<()> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                iter.next();
            }
            "--catalog" => {
                config.catalog_file = iter
                    .next()
                    .ok_or_else(|| anyhow!("--catalog needs a value"))?
                    .to_string();
            }
            "--log" => {
                config.log_enabled = true;
            }
            "--no-log" => {
                config.log_enabled = false;
            }
            "--log-level" => {
                config.log_level = iter
                    .next()
                    .ok_or_else(|| anyhow!("--log-level needs a value"))?
                    .to_string();
            }
            "--log-file" => {
                config.log_file = iter
                    .next()
                    .ok_or_else(|| anyhow!("--log-file needs a value"))?
                    .to_string();
            }
            "--theme" => {
                config.theme = iter
                    .next()
                    .ok_or_else(|| anyhow!("--theme needs a value"))?
                    .to_string();
            }
            "--base-map" => {
                config.base_map = iter
                    .next()
                    .ok_or_else(|| anyhow!("--base-map needs a value"))?
                    .to_string();
            }
            "--hide-ports" => {
                config.show_ports = false;
            }
            "--no-seamarks" => {
                config.show_seamarks = false;
            }
            "--no-eez" => {
                config.show_eez = false;
            }
            "--no-bathymetry" => {
                config.show_bathymetry = false;
            }
            "--railways" => {
                config.show_railways = true;
            }
            "--home-lat" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--home-lat needs a value"))?;
                config.home_lat = value.parse()?;
            }
            "--home-lng" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--home-lng needs a value"))?;
                config.home_lng = value.parse()?;
            }
            "--home-zoom" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--home-zoom needs a value"))?;
                config.home_zoom = value.parse()?;
            }
            "--min-zoom" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--min-zoom needs a value"))?;
                config.min_zoom = value.parse()?;
            }
            "--port-zoom" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--port-zoom needs a value"))?;
                config.port_min_zoom = value.parse()?;
            }
            "--fit-padding" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--fit-padding needs a value"))?;
                config.fit_padding_px = value.parse()?;
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => {
                return Err(anyhow!("Unknown argument: {other}"));
            }
        }
    }
    Ok(())
}

fn clamp(config: &mut Config) {
    if !config.home_lat.is_finite() {
        config.home_lat = DEFAULT_HOME_LAT;
    }
    if !config.home_lng.is_finite() {
        config.home_lng = DEFAULT_HOME_LNG;
    }
    config.home_lat = config.home_lat.clamp(-90.0, 90.0);
    config.home_lng = config.home_lng.clamp(-180.0, 180.0);
    config.min_zoom = finite_or(config.min_zoom, DEFAULT_MIN_ZOOM).clamp(0.0, 18.0);
    config.home_zoom = finite_or(config.home_zoom, DEFAULT_HOME_ZOOM).clamp(config.min_zoom, 18.0);
    config.port_min_zoom = finite_or(config.port_min_zoom, DEFAULT_PORT_MIN_ZOOM).clamp(0.0, 18.0);
    config.fit_padding_px = finite_or(config.fit_padding_px, DEFAULT_FIT_PADDING_PX).max(0.0);
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

fn print_help() {
    println!("port-atlas");
    println!("Usage: port-atlas [--config PATH] [--catalog PATH]");
    println!("       [--log] [--no-log] [--log-level LEVEL] [--log-file PATH]");
    println!("       [--theme default|color|amber|ocean|matrix|mono] [--base-map KEY]");
    println!("       [--hide-ports] [--no-seamarks] [--no-eez] [--no-bathymetry] [--railways]");
    println!("       [--home-lat DEG] [--home-lng DEG] [--home-zoom Z] [--min-zoom Z]");
    println!("       [--port-zoom Z] [--fit-padding PX]");
    println!("Base maps: osm osmHot cyclOSM cartoLight cartoDark cartoVoyager esriSat");
    println!("           esriStreet esriTopo nasaBlueMarble nasaNightLights openTopo nautical");
    println!("Environment: PORT_ATLAS_CONFIG overrides config path");
    println!("Environment: PORT_ATLAS_CATALOG sets the port catalog JSON file");
    println!("Environment: PORT_ATLAS_LOG_ENABLED/LEVEL/FILE configure logging");
    println!("Environment: PORT_ATLAS_THEME PORT_ATLAS_BASE_MAP choose styling");
    println!("Environment: PORT_ATLAS_SHOW_PORTS/SEAMARKS/EEZ/BATHYMETRY/RAILWAYS toggle overlays");
    println!("Environment: PORT_ATLAS_HOME_LAT/LNG/ZOOM set the reset view");
    println!("Environment: PORT_ATLAS_MIN_ZOOM PORT_ATLAS_PORT_MIN_ZOOM PORT_ATLAS_FIT_PADDING_PX");
    println!("Keys: q quit | / country | p port | r reset | +/- zoom | arrows pan");
    println!("      L layers | t theme | ? help");
}
