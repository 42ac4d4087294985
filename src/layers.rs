use ratatui::style::Color;

use crate::viewport::DEFAULT_MAX_ZOOM;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BaseMap {
    Osm,
    OsmHot,
    CyclOsm,
    CartoLight,
    CartoDark,
    CartoVoyager,
    EsriSat,
    EsriStreet,
    EsriTopo,
    NasaBlueMarble,
    NasaNightLights,
    OpenTopo,
    Nautical,
}

/// Canvas colors standing in for a base map's imagery.
#[derive(Clone, Copy, Debug)]
pub struct MapPalette {
    pub water: Color,
    pub land: Color,
    pub marker: Color,
}

impl BaseMap {
    pub const ALL: [BaseMap; 13] = [
        BaseMap::Osm,
        BaseMap::OsmHot,
        BaseMap::CyclOsm,
        BaseMap::CartoLight,
        BaseMap::CartoDark,
        BaseMap::CartoVoyager,
        BaseMap::EsriSat,
        BaseMap::EsriStreet,
        BaseMap::EsriTopo,
        BaseMap::NasaBlueMarble,
        BaseMap::NasaNightLights,
        BaseMap::OpenTopo,
        BaseMap::Nautical,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BaseMap::Osm => "OpenStreetMap",
            BaseMap::OsmHot => "OpenStreetMap HOT",
            BaseMap::CyclOsm => "CyclOSM",
            BaseMap::CartoLight => "Carto Light",
            BaseMap::CartoDark => "Carto Dark",
            BaseMap::CartoVoyager => "Carto Voyager",
            BaseMap::EsriSat => "Esri Satellite",
            BaseMap::EsriStreet => "Esri Street Map",
            BaseMap::EsriTopo => "Esri Topographic",
            BaseMap::NasaBlueMarble => "NASA Blue Marble",
            BaseMap::NasaNightLights => "NASA Night Lights",
            BaseMap::OpenTopo => "OpenTopoMap",
            BaseMap::Nautical => "Nautical (OSM + Seamarks)",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            BaseMap::Osm => "osm",
            BaseMap::OsmHot => "osmHot",
            BaseMap::CyclOsm => "cyclOSM",
            BaseMap::CartoLight => "cartoLight",
            BaseMap::CartoDark => "cartoDark",
            BaseMap::CartoVoyager => "cartoVoyager",
            BaseMap::EsriSat => "esriSat",
            BaseMap::EsriStreet => "esriStreet",
            BaseMap::EsriTopo => "esriTopo",
            BaseMap::NasaBlueMarble => "nasaBlueMarble",
            BaseMap::NasaNightLights => "nasaNightLights",
            BaseMap::OpenTopo => "openTopo",
            BaseMap::Nautical => "nautical",
        }
    }

    pub fn from_str(value: &str) -> Self {
        let wanted = value.trim();
        BaseMap::ALL
            .into_iter()
            .find(|map| map.key().eq_ignore_ascii_case(wanted))
            .unwrap_or(BaseMap::Osm)
    }

    pub fn tile_url(self) -> &'static str {
        match self {
            BaseMap::Osm | BaseMap::Nautical => "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
            BaseMap::OsmHot => "https://{s}.tile.openstreetmap.fr/hot/{z}/{x}/{y}.png",
            BaseMap::CyclOsm => "https://{s}.tile-cyclosm.openstreetmap.fr/cyclosm/{z}/{x}/{y}.png",
            BaseMap::CartoLight => "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png",
            BaseMap::CartoDark => "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png",
            BaseMap::CartoVoyager => {
                "https://{s}.basemaps.cartocdn.com/rastertiles/voyager/{z}/{x}/{y}{r}.png"
            }
            BaseMap::EsriSat => {
                "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}"
            }
            BaseMap::EsriStreet => {
                "https://server.arcgisonline.com/ArcGIS/rest/services/World_Street_Map/MapServer/tile/{z}/{y}/{x}"
            }
            BaseMap::EsriTopo => {
                "https://server.arcgisonline.com/ArcGIS/rest/services/World_Topo_Map/MapServer/tile/{z}/{y}/{x}"
            }
            BaseMap::NasaBlueMarble => {
                "https://gibs.earthdata.nasa.gov/wmts/epsg3857/best/BlueMarble_ShadedRelief/default/2013-12-01/GoogleMapsCompatible_Level9/{z}/{y}/{x}.jpg"
            }
            BaseMap::NasaNightLights => {
                "https://gibs.earthdata.nasa.gov/wmts/epsg3857/best/VIIRS_CityLights_2012/default/2012-01-01/GoogleMapsCompatible_Level8/{z}/{y}/{x}.jpg"
            }
            BaseMap::OpenTopo => "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png",
        }
    }

    /// Deepest zoom the imagery provides.
    pub fn max_zoom(self) -> f64 {
        match self {
            BaseMap::NasaBlueMarble => 9.0,
            BaseMap::NasaNightLights => 8.0,
            _ => DEFAULT_MAX_ZOOM,
        }
    }

    pub fn palette(self) -> MapPalette {
        match self {
            BaseMap::Osm | BaseMap::OsmHot | BaseMap::CyclOsm | BaseMap::EsriStreet => MapPalette {
                water: Color::Rgb(12, 24, 40),
                land: Color::Rgb(150, 190, 140),
                marker: Color::Yellow,
            },
            BaseMap::CartoLight | BaseMap::CartoVoyager => MapPalette {
                water: Color::Rgb(30, 34, 40),
                land: Color::Rgb(210, 210, 200),
                marker: Color::LightRed,
            },
            BaseMap::CartoDark | BaseMap::NasaNightLights => MapPalette {
                water: Color::Rgb(6, 6, 10),
                land: Color::Rgb(90, 90, 100),
                marker: Color::Rgb(255, 200, 80),
            },
            BaseMap::EsriSat | BaseMap::NasaBlueMarble => MapPalette {
                water: Color::Rgb(4, 16, 40),
                land: Color::Rgb(110, 140, 80),
                marker: Color::LightYellow,
            },
            BaseMap::EsriTopo | BaseMap::OpenTopo => MapPalette {
                water: Color::Rgb(16, 28, 36),
                land: Color::Rgb(190, 160, 110),
                marker: Color::LightMagenta,
            },
            BaseMap::Nautical => MapPalette {
                water: Color::Rgb(8, 30, 60),
                land: Color::Rgb(220, 200, 140),
                marker: Color::LightRed,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overlay {
    Ports,
    Seamarks,
    Eez,
    Bathymetry,
    Railways,
}

impl Overlay {
    pub const ALL: [Overlay; 5] = [
        Overlay::Ports,
        Overlay::Seamarks,
        Overlay::Eez,
        Overlay::Bathymetry,
        Overlay::Railways,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Overlay::Ports => "Ports (all)",
            Overlay::Seamarks => "OpenSeaMap Seamarks",
            Overlay::Eez => "EEZ Maritime Boundaries",
            Overlay::Bathymetry => "Bathymetry (EMODnet)",
            Overlay::Railways => "Railways (OpenRailwayMap)",
        }
    }

    pub fn short_label(self) -> &'static str {
        match self {
            Overlay::Ports => "PORTS",
            Overlay::Seamarks => "SEAMARKS",
            Overlay::Eez => "EEZ",
            Overlay::Bathymetry => "BATHY",
            Overlay::Railways => "RAIL",
        }
    }

    pub fn source(self) -> Option<&'static str> {
        match self {
            Overlay::Ports => None,
            Overlay::Seamarks => Some("https://tiles.openseamap.org/seamark/{z}/{x}/{y}.png"),
            Overlay::Eez => Some("https://geo.vliz.be/geoserver/MarineRegions/wms"),
            Overlay::Bathymetry => Some("https://ows.emodnet-bathymetry.eu/wms"),
            Overlay::Railways => {
                Some("https://{s}.tiles.openrailwaymap.org/standard/{z}/{x}/{y}.png")
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerState {
    pub base_map: BaseMap,
    pub show_ports: bool,
    pub show_seamarks: bool,
    pub show_eez: bool,
    pub show_bathymetry: bool,
    pub show_railways: bool,
}

impl Default for LayerState {
    fn default() -> Self {
        Self {
            base_map: BaseMap::Osm,
            show_ports: true,
            show_seamarks: true,
            show_eez: true,
            show_bathymetry: true,
            show_railways: false,
        }
    }
}

impl LayerState {
    pub fn toggled(&self, overlay: Overlay) -> bool {
        match overlay {
            Overlay::Ports => self.show_ports,
            Overlay::Seamarks => self.show_seamarks,
            Overlay::Eez => self.show_eez,
            Overlay::Bathymetry => self.show_bathymetry,
            Overlay::Railways => self.show_railways,
        }
    }

    /// Whether the overlay is drawn; the nautical base map always carries seamarks.
    pub fn is_active(&self, overlay: Overlay) -> bool {
        match overlay {
            Overlay::Seamarks => self.show_seamarks || self.base_map == BaseMap::Nautical,
            other => self.toggled(other),
        }
    }

    pub fn toggle(&mut self, overlay: Overlay) {
        let slot = match overlay {
            Overlay::Ports => &mut self.show_ports,
            Overlay::Seamarks => &mut self.show_seamarks,
            Overlay::Eez => &mut self.show_eez,
            Overlay::Bathymetry => &mut self.show_bathymetry,
            Overlay::Railways => &mut self.show_railways,
        };
        *slot = !*slot;
    }

    pub fn active_overlays(&self) -> Vec<Overlay> {
        Overlay::ALL
            .into_iter()
            .filter(|o| self.is_active(*o))
            .collect()
    }
}

/// One row of the layer menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerItem {
    Base(BaseMap),
    Overlay(Overlay),
}

pub fn layer_items() -> Vec<LayerItem> {
    BaseMap::ALL
        .into_iter()
        .map(LayerItem::Base)
        .chain(Overlay::ALL.into_iter().map(LayerItem::Overlay))
        .collect()
}
