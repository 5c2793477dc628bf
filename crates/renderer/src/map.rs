//! Station map products.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use station_analysis::InterpolationGrid;
use station_common::Observation;
use tiny_skia::Pixmap;
use tracing::{debug, info};

use crate::contour::{self, IsobarStyle};
use crate::error::Result;
use crate::frame::MapFrame;
use crate::gradient::Color;
use crate::png;
use crate::station_model::{self, StationStyle};

const GRATICULE_COLOR: Color = Color::new(150, 150, 150, 160);

/// The kind of map being drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapProduct {
    /// METAR station models
    Standard,
    /// METAR and SYNOP station models on one map
    Combined,
    /// SYNOP stations with temperature-colored labels
    TemperatureColor,
}

impl MapProduct {
    /// Output file name for a region.
    pub fn file_name(&self, area: &str) -> String {
        match self {
            Self::Standard => format!("CURR_METAR_{}.png", area),
            Self::Combined => format!("CURR_METAR_SYNOP_{}.png", area),
            Self::TemperatureColor => format!("CURR_SYNOP_color_{}.png", area),
        }
    }
}

/// Rendering options for one map.
#[derive(Debug, Clone)]
pub struct MapOptions {
    pub product: MapProduct,
    /// Station font size in points
    pub font_size: f32,
    pub barbs: bool,
    pub clouds: bool,
    /// Transparent background, for overlays
    pub transparent: bool,
    pub graticule: bool,
    pub isobars: IsobarStyle,
}

impl MapOptions {
    pub fn new(product: MapProduct, font_size: f32) -> Self {
        Self {
            product,
            font_size,
            barbs: true,
            clouds: true,
            transparent: true,
            graticule: true,
            isobars: IsobarStyle::default(),
        }
    }

    fn station_style(&self) -> StationStyle {
        let mut style = match self.product {
            MapProduct::Standard | MapProduct::Combined => StationStyle::standard(self.font_size),
            MapProduct::TemperatureColor => StationStyle::temperature_color(self.font_size),
        };
        style.barbs = self.barbs;
        style.clouds = self.clouds;
        style
    }

    fn background(&self) -> Color {
        if self.transparent {
            Color::transparent()
        } else {
            Color::WHITE
        }
    }
}

/// Draw a station map.
///
/// Isobars go below the station models. The temperature color product
/// skips stations without a temperature.
pub fn render_map(
    frame: &MapFrame,
    observations: &[Observation],
    isobars: Option<&InterpolationGrid>,
    options: &MapOptions,
) -> Result<Pixmap> {
    let background = options.background();
    let mut pixmap = frame.new_pixmap(background)?;

    if options.graticule {
        frame.draw_graticule(&mut pixmap, GRATICULE_COLOR);
    }
    if let Some(grid) = isobars {
        contour::render_isobars(&mut pixmap, frame, grid, &options.isobars);
    }

    let style = options.station_style();
    let mut drawn = 0;
    for obs in observations {
        if options.product == MapProduct::TemperatureColor && obs.air_temperature.is_none() {
            continue;
        }
        station_model::draw_station(&mut pixmap, frame, obs, &style);
        drawn += 1;
    }

    frame.finish(&mut pixmap, background);

    debug!(
        product = ?options.product,
        stations = drawn,
        width = frame.width(),
        height = frame.height(),
        "Rendered station map"
    );

    Ok(pixmap)
}

/// Encode a map and write it to `dir/file_name`.
pub fn save_png(pixmap: &Pixmap, dir: &Path, file_name: &str) -> Result<PathBuf> {
    let bytes = png::encode_pixmap(pixmap)?;
    let path = dir.join(file_name);
    std::fs::write(&path, &bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "Saved map");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        assert_eq!(MapProduct::Standard.file_name("EU"), "CURR_METAR_EU.png");
        assert_eq!(MapProduct::Combined.file_name("EU"), "CURR_METAR_SYNOP_EU.png");
        assert_eq!(
            MapProduct::TemperatureColor.file_name("Arctic"),
            "CURR_SYNOP_color_Arctic.png"
        );
    }

    #[test]
    fn test_temperature_color_style() {
        let mut options = MapOptions::new(MapProduct::TemperatureColor, 19.0);
        options.barbs = false;
        options.clouds = false;
        let style = options.station_style();
        assert!(!style.barbs);
        assert!(!style.clouds);
        assert!(!style.dew_point);
        assert_eq!(
            style.weather,
            station_model::WeatherPolicy::MannedOrSignificant
        );
    }
}
