//! Station map rendering.
//!
//! Draws station models, wind barbs and isobars onto a [`tiny_skia::Pixmap`]
//! framed by a map projection, and encodes the result as PNG.

pub mod barbs;
pub mod contour;
pub mod error;
pub mod frame;
pub mod glyphs;
pub mod gradient;
pub mod map;
pub mod png;
pub mod station_model;

pub use contour::{IsobarLevel, IsobarStyle};
pub use error::{RenderError, Result};
pub use frame::MapFrame;
pub use gradient::Color;
pub use map::{render_map, save_png, MapOptions, MapProduct};
pub use station_model::{StationStyle, WeatherPolicy};
