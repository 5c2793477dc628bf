//! Map frame: the mapping between projected metres and image pixels.

use projection::{MapProjection, ProjectedExtent, ProjectedPoint};
use station_common::GeoBounds;
use tiny_skia::{Paint, PathBuilder, Pixmap, PremultipliedColorU8, Stroke, Transform};

use crate::error::{RenderError, Result};
use crate::gradient::Color;

/// Width of the reference page in typographic points. Font sizes given in
/// points are scaled so that this many points span the image width.
const PAGE_WIDTH_POINTS: f32 = 1440.0;

/// Spacing of graticule lines (degrees).
const GRATICULE_STEP: f64 = 10.0;

/// A projection together with the projected window drawn into the image.
#[derive(Debug, Clone)]
pub struct MapFrame {
    projection: MapProjection,
    extent: ProjectedExtent,
    width: u32,
    height: u32,
    /// Pixels per projected metre
    scale: f64,
    circular: bool,
}

impl MapFrame {
    /// Frame the geographic box so it fits into `max_width` x `max_height`
    /// pixels while keeping the map aspect ratio.
    pub fn fit(
        projection: MapProjection,
        bounds: &GeoBounds,
        max_width: u32,
        max_height: u32,
    ) -> Result<Self> {
        let extent = projection.projected_extent(bounds)?;
        Self::from_extent(projection, extent, max_width, max_height)
    }

    pub fn from_extent(
        projection: MapProjection,
        extent: ProjectedExtent,
        max_width: u32,
        max_height: u32,
    ) -> Result<Self> {
        if max_width == 0 || max_height == 0 {
            return Err(RenderError::InvalidSize {
                width: max_width,
                height: max_height,
            });
        }
        if !(extent.width() > 0.0 && extent.height() > 0.0) {
            return Err(RenderError::DegenerateExtent(format!(
                "{} x {} m",
                extent.width(),
                extent.height()
            )));
        }

        let scale = (max_width as f64 / extent.width()).min(max_height as f64 / extent.height());
        let width = ((extent.width() * scale).round() as u32).clamp(1, max_width);
        let height = ((extent.height() * scale).round() as u32).clamp(1, max_height);

        Ok(Self {
            projection,
            extent,
            width,
            height,
            scale,
            circular: false,
        })
    }

    /// Clip the map to the inscribed circle, as for polar maps.
    pub fn with_circular_clip(mut self, circular: bool) -> Self {
        self.circular = circular;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn projection(&self) -> &MapProjection {
        &self.projection
    }

    pub fn extent(&self) -> &ProjectedExtent {
        &self.extent
    }

    pub fn is_circular(&self) -> bool {
        self.circular
    }

    /// Pixels per typographic point.
    pub fn pixels_per_point(&self) -> f32 {
        self.width as f32 / PAGE_WIDTH_POINTS
    }

    /// Projected coordinates to pixel coordinates (y grows downwards).
    pub fn to_pixel(&self, point: &ProjectedPoint) -> (f32, f32) {
        (
            ((point.x - self.extent.min_x) * self.scale) as f32,
            ((self.extent.max_y - point.y) * self.scale) as f32,
        )
    }

    /// Pixel position of a geographic location, `None` if it cannot be
    /// projected.
    pub fn geo_to_pixel(&self, lon: f64, lat: f64) -> Option<(f32, f32)> {
        self.projection
            .project(lon, lat)
            .ok()
            .map(|p| self.to_pixel(&p))
    }

    /// Whether a pixel position lies inside the visible map area.
    pub fn contains_pixel(&self, x: f32, y: f32) -> bool {
        if !(x >= 0.0 && y >= 0.0 && x <= self.width as f32 && y <= self.height as f32) {
            return false;
        }
        if self.circular {
            let (cx, cy, r) = self.circle();
            (x - cx).powi(2) + (y - cy).powi(2) <= r * r
        } else {
            true
        }
    }

    fn circle(&self) -> (f32, f32, f32) {
        let cx = self.width as f32 / 2.0;
        let cy = self.height as f32 / 2.0;
        (cx, cy, cx.min(cy))
    }

    /// Create a pixmap of the frame size filled with the background.
    pub fn new_pixmap(&self, background: Color) -> Result<Pixmap> {
        let mut pixmap = Pixmap::new(self.width, self.height).ok_or(RenderError::InvalidSize {
            width: self.width,
            height: self.height,
        })?;
        pixmap.fill(tiny_skia::Color::from_rgba8(
            background.r,
            background.g,
            background.b,
            background.a,
        ));
        Ok(pixmap)
    }

    /// Draw meridians and parallels every 10 degrees.
    pub fn draw_graticule(&self, pixmap: &mut Pixmap, color: Color) {
        let paint = color.to_paint();
        let stroke = Stroke {
            width: 0.5 * self.pixels_per_point(),
            ..Stroke::default()
        };

        let mut lat = -80.0;
        while lat <= 80.0 {
            let line: Vec<(f64, f64)> = (-180..=180).map(|lon| (lon as f64, lat)).collect();
            self.stroke_geo_line(pixmap, &line, &paint, &stroke);
            lat += GRATICULE_STEP;
        }
        let mut lon = -180.0;
        while lon < 180.0 {
            let line: Vec<(f64, f64)> = (-80..=80).map(|lat| (lon, lat as f64)).collect();
            self.stroke_geo_line(pixmap, &line, &paint, &stroke);
            lon += GRATICULE_STEP;
        }
    }

    /// Stroke a polyline given in degrees, breaking it where points cannot
    /// be projected or jump across the map.
    fn stroke_geo_line(
        &self,
        pixmap: &mut Pixmap,
        line: &[(f64, f64)],
        paint: &Paint,
        stroke: &Stroke,
    ) {
        let (w, h) = (self.width as f32, self.height as f32);
        let max_jump = w.max(h);
        let mut pb = PathBuilder::new();
        let mut previous: Option<(f32, f32)> = None;

        for &(lon, lat) in line {
            let pixel = self
                .geo_to_pixel(lon, lat)
                .filter(|&(x, y)| x > -w && x < 2.0 * w && y > -h && y < 2.0 * h);
            match pixel {
                Some((x, y)) => {
                    let connected = previous
                        .map_or(false, |(px, py)| (x - px).abs() + (y - py).abs() < max_jump);
                    if connected {
                        pb.line_to(x, y);
                    } else {
                        pb.move_to(x, y);
                    }
                    previous = Some((x, y));
                }
                None => previous = None,
            }
        }

        if let Some(path) = pb.finish() {
            pixmap.stroke_path(&path, paint, stroke, Transform::identity(), None);
        }
    }

    /// Finish the map edge: clear everything outside the circle of a
    /// circular frame and draw the outline.
    pub fn finish(&self, pixmap: &mut Pixmap, background: Color) {
        let ppp = self.pixels_per_point();
        let outline = Stroke {
            width: 1.0 * ppp,
            ..Stroke::default()
        };
        let paint = Color::BLACK.to_paint();

        if self.circular {
            let (cx, cy, r) = self.circle();
            let fill = premultiplied(background);
            let width = self.width as usize;
            for (index, pixel) in pixmap.pixels_mut().iter_mut().enumerate() {
                let x = (index % width) as f32 + 0.5;
                let y = (index / width) as f32 + 0.5;
                if (x - cx).powi(2) + (y - cy).powi(2) > r * r {
                    *pixel = fill;
                }
            }
            if let Some(path) = PathBuilder::from_circle(cx, cy, r - outline.width / 2.0) {
                pixmap.stroke_path(&path, &paint, &outline, Transform::identity(), None);
            }
        } else {
            let inset = outline.width / 2.0;
            let rect = tiny_skia::Rect::from_ltrb(
                inset,
                inset,
                self.width as f32 - inset,
                self.height as f32 - inset,
            );
            if let Some(path) = rect.map(PathBuilder::from_rect) {
                pixmap.stroke_path(&path, &paint, &outline, Transform::identity(), None);
            }
        }
    }
}

fn premultiplied(color: Color) -> PremultipliedColorU8 {
    let a = color.a as u16;
    let scale = |c: u8| ((c as u16 * a + 127) / 255) as u8;
    PremultipliedColorU8::from_rgba(scale(color.r), scale(color.g), scale(color.b), color.a)
        .unwrap_or(PremultipliedColorU8::TRANSPARENT)
}
