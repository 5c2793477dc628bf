//! Plotter configuration.
//!
//! Loads sources and region presets from YAML (config/plotter.yaml). Every
//! section is optional; missing sections fall back to the built-in presets
//! for the European, Scandinavian, Greenland and polar maps.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use ingestion::{RetryPolicy, DEFAULT_NCSS_URL};
use projection::ProjectionDefinition;
use renderer::MapProduct;
use serde::Deserialize;
use station_analysis::InterpolationParams;
use station_common::GeoBounds;
use tracing::debug;

/// Root configuration loaded from plotter.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct PlotterConfig {
    /// Where maps are written. Defaults to ~/Documents/Metar_plots.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub retry: RetryPolicy,
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
    #[serde(default)]
    pub metar: MetarConfig,
    #[serde(default)]
    pub synop: SynopConfig,
    #[serde(default = "default_regions")]
    pub regions: Vec<RegionConfig>,
}

impl Default for PlotterConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            image: ImageConfig::default(),
            retry: RetryPolicy::default(),
            http_timeout_secs: default_http_timeout(),
            metar: MetarConfig::default(),
            synop: SynopConfig::default(),
            regions: default_regions(),
        }
    }
}

fn default_http_timeout() -> u64 {
    120
}

/// Maximum image size; maps keep the aspect ratio of their region.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_width: 2400,
            max_height: 2400,
        }
    }
}

/// METAR source: a THREDDS NetCDF Subset endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetarConfig {
    pub ncss_url: String,
    /// Query box covering every METAR region
    pub bounds: GeoBounds,
}

impl Default for MetarConfig {
    fn default() -> Self {
        Self {
            ncss_url: DEFAULT_NCSS_URL.to_string(),
            bounds: GeoBounds::new(-58.5, 32.0, 42.0, 74.0),
        }
    }
}

/// SYNOP source: hourly CSV exports.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SynopConfig {
    /// URL with {year}, {month}, {day} and {hour} placeholders. Without it
    /// SYNOP maps need a local file.
    pub url_template: Option<String>,
    /// Download directory, defaults to the output directory
    pub download_dir: Option<PathBuf>,
    /// Stations above this height only contribute a sea level pressure to
    /// the analysis when it is reduced to mean sea level (metres)
    pub max_station_height: f64,
}

impl Default for SynopConfig {
    fn default() -> Self {
        Self {
            url_template: None,
            download_dir: None,
            max_station_height: 750.0,
        }
    }
}

/// One map to draw.
#[derive(Debug, Clone, Deserialize)]
pub struct RegionConfig {
    pub name: String,
    pub product: MapProduct,
    pub bounds: GeoBounds,
    /// Projection the map is drawn in
    pub projection: ProjectionDefinition,
    /// Projection distances are measured in while thinning, if different
    #[serde(default)]
    pub thinning_projection: Option<ProjectionDefinition>,
    /// Minimum station separation (metres)
    pub min_separation: f64,
    /// SYNOP separation on combined maps, defaults to `min_separation`
    #[serde(default)]
    pub synop_separation: Option<f64>,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    /// Draw isobars from a sea level pressure analysis
    #[serde(default)]
    pub isobars: Option<IsobarConfig>,
    /// Keep only stations south of this latitude
    #[serde(default)]
    pub latitude_below: Option<f64>,
    /// Keep only stations north of this latitude
    #[serde(default)]
    pub latitude_above: Option<f64>,
    #[serde(default)]
    pub circular: bool,
    #[serde(default = "default_true")]
    pub transparent: bool,
    #[serde(default = "default_true")]
    pub barbs: bool,
    #[serde(default = "default_true")]
    pub clouds: bool,
}

fn default_font_size() -> f32 {
    15.0
}

fn default_true() -> bool {
    true
}

/// Isobar analysis of one region.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IsobarConfig {
    #[serde(default)]
    pub analysis: InterpolationParams,
    #[serde(default = "default_smoothing")]
    pub smoothing_passes: u32,
}

fn default_smoothing() -> u32 {
    1
}

/// Each Chaikin pass doubles the vertex count of every isobar.
const MAX_SMOOTHING_PASSES: u32 = 8;

impl RegionConfig {
    fn new(
        name: &str,
        product: MapProduct,
        bounds: GeoBounds,
        projection: ProjectionDefinition,
        min_separation: f64,
        font_size: f32,
    ) -> Self {
        Self {
            name: name.to_string(),
            product,
            bounds,
            projection,
            thinning_projection: None,
            min_separation,
            synop_separation: None,
            font_size,
            isobars: None,
            latitude_below: None,
            latitude_above: None,
            circular: false,
            transparent: true,
            barbs: true,
            clouds: true,
        }
    }

    fn with_isobars(mut self) -> Self {
        self.isobars = Some(IsobarConfig {
            analysis: InterpolationParams::default(),
            smoothing_passes: default_smoothing(),
        });
        self
    }

    /// Projection used for the distance test while thinning.
    pub fn thinning_projection(&self) -> &ProjectionDefinition {
        self.thinning_projection.as_ref().unwrap_or(&self.projection)
    }

    /// Whether a station position passes the latitude cuts.
    pub fn accepts_latitude(&self, latitude: f64) -> bool {
        self.latitude_below.map_or(true, |cut| latitude < cut)
            && self.latitude_above.map_or(true, |cut| latitude > cut)
    }

    /// Whether this map needs METAR reports.
    pub fn uses_metar(&self) -> bool {
        matches!(self.product, MapProduct::Standard | MapProduct::Combined)
    }

    /// Whether this map needs SYNOP reports.
    pub fn uses_synop(&self) -> bool {
        matches!(
            self.product,
            MapProduct::Combined | MapProduct::TemperatureColor
        )
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("region name must not be empty");
        }
        self.bounds
            .validate()
            .with_context(|| format!("region {}: invalid bounds", self.name))?;
        if self.min_separation.is_nan() || self.min_separation < 0.0 {
            bail!(
                "region {}: min_separation must be >= 0, got {}",
                self.name,
                self.min_separation
            );
        }
        if let Some(sep) = self.synop_separation {
            if sep.is_nan() || sep < 0.0 {
                bail!("region {}: synop_separation must be >= 0, got {}", self.name, sep);
            }
        }
        if self.font_size.is_nan() || self.font_size <= 0.0 {
            bail!("region {}: font_size must be positive", self.name);
        }
        if let Some(isobars) = &self.isobars {
            isobars
                .analysis
                .validate()
                .with_context(|| format!("region {}: invalid isobar analysis", self.name))?;
            if isobars.smoothing_passes > MAX_SMOOTHING_PASSES {
                bail!(
                    "region {}: smoothing_passes must be at most {}, got {}",
                    self.name,
                    MAX_SMOOTHING_PASSES,
                    isobars.smoothing_passes
                );
            }
        }
        Ok(())
    }
}

/// The built-in map presets.
pub fn default_regions() -> Vec<RegionConfig> {
    use MapProduct::{Combined, Standard, TemperatureColor};

    let europe = GeoBounds::new(-5.5, 32.0, 42.0, 62.0);
    let lambert = ProjectionDefinition::europe;

    let mut greenland = RegionConfig::new(
        "GR_ICE",
        Standard,
        GeoBounds::new(-58.0, -12.0, 57.0, 70.5),
        ProjectionDefinition::greenland(),
        50_000.0,
        22.0,
    );
    greenland.thinning_projection = Some(ProjectionDefinition::greenland());

    let mut antarctica = RegionConfig::new(
        "Antarctica",
        TemperatureColor,
        GeoBounds::new(-180.0, 180.0, -90.0, -60.0),
        ProjectionDefinition::south_polar(),
        110_000.0,
        16.0,
    )
    .with_isobars();
    antarctica.latitude_below = Some(-60.0);
    antarctica.circular = true;
    antarctica.transparent = false;

    let mut arctic = RegionConfig::new(
        "Arctic",
        TemperatureColor,
        GeoBounds::new(-180.0, 180.0, 60.0, 90.0),
        ProjectionDefinition::north_polar(),
        60_000.0,
        19.0,
    );
    arctic.thinning_projection = Some(ProjectionDefinition::greenland());
    arctic.latitude_above = Some(60.0);
    arctic.circular = true;
    arctic.transparent = false;
    arctic.barbs = false;
    arctic.clouds = false;

    let mut combined = RegionConfig::new("EU", Combined, europe, lambert(), 180_000.0, 15.0);
    combined.synop_separation = Some(180_000.0);

    vec![
        RegionConfig::new("EU", Standard, europe, lambert(), 180_000.0, 15.0),
        RegionConfig::new(
            "AT",
            Standard,
            GeoBounds::new(8.9, 17.42, 45.9, 49.4),
            lambert(),
            20_000.0,
            15.0,
        ),
        RegionConfig::new(
            "UK",
            Standard,
            GeoBounds::new(-10.1, 9.4, 48.64, 58.4),
            lambert(),
            90_000.0,
            16.0,
        ),
        RegionConfig::new(
            "SCANDI_S",
            Standard,
            GeoBounds::new(1.0, 32.7, 54.0, 64.5),
            lambert(),
            80_000.0,
            16.0,
        ),
        RegionConfig::new(
            "SCANDI_N",
            Standard,
            GeoBounds::new(8.0, 39.7, 64.0, 72.0),
            lambert(),
            70_000.0,
            15.0,
        ),
        greenland,
        combined,
        antarctica,
        arctic,
        RegionConfig::new(
            "UK",
            TemperatureColor,
            GeoBounds::new(-10.1, 1.8, 50.1, 58.4),
            lambert(),
            35_000.0,
            19.0,
        )
        .with_isobars(),
        RegionConfig::new("EU", TemperatureColor, europe, lambert(), 150_000.0, 17.0)
            .with_isobars(),
    ]
}

impl PlotterConfig {
    /// Check the whole configuration, failing on the first invalid entry.
    pub fn validate(&self) -> Result<()> {
        if self.image.max_width == 0 || self.image.max_height == 0 {
            bail!("image size must be positive");
        }
        if self.retry.max_attempts == 0 {
            bail!("retry.max_attempts must be at least 1");
        }
        self.metar
            .bounds
            .validate()
            .context("invalid METAR query bounds")?;
        for region in &self.regions {
            region.validate()?;
        }
        Ok(())
    }

    /// Output directory, falling back to ~/Documents/Metar_plots.
    pub fn resolved_output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => default_output_dir(),
        }
    }

    /// Keep only the regions whose name matches one of `names`
    /// (case-insensitive). An empty list keeps everything.
    pub fn select_regions(&mut self, names: &[String]) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }
        for name in names {
            if !self.regions.iter().any(|r| r.name.eq_ignore_ascii_case(name)) {
                bail!("unknown region '{}'", name);
            }
        }
        self.regions
            .retain(|r| names.iter().any(|n| r.name.eq_ignore_ascii_case(n)));
        Ok(())
    }
}

fn default_output_dir() -> PathBuf {
    dirs::document_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Documents")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Metar_plots")
}

/// Load the configuration from a YAML file.
pub fn load(path: &Path) -> Result<PlotterConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config = parse(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    debug!(
        path = %path.display(),
        regions = config.regions.len(),
        "Loaded plotter config"
    );
    Ok(config)
}

/// Parse and validate a YAML configuration.
pub fn parse(content: &str) -> Result<PlotterConfig> {
    let config: PlotterConfig = serde_yaml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_presets() {
        let config = parse("{}").unwrap();
        assert_eq!(config.regions.len(), 11);
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.metar.ncss_url, DEFAULT_NCSS_URL);
        assert_eq!(config.synop.max_station_height, 750.0);
    }

    #[test]
    fn test_presets_are_valid() {
        PlotterConfig::default().validate().unwrap();
    }

    #[test]
    fn test_arctic_preset() {
        let regions = default_regions();
        let arctic = regions.iter().find(|r| r.name == "Arctic").unwrap();
        assert_eq!(arctic.thinning_projection(), &ProjectionDefinition::greenland());
        assert_eq!(arctic.projection, ProjectionDefinition::north_polar());
        assert!(!arctic.barbs && !arctic.clouds);
        assert!(arctic.circular && !arctic.transparent);
        assert!(arctic.isobars.is_none());
        assert!(arctic.accepts_latitude(75.0));
        assert!(!arctic.accepts_latitude(60.0));
    }

    #[test]
    fn test_parse_region() {
        let yaml = r#"
output_dir: /tmp/maps
retry:
  max_attempts: 3
  delay: 1
synop:
  url_template: "https://example.org/synop/{year}{month}{day}{hour}.csv"
regions:
  - name: ALPS
    product: temperature_color
    bounds: { west: 5.0, east: 17.0, south: 44.0, north: 49.0 }
    projection:
      type: lambert_conformal
      central_longitude: 11
      central_latitude: 47
      standard_parallels: [35, 35]
    min_separation: 25000
    isobars:
      analysis:
        search_radius: 200000
      smoothing_passes: 2
"#;
        let config = parse(yaml).unwrap();
        assert_eq!(config.output_dir, Some(PathBuf::from("/tmp/maps")));
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.regions.len(), 1);

        let region = &config.regions[0];
        assert_eq!(region.product, MapProduct::TemperatureColor);
        assert_eq!(region.font_size, 15.0);
        assert!(region.transparent);
        assert_eq!(region.thinning_projection(), &region.projection);

        let isobars = region.isobars.as_ref().unwrap();
        assert_eq!(isobars.analysis.search_radius, 200_000.0);
        assert_eq!(isobars.analysis.resolution, 100_000.0);
        assert_eq!(isobars.smoothing_passes, 2);
    }

    #[test]
    fn test_shipped_config_matches_presets() {
        let config = load(&test_utils::config_path("plotter.yaml")).unwrap();
        let presets = default_regions();
        assert_eq!(config.regions.len(), presets.len());
        for (region, preset) in config.regions.iter().zip(&presets) {
            assert_eq!(region.name, preset.name);
            assert_eq!(region.product, preset.product);
            assert_eq!(region.bounds, preset.bounds);
            assert_eq!(region.projection, preset.projection);
            assert_eq!(region.thinning_projection(), preset.thinning_projection());
            assert_eq!(region.min_separation, preset.min_separation);
            assert_eq!(region.font_size, preset.font_size);
            assert_eq!(region.isobars.is_some(), preset.isobars.is_some());
            assert_eq!(region.circular, preset.circular);
            assert_eq!(region.transparent, preset.transparent);
        }
    }

    #[test]
    fn test_excessive_smoothing_is_rejected() {
        let mut config = PlotterConfig::default();
        let antarctica = config
            .regions
            .iter_mut()
            .find(|r| r.name == "Antarctica")
            .unwrap();
        antarctica.isobars.as_mut().unwrap().smoothing_passes = MAX_SMOOTHING_PASSES;
        config.validate().unwrap();

        let antarctica = config
            .regions
            .iter_mut()
            .find(|r| r.name == "Antarctica")
            .unwrap();
        antarctica.isobars.as_mut().unwrap().smoothing_passes = 30;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Antarctica"));
        assert!(err.to_string().contains("smoothing_passes"));
    }

    #[test]
    fn test_negative_separation_is_rejected() {
        let mut config = PlotterConfig::default();
        config.regions[0].min_separation = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_select_regions() {
        let mut config = PlotterConfig::default();
        config.select_regions(&["uk".to_string()]).unwrap();
        assert_eq!(config.regions.len(), 2);
        assert!(config.regions.iter().all(|r| r.name == "UK"));

        let mut config = PlotterConfig::default();
        assert!(config.select_regions(&["Mars".to_string()]).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load(Path::new("/nonexistent/plotter.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
