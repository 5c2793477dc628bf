//! The plotting run: fetch, thin, analyse, render, save.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use ingestion::{
    fetch_observations, http_client, NcssMetarSource, ObservationQuery, SynopCsvSource,
};
use projection::{MapProjection, ProjectedPoint};
use renderer::{render_map, save_png, MapFrame, MapOptions, MapProduct};
use station_analysis::{interpolate, reduce};
use station_common::{GeoBounds, Observation};
use tracing::{debug, info, warn};

use crate::config::{PlotterConfig, RegionConfig};

/// Stations up to this many degrees outside a region still feed its
/// pressure analysis, so isobars reach the map edge.
const ANALYSIS_MARGIN_DEG: f64 = 10.0;

/// Per-run choices made on the command line.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Observation hour, the current hour when absent
    pub time: Option<DateTime<Utc>>,
    /// Read SYNOP reports from this file instead of downloading
    pub synop_file: Option<PathBuf>,
}

/// Observations shared by all regions of a run.
#[derive(Debug, Clone, Default)]
pub struct FetchedObservations {
    pub metar: Option<Vec<Observation>>,
    pub synop: Option<Vec<Observation>>,
}

/// Create the output directory. Succeeds if it already exists.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))
}

/// Parse an observation hour given as `YYYY/MM/DD/HH`.
///
/// Leading zeros are optional.
pub fn parse_time(input: &str) -> Result<DateTime<Utc>> {
    let parts: Vec<&str> = input.trim().split('/').collect();
    if parts.len() != 4 {
        bail!("expected YYYY/MM/DD/HH, got '{}'", input);
    }
    let number = |s: &str| -> Result<u32> {
        s.trim()
            .parse::<u32>()
            .with_context(|| format!("'{}' is not a number in '{}'", s, input))
    };

    let year = parts[0]
        .trim()
        .parse::<i32>()
        .with_context(|| format!("'{}' is not a year", parts[0]))?;
    let (month, day, hour) = (number(parts[1])?, number(parts[2])?, number(parts[3])?);

    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| anyhow!("invalid date in '{}'", input))?;
    let naive = date
        .and_hms_opt(hour, 0, 0)
        .ok_or_else(|| anyhow!("invalid hour in '{}'", input))?;
    Ok(Utc.from_utc_datetime(&naive))
}

/// Run every configured region and return the written files.
pub async fn run(config: &PlotterConfig, options: &RunOptions) -> Result<Vec<PathBuf>> {
    let output_dir = config.resolved_output_dir();
    ensure_output_dir(&output_dir)?;

    let fetched = fetch_all(config, options, &output_dir).await?;

    let mut written = Vec::with_capacity(config.regions.len());
    for region in &config.regions {
        let missing_synop = region.uses_synop() && fetched.synop.is_none();
        let missing_metar = region.uses_metar() && fetched.metar.is_none();
        if missing_synop || missing_metar {
            warn!(
                region = %region.name,
                product = ?region.product,
                "Skipping map, no observations for it were fetched"
            );
            continue;
        }

        let path = plot_region(region, &fetched, config, &output_dir).with_context(|| {
            format!("Failed to plot {:?} map for {}", region.product, region.name)
        })?;
        written.push(path);
    }

    info!(maps = written.len(), output_dir = %output_dir.display(), "Plotting finished");
    Ok(written)
}

/// Fetch the report kinds the configured regions need.
///
/// METAR is always fetched remotely. SYNOP comes from `--synop-file` when
/// given, otherwise from the configured URL template; without either the
/// SYNOP maps are skipped.
pub async fn fetch_all(
    config: &PlotterConfig,
    options: &RunOptions,
    output_dir: &Path,
) -> Result<FetchedObservations> {
    let needs_metar = config.regions.iter().any(RegionConfig::uses_metar);
    let needs_synop = config.regions.iter().any(RegionConfig::uses_synop);
    let timeout = Duration::from_secs(config.http_timeout_secs);

    let query = |bounds: GeoBounds| match options.time {
        Some(time) => ObservationQuery::at_hour(bounds, time),
        None => ObservationQuery::latest(bounds),
    };

    let mut fetched = FetchedObservations::default();

    if needs_metar {
        let client = http_client(timeout)?;
        let source = NcssMetarSource::new(client, &config.metar.ncss_url)?;
        let observations = fetch_observations(&source, &query(config.metar.bounds), &config.retry)
            .await
            .context("Failed to fetch METAR observations")?;
        fetched.metar = Some(observations);
    }

    if needs_synop {
        let source = match (&options.synop_file, &config.synop.url_template) {
            (Some(path), _) => Some(SynopCsvSource::local(path.clone())),
            (None, Some(template)) => {
                let download_dir = config
                    .synop
                    .download_dir
                    .clone()
                    .unwrap_or_else(|| output_dir.to_path_buf());
                ensure_output_dir(&download_dir)?;
                Some(SynopCsvSource::remote(
                    http_client(timeout)?,
                    template.clone(),
                    download_dir,
                ))
            }
            (None, None) => {
                warn!("No SYNOP file or URL template configured, SYNOP maps are skipped");
                None
            }
        };

        if let Some(source) = source {
            let global = GeoBounds::new(-180.0, 180.0, -90.0, 90.0);
            let observations = fetch_observations(&source, &query(global), &config.retry)
                .await
                .context("Failed to fetch SYNOP observations")?;
            fetched.synop = Some(observations);
        }
    }

    Ok(fetched)
}

/// Draw one region and write it to `output_dir`.
pub fn plot_region(
    region: &RegionConfig,
    fetched: &FetchedObservations,
    config: &PlotterConfig,
    output_dir: &Path,
) -> Result<PathBuf> {
    let map_projection = region.projection.build()?;
    let thin_projection = region.thinning_projection().build()?;

    let metar = fetched.metar.as_deref().unwrap_or_default();
    let synop = fetched.synop.as_deref().unwrap_or_default();

    let metar_separation = region.min_separation;
    let synop_separation = region.synop_separation.unwrap_or(region.min_separation);

    let (analysed, plotted): (Vec<&Observation>, Vec<Observation>) = match region.product {
        MapProduct::Standard => {
            let plotted = thin(region, metar, &thin_projection, &map_projection, metar_separation)?;
            (metar.iter().collect(), plotted)
        }
        MapProduct::TemperatureColor => {
            let plotted = thin(region, synop, &thin_projection, &map_projection, synop_separation)?;
            (synop.iter().collect(), plotted)
        }
        MapProduct::Combined => {
            let mut plotted =
                thin(region, metar, &thin_projection, &map_projection, metar_separation)?;
            plotted.extend(thin(
                region,
                synop,
                &thin_projection,
                &map_projection,
                synop_separation,
            )?);
            (metar.iter().chain(synop).collect(), plotted)
        }
    };

    let grid = match &region.isobars {
        Some(isobars) => {
            let (points, values) = analysis_points(
                region,
                &analysed,
                &map_projection,
                config.synop.max_station_height,
            );
            if points.is_empty() {
                warn!(region = %region.name, "No sea level pressure to analyse, isobars skipped");
                None
            } else {
                Some(interpolate(&points, &values, &isobars.analysis)?)
            }
        }
        None => None,
    };

    let frame = MapFrame::fit(
        map_projection,
        &region.bounds,
        config.image.max_width,
        config.image.max_height,
    )?
    .with_circular_clip(region.circular);

    let mut options = MapOptions::new(region.product, region.font_size);
    options.barbs = region.barbs;
    options.clouds = region.clouds;
    options.transparent = region.transparent;
    if let Some(isobars) = &region.isobars {
        options.isobars.smoothing_passes = isobars.smoothing_passes;
    }

    let pixmap = render_map(&frame, &plotted, grid.as_ref(), &options)?;
    let path = save_png(&pixmap, output_dir, &region.product.file_name(&region.name))?;

    info!(
        region = %region.name,
        product = ?region.product,
        stations = plotted.len(),
        isobars = grid.is_some(),
        "Plotted region"
    );

    Ok(path)
}

/// Stations inside the region and its latitude cut that both projections
/// can place, thinned to the separation.
fn thin(
    region: &RegionConfig,
    observations: &[Observation],
    thin_projection: &MapProjection,
    map_projection: &MapProjection,
    min_separation: f64,
) -> Result<Vec<Observation>> {
    let candidates: Vec<Observation> = observations
        .iter()
        .filter(|obs| region.bounds.contains(obs.longitude, obs.latitude))
        .filter(|obs| region.accepts_latitude(obs.latitude))
        .filter(|obs| projectable(thin_projection, obs) && projectable(map_projection, obs))
        .cloned()
        .collect();

    let reduced = reduce(&candidates, thin_projection, min_separation)?;
    debug!(
        region = %region.name,
        candidates = candidates.len(),
        plotted = reduced.len(),
        "Thinned region"
    );
    Ok(reduced)
}

fn projectable(projection: &MapProjection, obs: &Observation) -> bool {
    projection.project(obs.longitude, obs.latitude).is_ok()
}

/// Projected positions and pressures of the full, unthinned station set
/// around a region.
fn analysis_points(
    region: &RegionConfig,
    observations: &[&Observation],
    projection: &MapProjection,
    max_station_height: f64,
) -> (Vec<ProjectedPoint>, Vec<f64>) {
    let around = expand(&region.bounds, ANALYSIS_MARGIN_DEG);
    let mut points = Vec::new();
    let mut values = Vec::new();

    for obs in observations {
        if !around.contains(obs.longitude, obs.latitude) || !region.accepts_latitude(obs.latitude)
        {
            continue;
        }
        let Some(pressure) = obs.analysis_pressure(max_station_height) else {
            continue;
        };
        if let Ok(point) = projection.project(obs.longitude, obs.latitude) {
            points.push(point);
            values.push(pressure);
        }
    }

    debug!(region = %region.name, stations = points.len(), "Collected pressure analysis input");
    (points, values)
}

fn expand(bounds: &GeoBounds, margin: f64) -> GeoBounds {
    GeoBounds::new(
        (bounds.west - margin).max(-180.0),
        (bounds.east + margin).min(360.0),
        (bounds.south - margin).max(-90.0),
        (bounds.north + margin).min(90.0),
    )
}
