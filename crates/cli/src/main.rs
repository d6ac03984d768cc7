//! Ridgeline CLI - compare OLD and NEW ridge-range delineations

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use geo::{polygon, Point};
use ridgeline_algorithms::classify::Exclusion;
use ridgeline_algorithms::config::{AnalysisConfig, NewMethod};
use ridgeline_algorithms::pipeline::run_analysis;
use ridgeline_algorithms::statistics::elevation_profile;
use ridgeline_core::source::{Bounds, DemSource, GeoTiffDem};
use ridgeline_core::vector::RegionBoundary;
use ridgeline_core::{ElevationGrid, CRS};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "ridgeline")]
#[command(author, version, about = "Compare slope-based and relief-based ridge-range delineations", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// EPSG code assumed when the DEM carries none
    #[arg(long, global = true)]
    epsg: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a DEM file
    Info {
        /// Input DEM (GeoTIFF, projected metric CRS)
        input: PathBuf,
    },
    /// Run the OLD and NEW delineations and compare them
    Compare {
        /// Input DEM (GeoTIFF, projected metric CRS)
        input: PathBuf,
        /// JSON run configuration; flags below override it
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// NEW method: relief or contour
        #[arg(short, long)]
        method: Option<String>,
        /// Region to analyse: min_x,min_y,max_x,max_y in the DEM CRS
        #[arg(long, value_parser = parse_bbox)]
        bbox: Option<Bounds>,
        /// Name of the region in the statistics table
        #[arg(long, default_value = "Study area")]
        region_name: String,
        /// State of the region in the statistics table
        #[arg(long, default_value = "")]
        region_state: String,
        /// Extra DEM margin around the region (metres)
        #[arg(long, default_value = "0")]
        buffer: f64,
        /// Exclusion raster on the DEM grid; non-zero cells are removed from OLD
        #[arg(long)]
        exclude: Option<PathBuf>,
        /// Slope threshold for OLD (degrees)
        #[arg(long)]
        slope_threshold: Option<f64>,
        /// Foothill buffer for OLD (metres)
        #[arg(long)]
        foothill_buffer: Option<f64>,
        /// Gap bridging distance for OLD (metres)
        #[arg(long)]
        gap_bridge: Option<f64>,
        /// Relief threshold for NEW (metres)
        #[arg(long)]
        relief_threshold: Option<f64>,
        /// Relief search radius (metres)
        #[arg(long)]
        relief_radius: Option<f64>,
        /// Contour interval (metres)
        #[arg(long)]
        contour_interval: Option<f64>,
        /// Nearest-neighbour search radius (metres)
        #[arg(long)]
        max_distance: Option<f64>,
        /// Write the full JSON report here instead of printing a summary
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Sample elevations along a straight transect
    Profile {
        /// Input DEM (GeoTIFF, projected metric CRS)
        input: PathBuf,
        /// Start point: x,y in the DEM CRS
        #[arg(long, value_parser = parse_point)]
        start: Point<f64>,
        /// End point: x,y in the DEM CRS
        #[arg(long, value_parser = parse_point)]
        end: Point<f64>,
        /// Sample spacing (metres)
        #[arg(long, default_value = "100")]
        step: f64,
        /// Write the samples as JSON here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn fallback_crs(epsg: Option<u32>) -> CRS {
    epsg.map(CRS::from_epsg).unwrap_or(CRS::UNKNOWN)
}

fn read_dem(path: &Path, epsg: Option<u32>) -> Result<ElevationGrid> {
    let pb = spinner("Reading DEM...");
    let grid = GeoTiffDem::new(path)
        .and_then(|dem| dem.read(&fallback_crs(epsg)))
        .with_context(|| format!("Failed to read DEM {}", path.display()))?;
    pb.finish_and_clear();
    Ok(grid)
}

/// Load `path` cropped to `bbox` (plus margin), or whole when no box is given
fn load_region(path: &Path, epsg: Option<u32>, bbox: Option<Bounds>, buffer: f64) -> Result<ElevationGrid> {
    let grid = read_dem(path, epsg)?;
    match bbox {
        None => Ok(grid),
        Some(bounds) => {
            let crs = grid.crs().clone();
            ridgeline_core::source::InMemoryDem::new(grid)
                .load_for_region(bounds, &crs, buffer)
                .context("Failed to crop DEM to the region")
        }
    }
}

fn parse_numbers<const N: usize>(s: &str) -> std::result::Result<[f64; N], String> {
    let values: Vec<f64> = s
        .split(',')
        .map(|v| v.trim().parse::<f64>().map_err(|e| format!("'{v}': {e}")))
        .collect::<std::result::Result<_, _>>()?;
    values
        .try_into()
        .map_err(|v: Vec<f64>| format!("expected {N} comma-separated numbers, got {}", v.len()))
}

fn parse_bbox(s: &str) -> std::result::Result<Bounds, String> {
    let [min_x, min_y, max_x, max_y] = parse_numbers::<4>(s)?;
    Ok(Bounds::new(min_x, min_y, max_x, max_y))
}

fn parse_point(s: &str) -> std::result::Result<Point<f64>, String> {
    let [x, y] = parse_numbers::<2>(s)?;
    Ok(Point::new(x, y))
}

fn read_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    let Some(path) = path else {
        return Ok(AnalysisConfig::default());
    };
    let file = File::open(path).with_context(|| format!("Cannot open config {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Invalid config {}", path.display()))
}

fn region_for(bounds: Bounds, name: &str, state: &str) -> RegionBoundary {
    let Bounds { min_x, min_y, max_x, max_y } = bounds;
    RegionBoundary::new(
        name,
        state,
        polygon![(x: min_x, y: min_y), (x: max_x, y: min_y), (x: max_x, y: max_y), (x: min_x, y: max_y)],
    )
}

fn grid_bounds(grid: &ElevationGrid) -> Bounds {
    let (rows, cols) = grid.shape();
    Bounds::from_tuple(grid.transform().bounds(cols, rows))
}

fn write_json<T: serde::Serialize>(value: &T, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Cannot create {}", path.display()))?;
    serde_json::to_writer_pretty(file, value).context("Failed to write JSON")?;
    Ok(())
}

fn done(name: &str, elapsed: std::time::Duration) {
    info!("{} completed in {:.2?}", name, elapsed);
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        // ── Info ─────────────────────────────────────────────────────
        Commands::Info { input } => {
            let grid = read_dem(&input, cli.epsg)?;
            let (rows, cols) = grid.shape();
            let bounds = grid_bounds(&grid);

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, rows * cols);
            println!("Pixel size: {:.3} m", grid.pixel_size_m());
            println!(
                "Bounds: ({:.3}, {:.3}) - ({:.3}, {:.3})",
                bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y
            );
            println!("CRS: {}", grid.crs().identifier());
            if grid.crs().is_geographic() {
                println!("  (geographic: reproject to a metric CRS before comparing)");
            }

            match grid.finite_stats() {
                Some(stats) => {
                    println!("\nElevation:");
                    println!("  Min: {:.2}", stats.min);
                    println!("  Max: {:.2}", stats.max);
                    println!("  Mean: {:.2}", stats.mean);
                    println!(
                        "  Valid cells: {} ({:.1}%)",
                        stats.count,
                        100.0 * stats.count as f64 / (rows * cols) as f64
                    );
                }
                None => println!("\nElevation: no valid cells"),
            }
        }

        // ── Compare ──────────────────────────────────────────────────
        Commands::Compare {
            input,
            config,
            method,
            bbox,
            region_name,
            region_state,
            buffer,
            exclude,
            slope_threshold,
            foothill_buffer,
            gap_bridge,
            relief_threshold,
            relief_radius,
            contour_interval,
            max_distance,
            output,
        } => {
            let mut run_config = read_config(config.as_deref())?;
            if let Some(method) = method {
                run_config.new.method = method.parse::<NewMethod>()?;
            }
            let overrides = [
                (slope_threshold, &mut run_config.old.slope_threshold_deg),
                (foothill_buffer, &mut run_config.old.foothill_buffer_m),
                (gap_bridge, &mut run_config.old.gap_bridge_m),
                (relief_threshold, &mut run_config.new.relief_threshold_m),
                (relief_radius, &mut run_config.new.relief_radius_m),
                (contour_interval, &mut run_config.new.contour_interval_m),
                (max_distance, &mut run_config.max_distance_m),
            ];
            for (flag, field) in overrides {
                if let Some(value) = flag {
                    *field = value;
                }
            }
            run_config.validate()?;

            let dem = load_region(&input, cli.epsg, bbox, buffer)?;
            let exclusion = match exclude {
                None => Exclusion::Absent,
                Some(path) => {
                    let raster = load_region(&path, cli.epsg, bbox, buffer)?;
                    if raster.shape() != dem.shape() {
                        bail!(
                            "exclusion raster is {:?} but the DEM is {:?}",
                            raster.shape(),
                            dem.shape()
                        );
                    }
                    Exclusion::Computed(raster.raster().map(|v| v.is_finite() && v != 0.0))
                }
            };
            let region = region_for(bbox.unwrap_or_else(|| grid_bounds(&dem)), &region_name, &region_state);

            let pb = spinner("Delineating...");
            let start = Instant::now();
            let outcome = run_analysis(&dem, &exclusion, &[region], &run_config)
                .context("Comparison run failed")?;
            pb.finish_and_clear();
            done("Comparison", start.elapsed());

            match output {
                Some(path) => {
                    write_json(&outcome.report(), &path)?;
                    println!("Report written to {}", path.display());
                }
                None => {
                    let s = &outcome.summary;
                    println!("{}", run_config.legal_status.disclaimer());
                    println!("OLD ({}): {:.2} km²", outcome.old.tag, s.old_km2);
                    println!("NEW ({}): {:.2} km²", outcome.new.tag, s.new_km2);
                    println!("Change: {:+.2} km² ({:+.1}%)", s.change_km2, s.change_pct);
                    for row in &outcome.regions {
                        println!(
                            "  {}: OLD {:.1}% / NEW {:.1}% of {:.2} km²",
                            row.district, row.old_pct_of_district, row.new_pct_of_district, row.district_area_km2
                        );
                    }
                    if let Some(d) = &outcome.distance_summary {
                        println!(
                            "Gaps between NEW landforms: {} (min {:.1} m, median {:.1} m, max {:.1} m)",
                            d.count, d.min_m, d.median_m, d.max_m
                        );
                    }
                }
            }
        }

        // ── Profile ──────────────────────────────────────────────────
        Commands::Profile {
            input,
            start,
            end,
            step,
            output,
        } => {
            let grid = read_dem(&input, cli.epsg)?;
            let timer = Instant::now();
            let profile = elevation_profile(&grid, start, end, step).context("Profile failed")?;
            done("Profile", timer.elapsed());

            println!("Distance: {:.2} km, {} samples", profile.length_m / 1000.0, profile.samples.len());
            match &profile.summary {
                Some(s) => println!(
                    "Elevation: min {:.1} m, max {:.1} m, mean {:.1} m",
                    s.min, s.max, s.mean
                ),
                None => println!("Elevation: transect lies outside the valid data"),
            }
            if let Some(path) = output {
                write_json(&profile, &path)?;
                println!("Samples written to {}", path.display());
            }
        }
    }

    Ok(())
}
