//! gnuplot3d - stream 3D scatter data into a gnuplot window
//!
//! Without arguments this runs the classic demo: a single point travelling
//! along the diagonal of the unit cube, a few passes over.
//!
//! # Quick Start
//!
//! ```text
//! gnuplot3d                      # diagonal demo, 5 passes
//! gnuplot3d --passes 1 -t qt     # one pass on the qt terminal
//! gnuplot3d --points cloud.txt   # plot "x y z" lines from a file
//! seq 0 0.1 1 | awk '{print $1, $1*$1, 0}' | gnuplot3d --points -
//! ```

use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal};
use std::path::PathBuf;

use anyhow::{bail, Context};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use gnuplot3d::{PlotConfig, PlotOptions, PlotSession, Point3};

/// Log filter variable
const LOG_ENV: &str = "GNUPLOT3D_LOG";

/// Step between demo positions along the diagonal
const DEMO_STEP: f64 = 0.01;

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Command line configuration
#[derive(Debug, Default)]
struct Cli {
    /// Config file overriding ~/.gnuplot3d/config.toml
    config_path: Option<PathBuf>,
    /// Options given on the command line, applied over the config file
    overrides: PlotOptions,
    /// Diagonal demo passes
    passes: u32,
    /// Point source: a file path or "-" for stdin
    points: Option<String>,
    /// Print the effective configuration and exit
    print_config: bool,
}

fn print_version() {
    eprintln!("gnuplot3d {}", VERSION);
}

fn print_help() {
    eprintln!("gnuplot3d {} - Stream 3D scatter data into gnuplot", VERSION);
    eprintln!();
    eprintln!("Usage: gnuplot3d [OPTIONS]");
    eprintln!();
    eprintln!("Plot options:");
    eprintln!("  (default)             Point travelling the cube diagonal");
    eprintln!("  --passes <N>          Number of demo passes (default: 5)");
    eprintln!("  --points <FILE|->     Plot 'x y z' lines from FILE or stdin");
    eprintln!();
    eprintln!("gnuplot options:");
    eprintln!("  -c, --config <PATH>   Config file (default: ~/.gnuplot3d/config.toml)");
    eprintln!("  -g, --gnuplot <PATH>  gnuplot executable");
    eprintln!("  -t, --term <KIND>     gnuplot terminal (wxt, qt, x11, ...)");
    eprintln!("  --size <W>x<H>        Window size in pixels (default: 300x400)");
    eprintln!("  --no-persist          Close the gnuplot window on exit");
    eprintln!();
    eprintln!("Other options:");
    eprintln!("  --print-config        Print the effective configuration");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Logging: set {}=debug for process details", LOG_ENV);
}

fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .split_once(|c: char| c == 'x' || c == 'X')
        .ok_or_else(|| format!("Invalid size '{}', expected <W>x<H>", value))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<u32>()
            .map_err(|_| format!("Invalid size '{}', expected <W>x<H>", value))
    };
    Ok((parse(w)?, parse(h)?))
}

fn parse_args<I>(args: I) -> Result<Cli, String>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();
    let mut cli = Cli {
        passes: 5,
        ..Cli::default()
    };
    let mut i = 1;

    let value = |i: usize, flag: &str| -> Result<String, String> {
        args.get(i)
            .cloned()
            .ok_or_else(|| format!("Missing value for {}", flag))
    };

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-c" | "--config" => {
                i += 1;
                cli.config_path = Some(PathBuf::from(value(i, "--config")?));
            }
            "-g" | "--gnuplot" => {
                i += 1;
                cli.overrides.executable = Some(value(i, "--gnuplot")?);
            }
            "-t" | "--term" => {
                i += 1;
                cli.overrides.terminal = Some(value(i, "--term")?);
            }
            "--size" => {
                i += 1;
                let (width, height) = parse_size(&value(i, "--size")?)?;
                cli.overrides.width = Some(width);
                cli.overrides.height = Some(height);
            }
            "--no-persist" => {
                cli.overrides.persist = Some(false);
            }
            "--passes" => {
                i += 1;
                let raw = value(i, "--passes")?;
                cli.passes = raw
                    .parse()
                    .map_err(|_| format!("Invalid pass count '{}'", raw))?;
            }
            "--points" => {
                i += 1;
                cli.points = Some(value(i, "--points")?);
            }
            "--print-config" => {
                cli.print_config = true;
            }
            arg => {
                return Err(format!("Unknown argument: {}. Use -h for help.", arg));
            }
        }
        i += 1;
    }

    Ok(cli)
}

/// Read whitespace separated `x y z` lines; blank lines and `#` comments are skipped
fn read_points(reader: impl BufRead) -> anyhow::Result<Vec<Point3>> {
    let mut points = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("Failed to read line {}", line_no))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 3 {
            bail!("line {}: expected 3 numbers, found {}", line_no, fields.len());
        }
        let mut coords = [0.0; 3];
        for (coord, field) in coords.iter_mut().zip(&fields) {
            *coord = field
                .parse()
                .with_context(|| format!("line {}: '{}' is not a number", line_no, field))?;
        }
        points.push(Point3::from(coords));
    }

    Ok(points)
}

fn load_points(source: &str) -> anyhow::Result<Vec<Point3>> {
    if source == "-" {
        return read_points(io::stdin().lock());
    }
    let file = File::open(source).with_context(|| format!("Failed to open {}", source))?;
    read_points(BufReader::new(file)).with_context(|| format!("Failed to parse {}", source))
}

/// Positions from -1.0 towards 1.0 along the diagonal, end excluded
fn diagonal() -> impl Iterator<Item = Point3> {
    let steps = (2.0 / DEMO_STEP).round() as u32;
    (0..steps).map(|k| {
        let t = -1.0 + f64::from(k) * DEMO_STEP;
        Point3::new(t, t, t)
    })
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() -> anyhow::Result<()> {
    let cli = match parse_args(env::args()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    init_logging();

    // Merge config: command line args override config file
    let file_options = match &cli.config_path {
        Some(path) => PlotOptions::load_from(path)
            .with_context(|| format!("Invalid config file {}", path.display()))?,
        None => PlotOptions::load().context("Invalid config file")?,
    };
    let config = PlotConfig::new(file_options.merge(cli.overrides.clone()))?;

    if cli.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    // Parse points before gnuplot starts so bad input never opens a window
    let points = cli.points.as_deref().map(load_points).transpose()?;

    info!(
        "gnuplot: {} ({}, {}x{})",
        config.executable(),
        config.terminal(),
        config.width(),
        config.height()
    );

    let session = PlotSession::new(config);
    session.scope(|gp| -> anyhow::Result<()> {
        gp.initialize_unit_cube()?;

        match points {
            Some(points) => {
                info!("Plotting {} points", points.len());
                gp.send_points(points)?;
            }
            None => {
                for pass in 0..cli.passes {
                    println!("{}", pass);
                    for point in diagonal() {
                        gp.send_points([point])?;
                    }
                }
            }
        }
        Ok(())
    })
}
