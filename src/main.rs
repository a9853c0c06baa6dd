//! RSSI Signal Capture CLI
//!
//! Replays recorded reading streams through a capture window and writes the
//! resulting fingerprints as JSON lines.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use rssi_signal_capture::{process_records, CaptureWindow, FieldMapping, WindowConfig, VERSION};
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rssi-capture")]
#[command(version = VERSION)]
#[command(about = "Turn per-sensor RSSI readings into fingerprints", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay readings through a capture window
    Process {
        /// Window configuration file (defaults to the user config location)
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Readings as a JSON array or JSON lines ("-" for stdin)
        #[arg(long, short, default_value = "-")]
        input: PathBuf,

        /// Fingerprint output, one JSON object per line ("-" for stdout)
        #[arg(long, short, default_value = "-")]
        output: PathBuf,

        /// Record field holding the timestamp
        #[arg(long, default_value = "timestamp")]
        timestamp_field: String,

        /// Record field holding the sensor id
        #[arg(long, default_value = "mac_sensor")]
        sensor_field: String,

        /// Record field holding the signal value
        #[arg(long, default_value = "rssi")]
        signal_field: String,

        /// Record fields copied into each fingerprint
        #[arg(long, value_delimiter = ',')]
        passthrough: Vec<String>,

        /// Clear the window before and after the batch
        #[arg(long)]
        reset: bool,
    },

    /// Show configuration
    Config {
        /// Configuration file to show instead of the default location
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Check a configuration file without processing anything
    Validate {
        #[arg(long, short)]
        config: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            config,
            input,
            output,
            timestamp_field,
            sensor_field,
            signal_field,
            passthrough,
            reset,
        } => {
            let mapping = FieldMapping {
                timestamp_field,
                sensor_field,
                signal_field,
                passthrough_fields: passthrough,
            };
            cmd_process(config.as_deref(), &input, &output, &mapping, reset)
        }
        Commands::Config { path } => cmd_config(path.as_deref()),
        Commands::Validate { config } => cmd_validate(&config),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<WindowConfig> {
    let config = match path {
        Some(path) => WindowConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => WindowConfig::load_default().context("Failed to load default config")?,
    };
    Ok(config)
}

fn cmd_process(
    config_path: Option<&Path>,
    input: &Path,
    output: &Path,
    mapping: &FieldMapping,
    reset: bool,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    if config.sensor_ids.is_empty() {
        bail!("No sensor ids configured");
    }

    info!(
        sensors = config.sensor_ids.len(),
        filter_method = %config.filter_method,
        min_window_size = config.min_window_size,
        max_window_size = config.max_window_size,
        "Starting capture"
    );

    let mut window = CaptureWindow::try_new(config).context("Invalid window configuration")?;
    let records = read_records(input)?;
    let fingerprints = process_records(&mut window, &records, mapping, reset)?;

    let mut writer = open_output(output)?;
    for fingerprint in &fingerprints {
        serde_json::to_writer(&mut writer, fingerprint)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    let stats = window.stats();
    info!(
        records = records.len(),
        fingerprints = fingerprints.len(),
        evicted = stats.readings_evicted,
        pending = window.len(),
        "Capture finished"
    );

    Ok(())
}

fn cmd_config(path: Option<&Path>) -> anyhow::Result<()> {
    let shown = path
        .map(Path::to_path_buf)
        .unwrap_or_else(WindowConfig::default_path);
    let config = load_config(path)?;

    println!("Configuration ({})", shown.display());
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn cmd_validate(path: &Path) -> anyhow::Result<()> {
    let config = load_config(Some(path))?;
    config
        .validate()
        .with_context(|| format!("{} is not a valid configuration", path.display()))?;

    println!(
        "{}: OK ({} sensors, filter {})",
        path.display(),
        config.sensor_ids.len(),
        config.filter_method
    );
    Ok(())
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Read records as a JSON array or as JSON lines.
fn read_records(path: &Path) -> anyhow::Result<Vec<Value>> {
    let mut content = String::new();
    if is_stdio(path) {
        io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read stdin")?;
    } else {
        File::open(path)
            .and_then(|mut file| file.read_to_string(&mut content))
            .with_context(|| format!("Failed to read {}", path.display()))?;
    }

    if content.trim_start().starts_with('[') {
        return serde_json::from_str(&content).context("Failed to parse JSON array");
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(number, line)| {
            serde_json::from_str(line).with_context(|| format!("Invalid JSON on line {}", number + 1))
        })
        .collect()
}

fn open_output(path: &Path) -> anyhow::Result<Box<dyn Write>> {
    if is_stdio(path) {
        return Ok(Box::new(BufWriter::new(io::stdout().lock())));
    }

    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}
