use clap::Parser;
use color_eyre::Result;
use env_logger::Env;
use log::{info, warn, LevelFilter};
use std::path::PathBuf;

use fanetsim::config::Config;
use fanetsim::config_loader::{self, CliOverrides};
use fanetsim::orchestrator::{run_experiment, run_protocol_sweep};
use fanetsim::routing::ProtocolChoice;

/// Throughput comparison of MANET routing protocols on a simulated ad-hoc network
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to an experiment configuration YAML file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output CSV file [default: routingProtocolsFANET.csv]
    #[arg(long)]
    csv_file_name: Option<String>,

    /// Routing protocol, by code or name: 1=OLSR, 2=AODV, 3=DSDV, 4=DSR [default: 2]
    #[arg(long)]
    protocol: Option<ProtocolChoice>,

    /// Write the node placement trace next to the CSV; `--trace-mobility false` turns it off
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    trace_mobility: Option<bool>,

    /// Number of sinks [default: 2]
    #[arg(long)]
    sinks: Option<usize>,

    /// Transmission power in dBm [default: 27.0]
    #[arg(long)]
    tx_power: Option<f64>,

    /// Simulated time, e.g. "60", "60s", "1m" [default: 60s]
    #[arg(long)]
    total_time: Option<String>,

    /// Sampling interval [default: 1s]
    #[arg(long)]
    interval: Option<String>,

    /// Number of nodes [default: 10]
    #[arg(long)]
    nodes: Option<usize>,

    /// Run all four protocols in parallel, one CSV each
    #[arg(long)]
    sweep: bool,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            output_file: self.csv_file_name.clone(),
            protocol: self.protocol.map(ProtocolChoice::code),
            trace_mobility: self.trace_mobility,
            sinks: self.sinks,
            tx_power_dbm: self.tx_power,
            total_time: self.total_time.clone(),
            sample_interval: self.interval.clone(),
            nodes: self.nodes,
        }
    }
}

/// Level filter for a `general.log_level` value such as "debug" or "WARN".
fn configured_level(level: &str) -> Option<LevelFilter> {
    level.trim().parse().ok()
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging. Without RUST_LOG the logger passes everything and
    // the global max level does the filtering, so the configured level can
    // still take effect once the file is loaded.
    let rust_log_set = std::env::var_os("RUST_LOG").is_some();
    env_logger::Builder::from_env(Env::default().default_filter_or("trace")).init();
    if !rust_log_set {
        log::set_max_level(LevelFilter::Info);
    }

    // Load configuration, falling back to built-in defaults
    let mut config = match &args.config {
        Some(path) => config_loader::load_config(path)?,
        None => Config::default(),
    };

    if !rust_log_set {
        if let Some(level) = config.general.log_level.as_deref() {
            match configured_level(level) {
                Some(filter) => log::set_max_level(filter),
                None => warn!("Ignoring unknown log level '{}'", level),
            }
        }
    }

    config_loader::apply_cli_overrides(&mut config, &args.overrides())?;

    if args.sweep {
        for report in run_protocol_sweep(&config)? {
            info!(
                "{}: {} rows written to {}",
                report.protocol,
                report.rows,
                report.csv_path.display()
            );
        }
    } else {
        let report = run_experiment(&config)?;
        info!("{} rows written to {}", report.rows, report.csv_path.display());
    }

    info!("Experiment completed successfully");
    Ok(())
}
