use crate::config::Config;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs::File;
use std::path::Path;

/// Load and parse configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<Config> {
    info!("Loading configuration from: {:?}", config_path);

    // Open the configuration file
    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open configuration file {:?}", config_path))?;

    // Parse the YAML content
    let config: Config = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse configuration file {:?}", config_path))?;

    // Validate the configuration
    config.validate()?;

    Ok(config)
}

/// Command line values that take precedence over the YAML file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub output_file: Option<String>,
    pub protocol: Option<u32>,
    pub trace_mobility: Option<bool>,
    pub sinks: Option<usize>,
    pub tx_power_dbm: Option<f64>,
    pub total_time: Option<String>,
    pub sample_interval: Option<String>,
    pub nodes: Option<usize>,
}

/// Apply CLI overrides to a configuration
pub fn apply_cli_overrides(config: &mut Config, overrides: &CliOverrides) -> Result<()> {
    if let Some(output_file) = &overrides.output_file {
        config.general.output_file = output_file.clone();
    }
    if let Some(trace) = overrides.trace_mobility {
        config.general.trace_mobility = trace;
    }
    if let Some(protocol) = overrides.protocol {
        config.experiment.protocol = protocol;
    }
    if let Some(sinks) = overrides.sinks {
        config.experiment.sinks = sinks;
    }
    if let Some(power) = overrides.tx_power_dbm {
        config.experiment.tx_power_dbm = power;
    }
    if let Some(total_time) = &overrides.total_time {
        config.experiment.total_time = total_time.clone();
    }
    if let Some(interval) = &overrides.sample_interval {
        config.experiment.sample_interval = interval.clone();
    }
    if let Some(nodes) = overrides.nodes {
        config.experiment.nodes = nodes;
    }

    // Re-validate after applying overrides
    config.validate()?;

    if let Ok(protocol) = config.protocol() {
        info!(
            "Experiment: {} with {} nodes, {} sinks at {} dBm",
            protocol,
            config.experiment.nodes,
            config.experiment.sinks,
            config.experiment.tx_power_dbm
        );
    }

    Ok(())
}
