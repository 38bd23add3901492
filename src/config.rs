use crate::ip::AddressAllocator;
use crate::routing::ProtocolChoice;
use crate::sim::PlacementBox;
use crate::traffic::SenderProfile;
use crate::utils::duration::parse_duration_to_seconds;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Experiment configuration, one section per concern
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub experiment: ExperimentConfig,
    pub traffic: TrafficConfig,
    pub network: NetworkConfig,
}

impl Config {
    /// Validate the configuration
    ///
    /// Every check that can fail a run happens here, before any simulated
    /// time advances.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate general settings
        if self.general.output_file.trim().is_empty() {
            return Err(ConfigError::Invalid("output_file cannot be empty".to_string()));
        }

        // Validate experiment settings
        self.protocol()?;
        let horizon = self.total_time()?;
        let interval = self.sample_interval()?;
        if horizon.is_zero() {
            return Err(ConfigError::Invalid("total_time must be positive".to_string()));
        }
        if interval.is_zero() {
            return Err(ConfigError::Invalid("sample_interval must be positive".to_string()));
        }
        if !self.experiment.tx_power_dbm.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "tx_power_dbm must be finite, got {}",
                self.experiment.tx_power_dbm
            )));
        }
        let senders = self.experiment.nodes.saturating_sub(self.experiment.sinks);
        if self.experiment.sinks == 0 || senders < self.experiment.sinks {
            return Err(ConfigError::Pairing {
                sinks: self.experiment.sinks,
                senders,
            });
        }

        // Validate traffic settings
        if self.traffic.packet_size == 0 {
            return Err(ConfigError::Invalid("packet_size must be positive".to_string()));
        }
        if self.traffic.data_rate == 0 {
            return Err(ConfigError::Invalid("data_rate must be positive".to_string()));
        }
        if !self.sender_profile().has_resolvable_gap() {
            return Err(ConfigError::Invalid(format!(
                "data_rate {} bit/s sends {}-byte packets less than 1ns apart",
                self.traffic.data_rate, self.traffic.packet_size
            )));
        }
        self.start_jitter()?;

        // Validate network settings
        let allocator = AddressAllocator::new(self.network.address_base, self.network.address_mask)?;
        if self.experiment.nodes > allocator.capacity() {
            return Err(ConfigError::AddressSpace {
                nodes: self.experiment.nodes,
                capacity: allocator.capacity(),
            });
        }
        let area = &self.network.placement;
        if [area.x, area.y, area.z].iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ConfigError::Invalid(format!(
                "placement box must be finite and non-negative, got {}x{}x{}",
                area.x, area.y, area.z
            )));
        }

        Ok(())
    }

    /// Routing protocol selected by the numeric code
    pub fn protocol(&self) -> Result<ProtocolChoice, ConfigError> {
        ProtocolChoice::from_code(self.experiment.protocol)
    }

    /// Run horizon
    pub fn total_time(&self) -> Result<Duration, ConfigError> {
        parse_seconds("total_time", &self.experiment.total_time)
    }

    pub fn sample_interval(&self) -> Result<Duration, ConfigError> {
        parse_seconds("sample_interval", &self.experiment.sample_interval)
    }

    pub fn start_jitter(&self) -> Result<Option<Duration>, ConfigError> {
        self.traffic
            .start_jitter
            .as_deref()
            .map(|value| parse_seconds("start_jitter", value))
            .transpose()
    }

    pub fn sender_profile(&self) -> SenderProfile {
        SenderProfile {
            packet_size: self.traffic.packet_size,
            data_rate_bps: self.traffic.data_rate,
        }
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.general.output_file)
    }

    /// Copy of this configuration for another protocol, writing next to the
    /// original output file with the protocol name appended to the stem.
    pub fn for_protocol(&self, protocol: ProtocolChoice) -> Config {
        let mut config = self.clone();
        config.experiment.protocol = protocol.code();
        config.general.output_file = sibling_path(&self.output_path(), &format!("-{}", protocol), "csv")
            .to_string_lossy()
            .into_owned();
        config
    }
}

/// Path next to `path` with `suffix` appended to the file stem and the
/// extension replaced by `extension`.
pub fn sibling_path(path: &Path, suffix: &str, extension: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{}{}.{}", stem, suffix, extension))
}

fn parse_seconds(field: &str, value: &str) -> Result<Duration, ConfigError> {
    let secs = parse_duration_to_seconds(value)
        .map_err(|e| ConfigError::Invalid(format!("{}: {}", field, e)))?;
    Duration::try_from_secs_f64(secs).map_err(|e| ConfigError::Invalid(format!("{}: {}", field, e)))
}

/// Output and run-wide settings
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct GeneralConfig {
    /// CSV file receiving one row per sample
    pub output_file: String,
    /// Write per-flow totals as JSON next to the CSV
    pub flow_summary: bool,
    /// Write the node placement trace next to the CSV
    pub trace_mobility: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    /// Seed for node placement and start jitter
    pub seed: u64,
}

/// What is being measured
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ExperimentConfig {
    /// 1=OLSR, 2=AODV, 3=DSDV, 4=DSR
    pub protocol: u32,
    pub nodes: usize,
    pub sinks: usize,
    pub tx_power_dbm: f64,
    pub total_time: String,
    pub sample_interval: String,
}

/// Sender behaviour
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TrafficConfig {
    pub port: u16,
    /// Bytes per datagram
    pub packet_size: u32,
    /// Bits per second while a sender is on
    pub data_rate: u64,
    /// Upper bound of a random delay added to each sender's start
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_jitter: Option<String>,
}

/// Engine-side network settings
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct NetworkConfig {
    pub address_base: Ipv4Addr,
    pub address_mask: Ipv4Addr,
    #[serde(with = "humantime_serde")]
    pub propagation_delay: Duration,
    pub placement: PlacementBox,
}

/// Configuration errors. All of them are fatal and raised before the run starts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("No such protocol: {0} (expected 1=OLSR, 2=AODV, 3=DSDV, 4=DSR)")]
    UnknownProtocol(u32),
    #[error("Cannot pair {sinks} sinks with {senders} available sender nodes")]
    Pairing { sinks: usize, senders: usize },
    #[error("{nodes} nodes do not fit in an address space of {capacity} hosts")]
    AddressSpace { nodes: usize, capacity: usize },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Default implementations
impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_file: "routingProtocolsFANET.csv".to_string(),
            flow_summary: true,
            trace_mobility: false,
            log_level: Some("info".to_string()),
            seed: 12345,
        }
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            protocol: ProtocolChoice::Aodv.code(),
            nodes: 10,
            sinks: 2,
            tx_power_dbm: 27.0,
            total_time: "60s".to_string(),
            sample_interval: "1s".to_string(),
        }
    }
}

impl Default for TrafficConfig {
    fn default() -> Self {
        let profile = SenderProfile::default();
        Self {
            port: 9,
            packet_size: profile.packet_size,
            data_rate: profile.data_rate_bps,
            start_jitter: None,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            address_base: Ipv4Addr::new(10, 1, 1, 0),
            address_mask: Ipv4Addr::new(255, 255, 255, 0),
            propagation_delay: Duration::ZERO,
            placement: PlacementBox::default(),
        }
    }
}
