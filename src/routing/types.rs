//! Routing protocol type definitions.

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Priority given to the single entry of a list-routing installation.
pub const LIST_ROUTING_PRIORITY: i16 = 100;

/// Routing protocol under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProtocolChoice {
    /// Optimized Link State Routing (proactive)
    #[serde(rename = "OLSR")]
    Olsr,
    /// Ad hoc On-Demand Distance Vector (reactive)
    #[serde(rename = "AODV")]
    Aodv,
    /// Destination-Sequenced Distance Vector (proactive)
    #[serde(rename = "DSDV")]
    Dsdv,
    /// Dynamic Source Routing (reactive, installed as a separate agent)
    #[serde(rename = "DSR")]
    Dsr,
}

/// How a protocol gets bound to the nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InstallPath {
    /// Protocol registered in a priority list and installed with the internet stack.
    ListRouting,
    /// Internet stack installed first, routing agent attached afterwards.
    TwoStep,
}

impl ProtocolChoice {
    pub const ALL: [ProtocolChoice; 4] = [
        ProtocolChoice::Olsr,
        ProtocolChoice::Aodv,
        ProtocolChoice::Dsdv,
        ProtocolChoice::Dsr,
    ];

    /// Select a protocol from its numeric code (1=OLSR, 2=AODV, 3=DSDV, 4=DSR).
    pub fn from_code(code: u32) -> Result<Self, ConfigError> {
        match code {
            1 => Ok(ProtocolChoice::Olsr),
            2 => Ok(ProtocolChoice::Aodv),
            3 => Ok(ProtocolChoice::Dsdv),
            4 => Ok(ProtocolChoice::Dsr),
            other => Err(ConfigError::UnknownProtocol(other)),
        }
    }

    pub fn code(self) -> u32 {
        match self {
            ProtocolChoice::Olsr => 1,
            ProtocolChoice::Aodv => 2,
            ProtocolChoice::Dsdv => 3,
            ProtocolChoice::Dsr => 4,
        }
    }

    /// Name as written to result files.
    pub fn name(self) -> &'static str {
        match self {
            ProtocolChoice::Olsr => "OLSR",
            ProtocolChoice::Aodv => "AODV",
            ProtocolChoice::Dsdv => "DSDV",
            ProtocolChoice::Dsr => "DSR",
        }
    }

    pub fn install_path(self) -> InstallPath {
        match self {
            ProtocolChoice::Olsr | ProtocolChoice::Aodv | ProtocolChoice::Dsdv => InstallPath::ListRouting,
            ProtocolChoice::Dsr => InstallPath::TwoStep,
        }
    }
}

impl fmt::Display for ProtocolChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts either a protocol name (any case) or its numeric code.
impl FromStr for ProtocolChoice {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<u32>() {
            return ProtocolChoice::from_code(code);
        }
        ProtocolChoice::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::Invalid(format!("unknown routing protocol '{}'", s)))
    }
}

/// Prioritised list of routing protocols handed to the internet stack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRouting {
    entries: Vec<(ProtocolChoice, i16)>,
}

impl ListRouting {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, protocol: ProtocolChoice, priority: i16) {
        self.entries.push((protocol, priority));
    }

    pub fn entries(&self) -> &[(ProtocolChoice, i16)] {
        &self.entries
    }
}
