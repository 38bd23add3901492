//! Per-flow totals written at the end of a run.

use crate::routing::ProtocolChoice;
use crate::sim::NodeId;
use color_eyre::eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;

/// Totals of one sender → sink flow over the whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowStats {
    pub flow_id: usize,
    pub source: NodeId,
    pub sink: NodeId,
    pub sink_address: Ipv4Addr,
    pub port: u16,
    pub tx_packets: u64,
    pub tx_bytes: u64,
    pub rx_packets: u64,
    pub rx_bytes: u64,
    /// Fraction of sent packets that reached the sink.
    pub delivery_ratio: f64,
}

impl FlowStats {
    pub fn delivery_ratio(tx_packets: u64, rx_packets: u64) -> f64 {
        if tx_packets == 0 {
            0.0
        } else {
            rx_packets as f64 / tx_packets as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowSummary {
    pub generated_at: String,
    pub protocol: ProtocolChoice,
    pub nodes: usize,
    pub total_time_seconds: f64,
    pub flows: Vec<FlowStats>,
}

impl FlowSummary {
    pub fn new(protocol: ProtocolChoice, nodes: usize, total_time_seconds: f64, flows: Vec<FlowStats>) -> Self {
        FlowSummary {
            generated_at: chrono::Utc::now().to_rfc3339(),
            protocol,
            nodes,
            total_time_seconds,
            flows,
        }
    }

    pub fn rx_packets(&self) -> u64 {
        self.flows.iter().map(|f| f.rx_packets).sum()
    }
}

pub fn write_flow_summary(summary: &FlowSummary, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).context("Failed to serialize flow summary to JSON")?;

    fs::write(output_path, json)
        .with_context(|| format!("Failed to write flow summary to {}", output_path.display()))?;

    log::info!("Flow summary written to {}", output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_summary_round_trips_through_file() {
        let flows = vec![FlowStats {
            flow_id: 0,
            source: 2,
            sink: 0,
            sink_address: Ipv4Addr::new(10, 1, 1, 1),
            port: 9,
            tx_packets: 5,
            tx_bytes: 5000,
            rx_packets: 4,
            rx_bytes: 4000,
            delivery_ratio: FlowStats::delivery_ratio(5, 4),
        }];
        let summary = FlowSummary::new(ProtocolChoice::Olsr, 10, 5.0, flows);

        let file = NamedTempFile::new().unwrap();
        write_flow_summary(&summary, file.path()).unwrap();

        let text = std::fs::read_to_string(file.path()).unwrap();
        assert!(text.contains("\"protocol\": \"OLSR\""));
        let parsed: FlowSummary = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, summary);
        assert_eq!(parsed.rx_packets(), 4);
        assert_eq!(parsed.flows[0].delivery_ratio, 0.8);
    }

    #[test]
    fn test_delivery_ratio_without_traffic() {
        assert_eq!(FlowStats::delivery_ratio(0, 0), 0.0);
    }
}
