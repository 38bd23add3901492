//! # fanetsim - Routing protocol throughput experiments for ad-hoc networks
//!
//! Runs one experiment per invocation: a fixed set of nodes, one routing
//! protocol (OLSR, AODV, DSDV or DSR), a number of sender → sink flows, and a
//! sampler that writes the receive rate observed across all sinks to a CSV file
//! once per interval.
//!
//! ## Architecture
//!
//! - `config`: experiment configuration, defaults and validation
//! - `config_loader`: YAML loading and command line overrides
//! - `sim`: simulated clock, event queue, periodic timer and ad-hoc channel
//! - `ip`: node address allocation
//! - `routing`: protocol selection and installation
//! - `traffic`: flow pairing and constant-rate senders
//! - `measurement`: sinks, shared counters and periodic sampling
//! - `output`: CSV result stream and JSON flow summary
//! - `orchestrator`: experiment setup, event loop and teardown
//! - `utils`: helpers
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use fanetsim::config::Config;
//! use fanetsim::orchestrator;
//!
//! let mut config = Config::default();
//! config.experiment.protocol = 1; // OLSR
//! config.general.output_file = "olsr.csv".to_string();
//!
//! let report = orchestrator::run_experiment(&config)?;
//! println!("{} rows written", report.rows);
//! # Ok::<(), color_eyre::eyre::Error>(())
//! ```
//!
//! ## Output
//!
//! ```text
//! SimulationSecond,ReceiveRate,PacketsReceived,NumberOfSinks,RoutingProtocol,TransmissionPower
//! 0.0,16.0,2,2,AODV,27.0
//! ```
//!
//! ## Error Handling
//!
//! Configuration problems are reported as [`config::ConfigError`] before any
//! simulated time passes. Everything else is propagated as a
//! `color_eyre::eyre::Error` with context attached.

pub mod config;
pub mod config_loader;
pub mod ip;
pub mod measurement;
pub mod orchestrator;
pub mod output;
pub mod routing;
pub mod sim;
pub mod traffic;
pub mod utils;
