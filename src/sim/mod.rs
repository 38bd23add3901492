//! Discrete-event engine stand-in.
//!
//! The measurement harness runs on top of a network simulator. This module
//! provides the smallest engine that makes the harness runnable: a simulated
//! clock, a single-threaded event queue, a periodic timer bound to the run
//! horizon and an ideal ad-hoc channel.

pub mod network;
pub mod scheduler;
pub mod time;
pub mod timer;

pub use network::{AdhocNetwork, Datagram, NodeId, PlacementBox, Position};
pub use scheduler::{EventQueue, Phase};
pub use time::SimTime;
pub use timer::PeriodicTimer;
