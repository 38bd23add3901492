//! Traffic generation.
//!
//! Builds the sender/receiver pairings of a run and the constant-rate senders
//! that drive them.

pub mod onoff;
pub mod plan;

pub use onoff::{OnOffSender, SenderProfile};
pub use plan::{Flow, TrafficPlan, FLOW_STOP_GUARD, SENDER_PORT};
