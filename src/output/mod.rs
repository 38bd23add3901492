//! Result files.
//!
//! The CSV sample stream is the primary output of a run; the JSON flow
//! summary is written once at teardown.

pub mod summary;
pub mod writer;

pub use summary::{write_flow_summary, FlowStats, FlowSummary};
pub use writer::{ResultWriter, HEADER};
