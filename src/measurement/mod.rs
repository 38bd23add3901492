//! Throughput measurement.
//!
//! Sinks count what they receive into a shared set of [`Counters`]; the
//! [`SampleRecorder`] drains those counters once per sampling interval and
//! turns them into [`Sample`] rows.

pub mod counters;
pub mod recorder;
pub mod sink;

pub use counters::Counters;
pub use recorder::{kilobits_per_second, Sample, SampleRecorder};
pub use sink::PacketSink;
