//! Periodic throughput sampling.

use super::counters::Counters;
use crate::routing::ProtocolChoice;
use crate::sim::{PeriodicTimer, SimTime};
use serde::Serialize;
use std::time::Duration;

/// One measurement row. Field order is the column order of the result file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    #[serde(rename = "SimulationSecond")]
    pub timestamp_seconds: f64,
    #[serde(rename = "ReceiveRate")]
    pub kilobits_per_second: f64,
    #[serde(rename = "PacketsReceived")]
    pub packets_received: u64,
    #[serde(rename = "NumberOfSinks")]
    pub num_sinks: usize,
    #[serde(rename = "RoutingProtocol")]
    pub protocol: ProtocolChoice,
    #[serde(rename = "TransmissionPower")]
    pub transmit_power_dbm: f64,
}

/// Turns the receive counters into one [`Sample`] per timer expiration.
#[derive(Debug)]
pub struct SampleRecorder {
    timer: PeriodicTimer,
    num_sinks: usize,
    protocol: ProtocolChoice,
    transmit_power_dbm: f64,
    packets_sampled: u64,
}

impl SampleRecorder {
    /// Sample every `interval` from time zero until `horizon`.
    pub fn new(
        interval: Duration,
        horizon: SimTime,
        num_sinks: usize,
        protocol: ProtocolChoice,
        transmit_power_dbm: f64,
    ) -> Self {
        SampleRecorder {
            timer: PeriodicTimer::new(SimTime::ZERO, interval, horizon),
            num_sinks,
            protocol,
            transmit_power_dbm,
            packets_sampled: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.timer.period()
    }

    /// Number of samples this recorder will produce over the run.
    pub fn expected_samples(&self) -> u64 {
        self.timer.limit()
    }

    pub fn samples_taken(&self) -> u64 {
        self.timer.expired()
    }

    /// Packets counted into samples so far.
    pub fn packets_sampled(&self) -> u64 {
        self.packets_sampled
    }

    /// Time of the first tick, or `None` if the horizon is shorter than one
    /// interval.
    pub fn first_tick(&self) -> Option<SimTime> {
        self.timer.deadline()
    }

    /// Read and reset the counters, producing a sample stamped `now`.
    ///
    /// Returns the sample together with the time of the next tick, if the
    /// horizon leaves room for one.
    pub fn tick(&mut self, counters: &mut Counters, now: SimTime) -> (Sample, Option<SimTime>) {
        let window = counters.take();
        let sample = Sample {
            timestamp_seconds: now.as_secs_f64(),
            kilobits_per_second: kilobits_per_second(window.bytes_total(), self.interval()),
            packets_received: window.packets_received(),
            num_sinks: self.num_sinks,
            protocol: self.protocol,
            transmit_power_dbm: self.transmit_power_dbm,
        };
        self.packets_sampled += sample.packets_received;
        log::debug!(
            "{} sample: {} kbps, {} packets",
            sample.timestamp_seconds,
            sample.kilobits_per_second,
            sample.packets_received
        );
        (sample, self.timer.expire())
    }
}

/// Throughput of `bytes` received over `interval`, in kbit/s.
pub fn kilobits_per_second(bytes: u64, interval: Duration) -> f64 {
    let secs = interval.as_secs_f64();
    if secs == 0.0 {
        return 0.0;
    }
    bytes as f64 * 8.0 / 1000.0 / secs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(interval: f64, horizon: f64) -> SampleRecorder {
        SampleRecorder::new(
            Duration::from_secs_f64(interval),
            SimTime::from_secs_f64(horizon),
            2,
            ProtocolChoice::Aodv,
            27.0,
        )
    }

    #[test]
    fn test_tick_reads_and_resets_counters() {
        let mut recorder = recorder(1.0, 5.0);
        let mut counters = Counters::new();
        counters.record(1000);
        counters.record(500);

        let (sample, next) = recorder.tick(&mut counters, SimTime::ZERO);
        assert_eq!(sample.kilobits_per_second, 12.0);
        assert_eq!(sample.packets_received, 2);
        assert_eq!(sample.num_sinks, 2);
        assert_eq!(sample.protocol, ProtocolChoice::Aodv);
        assert_eq!(sample.transmit_power_dbm, 27.0);
        assert_eq!(next, Some(SimTime::from_secs_f64(1.0)));
        assert_eq!(counters, Counters::default());

        let (empty, _) = recorder.tick(&mut counters, SimTime::from_secs_f64(1.0));
        assert_eq!(empty.kilobits_per_second, 0.0);
        assert_eq!(empty.packets_received, 0);
        assert_eq!(recorder.packets_sampled(), 2);
    }

    #[test]
    fn test_stops_rescheduling_at_horizon() {
        let mut recorder = recorder(1.0, 3.0);
        let mut counters = Counters::new();
        assert_eq!(recorder.expected_samples(), 3);
        assert_eq!(recorder.first_tick(), Some(SimTime::ZERO));

        let mut ticks = vec![SimTime::ZERO];
        let mut at = SimTime::ZERO;
        while let (_, Some(next)) = recorder.tick(&mut counters, at) {
            ticks.push(next);
            at = next;
        }
        assert_eq!(ticks, vec![SimTime::ZERO, SimTime::from_secs_f64(1.0), SimTime::from_secs_f64(2.0)]);
        assert_eq!(recorder.samples_taken(), 3);
    }

    #[test]
    fn test_rate_divides_by_interval() {
        assert_eq!(kilobits_per_second(1000, Duration::from_secs(1)), 8.0);
        assert_eq!(kilobits_per_second(1000, Duration::from_secs(2)), 4.0);
        assert_eq!(kilobits_per_second(1000, Duration::from_millis(500)), 16.0);
        assert_eq!(kilobits_per_second(1000, Duration::ZERO), 0.0);
    }

    #[test]
    fn test_horizon_shorter_than_interval_never_ticks() {
        let recorder = recorder(2.0, 1.0);
        assert_eq!(recorder.first_tick(), None);
        assert_eq!(recorder.expected_samples(), 0);
    }
}
