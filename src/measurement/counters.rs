/// Bytes and packets received since the last sample.
///
/// Owned by the experiment world and only touched from inside the event loop:
/// sinks add to it on every receive, the sample recorder drains it on every
/// tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    bytes_total: u64,
    packets_received: u64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one received datagram of `len` bytes.
    pub fn record(&mut self, len: u64) {
        self.bytes_total += len;
        self.packets_received += 1;
    }

    pub fn bytes_total(&self) -> u64 {
        self.bytes_total
    }

    pub fn packets_received(&self) -> u64 {
        self.packets_received
    }

    /// Return the current totals and reset both counters to zero.
    pub fn take(&mut self) -> Counters {
        std::mem::take(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_take() {
        let mut counters = Counters::new();
        counters.record(1000);
        counters.record(512);

        assert_eq!(counters.bytes_total(), 1512);
        assert_eq!(counters.packets_received(), 2);

        let snapshot = counters.take();
        assert_eq!(snapshot.bytes_total(), 1512);
        assert_eq!(snapshot.packets_received(), 2);
        assert_eq!(counters, Counters::default());
    }

    #[test]
    fn test_zero_length_datagram_still_counts() {
        let mut counters = Counters::new();
        counters.record(0);
        assert_eq!(counters.bytes_total(), 0);
        assert_eq!(counters.packets_received(), 1);
    }
}
