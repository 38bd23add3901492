//! CSV sample writer.

use crate::measurement::Sample;
use color_eyre::eyre::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Column names, in the order [`Sample`] serializes its fields.
pub const HEADER: [&str; 6] = [
    "SimulationSecond",
    "ReceiveRate",
    "PacketsReceived",
    "NumberOfSinks",
    "RoutingProtocol",
    "TransmissionPower",
];

/// Appends one row per [`Sample`], flushing after each so a crashed run
/// keeps every row taken so far.
pub struct ResultWriter<W: Write> {
    csv: csv::Writer<W>,
    rows: u64,
}

impl ResultWriter<File> {
    /// Create (or truncate) `path` and write the header row.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create result file {}", path.display()))?;
        let writer = Self::from_writer(file)?;
        log::info!("Writing samples to {}", path.display());
        Ok(writer)
    }
}

impl<W: Write> ResultWriter<W> {
    pub fn from_writer(inner: W) -> Result<Self> {
        // The header is written by hand so that a run without samples still
        // produces it.
        let mut csv = csv::WriterBuilder::new().has_headers(false).from_writer(inner);
        csv.write_record(HEADER).context("Cannot write the header")?;
        csv.flush().context("Error writing the header")?;
        Ok(ResultWriter { csv, rows: 0 })
    }

    pub fn append_row(&mut self, sample: &Sample) -> Result<()> {
        self.csv
            .serialize(sample)
            .context("Cannot write the sample to file")?;
        self.csv.flush().context("Error writing the sample to file")?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far, header excluded.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(self) -> Result<W> {
        self.csv
            .into_inner()
            .map_err(|e| color_eyre::eyre::eyre!("Error flushing result file: {}", e.error()))
    }
}
